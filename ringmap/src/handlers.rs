use clap::ArgMatches;
use colored::Colorize;
use ringmap_core::crawl::{execute_analysis, execute_crawl, CrawlOptions};
use ringmap_core::query::{MemberBrief, PageListing, QuerySnapshot, ShortestPaths};
use std::path::PathBuf;
use tracing_subscriber;

// Helper functions shared by the query handlers

/// Expand a user-supplied data directory, honoring a leading tilde.
pub fn expand_data_dir(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Render a stats listing page as plain text.
pub fn render_listing(listing: &PageListing) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Page {}/{} ({} members)\n",
        listing.page,
        listing.total_pages.max(1),
        listing.total_items
    ));
    for item in &listing.items {
        out.push_str(&format!("#{} {} <{}>\n", item.id, item.name, item.url));
        if item.links.is_empty() {
            out.push_str("  links page: not found\n");
        } else {
            out.push_str(&format!("  links page: {}\n", item.links));
        }
        out.push_str(&format!(
            "  out: {} reachable ({} within 6), avg {:.4}\n",
            item.stats.outgoing.reachable,
            item.stats.outgoing.within_six,
            item.stats.outgoing.avg_distance
        ));
        out.push_str(&format!(
            "  in:  {} reachable ({} within 6), avg {:.4}\n",
            item.stats.incoming.reachable,
            item.stats.incoming.within_six,
            item.stats.incoming.avg_distance
        ));
    }
    out
}

/// Render a shortest-paths result as plain text.
pub fn render_paths(result: &ShortestPaths) -> String {
    let mut out = String::new();
    if result.distance < 0 {
        out.push_str(&format!(
            "No path from #{} to #{}\n",
            result.source_id, result.target_id
        ));
        return out;
    }
    out.push_str(&format!(
        "Distance {} ({} path{})\n",
        result.distance,
        result.paths.len(),
        if result.paths.len() == 1 { "" } else { "s" }
    ));
    let name_of = |id: i64| {
        result
            .nodes
            .iter()
            .find(|n| n.id == id)
            .map(|n| n.name.as_str())
            .unwrap_or("?")
    };
    for path in &result.paths {
        let hops: Vec<String> = path
            .iter()
            .map(|id| format!("{} (#{})", name_of(*id), id))
            .collect();
        out.push_str(&format!("  {}\n", hops.join(" -> ")));
    }
    out
}

/// Render a neighbor list as plain text.
pub fn render_neighbors(title: &str, neighbors: &[MemberBrief]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} ({})\n", title, neighbors.len()));
    for neighbor in neighbors {
        out.push_str(&format!("  #{} {} <{}>\n", neighbor.id, neighbor.name, neighbor.url));
    }
    out
}

fn load_snapshot(args: &ArgMatches) -> QuerySnapshot {
    let data_dir = expand_data_dir(args.get_one::<String>("data-dir").unwrap());
    match QuerySnapshot::load(&data_dir) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn resolve_or_exit(snapshot: &QuerySnapshot, key: &str) -> i64 {
    match snapshot.resolve(key) {
        Some(id) => id,
        None => {
            eprintln!("{} Unknown member: {}", "✗".red().bold(), key);
            std::process::exit(1);
        }
    }
}

pub async fn handle_crawl(sub_matches: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let data_dir = expand_data_dir(sub_matches.get_one::<String>("data-dir").unwrap());
    let workers = *sub_matches.get_one::<usize>("threads").unwrap();
    let timeout_secs = *sub_matches.get_one::<u64>("timeout").unwrap();
    let registry_url = sub_matches.get_one::<String>("registry").unwrap().clone();
    let no_progress = sub_matches.get_flag("no-progress");

    println!("\n🕸  Crawling the ring");
    println!("Registry: {}", registry_url);
    println!("Workers: {}", workers);
    println!("Data dir: {}\n", data_dir.display());

    let options = CrawlOptions {
        workers,
        timeout_secs,
        registry_url,
        data_dir,
        show_progress_bars: !no_progress,
    };

    match execute_crawl(options).await {
        Ok(summary) => {
            println!("\n{} Crawl complete!", "✓".green().bold());
            println!("  Members crawled: {}", summary.member_count);
            println!("  Records written: {}", summary.record_count);
            println!("  Directories found: {}", summary.directories_found);
            println!("  Links found: {}", summary.links_found);
        }
        Err(e) => {
            eprintln!("{} Crawl failed: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}

pub fn handle_analyze(sub_matches: &ArgMatches) {
    tracing_subscriber::fmt::init();

    let data_dir = expand_data_dir(sub_matches.get_one::<String>("data-dir").unwrap());
    match execute_analysis(&data_dir) {
        Ok(summary) => {
            println!("{} Analysis complete!", "✓".green().bold());
            println!("  Members: {}", summary.member_count);
            println!("  Connections: {}", summary.edge_count);
            println!("  Artifacts written to {}", data_dir.display());
        }
        Err(e) => {
            eprintln!("{} Analysis failed: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}

pub fn handle_list(sub_matches: &ArgMatches) {
    let snapshot = load_snapshot(sub_matches);
    let page = *sub_matches.get_one::<usize>("page").unwrap();
    let search = sub_matches.get_one::<String>("search").map(String::as_str);

    let listing = snapshot.list(page, search);
    print!("{}", render_listing(&listing));
}

pub fn handle_path(sub_matches: &ArgMatches) {
    let snapshot = load_snapshot(sub_matches);
    let from = resolve_or_exit(&snapshot, sub_matches.get_one::<String>("FROM").unwrap());
    let to = resolve_or_exit(&snapshot, sub_matches.get_one::<String>("TO").unwrap());

    let result = snapshot.shortest_paths(from, to);
    if sub_matches.get_flag("json") {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).expect("path result serializes")
        );
    } else {
        print!("{}", render_paths(&result));
    }
}

pub fn handle_neighbors(sub_matches: &ArgMatches) {
    let snapshot = load_snapshot(sub_matches);
    let id = resolve_or_exit(&snapshot, sub_matches.get_one::<String>("MEMBER").unwrap());
    let incoming = sub_matches.get_flag("incoming");

    let (title, neighbors) = if incoming {
        (format!("Members linking to #{}", id), snapshot.predecessors(id))
    } else {
        (format!("Members #{} links to", id), snapshot.successors(id))
    };
    print!("{}", render_neighbors(&title, &neighbors));
}
