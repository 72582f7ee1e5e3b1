//! Run orchestration: the crawl pass (registry fetch + spider run + record
//! log) and the analysis pass (graph build + statistics + reports). The two
//! passes only communicate through files on disk, so each can be re-run
//! independently.

use crate::analyze;
use crate::error::Result;
use crate::graph::{RingGraph, GRAPH_FILE};
use crate::members::{self, Member, MEMBERS_FILE};
use crate::query::{save_stats, STATS_FILE};
use crate::records::{backup_existing_log, read_records, RecordLog, RECORDS_FILE};
use crate::report::{generate_csv_report, generate_markdown_report, save_report, CSV_FILE, MARKDOWN_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use ringmap_spider::{HttpFetcher, ProgressCallback, RecordCallback, Spider};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;

/// Options for configuring a crawl run.
pub struct CrawlOptions {
    pub workers: usize,
    pub timeout_secs: u64,
    pub registry_url: String,
    pub data_dir: PathBuf,
    pub show_progress_bars: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            workers: 16,
            timeout_secs: 30,
            registry_url: members::DEFAULT_REGISTRY_URL.to_string(),
            data_dir: PathBuf::from("."),
            show_progress_bars: true,
        }
    }
}

/// What a finished crawl produced, for the caller to print.
pub struct CrawlSummary {
    pub member_count: usize,
    pub record_count: usize,
    pub directories_found: usize,
    pub links_found: usize,
}

/// What a finished analysis produced.
pub struct AnalysisSummary {
    pub member_count: usize,
    pub edge_count: usize,
}

/// Execute a full crawl: snapshot the registry, back up any previous record
/// log, then run the spider over every member homepage, streaming records
/// to the log as they arrive.
pub async fn execute_crawl(options: CrawlOptions) -> Result<CrawlSummary> {
    let CrawlOptions {
        workers,
        timeout_secs,
        registry_url,
        data_dir,
        show_progress_bars,
    } = options;

    let client = reqwest::Client::new();
    let members = members::fetch_registry(&client, &registry_url).await?;
    members::save_members(&members, &data_dir.join(MEMBERS_FILE))?;

    let records_path = data_dir.join(RECORDS_FILE);
    backup_existing_log(&records_path)?;
    let log = Arc::new(RecordLog::create(&records_path)?);

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let processed_count = Arc::new(AtomicUsize::new(0));
    let progress_callback: ProgressCallback = match progress_bar.clone() {
        Some(pb) => {
            let count = processed_count.clone();
            Arc::new(move |_worker_id: usize, url: String| {
                let n = count.fetch_add(1, Ordering::Relaxed) + 1;
                pb.set_message(format!("Classified {} pages, at {}", n, url));
                pb.tick();
            })
        }
        None => Arc::new(|_worker_id: usize, _url: String| {}),
    };

    let log_clone = log.clone();
    let record_callback: RecordCallback = Arc::new(move |record| {
        log_clone.append(record);
    });

    let fetcher = Arc::new(HttpFetcher::new(workers, timeout_secs)?);
    let spider = Spider::new(fetcher)
        .with_record_callback(record_callback)
        .with_progress_callback(progress_callback);

    let start_urls: Vec<String> = members.iter().map(|m| m.url.clone()).collect();
    let records = spider.crawl(&start_urls, workers).await?;

    if let Some(ref pb) = progress_bar {
        let total = processed_count.load(Ordering::Relaxed);
        pb.finish_with_message(format!("Crawl complete, {} pages classified", total));
    }

    let directories_found = records
        .iter()
        .filter(|r| matches!(r, ringmap_spider::ClassificationRecord::DirectoryFound { .. }))
        .count();
    let links_found = records
        .iter()
        .filter(|r| matches!(r, ringmap_spider::ClassificationRecord::LinkFound { .. }))
        .count();

    info!(
        "Crawl finished: {} members, {} records ({} directories, {} links)",
        members.len(),
        records.len(),
        directories_found,
        links_found
    );

    Ok(CrawlSummary {
        member_count: members.len(),
        record_count: records.len(),
        directories_found,
        links_found,
    })
}

/// Build the graph from the crawl artifacts and write the snapshot, the
/// statistics and both reports. Everything is rendered before anything is
/// written, so a failure partway leaves the previous artifacts intact.
pub fn execute_analysis(data_dir: &Path) -> Result<AnalysisSummary> {
    let members: Vec<Member> = members::load_members(&data_dir.join(MEMBERS_FILE))?;
    let records = read_records(&data_dir.join(RECORDS_FILE))?;

    let graph = RingGraph::build(members, &records)?;
    let stats = analyze::analyze(&graph);

    let csv = generate_csv_report(&graph, &stats);
    let markdown = generate_markdown_report(&graph, &stats);

    graph.save(&data_dir.join(GRAPH_FILE))?;
    save_stats(&stats, &data_dir.join(STATS_FILE))?;
    save_report(&csv, &data_dir.join(CSV_FILE))?;
    save_report(&markdown, &data_dir.join(MARKDOWN_FILE))?;

    Ok(AnalysisSummary {
        member_count: graph.node_count(),
        edge_count: graph.edge_count(),
    })
}
