//! Report rendering: pure functions from a built graph + statistics to CSV
//! and Markdown text. Nothing here touches the network or mutates state.

use crate::analyze::{ConnectionStats, DirectionalStats};
use crate::error::Result;
use crate::graph::RingGraph;
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;

pub const CSV_FILE: &str = "analysis.csv";
pub const MARKDOWN_FILE: &str = "analysis.md";

const CSV_HEADER: &str = "ID,Name,URL,Links,\
OutgoingCount,OutgoingCountIn6Degrees,OutgoingAverage,\
IncomingCount,IncomingCountIn6Degrees,IncomingAverage";

fn csv_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

pub fn generate_csv_report(graph: &RingGraph, stats: &HashMap<i64, DirectionalStats>) -> String {
    let mut report = String::new();
    report.push_str(CSV_HEADER);
    report.push('\n');

    for member in graph.members() {
        let DirectionalStats { outgoing, incoming } =
            stats.get(&member.id).copied().unwrap_or_default();
        let links_page = graph.links_page(member.id).unwrap_or("");
        report.push_str(&format!(
            "{},{},{},{},{},{},{:.4},{},{},{:.4}\n",
            member.id,
            csv_quote(&member.name),
            csv_quote(&member.url),
            csv_quote(links_page),
            outgoing.reachable,
            outgoing.within_six,
            outgoing.avg_distance,
            incoming.reachable,
            incoming.within_six,
            incoming.avg_distance,
        ));
    }
    report
}

pub fn generate_markdown_report(graph: &RingGraph, stats: &HashMap<i64, DirectionalStats>) -> String {
    let mut report = String::new();
    report.push_str("# Connection Analysis\n");
    report.push_str(&format!(
        "Build Date: {}  \n",
        Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    ));

    let member_count = graph.node_count();
    let edge_count = graph.edge_count();
    report.push_str(&format!("Total members: {}  \n", member_count));
    report.push_str(&format!("Total connections: {}  \n", edge_count));
    if member_count > 0 {
        report.push_str(&format!(
            "Average connections per member: {}  \n",
            edge_count as f64 / member_count as f64
        ));
    }

    for member in graph.members() {
        let DirectionalStats { outgoing, incoming } =
            stats.get(&member.id).copied().unwrap_or_default();

        report.push_str(&format!(
            "## [{}]({}) \\(Member #{}\\)\n",
            member.name, member.url, member.id
        ));
        match graph.links_page(member.id) {
            Some(links_page) => report.push_str(&format!("Links: {}  \n", links_page)),
            None => report.push_str("Links: Not Found  \n"),
        }
        report.push_str("### Outgoing Connections\n");
        report.push_str(&connection_lines("Connected to", outgoing));
        report.push_str("### Incoming Connections\n");
        report.push_str(&connection_lines("Connected by", incoming));
    }

    report
}

fn connection_lines(verb: &str, stats: ConnectionStats) -> String {
    format!(
        "{} {} members ({} in 6 degrees)  \nAverage distance: {:.4}  \n",
        verb, stats.reachable, stats.within_six, stats.avg_distance
    )
}

pub fn save_report(content: &str, path: &Path) -> Result<()> {
    crate::records::write_atomic(path, content)
}
