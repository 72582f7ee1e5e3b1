//! Record-log persistence: one JSON object per line, append-only, written
//! while the crawl is still running so a crash never loses finished work.

use crate::error::{CoreError, Result};
use chrono::Utc;
use ringmap_spider::ClassificationRecord;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing::warn;

pub const RECORDS_FILE: &str = "records.jsonl";

/// Write an artifact through a temp sibling plus rename, so readers never
/// observe a half-written file and a failed write leaves the old one intact.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let name = path
        .file_name()
        .ok_or_else(|| CoreError::MissingArtifact(format!("{}: no file name", path.display())))?
        .to_string_lossy();
    let tmp = path.with_file_name(format!("{}.tmp", name));
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Append-only record sink shared across crawl workers. Appends are
/// order-insensitive: the graph builder treats the log as a set.
pub struct RecordLog {
    file: Mutex<File>,
}

impl RecordLog {
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self { file: Mutex::new(file) })
    }

    pub fn append(&self, record: &ClassificationRecord) {
        let Ok(line) = serde_json::to_string(record) else {
            return;
        };
        let mut file = self.file.lock().expect("record log lock poisoned");
        if let Err(e) = writeln!(file, "{}", line) {
            warn!("Failed to append record: {}", e);
        }
    }
}

/// Rename a pre-existing log out of the way before a fresh crawl, keeping
/// the old run as a timestamped backup.
pub fn backup_existing_log(path: &Path) -> Result<()> {
    if path.exists() {
        let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
        let backup = path.with_extension(format!("jsonl.bak.{}", stamp));
        std::fs::rename(path, backup)?;
    }
    Ok(())
}

/// Read a whole record log. Blank lines are skipped; a malformed line is a
/// data error since the log is machine-written.
pub fn read_records(path: &Path) -> Result<Vec<ClassificationRecord>> {
    if !path.exists() {
        return Err(CoreError::MissingArtifact(format!(
            "{} (run `ringmap crawl` first)",
            path.display()
        )));
    }
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}
