use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One line of the crawl's append-only record log.
///
/// `start` is always the member's declared homepage URL and is carried
/// through every hop of the discovery chain, so the analyzer can attribute a
/// discovered link to the member whose crawl found it no matter how many
/// redirect/continue/brute-force steps sat in between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ClassificationRecord {
    /// The homepage (or a page reached from it) yielded no usable friends
    /// directory for this branch.
    #[serde(rename = "no_friends_page")]
    HomepageUnreachable { start: String, from: String },

    /// A page believed to be the friends directory was reached. Emitted even
    /// when link extraction later comes up empty.
    #[serde(rename = "friends_page")]
    DirectoryFound { start: String, target: String },

    /// A directory page produced no accepted friend links.
    #[serde(rename = "no_friends_link")]
    DirectoryUnreachable { start: String, from: String },

    /// One accepted outbound friend link, tagged with the extraction rule
    /// that produced it.
    #[serde(rename = "friends_link")]
    LinkFound {
        start: String,
        from: String,
        target: String,
        selector: String,
    },
}

impl ClassificationRecord {
    pub fn start(&self) -> &str {
        match self {
            ClassificationRecord::HomepageUnreachable { start, .. }
            | ClassificationRecord::DirectoryFound { start, .. }
            | ClassificationRecord::DirectoryUnreachable { start, .. }
            | ClassificationRecord::LinkFound { start, .. } => start,
        }
    }
}

/// Sink invoked for every record as it is produced, before the crawl
/// finishes. Used to stream the record log to disk.
pub type RecordCallback = Arc<dyn Fn(&ClassificationRecord) + Send + Sync>;
