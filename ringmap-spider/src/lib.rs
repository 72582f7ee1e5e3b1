pub mod classify;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod host;
pub mod record;
pub mod rules;

pub use classify::{ProgressCallback, Spider};
pub use error::SpiderError;
pub use fetch::{FetchedPage, Fetcher, HttpFetcher};
pub use record::{ClassificationRecord, RecordCallback};
