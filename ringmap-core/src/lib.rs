pub mod analyze;
pub mod crawl;
pub mod error;
pub mod graph;
pub mod members;
pub mod records;
pub mod report;
pub mod query;

pub use error::CoreError;
pub use graph::RingGraph;
pub use members::Member;
