#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/kessan-rs/kessan/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod store;

// Re-export main types from sub-crates
pub use kessan_data as data;
pub use kessan_diff as diff;
pub use kessan_output as output;

pub use error::{Result, StoreError};
pub use fetch::{DocumentSource, FetchOutcome, fetch_filings};
pub use pipeline::{DailyRun, run_daily_diff};
pub use store::{
    ConsensusSink, ConsensusSource, DiffSink, DiffSource, FilingSink, FilingSource, MemoryStore,
    SqliteStore, WatchListStore,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
