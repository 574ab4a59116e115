#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/kessan-rs/kessan/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod consensus;
pub mod csv_import;
pub mod edinet;
pub mod error;
pub mod security_code;
pub mod watch_list;

pub use consensus::ConsensusRecord;
pub use csv_import::CsvImport;
pub use edinet::{FilingRecord, FiscalPeriod};
pub use error::{DataError, Result};
pub use security_code::canonical_security_code;
pub use watch_list::{WatchList, WatchedSecurity};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
