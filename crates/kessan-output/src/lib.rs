#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/kessan-rs/kessan/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod report;

pub use export::{ExportError, ExportFormat, Exporter, FILING_COLUMNS};
pub use report::{DailyReport, ReportError, ReportFormat};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
