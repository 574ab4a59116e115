#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/kessan-rs/kessan/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod columns;
pub mod diff;
pub mod pct;
pub mod select;
pub mod surprise;
pub mod yoy;

pub use columns::{ColumnInfo, DIFF_COLUMNS};
pub use diff::{DiffBatch, DiffRow, build_diff, sort_rows};
pub use pct::{percent_change, round2};
pub use surprise::{Surprise, compute_surprise};
pub use yoy::{YoyChange, compute_yoy};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
