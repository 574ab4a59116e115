//! EDINET filing retrieval and normalization.
//!
//! This module provides:
//! - Ordered candidate-tag extraction of numeric XBRL facts
//! - EDINET document listing and submission archive download
//! - Normalization of listed documents into [`FilingRecord`]s
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use kessan_data::edinet::{EdinetClient, Normalizer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EdinetClient::new(std::env::var("EDINET_KEY")?)?;
//!     let date = NaiveDate::from_ymd_opt(2025, 6, 18).unwrap();
//!     let normalizer = Normalizer::new();
//!
//!     for meta in client.list_documents(date).await?.iter().filter(|d| d.has_xbrl()) {
//!         let raw = client.fetch_raw_filing(meta).await?;
//!         let record = normalizer.normalize(&raw)?;
//!         println!("{} {} revenue={:?}", record.security_code, record.classification, record.revenue);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod filings;
pub mod xbrl;

pub use client::{EDINET_BASE_URL, EdinetClient, parse_document_list, read_xbrl_from_zip};
pub use filings::{
    DocumentMeta, FilingRecord, FiscalPeriod, Normalizer, RawFiling, classification_label,
    normalize, parse_submit_date,
};
pub use xbrl::{FigureExtractors, FinancialFigures, TagExtractor, concepts, extract};
