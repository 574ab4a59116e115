//! Export of diff rows, filings and consensus records.
//!
//! CSV output always starts with a header line, so an empty table still
//! exports as a valid file. Absent figures are empty cells in CSV and `null`
//! in JSON.

use kessan_data::{ConsensusRecord, FilingRecord};
use kessan_diff::{DIFF_COLUMNS, DiffRow};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialized output was not UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::PrettyJson => "pretty-json",
        })
    }
}

/// CSV header of exported filings, in field order.
pub const FILING_COLUMNS: &[&str] = &[
    "document_id",
    "security_code",
    "submit_date",
    "fiscal_year",
    "fiscal_period",
    "classification",
    "revenue",
    "operating_income",
    "ordinary_income",
    "profit_attributable_to_parent",
    "earnings_per_share",
];

const CONSENSUS_COLUMNS: &[&str] = &[
    "security_code",
    "scrape_date",
    "company_revenue",
    "company_eps",
    "analyst_revenue",
    "analyst_eps",
];

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn to_csv<T: Serialize>(header: &[&str], records: &[T]) -> Result<String, ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);
    wtr.write_record(header)?;
    for record in records {
        wtr.serialize(record)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn export_records<T: Serialize>(
    header: &[&str],
    records: &[T],
    format: ExportFormat,
) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => to_csv(header, records),
        ExportFormat::Json => Ok(serde_json::to_string(records)?),
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(records)?),
    }
}

impl Exporter for Vec<DiffRow> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        let header: Vec<&str> = DIFF_COLUMNS.iter().map(|c| c.name).collect();
        export_records(&header, self, format)
    }
}

impl Exporter for Vec<FilingRecord> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        export_records(FILING_COLUMNS, self, format)
    }
}

impl Exporter for Vec<ConsensusRecord> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        export_records(CONSENSUS_COLUMNS, self, format)
    }
}
