//! The list of securities a deployment tracks.
//!
//! The list is a headerless CSV of `secCode, companyName, edinetCode`, as
//! exported from exchange listing sheets.

use crate::csv_import::{CsvImport, non_blank};
use crate::error::Result;
use crate::security_code::canonical_security_code;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;

/// A tracked security.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedSecurity {
    /// Securities code as it appears in EDINET listings
    pub security_code: String,
    /// Company name
    pub company_name: Option<String>,
    /// EDINET filer code (e.g. "E02144")
    pub edinet_code: Option<String>,
}

impl WatchedSecurity {
    /// Creates an entry with only a security code.
    pub fn new(security_code: impl Into<String>) -> Self {
        Self {
            security_code: security_code.into(),
            company_name: None,
            edinet_code: None,
        }
    }
}

/// Security codes to keep when fetching filings. An empty list keeps everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchList {
    codes: HashSet<String>,
}

impl WatchList {
    /// Builds the filter from stored entries.
    pub fn new<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a WatchedSecurity>,
    {
        Self {
            codes: entries
                .into_iter()
                .map(|e| canonical_security_code(&e.security_code))
                .collect(),
        }
    }

    /// Returns true if filings of `security_code` should be kept. EDINET and
    /// listing-code forms of the same security match each other.
    pub fn admits(&self, security_code: &str) -> bool {
        self.codes.is_empty() || self.codes.contains(&canonical_security_code(security_code))
    }

    /// Number of distinct codes on the list.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns true if the list admits every security.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Reads a headerless `secCode, companyName, edinetCode` CSV.
///
/// # Errors
///
/// Fails only when the CSV itself cannot be read; rows without a code are
/// rejected and counted.
pub fn read_watch_list_csv<R: Read>(reader: R) -> Result<CsvImport<WatchedSecurity>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut import = CsvImport::new();

    for row in csv.records() {
        let row = row?;
        let Some(security_code) = non_blank(row.get(0)) else {
            import.reject(row.position().map(|p| p.line()), "missing security code");
            continue;
        };
        import.records.push(WatchedSecurity {
            security_code: canonical_security_code(&security_code),
            company_name: non_blank(row.get(1)),
            edinet_code: non_blank(row.get(2)),
        });
    }

    Ok(import)
}
