//! Shared pieces of the CSV importers.

use tracing::warn;

/// Rows read from a CSV file, with the count of rows that had to be rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvImport<T> {
    /// Rows that parsed into valid records, in file order
    pub records: Vec<T>,
    /// Rows skipped because they lacked a required field
    pub rejected: usize,
}

impl<T> CsvImport<T> {
    pub(crate) const fn new() -> Self {
        Self {
            records: Vec::new(),
            rejected: 0,
        }
    }

    pub(crate) fn reject(&mut self, line: Option<u64>, reason: &str) {
        warn!(line, reason, "rejecting CSV row");
        self.rejected += 1;
    }
}

impl<T> Default for CsvImport<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a figure as written in spreadsheets and finance pages.
///
/// Thousands separators and surrounding whitespace are ignored; blanks and
/// placeholder dashes mean "no figure".
pub fn parse_figure(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    match cleaned.as_str() {
        "" | "-" | "--" | "---" => None,
        value => value.parse::<f64>().ok().filter(|v| v.is_finite()),
    }
}

/// `None` for blank cells.
pub(crate) fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
