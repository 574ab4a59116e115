//! The daily report.
//!
//! Renders the persisted diff table for one day, or a short notice when no
//! filings came in. The HTML form is the body of the notification mail.

use chrono::NaiveDate;
use kessan_diff::{DIFF_COLUMNS, DiffRow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unknown report format.
    #[error("Unknown report format: {0}")]
    UnknownFormat(String),
}

/// How a report is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Fixed-width table for terminals.
    #[default]
    Text,
    /// Markdown table.
    Markdown,
    /// HTML document with a table.
    Html,
    /// Pretty-printed JSON.
    Json,
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "markdown" | "md" => Ok(Self::Markdown),
            "html" | "htm" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            other => Err(ReportError::UnknownFormat(other.to_string())),
        }
    }
}

/// The earnings summary of one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    /// Day the filings were submitted
    pub date: NaiveDate,
    /// Diff rows in report order
    pub rows: Vec<DiffRow>,
}

fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

impl DailyReport {
    /// Create a report for `date`.
    pub const fn new(date: NaiveDate, rows: Vec<DiffRow>) -> Self {
        Self { date, rows }
    }

    /// Returns true when nothing was filed that day.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Subject line for the report.
    pub fn subject(&self) -> String {
        format!("[Kessan] Earnings summary {}", self.date)
    }

    /// The notice shown instead of a table on days without filings.
    pub fn empty_notice(&self) -> String {
        format!("No filings were submitted on {}.", self.date)
    }

    fn cells(row: &DiffRow) -> [String; 5] {
        [
            row.security_code.clone(),
            pct(row.revenue_yoy_pct),
            pct(row.eps_yoy_pct),
            pct(row.revenue_surprise_pct),
            pct(row.eps_surprise_pct),
        ]
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n", self.subject()));
        output.push_str(&"=".repeat(80));
        output.push('\n');

        if self.is_empty() {
            output.push_str(&self.empty_notice());
            output.push('\n');
            return output;
        }

        let labels: Vec<&str> = DIFF_COLUMNS.iter().map(|c| c.label).collect();
        output.push_str(&format!(
            "{:<8} {:>16} {:>16} {:>18} {:>16}\n",
            labels[0], labels[1], labels[2], labels[3], labels[4]
        ));
        output.push_str(&"-".repeat(80));
        output.push('\n');

        for row in &self.rows {
            let [code, rev_yoy, eps_yoy, rev_surprise, eps_surprise] = Self::cells(row);
            output.push_str(&format!(
                "{code:<8} {rev_yoy:>16} {eps_yoy:>16} {rev_surprise:>18} {eps_surprise:>16}\n"
            ));
        }

        output.push_str(&"-".repeat(80));
        output.push('\n');
        output.push_str(&format!("{} securities\n", self.rows.len()));
        output
    }

    /// Format as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Earnings Summary: {}\n\n", self.date));

        if self.is_empty() {
            output.push_str(&self.empty_notice());
            output.push('\n');
            return output;
        }

        let labels: Vec<&str> = DIFF_COLUMNS.iter().map(|c| c.label).collect();
        output.push_str(&format!("| {} |\n", labels.join(" | ")));
        output.push_str(&format!("|{}\n", "---|".repeat(labels.len())));

        for row in &self.rows {
            output.push_str(&format!("| {} |\n", Self::cells(row).join(" | ")));
        }

        output
    }

    /// Format as an HTML document. Column descriptions become header tooltips.
    pub fn to_html(&self) -> String {
        let mut output = String::new();
        let title = escape_html(&self.subject());

        output.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        output.push_str(&format!("<title>{title}</title>\n</head>\n<body>\n"));
        output.push_str(&format!("<h1>Earnings Summary: {}</h1>\n", self.date));

        if self.is_empty() {
            output.push_str(&format!("<p>{}</p>\n", escape_html(&self.empty_notice())));
        } else {
            output.push_str("<table border=\"1\">\n<thead>\n<tr>");
            for column in DIFF_COLUMNS {
                output.push_str(&format!(
                    "<th title=\"{}\">{}</th>",
                    escape_html(column.description),
                    escape_html(column.label)
                ));
            }
            output.push_str("</tr>\n</thead>\n<tbody>\n");
            for row in &self.rows {
                output.push_str("<tr>");
                for cell in Self::cells(row) {
                    output.push_str(&format!("<td>{}</td>", escape_html(&cell)));
                }
                output.push_str("</tr>\n");
            }
            output.push_str("</tbody>\n</table>\n");
        }

        output.push_str("</body>\n</html>\n");
        output
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Renders in the requested format.
    ///
    /// # Errors
    ///
    /// Only [`ReportFormat::Json`] can fail.
    pub fn render(&self, format: ReportFormat) -> Result<String, ReportError> {
        match format {
            ReportFormat::Text => Ok(self.to_ascii_table()),
            ReportFormat::Markdown => Ok(self.to_markdown()),
            ReportFormat::Html => Ok(self.to_html()),
            ReportFormat::Json => self.to_json(),
        }
    }

    /// Renders the report into the file at `path`, replacing it.
    ///
    /// # Errors
    ///
    /// Fails when rendering fails or the file cannot be written.
    pub fn write_to(&self, path: &Path, format: ReportFormat) -> Result<(), ReportError> {
        std::fs::write(path, self.render(format)?)?;
        Ok(())
    }
}

impl fmt::Display for DailyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii_table())
    }
}
