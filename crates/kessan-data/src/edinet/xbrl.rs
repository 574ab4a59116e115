//! Numeric fact extraction from EDINET XBRL instance documents.
//!
//! EDINET filings carry the same financial concept under different tag names
//! depending on the accounting standard (J-GAAP `jpcrp_cor:*` versus IFRS
//! `ifrs-full:*`). Extraction therefore works on an ordered list of candidate
//! tags: the first candidate that yields a numeric value wins.
//!
//! Matching is textual. The instance document is never parsed as XML, so a
//! truncated or otherwise malformed document simply produces no value.
//!
//! # Example
//!
//! ```
//! use kessan_data::edinet::xbrl::{concepts, extract};
//!
//! let xbrl = r#"<ifrs-full:Revenue contextRef="CurrentYearDuration">1500</ifrs-full:Revenue>"#;
//! assert_eq!(extract(xbrl, concepts::REVENUE), Some(1500.0));
//! assert_eq!(extract(xbrl, concepts::ORDINARY_INCOME), None);
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Text content accepted as a numeric fact: optional minus, digits, optional fraction.
const NUMERIC_CONTENT: &str = r"-?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)";

/// Builds the pattern for one tag: `<tag attrs...>NUMBER</tag>`.
///
/// The tag name is escaped and must be followed by whitespace or `>`, so
/// `jpcrp_cor:NetSales` never matches `jpcrp_cor:NetSalesSummaryOfBusinessResults`.
fn tag_pattern(tag: &str) -> Option<Regex> {
    let escaped = regex::escape(tag);
    let pattern = format!(r"<{escaped}(?:\s[^>]*)?>({NUMERIC_CONTENT})</{escaped}>");
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(tag, error = %e, "skipping candidate tag with unusable pattern");
            None
        }
    }
}

fn first_value(re: &Regex, document: &str) -> Option<f64> {
    re.captures(document)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Returns the first numeric value found for `candidate_tags`, trying tags strictly in order.
///
/// A value of `0` is a present zero. `None` means no candidate tag carried a
/// numeric value anywhere in the document.
pub fn extract<S: AsRef<str>>(document: &str, candidate_tags: &[S]) -> Option<f64> {
    candidate_tags.iter().find_map(|tag| {
        tag_pattern(tag.as_ref()).and_then(|re| first_value(&re, document))
    })
}

/// A candidate tag list with its patterns compiled once.
#[derive(Debug, Clone)]
pub struct TagExtractor {
    patterns: Vec<Regex>,
}

impl TagExtractor {
    /// Compiles the patterns for `candidate_tags`, preserving their order.
    pub fn new<S: AsRef<str>>(candidate_tags: &[S]) -> Self {
        let patterns = candidate_tags
            .iter()
            .filter_map(|tag| tag_pattern(tag.as_ref()))
            .collect();
        Self { patterns }
    }

    /// Same semantics as [`extract`].
    pub fn extract(&self, document: &str) -> Option<f64> {
        self.patterns
            .iter()
            .find_map(|re| first_value(re, document))
    }

    /// Number of usable candidate tags.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true when no candidate tag is usable.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Key figures extracted from one filing. `None` means the tag was not found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialFigures {
    /// Net sales / revenue
    pub revenue: Option<f64>,
    /// Operating income
    pub operating_income: Option<f64>,
    /// Ordinary income (J-GAAP only)
    pub ordinary_income: Option<f64>,
    /// Profit attributable to owners of parent
    pub profit_attributable_to_parent: Option<f64>,
    /// Earnings per share
    pub earnings_per_share: Option<f64>,
}

/// Compiled extractors for every field of [`FinancialFigures`].
#[derive(Debug, Clone)]
pub struct FigureExtractors {
    revenue: TagExtractor,
    operating_income: TagExtractor,
    ordinary_income: TagExtractor,
    profit_attributable_to_parent: TagExtractor,
    earnings_per_share: TagExtractor,
}

impl FigureExtractors {
    /// Compiles the canonical candidate lists from [`concepts`].
    pub fn new() -> Self {
        Self {
            revenue: TagExtractor::new(concepts::REVENUE),
            operating_income: TagExtractor::new(concepts::OPERATING_INCOME),
            ordinary_income: TagExtractor::new(concepts::ORDINARY_INCOME),
            profit_attributable_to_parent: TagExtractor::new(
                concepts::PROFIT_ATTRIBUTABLE_TO_PARENT,
            ),
            earnings_per_share: TagExtractor::new(concepts::EARNINGS_PER_SHARE),
        }
    }

    /// Extracts all key figures from an XBRL instance document.
    pub fn extract(&self, document: &str) -> FinancialFigures {
        FinancialFigures {
            revenue: self.revenue.extract(document),
            operating_income: self.operating_income.extract(document),
            ordinary_income: self.ordinary_income.extract(document),
            profit_attributable_to_parent: self.profit_attributable_to_parent.extract(document),
            earnings_per_share: self.earnings_per_share.extract(document),
        }
    }
}

impl Default for FigureExtractors {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonical candidate tag lists, domestic GAAP first, IFRS second.
pub mod concepts {
    /// Net sales / revenue
    pub const REVENUE: &[&str] = &["jpcrp_cor:NetSales", "ifrs-full:Revenue"];

    /// Operating income / operating profit
    pub const OPERATING_INCOME: &[&str] =
        &["jpcrp_cor:OperatingIncome", "ifrs-full:OperatingProfit"];

    /// Ordinary income has no IFRS counterpart.
    pub const ORDINARY_INCOME: &[&str] = &["jpcrp_cor:OrdinaryIncome"];

    /// Profit attributable to owners of parent
    pub const PROFIT_ATTRIBUTABLE_TO_PARENT: &[&str] = &[
        "jpcrp_cor:ProfitAttributableToOwnersOfParent",
        "ifrs-full:ProfitLoss",
    ];

    /// Earnings per share (basic)
    pub const EARNINGS_PER_SHARE: &[&str] = &[
        "jpcrp_cor:EarningsPerShare",
        "ifrs-full:BasicEarningsLossPerShare",
    ];
}
