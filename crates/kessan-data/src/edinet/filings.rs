//! EDINET filing metadata and the filing normalizer.
//!
//! [`DocumentMeta`] mirrors one entry of the `results` array returned by the
//! EDINET API v2 `documents.json` endpoint. Together with the XBRL instance
//! text it forms a [`RawFiling`], which [`Normalizer::normalize`] turns into
//! the fixed-field [`FilingRecord`] used everywhere downstream.

use super::xbrl::{FigureExtractors, FinancialFigures};
use crate::error::{DataError, Result};
use crate::security_code::canonical_security_code;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fiscal period of a filing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FiscalPeriod {
    /// First quarter
    Q1,
    /// Second quarter
    Q2,
    /// Third quarter
    Q3,
    /// Full fiscal year
    #[serde(rename = "FY")]
    FullYear,
}

impl FiscalPeriod {
    /// Label used in classification strings and persisted rows.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::FullYear => "FY",
        }
    }
}

impl fmt::Display for FiscalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FiscalPeriod {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "Q1" => Ok(Self::Q1),
            "Q2" => Ok(Self::Q2),
            "Q3" => Ok(Self::Q3),
            "FY" => Ok(Self::FullYear),
            other => Err(DataError::malformed(
                other,
                "fiscal period must be one of Q1, Q2, Q3, FY",
            )),
        }
    }
}

/// One document entry from the EDINET `documents.json` listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    /// EDINET document id (e.g. "S100ABCD")
    #[serde(rename = "docID")]
    pub doc_id: String,
    /// Securities code, absent for non-listed filers
    #[serde(default)]
    pub sec_code: Option<String>,
    /// Filer name
    #[serde(default)]
    pub filer_name: Option<String>,
    /// Document description
    #[serde(default)]
    pub doc_description: Option<String>,
    /// Submission timestamp, "YYYY-MM-DD hh:mm"
    #[serde(default)]
    pub submit_date_time: Option<String>,
    /// "1" when the document ships XBRL
    #[serde(default)]
    pub xbrl_flag: Option<String>,
    /// Fiscal year, when the listing carries it
    #[serde(default, deserialize_with = "de_loose_year")]
    pub fiscal_year: Option<i32>,
    /// Fiscal period, when the listing carries it
    #[serde(default)]
    pub fiscal_period: Option<String>,
}

impl DocumentMeta {
    /// Returns true if an XBRL archive can be downloaded for this document.
    pub fn has_xbrl(&self) -> bool {
        self.xbrl_flag.as_deref() == Some("1")
    }

    /// Securities code with surrounding whitespace removed, `None` when blank.
    pub fn security_code(&self) -> Option<&str> {
        self.sec_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}

/// Accepts the fiscal year as a JSON number or a numeric string.
fn de_loose_year<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Int(i32),
        Text(String),
    }

    Ok(match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Int(year)) => Some(year),
        Some(Loose::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}

/// Listing metadata plus the XBRL instance text of one filing.
#[derive(Debug, Clone)]
pub struct RawFiling {
    /// Listing metadata
    pub meta: DocumentMeta,
    /// Decoded XBRL instance document
    pub xbrl: String,
}

impl RawFiling {
    /// Pairs listing metadata with its instance document.
    pub const fn new(meta: DocumentMeta, xbrl: String) -> Self {
        Self { meta, xbrl }
    }
}

/// A normalized filing. Figures are `None` when the source tag was not found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilingRecord {
    /// EDINET document id (identity key)
    pub document_id: String,
    /// Securities code
    pub security_code: String,
    /// Submission date
    pub submit_date: NaiveDate,
    /// Fiscal year
    pub fiscal_year: Option<i32>,
    /// Fiscal period
    pub fiscal_period: Option<FiscalPeriod>,
    /// `FY<year><period>`, empty unless both parts are known
    pub classification: String,
    /// Net sales / revenue
    pub revenue: Option<f64>,
    /// Operating income
    pub operating_income: Option<f64>,
    /// Ordinary income
    pub ordinary_income: Option<f64>,
    /// Profit attributable to owners of parent
    pub profit_attributable_to_parent: Option<f64>,
    /// Earnings per share
    pub earnings_per_share: Option<f64>,
}

impl FilingRecord {
    /// Assembles a record from already-extracted parts.
    ///
    /// The classification label is derived here so it can never disagree with
    /// the fiscal year and period.
    pub fn new(
        document_id: impl Into<String>,
        security_code: impl Into<String>,
        submit_date: NaiveDate,
        fiscal_year: Option<i32>,
        fiscal_period: Option<FiscalPeriod>,
        figures: FinancialFigures,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            security_code: security_code.into(),
            submit_date,
            fiscal_year,
            fiscal_period,
            classification: classification_label(fiscal_year, fiscal_period),
            revenue: figures.revenue,
            operating_income: figures.operating_income,
            ordinary_income: figures.ordinary_income,
            profit_attributable_to_parent: figures.profit_attributable_to_parent,
            earnings_per_share: figures.earnings_per_share,
        }
    }

    /// The extracted figures of this record.
    pub const fn figures(&self) -> FinancialFigures {
        FinancialFigures {
            revenue: self.revenue,
            operating_income: self.operating_income,
            ordinary_income: self.ordinary_income,
            profit_attributable_to_parent: self.profit_attributable_to_parent,
            earnings_per_share: self.earnings_per_share,
        }
    }

    /// Rejects records missing their identity key or security code.
    pub fn validate(&self) -> Result<()> {
        if self.document_id.trim().is_empty() {
            return Err(DataError::malformed(
                format!("<no id> ({})", self.security_code),
                "missing document id",
            ));
        }
        if self.security_code.trim().is_empty() {
            return Err(DataError::malformed(
                self.document_id.as_str(),
                "missing security code",
            ));
        }
        Ok(())
    }
}

/// `FY<fiscal_year><fiscal_period>` when both are present, otherwise empty.
pub fn classification_label(
    fiscal_year: Option<i32>,
    fiscal_period: Option<FiscalPeriod>,
) -> String {
    match (fiscal_year, fiscal_period) {
        (Some(year), Some(period)) => format!("FY{year}{period}"),
        _ => String::new(),
    }
}

/// Parses the date part ("YYYY-MM-DD") of an EDINET `submitDateTime`.
pub fn parse_submit_date(submit_date_time: &str) -> Result<NaiveDate> {
    let date_part = submit_date_time.trim().get(..10).unwrap_or(submit_date_time);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| DataError::InvalidDate(format!("{submit_date_time:?}: {e}")))
}

/// Turns raw filings into [`FilingRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    extractors: FigureExtractors,
}

impl Normalizer {
    /// Creates a normalizer using the canonical candidate tag lists.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes one raw filing.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::MalformedRecord`] when the document id, the
    /// security code or a parseable submission date is missing. Missing
    /// figures are never an error.
    pub fn normalize(&self, raw: &RawFiling) -> Result<FilingRecord> {
        let meta = &raw.meta;
        let doc_id = meta.doc_id.trim();
        if doc_id.is_empty() {
            return Err(DataError::malformed("<no id>", "missing document id"));
        }
        let security_code = meta
            .security_code()
            .ok_or_else(|| DataError::malformed(doc_id, "missing security code"))?;
        let submit_date = meta
            .submit_date_time
            .as_deref()
            .ok_or_else(|| DataError::malformed(doc_id, "missing submission date"))
            .and_then(|s| {
                parse_submit_date(s).map_err(|e| DataError::malformed(doc_id, e.to_string()))
            })?;
        let fiscal_period = meta
            .fiscal_period
            .as_deref()
            .and_then(|p| p.parse::<FiscalPeriod>().ok());

        Ok(FilingRecord::new(
            doc_id,
            canonical_security_code(security_code),
            submit_date,
            meta.fiscal_year,
            fiscal_period,
            self.extractors.extract(&raw.xbrl),
        ))
    }
}

/// Normalizes one raw filing with a freshly compiled [`Normalizer`].
pub fn normalize(raw: &RawFiling) -> Result<FilingRecord> {
    Normalizer::new().normalize(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn meta() -> DocumentMeta {
        DocumentMeta {
            doc_id: "S100TEST".to_string(),
            sec_code: Some("72030".to_string()),
            filer_name: Some("トヨタ自動車株式会社".to_string()),
            doc_description: None,
            submit_date_time: Some("2025-06-18 15:00".to_string()),
            xbrl_flag: Some("1".to_string()),
            fiscal_year: Some(2025),
            fiscal_period: Some("FY".to_string()),
        }
    }

    const XBRL: &str = "<jpcrp_cor:NetSales contextRef=\"c\">1100</jpcrp_cor:NetSales>\
        <ifrs-full:BasicEarningsLossPerShare>120.5</ifrs-full:BasicEarningsLossPerShare>";

    #[test]
    fn test_normalize_full_record() {
        let record = normalize(&RawFiling::new(meta(), XBRL.to_string())).unwrap();

        assert_eq!(record.document_id, "S100TEST");
        assert_eq!(record.security_code, "7203");
        assert_eq!(record.submit_date, NaiveDate::from_ymd_opt(2025, 6, 18).unwrap());
        assert_eq!(record.classification, "FY2025FY");
        assert_eq!(record.revenue, Some(1100.0));
        assert_eq!(record.earnings_per_share, Some(120.5));
        assert_eq!(record.operating_income, None);
        assert_eq!(record.ordinary_income, None);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = RawFiling::new(meta(), XBRL.to_string());
        let normalizer = Normalizer::new();
        assert_eq!(normalizer.normalize(&raw).unwrap(), normalizer.normalize(&raw).unwrap());
    }

    #[rstest]
    #[case(Some(2025), Some("Q1"), "FY2025Q1")]
    #[case(Some(2024), Some("q3"), "FY2024Q3")]
    #[case(None, Some("Q2"), "")]
    #[case(Some(2025), None, "")]
    #[case(Some(2025), Some("H1"), "")]
    fn test_classification_label(
        #[case] year: Option<i32>,
        #[case] period: Option<&str>,
        #[case] expected: &str,
    ) {
        let mut m = meta();
        m.fiscal_year = year;
        m.fiscal_period = period.map(str::to_string);
        let record = normalize(&RawFiling::new(m, String::new())).unwrap();
        assert_eq!(record.classification, expected);
    }

    #[test]
    fn test_rejects_missing_security_code() {
        let mut m = meta();
        m.sec_code = Some("  ".to_string());
        let err = normalize(&RawFiling::new(m, String::new())).unwrap_err();
        assert!(err.is_malformed_record());
    }

    #[test]
    fn test_rejects_missing_document_id() {
        let mut m = meta();
        m.doc_id = String::new();
        let err = normalize(&RawFiling::new(m, String::new())).unwrap_err();
        assert!(err.is_malformed_record());
    }

    #[rstest]
    #[case(None)]
    #[case(Some("yesterday"))]
    fn test_rejects_bad_submission_date(#[case] submitted: Option<&str>) {
        let mut m = meta();
        m.submit_date_time = submitted.map(str::to_string);
        let err = normalize(&RawFiling::new(m, String::new())).unwrap_err();
        assert!(err.is_malformed_record());
    }

    #[test]
    fn test_empty_document_gives_absent_figures() {
        let record = normalize(&RawFiling::new(meta(), String::new())).unwrap();
        assert_eq!(record.figures(), FinancialFigures::default());
    }

    #[test]
    fn test_parse_submit_date_variants() {
        let expected = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        assert_eq!(parse_submit_date("2025-07-01 09:15").unwrap(), expected);
        assert_eq!(parse_submit_date("2025-07-01").unwrap(), expected);
        assert!(parse_submit_date("07/01/2025").is_err());
    }

    #[test]
    fn test_document_meta_from_listing_json() {
        let json = r#"{
            "seqNumber": 1,
            "docID": "S100W0AB",
            "edinetCode": "E02144",
            "secCode": "72030",
            "filerName": "トヨタ自動車株式会社",
            "docDescription": "有価証券報告書",
            "submitDateTime": "2025-06-18 15:00",
            "xbrlFlag": "1",
            "fiscalYear": "2025",
            "fiscalPeriod": "FY"
        }"#;
        let meta: DocumentMeta = serde_json::from_str(json).unwrap();
        assert!(meta.has_xbrl());
        assert_eq!(meta.security_code(), Some("72030"));
        assert_eq!(meta.fiscal_year, Some(2025));
    }

    #[test]
    fn test_document_meta_null_fields() {
        let json = r#"{"docID": "S100W0AC", "secCode": null, "xbrlFlag": "0"}"#;
        let meta: DocumentMeta = serde_json::from_str(json).unwrap();
        assert!(!meta.has_xbrl());
        assert_eq!(meta.security_code(), None);
        assert_eq!(meta.fiscal_year, None);
    }

    #[test]
    fn test_validate_record() {
        let record = normalize(&RawFiling::new(meta(), String::new())).unwrap();
        assert!(record.validate().is_ok());

        let mut missing = record;
        missing.security_code.clear();
        assert!(missing.validate().unwrap_err().is_malformed_record());
    }
}
