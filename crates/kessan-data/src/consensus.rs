//! Analyst consensus records.
//!
//! One record per security code; a newer import of the same code replaces the
//! older one wholesale. Records are imported from CSV with the header
//! `securityCode,scrapeDate,companyRevenue,companyEps,analystRevenue,analystEps`.

use crate::csv_import::{CsvImport, non_blank, parse_figure};
use crate::edinet::parse_submit_date;
use crate::error::{DataError, Result};
use crate::security_code::canonical_security_code;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;

/// Company guidance and analyst consensus for one security.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusRecord {
    /// Securities code (identity key)
    pub security_code: String,
    /// Date the figures were collected
    pub scrape_date: NaiveDate,
    /// Company full-year revenue forecast
    pub company_revenue: Option<f64>,
    /// Company full-year EPS forecast
    pub company_eps: Option<f64>,
    /// Analyst consensus revenue
    pub analyst_revenue: Option<f64>,
    /// Analyst consensus EPS
    pub analyst_eps: Option<f64>,
}

impl ConsensusRecord {
    /// Creates a record with no figures.
    pub fn new(security_code: impl Into<String>, scrape_date: NaiveDate) -> Self {
        Self {
            security_code: security_code.into(),
            scrape_date,
            company_revenue: None,
            company_eps: None,
            analyst_revenue: None,
            analyst_eps: None,
        }
    }

    /// Sets the analyst consensus figures.
    pub const fn with_analyst(mut self, revenue: Option<f64>, eps: Option<f64>) -> Self {
        self.analyst_revenue = revenue;
        self.analyst_eps = eps;
        self
    }

    /// Sets the company forecast figures.
    pub const fn with_company(mut self, revenue: Option<f64>, eps: Option<f64>) -> Self {
        self.company_revenue = revenue;
        self.company_eps = eps;
        self
    }

    /// Rejects records without a security code.
    pub fn validate(&self) -> Result<()> {
        if self.security_code.trim().is_empty() {
            return Err(DataError::malformed(
                format!("consensus of {}", self.scrape_date),
                "missing security code",
            ));
        }
        Ok(())
    }
}

/// Keeps one record per security code: the latest scrape date wins, and for
/// equal dates the record seen last wins.
pub fn latest_by_security<I>(records: I) -> HashMap<String, ConsensusRecord>
where
    I: IntoIterator<Item = ConsensusRecord>,
{
    let mut latest: HashMap<String, ConsensusRecord> = HashMap::new();
    for record in records {
        match latest.get(&record.security_code) {
            Some(existing) if existing.scrape_date > record.scrape_date => {}
            _ => {
                latest.insert(record.security_code.clone(), record);
            }
        }
    }
    latest
}

/// One CSV row before validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConsensusRow {
    #[serde(default)]
    security_code: Option<String>,
    #[serde(default)]
    scrape_date: Option<String>,
    #[serde(default)]
    company_revenue: Option<String>,
    #[serde(default)]
    company_eps: Option<String>,
    #[serde(default)]
    analyst_revenue: Option<String>,
    #[serde(default)]
    analyst_eps: Option<String>,
}

fn figure(cell: Option<&String>) -> Option<f64> {
    cell.and_then(|c| parse_figure(c))
}

/// Reads consensus records from CSV.
///
/// Rows without a security code or with an unreadable scrape date are
/// rejected and counted; every other problem with a figure makes that figure
/// absent.
///
/// # Errors
///
/// Fails only when the CSV itself cannot be read.
pub fn read_consensus_csv<R: Read>(reader: R) -> Result<CsvImport<ConsensusRecord>> {
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv.headers()?.clone();
    let mut import = CsvImport::new();

    for record in csv.records() {
        let record = record?;
        let line = record.position().map(|p| p.line());
        let row: ConsensusRow = record.deserialize(Some(&headers))?;

        let Some(security_code) = non_blank(row.security_code.as_deref()) else {
            import.reject(line, "missing security code");
            continue;
        };
        let Some(scrape_date) = row
            .scrape_date
            .as_deref()
            .and_then(|d| parse_submit_date(d).ok())
        else {
            import.reject(line, "missing or invalid scrape date");
            continue;
        };

        import.records.push(
            ConsensusRecord::new(canonical_security_code(&security_code), scrape_date)
                .with_company(
                    figure(row.company_revenue.as_ref()),
                    figure(row.company_eps.as_ref()),
                )
                .with_analyst(
                    figure(row.analyst_revenue.as_ref()),
                    figure(row.analyst_eps.as_ref()),
                ),
        );
    }

    Ok(import)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
    }

    #[test]
    fn test_read_consensus_csv() {
        let data = "\
securityCode,scrapeDate,companyRevenue,companyEps,analystRevenue,analystEps
7203,2025-07-01,\"48,500,000\",359.6,\"49,120,000\",372.10
6758,2025-07-01,---,,\"13,200,000\",
,2025-07-01,1,1,1,1
9984,someday,1,1,1,1
83060,2025-07-01,,,1,1
";
        let import = read_consensus_csv(data.as_bytes()).unwrap();

        assert_eq!(import.records.len(), 3);
        assert_eq!(import.rejected, 2);
        assert_eq!(import.records[2].security_code, "8306");

        let toyota = &import.records[0];
        assert_eq!(toyota.security_code, "7203");
        assert_eq!(toyota.scrape_date, date(1));
        assert_eq!(toyota.company_revenue, Some(48_500_000.0));
        assert_eq!(toyota.analyst_eps, Some(372.10));

        let sony = &import.records[1];
        assert_eq!(sony.company_revenue, None);
        assert_eq!(sony.company_eps, None);
        assert_eq!(sony.analyst_revenue, Some(13_200_000.0));
        assert_eq!(sony.analyst_eps, None);
    }

    #[test]
    fn test_read_consensus_csv_header_only() {
        let data = "securityCode,scrapeDate,companyRevenue,companyEps,analystRevenue,analystEps\n";
        let import = read_consensus_csv(data.as_bytes()).unwrap();
        assert!(import.records.is_empty());
        assert_eq!(import.rejected, 0);
    }

    #[test]
    fn test_latest_by_security() {
        let records = vec![
            ConsensusRecord::new("7203", date(2)).with_analyst(Some(1.0), None),
            ConsensusRecord::new("7203", date(1)).with_analyst(Some(2.0), None),
            ConsensusRecord::new("6758", date(1)).with_analyst(Some(3.0), None),
            ConsensusRecord::new("6758", date(1)).with_analyst(Some(4.0), None),
        ];
        let latest = latest_by_security(records);

        assert_eq!(latest.len(), 2);
        assert_eq!(latest["7203"].analyst_revenue, Some(1.0));
        // Same scrape date: the later record replaces the earlier one.
        assert_eq!(latest["6758"].analyst_revenue, Some(4.0));
    }

    #[test]
    fn test_validate() {
        assert!(ConsensusRecord::new("7203", date(1)).validate().is_ok());
        assert!(ConsensusRecord::new(" ", date(1)).validate().is_err());
    }
}
