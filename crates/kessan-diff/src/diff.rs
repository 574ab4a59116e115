//! Assembly of the daily diff table.

use crate::surprise::{Surprise, compute_surprise};
use crate::yoy::{YoyChange, compute_yoy};
use kessan_data::consensus::latest_by_security;
use kessan_data::{ConsensusRecord, FilingRecord};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, warn};

/// One security's differentials, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffRow {
    /// Securities code
    pub security_code: String,
    /// Revenue change against the prior fiscal year
    pub revenue_yoy_pct: Option<f64>,
    /// EPS change against the prior fiscal year
    pub eps_yoy_pct: Option<f64>,
    /// Revenue over analyst consensus
    pub revenue_surprise_pct: Option<f64>,
    /// EPS over analyst consensus
    pub eps_surprise_pct: Option<f64>,
}

impl DiffRow {
    /// Combines the two comparisons of one security.
    pub fn new(security_code: impl Into<String>, yoy: YoyChange, surprise: Surprise) -> Self {
        Self {
            security_code: security_code.into(),
            revenue_yoy_pct: yoy.revenue,
            eps_yoy_pct: yoy.eps,
            revenue_surprise_pct: surprise.revenue,
            eps_surprise_pct: surprise.eps,
        }
    }
}

/// Diff rows with the number of input records left out as malformed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffBatch {
    /// Rows in report order
    pub rows: Vec<DiffRow>,
    /// Malformed input records that were skipped
    pub rejected: usize,
}

impl DiffBatch {
    /// Returns true if no row was produced.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Revenue surprise descending, rows without one last, then security code.
fn report_order(a: &DiffRow, b: &DiffRow) -> Ordering {
    match (a.revenue_surprise_pct, b.revenue_surprise_pct) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.security_code.cmp(&b.security_code))
}

/// Sorts rows into report order.
pub fn sort_rows(rows: &mut [DiffRow]) {
    rows.sort_by(report_order);
}

/// Keeps the records that pass `is_valid`, counting the rest.
fn retain_valid<T: Clone>(
    records: &[T],
    rejected: &mut usize,
    is_valid: impl Fn(&T) -> kessan_data::Result<()>,
) -> Vec<T> {
    records
        .iter()
        .filter(|record| match is_valid(*record) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "skipping malformed record");
                *rejected += 1;
                false
            }
        })
        .cloned()
        .collect()
}

/// Builds the diff table for the filings of one day.
///
/// `current` holds the day's filings, `historical` every stored filing (it may
/// include `current`), `consensus` any number of consensus records. Records
/// failing validation are skipped and counted; missing figures only make the
/// affected percentages absent. One row is produced per security in
/// `current`, in report order.
pub fn build_diff(
    current: &[FilingRecord],
    historical: &[FilingRecord],
    consensus: &[ConsensusRecord],
) -> DiffBatch {
    let mut rejected = 0;
    let current = retain_valid(current, &mut rejected, FilingRecord::validate);
    let historical = retain_valid(historical, &mut rejected, FilingRecord::validate);
    let consensus = retain_valid(consensus, &mut rejected, ConsensusRecord::validate);

    let yoy = compute_yoy(&current, &historical);
    let mut surprise = compute_surprise(&current, &latest_by_security(consensus));

    let mut rows: Vec<DiffRow> = yoy
        .into_iter()
        .map(|(code, change)| {
            let vs_consensus = surprise.remove(&code).unwrap_or_default();
            DiffRow::new(code, change, vs_consensus)
        })
        .collect();
    sort_rows(&mut rows);

    debug!(rows = rows.len(), rejected, "built diff table");
    DiffBatch { rows, rejected }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use kessan_data::edinet::FinancialFigures;

    fn row(code: &str, revenue_surprise: Option<f64>) -> DiffRow {
        DiffRow {
            security_code: code.to_string(),
            revenue_yoy_pct: None,
            eps_yoy_pct: None,
            revenue_surprise_pct: revenue_surprise,
            eps_surprise_pct: None,
        }
    }

    fn filing(code: &str, year: i32, revenue: f64, eps: f64) -> FilingRecord {
        FilingRecord::new(
            format!("S-{code}-{year}"),
            code,
            NaiveDate::from_ymd_opt(year, 6, 18).unwrap(),
            Some(year),
            None,
            FinancialFigures {
                revenue: Some(revenue),
                earnings_per_share: Some(eps),
                ..FinancialFigures::default()
            },
        )
    }

    #[test]
    fn test_sort_rows() {
        let mut rows = vec![
            row("1111", None),
            row("2222", Some(-3.0)),
            row("3333", Some(12.5)),
            row("0000", None),
            row("4444", Some(12.5)),
            row("5555", Some(0.0)),
        ];
        sort_rows(&mut rows);

        let order: Vec<&str> = rows.iter().map(|r| r.security_code.as_str()).collect();
        assert_eq!(order, vec!["3333", "4444", "5555", "2222", "0000", "1111"]);
    }

    #[test]
    fn test_build_diff_joins_both_comparisons() {
        let current = vec![filing("7203", 2025, 1100.0, 120.0)];
        let historical = vec![filing("7203", 2024, 1000.0, 100.0), current[0].clone()];
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let consensus = vec![
            ConsensusRecord::new("7203", date).with_analyst(Some(1000.0), Some(96.0)),
        ];

        let batch = build_diff(&current, &historical, &consensus);
        assert_eq!(batch.rejected, 0);
        assert_eq!(batch.rows.len(), 1);

        let row = &batch.rows[0];
        assert_eq!(row.security_code, "7203");
        assert_relative_eq!(row.revenue_yoy_pct.unwrap(), 10.0);
        assert_relative_eq!(row.eps_yoy_pct.unwrap(), 20.0);
        assert_relative_eq!(row.revenue_surprise_pct.unwrap(), 10.0);
        assert_relative_eq!(row.eps_surprise_pct.unwrap(), 25.0);
    }

    #[test]
    fn test_build_diff_rejects_malformed_records() {
        let mut no_code = filing("7203", 2025, 1.0, 1.0);
        no_code.security_code.clear();
        let current = vec![no_code, filing("6758", 2025, 1.0, 1.0)];
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let consensus = vec![ConsensusRecord::new("", date)];

        let batch = build_diff(&current, &[], &consensus);
        assert_eq!(batch.rejected, 2);
        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.rows[0].security_code, "6758");
    }

    #[test]
    fn test_build_diff_empty() {
        let batch = build_diff(&[], &[filing("7203", 2024, 1.0, 1.0)], &[]);
        assert!(batch.is_empty());
        assert_eq!(batch.rejected, 0);
    }
}
