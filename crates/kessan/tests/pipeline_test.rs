//! Integration tests for the daily pipeline

use approx::assert_relative_eq;
use chrono::NaiveDate;
use kessan::data::edinet::FinancialFigures;
use kessan::data::{ConsensusRecord, FilingRecord, FiscalPeriod};
use kessan::diff::DiffRow;
use kessan::{
    ConsensusSink, ConsensusSource, DiffSink, DiffSource, FilingSink, FilingSource, SqliteStore,
    run_daily_diff,
};

/// Store that keeps nothing but a log of diff table replacements.
#[derive(Debug, Default)]
struct RecordingStore {
    filings: Vec<FilingRecord>,
    replacements: Vec<(NaiveDate, Vec<DiffRow>)>,
}

impl FilingSource for RecordingStore {
    fn load_filings(&self) -> kessan::Result<Vec<FilingRecord>> {
        Ok(self.filings.clone())
    }
}

impl ConsensusSource for RecordingStore {
    fn load_consensus(&self) -> kessan::Result<Vec<ConsensusRecord>> {
        Ok(Vec::new())
    }
}

impl DiffSink for RecordingStore {
    fn replace_diff(&mut self, date: NaiveDate, rows: &[DiffRow]) -> kessan::Result<()> {
        self.replacements.push((date, rows.to_vec()));
        Ok(())
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 30).unwrap()
}

fn filing(
    id: &str,
    code: &str,
    submit_date: NaiveDate,
    fiscal_year: i32,
    revenue: Option<f64>,
    eps: Option<f64>,
) -> FilingRecord {
    FilingRecord::new(
        id,
        code,
        submit_date,
        Some(fiscal_year),
        Some(FiscalPeriod::Q1),
        FinancialFigures {
            revenue,
            earnings_per_share: eps,
            ..FinancialFigures::default()
        },
    )
}

#[test]
fn test_empty_day_still_replaces_the_table() {
    let mut store = RecordingStore {
        filings: vec![filing(
            "S1",
            "7203",
            NaiveDate::from_ymd_opt(2024, 7, 31).unwrap(),
            2024,
            Some(1000.0),
            None,
        )],
        ..RecordingStore::default()
    };

    let run = run_daily_diff(&mut store, today()).unwrap();

    assert!(run.is_empty());
    assert_eq!(run.filings, 0);
    assert_eq!(store.replacements, vec![(today(), Vec::<DiffRow>::new())]);
}

#[test]
fn test_malformed_filings_are_counted() {
    let mut store = RecordingStore::default();
    store
        .filings
        .push(filing("", "7203", today(), 2025, Some(1.0), None));
    store
        .filings
        .push(filing("S2", "6758", today(), 2025, Some(1.0), None));

    let run = run_daily_diff(&mut store, today()).unwrap();

    // The id-less filing is rejected both as a current and as a historical record
    assert_eq!(run.batch.rejected, 2);
    assert_eq!(run.batch.rows.len(), 1);
    assert_eq!(store.replacements[0].1[0].security_code, "6758");
}

#[test]
fn test_daily_run_against_sqlite() {
    let mut store = SqliteStore::in_memory().unwrap();
    let last_year = NaiveDate::from_ymd_opt(2024, 7, 31).unwrap();

    store
        .append_filings(&[
            filing("S100A", "7203", last_year, 2024, Some(1000.0), Some(100.0)),
            filing("S100B", "6758", last_year, 2024, Some(0.0), Some(50.0)),
            filing("S100C", "7203", today(), 2025, Some(1100.0), Some(120.0)),
            filing("S100D", "6758", today(), 2025, Some(400.0), Some(60.0)),
            filing("S100E", "9999", today(), 2025, Some(500.0), None),
        ])
        .unwrap();
    store
        .upsert_consensus(&[
            ConsensusRecord::new("7203", today()).with_analyst(Some(1000.0), Some(100.0)),
            ConsensusRecord::new("6758", today()).with_analyst(Some(320.0), Some(0.0)),
        ])
        .unwrap();
    assert_eq!(store.load_consensus().unwrap().len(), 2);

    let run = run_daily_diff(&mut store, today()).unwrap();
    assert_eq!(run.filings, 3);

    let rows = store.load_diff().unwrap();
    assert_eq!(rows, run.batch.rows);
    assert_eq!(store.diff_date().unwrap(), Some(today()));

    let codes: Vec<&str> = rows.iter().map(|r| r.security_code.as_str()).collect();
    assert_eq!(codes, vec!["6758", "7203", "9999"]);

    // 6758: zero revenue base, zero EPS estimate
    assert_eq!(rows[0].revenue_yoy_pct, None);
    assert_relative_eq!(rows[0].eps_yoy_pct.unwrap(), 20.0);
    assert_relative_eq!(rows[0].revenue_surprise_pct.unwrap(), 25.0);
    assert_eq!(rows[0].eps_surprise_pct, None);

    assert_relative_eq!(rows[1].revenue_yoy_pct.unwrap(), 10.0);
    assert_relative_eq!(rows[1].eps_surprise_pct.unwrap(), 20.0);

    assert_eq!(
        rows[2],
        DiffRow {
            security_code: "9999".to_string(),
            revenue_yoy_pct: None,
            eps_yoy_pct: None,
            revenue_surprise_pct: None,
            eps_surprise_pct: None,
        }
    );

    // A later day without filings clears the table.
    let tomorrow = today().succ_opt().unwrap();
    run_daily_diff(&mut store, tomorrow).unwrap();
    assert!(store.load_diff().unwrap().is_empty());
    assert_eq!(store.diff_date().unwrap(), Some(tomorrow));
}
