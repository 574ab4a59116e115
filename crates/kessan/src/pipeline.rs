//! The daily diff run.

use crate::error::Result;
use crate::store::{ConsensusSource, DiffSink, FilingSource};
use chrono::NaiveDate;
use kessan_diff::{DiffBatch, build_diff};
use tracing::info;

/// Result of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRun {
    /// Submission date the run covered
    pub date: NaiveDate,
    /// Filings submitted on `date`
    pub filings: usize,
    /// The rows written to the diff table
    pub batch: DiffBatch,
}

impl DailyRun {
    /// Returns true if nothing was filed on `date`.
    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }
}

/// Recomputes the diff table for filings submitted on `date`.
///
/// Every stored filing serves as history. The table is replaced even when
/// there are no filings for `date`, which leaves it empty.
///
/// # Errors
///
/// Only store failures are errors; malformed records are skipped and
/// counted in [`DiffBatch::rejected`].
pub fn run_daily_diff<S>(store: &mut S, date: NaiveDate) -> Result<DailyRun>
where
    S: FilingSource + ConsensusSource + DiffSink,
{
    let historical = store.load_filings()?;
    let current: Vec<_> = historical
        .iter()
        .filter(|f| f.submit_date == date)
        .cloned()
        .collect();
    let consensus = store.load_consensus()?;

    let batch = build_diff(&current, &historical, &consensus);
    store.replace_diff(date, &batch.rows)?;

    if batch.is_empty() {
        info!(%date, "no filings submitted; diff table cleared");
    } else {
        info!(
            %date,
            filings = current.len(),
            rows = batch.rows.len(),
            rejected = batch.rejected,
            "diff table replaced"
        );
    }

    Ok(DailyRun {
        date,
        filings: current.len(),
        batch,
    })
}
