//! Where filings, consensus and diff rows live between runs.
//!
//! The pipeline only talks to these traits. [`SqliteStore`] is the
//! persistent implementation, [`MemoryStore`] keeps everything in memory.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, StoreStats};

use crate::error::Result;
use chrono::NaiveDate;
use kessan_data::{ConsensusRecord, FilingRecord, WatchedSecurity};
use kessan_diff::DiffRow;

/// Read access to stored filings.
pub trait FilingSource {
    /// All stored filings in insertion order.
    fn load_filings(&self) -> Result<Vec<FilingRecord>>;

    /// Filings submitted on `date`, in insertion order.
    fn filings_submitted_on(&self, date: NaiveDate) -> Result<Vec<FilingRecord>> {
        Ok(self
            .load_filings()?
            .into_iter()
            .filter(|f| f.submit_date == date)
            .collect())
    }
}

/// Append-only filing storage.
pub trait FilingSink {
    /// Adds filings whose document id is not stored yet and leaves the others
    /// untouched. Returns the number of rows added.
    fn append_filings(&mut self, rows: &[FilingRecord]) -> Result<usize>;
}

/// Read access to the consensus table.
pub trait ConsensusSource {
    /// One record per security code.
    fn load_consensus(&self) -> Result<Vec<ConsensusRecord>>;
}

/// Consensus storage keyed by security code.
pub trait ConsensusSink {
    /// Replaces the stored record of each security unless the stored one was
    /// scraped later. Returns the number of records written.
    fn upsert_consensus(&mut self, rows: &[ConsensusRecord]) -> Result<usize>;
}

/// Full-replace storage of the diff table.
pub trait DiffSink {
    /// Clears the table and writes `rows` in order, recording `date` as the
    /// day they were computed for. An empty slice leaves an empty table.
    fn replace_diff(&mut self, date: NaiveDate, rows: &[DiffRow]) -> Result<()>;
}

/// Read access to the diff table.
pub trait DiffSource {
    /// The rows written by the last [`DiffSink::replace_diff`], in order.
    fn load_diff(&self) -> Result<Vec<DiffRow>>;

    /// The day of the last [`DiffSink::replace_diff`], or `None` before the
    /// first one.
    fn diff_date(&self) -> Result<Option<NaiveDate>>;
}

/// The list of tracked securities.
pub trait WatchListStore {
    /// Stored entries ordered by security code.
    fn load_watch_list(&self) -> Result<Vec<WatchedSecurity>>;

    /// Replaces the whole list.
    fn replace_watch_list(&mut self, entries: &[WatchedSecurity]) -> Result<()>;
}
