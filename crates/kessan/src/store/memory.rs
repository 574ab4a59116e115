//! In-memory store.

use super::{
    ConsensusSink, ConsensusSource, DiffSink, DiffSource, FilingSink, FilingSource,
    WatchListStore,
};
use crate::error::Result;
use chrono::NaiveDate;
use kessan_data::{ConsensusRecord, FilingRecord, WatchedSecurity};
use kessan_diff::DiffRow;
use std::collections::{BTreeMap, HashSet};

/// A store backed by plain collections, with the same semantics as
/// [`SqliteStore`](super::SqliteStore).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    filings: Vec<FilingRecord>,
    document_ids: HashSet<String>,
    consensus: BTreeMap<String, ConsensusRecord>,
    diff: Vec<DiffRow>,
    diff_date: Option<NaiveDate>,
    diff_replacements: usize,
    watch_list: BTreeMap<String, WatchedSecurity>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the diff table has been replaced.
    pub const fn diff_replacements(&self) -> usize {
        self.diff_replacements
    }
}

impl FilingSource for MemoryStore {
    fn load_filings(&self) -> Result<Vec<FilingRecord>> {
        Ok(self.filings.clone())
    }
}

impl FilingSink for MemoryStore {
    fn append_filings(&mut self, rows: &[FilingRecord]) -> Result<usize> {
        let mut added = 0;
        for row in rows {
            if self.document_ids.insert(row.document_id.clone()) {
                self.filings.push(row.clone());
                added += 1;
            }
        }
        Ok(added)
    }
}

impl ConsensusSource for MemoryStore {
    fn load_consensus(&self) -> Result<Vec<ConsensusRecord>> {
        Ok(self.consensus.values().cloned().collect())
    }
}

impl ConsensusSink for MemoryStore {
    fn upsert_consensus(&mut self, rows: &[ConsensusRecord]) -> Result<usize> {
        let mut written = 0;
        for row in rows {
            let stale = self
                .consensus
                .get(&row.security_code)
                .is_some_and(|stored| stored.scrape_date > row.scrape_date);
            if !stale {
                self.consensus.insert(row.security_code.clone(), row.clone());
                written += 1;
            }
        }
        Ok(written)
    }
}

impl DiffSink for MemoryStore {
    fn replace_diff(&mut self, date: NaiveDate, rows: &[DiffRow]) -> Result<()> {
        self.diff = rows.to_vec();
        self.diff_date = Some(date);
        self.diff_replacements += 1;
        Ok(())
    }
}

impl DiffSource for MemoryStore {
    fn load_diff(&self) -> Result<Vec<DiffRow>> {
        Ok(self.diff.clone())
    }

    fn diff_date(&self) -> Result<Option<NaiveDate>> {
        Ok(self.diff_date)
    }
}

impl WatchListStore for MemoryStore {
    fn load_watch_list(&self) -> Result<Vec<WatchedSecurity>> {
        Ok(self.watch_list.values().cloned().collect())
    }

    fn replace_watch_list(&mut self, entries: &[WatchedSecurity]) -> Result<()> {
        self.watch_list = entries
            .iter()
            .map(|e| (e.security_code.clone(), e.clone()))
            .collect();
        Ok(())
    }
}
