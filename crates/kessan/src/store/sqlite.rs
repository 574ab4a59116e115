//! SQLite store.

use super::{
    ConsensusSink, ConsensusSource, DiffSink, DiffSource, FilingSink, FilingSource,
    WatchListStore,
};
use crate::error::{Result, StoreError};
use chrono::NaiveDate;
use kessan_data::{ConsensusRecord, FilingRecord, FiscalPeriod, WatchedSecurity};
use kessan_diff::DiffRow;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use tracing::debug;

/// SQLite store for filings, consensus, the diff table and the watch list.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

/// Row counts of each table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Stored filings
    pub filings: usize,
    /// Securities with a consensus record
    pub consensus: usize,
    /// Rows in the current diff table
    pub diff_rows: usize,
    /// Securities on the watch list
    pub watched: usize,
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn period_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<FiscalPeriod>> {
    row.get::<_, Option<String>>(idx)?
        .map(|text| {
            text.parse::<FiscalPeriod>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
            })
        })
        .transpose()
}

fn filing_from_row(row: &Row<'_>) -> rusqlite::Result<FilingRecord> {
    Ok(FilingRecord {
        document_id: row.get(0)?,
        security_code: row.get(1)?,
        submit_date: date_column(row, 2)?,
        fiscal_year: row.get(3)?,
        fiscal_period: period_column(row, 4)?,
        classification: row.get(5)?,
        revenue: row.get(6)?,
        operating_income: row.get(7)?,
        ordinary_income: row.get(8)?,
        profit_attributable_to_parent: row.get(9)?,
        earnings_per_share: row.get(10)?,
    })
}

impl SqliteStore {
    /// Open (or create) the store at `path`, creating missing parent
    /// directories.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        debug!(path = %path.display(), "opened store");
        Ok(store)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS filings (
                document_id TEXT PRIMARY KEY,
                security_code TEXT NOT NULL,
                submit_date TEXT NOT NULL,
                fiscal_year INTEGER,
                fiscal_period TEXT,
                classification TEXT NOT NULL,
                revenue REAL,
                operating_income REAL,
                ordinary_income REAL,
                profit_attributable_to_parent REAL,
                earnings_per_share REAL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_filings_submit_date ON filings(submit_date)",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS consensus (
                security_code TEXT PRIMARY KEY,
                scrape_date TEXT NOT NULL,
                company_revenue REAL,
                company_eps REAL,
                analyst_revenue REAL,
                analyst_eps REAL
            )",
            [],
        )?;

        // Row order is the report order
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS diff_today (
                position INTEGER PRIMARY KEY,
                security_code TEXT NOT NULL,
                revenue_yoy_pct REAL,
                eps_yoy_pct REAL,
                revenue_surprise_pct REAL,
                eps_surprise_pct REAL
            )",
            [],
        )?;

        // Single row: the day the diff table was computed for
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS diff_run (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                run_date TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS watch_list (
                security_code TEXT PRIMARY KEY,
                company_name TEXT,
                edinet_code TEXT
            )",
            [],
        )?;

        Ok(())
    }

    /// Get row counts of every table.
    pub fn stats(&self) -> Result<StoreStats> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 =
                self.conn
                    .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                        row.get(0)
                    })?;
            usize::try_from(n).map_err(|_| StoreError::Corrupt {
                column: "COUNT(*)",
                value: n.to_string(),
            })
        };

        Ok(StoreStats {
            filings: count("filings")?,
            consensus: count("consensus")?,
            diff_rows: count("diff_today")?,
            watched: count("watch_list")?,
        })
    }
}

const FILING_SELECT: &str = "SELECT document_id, security_code, submit_date, fiscal_year,
        fiscal_period, classification, revenue, operating_income, ordinary_income,
        profit_attributable_to_parent, earnings_per_share
     FROM filings";

impl FilingSource for SqliteStore {
    fn load_filings(&self) -> Result<Vec<FilingRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FILING_SELECT} ORDER BY rowid"))?;
        let filings = stmt
            .query_map([], filing_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(filings)
    }

    fn filings_submitted_on(&self, date: NaiveDate) -> Result<Vec<FilingRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{FILING_SELECT} WHERE submit_date = ?1 ORDER BY rowid"
        ))?;
        let filings = stmt
            .query_map(params![date.to_string()], filing_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(filings)
    }
}

impl FilingSink for SqliteStore {
    fn append_filings(&mut self, rows: &[FilingRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut added = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO filings (
                    document_id, security_code, submit_date, fiscal_year, fiscal_period,
                    classification, revenue, operating_income, ordinary_income,
                    profit_attributable_to_parent, earnings_per_share
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for f in rows {
                added += stmt.execute(params![
                    f.document_id,
                    f.security_code,
                    f.submit_date.to_string(),
                    f.fiscal_year,
                    f.fiscal_period.map(|p| p.as_str()),
                    f.classification,
                    f.revenue,
                    f.operating_income,
                    f.ordinary_income,
                    f.profit_attributable_to_parent,
                    f.earnings_per_share,
                ])?;
            }
        }
        tx.commit()?;
        debug!(offered = rows.len(), added, "appended filings");
        Ok(added)
    }
}

impl ConsensusSource for SqliteStore {
    fn load_consensus(&self) -> Result<Vec<ConsensusRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT security_code, scrape_date, company_revenue, company_eps,
                    analyst_revenue, analyst_eps
             FROM consensus
             ORDER BY security_code",
        )?;
        let records = stmt
            .query_map([], |row| {
                Ok(ConsensusRecord {
                    security_code: row.get(0)?,
                    scrape_date: date_column(row, 1)?,
                    company_revenue: row.get(2)?,
                    company_eps: row.get(3)?,
                    analyst_revenue: row.get(4)?,
                    analyst_eps: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

impl ConsensusSink for SqliteStore {
    fn upsert_consensus(&mut self, rows: &[ConsensusRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut written = 0;
        {
            // ISO dates compare correctly as text
            let mut stmt = tx.prepare(
                "INSERT INTO consensus (
                    security_code, scrape_date, company_revenue, company_eps,
                    analyst_revenue, analyst_eps
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(security_code) DO UPDATE SET
                    scrape_date = excluded.scrape_date,
                    company_revenue = excluded.company_revenue,
                    company_eps = excluded.company_eps,
                    analyst_revenue = excluded.analyst_revenue,
                    analyst_eps = excluded.analyst_eps
                WHERE excluded.scrape_date >= consensus.scrape_date",
            )?;
            for c in rows {
                written += stmt.execute(params![
                    c.security_code,
                    c.scrape_date.to_string(),
                    c.company_revenue,
                    c.company_eps,
                    c.analyst_revenue,
                    c.analyst_eps,
                ])?;
            }
        }
        tx.commit()?;
        debug!(offered = rows.len(), written, "upserted consensus");
        Ok(written)
    }
}

impl DiffSink for SqliteStore {
    fn replace_diff(&mut self, date: NaiveDate, rows: &[DiffRow]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM diff_today", [])?;
        tx.execute(
            "INSERT INTO diff_run (id, run_date) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET run_date = excluded.run_date",
            params![date.to_string()],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO diff_today (
                    position, security_code, revenue_yoy_pct, eps_yoy_pct,
                    revenue_surprise_pct, eps_surprise_pct
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (position, r) in (0_i64..).zip(rows) {
                stmt.execute(params![
                    position,
                    r.security_code,
                    r.revenue_yoy_pct,
                    r.eps_yoy_pct,
                    r.revenue_surprise_pct,
                    r.eps_surprise_pct,
                ])?;
            }
        }
        tx.commit()?;
        debug!(%date, rows = rows.len(), "replaced diff table");
        Ok(())
    }
}

impl DiffSource for SqliteStore {
    fn load_diff(&self) -> Result<Vec<DiffRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT security_code, revenue_yoy_pct, eps_yoy_pct,
                    revenue_surprise_pct, eps_surprise_pct
             FROM diff_today
             ORDER BY position",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(DiffRow {
                    security_code: row.get(0)?,
                    revenue_yoy_pct: row.get(1)?,
                    eps_yoy_pct: row.get(2)?,
                    revenue_surprise_pct: row.get(3)?,
                    eps_surprise_pct: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn diff_date(&self) -> Result<Option<NaiveDate>> {
        let date = self
            .conn
            .query_row("SELECT run_date FROM diff_run WHERE id = 1", [], |row| {
                date_column(row, 0)
            })
            .optional()?;
        Ok(date)
    }
}

impl WatchListStore for SqliteStore {
    fn load_watch_list(&self) -> Result<Vec<WatchedSecurity>> {
        let mut stmt = self.conn.prepare(
            "SELECT security_code, company_name, edinet_code
             FROM watch_list
             ORDER BY security_code",
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok(WatchedSecurity {
                    security_code: row.get(0)?,
                    company_name: row.get(1)?,
                    edinet_code: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn replace_watch_list(&mut self, entries: &[WatchedSecurity]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM watch_list", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO watch_list (security_code, company_name, edinet_code)
                 VALUES (?1, ?2, ?3)",
            )?;
            for e in entries {
                stmt.execute(params![e.security_code, e.company_name, e.edinet_code])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
