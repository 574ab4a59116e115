//! Location of the store database.
//!
//! The database lives in the platform data directory unless `--db` or
//! `KESSAN_DB` points elsewhere.

use kessan::{SqliteStore, StoreError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Get the default data directory path.
///
/// Uses platform-specific data directories:
/// - Linux: `~/.local/share/kessan/`
/// - macOS: `~/Library/Application Support/kessan/`
/// - Windows: `%APPDATA%\kessan\`
pub(crate) fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kessan")
}

/// Get the default store database path.
pub(crate) fn default_store_path() -> PathBuf {
    default_data_dir().join("kessan.db")
}

/// The configured path, falling back to the default.
pub(crate) fn store_path(configured: Option<&Path>) -> PathBuf {
    configured.map_or_else(default_store_path, Path::to_path_buf)
}

/// Open the store, creating the directory if needed.
pub(crate) fn open_store(configured: Option<&Path>) -> Result<SqliteStore, StoreError> {
    let path = store_path(configured);
    debug!(path = %path.display(), "opening store");
    SqliteStore::new(&path)
}

/// Print store location and row counts.
pub(crate) fn print_store_info(configured: Option<&Path>) -> Result<(), StoreError> {
    let path = store_path(configured);
    println!("Store: {}", path.display());

    if !path.exists() {
        println!("  (not created yet)");
        return Ok(());
    }

    let stats = SqliteStore::new(&path)?.stats()?;
    println!("  Filings:     {}", stats.filings);
    println!("  Consensus:   {}", stats.consensus);
    println!("  Diff rows:   {}", stats.diff_rows);
    println!("  Watch list:  {}", stats.watched);
    Ok(())
}
