//! Kessan CLI binary.
//!
//! Fetches EDINET filings into the local store, imports watch lists and
//! consensus figures, and computes and reports the daily diff.

mod integration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use integration::dates::{date_range, today_jst};
use integration::store_manager::{open_store, print_store_info};
use kessan::{
    ConsensusSink, ConsensusSource, DiffSource, FilingSink, FilingSource, WatchListStore,
    fetch_filings, run_daily_diff,
};
use kessan_data::consensus::read_consensus_csv;
use kessan_data::edinet::{EDINET_BASE_URL, EdinetClient};
use kessan_data::watch_list::read_watch_list_csv;
use kessan_data::{ConsensusRecord, FilingRecord, WatchList};
use kessan_diff::DiffRow;
use kessan_output::{DailyReport, ExportFormat, Exporter, ReportFormat};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "kessan")]
#[command(about = "Kessan: EDINET earnings extraction and daily diff", long_about = None)]
#[command(version)]
struct Cli {
    /// Path of the store database
    #[arg(long, global = true, env = "KESSAN_DB")]
    db: Option<PathBuf>,

    /// More log output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and normalize filings from EDINET
    Fetch {
        /// Submission date (defaults to today in Japan)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Fetch every day from --date through this date
        #[arg(long)]
        until: Option<NaiveDate>,

        /// EDINET API subscription key
        #[arg(long, env = "EDINET_KEY", hide_env_values = true)]
        edinet_key: Option<String>,

        /// EDINET API root
        #[arg(long, default_value = EDINET_BASE_URL)]
        base_url: String,

        /// Download at most this many documents per day
        #[arg(long)]
        max_docs: Option<usize>,

        /// Minimum milliseconds between EDINET requests
        #[arg(long, default_value_t = 300)]
        interval_ms: u64,

        /// Print the normalized filings as CSV instead of storing them
        #[arg(long)]
        dry_run: bool,

        /// Write the dry-run CSV here instead of stdout
        #[arg(long, requires = "dry_run")]
        output: Option<PathBuf>,
    },

    /// Replace the watch list with a headerless `secCode,companyName,edinetCode` CSV
    Codes {
        /// CSV file to import
        file: PathBuf,
    },

    /// Import analyst consensus from CSV
    Consensus {
        /// CSV file to import
        file: PathBuf,
    },

    /// Recompute the diff table for one submission date
    Diff {
        /// Submission date (defaults to today in Japan)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Render the current diff table for the day it was computed
    Report {
        /// Output format (text, markdown, html or json)
        #[arg(long, default_value = "text")]
        format: ReportFormat,

        /// Write the report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Export stored data
    Export {
        /// What to export
        #[arg(value_enum)]
        table: ExportTable,

        /// Output format (csv, json or pretty-json)
        #[arg(long, default_value = "csv")]
        format: ExportFormat,

        /// Output file (defaults to stdout); the format's extension is added
        /// when it has none
        #[arg(long)]
        output: Option<PathBuf>,

        /// Only filings submitted on this date
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show store location and row counts
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportTable {
    /// The current diff table
    Diff,
    /// Stored filings
    Filings,
    /// Stored consensus records
    Consensus,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    integration::logging::init(cli.verbose);
    let db = cli.db.as_deref();

    match cli.command {
        Commands::Fetch {
            date,
            until,
            edinet_key,
            base_url,
            max_docs,
            interval_ms,
            dry_run,
            output,
        } => {
            let start = date.unwrap_or_else(today_jst);
            let request = FetchRequest {
                days: date_range(start, until.unwrap_or(start))?,
                max_docs,
                dry_run,
                output,
            };
            let api_key = edinet_key.ok_or("missing EDINET key: pass --edinet-key or set EDINET_KEY")?;
            let client = EdinetClient::with_rate_limit(
                api_key,
                base_url,
                Duration::from_millis(interval_ms),
            )?;
            info!(base_url = client.base_url(), interval_ms, "EDINET client ready");
            fetch(db, &client, request).await?;
        }
        Commands::Codes { file } => import_codes(db, &file)?,
        Commands::Consensus { file } => import_consensus(db, &file)?,
        Commands::Diff { date } => diff(db, date.unwrap_or_else(today_jst))?,
        Commands::Report { format, output } => report(db, format, output.as_deref())?,
        Commands::Export {
            table,
            format,
            output,
            date,
        } => export(db, table, format, output.as_deref(), date)?,
        Commands::Status => print_store_info(db)?,
    }

    Ok(())
}

struct FetchRequest {
    days: Vec<NaiveDate>,
    max_docs: Option<usize>,
    dry_run: bool,
    output: Option<PathBuf>,
}

fn progress_bar() -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {pos} documents {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

async fn fetch(
    db: Option<&Path>,
    client: &EdinetClient,
    request: FetchRequest,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(db)?;
    let watch_list = WatchList::new(&store.load_watch_list()?);
    if watch_list.is_empty() {
        println!("Watch list is empty: keeping every listed security");
    } else {
        println!("Watch list: {} securities", watch_list.len());
    }

    let single_day = request.days.len() == 1;
    let mut collected: Vec<FilingRecord> = Vec::new();
    let mut failed_days = 0usize;

    for day in &request.days {
        let pb = progress_bar()?;
        pb.set_message(format!("listing {day}..."));

        let result = fetch_filings(client, *day, &watch_list, request.max_docs, |meta| {
            pb.set_message(format!(
                "{} {}",
                meta.doc_id,
                meta.filer_name.as_deref().unwrap_or_default()
            ));
            pb.inc(1);
        })
        .await;

        let outcome = match result {
            Ok(outcome) => outcome,
            // A single requested day has nothing to fall back on.
            Err(e) if single_day => {
                pb.finish_with_message("Failed!");
                return Err(format!("Failed to list filings for {day}: {e}").into());
            }
            Err(e) => {
                pb.finish_with_message("Failed!");
                warn!(%day, error = %e, "skipping day");
                failed_days += 1;
                continue;
            }
        };

        pb.finish_with_message(format!(
            "{day}: {} listed, {} selected, {} normalized, {} failed, {} rejected",
            outcome.listed,
            outcome.selected,
            outcome.records.len(),
            outcome.failed,
            outcome.rejected
        ));
        collected.extend(outcome.records);
    }

    if failed_days > 0 {
        println!("{failed_days} of {} days could not be listed", request.days.len());
    }

    if request.dry_run {
        match request.output {
            Some(path) => {
                collected.export_to_file(&path, ExportFormat::Csv)?;
                println!("Wrote {} filings to {}", collected.len(), path.display());
            }
            None => print!("{}", collected.export_to_string(ExportFormat::Csv)?),
        }
        return Ok(());
    }

    let added = store.append_filings(&collected)?;
    println!(
        "Stored {added} new filings ({} already present)",
        collected.len() - added
    );
    Ok(())
}

fn import_codes(db: Option<&Path>, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let import = read_watch_list_csv(File::open(file)?)?;
    let mut store = open_store(db)?;
    store.replace_watch_list(&import.records)?;

    println!(
        "Watch list replaced: {} securities ({} rows rejected)",
        import.records.len(),
        import.rejected
    );
    Ok(())
}

fn import_consensus(db: Option<&Path>, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let import = read_consensus_csv(File::open(file)?)?;
    let mut store = open_store(db)?;
    let written = store.upsert_consensus(&import.records)?;

    println!(
        "Consensus updated: {written} of {} records written ({} rows rejected)",
        import.records.len(),
        import.rejected
    );
    Ok(())
}

fn diff(db: Option<&Path>, date: NaiveDate) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(db)?;
    let run = run_daily_diff(&mut store, date)?;

    if run.is_empty() {
        println!("No filings were submitted on {date}; diff table cleared");
    } else {
        println!(
            "Diff for {date}: {} rows from {} filings ({} records rejected)",
            run.batch.rows.len(),
            run.filings,
            run.batch.rejected
        );
    }
    Ok(())
}

fn report(
    db: Option<&Path>,
    format: ReportFormat,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(db)?;
    let report = load_report(&store)?;

    if report.is_empty() {
        info!(date = %report.date, "diff table is empty");
    }
    match output {
        Some(path) => {
            report.write_to(path, format)?;
            println!("Wrote {}", path.display());
        }
        None => print!("{}", report.render(format)?),
    }
    Ok(())
}

/// The stored diff table with the day it was computed for.
fn load_report<S: DiffSource>(store: &S) -> Result<DailyReport, Box<dyn std::error::Error>> {
    let date = store
        .diff_date()?
        .ok_or("no diff has been computed yet; run `kessan diff` first")?;
    Ok(DailyReport::new(date, store.load_diff()?))
}

fn export(
    db: Option<&Path>,
    table: ExportTable,
    format: ExportFormat,
    output: Option<&Path>,
    date: Option<NaiveDate>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(db)?;

    let text = match table {
        ExportTable::Diff => {
            let rows: Vec<DiffRow> = store.load_diff()?;
            rows.export_to_string(format)?
        }
        ExportTable::Filings => {
            let filings: Vec<FilingRecord> = match date {
                Some(date) => store.filings_submitted_on(date)?,
                None => store.load_filings()?,
            };
            filings.export_to_string(format)?
        }
        ExportTable::Consensus => {
            let records: Vec<ConsensusRecord> = store.load_consensus()?;
            records.export_to_string(format)?
        }
    };
    let output = output.map(|path| with_default_extension(path, format));
    write_text(&text, output.as_deref())
}

/// `path` with the format's extension appended when it has none.
fn with_default_extension(path: &Path, format: ExportFormat) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(format.extension())
    }
}

fn write_text(text: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            std::fs::write(path, text)?;
            println!("Wrote {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use kessan::{DiffSink, MemoryStore};

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch_range() {
        let cli = Cli::try_parse_from([
            "kessan",
            "fetch",
            "--date",
            "2025-07-01",
            "--until",
            "2025-07-31",
            "--edinet-key",
            "secret",
            "--max-docs",
            "5",
        ])
        .unwrap();

        match cli.command {
            Commands::Fetch {
                date,
                until,
                max_docs,
                dry_run,
                ..
            } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2025, 7, 1));
                assert_eq!(until, NaiveDate::from_ymd_opt(2025, 7, 31));
                assert_eq!(max_docs, Some(5));
                assert!(!dry_run);
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_output_requires_dry_run() {
        assert!(Cli::try_parse_from(["kessan", "fetch", "--output", "out.csv"]).is_err());
    }

    #[test]
    fn test_parse_report_format() {
        let cli =
            Cli::try_parse_from(["kessan", "report", "--format", "markdown", "--db", "x.db"])
                .unwrap();
        assert_eq!(cli.db.as_deref(), Some(Path::new("x.db")));
        match cli.command {
            Commands::Report { format, .. } => assert_eq!(format, ReportFormat::Markdown),
            _ => panic!("expected report"),
        }

        let cli = Cli::try_parse_from(["kessan", "report", "--format", "html"]).unwrap();
        match cli.command {
            Commands::Report { format, .. } => assert_eq!(format, ReportFormat::Html),
            _ => panic!("expected report"),
        }
    }

    #[test]
    fn test_report_has_no_date_flag() {
        assert!(Cli::try_parse_from(["kessan", "report", "--date", "2025-07-30"]).is_err());
    }

    #[test]
    fn test_report_uses_stored_diff_date() {
        let mut store = MemoryStore::new();
        assert!(load_report(&store).is_err());

        let day = NaiveDate::from_ymd_opt(2025, 7, 28).unwrap();
        store.replace_diff(day, &[]).unwrap();
        let report = load_report(&store).unwrap();
        assert_eq!(report.date, day);
        assert!(report.is_empty());
    }

    #[test]
    fn test_fetch_interval_default() {
        let cli = Cli::try_parse_from(["kessan", "fetch"]).unwrap();
        match cli.command {
            Commands::Fetch { interval_ms, .. } => assert_eq!(interval_ms, 300),
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_with_default_extension() {
        assert_eq!(
            with_default_extension(Path::new("out/diff"), ExportFormat::PrettyJson),
            PathBuf::from("out/diff.json")
        );
        assert_eq!(
            with_default_extension(Path::new("diff.txt"), ExportFormat::Csv),
            PathBuf::from("diff.txt")
        );
    }

    #[test]
    fn test_parse_export() {
        let cli = Cli::try_parse_from(["kessan", "export", "filings", "--format", "json"]).unwrap();
        match cli.command {
            Commands::Export { table, format, .. } => {
                assert_eq!(table, ExportTable::Filings);
                assert_eq!(format, ExportFormat::Json);
            }
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn test_invalid_date_rejected() {
        assert!(Cli::try_parse_from(["kessan", "diff", "--date", "2025-13-01"]).is_err());
    }

    #[test]
    fn test_write_text_to_file() {
        let path = std::env::temp_dir().join(format!("kessan-report-{}.md", process::id()));
        write_text("# Earnings Summary\n", Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Earnings Summary\n");
        std::fs::remove_file(&path).unwrap();
    }
}
