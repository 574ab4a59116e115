//! Retrieval of one day's filings.

use chrono::NaiveDate;
use kessan_data::edinet::{DocumentMeta, EdinetClient, Normalizer, RawFiling};
use kessan_data::{FilingRecord, WatchList};
use std::future::Future;
use tracing::{info, warn};

/// Anything that can list a day's documents and download them.
pub trait DocumentSource {
    /// Documents submitted on `date`.
    fn list_documents(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = kessan_data::Result<Vec<DocumentMeta>>> + Send;

    /// The XBRL instance of a listed document.
    fn fetch_raw_filing(
        &self,
        meta: &DocumentMeta,
    ) -> impl Future<Output = kessan_data::Result<RawFiling>> + Send;
}

impl DocumentSource for EdinetClient {
    async fn list_documents(&self, date: NaiveDate) -> kessan_data::Result<Vec<DocumentMeta>> {
        Self::list_documents(self, date).await
    }

    async fn fetch_raw_filing(&self, meta: &DocumentMeta) -> kessan_data::Result<RawFiling> {
        Self::fetch_raw_filing(self, meta).await
    }
}

/// What a fetch produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    /// Documents in the day's listing
    pub listed: usize,
    /// Documents with XBRL on the watch list, after the document cap
    pub selected: usize,
    /// Normalized filings in listing order
    pub records: Vec<FilingRecord>,
    /// Documents whose download failed
    pub failed: usize,
    /// Downloaded documents rejected by the normalizer
    pub rejected: usize,
}

/// Lists the documents of `date`, downloads those with XBRL whose security is
/// on `watch_list`, and normalizes them.
///
/// At most `max_docs` documents are downloaded. A failed download or a
/// rejected document is logged and skipped; `on_document` is called before
/// each download.
///
/// # Errors
///
/// Fails only when the listing itself cannot be retrieved.
pub async fn fetch_filings<S, F>(
    source: &S,
    date: NaiveDate,
    watch_list: &WatchList,
    max_docs: Option<usize>,
    mut on_document: F,
) -> kessan_data::Result<FetchOutcome>
where
    S: DocumentSource,
    F: FnMut(&DocumentMeta),
{
    let listing = source.list_documents(date).await?;
    let selected: Vec<&DocumentMeta> = listing
        .iter()
        .filter(|doc| doc.has_xbrl())
        .filter(|doc| doc.security_code().is_some_and(|code| watch_list.admits(code)))
        .take(max_docs.unwrap_or(usize::MAX))
        .collect();
    info!(
        %date,
        listed = listing.len(),
        selected = selected.len(),
        "fetching EDINET filings"
    );

    let normalizer = Normalizer::new();
    let mut outcome = FetchOutcome {
        listed: listing.len(),
        selected: selected.len(),
        ..FetchOutcome::default()
    };

    for meta in selected {
        on_document(meta);
        let raw = match source.fetch_raw_filing(meta).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(doc_id = %meta.doc_id, error = %e, "skipping document");
                outcome.failed += 1;
                continue;
            }
        };
        match normalizer.normalize(&raw) {
            Ok(record) => outcome.records.push(record),
            Err(e) => {
                warn!(doc_id = %meta.doc_id, error = %e, "rejecting document");
                outcome.rejected += 1;
            }
        }
    }

    Ok(outcome)
}
