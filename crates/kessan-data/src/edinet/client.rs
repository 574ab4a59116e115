//! EDINET API v2 client with rate limiting.

use super::filings::{DocumentMeta, RawFiling};
use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::{Cursor, Read};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// EDINET API v2 base URL
pub const EDINET_BASE_URL: &str = "https://api.edinet-fsa.go.jp/api/v2";

/// Default pause between requests
const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(300);

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Query parameter carrying the subscription key
const SUBSCRIPTION_KEY_PARAM: &str = "Subscription-Key";

/// `type` parameter of `documents.json`: listing with document metadata
const LIST_TYPE_METADATA: &str = "2";

/// `type` parameter of `documents/{id}`: ZIP archive of the XBRL submission
const DOCUMENT_TYPE_XBRL: &str = "5";

/// Envelope of the `documents.json` response.
#[derive(Debug, Deserialize)]
struct DocumentListResponse {
    #[serde(default)]
    metadata: Option<ListMetadata>,
    #[serde(default)]
    results: Option<Vec<DocumentMeta>>,
    // Authentication failures come back as {"statusCode": 401, "message": ...}
    #[serde(default, rename = "statusCode")]
    status_code: Option<u16>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListMetadata {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Parses a `documents.json` body into its document entries.
///
/// # Errors
///
/// Returns [`DataError::EdinetApi`] when the body reports a non-200 status or
/// carries no `results` array.
pub fn parse_document_list(json: &str) -> Result<Vec<DocumentMeta>> {
    let response: DocumentListResponse = serde_json::from_str(json)?;

    if let Some(code) = response.status_code {
        return Err(DataError::EdinetApi(format!(
            "status {}: {}",
            code,
            response.message.unwrap_or_default()
        )));
    }

    if let Some(meta) = &response.metadata {
        let status = meta.status.as_deref().unwrap_or("200");
        if status != "200" {
            return Err(DataError::EdinetApi(format!(
                "status {}: {}",
                status,
                meta.message.as_deref().unwrap_or_default()
            )));
        }
    }

    response
        .results
        .ok_or_else(|| DataError::EdinetApi("document list has no results".to_string()))
}

/// Reads the XBRL instance document out of an EDINET submission archive.
///
/// The first entry whose name ends in `.xbrl` is used. Invalid UTF-8 is
/// replaced rather than rejected.
pub fn read_xbrl_from_zip(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if !entry.name().ends_with(".xbrl") {
            continue;
        }
        let mut content = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry.read_to_end(&mut content)?;
        return Ok(String::from_utf8_lossy(&content).into_owned());
    }

    Err(DataError::EdinetApi(
        "archive contains no .xbrl instance".to_string(),
    ))
}

/// Request URLs carry the subscription key, so it is stripped from errors.
fn network_error(err: reqwest::Error) -> DataError {
    DataError::Network(err.without_url())
}

/// Rate limiter so consecutive requests keep a minimum spacing
#[derive(Debug)]
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Instant::now() - min_interval,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// EDINET API v2 client with rate limiting
pub struct EdinetClient {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    base_url: String,
    api_key: String,
}

impl EdinetClient {
    /// Create a new client for the public EDINET endpoint
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, EDINET_BASE_URL)
    }

    /// Create a client against a different API root (e.g. a mirror or a v1 endpoint)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Self::with_rate_limit(api_key, base_url, DEFAULT_RATE_LIMIT)
    }

    /// Create a client with a custom minimum interval between requests
    pub fn with_rate_limit(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        min_interval: Duration,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DataError::EdinetApi("empty subscription key".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(min_interval))),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// API root this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<reqwest::Response> {
        self.rate_limiter.lock().await.wait().await;

        let response = self
            .client
            .get(url)
            .query(query)
            .query(&[(SUBSCRIPTION_KEY_PARAM, self.api_key.as_str())])
            .send()
            .await
            .map_err(network_error)?;

        if !response.status().is_success() {
            return Err(DataError::Http(format!(
                "EDINET returned status {} for {}",
                response.status(),
                url
            )));
        }
        Ok(response)
    }

    /// List all documents submitted on `date`
    pub async fn list_documents(&self, date: NaiveDate) -> Result<Vec<DocumentMeta>> {
        let url = format!("{}/documents.json", self.base_url);
        let date = date.format("%Y-%m-%d").to_string();
        let response = self
            .get(&url, &[("date", date.as_str()), ("type", LIST_TYPE_METADATA)])
            .await?;

        let body = response.text().await.map_err(network_error)?;
        let documents = parse_document_list(&body)?;
        debug!(date = %date, count = documents.len(), "listed EDINET documents");
        Ok(documents)
    }

    /// Download the submission archive of a document and return its XBRL instance text
    pub async fn fetch_xbrl(&self, doc_id: &str) -> Result<String> {
        if doc_id.trim().is_empty() {
            return Err(DataError::EdinetApi("empty document id".to_string()));
        }

        let url = format!("{}/documents/{}", self.base_url, doc_id);
        let response = self.get(&url, &[("type", DOCUMENT_TYPE_XBRL)]).await?;
        let bytes = response.bytes().await.map_err(network_error)?;
        debug!(doc_id, size = bytes.len(), "downloaded submission archive");

        read_xbrl_from_zip(&bytes)
    }

    /// Fetch the XBRL instance for a listed document
    pub async fn fetch_raw_filing(&self, meta: &DocumentMeta) -> Result<RawFiling> {
        let xbrl = self.fetch_xbrl(&meta.doc_id).await?;
        Ok(RawFiling::new(meta.clone(), xbrl))
    }
}

impl std::fmt::Debug for EdinetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdinetClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
