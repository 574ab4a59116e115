//! Integration tests for filing retrieval

use chrono::NaiveDate;
use kessan::data::WatchList;
use kessan::data::WatchedSecurity;
use kessan::data::edinet::{DocumentMeta, RawFiling};
use kessan::data::{DataError, FiscalPeriod};
use kessan::{DocumentSource, fetch_filings};
use std::collections::HashMap;

/// Serves a fixed listing and XBRL bodies keyed by document id.
#[derive(Debug, Default)]
struct FakeSource {
    listing: Vec<DocumentMeta>,
    xbrl: HashMap<String, String>,
}

impl DocumentSource for FakeSource {
    async fn list_documents(&self, _date: NaiveDate) -> kessan::data::Result<Vec<DocumentMeta>> {
        Ok(self.listing.clone())
    }

    async fn fetch_raw_filing(&self, meta: &DocumentMeta) -> kessan::data::Result<RawFiling> {
        self.xbrl
            .get(&meta.doc_id)
            .map(|xbrl| RawFiling::new(meta.clone(), xbrl.clone()))
            .ok_or_else(|| DataError::Http(format!("404 for {}", meta.doc_id)))
    }
}

fn meta(doc_id: &str, sec_code: Option<&str>, xbrl: bool) -> DocumentMeta {
    DocumentMeta {
        doc_id: doc_id.to_string(),
        sec_code: sec_code.map(str::to_string),
        submit_date_time: Some("2025-07-30 15:00".to_string()),
        xbrl_flag: Some(if xbrl { "1" } else { "0" }.to_string()),
        fiscal_year: Some(2025),
        fiscal_period: Some("Q1".to_string()),
        ..DocumentMeta::default()
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 30).unwrap()
}

fn source() -> FakeSource {
    let mut listing = vec![
        meta("S100A", Some("72030"), true),
        meta("S100B", Some("67580"), true),
        meta("S100C", Some("99840"), false),
        meta("S100D", None, true),
        meta("S100E", Some("83060"), true),
    ];
    listing[1].submit_date_time = Some("soon".to_string());

    let xbrl = HashMap::from([
        (
            "S100A".to_string(),
            "<jpcrp_cor:NetSales contextRef=\"CurrentYTDDuration\">12253360</jpcrp_cor:NetSales>"
                .to_string(),
        ),
        ("S100B".to_string(), String::new()),
    ]);
    FakeSource { listing, xbrl }
}

#[tokio::test]
async fn test_fetch_skips_failures_and_rejects() {
    let mut seen = Vec::new();
    let outcome = fetch_filings(&source(), date(), &WatchList::default(), None, |m| {
        seen.push(m.doc_id.clone())
    })
    .await
    .unwrap();

    assert_eq!(outcome.listed, 5);
    assert_eq!(outcome.selected, 3);
    assert_eq!(seen, vec!["S100A", "S100B", "S100E"]);
    // S100B has no usable submission date, S100E cannot be downloaded
    assert_eq!(outcome.rejected, 1);
    assert_eq!(outcome.failed, 1);

    assert_eq!(outcome.records.len(), 1);
    let toyota = &outcome.records[0];
    assert_eq!(toyota.security_code, "7203");
    assert_eq!(toyota.submit_date, date());
    assert_eq!(toyota.fiscal_period, Some(FiscalPeriod::Q1));
    assert_eq!(toyota.classification, "FY2025Q1");
    assert_eq!(toyota.revenue, Some(12_253_360.0));
    assert_eq!(toyota.earnings_per_share, None);
}

#[tokio::test]
async fn test_fetch_honors_watch_list_and_cap() {
    let watched = [WatchedSecurity::new("72030"), WatchedSecurity::new("83060")];
    let outcome = fetch_filings(&source(), date(), &WatchList::new(&watched), Some(1), |_| {})
        .await
        .unwrap();

    assert_eq!(outcome.selected, 1);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].document_id, "S100A");
}
