//! Choosing which filings take part in a comparison.
//!
//! A security can file more than once on a day (an amendment after the
//! original) and can have several filings for the same fiscal year. In both
//! cases the filing submitted last wins; for equal submission dates the one
//! that came first in the input is kept.

use kessan_data::FilingRecord;
use std::collections::{BTreeMap, HashMap};

fn supersedes(candidate: &FilingRecord, kept: &FilingRecord) -> bool {
    candidate.submit_date > kept.submit_date
}

/// One filing per security code, ordered by security code.
pub fn select_current(current: &[FilingRecord]) -> BTreeMap<&str, &FilingRecord> {
    let mut selected: BTreeMap<&str, &FilingRecord> = BTreeMap::new();
    for filing in current {
        selected
            .entry(filing.security_code.as_str())
            .and_modify(|kept| {
                if supersedes(filing, kept) {
                    *kept = filing;
                }
            })
            .or_insert(filing);
    }
    selected
}

/// Historical filings keyed by (security code, fiscal year).
///
/// Filings without a fiscal year cannot be matched and are left out.
pub fn index_by_fiscal_year(historical: &[FilingRecord]) -> HashMap<(&str, i32), &FilingRecord> {
    let mut index: HashMap<(&str, i32), &FilingRecord> = HashMap::new();
    for filing in historical {
        let Some(year) = filing.fiscal_year else {
            continue;
        };
        index
            .entry((filing.security_code.as_str(), year))
            .and_modify(|kept| {
                if supersedes(filing, kept) {
                    *kept = filing;
                }
            })
            .or_insert(filing);
    }
    index
}
