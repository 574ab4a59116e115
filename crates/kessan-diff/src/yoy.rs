//! Period-over-period change against the prior fiscal year.

use crate::pct::percent_change;
use crate::select::{index_by_fiscal_year, select_current};
use kessan_data::FilingRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Year-over-year change of one security, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct YoyChange {
    /// Revenue change
    pub revenue: Option<f64>,
    /// EPS change
    pub eps: Option<f64>,
}

/// Compares each current filing with the same security's filing for the
/// previous fiscal year (any period).
///
/// Every selected current filing gets an entry; the percentages are absent
/// when there is no prior-year filing, the filing has no fiscal year, or the
/// base figure is absent or zero.
pub fn compute_yoy(
    current: &[FilingRecord],
    historical: &[FilingRecord],
) -> BTreeMap<String, YoyChange> {
    let prior_years = index_by_fiscal_year(historical);

    select_current(current)
        .into_iter()
        .map(|(code, filing)| {
            let base = filing
                .fiscal_year
                .and_then(|year| year.checked_sub(1))
                .and_then(|year| prior_years.get(&(code, year)));

            let change = base.map_or_else(YoyChange::default, |base| YoyChange {
                revenue: percent_change(filing.revenue, base.revenue),
                eps: percent_change(filing.earnings_per_share, base.earnings_per_share),
            });
            (code.to_string(), change)
        })
        .collect()
}
