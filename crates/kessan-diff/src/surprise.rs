//! Actual figures against the analyst consensus.

use crate::pct::percent_change;
use crate::select::select_current;
use kessan_data::{ConsensusRecord, FilingRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Surprise of one security's actuals over the consensus, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Surprise {
    /// Revenue over analyst revenue
    pub revenue: Option<f64>,
    /// EPS over analyst EPS
    pub eps: Option<f64>,
}

/// Compares each current filing with the consensus for its security.
///
/// `consensus` is keyed by security code, one record per code (see
/// [`kessan_data::consensus::latest_by_security`]). Percentages are absent
/// when there is no consensus or the analyst estimate is absent or zero.
pub fn compute_surprise(
    current: &[FilingRecord],
    consensus: &HashMap<String, ConsensusRecord>,
) -> BTreeMap<String, Surprise> {
    select_current(current)
        .into_iter()
        .map(|(code, filing)| {
            let surprise = consensus
                .get(code)
                .map_or_else(Surprise::default, |estimate| Surprise {
                    revenue: percent_change(filing.revenue, estimate.analyst_revenue),
                    eps: percent_change(filing.earnings_per_share, estimate.analyst_eps),
                });
            (code.to_string(), surprise)
        })
        .collect()
}
