//! Post-batch filtering and ranking

use crate::models::ResolvedMatch;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanFilter {
    /// EV floor in percent; `None` keeps every actionable match
    #[serde(rename = "minEV", default)]
    pub min_ev: Option<f64>,
    #[serde(default)]
    pub include_live: bool,
}

/// Keep matches with both teams, odds and EV, then apply the EV floor and
/// the live-match exclusion.
pub fn filter<'a>(results: &'a [ResolvedMatch], criteria: &ScanFilter) -> Vec<&'a ResolvedMatch> {
    results
        .iter()
        .filter(|m| m.is_actionable())
        .filter(|m| match (criteria.min_ev, m.ev) {
            (Some(floor), Some(ev)) => ev.max >= floor,
            _ => true,
        })
        .filter(|m| criteria.include_live || !m.event.is_live)
        .collect()
}

/// Order by best-outcome EV, highest first. Equal EVs keep their order.
pub fn rank(matches: &mut [&ResolvedMatch]) {
    matches.sort_by(|a, b| {
        let ev_a = a.ev.map_or(f64::NEG_INFINITY, |ev| ev.max);
        let ev_b = b.ev.map_or(f64::NEG_INFINITY, |ev| ev.max);
        ev_b.total_cmp(&ev_a)
    });
}
