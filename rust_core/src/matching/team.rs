//! Team Resolver
//!
//! Picks the roster team that best matches a name reported by the odds feed.
//! The resolver never applies the match threshold itself: it always returns
//! its best candidate with the raw confidence so callers keep the full picture.

use super::{similarity, MATCH_THRESHOLD};
use crate::models::Team;
use crate::roster::RosterSnapshot;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Best candidate for an external name
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamMatch<'a> {
    pub team: Option<&'a Team>,
    pub confidence: f64,
}

impl<'a> TeamMatch<'a> {
    pub fn none() -> Self {
        Self {
            team: None,
            confidence: 0.0,
        }
    }

    /// Matched at the default threshold
    pub fn is_match(&self) -> bool {
        self.is_match_at(MATCH_THRESHOLD)
    }

    pub fn is_match_at(&self, threshold: f64) -> bool {
        self.team.is_some() && self.confidence >= threshold
    }

    /// The team, only when the confidence clears `threshold`
    pub fn matched_team(&self, threshold: f64) -> Option<&'a Team> {
        if self.is_match_at(threshold) {
            self.team
        } else {
            None
        }
    }
}

/// Best similarity between `external_name` and any name of `team`.
fn candidate_score(external_name: &str, team: &Team) -> f64 {
    team.match_names()
        .map(|name| similarity(external_name, name))
        .fold(0.0, f64::max)
}

/// Find the best matching team in `pool`.
///
/// Ties keep the first candidate in iteration order. A candidate scoring 0
/// is never selected, so an empty pool (or one with nothing plausible)
/// yields no team and confidence 0.
pub fn resolve<'a, I>(external_name: &str, pool: I) -> TeamMatch<'a>
where
    I: IntoIterator<Item = &'a Team>,
{
    let mut best = TeamMatch::none();

    for team in pool {
        let score = candidate_score(external_name, team);
        if score > best.confidence {
            best = TeamMatch {
                team: Some(team),
                confidence: score,
            };
        }
    }

    debug!(
        "Resolved '{}' -> {:?} ({:.3})",
        external_name,
        best.team.map(|t| t.name.as_str()),
        best.confidence
    );

    best
}

// =============================================================================
// Request / response surface
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameResolutionRequest {
    pub team_name: String,
    /// League id or name to scope the search to
    #[serde(default)]
    pub league: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameResolutionResponse {
    pub matched: bool,
    pub team: Option<Team>,
    pub confidence: f64,
    pub original_name: String,
}

/// Resolve a single name against the roster, optionally scoped to a league.
pub fn resolve_request(
    request: &NameResolutionRequest,
    roster: &RosterSnapshot,
) -> Result<NameResolutionResponse> {
    if request.team_name.trim().is_empty() {
        bail!("Team name required");
    }

    let result = match request.league.as_deref() {
        Some(scope) => resolve(&request.team_name, roster.teams_in_scope(scope)),
        None => resolve(&request.team_name, roster.teams.iter()),
    };

    Ok(NameResolutionResponse {
        matched: result.is_match(),
        team: result.team.cloned(),
        confidence: result.confidence,
        original_name: request.team_name.clone(),
    })
}
