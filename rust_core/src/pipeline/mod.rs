//! Match Pipeline
//!
//! Turns one batch of feed events into `ResolvedMatch` records:
//! - resolves home and away names against the league's team pool
//! - fetches the event's three-way odds from the `OddsSource`
//! - computes fair odds and EV when both teams and odds are present
//!
//! Every event is processed independently. Odds failures become
//! `OddsUnavailable`, model errors and panics become `Failed`, and the batch
//! always yields exactly one record per input event, in input order.

use crate::matching::{resolve, MATCH_THRESHOLD};
use crate::models::{EventOutcome, League, RawEvent, ResolvedMatch, Team};
use crate::probability::{evaluate, FairOddsConfig, ModelError};
use crate::providers::OddsSource;
use futures_util::stream::{self, StreamExt};
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub mod filter;

pub use filter::{filter, rank, ScanFilter};

pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Odds requests in flight at once
    pub concurrency: usize,
    /// Confidence a name resolution needs to count as matched
    pub match_threshold: f64,
    pub fair_odds: FairOddsConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            match_threshold: MATCH_THRESHOLD,
            fair_odds: FairOddsConfig::default(),
        }
    }
}

// =============================================================================
// Batch report
// =============================================================================

/// Result of one `process_batch` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    /// One entry per input event, in input order
    pub matches: Vec<ResolvedMatch>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn complete_count(&self) -> usize {
        self.count(|o| matches!(o, EventOutcome::Complete))
    }

    pub fn partial_count(&self) -> usize {
        self.count(|o| matches!(o, EventOutcome::Partial { .. }))
    }

    pub fn odds_unavailable_count(&self) -> usize {
        self.count(|o| matches!(o, EventOutcome::OddsUnavailable { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, EventOutcome::Failed { .. }))
    }

    pub fn into_matches(self) -> Vec<ResolvedMatch> {
        self.matches
    }

    fn count(&self, pred: impl Fn(&EventOutcome) -> bool) -> usize {
        self.matches.iter().filter(|m| pred(&m.outcome)).count()
    }
}

// =============================================================================
// Pipeline
// =============================================================================

pub struct MatchPipeline {
    odds_source: Arc<dyn OddsSource>,
    config: PipelineConfig,
}

impl MatchPipeline {
    pub fn new(odds_source: Arc<dyn OddsSource>) -> Self {
        Self {
            odds_source,
            config: PipelineConfig::default(),
        }
    }

    /// Fails when the fair odds settings cannot price any event.
    pub fn with_config(
        odds_source: Arc<dyn OddsSource>,
        config: PipelineConfig,
    ) -> Result<Self, ModelError> {
        config.fair_odds.validate()?;
        Ok(Self {
            odds_source,
            config,
        })
    }

    /// Process a batch of events for `league`.
    ///
    /// `teams` may hold the whole roster; only teams owned by `league` are
    /// considered during name resolution. Dropping the returned future
    /// abandons any odds requests still in flight.
    pub async fn process_batch(
        &self,
        events: Vec<RawEvent>,
        league: &League,
        teams: &[Team],
    ) -> BatchReport {
        let run_id = Uuid::new_v4();
        let pool: Vec<&Team> = teams.iter().filter(|t| league.owns(t)).collect();
        let concurrency = self.config.concurrency.max(1);

        info!(
            "Run {}: processing {} events for {} ({} teams in pool)",
            run_id,
            events.len(),
            league.name,
            pool.len()
        );

        let pool = &pool;
        let matches: Vec<ResolvedMatch> = stream::iter(events)
            .map(|event| async move {
                let event_id = event.id.clone();
                let fallback = event.clone();

                match AssertUnwindSafe(self.process_event(event, league, pool))
                    .catch_unwind()
                    .await
                {
                    Ok(resolved) => resolved,
                    Err(panic) => {
                        let error = panic_message(&*panic);
                        warn!("Event {} panicked during processing: {}", event_id, error);
                        ResolvedMatch::failed(fallback, error)
                    }
                }
            })
            .buffered(concurrency)
            .collect()
            .await;

        let report = BatchReport { run_id, matches };

        info!(
            "Run {} done: {} complete, {} partial, {} without odds, {} failed",
            run_id,
            report.complete_count(),
            report.partial_count(),
            report.odds_unavailable_count(),
            report.failed_count()
        );

        report
    }

    async fn process_event(
        &self,
        event: RawEvent,
        league: &League,
        pool: &[&Team],
    ) -> ResolvedMatch {
        let threshold = self.config.match_threshold;
        let home = resolve(&event.home_name, pool.iter().copied());
        let away = resolve(&event.away_name, pool.iter().copied());

        let mut resolved = ResolvedMatch::new(event);
        resolved.home_confidence = home.confidence;
        resolved.away_confidence = away.confidence;
        resolved.home_team = home.matched_team(threshold).cloned();
        resolved.away_team = away.matched_team(threshold).cloned();

        let odds = match self.odds_source.fetch_odds(&resolved.event.id).await {
            Ok(odds) => odds,
            Err(e) => {
                warn!(
                    "Event {}: odds from {} unavailable: {:#}",
                    resolved.event.id,
                    self.odds_source.source_name(),
                    e
                );
                resolved.outcome = EventOutcome::OddsUnavailable {
                    error: format!("{:#}", e),
                };
                return resolved;
            }
        };
        resolved.odds = odds;

        let (Some(home_team), Some(away_team), Some(odds)) =
            (&resolved.home_team, &resolved.away_team, odds)
        else {
            let reason = partial_reason(&resolved);
            debug!("Event {}: partial ({})", resolved.event.id, reason);
            resolved.outcome = EventOutcome::Partial { reason };
            return resolved;
        };

        match self.config.fair_odds.fair_odds(
            home_team.rating,
            away_team.rating,
            league.stats.draw_rate,
        ) {
            Ok(fair) => {
                resolved.ev = Some(evaluate(&odds, &fair));
                resolved.fair_odds = Some(fair);
                resolved.outcome = EventOutcome::Complete;
            }
            Err(e) => {
                warn!("Event {}: fair odds computation failed: {}", resolved.event.id, e);
                resolved.outcome = EventOutcome::Failed {
                    error: e.to_string(),
                };
            }
        }

        resolved
    }
}

fn partial_reason(resolved: &ResolvedMatch) -> String {
    let mut missing = Vec::new();
    if resolved.home_team.is_none() {
        missing.push(format!("home team '{}' unresolved", resolved.event.home_name));
    }
    if resolved.away_team.is_none() {
        missing.push(format!("away team '{}' unresolved", resolved.event.away_name));
    }
    if resolved.odds.is_none() {
        missing.push("no match result market".to_string());
    }
    missing.join(", ")
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
