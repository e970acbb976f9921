//! Feed provider abstractions
//!
//! Two seams separate the scanner from the sportsbook feed:
//! - `EventSource` lists the upcoming/live events of a league
//! - `OddsSource` returns the three-way market for one event
//!
//! The pipeline only depends on `OddsSource`, so tests drive it with mocks.

use crate::models::{League, OddsTriple, RawEvent};
use anyhow::Result;
use async_trait::async_trait;

pub mod kambi;

pub use kambi::KambiClient;

/// Source of the event listing for a league
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Every event the feed lists for `league`, live ones included
    async fn fetch_events(&self, league: &League) -> Result<Vec<RawEvent>>;

    /// Source name for logging
    fn source_name(&self) -> &str;
}

/// Source of normalized three-way odds
#[async_trait]
pub trait OddsSource: Send + Sync {
    /// `Ok(None)` when the event has no complete match-result market.
    /// Transport failures, timeouts and malformed payloads are `Err`.
    async fn fetch_odds(&self, event_id: &str) -> Result<Option<OddsTriple>>;

    /// Source name for logging
    fn source_name(&self) -> &str;
}
