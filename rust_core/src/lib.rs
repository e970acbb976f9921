//! Valuebet Core - team name reconciliation and value bet detection.
//!
//! This crate provides:
//! - Fuzzy team name matching against a roster snapshot
//! - Rating-based fair odds for three-way (1X2) markets
//! - Expected value of market odds against fair odds
//! - A batch pipeline that resolves, prices and evaluates feed events
//!   with per-event failure isolation
//! - A Kambi offering API adapter guarded by a circuit breaker

pub mod circuit_breaker;
pub mod matching;
pub mod models;
pub mod pipeline;
pub mod probability;
pub mod providers;
pub mod roster;

pub use matching::{resolve, similarity, MATCH_THRESHOLD};
pub use models::*;
pub use pipeline::{filter, rank, BatchReport, MatchPipeline, PipelineConfig, ScanFilter};
pub use probability::{evaluate, fair_odds, FairOddsConfig, ModelError};
pub use providers::{EventSource, KambiClient, OddsSource};
pub use roster::RosterSnapshot;
