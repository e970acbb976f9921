// Shared models for the value bet scanner
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Roster Records (owned by the external team/league store)
// ============================================================================

/// A team as stored in the roster.
///
/// `feed_name` is the spelling used by the odds feed; it is frequently absent
/// for teams that were entered by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(rename = "kambiName", default, skip_serializing_if = "Option::is_none")]
    pub feed_name: Option<String>,
    /// League identifier. Older roster files store the league name here.
    #[serde(rename = "league")]
    pub league_id: String,
    #[serde(default)]
    pub country: String,
    #[serde(rename = "eloRating")]
    pub rating: i32,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl Team {
    /// Every non-blank name this team answers to: canonical name, feed name,
    /// then aliases in stored order.
    pub fn match_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str())
            .chain(self.feed_name.as_deref())
            .chain(self.aliases.iter().map(String::as_str))
            .filter(|name| !name.trim().is_empty())
    }
}

/// Historical result distribution for a league.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueStats {
    pub home_win_rate: f64,
    pub draw_rate: f64,
    pub away_win_rate: f64,
    pub avg_goals: f64,
    pub avg_home_goals: f64,
    pub avg_away_goals: f64,
}

impl Default for LeagueStats {
    fn default() -> Self {
        Self {
            home_win_rate: 0.45,
            draw_rate: 0.27,
            away_win_rate: 0.28,
            avg_goals: 2.7,
            avg_home_goals: 1.5,
            avg_away_goals: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct League {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub stats: LeagueStats,
    #[serde(default)]
    pub total_games: u32,
    /// Event listing URL on the odds feed
    #[serde(rename = "kambiUrl", default)]
    pub feed_url: String,
    /// Feed client id override (falls back to the scanner default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_client: Option<String>,
}

impl League {
    /// True when the team belongs to this league, keyed by id or by name.
    pub fn owns(&self, team: &Team) -> bool {
        team.league_id == self.id || team.league_id == self.name
    }
}

// ============================================================================
// Feed Data (ephemeral, one pipeline run)
// ============================================================================

/// An event as reported by the odds feed, before any name resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub id: String,
    pub home_name: String,
    pub away_name: String,
    pub start_time: DateTime<Utc>,
    pub is_live: bool,
}

/// Three-way market prices in decimal odds.
///
/// Only constructible with all three prices positive, so a missing market is
/// always `None` rather than a partially filled triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OddsTriple {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl OddsTriple {
    pub fn new(home: f64, draw: f64, away: f64) -> Option<Self> {
        let valid = |price: f64| price.is_finite() && price > 0.0;
        if valid(home) && valid(draw) && valid(away) {
            Some(Self { home, draw, away })
        } else {
            None
        }
    }

    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }
}

/// Model-derived decimal odds. Implied probabilities always sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairOddsTriple {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl FairOddsTriple {
    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }

    /// Sum of the implied probabilities (1 / odds).
    pub fn implied_total(&self) -> f64 {
        1.0 / self.home + 1.0 / self.draw + 1.0 / self.away
    }
}

// ============================================================================
// Expected Value
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Home, Outcome::Draw, Outcome::Away];

    /// Bet slip label (1 / X / 2)
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Home => "1",
            Outcome::Draw => "X",
            Outcome::Away => "2",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Home => "home",
            Outcome::Draw => "draw",
            Outcome::Away => "away",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-outcome EV percentages and the selected best outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvResult {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
    /// EV of `best`
    pub max: f64,
    pub best: Outcome,
}

/// EV above which a bet is worth recommending
pub const DEFAULT_RECOMMENDATION_EV_PCT: f64 = 5.0;

impl EvResult {
    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }

    /// The best outcome and its EV when that EV is strictly above `threshold_pct`.
    pub fn recommendation(&self, threshold_pct: f64) -> Option<(Outcome, f64)> {
        (self.max > threshold_pct).then_some((self.best, self.max))
    }
}

// ============================================================================
// Pipeline Output
// ============================================================================

/// How far processing of a single event got.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EventOutcome {
    /// Teams resolved, odds present, fair odds and EV computed
    Complete,
    /// Processing finished but something needed for EV was missing
    Partial { reason: String },
    /// The odds source errored or timed out; handled as "no odds"
    OddsUnavailable { error: String },
    /// Model defect or panic while processing this event
    Failed { error: String },
}

impl EventOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, EventOutcome::Failed { .. })
    }
}

/// One feed event with everything the pipeline could attach to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMatch {
    pub event: RawEvent,
    pub home_team: Option<Team>,
    pub away_team: Option<Team>,
    pub home_confidence: f64,
    pub away_confidence: f64,
    pub odds: Option<OddsTriple>,
    pub fair_odds: Option<FairOddsTriple>,
    pub ev: Option<EvResult>,
    pub outcome: EventOutcome,
}

impl ResolvedMatch {
    pub fn new(event: RawEvent) -> Self {
        Self {
            event,
            home_team: None,
            away_team: None,
            home_confidence: 0.0,
            away_confidence: 0.0,
            odds: None,
            fair_odds: None,
            ev: None,
            outcome: EventOutcome::Partial {
                reason: "not processed".to_string(),
            },
        }
    }

    /// A match with every optional field empty, tagged as failed.
    pub fn failed(event: RawEvent, error: String) -> Self {
        Self {
            outcome: EventOutcome::Failed { error },
            ..Self::new(event)
        }
    }

    pub fn teams_resolved(&self) -> bool {
        self.home_team.is_some() && self.away_team.is_some()
    }

    /// Both teams, odds and EV present
    pub fn is_actionable(&self) -> bool {
        self.teams_resolved() && self.odds.is_some() && self.ev.is_some()
    }
}
