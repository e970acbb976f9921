//! Read-only roster snapshot.
//!
//! This module provides:
//! - Loading the team and league databases from JSON
//! - League lookup by id or name
//! - League-scoped team pools for the resolver and pipeline
//! - Case-insensitive team search

use crate::models::{League, Team};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Team database document: `{ "teams": [...], "lastUpdated": "..." }`
///
/// Records stay raw so one malformed entry does not sink the whole file.
#[derive(Debug, Deserialize)]
struct TeamsDocument {
    #[serde(default)]
    teams: Vec<serde_json::Value>,
}

/// League database document: `{ "leagues": [...], "lastUpdated": "..." }`
#[derive(Debug, Deserialize)]
struct LeaguesDocument {
    #[serde(default)]
    leagues: Vec<serde_json::Value>,
}

/// Deserialize each record on its own, skipping the ones that don't fit.
fn parse_records<T: DeserializeOwned>(kind: &str, records: Vec<serde_json::Value>) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|record| {
            let id = record["id"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| record["id"].to_string());
            match serde_json::from_value(record) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!("Skipping {} {}: {}", kind, id, e);
                    None
                }
            }
        })
        .collect()
}

/// Immutable view of the roster for one run. Share it behind an `Arc`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterSnapshot {
    pub teams: Vec<Team>,
    pub leagues: Vec<League>,
}

impl RosterSnapshot {
    pub fn new(teams: Vec<Team>, leagues: Vec<League>) -> Self {
        Self { teams, leagues }
    }

    /// Load from the team and league database files.
    pub fn load(teams_path: impl AsRef<Path>, leagues_path: impl AsRef<Path>) -> Result<Self> {
        let teams_path = teams_path.as_ref();
        let leagues_path = leagues_path.as_ref();

        let teams_json = fs::read_to_string(teams_path)
            .with_context(|| format!("Failed to read team database {}", teams_path.display()))?;
        let leagues_json = fs::read_to_string(leagues_path).with_context(|| {
            format!("Failed to read league database {}", leagues_path.display())
        })?;

        Self::from_json(&teams_json, &leagues_json)
    }

    pub fn from_json(teams_json: &str, leagues_json: &str) -> Result<Self> {
        let teams: TeamsDocument =
            serde_json::from_str(teams_json).context("Invalid team database JSON")?;
        let leagues: LeaguesDocument =
            serde_json::from_str(leagues_json).context("Invalid league database JSON")?;

        Ok(Self::new(
            parse_records("team", teams.teams),
            parse_records("league", leagues.leagues),
        ))
    }

    pub fn league_by_id(&self, id: &str) -> Option<&League> {
        self.leagues.iter().find(|l| l.id == id)
    }

    pub fn league_by_name(&self, name: &str) -> Option<&League> {
        self.leagues.iter().find(|l| l.name == name)
    }

    /// Look a league up by id first, then by name.
    pub fn find_league(&self, key: &str) -> Option<&League> {
        self.league_by_id(key).or_else(|| self.league_by_name(key))
    }

    /// Teams belonging to `league`, in roster order.
    pub fn teams_in_league(&self, league: &League) -> Vec<&Team> {
        self.teams.iter().filter(|t| league.owns(t)).collect()
    }

    /// Teams for a league id or name. Unknown scopes compare against the
    /// team's stored league field directly.
    pub fn teams_in_scope(&self, scope: &str) -> Vec<&Team> {
        match self.find_league(scope) {
            Some(league) => self.teams_in_league(league),
            None => self.teams.iter().filter(|t| t.league_id == scope).collect(),
        }
    }

    /// Case-insensitive substring search over name, feed name and aliases.
    pub fn search(&self, query: &str, league: Option<&str>) -> Vec<&Team> {
        let needle = query.trim().to_lowercase();
        let pool = match league {
            Some(scope) => self.teams_in_scope(scope),
            None => self.teams.iter().collect(),
        };

        pool.into_iter()
            .filter(|team| {
                team.name.to_lowercase().contains(&needle)
                    || team
                        .feed_name
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(&needle))
                    || team.aliases.iter().any(|a| a.to_lowercase().contains(&needle))
            })
            .collect()
    }
}
