//! Configuration constants and environment loading for the value scanner
//!
//! This module manages all runtime configuration:
//! - Roster database locations and the league to scan
//! - Value filter (EV floor, live matches)
//! - Odds feed client, timeout and circuit breaker settings

use anyhow::{anyhow, Result};
use std::env;
use std::time::Duration;
use valuebet_core::circuit_breaker::ApiCircuitBreakerConfig;
use valuebet_core::pipeline::ScanFilter;
use valuebet_core::providers::kambi::DEFAULT_API_CLIENT;

pub const DEFAULT_ROSTER_PATH: &str = "teams_database.json";
pub const DEFAULT_LEAGUES_PATH: &str = "leagues_database.json";

/// Default odds requests in flight
pub const DEFAULT_ODDS_CONCURRENCY: usize = 4;
pub const MAX_ODDS_CONCURRENCY: usize = 32;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_CB_FAILURE_THRESHOLD: u32 = 5;
pub const DEFAULT_CB_RECOVERY_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub roster_path: String,
    pub leagues_path: String,
    /// League id or name
    pub league_id: String,
    pub min_ev_pct: Option<f64>,
    pub include_live: bool,
    pub odds_concurrency: usize,
    pub kambi_api_client: String,
    pub http_timeout: Duration,
    pub circuit_breaker: ApiCircuitBreakerConfig,
}

impl ScannerConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let league_id = lookup("LEAGUE_ID")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("LEAGUE_ID must be set"))?;

        let odds_concurrency = lookup("ODDS_CONCURRENCY")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_ODDS_CONCURRENCY)
            .clamp(1, MAX_ODDS_CONCURRENCY);

        let include_live = lookup("INCLUDE_LIVE")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let http_timeout = Duration::from_secs(
            lookup("HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        );

        Ok(Self {
            roster_path: lookup("ROSTER_PATH").unwrap_or_else(|| DEFAULT_ROSTER_PATH.to_string()),
            leagues_path: lookup("LEAGUES_PATH")
                .unwrap_or_else(|| DEFAULT_LEAGUES_PATH.to_string()),
            league_id: league_id.trim().to_string(),
            min_ev_pct: lookup("MIN_EV_PCT").and_then(|v| v.parse::<f64>().ok()),
            include_live,
            odds_concurrency,
            kambi_api_client: lookup("KAMBI_API_CLIENT")
                .unwrap_or_else(|| DEFAULT_API_CLIENT.to_string()),
            http_timeout,
            circuit_breaker: circuit_breaker_config(&lookup),
        })
    }

    pub fn scan_filter(&self) -> ScanFilter {
        ScanFilter {
            min_ev: self.min_ev_pct,
            include_live: self.include_live,
        }
    }
}

/// Odds feed circuit breaker settings
fn circuit_breaker_config(lookup: &impl Fn(&str) -> Option<String>) -> ApiCircuitBreakerConfig {
    ApiCircuitBreakerConfig {
        failure_threshold: lookup("ODDS_CB_FAILURE_THRESHOLD")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CB_FAILURE_THRESHOLD),
        recovery_timeout: Duration::from_secs(
            lookup("ODDS_CB_RECOVERY_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CB_RECOVERY_TIMEOUT_SECS),
        ),
        ..ApiCircuitBreakerConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ScannerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ScannerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("LEAGUE_ID", "league_001")]).unwrap();
        assert_eq!(config.roster_path, DEFAULT_ROSTER_PATH);
        assert_eq!(config.leagues_path, DEFAULT_LEAGUES_PATH);
        assert_eq!(config.min_ev_pct, None);
        assert!(!config.include_live);
        assert_eq!(config.odds_concurrency, 4);
        assert_eq!(config.kambi_api_client, "ilaniuswarl");
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.circuit_breaker.failure_threshold, 5);
        assert_eq!(config.circuit_breaker.success_threshold, 2);
    }

    #[test]
    fn test_league_required() {
        assert!(load(&[]).is_err());
        assert!(load(&[("LEAGUE_ID", "  ")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("LEAGUE_ID", "Premier League"),
            ("MIN_EV_PCT", "5"),
            ("INCLUDE_LIVE", "true"),
            ("ODDS_CONCURRENCY", "8"),
            ("KAMBI_API_CLIENT", "ub"),
            ("ODDS_CB_FAILURE_THRESHOLD", "3"),
            ("ODDS_CB_RECOVERY_TIMEOUT_SECS", "5"),
        ])
        .unwrap();
        assert_eq!(config.league_id, "Premier League");
        assert_eq!(config.scan_filter().min_ev, Some(5.0));
        assert!(config.scan_filter().include_live);
        assert_eq!(config.odds_concurrency, 8);
        assert_eq!(config.kambi_api_client, "ub");
        assert_eq!(config.circuit_breaker.failure_threshold, 3);
        assert_eq!(config.circuit_breaker.recovery_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_concurrency_clamped() {
        let config = load(&[("LEAGUE_ID", "x"), ("ODDS_CONCURRENCY", "0")]).unwrap();
        assert_eq!(config.odds_concurrency, 1);
        let config = load(&[("LEAGUE_ID", "x"), ("ODDS_CONCURRENCY", "500")]).unwrap();
        assert_eq!(config.odds_concurrency, MAX_ODDS_CONCURRENCY);
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let config = load(&[
            ("LEAGUE_ID", "x"),
            ("MIN_EV_PCT", "lots"),
            ("HTTP_TIMEOUT_SECS", "-1"),
        ])
        .unwrap();
        assert_eq!(config.min_ev_pct, None);
        assert_eq!(config.http_timeout, Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));
    }
}
