//! Kambi offering API adapter
//!
//! - Listing: the league's `kambiUrl` (listView document)
//! - Odds: `betoffer/event/{id}.json` for one event
//!
//! Both requests go through one shared circuit breaker.

use super::{EventSource, OddsSource};
use crate::circuit_breaker::{ApiCircuitBreaker, ApiCircuitBreakerConfig, ApiCircuitState};
use crate::models::{League, OddsTriple, RawEvent};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://eu-offering-api.kambicdn.com/offering/v2018";
pub const DEFAULT_API_CLIENT: &str = "ilaniuswarl";

/// Kambi prices are integers in thousandths
const PRICE_SCALE: f64 = 1000.0;

// =============================================================================
// Payload parsing
// =============================================================================

/// Parse a listView document into raw events.
///
/// Entries without both participant names (outrights) or without a
/// parseable start time are skipped.
pub fn parse_events(body: &str) -> Result<Vec<RawEvent>> {
    let data: serde_json::Value =
        serde_json::from_str(body).context("Invalid event listing JSON")?;

    let Some(entries) = data["events"].as_array() else {
        return Ok(Vec::new());
    };

    let mut events = Vec::with_capacity(entries.len());
    for entry in entries {
        let event = &entry["event"];

        let id = match &event["id"] {
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::String(s) => s.clone(),
            _ => continue,
        };
        let (Some(home_name), Some(away_name)) =
            (event["homeName"].as_str(), event["awayName"].as_str())
        else {
            debug!("Skipping event {} without participants", id);
            continue;
        };
        let Some(start_time) = event["start"]
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
        else {
            debug!("Skipping event {} with unparseable start time", id);
            continue;
        };

        events.push(RawEvent {
            id,
            home_name: home_name.to_string(),
            away_name: away_name.to_string(),
            start_time,
            is_live: event["state"].as_str() == Some("STARTED"),
        });
    }

    Ok(events)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BetOfferDocument {
    #[serde(default)]
    bet_offers: Vec<BetOffer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BetOffer {
    #[serde(default)]
    criterion: Option<Labelled>,
    #[serde(default)]
    bet_offer_type: Option<Named>,
    #[serde(default)]
    outcomes: Vec<BetOutcome>,
}

#[derive(Debug, Deserialize)]
struct Labelled {
    #[serde(default)]
    label: String,
}

#[derive(Debug, Deserialize)]
struct Named {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct BetOutcome {
    #[serde(default)]
    label: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    odds: Option<f64>,
}

impl BetOffer {
    fn is_full_time_match_result(&self) -> bool {
        self.criterion
            .as_ref()
            .is_some_and(|c| c.label == "Full time")
            && self
                .bet_offer_type
                .as_ref()
                .is_some_and(|t| t.name.contains("Match Result"))
    }

    fn price(&self, label: &str, kind: &str) -> Option<f64> {
        self.outcomes
            .iter()
            .find(|o| o.label == label || o.kind == kind)
            .and_then(|o| o.odds)
            .map(|raw| raw / PRICE_SCALE)
    }
}

/// Extract the full-time 1X2 prices from a bet-offer document.
///
/// A missing market or any missing outcome yields `None` for the whole triple.
pub fn parse_bet_offers(body: &str) -> Result<Option<OddsTriple>> {
    let doc: BetOfferDocument = serde_json::from_str(body).context("Invalid bet offer JSON")?;

    let Some(market) = doc
        .bet_offers
        .iter()
        .find(|bo| bo.is_full_time_match_result())
    else {
        return Ok(None);
    };

    let home = market.price("1", "OT_ONE");
    let draw = market.price("X", "OT_DRAW");
    let away = market.price("2", "OT_TWO");

    Ok(match (home, draw, away) {
        (Some(h), Some(d), Some(a)) => OddsTriple::new(h, d, a),
        _ => None,
    })
}

// =============================================================================
// Client
// =============================================================================

#[derive(Clone)]
pub struct KambiClient {
    client: Client,
    base_url: String,
    api_client: String,
    circuit_breaker: Arc<ApiCircuitBreaker>,
}

impl std::fmt::Debug for KambiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KambiClient")
            .field("api_client", &self.api_client)
            .field("circuit_breaker_state", &self.circuit_breaker.state())
            .finish()
    }
}

impl KambiClient {
    /// `timeout` bounds every request; an expired request counts as a failure.
    pub fn new(api_client: &str, timeout: Duration, breaker: ApiCircuitBreakerConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_client: api_client.to_string(),
            circuit_breaker: Arc::new(ApiCircuitBreaker::new("kambi", breaker)),
        }
    }

    /// Point the odds endpoint somewhere else (mirrors, local fixtures)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn odds_url(&self, event_id: &str) -> String {
        format!(
            "{}/{}/betoffer/event/{}.json?lang=en_GB&market=GB",
            self.base_url, self.api_client, event_id
        )
    }

    pub fn circuit_state(&self) -> ApiCircuitState {
        self.circuit_breaker.state()
    }

    /// GET `url` through the circuit breaker and return the body text.
    async fn get_text(&self, url: &str) -> Result<String> {
        if !self.circuit_breaker.is_available() {
            return Err(anyhow!("Kambi circuit breaker is open ({})", url));
        }

        let result = self.get_text_internal(url).await;

        match &result {
            Ok(_) => self.circuit_breaker.record_success(),
            Err(e) => {
                warn!("Kambi request failed: {}", e);
                self.circuit_breaker.record_failure();
            }
        }

        result
    }

    async fn get_text_internal(&self, url: &str) -> Result<String> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            bail!("HTTP {} from {}", status, url);
        }
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl EventSource for KambiClient {
    async fn fetch_events(&self, league: &League) -> Result<Vec<RawEvent>> {
        if league.feed_url.is_empty() {
            bail!("League '{}' has no event feed URL", league.name);
        }

        let body = self.get_text(&league.feed_url).await?;
        let events = parse_events(&body)?;
        debug!("Fetched {} events for {}", events.len(), league.name);
        Ok(events)
    }

    fn source_name(&self) -> &str {
        "kambi"
    }
}

#[async_trait]
impl OddsSource for KambiClient {
    async fn fetch_odds(&self, event_id: &str) -> Result<Option<OddsTriple>> {
        let body = self.get_text(&self.odds_url(event_id)).await?;
        parse_bet_offers(&body)
    }

    fn source_name(&self) -> &str {
        "kambi"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"{
        "events": [
            {"event": {"id": 1020304050, "homeName": "Arsenal", "awayName": "Chelsea",
                       "start": "2025-01-18T15:00:00Z", "state": "NOT_STARTED"}},
            {"event": {"id": "1020304051", "homeName": "Everton", "awayName": "Fulham",
                       "start": "2025-01-18T12:30:00Z", "state": "STARTED"}},
            {"event": {"id": 1020304052, "name": "Premier League 2024/25 - Winner",
                       "start": "2025-05-25T15:00:00Z", "state": "NOT_STARTED"}},
            {"event": {"id": 1020304053, "homeName": "Leeds", "awayName": "Burnley",
                       "start": "tomorrow", "state": "NOT_STARTED"}}
        ]
    }"#;

    fn bet_offer(criterion: &str, kind: &str, outcomes: &str) -> String {
        format!(
            r#"{{"betOffers": [
                {{"criterion": {{"label": "Total Goals"}}, "betOfferType": {{"name": "Over/Under"}},
                  "outcomes": [{{"label": "Over", "odds": 1900}}]}},
                {{"criterion": {{"label": "{criterion}"}}, "betOfferType": {{"name": "{kind}"}},
                  "outcomes": [{outcomes}]}}
            ]}}"#
        )
    }

    #[test]
    fn test_parse_events() {
        let events = parse_events(LISTING).unwrap();
        assert_eq!(events.len(), 2);

        assert_eq!(events[0].id, "1020304050");
        assert_eq!(events[0].home_name, "Arsenal");
        assert!(!events[0].is_live);

        assert_eq!(events[1].id, "1020304051");
        assert!(events[1].is_live);
        assert_eq!(events[1].start_time.to_rfc3339(), "2025-01-18T12:30:00+00:00");
    }

    #[test]
    fn test_parse_events_empty_and_invalid() {
        assert!(parse_events("{}").unwrap().is_empty());
        assert!(parse_events(r#"{"events": []}"#).unwrap().is_empty());
        assert!(parse_events("<html>").is_err());
    }

    #[test]
    fn test_parse_bet_offers_by_label() {
        let body = bet_offer(
            "Full time",
            "Match Result",
            r#"{"label": "1", "odds": 2100}, {"label": "X", "odds": 3400}, {"label": "2", "odds": 3600}"#,
        );
        let odds = parse_bet_offers(&body).unwrap().unwrap();
        assert!((odds.home - 2.1).abs() < 1e-12);
        assert!((odds.draw - 3.4).abs() < 1e-12);
        assert!((odds.away - 3.6).abs() < 1e-12);
    }

    #[test]
    fn test_parse_bet_offers_by_type_code() {
        let body = bet_offer(
            "Full time",
            "Match Result (1X2)",
            r#"{"label": "Home", "type": "OT_ONE", "odds": 1850},
               {"label": "Draw", "type": "OT_DRAW", "odds": 3750},
               {"label": "Away", "type": "OT_TWO", "odds": 4200}"#,
        );
        let odds = parse_bet_offers(&body).unwrap().unwrap();
        assert!((odds.home - 1.85).abs() < 1e-12);
        assert!((odds.away - 4.2).abs() < 1e-12);
    }

    #[test]
    fn test_missing_outcome_yields_none() {
        let body = bet_offer(
            "Full time",
            "Match Result",
            r#"{"label": "1", "odds": 2100}, {"label": "2", "odds": 3600}"#,
        );
        assert_eq!(parse_bet_offers(&body).unwrap(), None);
    }

    #[test]
    fn test_wrong_scope_market_ignored() {
        let body = bet_offer(
            "Half time",
            "Match Result",
            r#"{"label": "1", "odds": 2900}, {"label": "X", "odds": 2100}, {"label": "2", "odds": 4100}"#,
        );
        assert_eq!(parse_bet_offers(&body).unwrap(), None);
        assert_eq!(parse_bet_offers("{}").unwrap(), None);
        assert!(parse_bet_offers("not json").is_err());
    }

    #[test]
    fn test_odds_url() {
        let client = KambiClient::new(
            "ub",
            Duration::from_secs(5),
            ApiCircuitBreakerConfig::default(),
        )
        .with_base_url("http://localhost:8080/offering/");
        assert_eq!(
            client.odds_url("1020304050"),
            "http://localhost:8080/offering/ub/betoffer/event/1020304050.json?lang=en_GB&market=GB"
        );
        assert_eq!(client.circuit_state(), ApiCircuitState::Closed);
    }

    #[tokio::test]
    async fn test_open_circuit_fails_fast() {
        let client = KambiClient::new(
            DEFAULT_API_CLIENT,
            Duration::from_millis(200),
            ApiCircuitBreakerConfig {
                failure_threshold: 1,
                recovery_timeout: Duration::from_secs(60),
                success_threshold: 1,
            },
        )
        .with_base_url("http://127.0.0.1:9");

        assert!(client.fetch_odds("1").await.is_err());
        assert_eq!(client.circuit_state(), ApiCircuitState::Open);

        let err = client.fetch_odds("2").await.unwrap_err();
        assert!(err.to_string().contains("circuit breaker is open"));
    }

    #[tokio::test]
    #[ignore] // requires network access
    async fn test_live_bet_offer_request() {
        let client = KambiClient::new(
            DEFAULT_API_CLIENT,
            Duration::from_secs(10),
            ApiCircuitBreakerConfig::default(),
        );
        let result = client.fetch_odds("1000000000").await;
        println!("Kambi odds: {:?}", result);
    }
}
