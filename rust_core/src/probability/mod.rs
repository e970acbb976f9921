//! Rating-based fair odds model
//!
//! Converts two strength ratings and a league draw tendency into normalized
//! three-way probabilities and fair decimal odds.
//!
//! - Home win: `1 / (1 + 10^((away - home - H) / 400))`
//! - Away win: `1 / (1 + 10^((home - away + H) / 400))`
//! - Draw: league draw rate clamped into `[0.15, 0.35]`
//!
//! where `H` is the home advantage in rating points (100). The three values
//! are normalized by their sum and inverted into decimal odds.

use crate::models::{FairOddsTriple, Outcome};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod ev;

pub use ev::evaluate;

/// Defects in the fair odds computation.
///
/// Realistic ratings and draw rates never produce these; they indicate bad
/// model inputs reaching the model rather than a runtime data problem.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Non-positive {outcome} probability {probability} (home={home_rating}, away={away_rating})")]
    NonPositiveProbability {
        outcome: Outcome,
        probability: f64,
        home_rating: i32,
        away_rating: i32,
    },

    #[error("Probabilities sum to {0}, cannot normalize")]
    DegenerateSum(f64),

    #[error("Invalid fair odds config: {0}")]
    InvalidConfig(String),
}

/// Three-way probabilities, either raw model output or normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbabilities {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl OutcomeProbabilities {
    pub fn sum(&self) -> f64 {
        self.home + self.draw + self.away
    }

    fn iter(&self) -> impl Iterator<Item = (Outcome, f64)> {
        [
            (Outcome::Home, self.home),
            (Outcome::Draw, self.draw),
            (Outcome::Away, self.away),
        ]
        .into_iter()
    }
}

/// Tunables for the fair odds model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairOddsConfig {
    /// Rating points added to the home side's edge
    pub home_advantage: f64,
    /// Logistic scale (rating difference for 10:1 expectation)
    pub scale: f64,
    pub min_draw_rate: f64,
    pub max_draw_rate: f64,
}

impl Default for FairOddsConfig {
    fn default() -> Self {
        Self {
            home_advantage: 100.0,
            scale: 400.0,
            min_draw_rate: 0.15,
            max_draw_rate: 0.35,
        }
    }
}

impl FairOddsConfig {
    /// Reject settings the model cannot price with.
    pub fn validate(&self) -> Result<(), ModelError> {
        let (min, max) = (self.min_draw_rate, self.max_draw_rate);
        if !(min.is_finite() && max.is_finite() && 0.0 <= min && min <= max && max < 1.0) {
            return Err(ModelError::InvalidConfig(format!(
                "draw band [{}, {}] must satisfy 0 <= min <= max < 1",
                min, max
            )));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ModelError::InvalidConfig(format!(
                "logistic scale {} must be positive",
                self.scale
            )));
        }
        if !self.home_advantage.is_finite() {
            return Err(ModelError::InvalidConfig(format!(
                "home advantage {} must be finite",
                self.home_advantage
            )));
        }
        Ok(())
    }

    /// League draw rate clamped into the model's draw band. NaN passes through.
    pub fn clamp_draw_rate(&self, draw_rate: f64) -> f64 {
        if draw_rate.is_nan() {
            return draw_rate;
        }
        draw_rate.max(self.min_draw_rate).min(self.max_draw_rate)
    }

    /// Pre-normalization probabilities.
    pub fn raw_probabilities(
        &self,
        home_rating: i32,
        away_rating: i32,
        league_draw_rate: f64,
    ) -> OutcomeProbabilities {
        let home = f64::from(home_rating);
        let away = f64::from(away_rating);

        OutcomeProbabilities {
            home: logistic((away - home - self.home_advantage) / self.scale),
            draw: self.clamp_draw_rate(league_draw_rate),
            away: logistic((home - away + self.home_advantage) / self.scale),
        }
    }

    /// Normalized probabilities summing to 1.
    pub fn probabilities(
        &self,
        home_rating: i32,
        away_rating: i32,
        league_draw_rate: f64,
    ) -> Result<OutcomeProbabilities, ModelError> {
        self.validate()?;
        let raw = self.raw_probabilities(home_rating, away_rating, league_draw_rate);

        let total = raw.sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(ModelError::DegenerateSum(total));
        }

        let normalized = OutcomeProbabilities {
            home: raw.home / total,
            draw: raw.draw / total,
            away: raw.away / total,
        };

        // Negated comparison also rejects NaN
        if let Some((outcome, probability)) = normalized.iter().find(|(_, p)| !(*p > 0.0)) {
            return Err(ModelError::NonPositiveProbability {
                outcome,
                probability,
                home_rating,
                away_rating,
            });
        }

        Ok(normalized)
    }

    pub fn fair_odds(
        &self,
        home_rating: i32,
        away_rating: i32,
        league_draw_rate: f64,
    ) -> Result<FairOddsTriple, ModelError> {
        let p = self.probabilities(home_rating, away_rating, league_draw_rate)?;
        Ok(FairOddsTriple {
            home: 1.0 / p.home,
            draw: 1.0 / p.draw,
            away: 1.0 / p.away,
        })
    }
}

/// `1 / (1 + 10^exponent)`
fn logistic(exponent: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf(exponent))
}

/// Fair odds with the default model configuration.
pub fn fair_odds(
    home_rating: i32,
    away_rating: i32,
    league_draw_rate: f64,
) -> Result<FairOddsTriple, ModelError> {
    FairOddsConfig::default().fair_odds(home_rating, away_rating, league_draw_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_ratings_favor_home() {
        let cfg = FairOddsConfig::default();
        let p = cfg.probabilities(1500, 1500, 0.27).unwrap();
        assert!(p.home > p.away);
        assert!((p.sum() - 1.0).abs() < 1e-12);

        let odds = fair_odds(1500, 1500, 0.27).unwrap();
        assert!(odds.home < odds.away);
        assert!((odds.implied_total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_known_values() {
        // 10^(-100/400) = 0.562341...; home = 0.640065, away = 0.359935
        let raw = FairOddsConfig::default().raw_probabilities(1500, 1500, 0.27);
        assert!((raw.home - 0.640065).abs() < 1e-6);
        assert!((raw.away - 0.359935).abs() < 1e-6);
        assert!((raw.home + raw.away - 1.0).abs() < 1e-12);

        // total = 1.27
        let odds = fair_odds(1500, 1500, 0.27).unwrap();
        assert!((odds.draw - 1.27 / 0.27).abs() < 1e-9);
        assert!((odds.home - 1.27 / raw.home).abs() < 1e-9);
    }

    #[test]
    fn test_draw_rate_clamped() {
        let cfg = FairOddsConfig::default();
        assert_eq!(cfg.raw_probabilities(1500, 1600, 0.05).draw, 0.15);
        assert_eq!(cfg.raw_probabilities(1500, 1600, 0.9).draw, 0.35);
        assert_eq!(cfg.raw_probabilities(1500, 1600, 0.27).draw, 0.27);
    }

    #[test]
    fn test_stronger_away_side_is_favorite() {
        let p = FairOddsConfig::default()
            .probabilities(1400, 1700, 0.25)
            .unwrap();
        assert!(p.away > p.home);
        assert!((p.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_extreme_gap_is_computation_error() {
        // 10^499.75 overflows to infinity, home probability collapses to 0
        let err = fair_odds(0, 200_000, 0.27).unwrap_err();
        match err {
            ModelError::NonPositiveProbability { outcome, probability, .. } => {
                assert_eq!(outcome, Outcome::Home);
                assert_eq!(probability, 0.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_nan_draw_rate_is_computation_error() {
        let err = fair_odds(1500, 1500, f64::NAN).unwrap_err();
        assert!(matches!(err, ModelError::DegenerateSum(_)));
    }

    #[test]
    fn test_inverted_draw_band_rejected() {
        let cfg: FairOddsConfig = serde_json::from_str(
            r#"{"home_advantage": 100, "scale": 400, "min_draw_rate": 0.35, "max_draw_rate": 0.15}"#,
        )
        .unwrap();
        assert!(matches!(cfg.validate(), Err(ModelError::InvalidConfig(_))));

        // no panic from the clamp, a typed error instead
        let err = cfg.fair_odds(1500, 1500, 0.27).unwrap_err();
        assert!(err.to_string().contains("draw band"));
    }

    #[test]
    fn test_non_positive_scale_rejected() {
        let cfg = FairOddsConfig {
            scale: 0.0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ModelError::InvalidConfig(_))));
        assert!(FairOddsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_custom_home_advantage() {
        let cfg = FairOddsConfig {
            home_advantage: 0.0,
            ..Default::default()
        };
        let p = cfg.probabilities(1500, 1500, 0.27).unwrap();
        assert!((p.home - p.away).abs() < 1e-12);
    }
}
