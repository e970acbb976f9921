//! Expected value of market odds against fair odds.

use crate::models::{EvResult, FairOddsTriple, OddsTriple, Outcome};

/// EV percentage of taking `market` when the fair price is `fair`.
#[inline]
pub fn edge_pct(market: f64, fair: f64) -> f64 {
    (market / fair - 1.0) * 100.0
}

/// Per-outcome EV plus the selected best outcome.
///
/// Selection: home when it beats both draw and away strictly, else away when
/// it beats draw, else draw. `max` is the EV of the selected outcome.
pub fn evaluate(market: &OddsTriple, fair: &FairOddsTriple) -> EvResult {
    let home = edge_pct(market.home, fair.home);
    let draw = edge_pct(market.draw, fair.draw);
    let away = edge_pct(market.away, fair.away);

    let best = if home > draw && home > away {
        Outcome::Home
    } else if away > draw {
        Outcome::Away
    } else {
        Outcome::Draw
    };

    let max = match best {
        Outcome::Home => home,
        Outcome::Draw => draw,
        Outcome::Away => away,
    };

    EvResult {
        home,
        draw,
        away,
        max,
        best,
    }
}
