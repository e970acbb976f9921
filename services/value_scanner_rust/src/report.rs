//! Value bet table rendering

use valuebet_core::models::{ResolvedMatch, DEFAULT_RECOMMENDATION_EV_PCT};

/// `dd/mm HH:MM`, plus a LIVE marker for in-progress matches
pub fn format_kickoff(m: &ResolvedMatch) -> String {
    let kickoff = m.event.start_time.format("%d/%m %H:%M").to_string();
    if m.event.is_live {
        format!("{} LIVE", kickoff)
    } else {
        kickoff
    }
}

/// "Bet 1 (7.4%)" when the best outcome clears the recommendation threshold
pub fn recommendation(m: &ResolvedMatch) -> String {
    match m
        .ev
        .and_then(|ev| ev.recommendation(DEFAULT_RECOMMENDATION_EV_PCT))
    {
        Some((outcome, ev)) => format!("Bet {} ({:.1}%)", outcome.label(), ev),
        None => "No value".to_string(),
    }
}

/// One table row; `None` for matches that are not actionable.
pub fn format_row(m: &ResolvedMatch) -> Option<String> {
    let (home, away) = (m.home_team.as_ref()?, m.away_team.as_ref()?);
    let (odds, fair, ev) = (m.odds?, m.fair_odds?, m.ev?);

    Some(format!(
        "{:<14} {} vs {} | {} / {} | {:.2} - {:.2} - {:.2} | fair {:.2} - {:.2} - {:.2} | EV {:.1}% ({:.1} / {:.1} / {:.1}) | {}",
        format_kickoff(m),
        m.event.home_name,
        m.event.away_name,
        home.rating,
        away.rating,
        odds.home,
        odds.draw,
        odds.away,
        fair.home,
        fair.draw,
        fair.away,
        ev.max,
        ev.home,
        ev.draw,
        ev.away,
        recommendation(m)
    ))
}

pub fn render_table(matches: &[&ResolvedMatch]) -> Vec<String> {
    if matches.is_empty() {
        return vec!["No matches found with the current filters".to_string()];
    }
    matches.iter().filter_map(|m| format_row(m)).collect()
}
