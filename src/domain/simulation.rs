//! Tick transition: the pure state function of the simulation.
//!
//! `step_match` maps one match to its state one second later. It never
//! mutates its input; callers publish the returned value as a new
//! snapshot.

use rand::Rng;
use rust_decimal::Decimal;

use super::market::ThreeWayOdds;
use super::match_state::Match;
use super::odds::OddsModel;

/// Advances one match by a single tick.
///
/// Not-started matches are returned unchanged. For live matches the
/// clock moves forward one second, the main odds move by trend + noise
/// and every detailed-market option moves by noise alone. The trend is
/// computed from the state before the clock advances.
pub fn step_match<R: Rng + ?Sized>(m: &Match, model: &OddsModel, rng: &mut R) -> Match {
    if !m.is_live() {
        return m.clone();
    }

    let trend = model.trend(m);

    let main_odds = ThreeWayOdds {
        home: model.adjust_option(&m.main_odds.home, trend.home, rng),
        draw: model.adjust_option(&m.main_odds.draw, trend.draw, rng),
        away: model.adjust_option(&m.main_odds.away, trend.away, rng),
    };

    // Detailed markets: noise only, no directional bias.
    let markets = m
        .markets
        .iter()
        .map(|market| market.map_options(|opt| model.adjust_option(opt, Decimal::ZERO, rng)))
        .collect();

    Match {
        clock: m.clock.advanced(),
        main_odds,
        markets,
        ..m.clone()
    }
}

/// Advances every match by a single tick, preserving order.
pub fn step_all<R: Rng + ?Sized>(matches: &[Match], model: &OddsModel, rng: &mut R) -> Vec<Match> {
    matches.iter().map(|m| step_match(m, model, rng)).collect()
}
