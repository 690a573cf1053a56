//! Live odds movement model.
//!
//! Every tick each open odd moves by `noise + trend`, where noise is
//! uniform in `[-amplitude, +amplitude]` and trend is a directional nudge
//! derived from the score differential and elapsed time. Only the main
//! three-way odds receive a trend; detailed markets get noise alone.
//!
//! Noise is drawn on a 1e-4 grid so all arithmetic stays in exact decimals.

use rand::Rng;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::market::MarketOption;
use super::match_state::Match;

/// Lowest odd the engine will ever publish.
pub const ODDS_FLOOR: Decimal = dec!(1.01);

/// Odds at or above this are treated as near-impossible and frozen.
pub const EXTREME_ODDS: Decimal = dec!(100);

/// Directional nudge applied per tick to the main three-way odds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Trend {
    pub home: Decimal,
    pub draw: Decimal,
    pub away: Decimal,
}

/// Trend + noise odds model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OddsModel {
    /// Trend magnitude `b`.
    pub trend_bias: Decimal,
    /// Half-width of the uniform noise band.
    pub noise_amplitude: Decimal,
    /// Published odds never drop below this.
    pub floor: Decimal,
    /// Odds at or above this never move.
    pub extreme: Decimal,
    /// Past this minute a level score pulls the draw odd down.
    pub late_game_minute: u32,
}

impl Default for OddsModel {
    fn default() -> Self {
        Self {
            trend_bias: dec!(0.01),
            noise_amplitude: dec!(0.01),
            floor: ODDS_FLOOR,
            extreme: EXTREME_ODDS,
            late_game_minute: 70,
        }
    }
}

impl OddsModel {
    /// Computes the trend for a match from its current state.
    ///
    /// - home leading: home −b, away +2b, draw +b/2
    /// - away leading: away −b, home +2b, draw +b/2
    /// - level: draw −b once past the late-game minute, otherwise flat
    pub fn trend(&self, m: &Match) -> Trend {
        let b = self.trend_bias;
        let diff = m.score_diff();

        if diff > 0 {
            Trend {
                home: -b,
                draw: b / Decimal::TWO,
                away: b * Decimal::TWO,
            }
        } else if diff < 0 {
            Trend {
                home: b * Decimal::TWO,
                draw: b / Decimal::TWO,
                away: -b,
            }
        } else if m.clock.minutes() > self.late_game_minute {
            Trend {
                draw: -b,
                ..Trend::default()
            }
        } else {
            Trend::default()
        }
    }

    /// Draws one noise sample, uniform on the 1e-4 grid.
    pub fn sample_noise<R: Rng + ?Sized>(&self, rng: &mut R) -> Decimal {
        let steps = (self.noise_amplitude * dec!(10000))
            .trunc()
            .to_i64()
            .unwrap_or(0)
            .abs();
        if steps == 0 {
            return Decimal::ZERO;
        }
        Decimal::new(rng.gen_range(-steps..=steps), 4)
    }

    /// Whether an odd is frozen (exactly at the floor, or extreme).
    pub fn is_frozen(&self, odd: Decimal) -> bool {
        odd == self.floor || odd >= self.extreme
    }

    /// Largest distance a published odd can move in one tick, in cents.
    pub fn max_tick_move(&self) -> Decimal {
        (self.noise_amplitude + self.trend_bias * Decimal::TWO)
            .round_dp_with_strategy(2, RoundingStrategy::AwayFromZero)
    }

    /// Moves a single odd by `noise + trend`.
    ///
    /// Odds below the floor are lifted to it, frozen odds come back
    /// unchanged. Everything else is rounded half-away-from-zero to 2 dp
    /// and clamped to the floor.
    pub fn adjust(&self, odd: Decimal, noise: Decimal, trend: Decimal) -> Decimal {
        if odd < self.floor {
            return self.floor;
        }
        if self.is_frozen(odd) {
            return odd;
        }
        (odd + noise + trend)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .max(self.floor)
    }

    /// Moves an option, drawing fresh noise. Locked options are skipped.
    pub fn adjust_option<R: Rng + ?Sized>(
        &self,
        option: &MarketOption,
        trend: Decimal,
        rng: &mut R,
    ) -> MarketOption {
        if option.locked {
            return option.clone();
        }
        let noise = self.sample_noise(rng);
        option.with_odd(self.adjust(option.odd, noise, trend))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::ThreeWayOdds;
    use crate::domain::match_state::{GameClock, Period, SportType, TeamSide};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn scored(home: u32, away: u32, clock: GameClock) -> Match {
        Match {
            id: "m".to_string(),
            sport: SportType::Football,
            league: "Test League".to_string(),
            home: TeamSide::new("Home FC", home),
            away: TeamSide::new("Away FC", away),
            clock,
            period: Period::SecondHalf,
            has_live_video: false,
            has_animation: false,
            main_odds: ThreeWayOdds::new(dec!(2.00), dec!(3.00), dec!(4.00)),
            markets: Vec::new(),
        }
    }

    #[test]
    fn test_trend_home_leading() {
        let model = OddsModel::default();
        let t = model.trend(&scored(2, 0, GameClock::new(32, 10)));
        assert_eq!(t.home, dec!(-0.01));
        assert_eq!(t.away, dec!(0.02));
        assert_eq!(t.draw, dec!(0.005));
    }

    #[test]
    fn test_trend_away_leading() {
        let model = OddsModel::default();
        let t = model.trend(&scored(0, 1, GameClock::new(10, 0)));
        assert_eq!(t.home, dec!(0.02));
        assert_eq!(t.away, dec!(-0.01));
        assert_eq!(t.draw, dec!(0.005));
    }

    #[test]
    fn test_trend_level_score_depends_on_minute() {
        let model = OddsModel::default();
        assert_eq!(model.trend(&scored(1, 1, GameClock::new(70, 59))), Trend::default());
        let late = model.trend(&scored(1, 1, GameClock::new(71, 0)));
        assert_eq!(late.draw, dec!(-0.01));
        assert_eq!(late.home, Decimal::ZERO);
        assert_eq!(late.away, Decimal::ZERO);
    }

    #[test]
    fn test_noise_stays_in_band() {
        let model = OddsModel::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..10_000 {
            let n = model.sample_noise(&mut rng);
            assert!(n >= dec!(-0.01) && n <= dec!(0.01), "noise out of band: {n}");
        }
    }

    #[test]
    fn test_adjust_rounds_and_clamps() {
        let model = OddsModel::default();
        assert_eq!(model.adjust(dec!(2.80), dec!(0.0049), dec!(0)), dec!(2.80));
        assert_eq!(model.adjust(dec!(2.80), dec!(0.0050), dec!(0)), dec!(2.81));
        assert_eq!(model.adjust(dec!(1.02), dec!(-0.01), dec!(-0.01)), dec!(1.01));
    }

    #[test]
    fn test_adjust_leaves_frozen_odds() {
        let model = OddsModel::default();
        assert_eq!(model.adjust(dec!(1.01), dec!(0.01), dec!(0.02)), dec!(1.01));
        assert_eq!(model.adjust(dec!(101.0), dec!(-0.01), dec!(-0.01)), dec!(101.0));
        assert_eq!(model.adjust(dec!(100), dec!(-0.01), dec!(0)), dec!(100));
    }

    #[test]
    fn test_adjust_lifts_odds_below_floor() {
        let model = OddsModel::default();
        assert_eq!(model.adjust(dec!(0.90), dec!(0), dec!(0)), dec!(1.01));
        assert_eq!(model.adjust(dec!(1.00), dec!(0.01), dec!(0.02)), dec!(1.01));
    }

    #[test]
    fn test_max_tick_move() {
        assert_eq!(OddsModel::default().max_tick_move(), dec!(0.03));
        let model = OddsModel {
            trend_bias: dec!(0.0025),
            noise_amplitude: dec!(0.0001),
            ..OddsModel::default()
        };
        assert_eq!(model.max_tick_move(), dec!(0.01));
    }

    #[test]
    fn test_locked_option_is_untouched() {
        let model = OddsModel::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let locked = MarketOption::locked("0:0", dec!(41.0));
        for _ in 0..100 {
            assert_eq!(model.adjust_option(&locked, dec!(0.02), &mut rng), locked);
        }
    }
}
