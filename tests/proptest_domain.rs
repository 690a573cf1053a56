//! Property-Based Tests — Domain Layer Invariants
//!
//! Uses `proptest` to verify that the odds model and the tick
//! transition maintain their invariants across random inputs.

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use live_odds_lobby::adapters::catalog::builtin;
use live_odds_lobby::domain::odds::ODDS_FLOOR;
use live_odds_lobby::domain::wager::{parse_stake, potential_return, DEFAULT_MIN_STAKE};
use live_odds_lobby::domain::{step_all, GameClock, OddsModel, Period};

fn odd() -> impl Strategy<Value = Decimal> {
    // 0.50 .. 150.00 in cents, covering below-floor and frozen values.
    (50i64..15_000).prop_map(|cents| Decimal::new(cents, 2))
}

// ── Odds Model Properties ───────────────────────────────────

proptest! {
    /// An adjusted odd never drops below the floor.
    #[test]
    fn adjusted_odd_respects_floor(
        current in odd(),
        noise_bp in -100i64..=100,
        trend_bp in -200i64..=200,
    ) {
        let model = OddsModel::default();
        let adjusted = model.adjust(current, Decimal::new(noise_bp, 4), Decimal::new(trend_bp, 4));
        if current < dec!(1.01) {
            prop_assert_eq!(adjusted, dec!(1.01));
        } else if model.is_frozen(current) {
            prop_assert_eq!(adjusted, current);
        } else {
            prop_assert!(adjusted >= dec!(1.01), "{current} -> {adjusted}");
            prop_assert!(adjusted.scale() <= 2, "not rounded: {adjusted}");
        }
    }

    /// Sampled noise stays inside the configured band.
    #[test]
    fn noise_within_band(seed in any::<u64>()) {
        let model = OddsModel::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for _ in 0..32 {
            let noise = model.sample_noise(&mut rng);
            prop_assert!(noise.abs() <= dec!(0.01), "noise {noise}");
        }
    }
}

// ── Tick Transition Properties ──────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// After any number of ticks every non-locked option is >= 1.01
    /// and locked options are untouched.
    #[test]
    fn ticks_keep_odds_above_floor(seed in any::<u64>(), ticks in 1usize..300) {
        let model = OddsModel::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let initial = builtin::football();
        let mut matches = initial.clone();
        for _ in 0..ticks {
            matches = step_all(&matches, &model, &mut rng);
        }
        for (before, after) in initial.iter().zip(&matches) {
            for (a, b) in before.all_options().zip(after.all_options()) {
                prop_assert_eq!(&a.label, &b.label);
                if a.locked {
                    prop_assert_eq!(a, b);
                } else {
                    prop_assert!(b.odd >= dec!(1.01), "{} {} = {}", after.id, b.label, b.odd);
                }
            }
        }
    }

    /// Not-started matches never advance their clock; live clocks advance
    /// by exactly one second per tick.
    #[test]
    fn clocks_follow_period(seed in any::<u64>(), ticks in 1u32..400) {
        let model = OddsModel::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let initial = builtin::football();
        let mut matches = initial.clone();
        for _ in 0..ticks {
            matches = step_all(&matches, &model, &mut rng);
        }
        for (before, after) in initial.iter().zip(&matches) {
            let elapsed = |c: GameClock| c.minutes() * 60 + c.seconds();
            if before.period == Period::NotStarted {
                prop_assert_eq!(after.clock, GameClock::ZERO);
            } else {
                prop_assert_eq!(elapsed(after.clock), elapsed(before.clock) + ticks);
            }
        }
    }

    /// Scores never change during a tick.
    #[test]
    fn scores_are_stable(seed in any::<u64>()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let initial = builtin::football();
        let next = step_all(&initial, &OddsModel::default(), &mut rng);
        for (before, after) in initial.iter().zip(&next) {
            prop_assert_eq!(before.home.score, after.home.score);
            prop_assert_eq!(before.away.score, after.away.score);
        }
    }
}

// ── Clock Properties ────────────────────────────────────────

proptest! {
    /// Display and parse agree for every valid clock.
    #[test]
    fn clock_text_round_trip(minutes in 0u32..200, seconds in 0u32..60) {
        let clock = GameClock::new(minutes, seconds);
        let parsed: GameClock = clock.to_string().parse().unwrap();
        prop_assert_eq!(parsed, clock);
    }

    /// Advancing carries seconds into minutes.
    #[test]
    fn clock_advance_carries(minutes in 0u32..200, seconds in 0u32..60) {
        let next = GameClock::new(minutes, seconds).advanced();
        if seconds == 59 {
            prop_assert_eq!(next, GameClock::new(minutes + 1, 0));
        } else {
            prop_assert_eq!(next, GameClock::new(minutes, seconds + 1));
        }
    }
}

// ── Stake Properties ────────────────────────────────────────

proptest! {
    /// Any whole-cent positive amount parses back to itself.
    #[test]
    fn cent_amounts_parse(cents in 1i64..10_000_000) {
        let amount = Decimal::new(cents, 2);
        prop_assert_eq!(parse_stake(Some(&amount.to_string()), DEFAULT_MIN_STAKE).unwrap(), amount);
    }

    /// Potential return is at least the stake (odds are >= 1.01).
    #[test]
    fn return_exceeds_stake(cents in 1i64..1_000_000, quoted in odd()) {
        let stake = Decimal::new(cents, 2);
        prop_assert!(potential_return(stake, quoted, ODDS_FLOOR).unwrap() >= stake);
    }
}
