//! Bundled football catalog used when no catalog file is configured.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::{
    GameClock, Market, MarketBook, MarketOption, Match, Period, SportType, TeamSide, ThreeWayOdds,
};

fn open(options: &[(&str, Decimal)]) -> Vec<MarketOption> {
    options
        .iter()
        .map(|&(label, odd)| MarketOption::new(label, odd))
        .collect()
}

fn grid(options: &[(&str, Decimal)]) -> MarketBook {
    MarketBook::Grid {
        options: open(options),
    }
}

fn side(name: &str, score: u32, yellow_cards: u32, corners: u32) -> TeamSide {
    TeamSide {
        yellow_cards,
        corners,
        ..TeamSide::new(name, score)
    }
}

fn match_winner(odds: &ThreeWayOdds) -> Market {
    Market::new("match_winner", "Match Winner", MarketBook::ThreeWay(odds.clone()))
}

/// Three football matches: two in play, one not started.
pub fn football() -> Vec<Match> {
    let madrid_bayern = ThreeWayOdds::new(dec!(2.80), dec!(3.10), dec!(2.55));
    let city_arsenal = ThreeWayOdds::new(dec!(1.25), dec!(5.50), dec!(11.00));
    let milan_inter = ThreeWayOdds::new(dec!(2.60), dec!(3.30), dec!(2.60));

    vec![
        Match {
            id: "m1".to_string(),
            sport: SportType::Football,
            league: "Champions League".to_string(),
            home: side("Real Madrid", 1, 1, 4),
            away: side("Bayern Munich", 1, 2, 3),
            clock: GameClock::new(65, 20),
            period: Period::SecondHalf,
            has_live_video: true,
            has_animation: true,
            markets: vec![
                match_winner(&madrid_bayern),
                Market::new(
                    "correct_score",
                    "Correct Score",
                    grid(&[
                        ("1:1", dec!(3.50)),
                        ("2:1", dec!(6.50)),
                        ("1:2", dec!(7.00)),
                        ("2:2", dec!(11.0)),
                        ("3:1", dec!(15.0)),
                        ("1:3", dec!(18.0)),
                        ("3:2", dec!(26.0)),
                        ("2:3", dec!(28.0)),
                        ("3:3", dec!(51.0)),
                        ("Other", dec!(8.50)),
                    ]),
                ),
                Market::new(
                    "total_goals",
                    "Total Goals",
                    grid(&[
                        ("2 goals", dec!(2.80)),
                        ("3 goals", dec!(2.50)),
                        ("4 goals", dec!(3.80)),
                        ("5+ goals", dec!(5.50)),
                    ]),
                ),
            ],
            main_odds: madrid_bayern,
        },
        Match {
            id: "m2".to_string(),
            sport: SportType::Football,
            league: "Premier League".to_string(),
            home: side("Manchester City", 2, 0, 6),
            away: side("Arsenal", 0, 1, 1),
            clock: GameClock::new(32, 10),
            period: Period::FirstHalf,
            has_live_video: true,
            has_animation: true,
            markets: vec![
                match_winner(&city_arsenal),
                Market::new("correct_score", "Correct Score", {
                    let mut options = open(&[
                        ("2:0", dec!(3.20)),
                        ("2:1", dec!(8.50)),
                        ("3:0", dec!(5.50)),
                        ("3:1", dec!(10.0)),
                        ("4:0", dec!(12.0)),
                        ("2:2", dec!(15.0)),
                        ("0:1", dec!(41.0)),
                        ("1:1", dec!(21.0)),
                        ("Other", dec!(4.50)),
                    ]);
                    // Already impossible at 2:0.
                    options.insert(6, MarketOption::locked("0:0", dec!(101.0)));
                    MarketBook::Grid { options }
                }),
                Market::new(
                    "total_goals",
                    "Total Goals",
                    grid(&[
                        ("2 goals", dec!(4.50)),
                        ("3 goals", dec!(2.80)),
                        ("4+ goals", dec!(2.10)),
                    ]),
                ),
            ],
            main_odds: city_arsenal,
        },
        Match {
            id: "m3".to_string(),
            sport: SportType::Football,
            league: "Serie A".to_string(),
            home: side("AC Milan", 0, 0, 2),
            away: side("Inter", 0, 0, 1),
            clock: GameClock::ZERO,
            period: Period::NotStarted,
            has_live_video: false,
            has_animation: false,
            markets: vec![
                match_winner(&milan_inter),
                Market::new(
                    "correct_score",
                    "Correct Score",
                    grid(&[
                        ("1:0", dec!(8.00)),
                        ("0:0", dec!(9.50)),
                        ("0:1", dec!(8.00)),
                        ("2:0", dec!(13.0)),
                        ("1:1", dec!(6.50)),
                        ("0:2", dec!(13.0)),
                        ("2:1", dec!(9.00)),
                        ("2:2", dec!(15.0)),
                        ("1:2", dec!(9.00)),
                        ("Other", dec!(5.00)),
                    ]),
                ),
            ],
            main_odds: milan_inter,
        },
    ]
}
