//! Match state types.
//!
//! A `Match` is an immutable value: the tick engine never edits one in
//! place, it builds the next value from the previous one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::market::{Market, MarketOption, MarketRef, ThreeWayOdds};

// ────────────────────────────────────────────
// Type aliases consumed by ports and adapters
// ────────────────────────────────────────────

/// Match identifier.
pub type MatchId = String;

/// Market identifier (unique within a match).
pub type MarketId = String;

// ────────────────────────────────────────────
// Enums
// ────────────────────────────────────────────

/// Sport categories offered in the lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SportType {
    Football,
    Basketball,
    Tennis,
    Esports,
    Virtual,
}

impl SportType {
    /// Every category, in lobby display order.
    pub const ALL: [Self; 5] = [
        Self::Football,
        Self::Basketball,
        Self::Tennis,
        Self::Esports,
        Self::Virtual,
    ];
}

impl fmt::Display for SportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Football => write!(f, "football"),
            Self::Basketball => write!(f, "basketball"),
            Self::Tennis => write!(f, "tennis"),
            Self::Esports => write!(f, "esports"),
            Self::Virtual => write!(f, "virtual"),
        }
    }
}

impl FromStr for SportType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sport| sport.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("unknown sport type: {s}"))
    }
}

/// Match period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    NotStarted,
    FirstHalf,
    SecondHalf,
}

impl Period {
    /// Whether the clock runs (and odds move) in this period.
    pub fn is_live(self) -> bool {
        !matches!(self, Self::NotStarted)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not started"),
            Self::FirstHalf => write!(f, "first half"),
            Self::SecondHalf => write!(f, "second half"),
        }
    }
}

// ────────────────────────────────────────────
// Game clock
// ────────────────────────────────────────────

/// Elapsed match time, rendered as `m:ss`.
///
/// Serialized as its display string so the boundary keeps the
/// familiar `"65:20"` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameClock {
    minutes: u32,
    seconds: u32,
}

impl GameClock {
    /// Clock at kick-off.
    pub const ZERO: Self = Self {
        minutes: 0,
        seconds: 0,
    };

    /// Builds a clock, carrying any overflowing seconds into minutes.
    pub fn new(minutes: u32, seconds: u32) -> Self {
        Self {
            minutes: minutes.saturating_add(seconds / 60),
            seconds: seconds % 60,
        }
    }

    /// Elapsed whole minutes.
    pub fn minutes(self) -> u32 {
        self.minutes
    }

    /// Seconds within the current minute.
    pub fn seconds(self) -> u32 {
        self.seconds
    }

    /// The clock one second later. A clock at `u32::MAX:59` stays put.
    pub fn advanced(self) -> Self {
        let seconds = self.seconds + 1;
        if seconds >= 60 {
            match self.minutes.checked_add(1) {
                Some(minutes) => Self { minutes, seconds: 0 },
                None => self,
            }
        } else {
            Self {
                minutes: self.minutes,
                seconds,
            }
        }
    }
}

impl fmt::Display for GameClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.minutes, self.seconds)
    }
}

impl FromStr for GameClock {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (min, sec) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("clock must be mm:ss, got {s:?}"))?;
        let minutes: u32 = min
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid clock minutes in {s:?}"))?;
        let seconds: u32 = sec
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid clock seconds in {s:?}"))?;
        anyhow::ensure!(seconds < 60, "clock seconds out of range in {s:?}");
        Ok(Self { minutes, seconds })
    }
}

impl TryFrom<String> for GameClock {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GameClock> for String {
    fn from(clock: GameClock) -> Self {
        clock.to_string()
    }
}

// ────────────────────────────────────────────
// Match
// ────────────────────────────────────────────

/// One team's side of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSide {
    pub name: String,
    pub score: u32,
    #[serde(default)]
    pub red_cards: u32,
    #[serde(default)]
    pub yellow_cards: u32,
    #[serde(default)]
    pub corners: u32,
}

impl TeamSide {
    /// A side with only name and score set.
    pub fn new(name: impl Into<String>, score: u32) -> Self {
        Self {
            name: name.into(),
            score,
            red_cards: 0,
            yellow_cards: 0,
            corners: 0,
        }
    }
}

/// A match as shown in the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub sport: SportType,
    pub league: String,
    pub home: TeamSide,
    pub away: TeamSide,
    pub clock: GameClock,
    pub period: Period,
    #[serde(default)]
    pub has_live_video: bool,
    #[serde(default)]
    pub has_animation: bool,
    /// Main three-way odds shown on the match list.
    pub main_odds: ThreeWayOdds,
    /// Detailed markets in display order.
    #[serde(default)]
    pub markets: Vec<Market>,
}

impl Match {
    /// Home score minus away score.
    pub fn score_diff(&self) -> i64 {
        i64::from(self.home.score) - i64::from(self.away.score)
    }

    /// Whether the match is in play.
    pub fn is_live(&self) -> bool {
        self.period.is_live()
    }

    /// Finds a detailed market by id.
    pub fn market(&self, id: &str) -> Option<&Market> {
        self.markets.iter().find(|m| m.id == id)
    }

    /// Resolves a selection target to the option it currently points at.
    pub fn find_option(&self, market: &MarketRef, label: &str) -> Option<&MarketOption> {
        match market {
            MarketRef::Main => self.main_odds.get(label),
            MarketRef::Detailed(id) => self.market(id)?.option(label),
        }
    }

    /// Every option of the match: main odds first, then detailed markets.
    pub fn all_options(&self) -> impl Iterator<Item = &MarketOption> {
        self.main_odds
            .as_array()
            .into_iter()
            .chain(self.markets.iter().flat_map(Market::options))
    }
}
