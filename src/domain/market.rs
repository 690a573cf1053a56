//! Market model: bettable options per match.
//!
//! Markets are a closed set of shapes. The three-way row carries the
//! home/draw/away triple, grid markets render as multi-column outcome
//! tiles (correct score, total goals) and list markets as single-column
//! rows. The layout hint is derived from the shape, never stored.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::match_state::MarketId;

/// Label of the home-win outcome in a three-way market.
pub const HOME_LABEL: &str = "Home";
/// Label of the draw outcome in a three-way market.
pub const DRAW_LABEL: &str = "Draw";
/// Label of the away-win outcome in a three-way market.
pub const AWAY_LABEL: &str = "Away";

/// A single outcome that can be wagered on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketOption {
    /// Display label, unique within its market.
    pub label: String,
    /// Decimal odd (minimum 1.01).
    pub odd: Decimal,
    /// Locked options are frozen and never wagerable.
    #[serde(default)]
    pub locked: bool,
}

impl MarketOption {
    /// Creates an open (wagerable) option.
    pub fn new(label: impl Into<String>, odd: Decimal) -> Self {
        Self {
            label: label.into(),
            odd,
            locked: false,
        }
    }

    /// Creates a locked option.
    pub fn locked(label: impl Into<String>, odd: Decimal) -> Self {
        Self {
            label: label.into(),
            odd,
            locked: true,
        }
    }

    /// Same option quoted at a different odd (lock state preserved).
    pub fn with_odd(&self, odd: Decimal) -> Self {
        Self {
            label: self.label.clone(),
            odd,
            locked: self.locked,
        }
    }
}

/// Home/draw/away odds triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreeWayOdds {
    pub home: MarketOption,
    pub draw: MarketOption,
    pub away: MarketOption,
}

impl ThreeWayOdds {
    /// Builds an open triple with the canonical labels.
    pub fn new(home: Decimal, draw: Decimal, away: Decimal) -> Self {
        Self {
            home: MarketOption::new(HOME_LABEL, home),
            draw: MarketOption::new(DRAW_LABEL, draw),
            away: MarketOption::new(AWAY_LABEL, away),
        }
    }

    /// Options in display order.
    pub fn as_array(&self) -> [&MarketOption; 3] {
        [&self.home, &self.draw, &self.away]
    }

    /// Finds an option by label.
    pub fn get(&self, label: &str) -> Option<&MarketOption> {
        self.as_array().into_iter().find(|o| o.label == label)
    }
}

/// Presentation hint carried in the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Multi-column tiles.
    Grid,
    /// Single-column rows.
    List,
}

/// The closed set of market shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarketBook {
    /// Home/draw/away row.
    ThreeWay(ThreeWayOdds),
    /// Grid of outcomes (correct score, total goals).
    Grid { options: Vec<MarketOption> },
    /// Plain single-column list.
    List { options: Vec<MarketOption> },
}

/// A bettable market attached to a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    /// Market identifier, unique within its match.
    pub id: MarketId,
    /// Display name.
    pub name: String,
    /// Options, shaped by market type.
    #[serde(flatten)]
    pub book: MarketBook,
}

impl Market {
    /// Creates a market from its shape.
    pub fn new(id: impl Into<MarketId>, name: impl Into<String>, book: MarketBook) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            book,
        }
    }

    /// Layout hint for the display layer.
    pub fn layout(&self) -> Layout {
        match self.book {
            MarketBook::Grid { .. } => Layout::Grid,
            MarketBook::ThreeWay(_) | MarketBook::List { .. } => Layout::List,
        }
    }

    /// All options in display order.
    pub fn options(&self) -> Vec<&MarketOption> {
        match &self.book {
            MarketBook::ThreeWay(odds) => odds.as_array().to_vec(),
            MarketBook::Grid { options } | MarketBook::List { options } => {
                options.iter().collect()
            }
        }
    }

    /// Finds an option by label.
    pub fn option(&self, label: &str) -> Option<&MarketOption> {
        self.options().into_iter().find(|o| o.label == label)
    }

    /// Returns a copy of this market with every option rewritten by `f`.
    ///
    /// Shape, order and identity are preserved.
    pub fn map_options<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&MarketOption) -> MarketOption,
    {
        let book = match &self.book {
            MarketBook::ThreeWay(odds) => MarketBook::ThreeWay(ThreeWayOdds {
                home: f(&odds.home),
                draw: f(&odds.draw),
                away: f(&odds.away),
            }),
            MarketBook::Grid { options } => MarketBook::Grid {
                options: options.iter().map(&mut f).collect(),
            },
            MarketBook::List { options } => MarketBook::List {
                options: options.iter().map(&mut f).collect(),
            },
        };

        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            book,
        }
    }
}

/// Which market of a match a selection points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketRef {
    /// The main three-way odds shown on the match list.
    Main,
    /// A detailed market by id.
    Detailed(MarketId),
}

impl MarketRef {
    /// Maps an optional market id from the boundary (`None` = main odds).
    pub fn from_id(id: Option<&str>) -> Self {
        match id {
            None | Some("" | "main") => Self::Main,
            Some(id) => Self::Detailed(id.to_string()),
        }
    }
}

impl std::fmt::Display for MarketRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Main => write!(f, "main"),
            Self::Detailed(id) => write!(f, "{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn correct_score() -> Market {
        Market::new(
            "correct_score",
            "Correct Score",
            MarketBook::Grid {
                options: vec![
                    MarketOption::new("2:0", dec!(3.20)),
                    MarketOption::locked("0:0", dec!(101.0)),
                ],
            },
        )
    }

    #[test]
    fn test_layout_follows_shape() {
        assert_eq!(correct_score().layout(), Layout::Grid);
        let winner = Market::new(
            "match_winner",
            "Match Winner",
            MarketBook::ThreeWay(ThreeWayOdds::new(dec!(1.25), dec!(5.50), dec!(11.00))),
        );
        assert_eq!(winner.layout(), Layout::List);
        assert_eq!(winner.options().len(), 3);
    }

    #[test]
    fn test_option_lookup_by_label() {
        let market = correct_score();
        assert!(market.option("0:0").is_some_and(|o| o.locked));
        assert!(market.option("9:9").is_none());
    }

    #[test]
    fn test_map_options_preserves_order_and_shape() {
        let market = correct_score();
        let bumped = market.map_options(|o| o.with_odd(o.odd + dec!(1)));
        let labels: Vec<_> = bumped.options().iter().map(|o| o.label.clone()).collect();
        assert_eq!(labels, vec!["2:0", "0:0"]);
        assert_eq!(bumped.option("2:0").map(|o| o.odd), Some(dec!(4.20)));
        assert_eq!(bumped.layout(), Layout::Grid);
    }

    #[test]
    fn test_market_ref_from_boundary_id() {
        assert_eq!(MarketRef::from_id(None), MarketRef::Main);
        assert_eq!(MarketRef::from_id(Some("main")), MarketRef::Main);
        assert_eq!(
            MarketRef::from_id(Some("total_goals")),
            MarketRef::Detailed("total_goals".to_string())
        );
    }

    #[test]
    fn test_market_json_shape() {
        let json = serde_json::to_value(correct_score()).unwrap();
        assert_eq!(json["type"], "grid");
        assert_eq!(json["options"][1]["locked"], true);
    }
}
