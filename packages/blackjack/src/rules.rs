use crate::deck::SINGLE_DECK_VALUE;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Top-ups a full table may need before its first deal.
const MAX_SHOE_TOP_UPS: u32 = 1000;

/// Table configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableRules {
    pub casino_name: String,

    /// Decks shuffled into the shoe on each top-up
    pub decks: u8,

    pub max_players: usize,

    /// Maximum hands a player may hold through splitting
    pub max_hands: usize,

    /// Starting bankroll and rebuy amount
    pub buy_in: f64,

    pub surrender_allowed: bool,

    /// Allow drawing past the single card dealt to each split ace
    pub hit_split_aces: bool,

    /// Largest dealer hand assumed when sizing the shoe
    pub max_dealer_hand: u32,

    /// Largest player hand assumed when sizing the shoe
    pub max_player_hand: u32,
}

impl Default for TableRules {
    fn default() -> Self {
        Self {
            casino_name: "N3rds Casino".to_string(),
            decks: 1,
            max_players: 5,
            max_hands: 2,
            buy_in: 1000.0,
            surrender_allowed: true,
            hit_split_aces: false,
            max_dealer_hand: 26,
            max_player_hand: 30,
        }
    }
}

impl TableRules {
    pub fn validate(&self) -> Result<()> {
        if self.decks == 0 {
            return Err(Error::InvalidRules("at least one deck is required".into()));
        }
        if self.max_players == 0 {
            return Err(Error::InvalidRules("max_players must be at least 1".into()));
        }
        if self.max_hands == 0 || self.max_hands > u8::MAX as usize {
            return Err(Error::InvalidRules(format!(
                "max_hands must be between 1 and {}",
                u8::MAX
            )));
        }
        if !(self.buy_in.is_finite() && self.buy_in >= 1.0) {
            return Err(Error::InvalidRules(format!(
                "buy_in must be at least 1, got {}",
                self.buy_in
            )));
        }
        for (name, value) in [
            ("max_dealer_hand", self.max_dealer_hand),
            ("max_player_hand", self.max_player_hand),
        ] {
            if value == 0 || value > u8::MAX as u32 {
                return Err(Error::InvalidRules(format!(
                    "{name} must be between 1 and {}, got {value}",
                    u8::MAX
                )));
            }
        }
        let minimum = self.min_shoe_value(self.max_players);
        let reachable = u32::from(self.decks) * SINGLE_DECK_VALUE * MAX_SHOE_TOP_UPS;
        if minimum > reachable {
            return Err(Error::InvalidRules(format!(
                "a full table needs a shoe value of {minimum}, \
                 more than {MAX_SHOE_TOP_UPS} top-ups of {} decks provide",
                self.decks
            )));
        }
        Ok(())
    }

    /// Shoe value that must be available before dealing to `players` players.
    /// Saturates at `u32::MAX` rather than wrapping.
    pub fn min_shoe_value(&self, players: usize) -> u32 {
        let hands = u32::try_from(players.saturating_mul(self.max_hands)).unwrap_or(u32::MAX);
        self.max_dealer_hand.saturating_add(hands.saturating_mul(self.max_player_hand))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let rules = TableRules::default();
        assert_eq!(rules.decks, 1);
        assert_eq!(rules.max_players, 5);
        assert_eq!(rules.max_hands, 2);
        assert_eq!(rules.buy_in, 1000.0);
        assert!(rules.surrender_allowed);
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_min_shoe_value() {
        let rules = TableRules::default();
        assert_eq!(rules.min_shoe_value(0), 26);
        assert_eq!(rules.min_shoe_value(1), 86);
        assert_eq!(rules.min_shoe_value(5), 326);
    }

    #[test]
    fn test_validate_rejects_empty_table() {
        let rules = TableRules {
            max_players: 0,
            ..TableRules::default()
        };
        assert!(rules.validate().is_err());

        let rules = TableRules {
            decks: 0,
            ..TableRules::default()
        };
        assert!(rules.validate().is_err());

        let rules = TableRules {
            buy_in: 0.5,
            ..TableRules::default()
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_min_shoe_value_saturates() {
        let rules = TableRules {
            max_hands: 255,
            max_player_hand: u32::MAX,
            ..TableRules::default()
        };
        assert_eq!(rules.min_shoe_value(usize::MAX), u32::MAX);
        assert_eq!(rules.min_shoe_value(0), 26);
    }

    #[test]
    fn test_validate_rejects_unreachable_shoe() {
        let rules = TableRules {
            max_players: usize::MAX,
            ..TableRules::default()
        };
        assert!(matches!(rules.validate(), Err(Error::InvalidRules(_))));

        let rules = TableRules {
            max_player_hand: 4_000_000_000,
            ..TableRules::default()
        };
        assert!(matches!(rules.validate(), Err(Error::InvalidRules(_))));

        let rules = TableRules {
            max_dealer_hand: 0,
            ..TableRules::default()
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_largest_split_limit() {
        let rules = TableRules {
            max_hands: 255,
            ..TableRules::default()
        };
        assert!(rules.validate().is_ok());
        assert_eq!(rules.min_shoe_value(5), 26 + 5 * 255 * 30);
    }

    #[test]
    fn test_partial_rules_fill_defaults() {
        let rules: TableRules = serde_json::from_str(r#"{"decks": 6, "surrender_allowed": false}"#).unwrap();
        assert_eq!(rules.decks, 6);
        assert!(!rules.surrender_allowed);
        assert_eq!(rules.max_players, 5);
    }
}
