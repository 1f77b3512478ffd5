//! Everything the table announces to its presentation layer.

use crate::hand::{Hand, HandOutcome};
use crate::{Action, Card};
use serde::Serialize;

/// Snapshot of a hand, labelled with its owner's name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandView {
    pub owner: String,
    pub hand_id: u8,
    /// Owner holds more than one hand, so the id is worth showing.
    pub multiple: bool,
    pub cards: Vec<Card>,
    pub total: u8,
    pub soft: bool,
    pub bet: f64,
    pub doubled: bool,
}

impl HandView {
    pub fn new(owner: &str, hand: &Hand, multiple: bool) -> Self {
        Self {
            owner: owner.to_string(),
            hand_id: hand.id,
            multiple,
            cards: hand.cards.clone(),
            total: hand.total,
            soft: hand.is_soft(),
            bet: hand.bet,
            doubled: hand.doubled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TableEvent {
    Welcome {
        casino: String,
        decks: u8,
        max_players: usize,
        max_hands: usize,
        surrender_allowed: bool,
    },
    DeckAdded {
        /// The shoe held nothing before this deck.
        first: bool,
        shoe_value: u32,
    },
    PlayerSeated {
        player: String,
        bankroll: f64,
    },
    BetRejected {
        player: String,
        amount: u64,
        bankroll: f64,
    },
    BetPlaced {
        player: String,
        amount: u64,
        bankroll: f64,
    },
    PlayerLeft {
        player: String,
        bankroll: f64,
    },
    HandShown(HandView),
    DealerUpcard {
        card: Card,
    },
    Blackjack {
        player: String,
        hand_id: u8,
    },
    InsuranceUnaffordable {
        player: String,
    },
    InsuranceTaken {
        player: String,
        stake: f64,
    },
    DealerBlackjack(HandView),
    DealerNoBlackjack,
    ActionTaken {
        player: String,
        hand_id: u8,
        action: Action,
    },
    ActionRejected {
        player: String,
        hand_id: u8,
        action: Action,
        reason: String,
    },
    Stood {
        player: String,
        hand_id: u8,
        total: u8,
    },
    Busted {
        player: String,
        hand_id: u8,
        total: u8,
    },
    DealerHits,
    DealerBusts {
        total: u8,
    },
    Settled {
        player: String,
        hand_id: u8,
        outcome: HandOutcome,
        bet: f64,
        credit: f64,
        insurance_credit: f64,
        bankroll: f64,
    },
    Rebuy {
        player: String,
        amount: f64,
    },
    LeftTable {
        player: String,
    },
    RoundComplete {
        round: u64,
        players: usize,
    },
}

/// Yes/no decisions the table asks for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "question", rename_all = "snake_case")]
pub enum Question {
    Insurance { player: String, cost: f64 },
    Rebuy { player: String, buy_in: f64 },
}
