mod action;
mod card;
mod deck;
mod error;
mod event;
mod game_state;
mod hand;
mod io;
mod player;
mod rules;
mod shoe;

pub use action::{Action, ParseActionError};
pub use card::{Card, Rank, Suit};
pub use deck::{DeckTemplate, SINGLE_DECK_VALUE};
pub use error::{Error, Result, Unavailable};
pub use event::{HandView, Question, TableEvent};
pub use game_state::{GamePhase, GameState, RoundReport, SettlementRecord};
pub use hand::{can_split_cards, Hand, HandOutcome, HitResult, Settlement, DEALER_STANDS_ON};
pub use io::{BetResponse, TableIo};
pub use player::{Player, PlayerId, Seat, SplitResult};
pub use rules::TableRules;
pub use shoe::Shoe;
