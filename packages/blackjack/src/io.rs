//! The table's decision points, answered by whatever drives the game.
//!
//! Implementations own input validation: the engine expects answers drawn from
//! the options it offered. Returning an error ends the session.

use crate::error::Result;
use crate::event::{HandView, Question, TableEvent};
use crate::{Action, Player};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetResponse {
    Bet(u64),
    Leave,
}

pub trait TableIo {
    fn request_player_count(&mut self, min: usize, max: usize) -> Result<usize>;

    /// `seat` is 1-based. An empty name is replaced by "Player N".
    fn request_player_name(&mut self, seat: usize) -> Result<String>;

    fn request_bet(&mut self, player: &Player) -> Result<BetResponse>;

    fn request_yes_no(&mut self, question: &Question) -> Result<bool>;

    fn request_action(&mut self, hand: &HandView, legal: &[Action]) -> Result<Action>;

    fn notify(&mut self, event: TableEvent) -> Result<()>;
}
