use crate::error::{Error, Result, Unavailable};
use crate::hand::{Hand, Settlement};
use crate::{Action, Shoe, TableRules};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Who a hand belongs to. Hands refer to their owner by id only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    Dealer,
    Player(PlayerId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub bankroll: f64,
    pub hands: Vec<Hand>,
    pub has_insurance: bool,
}

/// Result of a split: where the new hand went and which hands locked on their dealt card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitResult {
    pub new_hand: usize,
    pub locked: [bool; 2],
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, bankroll: f64) -> Self {
        Self {
            id,
            name: name.into(),
            bankroll,
            hands: Vec::new(),
            has_insurance: false,
        }
    }

    pub fn seat(&self) -> Seat {
        Seat::Player(self.id)
    }

    pub fn start_round(&mut self) {
        self.hands = vec![Hand::new(self.seat(), 1)];
        self.has_insurance = false;
    }

    pub fn hand(&self, index: usize) -> Result<&Hand> {
        self.hands.get(index).ok_or(Error::UnknownHand(index))
    }

    fn hand_mut(&mut self, index: usize) -> Result<&mut Hand> {
        self.hands.get_mut(index).ok_or(Error::UnknownHand(index))
    }

    pub fn has_multiple_hands(&self) -> bool {
        self.hands.len() > 1
    }

    /// Stakes `amount` on the opening hand and takes it out of the bankroll.
    pub fn place_bet(&mut self, amount: u64) -> Result<()> {
        if amount == 0 {
            return Err(Error::InvalidBet(amount));
        }
        let needed = amount as f64;
        if needed > self.bankroll {
            return Err(Error::InsufficientFunds {
                needed,
                available: self.bankroll,
            });
        }
        let hand = self.hand_mut(0)?;
        hand.bet = needed;
        self.bankroll -= needed;
        Ok(())
    }

    pub fn insurance_cost(&self) -> f64 {
        self.hands.first().map_or(0.0, |h| h.bet / 2.0)
    }

    pub fn can_afford_insurance(&self) -> bool {
        self.bankroll >= self.insurance_cost()
    }

    pub fn buy_insurance(&mut self) -> Result<f64> {
        let cost = self.insurance_cost();
        if !self.can_afford_insurance() {
            return Err(Error::InsufficientFunds {
                needed: cost,
                available: self.bankroll,
            });
        }
        self.bankroll -= cost;
        self.has_insurance = true;
        Ok(cost)
    }

    pub fn check_action(
        &self,
        hand_index: usize,
        action: Action,
        rules: &TableRules,
    ) -> std::result::Result<(), Unavailable> {
        let Some(hand) = self.hands.get(hand_index) else {
            return Err(Unavailable::HandLocked);
        };
        if hand.locked {
            return Err(Unavailable::HandLocked);
        }
        match action {
            Action::Hit | Action::Stand => Ok(()),
            Action::Split => {
                if !hand.first_turn {
                    Err(Unavailable::NotFirstTurn)
                } else if self.bankroll < hand.bet {
                    Err(Unavailable::InsufficientFunds)
                } else if !hand.can_split() {
                    Err(Unavailable::NotAPair)
                } else if self.hands.len() >= rules.max_hands {
                    Err(Unavailable::MaxHands(rules.max_hands))
                } else {
                    Ok(())
                }
            }
            Action::Double => {
                if !hand.first_turn {
                    Err(Unavailable::NotFirstTurn)
                } else if self.bankroll < hand.bet {
                    Err(Unavailable::InsufficientFunds)
                } else {
                    Ok(())
                }
            }
            Action::Surrender => {
                if !hand.first_turn {
                    Err(Unavailable::NotFirstTurn)
                } else if !rules.surrender_allowed {
                    Err(Unavailable::SurrenderDisabled)
                } else {
                    Ok(())
                }
            }
        }
    }

    pub fn legal_actions(&self, hand_index: usize, rules: &TableRules) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|&action| self.check_action(hand_index, action, rules).is_ok())
            .collect()
    }

    /// Moves the second card of `hand_index` into a new hand with a matching bet,
    /// then deals one card to each.
    pub fn split(
        &mut self,
        hand_index: usize,
        rules: &TableRules,
        shoe: &mut Shoe,
    ) -> Result<SplitResult> {
        self.check_action(hand_index, Action::Split, rules)
            .map_err(Error::ActionUnavailable)?;

        let new_id = self.hands.len() as u8 + 1;
        let seat = self.seat();
        let hand = self.hand_mut(hand_index)?;
        let bet = hand.bet;
        let split_card = hand
            .take_split_card()
            .ok_or(Error::ActionUnavailable(Unavailable::NotAPair))?;

        let mut new_hand = Hand::new(seat, new_id);
        new_hand.bet = bet;
        new_hand.add_card(split_card);
        self.bankroll -= bet;
        self.hands.push(new_hand);
        let new_index = self.hands.len() - 1;

        let aces = split_card.is_ace();
        let mut locked = [false; 2];
        for (slot, index) in [hand_index, new_index].into_iter().enumerate() {
            let hand = &mut self.hands[index];
            hand.add_card(shoe.draw());
            if hand.total == 21 || (aces && !rules.hit_split_aces) {
                hand.stand();
                locked[slot] = true;
            }
        }

        Ok(SplitResult {
            new_hand: new_index,
            locked,
        })
    }

    /// Doubles the stake on `hand_index`. The caller deals the single card.
    pub fn double_down(&mut self, hand_index: usize) -> Result<()> {
        let bet = self.hand(hand_index)?.bet;
        if self.bankroll < bet {
            return Err(Error::InsufficientFunds {
                needed: bet,
                available: self.bankroll,
            });
        }
        self.bankroll -= bet;
        let hand = self.hand_mut(hand_index)?;
        hand.bet *= 2.0;
        hand.doubled = true;
        Ok(())
    }

    /// Gives up the hand for half the stake back. Returns the refund.
    pub fn surrender(&mut self, hand_index: usize) -> Result<f64> {
        let hand = self.hand_mut(hand_index)?;
        let refund = hand.bet / 2.0;
        hand.bet = refund;
        hand.locked = true;
        hand.busted = true;
        hand.surrendered = true;
        self.bankroll += refund;
        Ok(refund)
    }

    pub fn settle(&mut self, hand_index: usize, dealer: &Hand) -> Result<Settlement> {
        let settlement = self.hand(hand_index)?.settle_against(dealer);
        self.bankroll += settlement.credit;
        Ok(settlement)
    }

    /// Any hand still standing after the player's turn.
    pub fn has_live_hand(&self) -> bool {
        self.hands.iter().any(|h| !h.busted)
    }

    /// Ends the round: drops hands and insurance. Returns the card value used.
    pub fn clear_round(&mut self) -> u32 {
        let used = self.hands.iter().map(Hand::used_value).sum();
        self.hands.clear();
        self.has_insurance = false;
        used
    }

    pub fn is_broke(&self) -> bool {
        self.bankroll < 1.0
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
