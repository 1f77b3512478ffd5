use crate::player::Seat;
use crate::Card;
use serde::{Deserialize, Serialize};

/// Dealer draws below this total and stands at or above it.
pub const DEALER_STANDS_ON: u8 = 17;
const BLACKJACK_CREDIT: f64 = 2.5;
const WIN_CREDIT: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandOutcome {
    Win,
    Loss,
    Push,
    Surrender,
    Blackjack,
}

/// What a settled hand returns to its owner's bankroll. `credit` includes the stake.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub outcome: HandOutcome,
    pub bet: f64,
    pub credit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitResult {
    /// The hand can keep acting.
    Open,
    /// The hand reached its stand threshold and locked itself.
    Stood,
    Busted,
}

/// Pairs split by rank, so a king and a queen are not a pair.
pub fn can_split_cards(card1: &Card, card2: &Card) -> bool {
    card1.rank == card2.rank
}

/// One bettable set of cards. `total` is kept incrementally: every added ace
/// counts 11 and is demoted to 1 only when the hand would otherwise bust.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    pub owner: Seat,
    pub id: u8,
    pub cards: Vec<Card>,
    pub total: u8,
    pub soft_aces: u8,
    pub bet: f64,
    pub locked: bool,
    pub first_turn: bool,
    pub blackjack: bool,
    pub busted: bool,
    pub doubled: bool,
    pub surrendered: bool,
}

impl Hand {
    pub fn new(owner: Seat, id: u8) -> Self {
        Self {
            owner,
            id,
            cards: Vec::new(),
            total: 0,
            soft_aces: 0,
            bet: 0.0,
            locked: false,
            first_turn: true,
            blackjack: false,
            busted: false,
            doubled: false,
            surrendered: false,
        }
    }

    pub fn add_card(&mut self, card: Card) {
        if card.is_ace() {
            self.soft_aces += 1;
        }
        self.total += card.value();
        self.cards.push(card);
        self.demote_ace();
    }

    pub fn demote_ace(&mut self) {
        while self.total > 21 && self.soft_aces > 0 {
            self.total -= 10;
            self.soft_aces -= 1;
        }
    }

    /// Only meaningful on the two dealt cards; split hands never call this.
    pub fn check_blackjack(&mut self) -> bool {
        if self.cards.len() == 2 && self.total == 21 {
            self.blackjack = true;
        }
        self.blackjack
    }

    pub fn is_soft(&self) -> bool {
        self.soft_aces > 0
    }

    pub fn is_dealer(&self) -> bool {
        self.owner == Seat::Dealer
    }

    pub fn stand_threshold(&self) -> u8 {
        if self.is_dealer() {
            DEALER_STANDS_ON
        } else {
            21
        }
    }

    pub fn hit(&mut self, card: Card) -> HitResult {
        self.add_card(card);
        if self.total > 21 {
            self.busted = true;
            self.locked = true;
            HitResult::Busted
        } else if self.total >= self.stand_threshold() {
            self.locked = true;
            HitResult::Stood
        } else {
            HitResult::Open
        }
    }

    pub fn stand(&mut self) {
        self.locked = true;
    }

    pub fn can_split(&self) -> bool {
        self.cards.len() == 2 && can_split_cards(&self.cards[0], &self.cards[1])
    }

    /// Removes the second card and revalues what is left.
    pub fn take_split_card(&mut self) -> Option<Card> {
        if self.cards.len() != 2 {
            return None;
        }
        let card = self.cards.pop()?;
        let remaining = std::mem::take(&mut self.cards);
        self.total = 0;
        self.soft_aces = 0;
        for card in remaining {
            self.add_card(card);
        }
        Some(card)
    }

    /// Hard value of every card held, for the shoe estimate.
    pub fn used_value(&self) -> u32 {
        self.cards.iter().map(Card::hard_value).sum()
    }

    pub fn settle_against(&self, dealer: &Hand) -> Settlement {
        let bet = self.bet;
        let (outcome, credit) = if self.surrendered {
            (HandOutcome::Surrender, 0.0)
        } else if self.busted {
            (HandOutcome::Loss, 0.0)
        } else if dealer.busted || self.total > dealer.total {
            if self.blackjack {
                (HandOutcome::Blackjack, bet * BLACKJACK_CREDIT)
            } else {
                (HandOutcome::Win, bet * WIN_CREDIT)
            }
        } else if self.total == dealer.total {
            (HandOutcome::Push, bet)
        } else {
            (HandOutcome::Loss, 0.0)
        };
        Settlement {
            outcome,
            bet,
            credit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerId;
    use crate::{Rank, Suit};
    use proptest::prelude::*;

    fn card(rank: Rank) -> Card {
        Card::new(rank, Suit::Hearts)
    }

    fn player_hand(ranks: &[Rank]) -> Hand {
        let mut hand = Hand::new(Seat::Player(PlayerId(1)), 1);
        for &rank in ranks {
            hand.add_card(card(rank));
        }
        hand
    }

    fn dealer_hand(ranks: &[Rank]) -> Hand {
        let mut hand = Hand::new(Seat::Dealer, 1);
        for &rank in ranks {
            hand.add_card(card(rank));
        }
        hand
    }

    /// Slice valuation from scratch: every ace 11, demoted while over 21.
    fn best_total(cards: &[Card]) -> u8 {
        let mut total: u8 = cards.iter().map(|c| c.value()).sum();
        let mut aces = cards.iter().filter(|c| c.is_ace()).count();
        while total > 21 && aces > 0 {
            total -= 10;
            aces -= 1;
        }
        total
    }

    #[test]
    fn test_hand_sums_pip_cards() {
        let hand = player_hand(&[Rank::Two, Rank::Three]);
        assert_eq!(hand.total, 5);
        assert!(!hand.is_soft());
    }

    #[test]
    fn test_second_ace_counts_one() {
        let hand = player_hand(&[Rank::Ace, Rank::Ace, Rank::Nine]);
        assert_eq!(hand.total, 21);
        assert!(hand.is_soft());
    }

    #[test]
    fn test_split_needs_matching_rank() {
        assert!(!can_split_cards(&card(Rank::King), &card(Rank::Queen)));
        assert!(can_split_cards(&card(Rank::Eight), &Card::new(Rank::Eight, Suit::Clubs)));
        assert!(!player_hand(&[Rank::Ten, Rank::Jack]).can_split());
        assert!(player_hand(&[Rank::Five, Rank::Five]).can_split());
    }

    #[test]
    fn test_add_card_demotes_ace() {
        let mut hand = player_hand(&[Rank::Ace, Rank::Six]);
        assert_eq!(hand.total, 17);
        assert_eq!(hand.soft_aces, 1);

        hand.add_card(card(Rank::Nine));
        assert_eq!(hand.total, 16);
        assert_eq!(hand.soft_aces, 0);
    }

    #[test]
    fn test_two_aces_start_at_twelve() {
        let hand = player_hand(&[Rank::Ace, Rank::Ace]);
        assert_eq!(hand.total, 12);
        assert_eq!(hand.soft_aces, 1);
    }

    #[test]
    fn test_check_blackjack() {
        let mut hand = player_hand(&[Rank::Ace, Rank::King]);
        assert!(hand.check_blackjack());

        let mut three_card = player_hand(&[Rank::Seven, Rank::Four, Rank::Jack]);
        assert_eq!(three_card.total, 21);
        assert!(!three_card.check_blackjack());
    }

    #[test]
    fn test_player_hit_auto_stands_on_21() {
        let mut hand = player_hand(&[Rank::Five, Rank::Six]);
        assert_eq!(hand.hit(card(Rank::King)), HitResult::Stood);
        assert!(hand.locked);
        assert!(!hand.busted);
    }

    #[test]
    fn test_player_hit_busts() {
        let mut hand = player_hand(&[Rank::King, Rank::Six]);
        assert_eq!(hand.hit(card(Rank::Nine)), HitResult::Busted);
        assert!(hand.locked && hand.busted);
    }

    #[test]
    fn test_dealer_hit_stands_on_17() {
        let mut dealer = dealer_hand(&[Rank::King, Rank::Three]);
        assert_eq!(dealer.hit(card(Rank::Two)), HitResult::Open);
        assert_eq!(dealer.hit(card(Rank::Two)), HitResult::Stood);
        assert_eq!(dealer.total, 17);
    }

    #[test]
    fn test_take_split_card_revalues() {
        let mut hand = player_hand(&[Rank::Ace, Rank::Ace]);
        let split = hand.take_split_card();
        assert_eq!(split.map(|c| c.rank), Some(Rank::Ace));
        assert_eq!(hand.total, 11);
        assert_eq!(hand.soft_aces, 1);

        let mut eights = player_hand(&[Rank::Eight, Rank::Eight]);
        eights.take_split_card();
        assert_eq!(eights.total, 8);
        assert_eq!(eights.soft_aces, 0);
    }

    #[test]
    fn test_settle_dealer_bust() {
        let mut hand = player_hand(&[Rank::King, Rank::Two]);
        hand.bet = 100.0;
        let mut dealer = dealer_hand(&[Rank::King, Rank::Six]);
        dealer.hit(card(Rank::Nine));

        let settlement = hand.settle_against(&dealer);
        assert_eq!(settlement.outcome, HandOutcome::Win);
        assert_eq!(settlement.credit, 200.0);
    }

    #[test]
    fn test_settle_blackjack_pays_three_to_two() {
        let mut hand = player_hand(&[Rank::Ace, Rank::Queen]);
        hand.check_blackjack();
        hand.bet = 100.0;
        let dealer = dealer_hand(&[Rank::King, Rank::Eight]);

        let settlement = hand.settle_against(&dealer);
        assert_eq!(settlement.outcome, HandOutcome::Blackjack);
        assert_eq!(settlement.credit, 250.0);
    }

    #[test]
    fn test_settle_push_returns_stake() {
        let mut hand = player_hand(&[Rank::King, Rank::Eight]);
        hand.bet = 40.0;
        let dealer = dealer_hand(&[Rank::Nine, Rank::Nine]);

        let settlement = hand.settle_against(&dealer);
        assert_eq!(settlement.outcome, HandOutcome::Push);
        assert_eq!(settlement.credit, 40.0);
    }

    #[test]
    fn test_settle_lower_total_loses() {
        let mut hand = player_hand(&[Rank::King, Rank::Seven]);
        hand.bet = 40.0;
        let dealer = dealer_hand(&[Rank::Nine, Rank::Nine]);
        assert_eq!(hand.settle_against(&dealer).outcome, HandOutcome::Loss);
        assert_eq!(hand.settle_against(&dealer).credit, 0.0);
    }

    #[test]
    fn test_settle_bust_loses_even_when_dealer_busts() {
        let mut hand = player_hand(&[Rank::King, Rank::Six]);
        hand.bet = 40.0;
        hand.hit(card(Rank::Queen));
        let mut dealer = dealer_hand(&[Rank::King, Rank::Six]);
        dealer.hit(card(Rank::Queen));

        let settlement = hand.settle_against(&dealer);
        assert_eq!(settlement.outcome, HandOutcome::Loss);
        assert_eq!(settlement.credit, 0.0);
    }

    #[test]
    fn test_settle_surrendered_hand() {
        let mut hand = player_hand(&[Rank::King, Rank::Six]);
        hand.bet = 20.0;
        hand.surrendered = true;
        hand.busted = true;
        let mut dealer = dealer_hand(&[Rank::King, Rank::Six]);
        dealer.hit(card(Rank::Queen));

        let settlement = hand.settle_against(&dealer);
        assert_eq!(settlement.outcome, HandOutcome::Surrender);
        assert_eq!(settlement.credit, 0.0);
    }

    fn arb_card() -> impl Strategy<Value = Card> {
        (0usize..52).prop_map(|i| Card::from_index(i).unwrap())
    }

    proptest! {
        #[test]
        fn prop_total_tracks_demoted_aces(cards in proptest::collection::vec(arb_card(), 1..8)) {
            let mut hand = Hand::new(Seat::Player(PlayerId(1)), 1);
            for card in cards {
                hand.add_card(card);
                let soft_sum: u32 = hand.cards.iter().map(|c| c.value() as u32).sum();
                let aces = hand.cards.iter().filter(|c| c.is_ace()).count() as u32;
                let demoted = aces - hand.soft_aces as u32;
                prop_assert_eq!(hand.total as u32, soft_sum - 10 * demoted);
                if hand.soft_aces > 0 {
                    prop_assert!(hand.total <= 21);
                }
                prop_assert_eq!(hand.total, best_total(&hand.cards));
                if hand.total > 21 {
                    break;
                }
            }
        }

        #[test]
        fn prop_blackjack_iff_two_card_21(a in arb_card(), b in arb_card()) {
            let mut hand = Hand::new(Seat::Player(PlayerId(1)), 1);
            hand.add_card(a);
            hand.add_card(b);
            prop_assert_eq!(hand.check_blackjack(), best_total(&hand.cards) == 21);
        }
    }
}
