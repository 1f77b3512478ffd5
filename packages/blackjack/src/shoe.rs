use crate::deck::DeckTemplate;
use crate::Card;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// The live pool of cards. The end of `cards` is the top of the shoe.
///
/// `value` is an estimate of what is left, in hard card value. It grows by the
/// template value on every top-up and only shrinks through [`Shoe::release`],
/// so it never rescans the cards.
#[derive(Debug, Clone)]
pub struct Shoe {
    cards: Vec<Card>,
    value: u32,
    template: DeckTemplate,
    rng: ChaCha8Rng,
}

impl Shoe {
    pub fn new(decks: u8, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            cards: Vec::new(),
            value: 0,
            template: DeckTemplate::new(decks),
            rng,
        }
    }

    /// A shoe whose next cards are `cards`, first element dealt first.
    pub fn stacked(decks: u8, cards: Vec<Card>) -> Self {
        let value = cards.iter().map(Card::hard_value).sum();
        let mut cards = cards;
        cards.reverse();
        Self {
            cards,
            value,
            template: DeckTemplate::new(decks),
            rng: ChaCha8Rng::seed_from_u64(0),
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn template(&self) -> &DeckTemplate {
        &self.template
    }

    /// Shuffles a fresh template copy under the remaining cards. Returns the new estimate.
    pub fn top_up(&mut self) -> u32 {
        let mut deck = self.template.cards().to_vec();
        deck.shuffle(&mut self.rng);
        deck.append(&mut self.cards);
        self.cards = deck;
        self.value += self.template.value();
        log::debug!(
            "shoe topped up with {} decks: {} cards, estimated value {}",
            self.template.decks(),
            self.cards.len(),
            self.value
        );
        self.value
    }

    /// Tops up until the estimate reaches `minimum`. Returns the number of decks added.
    pub fn ensure_minimum_size(&mut self, minimum: u32) -> usize {
        let mut added = 0;
        while self.value < minimum {
            self.top_up();
            added += 1;
        }
        added
    }

    pub fn draw(&mut self) -> Card {
        loop {
            if let Some(card) = self.cards.pop() {
                return card;
            }
            log::warn!("shoe ran dry mid-round, adding an emergency deck");
            self.top_up();
        }
    }

    pub fn release(&mut self, used: u32) {
        self.value = self.value.saturating_sub(used);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::SINGLE_DECK_VALUE;
    use crate::{Rank, Suit};

    #[test]
    fn test_new_shoe_is_empty() {
        let shoe = Shoe::new(1, Some(7));
        assert!(shoe.is_empty());
        assert_eq!(shoe.value(), 0);
    }

    #[test]
    fn test_ensure_minimum_size() {
        let mut shoe = Shoe::new(1, Some(7));
        let minimum = 26 + 5 * 2 * 30;
        let added = shoe.ensure_minimum_size(minimum);
        assert_eq!(added, 1);
        assert!(shoe.value() >= minimum);
        assert_eq!(shoe.len(), 52);

        // Already satisfied
        assert_eq!(shoe.ensure_minimum_size(minimum), 0);
    }

    #[test]
    fn test_ensure_minimum_size_adds_several_decks() {
        let mut shoe = Shoe::new(1, Some(7));
        let added = shoe.ensure_minimum_size(3 * SINGLE_DECK_VALUE + 1);
        assert_eq!(added, 4);
        assert_eq!(shoe.len(), 208);
    }

    #[test]
    fn test_top_up_goes_under_remaining_cards() {
        let top = Card::new(Rank::Ace, Suit::Spades);
        let mut shoe = Shoe::stacked(1, vec![top]);
        shoe.top_up();
        assert_eq!(shoe.len(), 53);
        assert_eq!(shoe.draw(), top);
    }

    #[test]
    fn test_stacked_deal_order() {
        let first = Card::new(Rank::Two, Suit::Hearts);
        let second = Card::new(Rank::King, Suit::Clubs);
        let mut shoe = Shoe::stacked(1, vec![first, second]);
        assert_eq!(shoe.value(), 12);
        assert_eq!(shoe.draw(), first);
        assert_eq!(shoe.draw(), second);
    }

    #[test]
    fn test_draw_from_empty_tops_up() {
        let mut shoe = Shoe::new(1, Some(1));
        let _ = shoe.draw();
        assert_eq!(shoe.len(), 51);
        assert_eq!(shoe.value(), SINGLE_DECK_VALUE);
    }

    #[test]
    fn test_release_saturates() {
        let mut shoe = Shoe::new(1, Some(1));
        shoe.top_up();
        shoe.release(100);
        assert_eq!(shoe.value(), SINGLE_DECK_VALUE - 100);
        shoe.release(10_000);
        assert_eq!(shoe.value(), 0);
    }

    #[test]
    fn test_seeded_shoes_match() {
        let mut a = Shoe::new(2, Some(42));
        let mut b = Shoe::new(2, Some(42));
        a.top_up();
        b.top_up();
        let left: Vec<Card> = (0..20).map(|_| a.draw()).collect();
        let right: Vec<Card> = (0..20).map(|_| b.draw()).collect();
        assert_eq!(left, right);
    }
}
