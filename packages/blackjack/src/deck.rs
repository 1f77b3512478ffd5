use crate::Card;

/// Hard value of a single 52-card deck (aces counted as 1).
pub const SINGLE_DECK_VALUE: u32 = 340;

/// The fixed multiset of cards shuffled into the shoe on every top-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckTemplate {
    cards: Vec<Card>,
    value: u32,
    decks: u8,
}

impl DeckTemplate {
    pub fn new(decks: u8) -> Self {
        let decks = decks.max(1);
        let cards: Vec<Card> = (0..decks)
            .flat_map(|_| (0..52).filter_map(Card::from_index))
            .collect();
        let value = cards.iter().map(Card::hard_value).sum();
        Self { cards, value, decks }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn decks(&self) -> u8 {
        self.decks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_deck_template() {
        let template = DeckTemplate::new(1);
        assert_eq!(template.cards().len(), 52);
        assert_eq!(template.value(), SINGLE_DECK_VALUE);
    }

    #[test]
    fn test_multi_deck_template() {
        let template = DeckTemplate::new(6);
        assert_eq!(template.cards().len(), 312);
        assert_eq!(template.value(), 6 * SINGLE_DECK_VALUE);
        assert_eq!(template.decks(), 6);
    }

    #[test]
    fn test_zero_decks_builds_one() {
        assert_eq!(DeckTemplate::new(0).cards().len(), 52);
    }
}
