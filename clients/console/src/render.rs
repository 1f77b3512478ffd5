use blackjack::{Action, Card, HandOutcome, HandView, Question, Suit, TableEvent};
use crossterm::style::{Color, Stylize};
use serde::Serialize;

const RULE: &str = "-------------------------------------------------";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Color,
    Plain,
    /// One JSON object per line, for scripts driving the table.
    Json,
}

/// Something the console is about to ask for.
#[derive(Debug, Serialize)]
#[serde(tag = "prompt", rename_all = "snake_case")]
pub enum Prompt<'a> {
    PlayerCount { min: usize, max: usize },
    PlayerName { seat: usize },
    Bet { player: &'a str, bankroll: f64 },
    YesNo { question: &'a Question },
    Action { hand: &'a HandView, legal: &'a [Action] },
}

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    style: Style,
}

impl Renderer {
    pub fn new(style: Style) -> Self {
        Self { style }
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn event(&self, event: &TableEvent) -> serde_json::Result<String> {
        match self.style {
            Style::Json => serde_json::to_string(event),
            _ => Ok(self.describe(event)),
        }
    }

    pub fn prompt(&self, prompt: &Prompt) -> serde_json::Result<String> {
        if self.style == Style::Json {
            return serde_json::to_string(prompt);
        }
        let text = match prompt {
            Prompt::PlayerCount { min, max } => {
                format!("Choose the number of players ({min}-{max}): ")
            }
            Prompt::PlayerName { seat } => format!("What is the name of player {seat}? "),
            Prompt::Bet { player, bankroll } => {
                format!("{player} has ${bankroll}. Bet? Enter an amount or 'leave' to exit: ")
            }
            Prompt::YesNo { question } => match question {
                Question::Insurance { player, cost } => {
                    format!("Would {player} like insurance for ${cost}? ")
                }
                Question::Rebuy { player, buy_in } => {
                    format!("{player} is broke. Rebuy for ${buy_in}? ")
                }
            },
            Prompt::Action { hand, legal } => action_question(hand, legal),
        };
        Ok(text)
    }

    /// A correction after a bad answer.
    pub fn notice(&self, text: &str) -> String {
        match self.style {
            Style::Json => serde_json::json!({ "notice": text }).to_string(),
            _ => text.to_string(),
        }
    }

    pub fn card(&self, card: &Card) -> String {
        let color = match card.suit {
            Suit::Hearts => Color::Red,
            Suit::Diamonds => Color::Rgb {
                r: 0xFF,
                g: 0xA5,
                b: 0x00,
            },
            Suit::Clubs => Color::Magenta,
            Suit::Spades => Color::White,
        };
        self.paint(card.to_display(), color)
    }

    /// "Ada's hand 2: 8♠ 3♣ (11)"
    pub fn hand(&self, view: &HandView) -> String {
        let cards: Vec<String> = view.cards.iter().map(|c| self.card(c)).collect();
        let mut total = if view.soft {
            format!("soft {}", view.total)
        } else {
            view.total.to_string()
        };
        if view.doubled {
            total.push_str(", doubled");
        }
        format!("{}: {} ({total})", hand_label(view), cards.join(" "))
    }

    fn describe(&self, event: &TableEvent) -> String {
        match event {
            TableEvent::Welcome {
                casino,
                decks,
                max_players,
                max_hands,
                surrender_allowed,
            } => {
                let policy = if *surrender_allowed {
                    "allowed"
                } else {
                    "not allowed"
                };
                self.paint(
                    format!(
                        "Welcome to {casino}! Decks shuffled into the shoe: {decks}. \
                         Max players per table: {max_players}. \
                         Max number of hands per player: {max_hands}. \
                         Surrenders are {policy}."
                    ),
                    Color::Blue,
                )
            }
            TableEvent::DeckAdded { first: true, .. } => {
                "The dealer adds a deck to the shoe.".to_string()
            }
            TableEvent::DeckAdded { .. } => "Dealer adds another deck to the shoe.".to_string(),
            TableEvent::PlayerSeated { player, bankroll } => {
                format!("{player} sits down with ${bankroll}.")
            }
            TableEvent::BetRejected { .. } => "Insufficient funds.".to_string(),
            TableEvent::BetPlaced { player, amount, .. } => format!("{player} bets ${amount}."),
            TableEvent::PlayerLeft { player, bankroll } => {
                format!("{player} leaves with ${bankroll}.")
            }
            TableEvent::HandShown(view) => self.hand(view),
            TableEvent::DealerUpcard { card } => format!("Dealer's upcard: {}", self.card(card)),
            TableEvent::Blackjack { player, .. } => {
                self.paint(format!("{player} has blackjack!"), Color::Green)
            }
            TableEvent::InsuranceUnaffordable { player } => {
                format!("{player} cannot afford insurance.")
            }
            TableEvent::InsuranceTaken { player, stake } => {
                format!("{player} takes insurance for ${stake}.")
            }
            TableEvent::DealerBlackjack(view) => {
                format!("{}\nDealer has blackjack!", self.hand(view))
            }
            TableEvent::DealerNoBlackjack => "Dealer does not have blackjack.".to_string(),
            TableEvent::ActionTaken { player, action, .. } => match action {
                Action::Hit => format!("{player} hits."),
                Action::Stand => format!("{player} stands."),
                Action::Split => format!("{player} splits."),
                Action::Double => format!("{player} doubles down!"),
                Action::Surrender => format!("{player} surrenders."),
            },
            TableEvent::ActionRejected { action, reason, .. } => {
                format!("Cannot {action}: {reason}.")
            }
            TableEvent::Stood { player, total, .. } => {
                self.paint(format!("{player} stands at {total}."), Color::Blue)
            }
            TableEvent::Busted { player, .. } => self.paint(format!("{player} busts!"), Color::Red),
            TableEvent::DealerHits => "Dealer hits.".to_string(),
            TableEvent::DealerBusts { .. } => {
                self.paint("Dealer busts! Players win!", Color::Green)
            }
            TableEvent::Settled {
                player,
                outcome,
                bet,
                credit,
                insurance_credit,
                ..
            } => {
                let mut line = match outcome {
                    HandOutcome::Blackjack => self.paint(
                        format!("{player} wins with blackjack! +${}", credit - bet),
                        Color::Green,
                    ),
                    HandOutcome::Win => {
                        self.paint(format!("{player} wins ${}!", credit - bet), Color::Green)
                    }
                    HandOutcome::Push => format!("{player} pushes."),
                    HandOutcome::Loss => format!("{player} loses ${bet}."),
                    HandOutcome::Surrender => format!("{player} surrendered, ${bet} returned."),
                };
                if *insurance_credit > 0.0 {
                    line.push_str(&format!(" Insurance pays ${insurance_credit}."));
                }
                line
            }
            TableEvent::Rebuy { player, amount } => format!("{player} rebuys for ${amount}."),
            TableEvent::LeftTable { player } => format!("{player} leaves the table."),
            TableEvent::RoundComplete { .. } => RULE.to_string(),
        }
    }

    fn paint(&self, text: impl Into<String>, color: Color) -> String {
        let text = text.into();
        match self.style {
            Style::Color => text.with(color).to_string(),
            _ => text,
        }
    }
}

fn hand_label(view: &HandView) -> String {
    if view.multiple {
        format!("{}'s hand {}", view.owner, view.hand_id)
    } else {
        format!("{}'s hand", view.owner)
    }
}

/// "Will Ada, for hand 2, hit, stand, or double? "
fn action_question(hand: &HandView, legal: &[Action]) -> String {
    let who = if hand.multiple {
        format!("Will {}, for hand {}, ", hand.owner, hand.hand_id)
    } else {
        format!("Will {} ", hand.owner)
    };
    let names: Vec<&str> = legal.iter().map(Action::as_str).collect();
    match names.split_last() {
        None => format!("{who}stand? "),
        Some((last, [])) => format!("{who}{last}? "),
        Some((last, rest)) => format!("{who}{}, or {last}? ", rest.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackjack::{Hand, HandOutcome, PlayerId, Rank, Seat};

    fn view(multiple: bool) -> HandView {
        let mut hand = Hand::new(Seat::Player(PlayerId(1)), 2);
        hand.add_card(Card::new(Rank::Ace, Suit::Spades));
        hand.add_card(Card::new(Rank::Six, Suit::Hearts));
        HandView::new("Ada", &hand, multiple)
    }

    #[test]
    fn test_hand_labels() {
        let plain = Renderer::new(Style::Plain);
        assert_eq!(plain.hand(&view(false)), "Ada's hand: A♠ 6♥ (soft 17)");
        assert_eq!(plain.hand(&view(true)), "Ada's hand 2: A♠ 6♥ (soft 17)");
    }

    #[test]
    fn test_doubled_hand_is_marked() {
        let mut doubled = view(false);
        doubled.cards.push(Card::new(Rank::Two, Suit::Clubs));
        doubled.total = 19;
        doubled.doubled = true;
        assert_eq!(
            Renderer::new(Style::Plain).hand(&doubled),
            "Ada's hand: A♠ 6♥ 2♣ (soft 19, doubled)"
        );
    }

    #[test]
    fn test_action_question() {
        let legal = [Action::Hit, Action::Stand, Action::Double];
        assert_eq!(
            action_question(&view(false), &legal),
            "Will Ada hit, stand, or double? "
        );
        assert_eq!(
            action_question(&view(true), &[Action::Hit]),
            "Will Ada, for hand 2, hit? "
        );
    }

    #[test]
    fn test_settlement_lines() {
        let plain = Renderer::new(Style::Plain);
        let settled = |outcome, credit, insurance_credit| TableEvent::Settled {
            player: "Ada".into(),
            hand_id: 1,
            outcome,
            bet: 100.0,
            credit,
            insurance_credit,
            bankroll: 0.0,
        };
        let line = |event| plain.event(&event).unwrap();
        assert_eq!(
            line(settled(HandOutcome::Blackjack, 250.0, 0.0)),
            "Ada wins with blackjack! +$150"
        );
        assert_eq!(line(settled(HandOutcome::Win, 200.0, 0.0)), "Ada wins $100!");
        assert_eq!(line(settled(HandOutcome::Push, 100.0, 0.0)), "Ada pushes.");
        assert_eq!(
            line(settled(HandOutcome::Loss, 0.0, 150.0)),
            "Ada loses $100. Insurance pays $150."
        );
    }

    #[test]
    fn test_deck_notices() {
        let plain = Renderer::new(Style::Plain);
        let first = TableEvent::DeckAdded {
            first: true,
            shoe_value: 340,
        };
        let again = TableEvent::DeckAdded {
            first: false,
            shoe_value: 680,
        };
        assert_eq!(plain.event(&first).unwrap(), "The dealer adds a deck to the shoe.");
        assert_eq!(plain.event(&again).unwrap(), "Dealer adds another deck to the shoe.");
    }

    #[test]
    fn test_color_only_when_enabled() {
        let card = Card::new(Rank::King, Suit::Hearts);
        assert_eq!(Renderer::new(Style::Plain).card(&card), "K♥");
        let colored = Renderer::new(Style::Color).card(&card);
        assert!(colored.contains("K♥"));
        assert!(colored.starts_with('\u{1b}'));
    }

    #[test]
    fn test_json_lines() {
        let json = Renderer::new(Style::Json);
        let line = json.event(&TableEvent::DealerHits).unwrap();
        assert_eq!(line, r#"{"event":"dealer_hits"}"#);

        let prompt = json
            .prompt(&Prompt::Bet {
                player: "Ada",
                bankroll: 1000.0,
            })
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&prompt).unwrap();
        assert_eq!(value["prompt"], "bet");
        assert_eq!(value["player"], "Ada");
        assert_eq!(json.notice("Invalid bet."), r#"{"notice":"Invalid bet."}"#);
    }
}
