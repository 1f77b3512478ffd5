use crate::error::{Error, Result};
use crate::event::{HandView, Question, TableEvent};
use crate::hand::{HandOutcome, HitResult, DEALER_STANDS_ON};
use crate::io::{BetResponse, TableIo};
use crate::player::{PlayerId, Seat};
use crate::{Action, Card, Hand, Player, Shoe, TableRules};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

const DEALER_NAME: &str = "Dealer";

/// Insurance pays 2:1, returned together with the stake.
const INSURANCE_CREDIT: f64 = 3.0;

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    NotStarted,
    Betting,
    InitialDeal,
    PlayerTurn,
    DealerTurn,
    Settled,
}

/// One settled hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementRecord {
    pub player: PlayerId,
    pub hand_id: u8,
    pub outcome: HandOutcome,
    pub bet: f64,
    pub credit: f64,
    pub insurance_credit: f64,
}

/// What happened during one call to [`GameState::play_round`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoundReport {
    pub round: u64,
    /// Cards were dealt; false when everyone left at the betting step.
    pub dealt: bool,
    pub dealer_blackjack: bool,
    pub dealer_played: bool,
    pub settlements: Vec<SettlementRecord>,
    pub departed: Vec<PlayerId>,
}

/// The table: shoe, roster and dealer, advanced one round at a time.
///
/// Each step of a round is public so callers can drive it piecewise. Invariant:
/// before any card is dealt the shoe estimate covers
/// [`TableRules::min_shoe_value`] for the seated players.
#[derive(Debug, Clone)]
pub struct GameState {
    rules: TableRules,
    shoe: Shoe,
    players: Vec<Player>,
    dealer: Hand,
    phase: GamePhase,
    round: u64,
    next_player_id: u32,
}

impl GameState {
    pub fn new(rules: TableRules) -> Result<Self> {
        Self::with_seed(rules, None)
    }

    /// Seeded shoe for reproducible sessions.
    pub fn with_seed(rules: TableRules, seed: Option<u64>) -> Result<Self> {
        let shoe = Shoe::new(rules.decks, seed);
        Self::with_shoe(rules, shoe)
    }

    pub fn with_shoe(rules: TableRules, shoe: Shoe) -> Result<Self> {
        rules.validate()?;
        Ok(Self {
            rules,
            shoe,
            players: Vec::new(),
            dealer: Hand::new(Seat::Dealer, 1),
            phase: GamePhase::NotStarted,
            round: 0,
            next_player_id: 1,
        })
    }

    pub fn rules(&self) -> &TableRules {
        &self.rules
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn dealer(&self) -> &Hand {
        &self.dealer
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Rounds started so far.
    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn welcome(&self) -> TableEvent {
        TableEvent::Welcome {
            casino: self.rules.casino_name.clone(),
            decks: self.rules.decks,
            max_players: self.rules.max_players,
            max_hands: self.rules.max_hands,
            surrender_allowed: self.rules.surrender_allowed,
        }
    }

    /// Seats a player with the table buy-in. A blank name becomes "Player N".
    pub fn add_player(&mut self, name: &str) -> Result<PlayerId> {
        if self.players.len() >= self.rules.max_players {
            return Err(Error::TableFull(self.rules.max_players));
        }
        let seat = self.players.len() + 1;
        let name = match name.trim() {
            "" => format!("Player {seat}"),
            trimmed => trimmed.to_string(),
        };
        let id = PlayerId(self.next_player_id);
        self.next_player_id += 1;
        info!("seating {name} ({id}) with {}", self.rules.buy_in);
        self.players.push(Player::new(id, name, self.rules.buy_in));
        Ok(id)
    }

    /// Asks how many players join and for each of their names.
    pub fn seat_players<I: TableIo>(&mut self, io: &mut I) -> Result<usize> {
        let free = self.rules.max_players.saturating_sub(self.players.len());
        if free == 0 {
            return Ok(0);
        }
        let count = io.request_player_count(1, free)?.clamp(1, free);
        for _ in 0..count {
            let name = io.request_player_name(self.players.len() + 1)?;
            let id = self.add_player(&name)?;
            if let Some(player) = self.player(id) {
                let event = TableEvent::PlayerSeated {
                    player: player.name.clone(),
                    bankroll: player.bankroll,
                };
                io.notify(event)?;
            }
        }
        Ok(count)
    }

    /// Plays rounds until nobody is left at the table. Returns the rounds dealt.
    pub fn run<I: TableIo>(&mut self, io: &mut I) -> Result<u64> {
        io.notify(self.welcome())?;
        if self.players.is_empty() {
            self.seat_players(io)?;
        }
        let mut dealt = 0;
        while !self.players.is_empty() {
            if self.play_round(io)?.dealt {
                dealt += 1;
            }
        }
        info!("table closed after {dealt} rounds");
        Ok(dealt)
    }

    pub fn play_round<I: TableIo>(&mut self, io: &mut I) -> Result<RoundReport> {
        self.round += 1;
        let mut report = RoundReport {
            round: self.round,
            ..RoundReport::default()
        };
        info!(
            "round {} starting with {} players",
            self.round,
            self.players.len()
        );

        self.ensure_shoe(io)?;
        self.start_hands();
        report.departed = self.collect_bets(io)?;
        if self.players.is_empty() {
            self.dealer = Hand::new(Seat::Dealer, 1);
            self.phase = GamePhase::NotStarted;
            io.notify(TableEvent::RoundComplete {
                round: self.round,
                players: 0,
            })?;
            return Ok(report);
        }

        self.deal_initial(io)?;
        report.dealt = true;
        match self.dealer_peek(io)? {
            Some(records) => {
                report.dealer_blackjack = true;
                report.settlements = records;
            }
            None => {
                self.play_turns(io)?;
                report.dealer_played = self.play_dealer(io)?;
                report.settlements = self.settle(io)?;
            }
        }
        report.departed.extend(self.cleanup(io)?);
        Ok(report)
    }

    /// Tops the shoe up to the minimum for the current roster. Returns decks added.
    pub fn ensure_shoe<I: TableIo>(&mut self, io: &mut I) -> Result<usize> {
        let minimum = self.rules.min_shoe_value(self.players.len());
        let before = self.shoe.value();
        let deck_value = self.shoe.template().value();
        let added = self.shoe.ensure_minimum_size(minimum);
        for i in 0..added {
            let event = TableEvent::DeckAdded {
                first: before == 0 && i == 0,
                shoe_value: before + deck_value * (i as u32 + 1),
            };
            io.notify(event)?;
        }
        if added > 0 {
            debug!("added {added} decks to reach {minimum}");
        }
        Ok(added)
    }

    /// Gives every player a fresh opening hand and clears the dealer.
    pub fn start_hands(&mut self) {
        for player in self.players.iter_mut() {
            player.start_round();
        }
        self.dealer = Hand::new(Seat::Dealer, 1);
        self.phase = GamePhase::Betting;
    }

    /// Asks each player for a bet. Players who leave are removed and returned.
    pub fn collect_bets<I: TableIo>(&mut self, io: &mut I) -> Result<Vec<PlayerId>> {
        self.phase = GamePhase::Betting;
        let mut leaving = Vec::new();
        for player in self.players.iter_mut() {
            loop {
                let amount = match io.request_bet(player)? {
                    BetResponse::Leave | BetResponse::Bet(0) => {
                        info!("{} leaves with {}", player.name, player.bankroll);
                        io.notify(TableEvent::PlayerLeft {
                            player: player.name.clone(),
                            bankroll: player.bankroll,
                        })?;
                        leaving.push(player.id);
                        break;
                    }
                    BetResponse::Bet(amount) => amount,
                };
                match player.place_bet(amount) {
                    Ok(()) => {
                        io.notify(TableEvent::BetPlaced {
                            player: player.name.clone(),
                            amount,
                            bankroll: player.bankroll,
                        })?;
                        break;
                    }
                    Err(Error::InsufficientFunds { .. }) => {
                        warn!("{} bet {amount} over bankroll {}", player.name, player.bankroll);
                        io.notify(TableEvent::BetRejected {
                            player: player.name.clone(),
                            amount,
                            bankroll: player.bankroll,
                        })?;
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        self.remove_players(&leaving);
        Ok(leaving)
    }

    /// Two cards each, players before the dealer on every pass.
    pub fn deal_initial<I: TableIo>(&mut self, io: &mut I) -> Result<()> {
        self.phase = GamePhase::InitialDeal;
        for _ in 0..2 {
            for player in self.players.iter_mut() {
                if let Some(hand) = player.hands.first_mut() {
                    hand.add_card(self.shoe.draw());
                }
            }
            self.dealer.add_card(self.shoe.draw());
        }

        for player in self.players.iter_mut() {
            if let Some(hand) = player.hands.first_mut() {
                hand.check_blackjack();
                io.notify(TableEvent::HandShown(HandView::new(&player.name, hand, false)))?;
            }
        }
        self.dealer.check_blackjack();
        if let Some(&card) = self.dealer.cards.first() {
            io.notify(TableEvent::DealerUpcard { card })?;
        }
        debug!(
            "dealt {} hands, dealer shows {}",
            self.players.len(),
            self.dealer
                .cards
                .first()
                .map(Card::to_display)
                .unwrap_or_default()
        );
        Ok(())
    }

    /// Offers insurance against an ace and settles a dealer blackjack.
    ///
    /// Returns the settlements when the dealer had blackjack and the round is over.
    pub fn dealer_peek<I: TableIo>(&mut self, io: &mut I) -> Result<Option<Vec<SettlementRecord>>> {
        let ace_up = self.dealer.cards.first().is_some_and(Card::is_ace);
        if ace_up {
            self.offer_insurance(io)?;
            if !self.dealer.blackjack {
                io.notify(TableEvent::DealerNoBlackjack)?;
            }
        }
        if self.dealer.blackjack {
            info!("dealer has blackjack");
            return self.settle_dealer_blackjack(io).map(Some);
        }
        Ok(None)
    }

    fn offer_insurance<I: TableIo>(&mut self, io: &mut I) -> Result<()> {
        for player in self.players.iter_mut() {
            if !player.can_afford_insurance() {
                io.notify(TableEvent::InsuranceUnaffordable {
                    player: player.name.clone(),
                })?;
                continue;
            }
            let question = Question::Insurance {
                player: player.name.clone(),
                cost: player.insurance_cost(),
            };
            if io.request_yes_no(&question)? {
                let stake = player.buy_insurance()?;
                debug!("{} insures for {stake}", player.name);
                io.notify(TableEvent::InsuranceTaken {
                    player: player.name.clone(),
                    stake,
                })?;
            }
        }
        Ok(())
    }

    fn settle_dealer_blackjack<I: TableIo>(&mut self, io: &mut I) -> Result<Vec<SettlementRecord>> {
        self.dealer.stand();
        io.notify(TableEvent::DealerBlackjack(HandView::new(
            DEALER_NAME,
            &self.dealer,
            false,
        )))?;

        let mut records = Vec::with_capacity(self.players.len());
        for player in self.players.iter_mut() {
            let insurance_credit = if player.has_insurance {
                player.insurance_cost() * INSURANCE_CREDIT
            } else {
                0.0
            };
            let Some(hand) = player.hands.first_mut() else {
                continue;
            };
            hand.stand();
            let (outcome, credit) = if hand.blackjack {
                (HandOutcome::Push, hand.bet)
            } else {
                (HandOutcome::Loss, 0.0)
            };
            let record = SettlementRecord {
                player: player.id,
                hand_id: hand.id,
                outcome,
                bet: hand.bet,
                credit,
                insurance_credit,
            };
            player.bankroll += credit + insurance_credit;
            io.notify(Self::settled_event(player, &record))?;
            records.push(record);
        }
        self.phase = GamePhase::Settled;
        Ok(records)
    }

    /// Every player acts on every hand in turn, including hands created by splits.
    pub fn play_turns<I: TableIo>(&mut self, io: &mut I) -> Result<()> {
        self.phase = GamePhase::PlayerTurn;
        for p in 0..self.players.len() {
            self.play_player(p, io)?;
        }
        Ok(())
    }

    fn play_player<I: TableIo>(&mut self, p: usize, io: &mut I) -> Result<()> {
        let mut h = 0;
        while h < self.players[p].hands.len() {
            while !self.players[p].hands[h].locked {
                if self.players[p].hands[h].first_turn {
                    io.notify(TableEvent::HandShown(self.hand_view(p, h)))?;
                    let hand = &mut self.players[p].hands[h];
                    if hand.blackjack {
                        hand.stand();
                        let event = TableEvent::Blackjack {
                            player: self.players[p].name.clone(),
                            hand_id: self.players[p].hands[h].id,
                        };
                        io.notify(event)?;
                        break;
                    }
                    if let Some(&card) = self.dealer.cards.first() {
                        io.notify(TableEvent::DealerUpcard { card })?;
                    }
                }

                let legal = self.legal_actions(p, h);
                let action = io.request_action(&self.hand_view(p, h), &legal)?;
                match self.resolve_action(p, h, action, io) {
                    Ok(()) => {}
                    Err(Error::ActionUnavailable(reason)) => {
                        warn!("{} cannot {action}: {reason}", self.players[p].name);
                        io.notify(TableEvent::ActionRejected {
                            player: self.players[p].name.clone(),
                            hand_id: self.players[p].hands[h].id,
                            action,
                            reason: reason.to_string(),
                        })?;
                    }
                    Err(e) => return Err(e),
                }
            }
            h += 1;
        }
        Ok(())
    }

    /// Actions the player at `p` may take on hand `h`, in menu order.
    pub fn legal_actions(&self, p: usize, h: usize) -> Vec<Action> {
        self.players
            .get(p)
            .map(|player| player.legal_actions(h, &self.rules))
            .unwrap_or_default()
    }

    /// Applies one action to hand `h` of the player at `p`.
    ///
    /// Fails with [`Error::ActionUnavailable`] and leaves the hand untouched when
    /// the action is not legal right now.
    pub fn resolve_action<I: TableIo>(
        &mut self,
        p: usize,
        h: usize,
        action: Action,
        io: &mut I,
    ) -> Result<()> {
        let player = self.players.get(p).ok_or(Error::UnknownPlayer(p))?;
        player
            .check_action(h, action, &self.rules)
            .map_err(Error::ActionUnavailable)?;
        let name = player.name.clone();
        let hand_id = player.hand(h)?.id;
        debug!("{name} hand {hand_id}: {action}");

        if action != Action::Split {
            self.players[p].hands[h].first_turn = false;
        }
        if action != Action::Stand {
            io.notify(TableEvent::ActionTaken {
                player: name.clone(),
                hand_id,
                action,
            })?;
        }

        match action {
            Action::Hit => {
                self.hit(p, h, io)?;
            }
            Action::Stand => {
                let hand = &mut self.players[p].hands[h];
                hand.stand();
                let total = hand.total;
                io.notify(TableEvent::Stood {
                    player: name,
                    hand_id,
                    total,
                })?;
            }
            Action::Double => {
                self.players[p].double_down(h)?;
                if self.hit(p, h, io)? == HitResult::Open {
                    let hand = &mut self.players[p].hands[h];
                    hand.stand();
                    let total = hand.total;
                    io.notify(TableEvent::Stood {
                        player: name,
                        hand_id,
                        total,
                    })?;
                }
            }
            Action::Surrender => {
                let refund = self.players[p].surrender(h)?;
                debug!("{name} surrenders, {refund} returned");
            }
            Action::Split => {
                let result = self.players[p].split(h, &self.rules, &mut self.shoe)?;
                for (slot, index) in [h, result.new_hand].into_iter().enumerate() {
                    io.notify(TableEvent::HandShown(self.hand_view(p, index)))?;
                    if result.locked[slot] {
                        let hand = &self.players[p].hands[index];
                        io.notify(TableEvent::Stood {
                            player: name.clone(),
                            hand_id: hand.id,
                            total: hand.total,
                        })?;
                    }
                }
            }
        }
        Ok(())
    }

    fn hit<I: TableIo>(&mut self, p: usize, h: usize, io: &mut I) -> Result<HitResult> {
        let card = self.shoe.draw();
        let result = self.players[p].hands[h].hit(card);
        io.notify(TableEvent::HandShown(self.hand_view(p, h)))?;

        let player = self.players[p].name.clone();
        let hand = &self.players[p].hands[h];
        let (hand_id, total) = (hand.id, hand.total);
        match result {
            HitResult::Busted => io.notify(TableEvent::Busted {
                player,
                hand_id,
                total,
            })?,
            HitResult::Stood => io.notify(TableEvent::Stood {
                player,
                hand_id,
                total,
            })?,
            HitResult::Open => {}
        }
        Ok(result)
    }

    /// Dealer draws to 17. Skipped when every player hand has busted or surrendered.
    ///
    /// Returns whether the dealer played.
    pub fn play_dealer<I: TableIo>(&mut self, io: &mut I) -> Result<bool> {
        self.phase = GamePhase::DealerTurn;
        if !self.players.iter().any(Player::has_live_hand) {
            debug!("no live hands, dealer does not play");
            return Ok(false);
        }

        io.notify(TableEvent::HandShown(self.dealer_view()))?;
        while !self.dealer.locked {
            if self.dealer.total >= DEALER_STANDS_ON {
                self.dealer.stand();
                io.notify(self.dealer_stood())?;
                break;
            }
            io.notify(TableEvent::DealerHits)?;
            let card = self.shoe.draw();
            let result = self.dealer.hit(card);
            io.notify(TableEvent::HandShown(self.dealer_view()))?;
            match result {
                HitResult::Busted => io.notify(TableEvent::DealerBusts {
                    total: self.dealer.total,
                })?,
                HitResult::Stood => io.notify(self.dealer_stood())?,
                HitResult::Open => {}
            }
        }
        debug!("dealer finishes on {}", self.dealer.total);
        Ok(true)
    }

    /// Pays out every player hand against the dealer.
    pub fn settle<I: TableIo>(&mut self, io: &mut I) -> Result<Vec<SettlementRecord>> {
        let mut records = Vec::new();
        for player in self.players.iter_mut() {
            for h in 0..player.hands.len() {
                let view = HandView::new(&player.name, &player.hands[h], player.has_multiple_hands());
                io.notify(TableEvent::HandShown(view))?;
                let settlement = player.settle(h, &self.dealer)?;
                let record = SettlementRecord {
                    player: player.id,
                    hand_id: player.hands[h].id,
                    outcome: settlement.outcome,
                    bet: settlement.bet,
                    credit: settlement.credit,
                    insurance_credit: 0.0,
                };
                info!(
                    "{} hand {}: {:?}, credited {}",
                    player.name, record.hand_id, record.outcome, record.credit
                );
                io.notify(Self::settled_event(player, &record))?;
                records.push(record);
            }
        }
        self.phase = GamePhase::Settled;
        Ok(records)
    }

    /// Returns used card value to the shoe estimate and offers broke players a rebuy.
    ///
    /// Returns the players who left.
    pub fn cleanup<I: TableIo>(&mut self, io: &mut I) -> Result<Vec<PlayerId>> {
        let buy_in = self.rules.buy_in;
        let mut used = self.dealer.used_value();
        let mut leaving = Vec::new();
        for player in self.players.iter_mut() {
            used += player.clear_round();
            if !player.is_broke() {
                continue;
            }
            let question = Question::Rebuy {
                player: player.name.clone(),
                buy_in,
            };
            if io.request_yes_no(&question)? {
                player.bankroll += buy_in;
                info!("{} buys back in for {buy_in}", player.name);
                io.notify(TableEvent::Rebuy {
                    player: player.name.clone(),
                    amount: buy_in,
                })?;
            } else {
                info!("{} is out of money and leaves", player.name);
                io.notify(TableEvent::LeftTable {
                    player: player.name.clone(),
                })?;
                leaving.push(player.id);
            }
        }
        self.remove_players(&leaving);

        self.dealer = Hand::new(Seat::Dealer, 1);
        self.shoe.release(used);
        self.phase = GamePhase::NotStarted;
        io.notify(TableEvent::RoundComplete {
            round: self.round,
            players: self.players.len(),
        })?;
        Ok(leaving)
    }

    fn remove_players(&mut self, ids: &[PlayerId]) {
        if !ids.is_empty() {
            self.players.retain(|p| !ids.contains(&p.id));
        }
    }

    fn hand_view(&self, p: usize, h: usize) -> HandView {
        let player = &self.players[p];
        HandView::new(&player.name, &player.hands[h], player.has_multiple_hands())
    }

    fn dealer_view(&self) -> HandView {
        HandView::new(DEALER_NAME, &self.dealer, false)
    }

    fn dealer_stood(&self) -> TableEvent {
        TableEvent::Stood {
            player: DEALER_NAME.to_string(),
            hand_id: self.dealer.id,
            total: self.dealer.total,
        }
    }

    fn settled_event(player: &Player, record: &SettlementRecord) -> TableEvent {
        TableEvent::Settled {
            player: player.name.clone(),
            hand_id: record.hand_id,
            outcome: record.outcome,
            bet: record.bet,
            credit: record.credit,
            insurance_credit: record.insurance_credit,
            bankroll: player.bankroll,
        }
    }
}
