use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::{debug, info};

use crate::action::{ActionRequest, PlayerAction, PlayerActionKind};
use crate::cards::Card;
use crate::deck::Deck;
use crate::errors::{ActionError, GameError};
use crate::events::{GameEvent, HandResult};
use crate::game::{BettingRound, GamePhase, Street};
use crate::game_log::GameLog;
use crate::holder::{Board, Hand};
use crate::logger::{format_hand_id, ActionRecord, HandRecord, ShowdownInfo};
use crate::player::{Player, PlayerId};
use crate::pot::Pot;
use crate::rank::HandStrength;
use crate::rules::{validate_action, ValidatedAction};
use crate::settings::GameSettings;

/// One table: seats, the hand in progress and its betting state machine.
///
/// Every method either applies completely or returns an error without
/// changing anything. The engine is synchronous; callers that share it
/// between tasks wrap it in a lock.
///
/// # Examples
///
/// ```
/// use holdem_engine::action::ActionRequest;
/// use holdem_engine::engine::GameEngine;
/// use holdem_engine::game::GamePhase;
/// use holdem_engine::settings::GameSettings;
///
/// let mut engine = GameEngine::with_seed(GameSettings::default(), 7).unwrap();
/// engine.add_player("alice", "Alice", 1_000).unwrap();
/// engine.add_player("bob", "Bob", 1_000).unwrap();
/// engine.start_hand().unwrap();
///
/// let first = engine.current_player().unwrap().id().to_string();
/// engine.act(&first, ActionRequest::fold()).unwrap();
/// assert_eq!(engine.phase(), GamePhase::HandComplete);
/// ```
#[derive(Debug)]
pub struct GameEngine {
    settings: GameSettings,
    /// Seats in ascending `position` order
    players: Vec<Player>,
    phase: GamePhase,
    deck: Deck,
    deck_seed: u64,
    board: Board,
    pot: Pot,
    round: BettingRound,
    /// Position of the dealer seat
    dealer: Option<usize>,
    /// Index into `players` of the seat expected to act
    current: Option<usize>,
    turn: u64,
    hand_number: u64,
    next_position: usize,
    start_stacks: BTreeMap<PlayerId, u64>,
    log: GameLog,
    actions: Vec<ActionRecord>,
    last_result: Option<HandResult>,
    last_record: Option<HandRecord>,
    rng: ChaCha20Rng,
}

impl GameEngine {
    /// An engine whose decks and first dealer come from OS entropy.
    pub fn new(settings: GameSettings) -> Result<Self, GameError> {
        Self::with_rng(settings, ChaCha20Rng::from_os_rng())
    }

    /// Fully reproducible: same seed and same actions give the same hands.
    pub fn with_seed(settings: GameSettings, seed: u64) -> Result<Self, GameError> {
        Self::with_rng(settings, ChaCha20Rng::seed_from_u64(seed))
    }

    fn with_rng(settings: GameSettings, mut rng: ChaCha20Rng) -> Result<Self, GameError> {
        settings.validate()?;
        let deck_seed = rng.random();
        let round = BettingRound::new(Street::Preflop, settings.big_blind);
        Ok(Self {
            settings,
            players: Vec::new(),
            phase: GamePhase::WaitingForPlayers,
            deck: Deck::new_with_seed(deck_seed),
            deck_seed,
            board: Board::new(),
            pot: Pot::new(),
            round,
            dealer: None,
            current: None,
            turn: 0,
            hand_number: 0,
            next_position: 0,
            start_stacks: BTreeMap::new(),
            log: GameLog::new(),
            actions: Vec::new(),
            last_result: None,
            last_record: None,
            rng,
        })
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id() == player_id)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn pot(&self) -> &Pot {
        &self.pot
    }

    pub fn round(&self) -> &BettingRound {
        &self.round
    }

    pub fn hand_number(&self) -> u64 {
        self.hand_number
    }

    pub fn log(&self) -> &GameLog {
        &self.log
    }

    pub fn last_result(&self) -> Option<&HandResult> {
        self.last_result.as_ref()
    }

    pub fn last_hand_record(&self) -> Option<&HandRecord> {
        self.last_record.as_ref()
    }

    pub fn dealer(&self) -> Option<&Player> {
        self.dealer
            .and_then(|pos| self.players.iter().find(|p| p.position() == pos))
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.current.map(|idx| &self.players[idx])
    }

    /// Increments every time the turn passes; pairs with the player id to
    /// tell a stale timeout from a live one.
    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn to_call(&self, player_id: &str) -> u64 {
        self.round.to_call(player_id)
    }

    /// Action kinds the current player may choose right now.
    pub fn legal_actions(&self) -> Vec<PlayerActionKind> {
        let Some(player) = self.current_player() else {
            return Vec::new();
        };
        let to_call = self.round.to_call(player.id());
        let previous = self.round.last_kind();
        [
            PlayerActionKind::Fold,
            PlayerActionKind::Check,
            PlayerActionKind::Call,
            PlayerActionKind::Raise,
        ]
        .into_iter()
        .filter(|k| k.can_follow(previous))
        .filter(|k| match k {
            PlayerActionKind::Check => to_call == 0,
            PlayerActionKind::Raise => player.chips().get() > to_call,
            _ => true,
        })
        .collect()
    }

    /// Seats a player at the next free position. Only between hands.
    pub fn add_player(
        &mut self,
        id: impl Into<PlayerId>,
        display_name: impl Into<String>,
        chips: u64,
    ) -> Result<(), GameError> {
        if self.phase.is_in_hand() {
            return Err(GameError::HandInProgress);
        }
        let id = id.into();
        if self.players.len() >= self.settings.max_players {
            return Err(GameError::TableFull {
                max: self.settings.max_players,
            });
        }
        if self.player(&id).is_some() {
            return Err(GameError::DuplicatePlayer(id));
        }
        let mut player = Player::new(id, display_name, chips);
        player.set_position(self.next_position);
        self.next_position += 1;
        info!(player = %player.id(), position = player.position(), chips, "player seated");
        self.players.push(player);
        Ok(())
    }

    /// Takes a player off the table, chips included. Only between hands.
    pub fn remove_player(&mut self, player_id: &str) -> Result<Player, GameError> {
        if self.phase.is_in_hand() {
            return Err(GameError::HandInProgress);
        }
        let idx = self
            .index_of(player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.to_string()))?;
        let player = self.players.remove(idx);
        info!(player = %player_id, chips = player.chips().get(), "player left");
        Ok(player)
    }

    /// Rotates the dealer, shuffles a fresh deck, deals hole cards and posts
    /// the blinds. Players without chips sit the hand out.
    pub fn start_hand(&mut self) -> Result<Vec<GameEvent>, GameError> {
        if self.phase.is_in_hand() {
            return Err(GameError::HandInProgress);
        }
        let funded = self.players.iter().filter(|p| !p.chips().is_zero()).count();
        if funded < 2 {
            return Err(GameError::NotEnoughPlayers { available: funded });
        }

        self.hand_number += 1;
        self.log.archive();
        self.actions.clear();
        self.board.clear();
        self.pot.clear();
        self.deck_seed = self.rng.random();
        self.deck = Deck::new_with_seed(self.deck_seed);
        self.round = BettingRound::new(Street::Preflop, self.settings.big_blind);
        self.start_stacks.clear();
        for p in self.players.iter_mut() {
            if p.chips().is_zero() {
                p.leave_hand();
            } else {
                p.join_hand();
                self.start_stacks.insert(p.id().to_string(), p.chips().get());
            }
        }

        let dealer_idx = self.next_dealer();
        self.dealer = Some(self.players[dealer_idx].position());
        let order = self.seats_after(dealer_idx);

        let mut events = vec![GameEvent::HandStarted {
            hand_number: self.hand_number,
            dealer: self.players[dealer_idx].id().to_string(),
            players: order.iter().map(|&i| self.players[i].id().to_string()).collect(),
        }];

        for _ in 0..Hand::CAPACITY {
            for &i in &order {
                let card = self.deck.deal_card()?;
                self.players[i].give_card(card)?;
            }
        }
        for &i in &order {
            let player = &self.players[i];
            let cards: [Card; 2] =
                player
                    .hand()
                    .cards()
                    .try_into()
                    .map_err(|_| GameError::NotEnoughCards {
                        available: player.hand().len(),
                    })?;
            events.push(GameEvent::HoleCardsDealt {
                player: player.id().to_string(),
                cards,
            });
        }

        // Heads-up the dealer is the small blind.
        let (sb_idx, bb_idx) = if order.len() == 2 {
            (dealer_idx, order[0])
        } else {
            (order[0], order[1])
        };
        self.post_blind(sb_idx, self.settings.small_blind, &mut events)?;
        self.post_blind(bb_idx, self.settings.big_blind, &mut events)?;

        self.phase = GamePhase::Preflop;
        info!(
            hand = self.hand_number,
            dealer = %self.players[dealer_idx].id(),
            players = order.len(),
            "hand started"
        );
        self.progress(bb_idx, &mut events)?;
        Ok(events)
    }

    /// Applies the current player's action and moves the hand forward,
    /// revealing streets and settling the pot as rounds complete.
    pub fn act(
        &mut self,
        player_id: &str,
        request: ActionRequest,
    ) -> Result<Vec<GameEvent>, GameError> {
        let street = self.phase.street().ok_or(GameError::NoHandInProgress)?;
        let idx = self
            .index_of(player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.to_string()))?;
        if !self.players[idx].is_playing() {
            return Err(ActionError::PlayerNotActive(player_id.to_string()).into());
        }
        let current = self.current.ok_or(GameError::NoHandInProgress)?;
        if idx != current {
            return Err(ActionError::NotPlayersTurn {
                expected: self.players[current].id().to_string(),
                actual: player_id.to_string(),
            }
            .into());
        }

        let to_call = self.round.to_call(player_id);
        let validated = validate_action(
            self.players[idx].chips().get(),
            to_call,
            self.round.min_raise(),
            self.round.last_kind(),
            request,
        )?;
        let kind = validated.logged_kind(to_call);
        let name = self.players[idx].display_name().to_string();
        let action = match validated {
            ValidatedAction::Fold => PlayerAction::fold(name),
            ValidatedAction::Check => PlayerAction::check(name),
            other => PlayerAction::new(kind, name).with_chips(other.amount())?,
        };

        match validated {
            ValidatedAction::Fold => self.players[idx].fold(),
            ValidatedAction::Check => {}
            other => self.pot.bet(&mut self.players[idx], other.amount())?,
        }
        self.current = None;
        self.round.record(player_id, validated, kind);
        debug!(
            hand = self.hand_number,
            player = %player_id,
            %street,
            ?validated,
            pot = self.pot.total(),
            "action applied"
        );

        let mut events = vec![GameEvent::PlayerActed {
            player: player_id.to_string(),
            action: action.clone(),
        }];
        if validated.amount() > 0 {
            events.push(GameEvent::ChipsChanged {
                player: player_id.to_string(),
                chips: self.players[idx].chips().get(),
            });
        }
        self.actions.push(ActionRecord {
            player_id: player_id.to_string(),
            street,
            action: action.clone(),
        });
        self.log.log_action(action);

        self.progress(idx, &mut events)?;
        Ok(events)
    }

    /// Auto-folds `player_id` if it still holds turn number `turn`.
    /// Returns `None` when the turn already moved on.
    pub fn timeout(
        &mut self,
        player_id: &str,
        turn: u64,
    ) -> Result<Option<Vec<GameEvent>>, GameError> {
        match self.current {
            Some(idx) if self.turn == turn && self.players[idx].id() == player_id => {
                info!(hand = self.hand_number, player = %player_id, "turn timed out, folding");
                self.act(player_id, ActionRequest::fold()).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Abandons the hand in progress and gives every player back what it
    /// put in the pot.
    pub fn stop(&mut self) -> Vec<GameEvent> {
        if !self.phase.is_in_hand() {
            return Vec::new();
        }
        let refunds = self.pot.refund_all(&mut self.players);
        for p in self.players.iter_mut() {
            p.leave_hand();
        }
        self.board.clear();
        self.actions.clear();
        self.current = None;
        self.phase = GamePhase::WaitingForPlayers;
        info!(hand = self.hand_number, refunded = refunds.values().sum::<u64>(), "hand stopped");

        let mut events: Vec<GameEvent> = refunds
            .keys()
            .filter_map(|id| self.player(id))
            .map(|p| GameEvent::ChipsChanged {
                player: p.id().to_string(),
                chips: p.chips().get(),
            })
            .collect();
        events.push(GameEvent::GameStopped { refunds });
        events
    }

    fn index_of(&self, player_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id() == player_id)
    }

    fn dealer_index(&self) -> usize {
        self.dealer
            .and_then(|pos| self.players.iter().position(|p| p.position() == pos))
            .unwrap_or(0)
    }

    // First hand: a random seat. Afterwards: the next seat dealt in.
    fn next_dealer(&mut self) -> usize {
        let dealt: Vec<usize> = (0..self.players.len())
            .filter(|&i| self.players[i].is_playing())
            .collect();
        match self.dealer {
            None => dealt[self.rng.random_range(0..dealt.len())],
            Some(prev) => dealt
                .iter()
                .copied()
                .find(|&i| self.players[i].position() > prev)
                .unwrap_or(dealt[0]),
        }
    }

    /// Indices of players in the hand, starting left of `from` and ending with `from`.
    fn seats_after(&self, from: usize) -> Vec<usize> {
        let n = self.players.len();
        (1..=n)
            .map(|step| (from + step) % n)
            .filter(|&i| self.players[i].is_playing())
            .collect()
    }

    fn post_blind(
        &mut self,
        idx: usize,
        blind: u64,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        let amount = blind.min(self.players[idx].chips().get());
        self.pot.bet(&mut self.players[idx], amount)?;
        let player = &self.players[idx];
        self.round.post_blind(player.id(), amount);
        events.push(GameEvent::BlindPosted {
            player: player.id().to_string(),
            amount,
        });
        events.push(GameEvent::ChipsChanged {
            player: player.id().to_string(),
            chips: player.chips().get(),
        });
        Ok(())
    }

    // Hands the turn to the next player owed one after `from`, or closes the
    // round and keeps dealing until someone must act or the hand is over.
    fn progress(&mut self, from: usize, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
        let mut from = from;
        loop {
            let in_hand: Vec<usize> = (0..self.players.len())
                .filter(|&i| self.players[i].is_playing())
                .collect();
            if let [winner] = in_hand.as_slice() {
                self.finish_uncontested(*winner, events);
                return Ok(());
            }

            if !self.round.is_complete(&self.players) {
                let next = self
                    .seats_after(from)
                    .into_iter()
                    .find(|&i| self.round.awaits(&self.players[i]));
                if let Some(idx) = next {
                    self.current = Some(idx);
                    self.turn += 1;
                    events.push(GameEvent::TurnChanged {
                        player: self.players[idx].id().to_string(),
                        turn: self.turn,
                    });
                    return Ok(());
                }
            }

            let street = self.round.street();
            debug!(hand = self.hand_number, %street, pot = self.pot.total(), "round resolved");
            events.push(GameEvent::RoundResolved {
                street,
                pot: self.pot.total(),
            });
            match street.next() {
                Some(next) => {
                    self.deal_street(next, events)?;
                    from = self.dealer_index();
                }
                None => return self.showdown(events),
            }
        }
    }

    fn deal_street(&mut self, street: Street, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
        self.deck.burn_card()?;
        let mut cards = Vec::with_capacity(street.cards_dealt());
        for _ in 0..street.cards_dealt() {
            let card = self.deck.deal_card()?;
            self.board.add_card(card)?;
            cards.push(card);
        }
        self.round = BettingRound::new(street, self.settings.big_blind);
        self.phase = street.into();
        debug!(hand = self.hand_number, %street, board = ?self.board.cards(), "board dealt");
        events.push(GameEvent::BoardDealt { street, cards });
        Ok(())
    }

    fn showdown(&mut self, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
        self.phase = GamePhase::Showdown;
        let ranks = Pot::rank_showdown(&self.players, &self.board)?;
        let winnings = self.pot.distribute(&mut self.players, &ranks);
        for (id, won) in &winnings {
            if let Some(p) = self.players.iter().find(|p| p.id() == id) {
                self.log
                    .log_winning(p.display_name(), *won, ranks.get(id).map(|r| r.category));
            }
        }
        let revealed: BTreeMap<PlayerId, HandStrength> = ranks.into_iter().collect();
        self.finish(winnings, revealed, events);
        Ok(())
    }

    fn finish_uncontested(&mut self, idx: usize, events: &mut Vec<GameEvent>) {
        let won = self.pot.award_uncontested(&mut self.players[idx]);
        let winner = &self.players[idx];
        self.log.log_winning(winner.display_name(), won, None);
        let winnings = BTreeMap::from([(winner.id().to_string(), won)]);
        self.finish(winnings, BTreeMap::new(), events);
    }

    fn finish(
        &mut self,
        winnings: BTreeMap<PlayerId, u64>,
        revealed: BTreeMap<PlayerId, HandStrength>,
        events: &mut Vec<GameEvent>,
    ) {
        let mut deltas = BTreeMap::new();
        for p in &self.players {
            if let Some(start) = self.start_stacks.get(p.id()) {
                deltas.insert(p.id().to_string(), p.chips().get() as i64 - *start as i64);
            }
        }
        debug_assert_eq!(deltas.values().sum::<i64>(), 0, "chips created or lost in a hand");

        for id in winnings.keys() {
            if let Some(p) = self.player(id) {
                events.push(GameEvent::ChipsChanged {
                    player: id.clone(),
                    chips: p.chips().get(),
                });
            }
        }

        let dealer = self.dealer().map(|p| p.id().to_string()).unwrap_or_default();
        let n = self.players.len();
        let from = self.dealer_index();
        let dealt_in: Vec<PlayerId> = (1..=n)
            .map(|step| &self.players[(from + step) % n])
            .filter(|p| self.start_stacks.contains_key(p.id()))
            .map(|p| p.id().to_string())
            .collect();
        let showdown = (!revealed.is_empty()).then(|| ShowdownInfo {
            winners: winnings.keys().cloned().collect(),
            revealed: revealed
                .iter()
                .map(|(id, strength)| (id.clone(), strength.category.to_string()))
                .collect(),
        });
        let now = Utc::now();
        self.last_record = Some(HandRecord {
            hand_id: format_hand_id(
                &now.format("%Y%m%d").to_string(),
                u32::try_from(self.hand_number).unwrap_or(u32::MAX),
            ),
            seed: Some(self.deck_seed),
            dealer,
            players: dealt_in,
            actions: std::mem::take(&mut self.actions),
            board: self.board.cards().to_vec(),
            winnings: winnings.clone(),
            ts: Some(now.to_rfc3339_opts(SecondsFormat::Secs, true)),
            showdown,
        });

        let result = HandResult {
            hand_number: self.hand_number,
            winnings,
            deltas,
            revealed,
            board: self.board.cards().to_vec(),
        };
        info!(
            hand = self.hand_number,
            showdown = result.went_to_showdown(),
            winners = ?result.winnings.keys().collect::<Vec<_>>(),
            "hand complete"
        );
        self.last_result = Some(result.clone());
        self.current = None;
        self.phase = GamePhase::HandComplete;
        events.push(GameEvent::HandCompleted { result });
    }
}
