use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::PlayerActionKind;
use crate::player::{Player, PlayerId};
use crate::rules::ValidatedAction;

/// Represents a betting street in Texas Hold'em poker.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Street {
    /// Before flop (hole cards dealt)
    Preflop,
    /// After flop (3 community cards)
    Flop,
    /// After turn (4th community card)
    Turn,
    /// After river (5th community card)
    River,
}

impl Street {
    pub fn next(self) -> Option<Street> {
        match self {
            Street::Preflop => Some(Street::Flop),
            Street::Flop => Some(Street::Turn),
            Street::Turn => Some(Street::River),
            Street::River => None,
        }
    }

    /// Board cards revealed when this street begins.
    pub fn cards_dealt(self) -> usize {
        match self {
            Street::Preflop => 0,
            Street::Flop => 3,
            Street::Turn | Street::River => 1,
        }
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Street::Preflop => "preflop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
        };
        f.write_str(name)
    }
}

/// Where a game is in its hand cycle.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    WaitingForPlayers,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    HandComplete,
}

impl GamePhase {
    pub fn street(self) -> Option<Street> {
        match self {
            GamePhase::Preflop => Some(Street::Preflop),
            GamePhase::Flop => Some(Street::Flop),
            GamePhase::Turn => Some(Street::Turn),
            GamePhase::River => Some(Street::River),
            _ => None,
        }
    }

    /// A hand is being played and seats are locked.
    pub fn is_in_hand(self) -> bool {
        self.street().is_some() || self == GamePhase::Showdown
    }
}

impl From<Street> for GamePhase {
    fn from(street: Street) -> Self {
        match street {
            Street::Preflop => GamePhase::Preflop,
            Street::Flop => GamePhase::Flop,
            Street::Turn => GamePhase::Turn,
            Street::River => GamePhase::River,
        }
    }
}

/// Bookkeeping for one betting round. Pot contributions live in
/// [`crate::pot::Pot`] for the whole hand; this only tracks what the round
/// still requires from each player.
#[derive(Debug, Clone)]
pub struct BettingRound {
    street: Street,
    committed: HashMap<PlayerId, u64>,
    current_bet: u64,
    min_raise: u64,
    acted: HashSet<PlayerId>,
    last_kind: Option<PlayerActionKind>,
}

impl BettingRound {
    pub fn new(street: Street, big_blind: u64) -> Self {
        Self {
            street,
            committed: HashMap::new(),
            current_bet: 0,
            min_raise: big_blind,
            acted: HashSet::new(),
            last_kind: None,
        }
    }

    pub fn street(&self) -> Street {
        self.street
    }

    pub fn current_bet(&self) -> u64 {
        self.current_bet
    }

    pub fn min_raise(&self) -> u64 {
        self.min_raise
    }

    pub fn last_kind(&self) -> Option<PlayerActionKind> {
        self.last_kind
    }

    pub fn committed(&self, player_id: &str) -> u64 {
        self.committed.get(player_id).copied().unwrap_or(0)
    }

    pub fn to_call(&self, player_id: &str) -> u64 {
        self.current_bet.saturating_sub(self.committed(player_id))
    }

    pub fn has_acted(&self, player_id: &str) -> bool {
        self.acted.contains(player_id)
    }

    /// A forced bet. It raises the bar like a bet but does not count as the
    /// player's turn, so the big blind keeps its option.
    pub fn post_blind(&mut self, player_id: &str, amount: u64) {
        let total = self.committed.entry(player_id.to_string()).or_insert(0);
        *total += amount;
        self.current_bet = self.current_bet.max(*total);
        self.last_kind = Some(PlayerActionKind::Raise);
    }

    pub fn record(&mut self, player_id: &str, action: ValidatedAction, kind: PlayerActionKind) {
        let total = {
            let entry = self.committed.entry(player_id.to_string()).or_insert(0);
            *entry += action.amount();
            *entry
        };
        if total > self.current_bet {
            let increase = total - self.current_bet;
            if increase >= self.min_raise {
                self.min_raise = increase;
            }
            self.current_bet = total;
            // everyone else has to answer the new bet
            self.acted.clear();
        }
        self.acted.insert(player_id.to_string());
        if kind != PlayerActionKind::Fold {
            self.last_kind = Some(kind);
        }
    }

    /// Every player who can still act has matched the bet, and has had a
    /// turn unless nobody is left to bet against.
    pub fn is_complete(&self, players: &[Player]) -> bool {
        let able: Vec<&Player> = players.iter().filter(|p| p.can_act()).collect();
        let lone = able.len() <= 1;
        able.iter().all(|p| {
            self.committed(p.id()) >= self.current_bet && (lone || self.has_acted(p.id()))
        })
    }

    /// Whether `player` is owed a turn in this round.
    pub fn awaits(&self, player: &Player) -> bool {
        player.can_act()
            && (!self.has_acted(player.id()) || self.committed(player.id()) < self.current_bet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holder::Hand;

    fn seated(id: &str, chips: u64) -> Player {
        let mut p = Player::new(id, id, chips);
        p.seat_in_hand(Hand::new());
        p
    }

    #[test]
    fn big_blind_keeps_option_after_limp() {
        let players = vec![seated("sb", 990), seated("bb", 980)];
        let mut round = BettingRound::new(Street::Preflop, 20);
        round.post_blind("sb", 10);
        round.post_blind("bb", 20);
        assert!(!round.is_complete(&players));
        round.record("sb", ValidatedAction::Call(10), PlayerActionKind::Call);
        assert!(!round.is_complete(&players));
        assert!(round.awaits(&players[1]));
        round.record("bb", ValidatedAction::Call(0), PlayerActionKind::Call);
        assert!(round.is_complete(&players));
    }

    #[test]
    fn raise_reopens_action() {
        let players = vec![seated("a", 1000), seated("b", 1000)];
        let mut round = BettingRound::new(Street::Flop, 20);
        round.record("a", ValidatedAction::Check, PlayerActionKind::Check);
        round.record("b", ValidatedAction::Raise(60), PlayerActionKind::Raise);
        assert_eq!(round.min_raise(), 60);
        assert_eq!(round.to_call("a"), 60);
        assert!(!round.is_complete(&players));
        round.record("a", ValidatedAction::Call(60), PlayerActionKind::Call);
        assert!(round.is_complete(&players));
        assert_eq!(round.last_kind(), Some(PlayerActionKind::Call));
    }

    #[test]
    fn street_progression() {
        assert_eq!(Street::Preflop.next(), Some(Street::Flop));
        assert_eq!(Street::River.next(), None);
        assert_eq!(Street::Flop.cards_dealt(), 3);
        assert!(GamePhase::Showdown.is_in_hand());
        assert!(!GamePhase::HandComplete.is_in_hand());
    }
}
