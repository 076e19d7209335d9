use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::action::PlayerAction;
use crate::cards::Card;
use crate::game::Street;
use crate::player::PlayerId;
use crate::rank::HandStrength;

/// Outcome of a finished hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandResult {
    pub hand_number: u64,
    /// Chips paid out of the pot, per winner
    pub winnings: BTreeMap<PlayerId, u64>,
    /// Stack change over the whole hand, per player dealt in
    pub deltas: BTreeMap<PlayerId, i64>,
    /// Best hands shown down; empty when the hand ended uncontested
    pub revealed: BTreeMap<PlayerId, HandStrength>,
    pub board: Vec<Card>,
}

impl HandResult {
    pub fn went_to_showdown(&self) -> bool {
        !self.revealed.is_empty()
    }
}

/// Step-by-step notifications produced by the engine, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    HandStarted {
        hand_number: u64,
        dealer: PlayerId,
        players: Vec<PlayerId>,
    },
    /// Private to `player`; the session layer decides who may see it.
    HoleCardsDealt { player: PlayerId, cards: [Card; 2] },
    BlindPosted { player: PlayerId, amount: u64 },
    TurnChanged { player: PlayerId, turn: u64 },
    PlayerActed { player: PlayerId, action: PlayerAction },
    BoardDealt { street: Street, cards: Vec<Card> },
    RoundResolved { street: Street, pot: u64 },
    ChipsChanged { player: PlayerId, chips: u64 },
    HandCompleted { result: HandResult },
    GameStopped { refunds: BTreeMap<PlayerId, u64> },
}
