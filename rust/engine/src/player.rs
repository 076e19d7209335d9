use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::chips::Chips;
use crate::errors::GameError;
use crate::holder::Hand;

pub type PlayerId = String;

/// A seat at the table. The player persists across hands; its hand and
/// playing flag are reset each time a new hand starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    id: PlayerId,
    display_name: String,
    chips: Chips,
    #[serde(skip)]
    hand: Hand,
    is_playing: bool,
    position: usize,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, display_name: impl Into<String>, chips: u64) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            chips: Chips::new(chips),
            hand: Hand::new(),
            is_playing: false,
            position: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn chips(&self) -> Chips {
        self.chips
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Still in the hand but unable to act because every chip is committed.
    pub fn is_all_in(&self) -> bool {
        self.is_playing && self.chips.is_zero()
    }

    /// Still in the hand and holding chips, so it is owed a turn.
    pub fn can_act(&self) -> bool {
        self.is_playing && !self.chips.is_zero()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    pub fn give_card(&mut self, card: Card) -> Result<(), GameError> {
        self.hand.add_card(card)
    }

    pub fn set_hand(&mut self, hand: Hand) {
        self.hand = hand;
    }

    pub(crate) fn join_hand(&mut self) {
        self.hand.clear();
        self.is_playing = true;
    }

    pub(crate) fn fold(&mut self) {
        self.is_playing = false;
    }

    pub(crate) fn leave_hand(&mut self) {
        self.hand.clear();
        self.is_playing = false;
    }

    pub(crate) fn take_chips(&mut self, amount: u64) -> Result<(), GameError> {
        self.chips.remove(amount)
    }

    pub(crate) fn add_chips(&mut self, amount: u64) {
        self.chips.add(amount);
    }

    /// Marks the player as part of the current hand. For callers assembling
    /// a showdown by hand, e.g. in tests or replays.
    pub fn seat_in_hand(&mut self, hand: Hand) {
        self.hand = hand;
        self.is_playing = true;
    }
}
