use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::errors::GameError;

/// An ordered run of distinct cards that can never grow past its capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardsHolder {
    cards: Vec<Card>,
    capacity: usize,
}

impl CardsHolder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cards: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn add_card(&mut self, card: Card) -> Result<(), GameError> {
        if self.cards.len() >= self.capacity {
            return Err(GameError::HolderFull {
                capacity: self.capacity,
            });
        }
        if self.cards.contains(&card) {
            return Err(GameError::DuplicateCard(card));
        }
        self.cards.push(card);
        Ok(())
    }

    pub fn card_at(&self, index: usize) -> Option<Card> {
        self.cards.get(index).copied()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.cards.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }
}

/// A player's two hole cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand(CardsHolder);

impl Hand {
    pub const CAPACITY: usize = 2;

    pub fn new() -> Self {
        Self(CardsHolder::with_capacity(Self::CAPACITY))
    }

    pub fn from_cards(cards: [Card; 2]) -> Result<Self, GameError> {
        let mut hand = Self::new();
        for card in cards {
            hand.add_card(card)?;
        }
        Ok(hand)
    }

    pub fn add_card(&mut self, card: Card) -> Result<(), GameError> {
        self.0.add_card(card)
    }

    pub fn cards(&self) -> &[Card] {
        self.0.cards()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl Default for Hand {
    fn default() -> Self {
        Self::new()
    }
}

/// The community cards. Index 0-2 are the flop, 3 the turn, 4 the river;
/// a card only exists here once the engine has revealed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board(CardsHolder);

impl Board {
    pub const CAPACITY: usize = 5;

    pub fn new() -> Self {
        Self(CardsHolder::with_capacity(Self::CAPACITY))
    }

    pub fn from_cards(cards: &[Card]) -> Result<Self, GameError> {
        let mut board = Self::new();
        for &card in cards {
            board.add_card(card)?;
        }
        Ok(board)
    }

    pub fn add_card(&mut self, card: Card) -> Result<(), GameError> {
        self.0.add_card(card)
    }

    pub fn flop1(&self) -> Option<Card> {
        self.0.card_at(0)
    }

    pub fn flop2(&self) -> Option<Card> {
        self.0.card_at(1)
    }

    pub fn flop3(&self) -> Option<Card> {
        self.0.card_at(2)
    }

    pub fn turn(&self) -> Option<Card> {
        self.0.card_at(3)
    }

    pub fn river(&self) -> Option<Card> {
        self.0.card_at(4)
    }

    pub fn has_flop(&self) -> bool {
        self.0.len() >= 3
    }

    pub fn has_turn(&self) -> bool {
        self.0.len() >= 4
    }

    pub fn has_river(&self) -> bool {
        self.0.len() >= 5
    }

    pub fn cards(&self) -> &[Card] {
        self.0.cards()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
