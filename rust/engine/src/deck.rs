use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};
use crate::errors::GameError;

/// The 52 cards of one hand, permuted at construction and consumed from the top.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    position: usize,
    rng: ChaCha20Rng,
}

impl Deck {
    /// A deck shuffled by a freshly seeded RNG that nobody at the table can observe.
    pub fn new() -> Self {
        Self::with_rng(ChaCha20Rng::from_os_rng())
    }

    /// Same seed, same order. Used for replays and tests.
    pub fn new_with_seed(seed: u64) -> Self {
        Self::with_rng(ChaCha20Rng::seed_from_u64(seed))
    }

    fn with_rng(rng: ChaCha20Rng) -> Self {
        let mut deck = Self {
            cards: full_deck(),
            position: 0,
            rng,
        };
        deck.shuffle();
        deck
    }

    /// Restores all 52 cards and permutes them again.
    pub fn shuffle(&mut self) {
        self.cards = full_deck();
        self.cards.shuffle(&mut self.rng);
        self.position = 0;
    }

    pub fn deal_card(&mut self) -> Result<Card, GameError> {
        let card = self
            .cards
            .get(self.position)
            .copied()
            .ok_or(GameError::DeckExhausted)?;
        self.position += 1;
        Ok(card)
    }

    pub fn burn_card(&mut self) -> Result<(), GameError> {
        self.deal_card().map(|_| ())
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.position)
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}
