use std::collections::HashSet;

use holdem_engine::cards::Card;
use holdem_engine::deck::Deck;
use holdem_engine::errors::GameError;

#[test]
fn deck_deals_52_unique_cards_then_fails() {
    let mut deck = Deck::new_with_seed(42);
    let mut set = HashSet::new();
    for i in 0..52 {
        let c = deck.deal_card().expect("should have 52 cards");
        assert!(set.insert(c), "card {} duplicated at position {}", c, i);
    }
    assert_eq!(deck.remaining(), 0);
    assert_eq!(deck.deal_card(), Err(GameError::DeckExhausted));
    assert_eq!(deck.burn_card(), Err(GameError::DeckExhausted));
}

#[test]
fn shuffle_restores_a_full_deck() {
    let mut deck = Deck::new_with_seed(9);
    for _ in 0..20 {
        deck.deal_card().unwrap();
    }
    deck.shuffle();
    assert_eq!(deck.remaining(), 52);
}

#[test]
fn shuffle_is_deterministic_with_same_seed() {
    let mut d1 = Deck::new_with_seed(12345);
    let mut d2 = Deck::new_with_seed(12345);
    let a: Vec<Card> = (0..10).map(|_| d1.deal_card().unwrap()).collect();
    let b: Vec<Card> = (0..10).map(|_| d2.deal_card().unwrap()).collect();
    assert_eq!(a, b, "same seed must yield identical order");
}

#[test]
fn shuffle_differs_with_different_seed() {
    let mut d1 = Deck::new_with_seed(1);
    let mut d2 = Deck::new_with_seed(2);
    let a: Vec<Card> = (0..10).map(|_| d1.deal_card().unwrap()).collect();
    let b: Vec<Card> = (0..10).map(|_| d2.deal_card().unwrap()).collect();
    assert_ne!(
        a, b,
        "different seeds should produce different orders (high probability)"
    );
}

#[test]
fn unseeded_decks_are_complete() {
    let mut deck = Deck::new();
    let cards: HashSet<Card> = (0..52).map(|_| deck.deal_card().unwrap()).collect();
    assert_eq!(cards.len(), 52);
}

#[test]
fn no_card_dealt_twice_across_many_seeds() {
    for seed in 0..200u64 {
        let mut deck = Deck::new_with_seed(seed);
        let mut used = HashSet::new();
        // ten players' hole cards plus burns and board
        for _ in 0..(20 + 3 + 5) {
            assert!(used.insert(deck.deal_card().unwrap()), "seed {}", seed);
        }
    }
}
