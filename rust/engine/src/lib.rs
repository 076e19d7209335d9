//! # holdem-engine: Texas Hold'em Game Core
//!
//! A synchronous, deterministic-when-seeded Texas Hold'em engine for tables
//! of two to ten players. Covers dealing, best-hand ranking, betting-action
//! legality, multi-way side pots and the per-hand betting state machine.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and text form
//! - [`deck`] - Deck shuffling with ChaCha20 RNG
//! - [`holder`] - Capacity-bounded card holders: [`holder::Hand`] and [`holder::Board`]
//! - [`chips`] - Non-negative chip amounts and their shorthand display
//! - [`player`] - Seats, stacks and in-hand status
//! - [`rank`] - Best 5-of-7 hand ranking with kickers
//! - [`action`] - Action kinds, their ordering rule and logged actions
//! - [`rules`] - Betting validation
//! - [`pot`] - Contributions, side pots and showdown payouts
//! - [`game`] - Streets, phases and betting-round bookkeeping
//! - [`engine`] - The [`engine::GameEngine`] state machine
//! - [`events`] - Notifications and hand results
//! - [`game_log`] - Text action log with last-hand archive
//! - [`logger`] - HandRecord serialization to JSONL
//! - [`settings`] - Stakes and table limits
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use holdem_engine::cards::Card;
//! use holdem_engine::holder::{Board, Hand};
//! use holdem_engine::rank::{best_hand, Category};
//!
//! let hand = Hand::from_cards(["Q♣".parse().unwrap(), "Q♦".parse().unwrap()]).unwrap();
//! let board: Vec<Card> = ["3♥", "7♥", "J♠", "Q♥", "T♦"]
//!     .iter()
//!     .map(|c| c.parse().unwrap())
//!     .collect();
//! let board = Board::from_cards(&board).unwrap();
//!
//! let strength = best_hand(&hand, &board).unwrap();
//! assert_eq!(strength.category, Category::ThreeOfAKind);
//! ```
//!
//! ## Playing a Hand
//!
//! ```rust
//! use holdem_engine::action::ActionRequest;
//! use holdem_engine::engine::GameEngine;
//! use holdem_engine::settings::GameSettings;
//!
//! let mut engine = GameEngine::with_seed(GameSettings::default(), 42).unwrap();
//! engine.add_player("p1", "Alice", 1_000).unwrap();
//! engine.add_player("p2", "Bob", 1_000).unwrap();
//! engine.add_player("p3", "Carol", 1_000).unwrap();
//! engine.start_hand().unwrap();
//!
//! // Everyone calls or checks until the hand is over.
//! while let Some(player) = engine.current_player() {
//!     let id = player.id().to_string();
//!     engine.act(&id, ActionRequest::call()).unwrap();
//! }
//! let total: u64 = engine.players().iter().map(|p| p.chips().get()).sum();
//! assert_eq!(total, 3_000);
//! ```

pub mod action;
pub mod cards;
pub mod chips;
pub mod deck;
pub mod engine;
pub mod errors;
pub mod events;
pub mod game;
pub mod game_log;
pub mod holder;
pub mod logger;
pub mod player;
pub mod pot;
pub mod rank;
pub mod rules;
pub mod settings;
