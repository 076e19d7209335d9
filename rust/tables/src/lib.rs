//! # holdem-tables: running many hold'em games at once
//!
//! Wraps [`holdem_engine::engine::GameEngine`] for concurrent use. Each game
//! is a [`registry::Table`] whose engine sits behind one lock, so two players
//! racing to act in the same game are serialized and only the one holding
//! the turn gets through. Different games never contend.
//!
//! ## Core Components
//!
//! - [`registry::GameRegistry`] - id-keyed games, idle cleanup
//! - [`timer::TurnTimer`] - cancellable auto-fold per turn
//! - [`events::EventBus`] - per-game fan-out of [`events::TableEvent`]s
//! - [`history::HistoryStore`] - completed hands, optionally as JSONL
//! - [`config`] - defaults from TOML and `HOLDEM_*` variables
//! - [`bots`] - scripted players for the `holdem-sim` binary
//!
//! ## Quick Start
//!
//! ```rust
//! use holdem_engine::action::ActionRequest;
//! use holdem_tables::registry::{CreateGame, GameRegistry, SeatRequest};
//!
//! let registry = GameRegistry::new();
//! let id = registry
//!     .create_game(CreateGame {
//!         seed: Some(42),
//!         players: vec![SeatRequest::new("a", "Alice"), SeatRequest::new("b", "Bob")],
//!         ..CreateGame::default()
//!     })
//!     .unwrap();
//! registry.start_hand(&id).unwrap();
//!
//! let first = registry.snapshot(&id).unwrap().current_player.unwrap();
//! registry.act(&id, &first, ActionRequest::fold()).unwrap();
//! assert_eq!(registry.history().total_hands().unwrap(), 1);
//! ```

pub mod bots;
pub mod config;
pub mod errors;
pub mod events;
pub mod history;
pub mod logging;
pub mod registry;
pub mod timer;

pub use errors::TableError;
pub use events::{EventBus, EventSubscription, TableEvent};
pub use logging::{init_logging, init_test_logging};
pub use registry::{CreateGame, GameId, GameRegistry, SeatRequest, Table};
