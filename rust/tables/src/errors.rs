use holdem_engine::errors::GameError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::history::HistoryError;
use crate::registry::GameId;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Game not found: {0}")]
    NotFound(GameId),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Game storage poisoned")]
    StoragePoisoned,
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

impl TableError {
    /// True for errors caused by the caller's request rather than the
    /// table's own state, e.g. an out-of-turn action.
    pub fn is_rejection(&self) -> bool {
        matches!(self, TableError::Game(_) | TableError::NotFound(_))
    }
}
