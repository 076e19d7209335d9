use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::GameError;

/// Table stakes and limits, as carried by a game creation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameSettings {
    pub small_blind: u64,
    pub big_blind: u64,
    /// Time a player has to act before being folded, in milliseconds
    pub turn_timeout_ms: u64,
    pub max_players: usize,
    /// Stack handed to players that join without one
    pub starting_chips: u64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            small_blind: 10,
            big_blind: 20,
            turn_timeout_ms: 60_000,
            max_players: 7,
            starting_chips: 5_000,
        }
    }
}

impl GameSettings {
    pub const MIN_PLAYERS: usize = 2;
    pub const MAX_SEATS: usize = 10;

    pub fn turn_timeout(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.small_blind == 0 {
            return Err(GameError::InvalidSettings(
                "small_blind must be greater than 0".to_string(),
            ));
        }

        if self.big_blind < self.small_blind {
            return Err(GameError::InvalidSettings(
                "big_blind must be at least small_blind".to_string(),
            ));
        }

        if self.turn_timeout_ms == 0 {
            return Err(GameError::InvalidSettings(
                "turn_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if !(Self::MIN_PLAYERS..=Self::MAX_SEATS).contains(&self.max_players) {
            return Err(GameError::InvalidSettings(format!(
                "max_players must be between {} and {}",
                Self::MIN_PLAYERS,
                Self::MAX_SEATS
            )));
        }

        Ok(())
    }
}
