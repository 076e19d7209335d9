use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::PlayerAction;
use crate::chips::Chips;
use crate::rank::Category;

/// One line of the table chat/history feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEntry {
    Action(PlayerAction),
    Winning {
        player_name: String,
        chips: Chips,
        /// Absent when everyone else folded
        hand_rank: Option<Category>,
    },
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEntry::Action(action) => write!(f, "{}", action),
            LogEntry::Winning {
                player_name,
                chips,
                hand_rank: Some(rank),
            } => write!(
                f,
                "{} won {} chips, with {}.",
                player_name,
                chips.to_shorthand(),
                rank
            ),
            LogEntry::Winning {
                player_name,
                chips,
                hand_rank: None,
            } => write!(f, "{} won {} chips.", player_name, chips.to_shorthand()),
        }
    }
}

/// Entries of the hand in progress, plus the full log of the previous hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLog {
    entries: Vec<LogEntry>,
    last_hand: Vec<LogEntry>,
}

impl GameLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_action(&mut self, action: PlayerAction) {
        self.entries.push(LogEntry::Action(action));
    }

    pub fn log_winning(&mut self, player_name: &str, chips: u64, hand_rank: Option<Category>) {
        self.entries.push(LogEntry::Winning {
            player_name: player_name.to_string(),
            chips: Chips::new(chips),
            hand_rank,
        });
    }

    /// Moves the current entries to `last_hand`. Called as a new hand starts.
    pub fn archive(&mut self) {
        self.last_hand = std::mem::take(&mut self.entries);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn last_hand(&self) -> &[LogEntry] {
        &self.last_hand
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}
