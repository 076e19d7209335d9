use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chips::Chips;
use crate::errors::{ActionError, GameError};

/// A betting move. Declaration order is the legality order:
/// Fold < Check < Call < Raise.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerActionKind {
    Fold,
    Check,
    Call,
    Raise,
}

impl PlayerActionKind {
    /// Whether this move may follow `previous` in the same betting round.
    ///
    /// Moves never go down the order, except that a fold is always possible
    /// and a call answers a raise.
    pub fn can_follow(self, previous: Option<PlayerActionKind>) -> bool {
        match previous {
            None => true,
            Some(prev) => {
                self == PlayerActionKind::Fold
                    || self >= prev
                    || (self == PlayerActionKind::Call && prev == PlayerActionKind::Raise)
            }
        }
    }

    pub fn carries_chips(self) -> bool {
        matches!(self, PlayerActionKind::Call | PlayerActionKind::Raise)
    }
}

impl fmt::Display for PlayerActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayerActionKind::Fold => "Fold",
            PlayerActionKind::Check => "Check",
            PlayerActionKind::Call => "Call",
            PlayerActionKind::Raise => "Raise",
        };
        f.write_str(name)
    }
}

/// One logged decision. Fold and Check never carry chips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAction {
    kind: PlayerActionKind,
    chips: Chips,
    player_name: String,
}

impl PlayerAction {
    pub fn new(kind: PlayerActionKind, player_name: impl Into<String>) -> Self {
        Self {
            kind,
            chips: Chips::ZERO,
            player_name: player_name.into(),
        }
    }

    pub fn fold(player_name: impl Into<String>) -> Self {
        Self::new(PlayerActionKind::Fold, player_name)
    }

    pub fn check(player_name: impl Into<String>) -> Self {
        Self::new(PlayerActionKind::Check, player_name)
    }

    pub fn with_chips(self, amount: u64) -> Result<Self, GameError> {
        if !self.kind.carries_chips() {
            return Err(ActionError::AmountNotAllowed(self.kind).into());
        }
        Ok(Self {
            chips: Chips::new(amount),
            ..self
        })
    }

    pub fn kind(&self) -> PlayerActionKind {
        self.kind
    }

    pub fn chips(&self) -> Chips {
        self.chips
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PlayerActionKind::Fold => write!(f, "{} folded.", self.player_name),
            PlayerActionKind::Check => write!(f, "{} checked.", self.player_name),
            PlayerActionKind::Call => write!(
                f,
                "{} called {}.",
                self.player_name,
                self.chips.to_shorthand()
            ),
            PlayerActionKind::Raise => write!(
                f,
                "{} raised to {}.",
                self.player_name,
                self.chips.to_shorthand()
            ),
        }
    }
}

/// What a seat asks to do on its turn, as delivered by the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub kind: PlayerActionKind,
    #[serde(default)]
    pub amount: Option<u64>,
}

impl ActionRequest {
    pub fn fold() -> Self {
        Self {
            kind: PlayerActionKind::Fold,
            amount: None,
        }
    }

    pub fn check() -> Self {
        Self {
            kind: PlayerActionKind::Check,
            amount: None,
        }
    }

    pub fn call() -> Self {
        Self {
            kind: PlayerActionKind::Call,
            amount: None,
        }
    }

    pub fn raise(amount: u64) -> Self {
        Self {
            kind: PlayerActionKind::Raise,
            amount: Some(amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PlayerActionKind::*;
    use super::*;

    #[test]
    fn legality_table() {
        let kinds = [Fold, Check, Call, Raise];
        for k in kinds {
            assert!(k.can_follow(None), "{} first", k);
            assert!(Fold.can_follow(Some(k)), "Fold after {}", k);
            assert!(Raise.can_follow(Some(k)), "Raise after {}", k);
        }
        assert!(!Check.can_follow(Some(Call)));
        assert!(!Check.can_follow(Some(Raise)));
        assert!(Check.can_follow(Some(Check)));
        assert!(Call.can_follow(Some(Raise)));
        assert!(Call.can_follow(Some(Check)));
        assert!(Call.can_follow(Some(Call)));
    }

    #[test]
    fn chips_rejected_on_fold_and_check() {
        assert_eq!(
            PlayerAction::fold("a").with_chips(10),
            Err(GameError::IllegalAction(ActionError::AmountNotAllowed(Fold)))
        );
        assert!(PlayerAction::check("a").with_chips(10).is_err());
        let raise = PlayerAction::new(Raise, "a").with_chips(1200).unwrap();
        assert_eq!(raise.to_string(), "a raised to 1.2K.");
    }
}
