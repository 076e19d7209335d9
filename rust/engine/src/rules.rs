use crate::action::{ActionRequest, PlayerActionKind as K};
use crate::errors::{ActionError, GameError};

/// An action that has passed every betting rule, with the exact number of
/// chips it moves from the player's stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatedAction {
    Fold,
    Check,
    Call(u64),
    Raise(u64),
    AllIn(u64),
}

impl ValidatedAction {
    /// Chips this action moves into the pot.
    pub fn amount(self) -> u64 {
        match self {
            ValidatedAction::Fold | ValidatedAction::Check => 0,
            ValidatedAction::Call(a) | ValidatedAction::Raise(a) | ValidatedAction::AllIn(a) => a,
        }
    }

    /// The kind recorded in the action log. An all-in is logged as a call
    /// when it does not exceed what was owed.
    pub fn logged_kind(self, to_call: u64) -> K {
        match self {
            ValidatedAction::Fold => K::Fold,
            ValidatedAction::Check => K::Check,
            ValidatedAction::Call(_) => K::Call,
            ValidatedAction::Raise(_) => K::Raise,
            ValidatedAction::AllIn(a) if a <= to_call => K::Call,
            ValidatedAction::AllIn(_) => K::Raise,
        }
    }
}

/// Validates a requested action against the stack, the amount owed and the
/// previous action of the round.
///
/// `min_raise` is the smallest legal increase over `to_call`; a raise amount
/// counts every chip added by the action, the call part included. A raise
/// of exactly `to_call` is treated as a call, and committing the whole stack
/// is always allowed even when short of the minimum.
///
/// # Errors
///
/// - [`ActionError::OutOfOrder`] when the kind may not follow `previous`
/// - [`ActionError::CheckFacingBet`] when checking with chips owed
/// - [`ActionError::MissingAmount`] / [`ActionError::RaiseTooSmall`] for bad raises
/// - [`GameError::InsufficientChips`] when a raise exceeds the stack
///
/// # Examples
///
/// ```
/// use holdem_engine::action::{ActionRequest, PlayerActionKind};
/// use holdem_engine::rules::{validate_action, ValidatedAction};
///
/// let v = validate_action(1000, 50, 100, Some(PlayerActionKind::Raise), ActionRequest::call());
/// assert_eq!(v, Ok(ValidatedAction::Call(50)));
///
/// // short stack: the raise becomes an all-in
/// let v = validate_action(80, 50, 100, None, ActionRequest::raise(80));
/// assert_eq!(v, Ok(ValidatedAction::AllIn(80)));
/// ```
pub fn validate_action(
    stack: u64,
    to_call: u64,
    min_raise: u64,
    previous: Option<K>,
    request: ActionRequest,
) -> Result<ValidatedAction, GameError> {
    let kind = match request {
        ActionRequest {
            kind: K::Raise,
            amount: Some(amount),
        } if amount == to_call => K::Call,
        other => other.kind,
    };
    if !kind.carries_chips() && request.amount.is_some() {
        return Err(ActionError::AmountNotAllowed(kind).into());
    }
    if kind == K::Check && to_call > 0 {
        return Err(ActionError::CheckFacingBet { to_call }.into());
    }
    if !kind.can_follow(previous) {
        // `previous` is Some here: every kind may open a round.
        let after = previous.unwrap_or(K::Fold);
        return Err(ActionError::OutOfOrder { kind, after }.into());
    }

    match kind {
        K::Fold => Ok(ValidatedAction::Fold),
        K::Check => Ok(ValidatedAction::Check),
        K::Call => {
            if stack <= to_call {
                Ok(ValidatedAction::AllIn(stack))
            } else {
                Ok(ValidatedAction::Call(to_call))
            }
        }
        K::Raise => {
            let amount = request.amount.ok_or(ActionError::MissingAmount)?;
            if amount > stack {
                return Err(GameError::InsufficientChips {
                    requested: amount,
                    available: stack,
                });
            }
            if amount == stack {
                return Ok(ValidatedAction::AllIn(stack));
            }
            let minimum = to_call + min_raise;
            if amount < minimum {
                Err(ActionError::RaiseTooSmall { amount, minimum }.into())
            } else {
                Ok(ValidatedAction::Raise(amount))
            }
        }
    }
}
