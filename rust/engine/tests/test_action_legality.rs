use holdem_engine::action::{ActionRequest, PlayerAction, PlayerActionKind as K};
use holdem_engine::errors::{ActionError, GameError};
use holdem_engine::rules::{validate_action, ValidatedAction};

const ALL: [K; 4] = [K::Fold, K::Check, K::Call, K::Raise];

#[test]
fn fold_and_raise_may_follow_anything() {
    for prev in ALL {
        assert!(K::Fold.can_follow(Some(prev)));
        assert!(K::Raise.can_follow(Some(prev)));
    }
}

#[test]
fn check_only_follows_check_or_fold() {
    assert!(K::Check.can_follow(None));
    assert!(K::Check.can_follow(Some(K::Fold)));
    assert!(K::Check.can_follow(Some(K::Check)));
    assert!(!K::Check.can_follow(Some(K::Call)));
    assert!(!K::Check.can_follow(Some(K::Raise)));
}

#[test]
fn call_answers_a_raise() {
    assert!(K::Call.can_follow(Some(K::Raise)));
    assert!(K::Call.can_follow(Some(K::Check)));
}

#[test]
fn fold_and_check_carry_no_chips() {
    for action in [PlayerAction::fold("a"), PlayerAction::check("a")] {
        let kind = action.kind();
        assert_eq!(
            action.with_chips(100),
            Err(GameError::IllegalAction(ActionError::AmountNotAllowed(kind)))
        );
    }
    let call = PlayerAction::new(K::Call, "bob").with_chips(40).unwrap();
    assert_eq!(call.chips().get(), 40);
    assert_eq!(call.to_string(), "bob called 40.");
}

#[test]
fn validation_rejects_amounts_on_fold_and_check() {
    for kind in [K::Fold, K::Check] {
        let request = ActionRequest {
            kind,
            amount: Some(500),
        };
        assert_eq!(
            validate_action(1000, 0, 20, None, request),
            Err(GameError::IllegalAction(ActionError::AmountNotAllowed(kind)))
        );
    }
}

#[test]
fn validation_follows_the_ordering_rule() {
    // check straight after a raise
    assert!(matches!(
        validate_action(500, 0, 20, Some(K::Raise), ActionRequest::check()),
        Err(GameError::IllegalAction(ActionError::OutOfOrder { .. }))
    ));
    // call after raise
    assert_eq!(
        validate_action(500, 60, 20, Some(K::Raise), ActionRequest::call()),
        Ok(ValidatedAction::Call(60))
    );
    // fold always
    for prev in ALL {
        assert_eq!(
            validate_action(500, 60, 20, Some(prev), ActionRequest::fold()),
            Ok(ValidatedAction::Fold)
        );
    }
}

#[test]
fn checking_into_a_bet_is_rejected() {
    assert_eq!(
        validate_action(500, 20, 20, None, ActionRequest::check()),
        Err(ActionError::CheckFacingBet { to_call: 20 }.into())
    );
}

#[test]
fn calling_with_nothing_owed_moves_no_chips() {
    let v = validate_action(500, 0, 20, Some(K::Call), ActionRequest::call()).unwrap();
    assert_eq!(v, ValidatedAction::Call(0));
    assert_eq!(v.amount(), 0);
}

#[test]
fn over_stack_raise_is_insufficient_chips() {
    assert_eq!(
        validate_action(500, 20, 20, None, ActionRequest::raise(501)),
        Err(GameError::InsufficientChips {
            requested: 501,
            available: 500
        })
    );
}

#[test]
fn short_all_in_raise_is_allowed() {
    let v = validate_action(30, 20, 20, Some(K::Raise), ActionRequest::raise(30)).unwrap();
    assert_eq!(v, ValidatedAction::AllIn(30));
    assert_eq!(v.logged_kind(20), K::Raise);
}
