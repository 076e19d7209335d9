use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use holdem_engine::action::{ActionRequest, PlayerActionKind as K};
use holdem_engine::engine::GameEngine;
use holdem_engine::errors::{ActionError, GameError};
use holdem_engine::events::GameEvent;
use holdem_engine::game::{GamePhase, Street};
use holdem_engine::settings::GameSettings;

fn settings() -> GameSettings {
    GameSettings {
        small_blind: 10,
        big_blind: 20,
        ..GameSettings::default()
    }
}

fn table(ids: &[&str], chips: u64, seed: u64) -> GameEngine {
    let mut engine = GameEngine::with_seed(settings(), seed).unwrap();
    for id in ids {
        engine.add_player(*id, id.to_uppercase(), chips).unwrap();
    }
    engine
}

fn current(engine: &GameEngine) -> String {
    engine.current_player().expect("someone to act").id().to_string()
}

fn chips(engine: &GameEngine, id: &str) -> u64 {
    engine.player(id).unwrap().chips().get()
}

fn total_chips(engine: &GameEngine) -> u64 {
    engine.players().iter().map(|p| p.chips().get()).sum::<u64>() + engine.pot().total()
}

#[test]
fn heads_up_dealer_posts_small_blind_and_acts_first() {
    let mut e = table(&["a", "b"], 1000, 1);
    e.start_hand().unwrap();
    let dealer = e.dealer().unwrap().id().to_string();
    let other = if dealer == "a" { "b" } else { "a" };

    assert_eq!(e.phase(), GamePhase::Preflop);
    assert_eq!(current(&e), dealer);
    assert_eq!(chips(&e, &dealer), 990);
    assert_eq!(chips(&e, other), 980);
    assert_eq!(e.pot().total(), 30);
    for p in e.players() {
        assert_eq!(p.hand().len(), 2);
    }
}

#[test]
fn out_of_turn_action_is_rejected_without_changes() {
    let mut e = table(&["a", "b", "c"], 1000, 2);
    e.start_hand().unwrap();
    let actor = current(&e);
    let waiting = e
        .players()
        .iter()
        .map(|p| p.id().to_string())
        .find(|id| *id != actor)
        .unwrap();
    let pot = e.pot().total();
    let stack = chips(&e, &waiting);
    let turn = e.turn();

    let err = e.act(&waiting, ActionRequest::call()).unwrap_err();
    assert_eq!(
        err,
        GameError::IllegalAction(ActionError::NotPlayersTurn {
            expected: actor.clone(),
            actual: waiting.clone()
        })
    );
    assert_eq!(e.pot().total(), pot);
    assert_eq!(chips(&e, &waiting), stack);
    assert_eq!(current(&e), actor);
    assert_eq!(e.turn(), turn);

    assert!(matches!(
        e.act("nobody", ActionRequest::fold()),
        Err(GameError::UnknownPlayer(_))
    ));
}

#[test]
fn illegal_amounts_do_not_mutate_state() {
    let mut e = table(&["a", "b"], 1000, 3);
    e.start_hand().unwrap();
    let actor = current(&e);
    let pot = e.pot().total();

    assert!(matches!(
        e.act(&actor, ActionRequest::check()),
        Err(GameError::IllegalAction(ActionError::CheckFacingBet { to_call: 10 }))
    ));
    assert!(matches!(
        e.act(&actor, ActionRequest::raise(5_000)),
        Err(GameError::InsufficientChips { .. })
    ));
    assert!(matches!(
        e.act(&actor, ActionRequest::raise(15)),
        Err(GameError::IllegalAction(ActionError::RaiseTooSmall { .. }))
    ));
    assert_eq!(e.pot().total(), pot);
    assert_eq!(current(&e), actor);
}

#[test]
fn big_blind_option_and_street_progression() {
    let mut e = table(&["a", "b"], 1000, 4);
    e.start_hand().unwrap();
    let dealer = current(&e);
    let bb = if dealer == "a" { "b" } else { "a" }.to_string();

    e.act(&dealer, ActionRequest::call()).unwrap();
    assert_eq!(current(&e), bb);
    assert_eq!(e.legal_actions(), vec![K::Fold, K::Call, K::Raise]);
    assert!(matches!(
        e.act(&bb, ActionRequest::check()),
        Err(GameError::IllegalAction(ActionError::OutOfOrder {
            kind: K::Check,
            after: K::Call
        }))
    ));

    let events = e.act(&bb, ActionRequest::call()).unwrap();
    assert_eq!(e.phase(), GamePhase::Flop);
    assert_eq!(e.board().len(), 3);
    assert!(events
        .iter()
        .any(|ev| matches!(ev, GameEvent::RoundResolved { street: Street::Preflop, pot: 40 })));
    // after the flop the player left of the dealer starts
    assert_eq!(current(&e), bb);

    e.act(&bb, ActionRequest::check()).unwrap();
    e.act(&dealer, ActionRequest::raise(40)).unwrap();
    assert!(e.act(&bb, ActionRequest::check()).is_err());
    e.act(&bb, ActionRequest::call()).unwrap();
    assert_eq!(e.phase(), GamePhase::Turn);
    assert_eq!(e.board().len(), 4);
    assert!(e.board().has_turn());
    assert!(!e.board().has_river());

    e.act(&bb, ActionRequest::check()).unwrap();
    e.act(&dealer, ActionRequest::check()).unwrap();
    assert_eq!(e.phase(), GamePhase::River);
    e.act(&bb, ActionRequest::check()).unwrap();
    let events = e.act(&dealer, ActionRequest::check()).unwrap();

    assert_eq!(e.phase(), GamePhase::HandComplete);
    let result = e.last_result().unwrap();
    assert!(result.went_to_showdown());
    assert_eq!(result.revealed.len(), 2);
    assert_eq!(result.board.len(), 5);
    assert_eq!(result.winnings.values().sum::<u64>(), 120);
    assert_eq!(result.deltas.values().sum::<i64>(), 0);
    assert!(matches!(events.last(), Some(GameEvent::HandCompleted { .. })));
    assert_eq!(total_chips(&e), 2000);
}

#[test]
fn everyone_folding_ends_the_hand_without_showdown() {
    let mut e = table(&["a", "b", "c"], 1000, 5);
    e.start_hand().unwrap();
    let first = current(&e);
    assert_eq!(first, e.dealer().unwrap().id());
    e.act(&first, ActionRequest::fold()).unwrap();
    let sb = current(&e);
    e.act(&sb, ActionRequest::fold()).unwrap();

    assert_eq!(e.phase(), GamePhase::HandComplete);
    assert!(e.board().is_empty());
    let result = e.last_result().unwrap();
    assert!(!result.went_to_showdown());
    assert_eq!(result.winnings.values().copied().collect::<Vec<_>>(), vec![30]);
    assert_eq!(result.deltas.get(&sb), Some(&-10));
    assert_eq!(result.deltas.get(&first), Some(&0));

    let last_line = e.log().lines().last().cloned().unwrap();
    assert!(last_line.ends_with("won 30 chips."), "{}", last_line);
}

#[test]
fn all_in_and_call_runs_out_the_board() {
    let mut e = table(&["a", "b"], 1000, 6);
    e.start_hand().unwrap();
    let dealer = current(&e);
    let bb = if dealer == "a" { "b" } else { "a" }.to_string();

    e.act(&dealer, ActionRequest::raise(990)).unwrap();
    assert_eq!(chips(&e, &dealer), 0);
    assert!(e.player(&dealer).unwrap().is_all_in());
    let events = e.act(&bb, ActionRequest::call()).unwrap();

    let streets: Vec<Street> = events
        .iter()
        .filter_map(|ev| match ev {
            GameEvent::BoardDealt { street, .. } => Some(*street),
            _ => None,
        })
        .collect();
    assert_eq!(streets, vec![Street::Flop, Street::Turn, Street::River]);
    assert_eq!(e.phase(), GamePhase::HandComplete);
    assert_eq!(e.board().len(), 5);
    assert_eq!(total_chips(&e), 2000);
    assert!(e.pot().is_empty());
}

#[test]
fn dealer_rotates_every_hand() {
    let ids = ["a", "b", "c", "d"];
    let mut e = table(&ids, 1000, 7);
    let mut dealers = Vec::new();
    for _ in 0..6 {
        e.start_hand().unwrap();
        dealers.push(e.dealer().unwrap().position());
        while e.phase() != GamePhase::HandComplete {
            let id = current(&e);
            e.act(&id, ActionRequest::fold()).unwrap();
        }
    }
    for pair in dealers.windows(2) {
        assert_eq!(pair[1], (pair[0] + 1) % ids.len());
    }
}

#[test]
fn seats_only_change_between_hands() {
    let mut e = GameEngine::with_seed(
        GameSettings {
            max_players: 3,
            ..settings()
        },
        8,
    )
    .unwrap();
    e.add_player("a", "A", 500).unwrap();
    assert!(matches!(
        e.start_hand(),
        Err(GameError::NotEnoughPlayers { available: 1 })
    ));
    e.add_player("b", "B", 500).unwrap();
    assert_eq!(
        e.add_player("b", "B2", 500),
        Err(GameError::DuplicatePlayer("b".to_string()))
    );
    e.add_player("c", "C", 500).unwrap();
    assert_eq!(
        e.add_player("d", "D", 500),
        Err(GameError::TableFull { max: 3 })
    );

    e.start_hand().unwrap();
    assert_eq!(e.start_hand().unwrap_err(), GameError::HandInProgress);
    assert_eq!(e.remove_player("a").unwrap_err(), GameError::HandInProgress);

    e.stop();
    let removed = e.remove_player("a").unwrap();
    assert_eq!(removed.chips().get(), 500);
    assert_eq!(e.players().len(), 2);
}

#[test]
fn hand_started_lists_seats_left_of_the_dealer() {
    let mut e = table(&["a", "b", "c"], 1000, 12);
    let events = e.start_hand().unwrap();
    match &events[0] {
        GameEvent::HandStarted { dealer, players, .. } => {
            assert_eq!(players.len(), 3);
            assert_eq!(players.last(), Some(dealer));
        }
        other => panic!("unexpected first event {:?}", other),
    }
}

#[test]
fn fold_or_check_with_an_amount_is_rejected() {
    let mut e = table(&["a", "b"], 1000, 13);
    e.start_hand().unwrap();
    let actor = current(&e);
    let pot = e.pot().total();
    let turn = e.turn();

    for kind in [K::Fold, K::Check] {
        let request = ActionRequest {
            kind,
            amount: Some(500),
        };
        assert_eq!(
            e.act(&actor, request),
            Err(GameError::IllegalAction(ActionError::AmountNotAllowed(kind)))
        );
    }
    assert_eq!(e.pot().total(), pot);
    assert_eq!(e.turn(), turn);
    assert_eq!(current(&e), actor);
    assert_eq!(e.phase(), GamePhase::Preflop);
}

#[test]
fn broke_players_sit_out() {
    let mut e = table(&["a", "b"], 1000, 9);
    e.add_player("c", "C", 0).unwrap();
    let events = e.start_hand().unwrap();
    match &events[0] {
        GameEvent::HandStarted { players, .. } => {
            assert_eq!(players.len(), 2);
            assert!(!players.contains(&"c".to_string()));
        }
        other => panic!("unexpected first event {:?}", other),
    }
    assert!(!e.player("c").unwrap().is_playing());
    assert!(matches!(
        e.act("c", ActionRequest::fold()),
        Err(GameError::IllegalAction(ActionError::PlayerNotActive(_)))
    ));
}

#[test]
fn stale_timeouts_are_ignored() {
    let mut e = table(&["a", "b", "c"], 1000, 10);
    e.start_hand().unwrap();
    let actor = current(&e);
    let turn = e.turn();

    let bystander = e
        .players()
        .iter()
        .map(|p| p.id().to_string())
        .find(|id| *id != actor)
        .unwrap();
    assert_eq!(e.timeout(&bystander, turn).unwrap(), None);
    assert_eq!(e.timeout(&actor, turn - 1).unwrap(), None);

    let events = e.timeout(&actor, turn).unwrap().expect("live timeout folds");
    assert!(events.iter().any(|ev| matches!(
        ev,
        GameEvent::PlayerActed { player, action } if *player == actor && action.kind() == K::Fold
    )));
    assert!(!e.player(&actor).unwrap().is_playing());
}

#[test]
fn stopping_refunds_the_pot() {
    let mut e = table(&["a", "b", "c"], 1000, 11);
    e.start_hand().unwrap();
    let actor = current(&e);
    e.act(&actor, ActionRequest::raise(100)).unwrap();
    assert_eq!(e.pot().total(), 130);

    let events = e.stop();
    assert!(matches!(events.last(), Some(GameEvent::GameStopped { .. })));
    assert_eq!(e.phase(), GamePhase::WaitingForPlayers);
    for p in e.players() {
        assert_eq!(p.chips().get(), 1000);
    }
    e.start_hand().unwrap();
}

#[test]
fn log_is_archived_when_next_hand_starts() {
    let mut e = table(&["a", "b"], 1000, 12);
    e.start_hand().unwrap();
    let actor = current(&e);
    e.act(&actor, ActionRequest::fold()).unwrap();
    let lines = e.log().lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], format!("{} folded.", actor.to_uppercase()));

    e.start_hand().unwrap();
    assert!(e.log().entries().is_empty());
    assert_eq!(e.log().last_hand().len(), 2);
    let record = e.last_hand_record().unwrap();
    assert_eq!(record.actions.len(), 1);
    assert!(record.showdown.is_none());
}

#[test]
fn same_seed_replays_the_same_hand() {
    let mut a = table(&["a", "b", "c"], 1000, 99);
    let mut b = table(&["a", "b", "c"], 1000, 99);
    let ea = a.start_hand().unwrap();
    let eb = b.start_hand().unwrap();
    assert_eq!(ea, eb);
}

#[test]
fn random_play_conserves_chips() {
    let mut rng = ChaCha20Rng::seed_from_u64(77);
    for game in 0..20u64 {
        let n = rng.random_range(2..=6);
        let ids: Vec<String> = (0..n).map(|i| format!("p{}", i)).collect();
        let refs: Vec<&str> = ids.iter().map(|s| s.as_str()).collect();
        let mut e = table(&refs, 500, game);
        let total = 500 * n as u64;

        for _ in 0..40 {
            if e.start_hand().is_err() {
                break;
            }
            let mut steps = 0;
            while let Some(player) = e.current_player() {
                let id = player.id().to_string();
                let stack = player.chips().get();
                let legal = e.legal_actions();
                let kind = legal[rng.random_range(0..legal.len())];
                let request = match kind {
                    K::Raise => {
                        let minimum = e.to_call(&id) + e.round().min_raise();
                        if stack <= minimum {
                            ActionRequest::raise(stack)
                        } else {
                            ActionRequest::raise(rng.random_range(minimum..=stack))
                        }
                    }
                    K::Fold => ActionRequest::fold(),
                    K::Check => ActionRequest::check(),
                    K::Call => ActionRequest::call(),
                };
                e.act(&id, request).unwrap();
                assert_eq!(total_chips(&e), total, "game {}", game);
                steps += 1;
                assert!(steps < 500, "hand did not terminate");
            }
            assert_eq!(e.phase(), GamePhase::HandComplete);
            assert!(e.pot().is_empty());
            let result = e.last_result().unwrap();
            assert_eq!(result.deltas.values().sum::<i64>(), 0);
        }
    }
}
