//! Scripted players for simulations and load tests.
//!
//! A [`Bot`] looks at the engine while it holds the turn and answers with an
//! [`ActionRequest`]. Bots never see other players' hole cards beyond what
//! the engine exposes; none of them cheat, but none of them think either.

use clap::ValueEnum;
use holdem_engine::action::{ActionRequest, PlayerActionKind};
use holdem_engine::engine::GameEngine;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

pub trait Bot: Send {
    /// Chooses an action for `player_id`, which must be the current player.
    fn decide(&mut self, engine: &GameEngine, player_id: &str) -> ActionRequest;

    fn name(&self) -> &str;
}

/// Never folds, never raises.
#[derive(Debug, Clone, Default)]
pub struct CallingStation;

impl CallingStation {
    pub fn new() -> Self {
        Self
    }
}

impl Bot for CallingStation {
    fn decide(&mut self, engine: &GameEngine, _player_id: &str) -> ActionRequest {
        if engine.legal_actions().contains(&PlayerActionKind::Check) {
            ActionRequest::check()
        } else {
            ActionRequest::call()
        }
    }

    fn name(&self) -> &str {
        "CallingStation"
    }
}

/// Raises often and by random multiples of the minimum, folds now and then.
/// Reproducible for a given seed.
#[derive(Debug, Clone)]
pub struct Aggressive {
    rng: ChaCha20Rng,
    raise_pct: u32,
    fold_pct: u32,
}

impl Aggressive {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            raise_pct: 40,
            fold_pct: 10,
        }
    }
}

impl Bot for Aggressive {
    fn decide(&mut self, engine: &GameEngine, player_id: &str) -> ActionRequest {
        let legal = engine.legal_actions();
        let to_call = engine.to_call(player_id);
        let stack = engine.player(player_id).map_or(0, |p| p.chips().get());
        let roll = self.rng.random_range(0..100);

        if legal.contains(&PlayerActionKind::Raise) && roll < self.raise_pct {
            let min_raise = engine.round().min_raise().max(1);
            let amount = to_call + min_raise * self.rng.random_range(1..=3);
            return ActionRequest::raise(amount.min(stack));
        }
        if to_call > 0 && roll >= 100 - self.fold_pct {
            return ActionRequest::fold();
        }
        if legal.contains(&PlayerActionKind::Check) {
            ActionRequest::check()
        } else {
            ActionRequest::call()
        }
    }

    fn name(&self) -> &str {
        "Aggressive"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BotKind {
    /// Checks or calls every street
    Caller,
    /// Seeded random raiser
    Aggressive,
}

impl BotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BotKind::Caller => "caller",
            BotKind::Aggressive => "aggressive",
        }
    }
}

pub fn create_bot(kind: BotKind, seed: u64) -> Box<dyn Bot> {
    match kind {
        BotKind::Caller => Box::new(CallingStation::new()),
        BotKind::Aggressive => Box::new(Aggressive::new(seed)),
    }
}
