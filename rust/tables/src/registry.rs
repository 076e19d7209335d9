use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, Weak};
use std::time::{Duration, Instant};

use holdem_engine::action::ActionRequest;
use holdem_engine::cards::Card;
use holdem_engine::engine::GameEngine;
use holdem_engine::events::GameEvent;
use holdem_engine::game::GamePhase;
use holdem_engine::player::PlayerId;
use holdem_engine::settings::GameSettings;
use serde::Serialize;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::TablesConfig;
use crate::errors::TableError;
use crate::events::{EventBus, TableEvent};
use crate::history::HistoryStore;
use crate::timer::TurnTimer;

pub type GameId = String;

const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

/// A player to seat when the game is created. `chips` defaults to the
/// game's starting stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatRequest {
    pub id: PlayerId,
    pub name: String,
    pub chips: Option<u64>,
}

impl SeatRequest {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            chips: None,
        }
    }

    pub fn with_chips(mut self, chips: u64) -> Self {
        self.chips = Some(chips);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateGame {
    pub settings: GameSettings,
    /// Makes every shuffle and the first dealer reproducible
    pub seed: Option<u64>,
    pub players: Vec<SeatRequest>,
}

/// Read-only view of a table between two operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSnapshot {
    pub game_id: GameId,
    pub phase: GamePhase,
    pub hand_number: u64,
    pub dealer: Option<PlayerId>,
    pub current_player: Option<PlayerId>,
    pub turn: u64,
    pub board: Vec<Card>,
    pub pot: u64,
    pub seats: Vec<SeatSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub chips: u64,
    pub in_hand: bool,
    pub all_in: bool,
}

/// One running game. The engine and its turn timer live behind a single
/// lock: the turn check, the state change, the timer re-arm and the event
/// fan-out of an operation all happen inside one critical section.
#[derive(Debug)]
pub struct Table {
    id: GameId,
    state: Mutex<TableState>,
    last_active: Mutex<Instant>,
    bus: EventBus,
    history: Arc<HistoryStore>,
    this: Weak<Table>,
}

#[derive(Debug)]
struct TableState {
    engine: GameEngine,
    timer: Option<TurnTimer>,
}

impl Table {
    fn new(
        id: GameId,
        engine: GameEngine,
        bus: EventBus,
        history: Arc<HistoryStore>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            id,
            state: Mutex::new(TableState {
                engine,
                timer: None,
            }),
            last_active: Mutex::new(Instant::now()),
            bus,
            history,
            this: this.clone(),
        })
    }

    pub fn id(&self) -> &GameId {
        &self.id
    }

    /// Applies an action for `player`. Rejected actions leave the table
    /// untouched and publish nothing.
    pub fn act(&self, player: &str, request: ActionRequest) -> Result<Vec<GameEvent>, TableError> {
        self.touch();
        let mut state = self.lock()?;
        let events = match state.engine.act(player, request) {
            Ok(events) => events,
            Err(e) => {
                tracing::debug!(game_id = %self.id, player = %player, error = %e, "action rejected");
                return Err(e.into());
            }
        };
        self.publish(&mut state, &events);
        Ok(events)
    }

    pub fn start_hand(&self) -> Result<Vec<GameEvent>, TableError> {
        self.touch();
        let mut state = self.lock()?;
        let events = state.engine.start_hand()?;
        self.publish(&mut state, &events);
        Ok(events)
    }

    /// Seats a player between hands.
    pub fn join(&self, player: &str, name: &str, chips: Option<u64>) -> Result<(), TableError> {
        self.touch();
        let mut state = self.lock()?;
        let chips = chips.unwrap_or(state.engine.settings().starting_chips);
        state.engine.add_player(player, name, chips)?;
        self.bus.broadcast(TableEvent::PlayerJoined {
            game_id: self.id.clone(),
            player: player.to_string(),
            chips,
        });
        Ok(())
    }

    /// Unseats a player between hands and returns the stack it leaves with.
    pub fn leave(&self, player: &str) -> Result<u64, TableError> {
        self.touch();
        let mut state = self.lock()?;
        let chips = state.engine.remove_player(player)?.chips().get();
        self.bus.broadcast(TableEvent::PlayerLeft {
            game_id: self.id.clone(),
            player: player.to_string(),
            chips,
        });
        Ok(chips)
    }

    /// Abandons the hand in progress, refunding the pot.
    pub fn stop(&self) -> Result<Vec<GameEvent>, TableError> {
        let mut state = self.lock()?;
        let events = state.engine.stop();
        self.publish(&mut state, &events);
        Ok(events)
    }

    /// Folds `player` if it still holds `turn`. Returns whether it did;
    /// a timer that lost the race against a real action is ignored.
    pub fn handle_timeout(&self, player: &str, turn: u64) -> Result<bool, TableError> {
        let mut state = self.lock()?;
        match state.engine.timeout(player, turn)? {
            Some(events) => {
                tracing::info!(game_id = %self.id, player = %player, turn, "auto-folded on timeout");
                self.bus.broadcast(TableEvent::TurnTimedOut {
                    game_id: self.id.clone(),
                    player: player.to_string(),
                    turn,
                });
                self.publish(&mut state, &events);
                Ok(true)
            }
            None => {
                tracing::debug!(game_id = %self.id, player = %player, turn, "stale turn timer ignored");
                Ok(false)
            }
        }
    }

    pub fn snapshot(&self) -> Result<TableSnapshot, TableError> {
        let state = self.lock()?;
        let engine = &state.engine;
        Ok(TableSnapshot {
            game_id: self.id.clone(),
            phase: engine.phase(),
            hand_number: engine.hand_number(),
            dealer: engine.dealer().map(|p| p.id().to_string()),
            current_player: engine.current_player().map(|p| p.id().to_string()),
            turn: engine.turn(),
            board: engine.board().cards().to_vec(),
            pot: engine.pot().total(),
            seats: engine
                .players()
                .iter()
                .map(|p| SeatSnapshot {
                    id: p.id().to_string(),
                    name: p.display_name().to_string(),
                    chips: p.chips().get(),
                    in_hand: p.is_playing(),
                    all_in: p.is_all_in(),
                })
                .collect(),
        })
    }

    /// Runs `f` against the engine under the table lock.
    pub fn with_engine<R>(&self, f: impl FnOnce(&GameEngine) -> R) -> Result<R, TableError> {
        let state = self.lock()?;
        Ok(f(&state.engine))
    }

    /// The timer currently armed, as `(player, turn)`.
    pub fn pending_timer(&self) -> Result<Option<(PlayerId, u64)>, TableError> {
        let state = self.lock()?;
        Ok(state
            .timer
            .as_ref()
            .filter(|t| !t.is_finished())
            .map(|t| (t.player().to_string(), t.turn())))
    }

    fn lock(&self) -> Result<MutexGuard<'_, TableState>, TableError> {
        self.state.lock().map_err(|_| TableError::StoragePoisoned)
    }

    // Called with the table lock held so subscribers see events in the
    // order they were produced.
    fn publish(&self, state: &mut TableState, events: &[GameEvent]) {
        for event in events {
            if let GameEvent::HandCompleted { result } = event {
                tracing::info!(
                    game_id = %self.id,
                    hand = result.hand_number,
                    showdown = result.went_to_showdown(),
                    "hand completed"
                );
                if let Some(record) = state.engine.last_hand_record() {
                    if let Err(e) = self.history.add_hand(&self.id, record.clone()) {
                        tracing::error!(game_id = %self.id, error = %e, "failed to record hand");
                    }
                }
            }
            self.bus.broadcast(TableEvent::Engine {
                game_id: self.id.clone(),
                event: event.clone(),
            });
        }
        self.rearm_timer(state);
    }

    fn rearm_timer(&self, state: &mut TableState) {
        let Some(player) = state.engine.current_player().map(|p| p.id().to_string()) else {
            if let Some(timer) = state.timer.take() {
                timer.cancel();
            }
            return;
        };
        let turn = state.engine.turn();
        if state.timer.as_ref().is_some_and(|t| t.guards(&player, turn)) {
            return;
        }

        let table = self.this.clone();
        let game_id = self.id.clone();
        let fresh = TurnTimer::start(
            state.engine.settings().turn_timeout(),
            player,
            turn,
            move |player, turn| {
                let Some(table) = table.upgrade() else {
                    return;
                };
                if let Err(e) = table.handle_timeout(&player, turn) {
                    tracing::warn!(game_id = %game_id, player = %player, error = %e, "timeout fold failed");
                }
            },
        );
        // Replacing the old timer aborts it.
        state.timer = fresh;
    }

    fn touch(&self) {
        if let Ok(mut guard) = self.last_active.lock() {
            *guard = Instant::now();
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        match self.last_active.lock() {
            Ok(last) => last.elapsed() >= ttl,
            Err(_) => false,
        }
    }

    #[cfg(test)]
    fn force_last_active(&self, instant: Instant) {
        if let Ok(mut guard) = self.last_active.lock() {
            *guard = instant;
        }
    }
}

/// Every running game, keyed by id. Games are independent: operations on
/// different games only share the brief map lookup.
#[derive(Debug)]
pub struct GameRegistry {
    games: RwLock<HashMap<GameId, Arc<Table>>>,
    bus: EventBus,
    history: Arc<HistoryStore>,
    idle_ttl: Duration,
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::with_parts(EventBus::new(), Arc::new(HistoryStore::new()), DEFAULT_IDLE_TTL)
    }

    pub fn with_ttl(idle_ttl: Duration) -> Self {
        Self::with_parts(EventBus::new(), Arc::new(HistoryStore::new()), idle_ttl)
    }

    pub fn with_history(history: Arc<HistoryStore>) -> Self {
        Self::with_parts(EventBus::new(), history, DEFAULT_IDLE_TTL)
    }

    pub fn with_parts(bus: EventBus, history: Arc<HistoryStore>, idle_ttl: Duration) -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
            bus,
            history,
            idle_ttl,
        }
    }

    /// A registry using the configured idle TTL and hand log file.
    pub fn from_config(config: &TablesConfig) -> Result<Self, TableError> {
        let history = match &config.hand_log {
            Some(path) => HistoryStore::with_file(path)?,
            None => HistoryStore::new(),
        };
        Ok(Self::with_parts(
            EventBus::new(),
            Arc::new(history),
            config.idle_ttl(),
        ))
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Builds a table from the request and registers it under a fresh id.
    /// The first hand is not dealt until [`GameRegistry::start_hand`].
    pub fn create_game(&self, request: CreateGame) -> Result<GameId, TableError> {
        let id = Uuid::new_v4().to_string();
        let mut engine = match request.seed {
            Some(seed) => GameEngine::with_seed(request.settings, seed)?,
            None => GameEngine::new(request.settings)?,
        };
        for seat in &request.players {
            let chips = seat.chips.unwrap_or(engine.settings().starting_chips);
            engine.add_player(seat.id.clone(), seat.name.clone(), chips)?;
        }

        tracing::info!(
            game_id = %id,
            players = request.players.len(),
            small_blind = engine.settings().small_blind,
            big_blind = engine.settings().big_blind,
            "creating game"
        );

        let table = Table::new(id.clone(), engine, self.bus.clone(), Arc::clone(&self.history));
        {
            let mut guard = self
                .games
                .write()
                .map_err(|_| TableError::StoragePoisoned)?;
            guard.insert(id.clone(), table);
        }

        self.bus.broadcast(TableEvent::GameCreated {
            game_id: id.clone(),
            players: request.players.into_iter().map(|s| s.id).collect(),
        });
        Ok(id)
    }

    pub fn get(&self, id: &GameId) -> Result<Arc<Table>, TableError> {
        let guard = self.games.read().map_err(|_| TableError::StoragePoisoned)?;
        guard
            .get(id)
            .cloned()
            .ok_or_else(|| TableError::NotFound(id.clone()))
    }

    pub fn act(
        &self,
        id: &GameId,
        player: &str,
        request: ActionRequest,
    ) -> Result<Vec<GameEvent>, TableError> {
        tracing::debug!(game_id = %id, player = %player, ?request, "dispatching action");
        self.get(id)?.act(player, request)
    }

    pub fn start_hand(&self, id: &GameId) -> Result<Vec<GameEvent>, TableError> {
        self.get(id)?.start_hand()
    }

    pub fn join(
        &self,
        id: &GameId,
        player: &str,
        name: &str,
        chips: Option<u64>,
    ) -> Result<(), TableError> {
        self.get(id)?.join(player, name, chips)
    }

    pub fn leave(&self, id: &GameId, player: &str) -> Result<u64, TableError> {
        self.get(id)?.leave(player)
    }

    pub fn snapshot(&self, id: &GameId) -> Result<TableSnapshot, TableError> {
        self.get(id)?.snapshot()
    }

    /// Removes a game, refunding any hand in progress, and tells its
    /// subscribers why.
    pub fn close_game(&self, id: &GameId, reason: &str) -> Result<Vec<GameEvent>, TableError> {
        let table = {
            let mut guard = self
                .games
                .write()
                .map_err(|_| TableError::StoragePoisoned)?;
            guard
                .remove(id)
                .ok_or_else(|| TableError::NotFound(id.clone()))?
        };
        let events = table.stop()?;
        self.finish_close(id, reason);
        Ok(events)
    }

    /// Closes every game idle for longer than the TTL. Returns their ids.
    pub fn cleanup_idle(&self) -> Vec<GameId> {
        let mut expired = Vec::new();
        {
            let mut guard = match self.games.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.retain(|id, table| {
                if table.is_expired(self.idle_ttl) {
                    expired.push((id.clone(), Arc::clone(table)));
                    false
                } else {
                    true
                }
            });
        }

        for (id, table) in &expired {
            if let Err(e) = table.stop() {
                tracing::warn!(game_id = %id, error = %e, "could not stop idle game cleanly");
            }
            self.finish_close(id, "expired");
        }
        expired.into_iter().map(|(id, _)| id).collect()
    }

    /// Sweeps idle games every `every` until the registry is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let registry = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(registry) = registry.upgrade() else {
                    break;
                };
                let closed = registry.cleanup_idle();
                if !closed.is_empty() {
                    tracing::info!(closed = closed.len(), "idle games closed");
                }
            }
        })
    }

    pub fn active_games(&self) -> usize {
        match self.games.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn game_ids(&self) -> Vec<GameId> {
        match self.games.read() {
            Ok(guard) => guard.keys().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().keys().cloned().collect(),
        }
    }

    fn finish_close(&self, id: &GameId, reason: &str) {
        tracing::info!(game_id = %id, reason, "game closed");
        self.bus.broadcast(TableEvent::GameClosed {
            game_id: id.clone(),
            reason: reason.to_string(),
        });
        self.bus.drop_game(id);
    }
}
