use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use holdem_engine::events::GameEvent;
use holdem_engine::player::PlayerId;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::registry::GameId;

// Bounded so a stalled subscriber cannot grow memory; it is dropped instead.
const EVENT_CHANNEL_BUFFER: usize = 1000;

pub type EventSender = mpsc::Sender<TableEvent>;
pub type EventReceiver = mpsc::Receiver<TableEvent>;

/// What subscribers of one game receive: the engine's own step events plus
/// table-level seat and lifecycle changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableEvent {
    GameCreated {
        game_id: GameId,
        players: Vec<PlayerId>,
    },
    PlayerJoined {
        game_id: GameId,
        player: PlayerId,
        chips: u64,
    },
    PlayerLeft {
        game_id: GameId,
        player: PlayerId,
        chips: u64,
    },
    Engine {
        game_id: GameId,
        event: GameEvent,
    },
    TurnTimedOut {
        game_id: GameId,
        player: PlayerId,
        turn: u64,
    },
    GameClosed {
        game_id: GameId,
        reason: String,
    },
}

impl TableEvent {
    pub fn game_id(&self) -> &GameId {
        match self {
            TableEvent::GameCreated { game_id, .. }
            | TableEvent::PlayerJoined { game_id, .. }
            | TableEvent::PlayerLeft { game_id, .. }
            | TableEvent::Engine { game_id, .. }
            | TableEvent::TurnTimedOut { game_id, .. }
            | TableEvent::GameClosed { game_id, .. } => game_id,
        }
    }

    pub fn engine_event(&self) -> Option<&GameEvent> {
        match self {
            TableEvent::Engine { event, .. } => Some(event),
            _ => None,
        }
    }
}

/// A live subscription; dropping it unsubscribes.
pub struct EventSubscription {
    bus: EventBus,
    game_id: GameId,
    subscriber_id: usize,
    pub receiver: EventReceiver,
}

impl EventSubscription {
    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    pub fn receiver(&mut self) -> &mut EventReceiver {
        &mut self.receiver
    }

    /// Everything already delivered, without waiting.
    pub fn drain(&mut self) -> Vec<TableEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.game_id, self.subscriber_id);
    }
}

/// Fan-out of table events to any number of subscribers per game.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

#[derive(Debug, Default)]
struct EventBusInner {
    subscribers: RwLock<HashMap<GameId, Vec<(usize, EventSender)>>>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, game_id: GameId) -> EventSubscription {
        let (subscriber_id, receiver) = self.subscribe_raw(game_id.clone());
        EventSubscription {
            bus: self.clone(),
            game_id,
            subscriber_id,
            receiver,
        }
    }

    fn subscribe_raw(&self, game_id: GameId) -> (usize, EventReceiver) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        self.write().entry(game_id.clone()).or_default().push((id, tx));

        tracing::debug!(game_id = %game_id, subscriber_id = id, "subscribed to game events");
        (id, rx)
    }

    /// Delivers `event` to every subscriber of its game without blocking.
    /// Subscribers whose channel is full or closed are removed.
    pub fn broadcast(&self, event: TableEvent) {
        let game_id = event.game_id().clone();
        let subscribers = self.read().get(&game_id).cloned();

        let Some(list) = subscribers else {
            tracing::trace!(game_id = %game_id, "no subscribers for game");
            return;
        };

        tracing::trace!(game_id = %game_id, subscribers = list.len(), event = ?event, "broadcasting");
        let mut failed = Vec::new();
        for (id, sender) in list {
            if let Err(e) = sender.try_send(event.clone()) {
                tracing::warn!(
                    game_id = %game_id,
                    subscriber_id = id,
                    error = %e,
                    "dropping subscriber"
                );
                failed.push(id);
            }
        }
        if !failed.is_empty() {
            self.remove_subscribers(&game_id, &failed);
        }
    }

    pub fn unsubscribe(&self, game_id: &GameId, subscriber_id: usize) {
        self.remove_subscribers(game_id, &[subscriber_id]);
    }

    /// Forgets every subscriber of a closed game; their receivers then end.
    pub fn drop_game(&self, game_id: &GameId) {
        self.write().remove(game_id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.read().values().map(|list| list.len()).sum()
    }

    fn remove_subscribers(&self, game_id: &GameId, ids: &[usize]) {
        let mut guard = self.write();
        if let Some(list) = guard.get_mut(game_id) {
            list.retain(|(id, _)| !ids.contains(id));
            if list.is_empty() {
                guard.remove(game_id);
            }
        }
    }

    // The map only holds senders, so a poisoned lock is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<GameId, Vec<(usize, EventSender)>>> {
        match self.inner.subscribers.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<GameId, Vec<(usize, EventSender)>>> {
        match self.inner.subscribers.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed(game: &str) -> TableEvent {
        TableEvent::GameClosed {
            game_id: game.to_string(),
            reason: "test".into(),
        }
    }

    #[test]
    fn stale_receiver_is_pruned() {
        let bus = EventBus::new();
        let game = "g".to_string();
        let (id, rx) = bus.subscribe_raw(game.clone());
        drop(rx);
        bus.broadcast(closed(&game));
        assert_eq!(bus.subscriber_count(), 0);
        bus.unsubscribe(&game, id);
    }

    #[test]
    fn full_channel_drops_subscriber() {
        let bus = EventBus::new();
        let game = "g".to_string();
        let _sub = bus.subscribe(game.clone());
        for _ in 0..=EVENT_CHANNEL_BUFFER {
            bus.broadcast(closed(&game));
        }
        assert_eq!(bus.subscriber_count(), 0);
    }
}
