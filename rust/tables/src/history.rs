use std::path::Path;
use std::sync::{Mutex, RwLock};

use holdem_engine::logger::{HandLogger, HandRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::GameId;

/// A completed hand and the game it was played in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredHand {
    pub game_id: GameId,
    pub record: HandRecord,
}

/// Completed hands of every game, newest last, optionally mirrored to a
/// JSONL file.
#[derive(Debug, Default)]
pub struct HistoryStore {
    hands: RwLock<Vec<StoredHand>>,
    sink: Option<Mutex<HandLogger>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also appends every hand to `path`. Hands are then renumbered with the
    /// file's date and sequence so ids stay unique across games.
    pub fn with_file<P: AsRef<Path>>(path: P) -> Result<Self, HistoryError> {
        let logger = HandLogger::create(path)?;
        Ok(Self {
            hands: RwLock::new(Vec::new()),
            sink: Some(Mutex::new(logger)),
        })
    }

    pub fn add_hand(&self, game_id: &GameId, mut record: HandRecord) -> Result<(), HistoryError> {
        if let Some(sink) = &self.sink {
            let mut logger = sink.lock().map_err(|_| HistoryError::StoragePoisoned)?;
            record.hand_id = logger.next_id();
            logger.write(&record)?;
        }
        tracing::debug!(game_id = %game_id, hand_id = %record.hand_id, "hand recorded");

        let mut hands = self
            .hands
            .write()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        hands.push(StoredHand {
            game_id: game_id.clone(),
            record,
        });
        Ok(())
    }

    /// Most recent first; `limit` defaults to 100.
    pub fn recent_hands(
        &self,
        game_id: &GameId,
        limit: Option<usize>,
    ) -> Result<Vec<HandRecord>, HistoryError> {
        let hands = self
            .hands
            .read()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        Ok(hands
            .iter()
            .rev()
            .filter(|h| &h.game_id == game_id)
            .take(limit.unwrap_or(100))
            .map(|h| h.record.clone())
            .collect())
    }

    pub fn get_hand(&self, hand_id: &str) -> Result<Option<StoredHand>, HistoryError> {
        let hands = self
            .hands
            .read()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        Ok(hands.iter().find(|h| h.record.hand_id == hand_id).cloned())
    }

    pub fn total_hands(&self) -> Result<usize, HistoryError> {
        let hands = self
            .hands
            .read()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        Ok(hands.len())
    }
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History storage poisoned")]
    StoragePoisoned,
    #[error("cannot write hand log: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(id: &str) -> HandRecord {
        HandRecord {
            hand_id: id.to_string(),
            seed: Some(1),
            dealer: "a".into(),
            players: vec!["a".into(), "b".into()],
            actions: Vec::new(),
            board: Vec::new(),
            winnings: BTreeMap::from([("a".to_string(), 30)]),
            ts: None,
            showdown: None,
        }
    }

    #[test]
    fn recent_hands_are_per_game_and_newest_first() {
        let store = HistoryStore::new();
        let (g1, g2) = ("g1".to_string(), "g2".to_string());
        store.add_hand(&g1, record("h1")).unwrap();
        store.add_hand(&g2, record("h2")).unwrap();
        store.add_hand(&g1, record("h3")).unwrap();

        let ids: Vec<String> = store
            .recent_hands(&g1, None)
            .unwrap()
            .into_iter()
            .map(|r| r.hand_id)
            .collect();
        assert_eq!(ids, vec!["h3", "h1"]);
        assert_eq!(store.recent_hands(&g1, Some(1)).unwrap().len(), 1);
        assert_eq!(store.total_hands().unwrap(), 3);
        assert_eq!(store.get_hand("h2").unwrap().unwrap().game_id, "g2");
        assert!(store.get_hand("missing").unwrap().is_none());
    }

    #[test]
    fn file_sink_renumbers_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hands.jsonl");
        let store = HistoryStore::with_file(&path).unwrap();
        store.add_hand(&"g1".to_string(), record("dup")).unwrap();
        store.add_hand(&"g2".to_string(), record("dup")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let ids: Vec<String> = content
            .lines()
            .map(|l| serde_json::from_str::<HandRecord>(l).unwrap().hand_id)
            .collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert!(ids[1].ends_with("-000002"));
        assert!(store.get_hand(&ids[0]).unwrap().is_some());
    }
}
