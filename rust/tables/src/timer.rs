use std::time::Duration;

use holdem_engine::player::PlayerId;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// A pending auto-fold for one turn. Dropping or cancelling the timer
/// aborts the delayed task; a timer that already fired is harmless to drop.
#[derive(Debug)]
pub struct TurnTimer {
    player: PlayerId,
    turn: u64,
    handle: JoinHandle<()>,
}

impl TurnTimer {
    /// Schedules `on_fire(player, turn)` after `duration` on the current
    /// tokio runtime. Returns `None` outside a runtime, in which case the
    /// turn simply has no deadline.
    pub fn start<F>(duration: Duration, player: PlayerId, turn: u64, on_fire: F) -> Option<Self>
    where
        F: FnOnce(PlayerId, u64) + Send + 'static,
    {
        let runtime = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!(player = %player, turn, "no async runtime, turn timer disabled");
                return None;
            }
        };

        let fired_player = player.clone();
        let handle = runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            tracing::debug!(player = %fired_player, turn, "turn timer fired");
            on_fire(fired_player, turn);
        });
        tracing::trace!(player = %player, turn, ?duration, "turn timer armed");

        Some(Self {
            player,
            turn,
            handle,
        })
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// True when this timer guards exactly `turn` of `player`.
    pub fn guards(&self, player: &str, turn: u64) -> bool {
        self.turn == turn && self.player == player
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn cancel(self) {
        tracing::trace!(player = %self.player, turn = self.turn, "turn timer cancelled");
        // Drop aborts the task.
    }
}

impl Drop for TurnTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn no_runtime_means_no_timer() {
        let timer = TurnTimer::start(Duration::from_millis(1), "p".into(), 1, |_, _| {});
        assert!(timer.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_the_deadline() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let timer = TurnTimer::start(Duration::from_secs(30), "p".into(), 4, move |player, turn| {
            assert_eq!((player.as_str(), turn), ("p", 4));
            flag.store(true, Ordering::SeqCst);
        })
        .unwrap();
        assert!(timer.guards("p", 4));

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert!(!fired.load(Ordering::SeqCst));
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_fires() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let timer = TurnTimer::start(Duration::from_secs(1), "p".into(), 1, move |_, _| {
            flag.store(true, Ordering::SeqCst);
        })
        .unwrap();
        timer.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }
}
