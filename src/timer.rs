//! Timer engine: independent recurring schedules for timed messages.
//!
//! Started once at session start. Each enabled timer gets its own task that
//! wakes every `minutes` and sends its message through the shared messenger;
//! tasks never touch store state, so no locking is needed. There is no
//! cancellation: schedules run for the lifetime of the process.

use crate::messenger::Messenger;
use crate::state::TimerStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Start one schedule per currently loaded timer.
///
/// The enabled flag is read once, here; toggling it afterwards has no
/// effect on a running schedule. Returns how many schedules were started.
pub fn run_all(store: &TimerStore, messenger: Arc<dyn Messenger>) -> usize {
    let mut started = 0;
    for (name, record) in store.iter() {
        if !record.enabled {
            continue;
        }

        let name = name.clone();
        let message = record.message.clone();
        let period = Duration::from_secs(record.minutes * 60);
        let messenger = Arc::clone(&messenger);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately; consume it so the first
            // message goes out one full period after startup.
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Err(e) = messenger.send(&message).await {
                    warn!(timer = %name, error = %e, "Timer schedule stopped: outbound channel closed");
                    break;
                }
            }
        });
        started += 1;
    }

    info!(count = started, "Timer schedules started");
    started
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    struct QueueMessenger(mpsc::UnboundedSender<String>);

    #[async_trait]
    impl Messenger for QueueMessenger {
        async fn send(&self, text: &str) -> Result<(), mpsc::error::SendError<String>> {
            self.0.send(text.to_string())
        }
    }

    async fn store_with(entries: &[(&str, &str, &str)]) -> TimerStore {
        let db = Database::new(":memory:").await.unwrap();
        let mut store = TimerStore::load(db).await.unwrap();
        for &(name, minutes, message) in entries {
            store.add(name, minutes, message).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn enabled_timer_fires_once_per_interval() {
        let store = store_with(&[("!hydrate", "1", "drink water")]).await;
        // Pause only after the DB is connected: pausing before the blocking
        // SQLite connect lets the virtual clock auto-advance past the pool's
        // acquire timeout and spuriously fail with PoolTimedOut.
        tokio::time::pause();
        let (tx, mut rx) = mpsc::unbounded_channel();

        assert_eq!(run_all(&store, Arc::new(QueueMessenger(tx))), 1);

        // The paused clock auto-advances to the next tick when idle.
        assert_eq!(rx.recv().await.unwrap(), "drink water");
        assert_eq!(rx.recv().await.unwrap(), "drink water");
    }

    #[tokio::test]
    async fn disabled_timer_is_never_scheduled() {
        // Plant a disabled row directly, as a fresh session would see it.
        let db = Database::new(":memory:").await.unwrap();
        db.timers()
            .insert("!quiet", "should not fire", 1, false)
            .await
            .unwrap();
        let store = TimerStore::load(db).await.unwrap();

        // Pause only after the DB is connected: pausing before the blocking
        // SQLite connect lets the virtual clock auto-advance past the pool's
        // acquire timeout and spuriously fail with PoolTimedOut.
        tokio::time::pause();
        let (tx, mut rx) = mpsc::unbounded_channel();
        // Hold the messenger (and thus the sender) alive across the timeout so
        // the channel stays open; otherwise `recv` returns `None` immediately
        // and the timeout never gets a chance to expire.
        let messenger: Arc<dyn Messenger> = Arc::new(QueueMessenger(tx));
        assert_eq!(run_all(&store, Arc::clone(&messenger)), 0);

        let outcome = tokio::time::timeout(Duration::from_secs(300), rx.recv()).await;
        assert!(outcome.is_err(), "disabled timer should never fire");
    }
}
