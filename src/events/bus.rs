//! Publish/subscribe channel for game events.
//!
//! Each session owns its own bus, so several games can run side by side and
//! tests can observe exactly the events of the game under test. Backed by a
//! `tokio::sync::broadcast` channel: every subscriber sees every event
//! published after it subscribed.

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{trace, warn};

use super::event::GameEvent;

/// Cloneable publishing handle.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<GameEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: GameEvent) {
        trace!(event = event.name(), "publish");
        let _ = self.tx.send(event);
    }

    /// Subscribe to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Receiving end of an [`EventBus`].
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<GameEvent>,
}

impl Subscription {
    /// Wait for the next event. Returns `None` once the bus is gone.
    ///
    /// A subscriber that fell behind skips the events it missed.
    pub async fn recv(&mut self) -> Option<GameEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "event subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take every event that is already buffered.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Lagged(missed)) => {
                    warn!(missed, "event subscriber lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return events,
            }
        }
    }
}
