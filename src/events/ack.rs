//! Animation acknowledgement gate.
//!
//! Before publishing an event that a renderer animates, the engine arms the
//! matching [`AckKind`] and then waits on the returned [`PendingAck`] with a
//! bound. The renderer calls [`AckGate::acknowledge`] once the animation is
//! done. An acknowledgement that arrives with nothing armed (too early, too
//! late, or duplicated) is dropped.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Which animation is being acknowledged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AckKind {
    DiceAnimation,
    MoveAnimation,
    CaptureAnimation,
}

/// How a bounded wait ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AckOutcome {
    Acknowledged,
    TimedOut,
    /// The bound was zero; nothing was awaited.
    Skipped,
}

/// Cloneable handle shared between the engine and renderers.
#[derive(Clone, Debug, Default)]
pub struct AckGate {
    pending: Arc<Mutex<FxHashMap<AckKind, oneshot::Sender<()>>>>,
}

impl AckGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a wait for `kind`. A stale armed wait of the same kind is dropped.
    #[must_use]
    pub fn arm(&self, kind: AckKind) -> PendingAck {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(kind, tx);
        PendingAck {
            kind,
            rx,
            gate: self.clone(),
        }
    }

    /// Signal that an animation finished.
    ///
    /// Returns false if nothing was waiting for it.
    pub fn acknowledge(&self, kind: AckKind) -> bool {
        let sender = self.pending.lock().remove(&kind);
        match sender {
            Some(tx) => tx.send(()).is_ok(),
            None => {
                debug!(?kind, "acknowledgement with nothing armed, dropped");
                false
            }
        }
    }

    #[must_use]
    pub fn is_armed(&self, kind: AckKind) -> bool {
        self.pending.lock().contains_key(&kind)
    }

    /// Drop every armed wait. Waiters resolve as timed out.
    pub fn clear(&self) {
        self.pending.lock().clear();
    }

    fn disarm(&self, kind: AckKind) {
        self.pending.lock().remove(&kind);
    }
}

/// An armed wait for one acknowledgement.
#[derive(Debug)]
pub struct PendingAck {
    kind: AckKind,
    rx: oneshot::Receiver<()>,
    gate: AckGate,
}

impl PendingAck {
    /// Wait up to `limit` for the acknowledgement.
    ///
    /// Never fails: a missing acknowledgement is logged and treated as
    /// received, so the game always moves forward.
    pub async fn wait(self, limit: Duration) -> AckOutcome {
        let PendingAck { kind, mut rx, gate } = self;

        if limit.is_zero() {
            let outcome = match rx.try_recv() {
                Ok(()) => AckOutcome::Acknowledged,
                Err(_) => AckOutcome::Skipped,
            };
            gate.disarm(kind);
            return outcome;
        }

        match tokio::time::timeout(limit, &mut rx).await {
            Ok(Ok(())) => AckOutcome::Acknowledged,
            Ok(Err(_)) => {
                debug!(?kind, "acknowledgement wait cleared");
                AckOutcome::TimedOut
            }
            Err(_) => {
                gate.disarm(kind);
                warn!(?kind, limit_ms = limit.as_millis() as u64, "animation acknowledgement timed out");
                AckOutcome::TimedOut
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_acknowledged_before_bound() {
        let gate = AckGate::new();
        let pending = gate.arm(AckKind::MoveAnimation);
        assert!(gate.is_armed(AckKind::MoveAnimation));

        let renderer = gate.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            renderer.acknowledge(AckKind::MoveAnimation);
        });

        assert_eq!(pending.wait(Duration::from_secs(3)).await, AckOutcome::Acknowledged);
        assert!(!gate.is_armed(AckKind::MoveAnimation));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_and_disarms() {
        let gate = AckGate::new();
        let pending = gate.arm(AckKind::CaptureAnimation);
        assert_eq!(pending.wait(Duration::from_secs(5)).await, AckOutcome::TimedOut);

        // A late acknowledgement is dropped.
        assert!(!gate.acknowledge(AckKind::CaptureAnimation));
    }

    #[tokio::test]
    async fn test_zero_bound_skips_wait() {
        let gate = AckGate::new();
        let pending = gate.arm(AckKind::DiceAnimation);
        assert_eq!(pending.wait(Duration::ZERO).await, AckOutcome::Skipped);
        assert!(!gate.is_armed(AckKind::DiceAnimation));
    }

    #[tokio::test]
    async fn test_immediate_acknowledgement_with_zero_bound() {
        let gate = AckGate::new();
        let pending = gate.arm(AckKind::DiceAnimation);
        assert!(gate.acknowledge(AckKind::DiceAnimation));
        assert_eq!(pending.wait(Duration::ZERO).await, AckOutcome::Acknowledged);
    }

    #[test]
    fn test_unarmed_acknowledgement_is_dropped() {
        let gate = AckGate::new();
        assert!(!gate.acknowledge(AckKind::MoveAnimation));
    }

    #[tokio::test]
    async fn test_clear_releases_waiters() {
        let gate = AckGate::new();
        let pending = gate.arm(AckKind::MoveAnimation);
        gate.clear();
        assert_eq!(pending.wait(Duration::from_secs(1)).await, AckOutcome::TimedOut);
    }
}
