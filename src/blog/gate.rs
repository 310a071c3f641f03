//! Single-slot reload guard.
//!
//! The first caller to enter becomes the leader and runs the actual
//! pass. Callers arriving while the pass is outstanding queue a waiter
//! and receive the leader's outcome when it completes; afterwards the
//! slot is free and the next caller leads a fresh pass. A leader that
//! is dropped mid-pass delivers `ReloadError::Aborted` to its waiters
//! instead of leaving them hanging.

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::{ReloadError, ReloadResult};

#[derive(Default)]
struct GateInner {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<ReloadResult>>,
}

/// Collapses overlapping reload triggers into one in-flight pass.
#[derive(Default)]
pub struct ReloadGate {
    inner: Mutex<GateInner>,
}

/// What a caller got from [`ReloadGate::enter`].
pub enum GateEntry<'a> {
    /// This caller runs the pass and must call [`LeaderGuard::complete`].
    Leader(LeaderGuard<'a>),
    /// A pass is already running; await the shared outcome.
    Waiter(oneshot::Receiver<ReloadResult>),
}

impl ReloadGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&self) -> GateEntry<'_> {
        let mut inner = self.inner.lock();
        if inner.in_flight {
            let (tx, rx) = oneshot::channel();
            inner.waiters.push(tx);
            GateEntry::Waiter(rx)
        } else {
            inner.in_flight = true;
            GateEntry::Leader(LeaderGuard {
                gate: self,
                completed: false,
            })
        }
    }
}

/// Releases the gate when the leader finishes, or on drop if the
/// leader never got to finish.
pub struct LeaderGuard<'a> {
    gate: &'a ReloadGate,
    completed: bool,
}

impl LeaderGuard<'_> {
    /// Publish the pass outcome to every queued waiter, in queue order,
    /// and release the slot.
    pub fn complete(mut self, outcome: &ReloadResult) {
        self.completed = true;
        self.gate.release(outcome);
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.gate.release(&Err(ReloadError::Aborted));
        }
    }
}

impl ReloadGate {
    fn release(&self, outcome: &ReloadResult) {
        let waiters = {
            let mut inner = self.inner.lock();
            inner.in_flight = false;
            std::mem::take(&mut inner.waiters)
        };
        for waiter in waiters {
            // A waiter that stopped listening is fine to skip.
            let _ = waiter.send(outcome.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_single_caller_leads() {
        let gate = ReloadGate::new();
        let GateEntry::Leader(guard) = gate.enter() else {
            panic!("expected leader");
        };
        guard.complete(&Ok(()));

        // Slot released: next caller leads again.
        assert!(matches!(gate.enter(), GateEntry::Leader(_)));
    }

    #[tokio::test]
    async fn test_waiters_share_the_leader_outcome() {
        let gate = Arc::new(ReloadGate::new());
        let passes = Arc::new(AtomicU32::new(0));

        let GateEntry::Leader(guard) = gate.enter() else {
            panic!("expected leader");
        };

        let mut waiters = Vec::new();
        for _ in 0..4 {
            match gate.enter() {
                GateEntry::Waiter(rx) => waiters.push(rx),
                GateEntry::Leader(_) => panic!("second leader while in flight"),
            }
        }

        passes.fetch_add(1, Ordering::SeqCst);
        guard.complete(&Err(ReloadError::Aborted));

        for rx in waiters {
            let outcome = rx.await.expect("leader completed");
            assert!(matches!(outcome, Err(ReloadError::Aborted)));
        }
        assert_eq!(passes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropped_leader_aborts_waiters() {
        let gate = ReloadGate::new();

        let entry = gate.enter();
        let GateEntry::Waiter(rx) = gate.enter() else {
            panic!("expected waiter");
        };

        drop(entry);

        let outcome = rx.await.expect("drop released the gate");
        assert!(matches!(outcome, Err(ReloadError::Aborted)));
        assert!(matches!(gate.enter(), GateEntry::Leader(_)));
    }
}
