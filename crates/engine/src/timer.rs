//! Single-slot cancellable delayed task
//!
//! [`TimedLoop`] holds at most one pending invocation. Every arm bumps a
//! generation counter; the fired task receives a [`Tick`] carrying the
//! generation it was armed with and must [`claim`](TimedLoop::claim) it before
//! acting. A claim only succeeds for the latest generation while the loop is
//! live, so a tick that lost the race against `cancel_and_reschedule` or
//! `shutdown` can never apply.
//!
//! Callers that serialise the tick against other state (the engine does) take
//! their own lock first and claim inside it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::EngineError;

/// Token handed to a fired task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    generation: u64,
}

impl Tick {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    pending: Option<JoinHandle<()>>,
    shut_down: bool,
}

#[derive(Debug)]
pub struct TimedLoop {
    slot: Arc<Mutex<Slot>>,
    runtime: Handle,
}

impl TimedLoop {
    /// Bind to the current tokio runtime.
    ///
    /// This is the only fallible step: it fails outside a runtime.
    pub fn new() -> Result<Self, EngineError> {
        let runtime = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;
        Ok(Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            runtime,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Arm `task` to run after `delay`.
    ///
    /// No-op returning false when an invocation is already pending or the loop is
    /// shut down.
    pub fn schedule<F>(&self, delay: Duration, task: F) -> bool
    where
        F: FnOnce(Tick) + Send + 'static,
    {
        let mut slot = self.lock();
        if slot.shut_down || slot.pending.is_some() {
            return false;
        }
        self.arm(&mut slot, delay, task);
        true
    }

    /// Replace any pending invocation with `task` after `delay`.
    ///
    /// The old invocation is aborted and its tick invalidated, even if it already
    /// fired and is waiting to claim. Returns false once shut down.
    pub fn cancel_and_reschedule<F>(&self, delay: Duration, task: F) -> bool
    where
        F: FnOnce(Tick) + Send + 'static,
    {
        let mut slot = self.lock();
        if slot.shut_down {
            return false;
        }
        if let Some(old) = slot.pending.take() {
            old.abort();
            debug!(generation = slot.generation, "pending tick cancelled");
        }
        self.arm(&mut slot, delay, task);
        true
    }

    fn arm<F>(&self, slot: &mut Slot, delay: Duration, task: F)
    where
        F: FnOnce(Tick) + Send + 'static,
    {
        slot.generation = slot.generation.wrapping_add(1);
        let tick = Tick {
            generation: slot.generation,
        };
        debug!(generation = tick.generation, delay_ms = delay.as_millis() as u64, "tick armed");

        slot.pending = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            task(tick);
        }));
    }

    /// Consume the slot for a fired tick.
    ///
    /// True only for the most recently armed tick of a live loop, and only once.
    pub fn claim(&self, tick: Tick) -> bool {
        let mut slot = self.lock();
        if slot.shut_down || slot.generation != tick.generation || slot.pending.is_none() {
            debug!(generation = tick.generation, "stale tick dropped");
            return false;
        }
        // The task claiming is the one running; dropping its handle detaches it.
        slot.pending = None;
        true
    }

    pub fn is_pending(&self) -> bool {
        let slot = self.lock();
        !slot.shut_down && slot.pending.is_some()
    }

    /// Cancel any pending invocation and refuse new ones.
    ///
    /// Idempotent; returns true only for the call that actually shut the loop down.
    pub fn shutdown(&self) -> bool {
        let mut slot = self.lock();
        if slot.shut_down {
            return false;
        }
        slot.shut_down = true;
        if let Some(pending) = slot.pending.take() {
            pending.abort();
        }
        debug!("timed loop shut down");
        true
    }

    pub fn is_shut_down(&self) -> bool {
        self.lock().shut_down
    }
}

impl Drop for TimedLoop {
    fn drop(&mut self) {
        let mut slot = self.lock();
        if let Some(pending) = slot.pending.take() {
            pending.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counter() -> (Arc<AtomicU32>, impl Fn() -> u32) {
        let hits = Arc::new(AtomicU32::new(0));
        let read = {
            let hits = Arc::clone(&hits);
            move || hits.load(Ordering::SeqCst)
        };
        (hits, read)
    }

    #[test]
    fn test_new_outside_runtime_fails() {
        assert_eq!(TimedLoop::new().unwrap_err(), EngineError::NoRuntime);
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_fires_once() {
        let timer = Arc::new(TimedLoop::new().unwrap());
        let (hits, read) = counter();

        let t = Arc::clone(&timer);
        assert!(timer.schedule(Duration::from_millis(100), move |tick| {
            if t.claim(tick) {
                hits.fetch_add(1, Ordering::SeqCst);
            }
        }));
        assert!(timer.is_pending());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(read(), 1);
        assert!(!timer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_while_pending_is_noop() {
        let timer = TimedLoop::new().unwrap();
        assert!(timer.schedule(Duration::from_secs(1), |_| {}));
        assert!(!timer.schedule(Duration::from_secs(1), |_| {}));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_reschedule_replaces_pending() {
        let timer = Arc::new(TimedLoop::new().unwrap());
        let (hits, read) = counter();

        let h = Arc::clone(&hits);
        let t = Arc::clone(&timer);
        timer.schedule(Duration::from_millis(100), move |tick| {
            if t.claim(tick) {
                h.fetch_add(100, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        let t = Arc::clone(&timer);
        assert!(timer.cancel_and_reschedule(Duration::from_millis(100), move |tick| {
            if t.claim(tick) {
                hits.fetch_add(1, Ordering::SeqCst);
            }
        }));

        tokio::time::sleep(Duration::from_millis(75)).await;
        assert_eq!(read(), 0);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(read(), 1);
    }

    #[tokio::test]
    async fn test_superseded_tick_cannot_claim() {
        let timer = TimedLoop::new().unwrap();
        timer.schedule(Duration::from_secs(60), |_| {});
        let stale = Tick {
            generation: timer.lock().generation,
        };

        timer.cancel_and_reschedule(Duration::from_secs(60), |_| {});
        assert!(!timer.claim(stale));

        let current = Tick {
            generation: timer.lock().generation,
        };
        assert!(timer.claim(current));
        // A slot is consumed once.
        assert!(!timer.claim(current));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_is_idempotent_and_final() {
        let timer = TimedLoop::new().unwrap();
        let (hits, read) = counter();
        timer.schedule(Duration::from_millis(10), move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        });

        assert!(timer.shutdown());
        assert!(!timer.shutdown());
        assert!(timer.is_shut_down());
        assert!(!timer.is_pending());
        assert!(!timer.schedule(Duration::from_millis(10), |_| {}));
        assert!(!timer.cancel_and_reschedule(Duration::from_millis(10), |_| {}));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(read(), 0);
    }
}
