//! Cancellable delayed continuations.
//!
//! The sequencer never chains callbacks directly; it asks a [`Scheduler`]
//! for one continuation at a time and keeps the returned [`TimerHandle`] in
//! its single pending slot. Two implementations:
//!
//! - [`TokioScheduler`]: wall-clock timers on the tokio runtime
//! - [`ManualScheduler`]: virtual clock advanced explicitly

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use dashmap::DashMap;
use tokio::runtime::Handle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Opaque reference to one pending continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Numeric id, unique per scheduler.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Work run when a timer fires. Receives its own handle.
pub type Continuation = Box<dyn FnOnce(TimerHandle) + Send + 'static>;

/// Schedules and cancels delayed continuations.
pub trait Scheduler: Send + Sync {
    /// Runs `continuation` once `delay` has elapsed, unless cancelled first.
    fn schedule(&self, delay: Duration, continuation: Continuation) -> TimerHandle;

    /// Cancels a pending continuation.
    ///
    /// Returns `false` if it already fired or was already cancelled.
    fn cancel(&self, handle: TimerHandle) -> bool;

    /// Number of continuations scheduled but not yet fired or cancelled.
    fn outstanding(&self) -> usize;
}

// ============================================================================
// Tokio scheduler
// ============================================================================

/// Scheduler backed by one tokio task per timer.
///
/// Each task races a per-timer [`CancellationToken`] against its deadline.
/// The deadline is fixed when [`schedule`](Scheduler::schedule) is called,
/// not when the task is first polled.
#[derive(Debug)]
pub struct TokioScheduler {
    runtime: Handle,
    next_id: AtomicU64,
    pending: Arc<DashMap<TimerHandle, CancellationToken>>,
    shutdown: CancellationToken,
}

impl TokioScheduler {
    /// Creates a scheduler spawning onto `runtime`.
    #[must_use]
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: AtomicU64::new(1),
            pending: Arc::new(DashMap::new()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Creates a scheduler on the current runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Cancels every pending timer and refuses to fire any scheduled later.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.pending.clear();
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, continuation: Continuation) -> TimerHandle {
        let handle = TimerHandle(self.next_id.fetch_add(1, Ordering::SeqCst));
        if self.shutdown.is_cancelled() {
            trace!(%handle, "scheduler shut down; dropping continuation");
            return handle;
        }
        let deadline = Instant::now() + delay;
        let token = self.shutdown.child_token();
        self.pending.insert(handle, token.clone());

        let pending = Arc::clone(&self.pending);
        self.runtime.spawn(async move {
            tokio::select! {
                () = token.cancelled() => {
                    trace!(%handle, "timer cancelled");
                }
                () = tokio::time::sleep_until(deadline) => {
                    // Removal decides the race with `cancel`: whoever removes
                    // the entry owns the outcome.
                    if pending.remove(&handle).is_some() {
                        trace!(%handle, "timer fired");
                        continuation(handle);
                    }
                }
            }
        });

        handle
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        self.pending.remove(&handle).is_some_and(|(_, token)| {
            token.cancel();
            true
        })
    }

    fn outstanding(&self) -> usize {
        self.pending.len()
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ============================================================================
// Manual scheduler
// ============================================================================

struct ManualTimer {
    handle: TimerHandle,
    continuation: Continuation,
}

#[derive(Default)]
struct ManualInner {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), ManualTimer>,
}

/// Scheduler driven by an explicit virtual clock.
///
/// Continuations fire only inside [`advance`](Self::advance) or
/// [`run_next`](Self::run_next), in deadline order (ties in scheduling
/// order), with the clock set to their deadline while they run.
#[derive(Default)]
pub struct ManualScheduler {
    inner: Mutex<ManualInner>,
}

impl ManualScheduler {
    /// Creates a scheduler with the clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Deadline of the earliest pending continuation.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.lock().queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Moves the clock forward by `by`, firing every continuation due.
    ///
    /// Returns the number of continuations fired.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut fired = 0;
        while self.fire_next_due(target) {
            fired += 1;
        }
        let mut inner = self.lock();
        if inner.now < target {
            inner.now = target;
        }
        fired
    }

    /// Jumps to the earliest deadline and fires that continuation.
    ///
    /// Returns `false` when nothing is pending.
    pub fn run_next(&self) -> bool {
        self.next_deadline()
            .is_some_and(|deadline| self.fire_next_due(deadline))
    }

    fn fire_next_due(&self, target: Duration) -> bool {
        let timer = {
            let mut inner = self.lock();
            let due = inner
                .queue
                .first_key_value()
                .is_some_and(|((deadline, _), _)| *deadline <= target);
            if !due {
                return false;
            }
            let Some(((deadline, _), timer)) = inner.queue.pop_first() else {
                return false;
            };
            inner.now = deadline;
            timer
        };
        // Lock released: the continuation may schedule again.
        (timer.continuation)(timer.handle);
        true
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, continuation: Continuation) -> TimerHandle {
        let mut inner = self.lock();
        inner.next_id += 1;
        let handle = TimerHandle(inner.next_id);
        let deadline = inner.now + delay;
        inner.queue.insert(
            (deadline, handle.0),
            ManualTimer {
                handle,
                continuation,
            },
        );
        handle
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        let mut inner = self.lock();
        let key = inner
            .queue
            .iter()
            .find(|(_, timer)| timer.handle == handle)
            .map(|(key, _)| *key);
        key.is_some_and(|key| inner.queue.remove(&key).is_some())
    }

    fn outstanding(&self) -> usize {
        self.lock().queue.len()
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("ManualScheduler")
            .field("now", &inner.now)
            .field("outstanding", &inner.queue.len())
            .finish_non_exhaustive()
    }
}
