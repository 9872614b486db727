//! Delayed tick delivery for the timer engine

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{sync::mpsc, task::JoinHandle, time::sleep};
use tracing::{debug, trace};

/// Identifies one scheduled tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Fire-and-forget delayed callbacks with synchronous cancellation.
///
/// A fired tick is delivered back to whoever owns the engine, which passes the
/// handle to `TimerEngine::on_tick_fired`. Cancelling an unknown or already
/// cancelled handle must be a no-op.
pub trait TickScheduler: Send {
    fn schedule(&mut self, delay: Duration) -> TickHandle;

    fn cancel(&mut self, handle: TickHandle);
}

/// Scheduler backed by tokio sleeps.
///
/// Each tick is its own task; the task's `JoinHandle` is kept so `cancel`
/// can abort it before it sends.
#[derive(Debug)]
pub struct TokioScheduler {
    fired_tx: mpsc::UnboundedSender<TickHandle>,
    pending: HashMap<TickHandle, JoinHandle<()>>,
    next_id: u64,
}

impl TokioScheduler {
    /// Create a scheduler and the receiver on which fired ticks arrive
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TickHandle>) {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            fired_tx,
            pending: HashMap::new(),
            next_id: 0,
        };
        (scheduler, fired_rx)
    }

    /// Number of ticks scheduled and not yet fired or cancelled
    pub fn outstanding(&self) -> usize {
        self.pending.values().filter(|task| !task.is_finished()).count()
    }
}

impl TickScheduler for TokioScheduler {
    fn schedule(&mut self, delay: Duration) -> TickHandle {
        self.pending.retain(|_, task| !task.is_finished());

        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        let fired_tx = self.fired_tx.clone();

        let task = tokio::spawn(async move {
            sleep(delay).await;
            if fired_tx.send(handle).is_err() {
                trace!("Tick {} fired after the engine went away", handle.0);
            }
        });
        self.pending.insert(handle, task);

        trace!("Scheduled tick {} in {:?}", handle.0, delay);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if let Some(task) = self.pending.remove(&handle) {
            task.abort();
            debug!("Cancelled tick {}", handle.0);
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.pending.drain() {
            task.abort();
        }
    }
}

#[derive(Debug, Default)]
struct ManualSchedulerInner {
    next_id: u64,
    pending: Vec<(TickHandle, Duration)>,
    scheduled: usize,
    cancelled: usize,
}

/// Scheduler that only records requests.
///
/// Tests keep a clone, advance a `ManualClock` and hand the pending handle to
/// the engine themselves.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<ManualSchedulerInner>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_inner<R>(&self, f: impl FnOnce(&mut ManualSchedulerInner) -> R) -> R {
        match self.inner.lock() {
            Ok(mut inner) => f(&mut inner),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    /// Most recently scheduled tick that is still outstanding
    pub fn pending(&self) -> Option<TickHandle> {
        self.with_inner(|inner| inner.pending.last().map(|(handle, _)| *handle))
    }

    /// Delay requested for the most recent outstanding tick
    pub fn pending_delay(&self) -> Option<Duration> {
        self.with_inner(|inner| inner.pending.last().map(|(_, delay)| *delay))
    }

    pub fn outstanding(&self) -> usize {
        self.with_inner(|inner| inner.pending.len())
    }

    /// Remove the most recent outstanding tick as if it had fired
    pub fn take_fired(&self) -> Option<TickHandle> {
        self.with_inner(|inner| inner.pending.pop().map(|(handle, _)| handle))
    }

    pub fn scheduled_count(&self) -> usize {
        self.with_inner(|inner| inner.scheduled)
    }

    pub fn cancelled_count(&self) -> usize {
        self.with_inner(|inner| inner.cancelled)
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration) -> TickHandle {
        self.with_inner(|inner| {
            inner.next_id += 1;
            let handle = TickHandle(inner.next_id);
            inner.pending.push((handle, delay));
            inner.scheduled += 1;
            handle
        })
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.with_inner(|inner| {
            let before = inner.pending.len();
            inner.pending.retain(|(pending, _)| *pending != handle);
            if inner.pending.len() != before {
                inner.cancelled += 1;
            }
        })
    }
}
