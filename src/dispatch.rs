//! Cooperative event dispatcher.
//!
//! One thread owns the loop; everything that mutates resource state runs on
//! it, one task at a time, to completion. Interrupt-context producers (the
//! hardware timer, the transport session thread) never touch shared state —
//! they enqueue into a bounded inbox through a [`QueueHandle`] and the loop
//! picks the work up on its own thread.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────────┐
//! │ Timer ISR   │────▶│  Bounded     │     │  Dispatch loop   │
//! │ Transport   │────▶│  inbox       │────▶│  (single thread) │
//! └─────────────┘     └──────────────┘     │   timer heap     │
//!        loop-internal scheduling ────────▶│   (unbounded)    │
//!                                          └──────────────────┘
//! ```
//!
//! Ordering guarantee: tasks execute in scheduled-tick order; tasks sharing
//! a tick execute in enqueue order (monotonic sequence numbers break ties).
//! The tick's wall-clock length is supplied by the caller of
//! [`EventQueue::run_forever`]; tests drive virtual time with
//! [`EventQueue::run_until`] instead.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::time::{Duration, Instant};

use log::warn;

/// A deferred unit of work. Tasks may schedule further tasks through the
/// [`TimerQueue`] they receive, which is how the blink pattern replays.
pub type Task<C> = Box<dyn FnOnce(&mut C, &mut TimerQueue<C>) + Send>;

type PeriodicTask<C> = Box<dyn FnMut(&mut C, &mut TimerQueue<C>) + Send>;

enum Job<C> {
    Once(Task<C>),
    Every { period: u64, f: PeriodicTask<C> },
}

struct Entry<C> {
    due: u64,
    seq: u64,
    job: Job<C>,
}

// BinaryHeap is a max-heap; reverse the comparison so the earliest
// (due, seq) pair surfaces first.
impl<C> Ord for Entry<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due, other.seq).cmp(&(self.due, self.seq))
    }
}

impl<C> PartialOrd for Entry<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C> PartialEq for Entry<C> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<C> Eq for Entry<C> {}

// ───────────────────────────────────────────────────────────────
// Timer queue (loop-internal scheduling)
// ───────────────────────────────────────────────────────────────

/// The dispatcher's timer heap. Running tasks borrow it to schedule
/// follow-up work; it is unbounded, so a long blink pattern can always
/// enqueue its full toggle sequence.
pub struct TimerQueue<C> {
    now: u64,
    seq: u64,
    heap: BinaryHeap<Entry<C>>,
}

impl<C> TimerQueue<C> {
    fn new() -> Self {
        Self {
            now: 0,
            seq: 0,
            heap: BinaryHeap::new(),
        }
    }

    /// Current tick. Advances only when a task runs.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedule a one-shot task `delay` ticks from now.
    pub fn post(&mut self, delay: u64, task: impl FnOnce(&mut C, &mut TimerQueue<C>) + Send + 'static) {
        self.post_boxed(delay, Box::new(task));
    }

    fn post_boxed(&mut self, delay: u64, task: Task<C>) {
        self.seq += 1;
        self.heap.push(Entry {
            due: self.now.saturating_add(delay),
            seq: self.seq,
            job: Job::Once(task),
        });
    }

    /// Schedule a recurring task every `period` ticks, first firing one
    /// period from now. A zero period is promoted to one tick — the loop
    /// must always make forward progress.
    pub fn post_periodic(
        &mut self,
        period: u64,
        task: impl FnMut(&mut C, &mut TimerQueue<C>) + Send + 'static,
    ) {
        let period = period.max(1);
        self.seq += 1;
        self.heap.push(Entry {
            due: self.now.saturating_add(period),
            seq: self.seq,
            job: Job::Every {
                period,
                f: Box::new(task),
            },
        });
    }

    /// Number of scheduled entries (periodic entries count once).
    pub fn pending(&self) -> usize {
        self.heap.len()
    }

    fn next_due(&self) -> Option<u64> {
        self.heap.peek().map(|e| e.due)
    }

    /// Pop and run the earliest entry, advancing `now` to its tick.
    fn run_next(&mut self, ctx: &mut C) {
        let Some(entry) = self.heap.pop() else {
            return;
        };
        self.now = entry.due;
        match entry.job {
            Job::Once(f) => f(ctx, self),
            Job::Every { period, mut f } => {
                f(ctx, self);
                // Fixed-period rescheduling: next fire keyed off the
                // scheduled tick, not the (virtual) completion time.
                self.seq += 1;
                self.heap.push(Entry {
                    due: entry.due.saturating_add(period),
                    seq: self.seq,
                    job: Job::Every { period, f },
                });
            }
        }
    }

    fn fast_forward(&mut self, tick: u64) {
        self.now = self.now.max(tick);
    }
}

// ───────────────────────────────────────────────────────────────
// External producer handle
// ───────────────────────────────────────────────────────────────

/// Cloneable, `Send` handle for posting work from outside the dispatch
/// thread. The only thing a producer can do is enqueue.
pub struct QueueHandle<C> {
    tx: SyncSender<Task<C>>,
}

impl<C> Clone for QueueHandle<C> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<C> QueueHandle<C> {
    /// Enqueue a task for the dispatch loop. Never blocks: when the inbox
    /// is full the task is dropped and `false` returned, so an interrupt
    /// context can call this safely.
    pub fn post(&self, task: impl FnOnce(&mut C, &mut TimerQueue<C>) + Send + 'static) -> bool {
        match self.tx.try_send(Box::new(task)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("dispatch: inbox full, dropping posted task");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Event queue (the dispatcher)
// ───────────────────────────────────────────────────────────────

/// The cooperative dispatcher: timer heap plus the bounded inbox that
/// debounces interrupt-context producers onto the loop's thread.
pub struct EventQueue<C> {
    timers: TimerQueue<C>,
    inbox: Receiver<Task<C>>,
    inbox_tx: SyncSender<Task<C>>,
}

impl<C> EventQueue<C> {
    pub fn new(inbox_capacity: usize) -> Self {
        let (inbox_tx, inbox) = mpsc::sync_channel(inbox_capacity.max(1));
        Self {
            timers: TimerQueue::new(),
            inbox,
            inbox_tx,
        }
    }

    /// Handle for interrupt-context / cross-thread producers.
    pub fn handle(&self) -> QueueHandle<C> {
        QueueHandle {
            tx: self.inbox_tx.clone(),
        }
    }

    pub fn now(&self) -> u64 {
        self.timers.now()
    }

    /// Schedule a one-shot task `delay` ticks from now.
    pub fn post(&mut self, delay: u64, task: impl FnOnce(&mut C, &mut TimerQueue<C>) + Send + 'static) {
        self.timers.post(delay, task);
    }

    /// Schedule a fixed-period recurring task.
    pub fn post_periodic(
        &mut self,
        period: u64,
        task: impl FnMut(&mut C, &mut TimerQueue<C>) + Send + 'static,
    ) {
        self.timers.post_periodic(period, task);
    }

    /// Move externally posted tasks onto the timer heap. They are stamped
    /// with the current tick, so they run before anything scheduled later
    /// and in the order they were posted.
    fn drain_inbox(&mut self) {
        while let Ok(task) = self.inbox.try_recv() {
            self.timers.post_boxed(0, task);
        }
    }

    /// Run every task due at or before `deadline`, in (tick, enqueue)
    /// order, then advance the clock to `deadline`. Tasks scheduled by
    /// running tasks are honoured within the same call. This is the test
    /// and simulation driver; production uses [`run_forever`].
    ///
    /// [`run_forever`]: EventQueue::run_forever
    pub fn run_until(&mut self, ctx: &mut C, deadline: u64) {
        loop {
            self.drain_inbox();
            match self.timers.next_due() {
                Some(due) if due <= deadline => self.timers.run_next(ctx),
                _ => break,
            }
        }
        self.timers.fast_forward(deadline);
    }

    /// Dispatch forever, pacing ticks against the wall clock. `tick_unit`
    /// is the configured wall-clock length of one tick. Blocks on the
    /// inbox while idle so external posts wake the loop immediately.
    pub fn run_forever(&mut self, ctx: &mut C, tick_unit: Duration) -> ! {
        let epoch = Instant::now();
        loop {
            self.drain_inbox();

            let Some(due) = self.timers.next_due() else {
                // Nothing scheduled at all: sleep on the inbox.
                match self.inbox.recv() {
                    Ok(task) => self.timers.post_boxed(0, task),
                    Err(_) => std::thread::park(),
                }
                continue;
            };

            let target = epoch + ticks_to_duration(tick_unit, due);
            let wall = Instant::now();
            if wall < target {
                match self.inbox.recv_timeout(target - wall) {
                    Ok(task) => self.timers.post_boxed(0, task),
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => {
                        let wall = Instant::now();
                        if wall < target {
                            std::thread::sleep(target - wall);
                        }
                    }
                }
                continue;
            }

            self.timers.run_next(ctx);
        }
    }
}

fn ticks_to_duration(tick_unit: Duration, ticks: u64) -> Duration {
    Duration::from_nanos((tick_unit.as_nanos() as u64).saturating_mul(ticks))
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
