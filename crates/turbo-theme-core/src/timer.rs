//! Scheduled tasks, cancellable handles and debouncing.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// A one-shot task run by a [`Scheduler`].
pub type Task = Box<dyn FnOnce()>;

/// Lifecycle of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Pending,
    Fired,
    Cancelled,
}

/// Handle to a scheduled task. Clones observe the same task.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    state: Rc<Cell<TimerState>>,
}

impl TimerHandle {
    /// Create a handle in the pending state.
    pub fn new() -> Self {
        Self {
            state: Rc::new(Cell::new(TimerState::Pending)),
        }
    }

    /// Prevent the task from running. No effect once it has fired.
    pub fn cancel(&self) {
        if self.state.get() == TimerState::Pending {
            self.state.set(TimerState::Cancelled);
        }
    }

    pub fn state(&self) -> TimerState {
        self.state.get()
    }

    pub fn is_pending(&self) -> bool {
        self.state.get() == TimerState::Pending
    }

    /// Run `task` if the handle is still pending, marking it fired.
    /// Scheduler backends call this when the delay elapses.
    pub fn fire(&self, task: Task) {
        if self.state.get() == TimerState::Pending {
            self.state.set(TimerState::Fired);
            task();
        }
    }
}

impl Default for TimerHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs tasks after a delay on the UI thread.
pub trait Scheduler {
    /// Schedule `task` to run once after `delay`.
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle;
}

struct PendingTask {
    due: Duration,
    seq: u64,
    handle: TimerHandle,
    task: Task,
}

#[derive(Default)]
struct ManualClock {
    now: Duration,
    seq: u64,
    queue: Vec<PendingTask>,
}

/// Virtual-clock scheduler. Time only moves when [`ManualScheduler::advance`]
/// is called; due tasks then run in deadline order, ties in scheduling order.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Rc<RefCell<ManualClock>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.clock.borrow().now
    }

    /// Number of tasks still waiting to run.
    pub fn pending(&self) -> usize {
        self.clock
            .borrow()
            .queue
            .iter()
            .filter(|t| t.handle.is_pending())
            .count()
    }

    /// Move the clock forward, running every task that falls due, including
    /// tasks scheduled by other tasks within the window.
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;

        loop {
            let next = {
                let mut clock = self.clock.borrow_mut();
                clock.queue.retain(|t| t.handle.is_pending());
                let idx = clock
                    .queue
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.seq))
                    .map(|(i, _)| i);

                match idx {
                    Some(i) => {
                        let task = clock.queue.swap_remove(i);
                        clock.now = task.due;
                        Some(task)
                    }
                    None => None,
                }
            };

            match next {
                Some(pending) => pending.handle.fire(pending.task),
                None => break,
            }
        }

        self.clock.borrow_mut().now = target;
    }

    /// Advance by a number of milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let handle = TimerHandle::new();
        let mut clock = self.clock.borrow_mut();
        let seq = clock.seq;
        clock.seq += 1;
        let due = clock.now + delay;
        clock.queue.push(PendingTask {
            due,
            seq,
            handle: handle.clone(),
            task,
        });
        handle
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("now", &self.now())
            .field("pending", &self.pending())
            .finish()
    }
}

/// Delays an action until `wait` has passed without another call.
///
/// Each call cancels the previously scheduled action, so only the last call
/// in a burst runs.
pub struct Debouncer {
    scheduler: Rc<dyn Scheduler>,
    wait: Duration,
    timer: RefCell<Option<TimerHandle>>,
}

impl Debouncer {
    pub fn new(scheduler: Rc<dyn Scheduler>, wait: Duration) -> Self {
        Self {
            scheduler,
            wait,
            timer: RefCell::new(None),
        }
    }

    /// Replace any pending action with `action`.
    pub fn call(&self, action: impl FnOnce() + 'static) {
        self.cancel();
        let handle = self.scheduler.schedule(self.wait, Box::new(action));
        *self.timer.borrow_mut() = Some(handle);
    }

    /// Drop the pending action, if any.
    pub fn cancel(&self) {
        if let Some(previous) = self.timer.borrow_mut().take() {
            previous.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.timer
            .borrow()
            .as_ref()
            .is_some_and(TimerHandle::is_pending)
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }
}

impl fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("wait", &self.wait)
            .field("pending", &self.is_pending())
            .finish()
    }
}
