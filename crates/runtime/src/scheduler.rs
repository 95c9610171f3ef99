//! Tick-driven scheduler backing the host's single main execution line.
//!
//! [`TickScheduler`] implements [`Scheduler`] over a due-tick ordered queue.
//! The owner drives time with [`TickScheduler::advance`]; due tasks are
//! drained under the lock and executed outside it, so tasks may schedule
//! further work without deadlocking.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ability_core::{OnceTask, RepeatingTask, Scheduler, TaskControl, TaskHandle, Tick};
use tracing::trace;

/// Read-only view of the scheduler clock.
///
/// Scheduled tasks capture a clock instead of the scheduler itself, so the
/// task queue never owns a reference back to its scheduler.
#[derive(Clone, Debug, Default)]
pub struct TickClock {
    ticks: Arc<AtomicU64>,
}

impl TickClock {
    pub fn now(&self) -> Tick {
        Tick(self.ticks.load(Ordering::Acquire))
    }

    fn advance(&self) -> Tick {
        Tick(self.ticks.fetch_add(1, Ordering::AcqRel) + 1)
    }
}

enum TaskBody {
    Once(OnceTask),
    Repeating { period: u64, task: RepeatingTask },
}

struct ScheduledTask {
    handle: TaskHandle,
    body: TaskBody,
}

/// Queue key: due tick, then submission order.
type QueueKey = (Tick, u64);

/// Main-line scheduler driven by explicit tick advancement.
#[derive(Default)]
pub struct TickScheduler {
    clock: TickClock,
    queue: Mutex<BTreeMap<QueueKey, ScheduledTask>>,
    next_id: AtomicU64,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clock(&self) -> TickClock {
        self.clock.clone()
    }

    /// Number of queued tasks, including cancelled ones not yet drained.
    pub fn pending(&self) -> usize {
        self.queue().len()
    }

    /// Advances the clock `ticks` times, running every task that falls due.
    /// Returns the number of task invocations.
    pub fn advance(&self, ticks: u64) -> usize {
        let mut executed = 0;
        for _ in 0..ticks {
            let now = self.clock.advance();
            executed += self.run_due(now);
        }
        executed
    }

    /// Cancels and drops every queued task. Returns the number dropped.
    pub fn cancel_all(&self) -> usize {
        let drained = std::mem::take(&mut *self.queue());
        for task in drained.values() {
            task.handle.cancel();
        }
        drained.len()
    }

    fn run_due(&self, now: Tick) -> usize {
        let due = {
            let mut queue = self.queue();
            let later = queue.split_off(&(now + 1, 0));
            std::mem::replace(&mut *queue, later)
        };

        let mut executed = 0;
        for (_, ScheduledTask { handle, body }) in due {
            if handle.is_cancelled() {
                continue;
            }
            executed += 1;
            match body {
                TaskBody::Once(task) => task(),
                TaskBody::Repeating { period, mut task } => {
                    if task() == TaskControl::Continue && !handle.is_cancelled() {
                        self.enqueue(now + period, handle, TaskBody::Repeating { period, task });
                    } else {
                        trace!(target: "runtime::scheduler", task = handle.id(), "repeating task finished");
                    }
                }
            }
        }
        executed
    }

    fn enqueue(&self, due: Tick, handle: TaskHandle, body: TaskBody) {
        let seq = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.queue().insert((due, seq), ScheduledTask { handle, body });
    }

    fn new_handle(&self) -> TaskHandle {
        TaskHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn queue(&self) -> MutexGuard<'_, BTreeMap<QueueKey, ScheduledTask>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for TickScheduler {
    fn now(&self) -> Tick {
        self.clock.now()
    }

    /// A zero delay runs on the next tick.
    fn run_once(&self, delay_ticks: u64, task: OnceTask) -> TaskHandle {
        let handle = self.new_handle();
        self.enqueue(
            self.now() + delay_ticks.max(1),
            handle.clone(),
            TaskBody::Once(task),
        );
        handle
    }

    fn run_repeating(
        &self,
        delay_ticks: u64,
        period_ticks: u64,
        task: RepeatingTask,
    ) -> TaskHandle {
        let handle = self.new_handle();
        self.enqueue(
            self.now() + delay_ticks.max(1),
            handle.clone(),
            TaskBody::Repeating {
                period: period_ticks.max(1),
                task,
            },
        );
        handle
    }

    /// Runs on the tokio blocking pool when called inside a runtime,
    /// inline otherwise.
    fn run_async(&self, task: OnceTask) {
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn_blocking(task);
            }
            Err(_) => task(),
        }
    }
}
