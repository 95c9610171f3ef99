use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::types::Tick;

/// Callback run once on the main line.
pub type OnceTask = Box<dyn FnOnce() + Send>;

/// Callback run periodically on the main line until it returns
/// [`TaskControl::Stop`] or its handle is cancelled.
pub type RepeatingTask = Box<dyn FnMut() -> TaskControl + Send>;

/// Whether a repeating task wants another run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskControl {
    Continue,
    Stop,
}

/// Cancellable reference to scheduled work.
///
/// Cancelling is idempotent and takes effect before the task's next run.
#[derive(Clone)]
pub struct TaskHandle {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl TaskHandle {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Tick-driven callback scheduler supplied by the host.
///
/// `run_once` and `run_repeating` callbacks execute on the single logical
/// main line between gameplay commands; `run_async` work runs elsewhere and
/// must not mutate gameplay state.
pub trait Scheduler: Send + Sync {
    /// Current tick of the main line.
    fn now(&self) -> Tick;

    fn run_once(&self, delay_ticks: u64, task: OnceTask) -> TaskHandle;

    fn run_repeating(&self, delay_ticks: u64, period_ticks: u64, task: RepeatingTask)
    -> TaskHandle;

    fn run_async(&self, task: OnceTask);
}
