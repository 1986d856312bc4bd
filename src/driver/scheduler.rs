use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub type RepeatingTask = Box<dyn FnMut() + Send + 'static>;

pub trait Scheduler {
    /// Runs `task` after `initial_delay`, then again `period` after each
    /// run finishes, until the returned handle is cancelled.
    fn schedule_repeating(
        &self,
        task: RepeatingTask,
        initial_delay: Duration,
        period: Duration,
    ) -> io::Result<ScheduleHandle>;
}

/// Fixed-delay scheduler backed by one background thread per task.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn schedule_repeating(
        &self,
        mut task: RepeatingTask,
        initial_delay: Duration,
        period: Duration,
    ) -> io::Result<ScheduleHandle> {
        let cancelled = Arc::new(AtomicBool::new(false));
        let runs = Arc::new(AtomicU64::new(0));
        let thread_cancelled = Arc::clone(&cancelled);
        let thread_runs = Arc::clone(&runs);

        let thread = thread::Builder::new()
            .name("themeswitch-timer".to_string())
            .spawn(move || {
                let mut delay = initial_delay;
                while wait(&thread_cancelled, delay) {
                    if panic::catch_unwind(AssertUnwindSafe(&mut task)).is_err() {
                        tracing::error!("scheduled task panicked; continuing");
                    }
                    thread_runs.fetch_add(1, Ordering::Relaxed);
                    delay = period;
                }
                tracing::debug!("scheduled task stopped");
            })?;

        Ok(ScheduleHandle {
            cancelled,
            runs,
            thread: Some(thread),
        })
    }
}

// Returns false once cancelled.
fn wait(cancelled: &AtomicBool, delay: Duration) -> bool {
    let deadline = Instant::now() + delay;
    loop {
        if cancelled.load(Ordering::Acquire) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::park_timeout(deadline - now);
    }
}

#[derive(Debug)]
pub struct ScheduleHandle {
    cancelled: Arc<AtomicBool>,
    runs: Arc<AtomicU64>,
    thread: Option<JoinHandle<()>>,
}

impl ScheduleHandle {
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Stops future runs and waits for the timer thread to exit.
    pub fn cancel(mut self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            thread.thread().unpark();
            if thread.join().is_err() {
                tracing::warn!("timer thread terminated abnormally");
            }
        }
    }

    /// Blocks until the task is cancelled from elsewhere; in practice for
    /// the rest of the process.
    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!("timer thread terminated abnormally");
            }
        }
    }
}
