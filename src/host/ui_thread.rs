use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use super::{UiDispatcher, UiTask};

const UI_THREAD_NAME: &str = "themeswitch-ui";

/// Dedicated thread that owns every host visual mutation.
pub struct UiThread {
    sender: Mutex<Option<mpsc::Sender<UiTask>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl UiThread {
    pub fn spawn() -> io::Result<Self> {
        let (tx, rx) = mpsc::channel::<UiTask>();
        let handle = thread::Builder::new()
            .name(UI_THREAD_NAME.to_string())
            .spawn(move || {
                for task in rx {
                    if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                        tracing::error!("ui task panicked");
                    }
                }
                tracing::debug!("ui thread stopped");
            })?;

        Ok(Self {
            sender: Mutex::new(Some(tx)),
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Closes the queue and waits for already posted tasks to finish.
    pub fn shutdown(&self) {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            // The last reference may be released by a task on the ui thread.
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                tracing::warn!("ui thread terminated abnormally");
            }
        }
    }
}

impl UiDispatcher for UiThread {
    fn run_on_ui_thread(&self, task: UiTask) {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        match sender.as_ref() {
            Some(sender) => {
                if sender.send(task).is_err() {
                    tracing::warn!("ui thread gone; dropping task");
                }
            }
            None => tracing::warn!("ui thread shut down; dropping task"),
        }
    }
}

impl Drop for UiThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}
