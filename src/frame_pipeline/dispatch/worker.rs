//! Decode worker thread lifecycle

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::frame_pipeline::common::error::Result;
use crate::frame_pipeline::dispatch::latest_slot::LatestSlot;

/// Owns a thread that drains a [`LatestSlot`] until the slot is closed.
///
/// A panic inside `handle` is logged and the item discarded; the thread keeps
/// draining.
pub struct DecodeWorker {
    thread_handle: Option<JoinHandle<()>>,
    name: String,
}

impl DecodeWorker {
    pub fn start<T, F>(name: &str, slot: Arc<LatestSlot<T>>, mut handle: F) -> Result<Self>
    where
        T: Send + 'static,
        F: FnMut(T) + Send + 'static,
    {
        let thread_name = name.to_string();
        info!(name = %name, "Starting decode worker");

        let thread_handle = thread::Builder::new().name(name.to_string()).spawn(move || {
            debug!(name = %thread_name, "Decode worker started");
            while let Some(item) = slot.take() {
                if panic::catch_unwind(AssertUnwindSafe(|| handle(item))).is_err() {
                    warn!(name = %thread_name, "Frame handler panicked, frame discarded");
                }
            }
            info!(name = %thread_name, "Decode worker exiting");
        })?;

        Ok(Self {
            thread_handle: Some(thread_handle),
            name: name.to_string(),
        })
    }

    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Waits for the thread; the slot must already be closed.
    pub fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            if handle.thread().id() == thread::current().id() {
                warn!(name = %self.name, "Decode worker cannot join itself");
                return;
            }
            if handle.join().is_err() {
                warn!(name = %self.name, "Decode worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn handler_panic_does_not_stop_the_worker() {
        let slot = Arc::new(LatestSlot::new());
        let (tx, rx) = mpsc::channel();
        let mut worker = DecodeWorker::start("test-worker", Arc::clone(&slot), move |item: u32| {
            if item == 0 {
                panic!("bad frame");
            }
            tx.send(item).unwrap();
        })
        .unwrap();

        slot.put(0);
        // The panicking item may be replaced before the worker sees it; either
        // way item 1 must come through.
        thread::sleep(Duration::from_millis(20));
        slot.put(1);
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 1);
        assert!(worker.is_running());

        slot.close();
        worker.join();
        assert!(!worker.is_running());
    }
}
