//! Single-entry hand-off between the delivery thread and the decode worker.
//!
//! `put` never blocks on the consumer: a value that has not been taken yet is
//! replaced, so the worker always sees the most recent frame.

use parking_lot::{Condvar, Mutex};

struct SlotState<T> {
    value: Option<T>,
    closed: bool,
}

pub struct LatestSlot<T> {
    state: Mutex<SlotState<T>>,
    ready: Condvar,
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                value: None,
                closed: false,
            }),
            ready: Condvar::new(),
        }
    }

    /// Stores `value`; returns `true` if an untaken value was replaced.
    ///
    /// After `close` the value is discarded.
    pub fn put(&self, value: T) -> bool {
        let mut state = self.state.lock();
        if state.closed {
            return false;
        }
        let replaced = state.value.replace(value).is_some();
        drop(state);
        self.ready.notify_one();
        replaced
    }

    /// Blocks until a value is available; `None` once the slot is closed.
    pub fn take(&self) -> Option<T> {
        let mut state = self.state.lock();
        loop {
            if let Some(value) = state.value.take() {
                return Some(value);
            }
            if state.closed {
                return None;
            }
            self.ready.wait(&mut state);
        }
    }

    /// Drops any pending value; returns whether one was pending.
    pub fn clear(&self) -> bool {
        self.state.lock().value.take().is_some()
    }

    /// Wakes the consumer for good. Pending values are dropped.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.value = None;
        drop(state);
        self.ready.notify_all();
    }
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
