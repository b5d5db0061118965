//! Upstream raw-frame feed
//!
//! The driver side pushes frames into an [`UpstreamFeed`]; dispatchers
//! subscribe to it. [`FrameFeed`] is the in-process implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::frame_pipeline::raw::RawFrameView;

/// Receives raw frames on the driver's delivery thread.
///
/// The view is only valid for the duration of the call.
pub trait RawFrameListener: Send + Sync {
    fn on_raw_frame(&self, frame: &RawFrameView<'_>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

pub trait UpstreamFeed: Send + Sync {
    fn subscribe(&self, listener: Arc<dyn RawFrameListener>) -> SubscriptionToken;

    /// Removing an unknown token is a no-op.
    fn unsubscribe(&self, token: SubscriptionToken);
}

#[derive(Default)]
pub struct FrameFeed {
    next_token: AtomicU64,
    listeners: RwLock<Vec<(SubscriptionToken, Arc<dyn RawFrameListener>)>>,
}

impl FrameFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands one driver buffer to every listener and returns how many saw it.
    ///
    /// The listener list is snapshotted first, so listeners may subscribe or
    /// unsubscribe from inside their callback.
    pub fn deliver(&self, frame: &RawFrameView<'_>) -> usize {
        let listeners: Vec<_> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        trace!("Delivering {:?} to {} listeners", frame, listeners.len());
        for listener in &listeners {
            listener.on_raw_frame(frame);
        }
        listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl UpstreamFeed for FrameFeed {
    fn subscribe(&self, listener: Arc<dyn RawFrameListener>) -> SubscriptionToken {
        let token = SubscriptionToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((token, listener));
        debug!("Feed subscription {:?} added", token);
        token
    }

    fn unsubscribe(&self, token: SubscriptionToken) {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(t, _)| *t != token);
        if listeners.len() != before {
            debug!("Feed subscription {:?} removed", token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl RawFrameListener for Counter {
        fn on_raw_frame(&self, frame: &RawFrameView<'_>) {
            self.0.fetch_add(frame.len(), Ordering::SeqCst);
        }
    }

    #[test]
    fn deliver_reaches_only_current_listeners() {
        let feed = FrameFeed::new();
        let counter = Arc::new(Counter::default());
        let bytes = [0u8; 8];

        assert_eq!(feed.deliver(&RawFrameView::new(&bytes, 4, 2)), 0);

        let token = feed.subscribe(counter.clone());
        assert_eq!(feed.deliver(&RawFrameView::new(&bytes, 4, 2)), 1);
        assert_eq!(counter.0.load(Ordering::SeqCst), 8);

        feed.unsubscribe(token);
        feed.unsubscribe(token);
        assert_eq!(feed.listener_count(), 0);
        assert_eq!(feed.deliver(&RawFrameView::new(&bytes, 4, 2)), 0);
        assert_eq!(counter.0.load(Ordering::SeqCst), 8);
    }
}
