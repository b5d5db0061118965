//! Frame dispatcher
//!
//! Subscribes to an upstream raw-frame feed while forwarding is enabled,
//! decodes frames through the registry when someone needs images, and fans
//! raw and decoded frames out to subscribers.
//!
//! Forwarding is a two-state machine. `enable` and `disable` are serialized on
//! a control mutex and are idempotent: the upstream subscription exists exactly
//! while the state is Enabled. The per-frame path reads a single atomic flag at
//! entry, so every frame is handled wholly in one state. Forwarding-changed
//! callbacks run under the control mutex, so subscribers see transitions in
//! order.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, instrument, trace, warn};

use crate::frame_pipeline::common::error::Result;
use crate::frame_pipeline::common::timing::Timer;
use crate::frame_pipeline::debayer::Image;
use crate::frame_pipeline::dispatch::feed::{RawFrameListener, SubscriptionToken, UpstreamFeed};
use crate::frame_pipeline::dispatch::latest_slot::LatestSlot;
use crate::frame_pipeline::dispatch::stream_decoder::StreamDecoder;
use crate::frame_pipeline::dispatch::subscriber::{
    FrameNotification, FrameSnapshot, FrameSubscriber, SubscriberId,
};
use crate::frame_pipeline::dispatch::types::{
    DecodePolicy, Delivery, DispatchStats, DispatcherConfig, DispatcherMode,
};
use crate::frame_pipeline::dispatch::worker::DecodeWorker;
use crate::frame_pipeline::format::PixelFormatCode;
use crate::frame_pipeline::raw::{OwnedRawFrame, RawFrameView};
use crate::frame_pipeline::registry::DecoderRegistry;

struct PendingFrame {
    sequence: u64,
    pixel_format: PixelFormatCode,
    frame: Arc<OwnedRawFrame>,
}

#[derive(Default)]
struct Counters {
    delivered: AtomicU64,
    dropped: AtomicU64,
    decoded: AtomicU64,
    decode_failures: AtomicU64,
    decode_nanos: AtomicU64,
}

struct DispatcherInner {
    config: DispatcherConfig,
    forwarding: AtomicBool,
    pixel_format: AtomicU32,
    sequence: AtomicU64,
    next_subscriber: AtomicU64,
    subscribers: RwLock<Vec<(SubscriberId, Arc<dyn FrameSubscriber>)>>,
    decoder: Mutex<StreamDecoder>,
    slot: Option<Arc<LatestSlot<PendingFrame>>>,
    latest: Mutex<Option<FrameSnapshot>>,
    counters: Counters,
}

impl DispatcherInner {
    fn pixel_format(&self) -> PixelFormatCode {
        PixelFormatCode(self.pixel_format.load(Ordering::Acquire))
    }

    fn subscribers(&self) -> Vec<Arc<dyn FrameSubscriber>> {
        self.subscribers
            .read()
            .iter()
            .map(|(_, s)| Arc::clone(s))
            .collect()
    }

    fn process_pending(&self, pending: PendingFrame) {
        if !self.forwarding.load(Ordering::Acquire) {
            trace!(sequence = pending.sequence, "Forwarding disabled, pending frame dropped");
            return;
        }
        let view = pending.frame.view();
        self.process(pending.sequence, pending.pixel_format, &view, Some(&pending.frame));
    }

    fn process(
        &self,
        sequence: u64,
        pixel_format: PixelFormatCode,
        raw: &RawFrameView<'_>,
        owned: Option<&Arc<OwnedRawFrame>>,
    ) {
        let subscribers = self.subscribers();
        let wants_decoded = match self.config.decode_policy {
            DecodePolicy::Always => true,
            DecodePolicy::Never => false,
            DecodePolicy::OnDemand => subscribers.iter().any(|s| s.wants_decoded()),
        };

        let decoded = if wants_decoded {
            self.decode(sequence, pixel_format, raw, &subscribers)
        } else {
            None
        };

        if self.config.retain_latest {
            let raw_copy = match owned {
                Some(frame) => Arc::clone(frame),
                None => Arc::new(raw.to_owned_frame()),
            };
            *self.latest.lock() = Some(FrameSnapshot {
                sequence,
                pixel_format,
                raw: raw_copy,
                decoded: decoded.clone(),
            });
        }

        let notification = FrameNotification {
            sequence,
            pixel_format,
            raw: *raw,
            decoded,
        };
        for subscriber in &subscribers {
            subscriber.on_frame(&notification);
        }
    }

    fn decode(
        &self,
        sequence: u64,
        pixel_format: PixelFormatCode,
        raw: &RawFrameView<'_>,
        subscribers: &[Arc<dyn FrameSubscriber>],
    ) -> Option<Arc<Image>> {
        let timer = Timer::start("decode");
        let result = self.decoder.lock().decode(pixel_format, raw);
        let (_, elapsed) = timer.stop();

        match result {
            Ok(image) => {
                self.counters.decoded.fetch_add(1, Ordering::Relaxed);
                self.counters
                    .decode_nanos
                    .fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
                trace!(sequence, "Decoded frame in {:.3}ms", elapsed.as_secs_f64() * 1000.0);
                Some(Arc::new(image))
            }
            Err(e) => {
                self.counters.decode_failures.fetch_add(1, Ordering::Relaxed);
                warn!(sequence, format = %pixel_format, "Decode failed, forwarding raw frame only: {}", e);
                for subscriber in subscribers {
                    subscriber.on_decode_error(sequence, &e);
                }
                None
            }
        }
    }

    fn notify_forwarding(&self, enabled: bool) {
        for subscriber in self.subscribers() {
            subscriber.on_forwarding_changed(enabled);
        }
    }
}

impl RawFrameListener for DispatcherInner {
    fn on_raw_frame(&self, frame: &RawFrameView<'_>) {
        if !self.forwarding.load(Ordering::Acquire) {
            trace!("Forwarding disabled, frame ignored");
            return;
        }

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let pixel_format = self.pixel_format();
        self.counters.delivered.fetch_add(1, Ordering::Relaxed);

        match &self.slot {
            Some(slot) => {
                let pending = PendingFrame {
                    sequence,
                    pixel_format,
                    frame: Arc::new(frame.to_owned_frame()),
                };
                if slot.put(pending) {
                    self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                    trace!(sequence, "Replaced an undelivered frame");
                }
            }
            None => self.process(sequence, pixel_format, frame, None),
        }
    }
}

#[derive(Default)]
struct ControlState {
    subscription: Option<SubscriptionToken>,
    forced: bool,
}

pub struct FrameDispatcher {
    inner: Arc<DispatcherInner>,
    feed: Arc<dyn UpstreamFeed>,
    control: Mutex<ControlState>,
    worker: Option<DecodeWorker>,
}

impl FrameDispatcher {
    /// Creates a dispatcher in the Disabled state.
    ///
    /// With `Delivery::Worker` this spawns the decode worker thread.
    #[instrument(skip(feed, registry, config), fields(mode = ?config.mode, delivery = ?config.delivery))]
    pub fn new(
        feed: Arc<dyn UpstreamFeed>,
        registry: Arc<DecoderRegistry>,
        pixel_format: PixelFormatCode,
        config: DispatcherConfig,
    ) -> Result<Self> {
        let slot = match config.delivery {
            Delivery::Worker => Some(Arc::new(LatestSlot::new())),
            Delivery::Inline => None,
        };

        let inner = Arc::new(DispatcherInner {
            config,
            forwarding: AtomicBool::new(false),
            pixel_format: AtomicU32::new(pixel_format.value()),
            sequence: AtomicU64::new(0),
            next_subscriber: AtomicU64::new(0),
            subscribers: RwLock::new(Vec::new()),
            decoder: Mutex::new(StreamDecoder::new(registry)),
            slot,
            latest: Mutex::new(None),
            counters: Counters::default(),
        });

        let worker = match &inner.slot {
            Some(slot) => {
                let worker_inner = Arc::clone(&inner);
                Some(DecodeWorker::start(
                    &inner.config.worker_name,
                    Arc::clone(slot),
                    move |pending| worker_inner.process_pending(pending),
                )?)
            }
            None => None,
        };

        info!("Frame dispatcher created for {}", pixel_format);

        Ok(Self {
            inner,
            feed,
            control: Mutex::new(ControlState::default()),
            worker,
        })
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.inner.config
    }

    pub fn pixel_format(&self) -> PixelFormatCode {
        self.inner.pixel_format()
    }

    /// Switches the stream's format; applies from the next delivered frame.
    pub fn set_pixel_format(&self, pixel_format: PixelFormatCode) {
        let previous = self.inner.pixel_format.swap(pixel_format.value(), Ordering::AcqRel);
        if previous != pixel_format.value() {
            info!("Stream pixel format changed {} -> {}", PixelFormatCode(previous), pixel_format);
        }
    }

    pub fn add_subscriber(&self, subscriber: Arc<dyn FrameSubscriber>) -> SubscriberId {
        let id = SubscriberId(self.inner.next_subscriber.fetch_add(1, Ordering::Relaxed));
        self.inner.subscribers.write().push((id, subscriber));
        debug!("Subscriber {:?} added", id);
        id
    }

    pub fn remove_subscriber(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.inner.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        let removed = subscribers.len() != before;
        if removed {
            debug!("Subscriber {:?} removed", id);
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.read().len()
    }

    fn enable_locked(&self, control: &mut ControlState) -> bool {
        if control.subscription.is_some() {
            return false;
        }
        let listener: Arc<dyn RawFrameListener> = self.inner.clone();
        control.subscription = Some(self.feed.subscribe(listener));
        self.inner.forwarding.store(true, Ordering::Release);
        true
    }

    /// Subscribes to the upstream feed; a no-op when already enabled.
    pub fn enable(&self) {
        let mut control = self.control.lock();
        if self.enable_locked(&mut control) {
            info!("Frame forwarding enabled");
            self.inner.notify_forwarding(true);
        } else {
            trace!("Frame forwarding already enabled");
        }
    }

    /// Unsubscribes from the upstream feed; a no-op when already disabled or
    /// when forwarding has been forced. A frame still waiting for the worker
    /// is dropped.
    pub fn disable(&self) {
        let mut control = self.control.lock();
        if control.forced {
            debug!("Frame forwarding is forced on, disable ignored");
            return;
        }
        let Some(token) = control.subscription.take() else {
            trace!("Frame forwarding already disabled");
            return;
        };
        self.inner.forwarding.store(false, Ordering::Release);
        self.feed.unsubscribe(token);
        if let Some(slot) = &self.inner.slot {
            slot.clear();
        }
        info!("Frame forwarding disabled");
        self.inner.notify_forwarding(false);
    }

    pub fn set_forwarding(&self, enabled: bool) {
        if enabled {
            self.enable();
        } else {
            self.disable();
        }
    }

    /// Enables forwarding for good.
    ///
    /// Only honoured in `DispatcherMode::Embedded`; returns whether it was.
    pub fn force_forwarding(&self) -> bool {
        if self.inner.config.mode != DispatcherMode::Embedded {
            warn!("Forced forwarding refused in standalone mode");
            return false;
        }

        let mut control = self.control.lock();
        let changed = self.enable_locked(&mut control);
        control.forced = true;
        info!("Frame forwarding forced on");
        if changed {
            self.inner.notify_forwarding(true);
        }
        true
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.forwarding.load(Ordering::Acquire)
    }

    pub fn is_forced(&self) -> bool {
        self.control.lock().forced
    }

    /// The most recent forwarded frame, when `retain_latest` is set.
    pub fn latest_frame(&self) -> Option<FrameSnapshot> {
        self.inner.latest.lock().clone()
    }

    pub fn stats(&self) -> DispatchStats {
        let counters = &self.inner.counters;
        DispatchStats {
            delivered: counters.delivered.load(Ordering::Relaxed),
            dropped: counters.dropped.load(Ordering::Relaxed),
            decoded: counters.decoded.load(Ordering::Relaxed),
            decode_failures: counters.decode_failures.load(Ordering::Relaxed),
            decode_time: Duration::from_nanos(counters.decode_nanos.load(Ordering::Relaxed)),
        }
    }
}

impl Drop for FrameDispatcher {
    fn drop(&mut self) {
        self.inner.forwarding.store(false, Ordering::Release);
        if let Some(token) = self.control.get_mut().subscription.take() {
            self.feed.unsubscribe(token);
        }
        if let Some(slot) = &self.inner.slot {
            slot.close();
        }
        if let Some(worker) = &mut self.worker {
            worker.join();
        }
        debug!("Frame dispatcher shut down");
    }
}
