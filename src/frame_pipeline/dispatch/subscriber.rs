use std::sync::Arc;

use crate::frame_pipeline::common::error::DecodeError;
use crate::frame_pipeline::debayer::Image;
use crate::frame_pipeline::format::PixelFormatCode;
use crate::frame_pipeline::raw::{OwnedRawFrame, RawFrameView};

/// Payload handed to subscribers for each forwarded frame.
///
/// `raw` is only valid for the duration of the callback; copy it with
/// [`RawFrameView::to_owned_frame`] to keep it. `decoded` is shared and may be
/// kept freely.
#[derive(Debug)]
pub struct FrameNotification<'a> {
    pub sequence: u64,
    pub pixel_format: PixelFormatCode,
    pub raw: RawFrameView<'a>,
    pub decoded: Option<Arc<Image>>,
}

/// Consumer of forwarded frames.
///
/// Callbacks run on the dispatcher's decode worker, or on the driver's
/// delivery thread with inline delivery; they should return quickly.
pub trait FrameSubscriber: Send + Sync {
    fn on_frame(&self, frame: &FrameNotification<'_>);

    /// Whether this subscriber needs decoded images (see `DecodePolicy::OnDemand`).
    fn wants_decoded(&self) -> bool {
        true
    }

    fn on_decode_error(&self, _sequence: u64, _error: &DecodeError) {}

    /// Called on every forwarding transition, in order. Runs while the
    /// dispatcher's control lock is held, so it must not call back into
    /// `enable`, `disable` or `force_forwarding`.
    fn on_forwarding_changed(&self, _enabled: bool) {}
}

impl<F> FrameSubscriber for F
where
    F: Fn(&FrameNotification<'_>) + Send + Sync,
{
    fn on_frame(&self, frame: &FrameNotification<'_>) {
        self(frame)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub(crate) u64);

/// Most recent forwarded frame, kept when `retain_latest` is set.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub sequence: u64,
    pub pixel_format: PixelFormatCode,
    pub raw: Arc<OwnedRawFrame>,
    pub decoded: Option<Arc<Image>>,
}
