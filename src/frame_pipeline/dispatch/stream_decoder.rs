use std::sync::Arc;

use tracing::debug;

use crate::frame_pipeline::common::error::Result;
use crate::frame_pipeline::debayer::Image;
use crate::frame_pipeline::decoder::Decoder;
use crate::frame_pipeline::format::PixelFormatCode;
use crate::frame_pipeline::raw::RawFrameView;
use crate::frame_pipeline::registry::DecoderRegistry;

/// Per-stream decoder cache.
///
/// Keeps the decoder for the current `(format, width, height)` and asks the
/// registry for a new one when any of them changes. Errors go straight back to
/// the caller; a failed lookup leaves no decoder cached.
pub struct StreamDecoder {
    registry: Arc<DecoderRegistry>,
    active: Option<Box<dyn Decoder>>,
}

impl StreamDecoder {
    pub fn new(registry: Arc<DecoderRegistry>) -> Self {
        Self {
            registry,
            active: None,
        }
    }

    pub fn decode(&mut self, format: PixelFormatCode, raw: &RawFrameView<'_>) -> Result<Image> {
        let decoder = match self.active.take() {
            Some(decoder)
                if decoder.pixel_format() == format && decoder.geometry() == raw.geometry() =>
            {
                self.active.insert(decoder)
            }
            _ => {
                debug!(
                    "Resolving decoder for {} at {}x{}",
                    format,
                    raw.width(),
                    raw.height()
                );
                let decoder = self.registry.lookup(format, raw.width(), raw.height())?;
                self.active.insert(decoder)
            }
        };
        decoder.decode(raw)
    }

    /// The cached decoder's key, if any.
    pub fn active_key(&self) -> Option<(PixelFormatCode, (u32, u32))> {
        self.active.as_ref().map(|d| (d.pixel_format(), d.geometry()))
    }

    pub fn reset(&mut self) {
        self.active = None;
    }
}
