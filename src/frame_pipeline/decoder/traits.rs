use crate::frame_pipeline::common::error::Result;
use crate::frame_pipeline::debayer::Image;
use crate::frame_pipeline::format::PixelFormatCode;
use crate::frame_pipeline::raw::RawFrameView;

/// A decoder bound to one pixel format and one frame geometry.
///
/// Instances may keep scratch buffers between frames, so each stream owns its
/// own decoder and replaces it when the geometry changes.
pub trait Decoder: Send {
    fn pixel_format(&self) -> PixelFormatCode;

    /// `(width, height)` this decoder was built for.
    fn geometry(&self) -> (u32, u32);

    /// Exact raw buffer length accepted by [`Decoder::decode`].
    fn expected_frame_len(&self) -> usize;

    /// Decodes one frame into a new image.
    ///
    /// Fails with `SizeMismatch` when the view length differs from
    /// [`Decoder::expected_frame_len`] and with `GeometryMismatch` when the
    /// view was captured at another geometry. The view is never read past its
    /// length.
    fn decode(&mut self, raw: &RawFrameView<'_>) -> Result<Image>;
}

/// Registration surface of a decoder plugin.
pub trait PixelFormatPlugin: Send + Sync {
    /// Stable reverse-DNS identifier, e.g. `rs.arvdecode.BayerBG10`.
    fn plugin_id(&self) -> &str;

    fn pixel_format(&self) -> PixelFormatCode;

    /// Builds a decoder for `width` x `height` frames.
    ///
    /// Fails with `InvalidGeometry` when either dimension is zero.
    fn make_decoder(&self, width: u32, height: u32) -> Result<Box<dyn Decoder>>;
}

/// Adapts a closure into a [`PixelFormatPlugin`] for run-time registration.
pub struct FnPlugin<F> {
    plugin_id: String,
    pixel_format: PixelFormatCode,
    factory: F,
}

impl<F> FnPlugin<F>
where
    F: Fn(u32, u32) -> Result<Box<dyn Decoder>> + Send + Sync,
{
    pub fn new(pixel_format: PixelFormatCode, plugin_id: impl Into<String>, factory: F) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            pixel_format,
            factory,
        }
    }
}

impl<F> PixelFormatPlugin for FnPlugin<F>
where
    F: Fn(u32, u32) -> Result<Box<dyn Decoder>> + Send + Sync,
{
    fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    fn pixel_format(&self) -> PixelFormatCode {
        self.pixel_format
    }

    fn make_decoder(&self, width: u32, height: u32) -> Result<Box<dyn Decoder>> {
        (self.factory)(width, height)
    }
}
