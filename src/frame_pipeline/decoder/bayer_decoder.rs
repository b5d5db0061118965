//! Generic Bayer decoder
//!
//! One routine serves the whole Bayer family; a [`FormatDescriptor`] supplies
//! the sample layout and the filter arrangement. Output is always RGB with 16
//! bits per channel: sensor samples are shifted left by `16 - bits`, so a
//! 10-bit value of 512 becomes 32768 and 16-bit formats pass through unscaled.

use tracing::{debug, instrument};

use crate::frame_pipeline::common::error::{DecodeError, Result, validate_geometry};
use crate::frame_pipeline::common::timing::{DecodeTimings, Timer};
use crate::frame_pipeline::debayer::{
    DemosaicBackend, Image, LinearScratch, demosaic_bilinear, demosaic_linear, unpack_samples,
};
use crate::frame_pipeline::decoder::traits::{Decoder, PixelFormatPlugin};
use crate::frame_pipeline::format::{BAYER_FAMILY, FormatDescriptor, PixelFormatCode, descriptor_for};
use crate::frame_pipeline::raw::RawFrameView;

pub const OUTPUT_BITS_PER_SAMPLE: u32 = 16;

pub struct BayerDecoder {
    descriptor: FormatDescriptor,
    backend: DemosaicBackend,
    width: u32,
    height: u32,
    frame_len: usize,
    samples: Vec<u16>,
    linear_scratch: LinearScratch,
    timings: DecodeTimings,
}

impl BayerDecoder {
    pub fn new(
        descriptor: FormatDescriptor,
        backend: DemosaicBackend,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let pixels = validate_geometry(width, height)?;
        let frame_len = descriptor
            .layout
            .frame_len(pixels)
            .ok_or(DecodeError::InvalidGeometry { width, height })?;

        debug!(
            "Created {} decoder for {}x{} ({} bytes/frame, {:?})",
            descriptor.name, width, height, frame_len, backend
        );

        Ok(Self {
            descriptor,
            backend,
            width,
            height,
            frame_len,
            samples: vec![0; pixels],
            linear_scratch: LinearScratch::default(),
            timings: DecodeTimings::new(),
        })
    }

    pub fn descriptor(&self) -> &FormatDescriptor {
        &self.descriptor
    }

    /// Step timings of the most recent successful decode.
    pub fn last_timings(&self) -> &DecodeTimings {
        &self.timings
    }
}

impl Decoder for BayerDecoder {
    fn pixel_format(&self) -> PixelFormatCode {
        self.descriptor.code
    }

    fn geometry(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn expected_frame_len(&self) -> usize {
        self.frame_len
    }

    #[instrument(level = "debug", skip_all, fields(format = self.descriptor.name, len = raw.len()))]
    fn decode(&mut self, raw: &RawFrameView<'_>) -> Result<Image> {
        if raw.geometry() != (self.width, self.height) {
            return Err(DecodeError::GeometryMismatch {
                expected: (self.width, self.height),
                actual: raw.geometry(),
            });
        }
        if raw.len() != self.frame_len {
            return Err(DecodeError::SizeMismatch {
                format: self.descriptor.code,
                expected: self.frame_len,
                actual: raw.len(),
            });
        }

        self.timings.clear();
        let width = self.width as usize;
        let height = self.height as usize;

        let timer = Timer::start("unpack");
        unpack_samples(self.descriptor.layout, raw.bytes(), &mut self.samples);
        timer.record(&mut self.timings);

        let timer = Timer::start("demosaic");
        let mut data = vec![0u16; width * height * Image::CHANNELS];
        // The `bayer` crate needs at least a 2x2 frame; thinner frames take
        // the native path whatever the configured backend.
        let backend = if width < 2 || height < 2 {
            DemosaicBackend::Bilinear
        } else {
            self.backend
        };
        match backend {
            DemosaicBackend::Bilinear => demosaic_bilinear(
                &self.samples,
                width,
                height,
                self.descriptor.arrangement,
                &mut data,
            ),
            DemosaicBackend::Linear => demosaic_linear(
                &self.samples,
                width,
                height,
                self.descriptor.arrangement,
                &mut self.linear_scratch,
                &mut data,
            )?,
        }
        timer.record(&mut self.timings);
        self.timings.log_summary(self.descriptor.name);

        Ok(Image {
            width,
            height,
            data,
            bits_per_sample: OUTPUT_BITS_PER_SAMPLE,
        })
    }
}

/// Plugin exposing one Bayer format.
#[derive(Debug, Clone, Copy)]
pub struct BayerPlugin {
    descriptor: FormatDescriptor,
    backend: DemosaicBackend,
}

impl BayerPlugin {
    pub fn new(descriptor: FormatDescriptor, backend: DemosaicBackend) -> Self {
        Self {
            descriptor,
            backend,
        }
    }

    /// One plugin per member of the Bayer family.
    pub fn family(backend: DemosaicBackend) -> impl Iterator<Item = BayerPlugin> {
        BAYER_FAMILY.iter().map(move |d| BayerPlugin::new(*d, backend))
    }

    pub fn for_format(code: PixelFormatCode, backend: DemosaicBackend) -> Option<BayerPlugin> {
        descriptor_for(code).map(|d| BayerPlugin::new(*d, backend))
    }

    pub fn descriptor(&self) -> &FormatDescriptor {
        &self.descriptor
    }
}

impl PixelFormatPlugin for BayerPlugin {
    fn plugin_id(&self) -> &str {
        self.descriptor.plugin_id
    }

    fn pixel_format(&self) -> PixelFormatCode {
        self.descriptor.code
    }

    fn make_decoder(&self, width: u32, height: u32) -> Result<Box<dyn Decoder>> {
        Ok(Box::new(BayerDecoder::new(
            self.descriptor,
            self.backend,
            width,
            height,
        )?))
    }
}
