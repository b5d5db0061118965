//! Types for debayering operations

/// Interpolation backend used by the Bayer decoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DemosaicBackend {
    /// Built-in bilinear interpolation with edge-clamped neighbourhoods.
    #[default]
    Bilinear,
    /// `bayer` crate linear demosaic (mirrored borders).
    Linear,
}

/// Decoded RGB image owned by whoever requested the decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// RGB pixel data interleaved [R, G, B, R, G, B, ...]
    pub data: Vec<u16>,
    /// Significant bits per channel value
    pub bits_per_sample: u32,
}

impl Image {
    pub const CHANNELS: usize = 3;

    pub fn channels(&self) -> usize {
        Self::CHANNELS
    }

    /// RGB triple at `(x, y)`, `None` outside the image.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u16; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let base = (y * self.width + x) * Self::CHANNELS;
        Some([self.data[base], self.data[base + 1], self.data[base + 2]])
    }

    pub fn pixels(&self) -> impl Iterator<Item = [u16; 3]> + '_ {
        self.data.chunks_exact(Self::CHANNELS).map(|p| [p[0], p[1], p[2]])
    }

    /// Normalizes down to 8 bits per channel for display.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let shift = self.bits_per_sample.saturating_sub(8);
        self.data.iter().map(|&v| (v >> shift) as u8).collect()
    }
}
