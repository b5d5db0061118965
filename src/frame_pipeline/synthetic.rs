//! Synthetic raw frames
//!
//! Encodes known test patterns in any Bayer layout, for tests, benches and the
//! demo binary.

use crate::frame_pipeline::debayer::pack_samples;
use crate::frame_pipeline::format::{Channel, FormatDescriptor};

/// Encodes a frame whose photosites take their value from `sample(x, y, channel)`.
///
/// Values are sensor-native, i.e. in `0..=descriptor.max_sample()`.
pub fn encode_pattern(
    descriptor: &FormatDescriptor,
    width: u32,
    height: u32,
    sample: impl Fn(usize, usize, Channel) -> u16,
) -> Vec<u8> {
    let (width, height) = (width as usize, height as usize);
    let mut samples = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            samples.push(sample(x, y, descriptor.arrangement.channel_at(y, x)));
        }
    }
    pack_samples(descriptor.layout, &samples)
}

/// A flat colour field: each photosite records its channel's value of `rgb`.
pub fn flat_field(descriptor: &FormatDescriptor, width: u32, height: u32, rgb: [u16; 3]) -> Vec<u8> {
    encode_pattern(descriptor, width, height, |_, _, channel| rgb[channel as usize])
}

/// Uniform mid-grey at half the sensor range.
pub fn mid_grey(descriptor: &FormatDescriptor, width: u32, height: u32) -> Vec<u8> {
    let grey = 1u16 << (descriptor.bits_per_sample() - 1);
    flat_field(descriptor, width, height, [grey; 3])
}

/// A diagonal ramp that moves with `phase`, handy for animated demo frames.
pub fn moving_ramp(descriptor: &FormatDescriptor, width: u32, height: u32, phase: usize) -> Vec<u8> {
    let max = descriptor.max_sample() as usize;
    let span = (width as usize + height as usize).max(1);
    encode_pattern(descriptor, width, height, |x, y, channel| {
        let t = (x + y + phase) % span;
        let base = t * max / span;
        match channel {
            Channel::Red => base as u16,
            Channel::Green => (max - base) as u16,
            Channel::Blue => (max / 2) as u16,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_pipeline::format::{BAYER_FAMILY, PixelFormatCode, descriptor_for};

    #[test]
    fn encoded_length_matches_every_layout() {
        for descriptor in BAYER_FAMILY {
            let bytes = mid_grey(descriptor, 6, 4);
            assert_eq!(Some(bytes.len()), descriptor.layout.frame_len(24), "{}", descriptor.name);
        }
    }

    #[test]
    fn bg10_mid_grey_is_512_per_word() {
        let descriptor = descriptor_for(PixelFormatCode::BAYER_BG_10).unwrap();
        let bytes = mid_grey(descriptor, 4, 4);
        assert_eq!(bytes.len(), 32);
        for word in bytes.chunks_exact(2) {
            assert_eq!(u16::from_le_bytes([word[0], word[1]]), 512);
        }
    }
}
