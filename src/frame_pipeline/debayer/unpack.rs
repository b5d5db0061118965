//! Sample unpacking
//!
//! Turns a driver buffer into one `u16` per photosite, masked to the format's
//! significant bits and shifted so the sensor range sits at the top of 16 bits.
//! Callers check the buffer length first; these loops only ever zip over what
//! both slices hold.

use crate::frame_pipeline::format::SampleLayout;

pub fn unpack_samples(layout: SampleLayout, bytes: &[u8], out: &mut [u16]) {
    let shift = layout.scale_shift();
    match layout {
        SampleLayout::Byte8 => {
            for (dst, &b) in out.iter_mut().zip(bytes) {
                *dst = (b as u16) << shift;
            }
        }
        SampleLayout::Word16 { significant_bits } => {
            let mask = ((1u32 << significant_bits) - 1) as u16;
            for (dst, word) in out.iter_mut().zip(bytes.chunks_exact(2)) {
                *dst = (u16::from_le_bytes([word[0], word[1]]) & mask) << shift;
            }
        }
        SampleLayout::Packed12 => unpack_packed12(bytes, out, shift),
    }
}

fn unpack_packed12(bytes: &[u8], out: &mut [u16], shift: u32) {
    let mut groups = bytes.chunks_exact(3);
    let mut samples = out.chunks_exact_mut(2);

    for (dst, group) in samples.by_ref().zip(groups.by_ref()) {
        let (b0, b1, b2) = (group[0] as u16, group[1] as u16, group[2] as u16);
        dst[0] = ((b0 << 4) | (b1 & 0x0F)) << shift;
        dst[1] = ((b2 << 4) | (b1 >> 4)) << shift;
    }

    // Odd sample count: the last sample takes two bytes.
    if let ([last], [b0, b1, ..]) = (samples.into_remainder(), groups.remainder()) {
        *last = (((*b0 as u16) << 4) | (*b1 as u16 & 0x0F)) << shift;
    }
}

/// Inverse of [`unpack_samples`] for unscaled sensor values.
///
/// Used to build synthetic frames; values above the layout's range are masked.
pub fn pack_samples(layout: SampleLayout, samples: &[u16]) -> Vec<u8> {
    match layout {
        SampleLayout::Byte8 => samples.iter().map(|&s| s as u8).collect(),
        SampleLayout::Word16 { significant_bits } => {
            let mask = ((1u32 << significant_bits) - 1) as u16;
            samples.iter().flat_map(|&s| (s & mask).to_le_bytes()).collect()
        }
        SampleLayout::Packed12 => {
            let mut bytes = Vec::with_capacity(samples.len() * 3 / 2 + 1);
            for pair in samples.chunks(2) {
                let p0 = pair[0] & 0x0FFF;
                match pair.get(1) {
                    Some(&p1) => {
                        let p1 = p1 & 0x0FFF;
                        bytes.push((p0 >> 4) as u8);
                        bytes.push(((p1 & 0x0F) << 4 | (p0 & 0x0F)) as u8);
                        bytes.push((p1 >> 4) as u8);
                    }
                    None => {
                        bytes.push((p0 >> 4) as u8);
                        bytes.push((p0 & 0x0F) as u8);
                    }
                }
            }
            bytes
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word16_masks_unused_high_bits() {
        let layout = SampleLayout::Word16 { significant_bits: 10 };
        // 0xFE00 | 0x0200: the high garbage bits must not leak into the sample.
        let bytes = [0x00, 0xFE, 0xFF, 0x03];
        let mut out = [0u16; 2];
        unpack_samples(layout, &bytes, &mut out);
        assert_eq!(out, [0x0200 << 6, 0x03FF << 6]);
    }

    #[test]
    fn word16_full_depth_is_not_shifted() {
        let layout = SampleLayout::Word16 { significant_bits: 16 };
        let mut out = [0u16; 1];
        unpack_samples(layout, &[0x34, 0x12], &mut out);
        assert_eq!(out, [0x1234]);
    }

    #[test]
    fn byte8_scales_to_top_of_range() {
        let mut out = [0u16; 2];
        unpack_samples(SampleLayout::Byte8, &[0x80, 0xFF], &mut out);
        assert_eq!(out, [0x8000, 0xFF00]);
    }

    #[test]
    fn packed12_reassembles_nibbles() {
        // p0 = 0xABC, p1 = 0x123
        let bytes = [0xAB, 0x3C, 0x12];
        let mut out = [0u16; 2];
        unpack_samples(SampleLayout::Packed12, &bytes, &mut out);
        assert_eq!(out, [0xABC << 4, 0x123 << 4]);
    }

    #[test]
    fn packed12_odd_tail() {
        let samples = [0x0FFF, 0x0001, 0x0ABC];
        let bytes = pack_samples(SampleLayout::Packed12, &samples);
        assert_eq!(bytes.len(), 5);

        let mut out = [0u16; 3];
        unpack_samples(SampleLayout::Packed12, &bytes, &mut out);
        assert_eq!(out, [0xFFF0, 0x0010, 0xABC0]);
    }

    #[test]
    fn packing_matches_layout_frame_len() {
        let samples: Vec<u16> = (0..15).collect();
        for layout in [
            SampleLayout::Byte8,
            SampleLayout::Word16 { significant_bits: 12 },
            SampleLayout::Packed12,
        ] {
            assert_eq!(
                Some(pack_samples(layout, &samples).len()),
                layout.frame_len(samples.len())
            );
        }
    }
}
