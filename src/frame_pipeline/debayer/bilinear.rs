//! Bilinear demosaic on the colour filter array grid.
//!
//! Each output pixel keeps the channel its photosite measured. A missing
//! channel is the rounded mean of the same-channel photosites in the 3x3
//! neighbourhood, which on a Bayer grid gives the usual cross, diagonal or
//! two-neighbour average. Neighbours outside the frame are skipped, so border
//! pixels average whatever same-channel samples the frame holds. When no
//! same-channel neighbour exists at all (frames one pixel wide or tall) the
//! pixel's own sample is reused.

use crate::frame_pipeline::format::BayerArrangement;

/// Demosaics `samples` (one per photosite, row-major) into interleaved RGB.
///
/// `out` must hold `width * height * 3` values.
pub fn demosaic_bilinear(
    samples: &[u16],
    width: usize,
    height: usize,
    arrangement: BayerArrangement,
    out: &mut [u16],
) {
    debug_assert_eq!(samples.len(), width * height);
    debug_assert_eq!(out.len(), width * height * 3);

    let grid = arrangement.channel_grid();

    for (y, out_row) in out.chunks_exact_mut(width * 3).enumerate().take(height) {
        let rows = y.saturating_sub(1)..=(y + 1).min(height - 1);

        for (x, rgb) in out_row.chunks_exact_mut(3).enumerate() {
            let cols = x.saturating_sub(1)..=(x + 1).min(width - 1);
            let centre = samples[y * width + x];
            let here = grid[y & 1][x & 1] as usize;

            let mut sums = [0u32; 3];
            let mut counts = [0u32; 3];
            for ny in rows.clone() {
                let row = &samples[ny * width..(ny + 1) * width];
                for nx in cols.clone() {
                    if ny == y && nx == x {
                        continue;
                    }
                    let channel = grid[ny & 1][nx & 1] as usize;
                    sums[channel] += row[nx] as u32;
                    counts[channel] += 1;
                }
            }

            for (channel, value) in rgb.iter_mut().enumerate() {
                *value = if channel == here || counts[channel] == 0 {
                    centre
                } else {
                    ((sums[channel] + counts[channel] / 2) / counts[channel]) as u16
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_pipeline::format::Channel;

    fn mosaic(width: usize, height: usize, arrangement: BayerArrangement, f: impl Fn(usize, usize, Channel) -> u16) -> Vec<u16> {
        let mut samples = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                samples.push(f(x, y, arrangement.channel_at(y, x)));
            }
        }
        samples
    }

    #[test]
    fn flat_colour_is_reconstructed_exactly() {
        let colour = [40_000u16, 20_000, 9_000];
        for arrangement in [
            BayerArrangement::Gr,
            BayerArrangement::Rg,
            BayerArrangement::Gb,
            BayerArrangement::Bg,
        ] {
            let (w, h) = (6, 5);
            let samples = mosaic(w, h, arrangement, |_, _, c| colour[c as usize]);
            let mut out = vec![0u16; w * h * 3];
            demosaic_bilinear(&samples, w, h, arrangement, &mut out);
            for rgb in out.chunks_exact(3) {
                assert_eq!(rgb, colour, "{:?}", arrangement);
            }
        }
    }

    #[test]
    fn measured_channel_passes_through() {
        let (w, h) = (8, 8);
        let arrangement = BayerArrangement::Rg;
        let samples = mosaic(w, h, arrangement, |x, y, _| ((x * 131 + y * 977) % 4096) as u16);
        let mut out = vec![0u16; w * h * 3];
        demosaic_bilinear(&samples, w, h, arrangement, &mut out);

        for y in 0..h {
            for x in 0..w {
                let channel = arrangement.channel_at(y, x) as usize;
                assert_eq!(out[(y * w + x) * 3 + channel], samples[y * w + x]);
            }
        }
    }

    #[test]
    fn green_at_red_site_averages_the_cross() {
        // RG tile: (1,1) is blue, (2,2) is red. Greens around (2,2) differ.
        let (w, h) = (5, 5);
        let arrangement = BayerArrangement::Rg;
        let samples = mosaic(w, h, arrangement, |x, y, c| match (c, x, y) {
            (Channel::Green, 2, 1) => 100,
            (Channel::Green, 1, 2) => 200,
            (Channel::Green, 3, 2) => 300,
            (Channel::Green, 2, 3) => 400,
            _ => 0,
        });
        let mut out = vec![0u16; w * h * 3];
        demosaic_bilinear(&samples, w, h, arrangement, &mut out);
        assert_eq!(out[(2 * w + 2) * 3 + Channel::Green as usize], 250);
    }

    #[test]
    fn interior_of_a_horizontal_ramp_stays_on_the_ramp() {
        let (w, h) = (16, 6);
        let arrangement = BayerArrangement::Bg;
        let samples = mosaic(w, h, arrangement, |x, _, _| (x as u16) * 1000);
        let mut out = vec![0u16; w * h * 3];
        demosaic_bilinear(&samples, w, h, arrangement, &mut out);

        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let truth = (x as i32) * 1000;
                for channel in 0..3 {
                    let got = out[(y * w + x) * 3 + channel] as i32;
                    assert!((got - truth).abs() <= 1, "({x},{y}) ch{channel}: {got} vs {truth}");
                }
            }
        }
    }

    #[test]
    fn single_column_reuses_own_sample_for_absent_channel() {
        // BG column: rows alternate blue / green, red never occurs.
        let samples = vec![10, 20, 30, 40];
        let mut out = vec![0u16; 4 * 3];
        demosaic_bilinear(&samples, 1, 4, BayerArrangement::Bg, &mut out);
        assert_eq!(&out[0..3], &[10, 20, 10]);
        assert_eq!(&out[3..6], &[20, 20, 20]);
    }
}
