use std::io::Cursor;

use bayer::{BayerDepth, CFA, Demosaic, RasterDepth, RasterMut};
use tracing::trace;

use crate::frame_pipeline::common::error::{DecodeError, Result};
use crate::frame_pipeline::format::BayerArrangement;

fn cfa_for(arrangement: BayerArrangement) -> CFA {
    match arrangement {
        BayerArrangement::Gr => CFA::GRBG,
        BayerArrangement::Rg => CFA::RGGB,
        BayerArrangement::Gb => CFA::GBRG,
        BayerArrangement::Bg => CFA::BGGR,
    }
}

/// Demosaics 16-bit samples with the `bayer` crate's linear algorithm.
///
/// `scratch` is reused between frames for the little-endian input bytes and the
/// 16-bit output raster.
pub fn demosaic_linear(
    samples: &[u16],
    width: usize,
    height: usize,
    arrangement: BayerArrangement,
    scratch: &mut LinearScratch,
    out: &mut [u16],
) -> Result<()> {
    scratch.input.clear();
    scratch
        .input
        .extend(samples.iter().flat_map(|&val| val.to_le_bytes()));

    let output_len = width * height * 3 * 2;
    scratch.output.clear();
    scratch.output.resize(output_len, 0);

    trace!(
        "bayer linear demosaic: cfa={:?}, input={} bytes, output={} bytes",
        arrangement.tag(),
        scratch.input.len(),
        output_len
    );

    let mut cursor = Cursor::new(&scratch.input[..]);
    let mut raster = RasterMut::new(width, height, RasterDepth::Depth16, &mut scratch.output);

    bayer::run_demosaic(
        &mut cursor,
        BayerDepth::Depth16LE,
        cfa_for(arrangement),
        Demosaic::Linear,
        &mut raster,
    )
    .map_err(|e| DecodeError::Demosaic(format!("{:?}", e)))?;

    for (dst, pair) in out.iter_mut().zip(scratch.output.chunks_exact(2)) {
        *dst = u16::from_le_bytes([pair[0], pair[1]]);
    }

    Ok(())
}

/// Reusable buffers for [`demosaic_linear`].
#[derive(Debug, Default)]
pub struct LinearScratch {
    input: Vec<u8>,
    output: Vec<u8>,
}
