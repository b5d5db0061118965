use thiserror::Error;

use crate::frame_pipeline::format::PixelFormatCode;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("No decoder registered for pixel format {0}")]
    UnsupportedFormat(PixelFormatCode),

    #[error("Raw buffer size mismatch for {format}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        format: PixelFormatCode,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid frame geometry: width={width}, height={height}")]
    InvalidGeometry { width: u32, height: u32 },

    #[error("Decoder bound to {}x{} cannot decode a {}x{} frame", expected.0, expected.1, actual.0, actual.1)]
    GeometryMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Pixel format {format} is already handled by {plugin_id}")]
    AlreadyRegistered {
        format: PixelFormatCode,
        plugin_id: String,
    },

    #[error("Demosaic failed: {0}")]
    Demosaic(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Checks decoder factory geometry and returns the pixel count.
///
/// Zero in either dimension is rejected, as is any geometry whose RGB16 output
/// size does not fit in `usize`.
pub fn validate_geometry(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidGeometry { width, height });
    }

    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(6).map(|_| pixels))
        .ok_or(DecodeError::InvalidGeometry { width, height })
}
