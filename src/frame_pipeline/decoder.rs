//! Decoder contract and the Bayer decoder family

mod bayer_decoder;
mod traits;


pub use bayer_decoder::{BayerDecoder, BayerPlugin, OUTPUT_BITS_PER_SAMPLE};
pub use traits::{Decoder, FnPlugin, PixelFormatPlugin};
