//! Debayering module for turning unpacked Bayer samples into RGB

pub mod bayer_linear;
pub mod bilinear;
pub mod types;
pub mod unpack;

pub use bayer_linear::{LinearScratch, demosaic_linear};
pub use bilinear::demosaic_bilinear;
pub use types::{DemosaicBackend, Image};
pub use unpack::{pack_samples, unpack_samples};
