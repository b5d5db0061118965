//! Pixel format codes and the descriptors of the formats the crate decodes

mod descriptor;
mod pixel_format;

pub use descriptor::{
    BAYER_FAMILY, BayerArrangement, Channel, FormatDescriptor, SampleLayout, descriptor_by_name,
    descriptor_for,
};
pub use pixel_format::PixelFormatCode;
