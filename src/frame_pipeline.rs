//! Raw frame decoding pipeline
//!
//! This module turns raw Bayer-mosaic camera buffers into RGB images, with
//! separate modules for pixel format metadata, raw frame views, demosaicing,
//! the decoder registry and hand-off of frames to subscribers.

pub mod common;
pub mod format;
pub mod raw;
pub mod debayer;
pub mod decoder;
pub mod registry;
pub mod dispatch;
pub mod synthetic;

pub use common::{
    DecodeError,
    Result,
};

pub use format::{
    BayerArrangement,
    FormatDescriptor,
    PixelFormatCode,
    SampleLayout,
};

pub use raw::{
    BufferHandle,
    OwnedRawFrame,
    RawFrameView,
};

pub use debayer::{
    DemosaicBackend,
    Image,
};

pub use decoder::{
    BayerDecoder,
    BayerPlugin,
    Decoder,
    PixelFormatPlugin,
};

pub use registry::DecoderRegistry;

pub use dispatch::{
    DispatcherConfig,
    DispatcherConfigBuilder,
    DispatcherMode,
    FrameDispatcher,
    FrameFeed,
    FrameNotification,
    FrameSubscriber,
    UpstreamFeed,
};
