//! Frame hand-off from the driver to subscribers
//!
//! Raw frames arrive from an [`UpstreamFeed`] on the driver's thread. The
//! [`FrameDispatcher`] either copies them into a single-entry slot drained by
//! a decode worker (the driver never waits on consumers, older undelivered
//! frames are replaced) or decodes and notifies inline.

mod dispatcher;
mod feed;
mod latest_slot;
mod stream_decoder;
mod subscriber;
mod types;
mod worker;


pub use dispatcher::FrameDispatcher;
pub use feed::{FrameFeed, RawFrameListener, SubscriptionToken, UpstreamFeed};
pub use latest_slot::LatestSlot;
pub use stream_decoder::StreamDecoder;
pub use subscriber::{FrameNotification, FrameSnapshot, FrameSubscriber, SubscriberId};
pub use types::{
    DecodePolicy, Delivery, DispatchStats, DispatcherConfig, DispatcherConfigBuilder,
    DispatcherMode,
};
pub use worker::DecodeWorker;
