//! Raw frame module
//!
//! Borrowed views over driver capture buffers and their owned copies.

pub mod types;

pub use types::{BufferHandle, OwnedRawFrame, RawFrameView};
