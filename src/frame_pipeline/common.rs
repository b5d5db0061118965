//! Common utilities module
//!
//! Error type and step timing shared by the decoders and the dispatcher.

pub mod error;
pub mod timing;

pub use error::{DecodeError, Result, validate_geometry};
pub use timing::{DecodeTimings, StepTiming, Timer};
