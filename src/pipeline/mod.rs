//! Sample routing between storage and the network sink.
//!
//! Every sample is stored; only a decimated subset is forwarded to the
//! collector. The decision is made per channel by [`DecimationRouter`].
//!
//! # Flow
//!
//! ```text
//! [sensor thread] ──► SampleBuffer::append_with ──► DecimationRouter::should_forward
//!                                                      │
//!                                      (lock released) └──► EventSink::send
//! ```

pub mod decimator;

pub use decimator::{DecimationRouter, DEFAULT_FORWARD_INTERVAL};
