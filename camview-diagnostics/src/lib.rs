//! # camview Diagnostics
//!
//! Recording throughput measurement and logging setup for camview.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod debug_logger;
pub mod throughput;

// Re-export main types
pub use debug_logger::DebugLogger;
pub use throughput::{ThroughputMeter, ThroughputSample, DEFAULT_SAMPLE_INTERVAL};
