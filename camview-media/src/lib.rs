//! # camview Media
//!
//! Frame filtering, rendering and local recording for camview.
//! This crate handles the pixel side of the viewer: the convolution and color
//! filters, the per-tick render loop that paints the display surface, the
//! recorder that buffers the subscribed stream, and the playback port used to
//! scrub through recorded snapshots.

#![warn(clippy::all)]

pub mod error;
pub mod filter;
pub mod frame;
pub mod playback;
pub mod recorder;
pub mod render;
pub mod surface;

// Re-export main types
pub use error::{ErrorCategory, MediaError, MediaResult};
pub use filter::{convolve, sharpen, CanvasSettings, ColorAdjustment, Kernel};
pub use frame::{FrameSource, VideoFrame};
pub use playback::{scrub_position, BlobDecoder, PlaybackSource, SCRUB_FRAME_RATE};
pub use recorder::{Blob, LocalRecorder, RecorderState, RecordingSource};
pub use render::{ActiveSource, Compositor, RenderLoop, RenderStats, SharedCompositor};
pub use surface::DisplaySurface;
