//! Random-access playback of recorded blobs
//!
//! Decoding the recorded container is left to the host; it provides a
//! [`BlobDecoder`] that turns a snapshot [`Blob`] into a seekable
//! [`PlaybackSource`].

use crate::error::MediaResult;
use crate::frame::FrameSource;
use crate::recorder::Blob;
use std::sync::Arc;
use std::time::Duration;

/// Frame rate assumed when converting scrub steps into time
pub const SCRUB_FRAME_RATE: f64 = 30.0;

/// A decoded recording that can be positioned freely
pub trait PlaybackSource: FrameSource {
    /// Length of the recording
    fn duration(&self) -> Duration;

    /// Current playback position
    fn position(&self) -> Duration;

    /// Move to `position`; implementations clamp to `[0, duration]`
    fn seek(&self, position: Duration);
}

/// Opens snapshot blobs for playback
pub trait BlobDecoder: Send + Sync {
    /// Decode `blob` into a playback source positioned at its start
    fn open(&self, blob: Blob) -> MediaResult<Arc<dyn PlaybackSource>>;
}

/// Position reached by stepping `delta_frames` frames from `current`.
///
/// One frame is `1 / frame_rate` seconds. The result never goes below zero and
/// never past `duration`.
pub fn scrub_position(
    current: Duration,
    delta_frames: i32,
    frame_rate: f64,
    duration: Duration,
) -> Duration {
    let target = current.as_secs_f64() + delta_frames as f64 / frame_rate;
    clamp_position(target, duration)
}

/// Clamp a position in seconds into `[0, duration]`
pub fn clamp_position(seconds: f64, duration: Duration) -> Duration {
    if seconds.is_nan() || seconds <= 0.0 {
        return Duration::ZERO;
    }
    if seconds >= duration.as_secs_f64() {
        return duration;
    }
    Duration::try_from_secs_f64(seconds).map_or(duration, |pos| pos.min(duration))
}
