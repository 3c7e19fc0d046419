//! Errors raised by filters, frames, the recorder and blob playback

use camview_core::CamViewError;
use thiserror::Error;

/// Failure inside the media pipeline
#[derive(Error, Debug)]
pub enum MediaError {
    /// A filter or kernel was built from unusable parameters
    #[error("Invalid filter configuration: {message}")]
    InvalidConfiguration {
        /// What was wrong
        message: String,
    },

    /// Pixel buffer length does not match the frame dimensions
    #[error("Frame buffer holds {actual} bytes, {expected} needed")]
    InvalidFrameData {
        /// Bytes required by width x height x channels
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },

    /// A recorded blob could not be opened for playback
    #[error("Could not decode recording: {reason}")]
    DecodingFailed {
        /// Decoder message
        reason: String,
    },

    /// The recorder was asked to do something its lifecycle forbids
    #[error("Recorder cannot do that now: {message}")]
    InvalidState {
        /// Which operation and why
        message: String,
    },
}

/// Shorthand for media results
pub type MediaResult<T> = Result<T, MediaError>;

impl MediaError {
    /// Whether retrying with fresh input can succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MediaError::DecodingFailed { .. })
    }

    /// Coarse classification used for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            MediaError::InvalidConfiguration { .. } => ErrorCategory::Configuration,
            MediaError::InvalidFrameData { .. } => ErrorCategory::Data,
            MediaError::DecodingFailed { .. } => ErrorCategory::Codec,
            MediaError::InvalidState { .. } => ErrorCategory::State,
        }
    }
}

impl From<MediaError> for CamViewError {
    fn from(err: MediaError) -> Self {
        CamViewError::MediaProcessing {
            reason: err.to_string(),
        }
    }
}

/// Broad groups of [`MediaError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad parameters
    Configuration,
    /// Playback decoding
    Codec,
    /// Malformed buffers
    Data,
    /// Lifecycle misuse
    State,
}
