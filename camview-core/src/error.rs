//! Error types for camview

use thiserror::Error;

/// Main error type for camview operations
#[derive(Error, Debug)]
pub enum CamViewError {
    /// Initialization error
    #[error("Initialization failed: {reason}")]
    Initialization {
        /// Reason for initialization failure
        reason: String,
    },

    /// Missing configuration error
    #[error("Missing required configuration: {field}")]
    MissingConfiguration {
        /// Missing configuration field
        field: String,
    },

    /// Session or token negotiation with the media server failed
    #[error("Transport unavailable at {server}: {reason}")]
    TransportUnavailable {
        /// Server address that could not be reached
        server: String,
        /// Reason for the failure
        reason: String,
    },

    /// The session-management backend already knows this session
    #[error("Session already exists: {session}")]
    SessionAlreadyExists {
        /// Session name that already exists
        session: String,
    },

    /// Subscribe or unsubscribe was rejected by the media session
    #[error("Subscription failed for stream {stream_id}: {reason}")]
    SubscriptionFailure {
        /// Stream the subscription targeted
        stream_id: String,
        /// Failure reason
        reason: String,
    },

    /// A signal could not be handed to the session
    #[error("Signal delivery to {recipient} failed: {reason}")]
    SignalDeliveryFailure {
        /// Recipient connection
        recipient: String,
        /// Failure reason
        reason: String,
    },

    /// The recorder has not buffered anything yet
    #[error("Recorder not ready")]
    RecorderNotReady,

    /// Invalid state error
    #[error("Invalid state: expected {expected}, got {actual}")]
    InvalidState {
        /// Expected state
        expected: String,
        /// Actual state
        actual: String,
    },

    /// Invalid operation error
    #[error("Invalid operation: {operation}")]
    InvalidOperation {
        /// Operation that was invalid
        operation: String,
    },

    /// No user is known for the connection
    #[error("User not found for connection {connection_id}")]
    UserNotFound {
        /// Connection identity that was looked up
        connection_id: String,
    },

    /// Media processing error
    #[error("Media processing error: {reason}")]
    MediaProcessing {
        /// Reason for media error
        reason: String,
    },

    /// Invalid message format
    #[error("Invalid message format: {message}, error: {source}")]
    InvalidMessage {
        /// Invalid message content
        message: String,
        /// Parsing error
        source: serde_json::Error,
    },
}

/// Result alias for camview operations
pub type CamViewResult<T> = Result<T, CamViewError>;

impl CamViewError {
    /// Get error code for programmatic handling
    pub fn error_code(&self) -> String {
        match self {
            CamViewError::Initialization { .. } => "INITIALIZATION_FAILED".to_string(),
            CamViewError::MissingConfiguration { .. } => "MISSING_CONFIGURATION".to_string(),
            CamViewError::TransportUnavailable { .. } => "TRANSPORT_UNAVAILABLE".to_string(),
            CamViewError::SessionAlreadyExists { .. } => "SESSION_ALREADY_EXISTS".to_string(),
            CamViewError::SubscriptionFailure { .. } => "SUBSCRIPTION_FAILURE".to_string(),
            CamViewError::SignalDeliveryFailure { .. } => "SIGNAL_DELIVERY_FAILURE".to_string(),
            CamViewError::RecorderNotReady => "RECORDER_NOT_READY".to_string(),
            CamViewError::InvalidState { .. } => "INVALID_STATE".to_string(),
            CamViewError::InvalidOperation { .. } => "INVALID_OPERATION".to_string(),
            CamViewError::UserNotFound { .. } => "USER_NOT_FOUND".to_string(),
            CamViewError::MediaProcessing { .. } => "MEDIA_PROCESSING_ERROR".to_string(),
            CamViewError::InvalidMessage { .. } => "INVALID_MESSAGE".to_string(),
        }
    }

    /// Whether the presentation layer should show this error as a notice.
    ///
    /// Only transport failures reach the user; subscription failures are logged
    /// and signal delivery is fire-and-forget.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            CamViewError::TransportUnavailable { .. } | CamViewError::MissingConfiguration { .. }
        )
    }

    /// Whether retrying the operation (by the user) can succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            CamViewError::TransportUnavailable { .. } => true,
            CamViewError::SubscriptionFailure { .. } => true,
            CamViewError::SignalDeliveryFailure { .. } => true,
            CamViewError::RecorderNotReady => true,
            CamViewError::SessionAlreadyExists { .. } => true,
            CamViewError::Initialization { .. } => false,
            CamViewError::MissingConfiguration { .. } => false,
            CamViewError::InvalidMessage { .. } => false,
            _ => false,
        }
    }

    /// Build an [`CamViewError::InvalidMessage`] from a raw payload
    pub fn invalid_message(message: impl Into<String>, source: serde_json::Error) -> Self {
        CamViewError::InvalidMessage {
            message: message.into(),
            source,
        }
    }
}
