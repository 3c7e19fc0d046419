//! Connection and stream identities

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identity of a remote connection in the media session
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Create a connection identity
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Opaque identity of a published media stream
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamId(String);

impl StreamId {
    /// Create a stream identity
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StreamId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A stream announced by the media session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    /// Stream identity
    pub stream_id: StreamId,
    /// Connection that publishes the stream
    pub connection_id: ConnectionId,
    /// Metadata the publisher attached to its connection (JSON)
    pub connection_data: String,
}

impl StreamDescriptor {
    /// Create a stream descriptor
    pub fn new(
        stream_id: impl Into<String>,
        connection_id: impl Into<String>,
        connection_data: impl Into<String>,
    ) -> Self {
        Self {
            stream_id: StreamId::new(stream_id),
            connection_id: ConnectionId::new(connection_id),
            connection_data: connection_data.into(),
        }
    }
}
