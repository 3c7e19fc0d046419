//! Media session ports
//!
//! The transport that carries the device's stream is an external collaborator.
//! The viewer drives it through these traits; stream and signal events flow
//! back through the [`SessionEventSender`] handed over at connect time.

use async_trait::async_trait;
use camview_core::{CamViewResult, StreamDescriptor, StreamId};
use camview_media::{FrameSource, RecordingSource};
use camview_signaling::{OutboundSignal, SessionEventSender};
use std::sync::Arc;

/// Where a subscription renders its decoded frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceTarget {
    /// The visible display surface
    Display,
    /// A sink nobody looks at; keeps the subscription flowing while frozen
    Inert,
}

/// An active subscription to one remote stream
pub trait Subscriber: Send + Sync {
    /// Subscribed stream
    fn stream_id(&self) -> &StreamId;

    /// Redirect decoded frames
    fn attach(&self, target: SurfaceTarget);

    /// Live decoded frames
    fn frame_source(&self) -> Arc<dyn FrameSource>;

    /// Encoded segments for local recording
    fn recording_source(&self) -> Arc<dyn RecordingSource>;
}

/// A connected media session
#[async_trait]
pub trait MediaSession: Send + Sync {
    /// Subscribe to a remote stream
    async fn subscribe(&self, stream: &StreamDescriptor) -> CamViewResult<Box<dyn Subscriber>>;

    /// End a subscription
    async fn unsubscribe(&self, subscriber: Box<dyn Subscriber>) -> CamViewResult<()>;

    /// Send a signal. Delivery is at-most-once with no acknowledgement.
    async fn signal(&self, signal: OutboundSignal) -> CamViewResult<()>;

    /// Leave the session
    async fn disconnect(&self);
}

/// Opens media sessions
#[async_trait]
pub trait SessionConnector: Send + Sync {
    /// Connect with `token`; the session reports its events through `events`
    async fn connect(
        &self,
        token: &str,
        events: SessionEventSender,
    ) -> CamViewResult<Box<dyn MediaSession>>;
}
