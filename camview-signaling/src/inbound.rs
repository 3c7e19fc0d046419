//! Inbound session events and their dispatch
//!
//! The media session pushes stream and signal events through a
//! [`SessionEventSender`]. The owner of the [`InboundQueue`] drains it between
//! state transitions and routes each event through the handlers below, so
//! directory mutations never interleave with an in-flight transition.

use crate::directory::UserDirectory;
use crate::protocol::{DeviceCommand, InboundSignal, OutboundSignal, ViewerMessage};
use crate::user::User;
use camview_core::{CamViewResult, ConnectionId, StreamDescriptor};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use tracing::{debug, trace, warn};

/// Events delivered by the media session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A remote stream became available
    StreamCreated(StreamDescriptor),
    /// A remote stream was torn down
    StreamDestroyed(StreamDescriptor),
    /// A signal arrived
    Signal(InboundSignal),
}

/// Producer side of the inbound queue, cloned into session callbacks
#[derive(Debug, Clone)]
pub struct SessionEventSender {
    tx: mpsc::UnboundedSender<SessionEvent>,
    pending: Arc<Notify>,
}

impl SessionEventSender {
    /// Enqueue an event. Returns `false` if the queue was dropped.
    pub fn send(&self, event: SessionEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => {
                self.pending.notify_one();
                true
            }
            Err(e) => {
                debug!("Inbound queue closed, dropping {:?}", e.0);
                false
            }
        }
    }
}

/// Queue of session events awaiting dispatch
#[derive(Debug)]
pub struct InboundQueue {
    tx: mpsc::UnboundedSender<SessionEvent>,
    rx: mpsc::UnboundedReceiver<SessionEvent>,
    pending: Arc<Notify>,
}

impl InboundQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            pending: Arc::new(Notify::new()),
        }
    }

    /// Handle for producers
    pub fn sender(&self) -> SessionEventSender {
        SessionEventSender {
            tx: self.tx.clone(),
            pending: self.pending.clone(),
        }
    }

    /// Notified whenever an event is enqueued. Lets a pump wait for work
    /// without borrowing the queue.
    pub fn pending(&self) -> Arc<Notify> {
        self.pending.clone()
    }

    /// Take every event queued so far, in arrival order
    pub fn drain(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        if !events.is_empty() {
            trace!("Drained {} inbound events", events.len());
        }
        events
    }

    /// Wait for the next event
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        self.rx.recv().await
    }
}

impl Default for InboundQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Register the user behind a new stream.
///
/// Returns the FETCH_STATUS request to send, or `None` if the stream was
/// already known, so each stream is polled exactly once.
pub fn register_stream(
    directory: &mut UserDirectory,
    stream: StreamDescriptor,
) -> CamViewResult<Option<OutboundSignal>> {
    let connection_id = stream.connection_id.clone();
    if !directory.insert(User::from_stream(stream)) {
        return Ok(None);
    }

    DeviceCommand::FetchStatus
        .to_signal(connection_id)
        .map(Some)
}

/// Apply an inbound signal to the directory.
///
/// Returns the connection whose status changed. Unknown signal types are
/// ignored; malformed payloads and statuses from unknown connections are
/// logged and dropped.
pub fn handle_signal(
    directory: &mut UserDirectory,
    signal: &InboundSignal,
) -> Option<ConnectionId> {
    let message = match signal.decode() {
        Ok(Some(message)) => message,
        Ok(None) => {
            trace!("Ignoring signal '{}' from {}", signal.kind, signal.from);
            return None;
        }
        Err(e) => {
            warn!("Dropping signal '{}' from {}: {}", signal.kind, signal.from, e);
            return None;
        }
    };

    match message {
        ViewerMessage::PushStatus(status) => {
            match directory.apply_status(&signal.from, status) {
                Ok(()) => {
                    debug!("Status updated for {}", signal.from);
                    Some(signal.from.clone())
                }
                Err(e) => {
                    warn!("Dropping status push: {}", e);
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::SignalType;

    #[test]
    fn test_drain_preserves_order() {
        let mut queue = InboundQueue::new();
        let sender = queue.sender();

        for id in ["a", "b", "c"] {
            assert!(sender.send(SessionEvent::StreamCreated(StreamDescriptor::new(id, id, "{}"))));
        }

        let drained = queue.drain();
        let ids: Vec<_> = drained
            .iter()
            .map(|event| match event {
                SessionEvent::StreamCreated(s) => s.stream_id.as_str().to_string(),
                other => panic!("unexpected event {:?}", other),
            })
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_send_after_queue_dropped() {
        let queue = InboundQueue::new();
        let sender = queue.sender();
        drop(queue);
        assert!(!sender.send(SessionEvent::Signal(InboundSignal::new(
            ConnectionId::from("c"),
            "push-status",
            None
        ))));
    }

    #[test]
    fn test_register_stream_fetches_once() {
        let mut directory = UserDirectory::new();
        let stream = StreamDescriptor::new("s1", "c1", "{}");

        let fetch = register_stream(&mut directory, stream.clone()).unwrap().unwrap();
        assert_eq!(fetch.kind, SignalType::FetchStatus);
        assert_eq!(fetch.to.as_str(), "c1");

        assert!(register_stream(&mut directory, stream).unwrap().is_none());
        assert_eq!(directory.len(), 1);
    }

    #[tokio::test]
    async fn test_recv_waits_for_event() {
        let mut queue = InboundQueue::new();
        let sender = queue.sender();

        tokio::spawn(async move {
            sender.send(SessionEvent::StreamDestroyed(StreamDescriptor::new("s", "c", "")));
        });

        let event = queue.recv().await.unwrap();
        assert!(matches!(event, SessionEvent::StreamDestroyed(_)));
    }

    #[tokio::test]
    async fn test_pending_notified_on_send() {
        let mut queue = InboundQueue::new();
        let pending = queue.pending();
        queue
            .sender()
            .send(SessionEvent::StreamCreated(StreamDescriptor::new("s", "c", "{}")));

        // the permit is stored even though nobody was waiting yet
        pending.notified().await;
        assert_eq!(queue.drain().len(), 1);
    }
}
