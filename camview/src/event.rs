//! Event system for viewer notifications

use crate::mode::ModeKind;
use camview_core::{ConnectionId, StreamId};
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::trace;

/// Viewer events delivered to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A remote device published its stream
    UserJoined {
        /// Device connection
        connection_id: ConnectionId,
        /// Published stream
        stream_id: StreamId,
    },
    /// A remote device's stream ended
    UserLeft {
        /// Device connection
        connection_id: ConnectionId,
        /// Ended stream
        stream_id: StreamId,
    },
    /// A device pushed new status
    StatusUpdated {
        /// Device connection
        connection_id: ConnectionId,
    },
    /// The capture mode changed
    ModeChanged {
        /// Previous mode
        from: ModeKind,
        /// New mode
        to: ModeKind,
    },
    /// Transient message for the user
    Notice {
        /// Message text
        message: String,
        /// How long to show it
        duration: Duration,
    },
    /// New recording throughput sample
    ThroughputUpdated {
        /// Incoming bytes per second
        bytes_per_second: f64,
        /// Recorded size so far
        total_bytes: usize,
    },
}

impl Event {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::UserJoined { .. } => "user_joined",
            Event::UserLeft { .. } => "user_left",
            Event::StatusUpdated { .. } => "status_updated",
            Event::ModeChanged { .. } => "mode_changed",
            Event::Notice { .. } => "notice",
            Event::ThroughputUpdated { .. } => "throughput_updated",
        }
    }

    /// Check if this is a user-directory event
    pub fn is_user_event(&self) -> bool {
        matches!(
            self,
            Event::UserJoined { .. } | Event::UserLeft { .. } | Event::StatusUpdated { .. }
        )
    }
}

/// Fans events out to every open [`EventStream`]
#[derive(Debug, Default)]
pub(crate) struct EventEmitter {
    subscribers: Vec<mpsc::UnboundedSender<Event>>,
}

impl EventEmitter {
    pub(crate) fn subscribe(&mut self) -> EventStream {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        EventStream::new(rx)
    }

    pub(crate) fn emit(&mut self, event: Event) {
        trace!("Emitting {}", event.event_type());
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Stream of viewer events for async iteration
#[derive(Debug)]
pub struct EventStream {
    receiver: mpsc::UnboundedReceiver<Event>,
}

impl EventStream {
    /// Create a new event stream with a receiver
    pub fn new(receiver: mpsc::UnboundedReceiver<Event>) -> Self {
        Self { receiver }
    }

    /// Get the next event from the stream
    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Try to get the next event without blocking
    pub fn try_next(&mut self) -> Result<Option<Event>, mpsc::error::TryRecvError> {
        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => {
                Err(mpsc::error::TryRecvError::Disconnected)
            }
        }
    }

    /// Collect every event already delivered
    pub fn drain(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Close the event stream
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

impl Stream for EventStream {
    type Item = Event;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Event>> {
        self.receiver.poll_recv(cx)
    }
}
