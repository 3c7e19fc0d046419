//! # camview - Remote Camera Viewer
//!
//! camview watches a camera published by a remote device over a media session,
//! enhances it locally and sends camera-control commands back to the device.
//!
//! ## Key Features
//!
//! - **Live view**: subscribed frames are sharpened and color-adjusted on every tick
//! - **Freeze frame**: the stream is recorded locally so the view can be paused and scrubbed
//! - **Device control**: switch inputs, focus, zoom, mute and disconnect the device
//! - **Status sync**: each device pushes its battery, audio and camera ranges
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use camview::{Viewer, ViewerHandle};
//! # use std::sync::Arc;
//! # async fn example(
//! #     tokens: Arc<dyn camview::TokenProvider>,
//! #     connector: Arc<dyn camview::SessionConnector>,
//! #     decoder: Arc<dyn camview::BlobDecoder>,
//! # ) -> Result<(), camview::CamViewError> {
//! let viewer = Viewer::builder()
//!     .server_address("https://media.example:4443")
//!     .session_name("workbench")
//!     .token_provider(tokens)
//!     .connector(connector)
//!     .decoder(decoder)
//!     .connect()
//!     .await?;
//!
//! let handle = ViewerHandle::new(viewer);
//! handle.spawn_event_pump();
//! handle.spawn_throughput_sampler();
//!
//! let mut events = handle.lock().await.events();
//! while let Some(event) = events.next().await {
//!     println!("Viewer event: {:?}", event);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

// Re-export core types for easy access
pub use camview_core::{
    CamViewError, CamViewResult, ConnectionId, StreamDescriptor, StreamId, TokenProvider,
};

pub use camview_media::{
    Blob, BlobDecoder, CanvasSettings, FrameSource, PlaybackSource, RecordingSource, VideoFrame,
};

pub use camview_signaling::{
    CameraControl, DeviceCommand, InboundSignal, SessionEvent, SessionEventSender, SignalType,
    User, UserDynamicData, UserStaticData,
};

pub use camview_diagnostics::{DebugLogger, ThroughputSample};

// Public API modules
pub mod builder;
pub mod config;
pub mod controls;
pub mod event;
pub mod handle;
pub mod mode;
pub mod session;
pub mod settings;
pub mod viewer;

// Re-export main API types
pub use builder::ViewerBuilder;
pub use config::{ConfigStore, MemoryConfigStore, ViewerConfig};
pub use controls::{KeyboardControls, TransportAction, TransportKey};
pub use event::{Event, EventStream};
pub use handle::ViewerHandle;
pub use mode::{ModeEvent, ModeKind};
pub use session::{MediaSession, SessionConnector, Subscriber, SurfaceTarget};
pub use settings::{SettingsCommand, ViewTransform};
pub use viewer::{RecordingExport, Viewer};
