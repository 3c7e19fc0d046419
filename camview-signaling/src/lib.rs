//! # camview Signaling
//!
//! Remote control and status protocol for camview.
//! Encodes viewer commands for devices, decodes device status pushes, and keeps
//! the directory of remote users in sync with the session's stream events.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod directory;
pub mod inbound;
pub mod protocol;
pub mod user;

// Re-export main types
pub use directory::UserDirectory;
pub use inbound::{handle_signal, register_stream, InboundQueue, SessionEvent, SessionEventSender};
pub use protocol::{
    AdvancedConstraint, CameraControl, DeviceCommand, InboundSignal, OutboundSignal, SignalType,
    ViewerMessage,
};
pub use user::{
    BatteryStatus, CameraSetting, DeviceInfo, NumberRange, User, UserDynamicData,
    UserStaticData, VideoDevice,
};
