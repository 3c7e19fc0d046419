//! Signaling protocol messages
//!
//! Messages travel over the media session's generic signaling channel as a
//! type tag plus an optional JSON string payload.

use crate::user::UserDynamicData;
use camview_core::{CamViewError, CamViewResult, ConnectionId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signal type tags carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalType {
    /// Viewer asks a device to push its status
    FetchStatus,
    /// Device reports its dynamic status
    PushStatus,
    /// Viewer pushes a camera constraint
    UpdateCamera,
    /// Viewer toggles the device's audio mute
    FlipSound,
    /// Viewer asks the device to leave
    Disconnect,
}

impl SignalType {
    /// Every signal type
    pub const ALL: [SignalType; 5] = [
        SignalType::FetchStatus,
        SignalType::PushStatus,
        SignalType::UpdateCamera,
        SignalType::FlipSound,
        SignalType::Disconnect,
    ];

    /// Wire name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::FetchStatus => "fetch-status",
            SignalType::PushStatus => "push-status",
            SignalType::UpdateCamera => "update-camera",
            SignalType::FlipSound => "flip-sound",
            SignalType::Disconnect => "disconnect",
        }
    }

    /// Parse a wire name. Unknown names yield `None`.
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advanced camera constraint entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdvancedConstraint {
    /// Manual focus distance
    FocusDistance {
        /// Distance in device units
        #[serde(rename = "focusDistance")]
        focus_distance: f64,
    },
    /// Optical or digital zoom
    Zoom {
        /// Zoom factor in device units
        zoom: f64,
    },
}

/// Payload of an UPDATE_CAMERA signal.
///
/// Values are forwarded as-is; the device validates them against its own
/// capabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CameraControl {
    /// Switch to another video input
    Device {
        /// Target video input id
        #[serde(rename = "deviceId")]
        device_id: String,
    },
    /// Apply advanced constraints to the current input
    Advanced {
        /// Constraints in application order
        advanced: Vec<AdvancedConstraint>,
    },
}

impl CameraControl {
    /// Switch to the video input `device_id`
    pub fn device(device_id: impl Into<String>) -> Self {
        CameraControl::Device {
            device_id: device_id.into(),
        }
    }

    /// Set the focus distance
    pub fn focus(focus_distance: f64) -> Self {
        CameraControl::Advanced {
            advanced: vec![AdvancedConstraint::FocusDistance { focus_distance }],
        }
    }

    /// Set the zoom factor
    pub fn zoom(zoom: f64) -> Self {
        CameraControl::Advanced {
            advanced: vec![AdvancedConstraint::Zoom { zoom }],
        }
    }
}

/// Signal addressed to one remote connection
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundSignal {
    /// Recipient connection
    pub to: ConnectionId,
    /// Type tag
    pub kind: SignalType,
    /// JSON payload, if the type carries one
    pub data: Option<String>,
}

impl OutboundSignal {
    /// Signal without payload
    pub fn new(to: ConnectionId, kind: SignalType) -> Self {
        Self {
            to,
            kind,
            data: None,
        }
    }

    /// Attach a JSON payload
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }
}

/// Commands the viewer sends to a device
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    /// Request a status push
    FetchStatus,
    /// Apply a camera constraint
    UpdateCamera(CameraControl),
    /// Toggle audio mute
    FlipSound,
    /// Leave the session
    Disconnect,
}

impl DeviceCommand {
    /// Type tag used on the wire
    pub fn signal_type(&self) -> SignalType {
        match self {
            DeviceCommand::FetchStatus => SignalType::FetchStatus,
            DeviceCommand::UpdateCamera(_) => SignalType::UpdateCamera,
            DeviceCommand::FlipSound => SignalType::FlipSound,
            DeviceCommand::Disconnect => SignalType::Disconnect,
        }
    }

    /// Encode the command as a signal for `to`
    pub fn to_signal(&self, to: ConnectionId) -> CamViewResult<OutboundSignal> {
        let signal = OutboundSignal::new(to, self.signal_type());
        match self {
            DeviceCommand::UpdateCamera(control) => {
                let data = serde_json::to_string(control)
                    .map_err(|e| CamViewError::invalid_message(format!("{:?}", control), e))?;
                Ok(signal.with_data(data))
            }
            _ => Ok(signal),
        }
    }
}

/// Signal received from a remote connection
#[derive(Debug, Clone, PartialEq)]
pub struct InboundSignal {
    /// Sending connection
    pub from: ConnectionId,
    /// Raw type tag; may name a type this viewer does not know
    pub kind: String,
    /// Raw payload
    pub data: Option<String>,
}

impl InboundSignal {
    /// Create an inbound signal
    pub fn new(from: ConnectionId, kind: impl Into<String>, data: Option<String>) -> Self {
        Self {
            from,
            kind: kind.into(),
            data,
        }
    }

    /// Known type tag, if any
    pub fn signal_type(&self) -> Option<SignalType> {
        SignalType::from_wire(&self.kind)
    }

    /// Decode the signal into a viewer-bound message.
    ///
    /// Returns `Ok(None)` for unknown or device-bound types and an
    /// [`CamViewError::InvalidMessage`] for a malformed payload.
    pub fn decode(&self) -> CamViewResult<Option<ViewerMessage>> {
        match self.signal_type() {
            Some(SignalType::PushStatus) => {
                let raw = self.data.as_deref().unwrap_or_default();
                let status = serde_json::from_str(raw)
                    .map_err(|e| CamViewError::invalid_message(raw, e))?;
                Ok(Some(ViewerMessage::PushStatus(status)))
            }
            _ => Ok(None),
        }
    }
}

/// Messages a viewer acts on
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerMessage {
    /// Latest dynamic status of the sender
    PushStatus(UserDynamicData),
}
