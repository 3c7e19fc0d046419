//! Remote user model
//!
//! A [`User`] pairs the stream a device publishes with the capability snapshot
//! it attached to its connection and the latest status it pushed.

use camview_core::{ConnectionId, StreamDescriptor, StreamId};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Hardware description of a device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    /// Human readable device name
    pub name: String,
    /// Model
    pub model: String,
    /// Manufacturer
    pub manufacturer: String,
    /// Serial number
    pub serial: String,
}

/// A video input offered by a device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDevice {
    /// Input id used in camera controls
    pub device_id: String,
    /// Human readable label
    #[serde(default)]
    pub label: String,
}

/// Capability snapshot captured when the stream arrives
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStaticData {
    /// Hardware description
    pub device_info: DeviceInfo,
    /// Video inputs in the order the device lists them
    pub video_devices: Vec<VideoDevice>,
}

/// Advertised range of an adjustable camera setting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumberRange {
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
    /// Step between values
    pub step: f64,
}

impl Default for NumberRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            step: 1.0,
        }
    }
}

/// Battery state of a device
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryStatus {
    /// Charge level in percent
    pub level: f64,
    /// Whether the device is charging
    pub is_plugged: bool,
}

/// Status snapshot pushed by a device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDynamicData {
    /// Whether audio is being sent
    pub with_audio: bool,
    /// Id of the active video input
    pub video_device_id: String,
    /// Zoom range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<NumberRange>,
    /// Focus distance range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<NumberRange>,
    /// Contrast range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast: Option<NumberRange>,
    /// Brightness range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<NumberRange>,
    /// Battery state, if the device reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery: Option<BatteryStatus>,
}

/// Device-side settings with an advertised range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraSetting {
    /// Zoom
    Zoom,
    /// Focus distance
    Focus,
    /// Contrast
    Contrast,
    /// Brightness
    Brightness,
}

impl UserDynamicData {
    /// Advertised range for `setting`
    pub fn range(&self, setting: CameraSetting) -> Option<NumberRange> {
        match setting {
            CameraSetting::Zoom => self.zoom,
            CameraSetting::Focus => self.focus,
            CameraSetting::Contrast => self.contrast,
            CameraSetting::Brightness => self.brightness,
        }
    }
}

/// One remote participant seen by the viewer
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    stream: StreamDescriptor,
    static_data: UserStaticData,
    dynamic_data: Option<UserDynamicData>,
}

impl User {
    /// Create a user from an announced stream.
    ///
    /// The capability snapshot is parsed from the connection metadata; if the
    /// metadata is not valid the user is kept with an empty snapshot.
    pub fn from_stream(stream: StreamDescriptor) -> Self {
        let static_data = match serde_json::from_str(&stream.connection_data) {
            Ok(data) => data,
            Err(e) => {
                warn!(
                    "Invalid connection metadata for {}: {}",
                    stream.connection_id, e
                );
                UserStaticData::default()
            }
        };

        Self {
            stream,
            static_data,
            dynamic_data: None,
        }
    }

    /// Create a user with an explicit capability snapshot
    pub fn with_static_data(stream: StreamDescriptor, static_data: UserStaticData) -> Self {
        Self {
            stream,
            static_data,
            dynamic_data: None,
        }
    }

    /// The published stream
    pub fn stream(&self) -> &StreamDescriptor {
        &self.stream
    }

    /// Connection identity
    pub fn connection_id(&self) -> &ConnectionId {
        &self.stream.connection_id
    }

    /// Stream identity
    pub fn stream_id(&self) -> &StreamId {
        &self.stream.stream_id
    }

    /// Capability snapshot
    pub fn static_data(&self) -> &UserStaticData {
        &self.static_data
    }

    /// Latest pushed status, `None` until the first push
    pub fn dynamic_data(&self) -> Option<&UserDynamicData> {
        self.dynamic_data.as_ref()
    }

    /// Replace the pushed status
    pub fn set_dynamic_data(&mut self, data: UserDynamicData) {
        self.dynamic_data = Some(data);
    }

    /// Device name for lists
    pub fn display_name(&self) -> &str {
        &self.static_data.device_info.name
    }

    /// Position of the active video input among the advertised inputs
    pub fn current_device_index(&self) -> Option<usize> {
        let active = &self.dynamic_data.as_ref()?.video_device_id;
        self.static_data
            .video_devices
            .iter()
            .position(|device| &device.device_id == active)
    }

    /// Id of the advertised input at `index`
    pub fn device_id_at(&self, index: usize) -> Option<&str> {
        self.static_data
            .video_devices
            .get(index)
            .map(|device| device.device_id.as_str())
    }

    /// Whether the device advertised a range for `setting`
    pub fn supports(&self, setting: CameraSetting) -> bool {
        self.dynamic_data
            .as_ref()
            .and_then(|data| data.range(setting))
            .is_some()
    }

    /// Advertised range for `setting`, or `0..=100` step 1
    pub fn range_or_default(&self, setting: CameraSetting) -> NumberRange {
        self.dynamic_data
            .as_ref()
            .and_then(|data| data.range(setting))
            .unwrap_or_default()
    }
}
