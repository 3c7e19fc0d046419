//! Configuration types and defaults

use camview_core::{CamViewError, CamViewResult};
use camview_media::render::DEFAULT_TARGET_FPS;
use camview_media::SCRUB_FRAME_RATE;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Persisted key holding the media server address
pub const SERVER_ADDRESS_KEY: &str = "server_address";
/// Persisted key holding the session name
pub const SESSION_KEY: &str = "session";

/// Message shown when the media server cannot be reached
pub const SERVER_UNAVAILABLE_NOTICE: &str = "Server is not available";

/// Viewer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Media server address
    pub server_address: Option<String>,
    /// Session to join
    pub session_name: Option<String>,
    /// Display refresh rate while live
    pub target_fps: u32,
    /// Period of recording throughput samples
    #[serde(with = "duration_ms")]
    pub throughput_interval: Duration,
    /// Frames per second assumed when scrubbing
    pub scrub_frame_rate: f64,
    /// Period of arrow key auto-repeat
    #[serde(with = "duration_ms")]
    pub key_repeat_interval: Duration,
    /// How long notices stay visible
    #[serde(with = "duration_ms")]
    pub notice_duration: Duration,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            server_address: None,
            session_name: None,
            target_fps: DEFAULT_TARGET_FPS,
            throughput_interval: Duration::from_secs(3),
            scrub_frame_rate: SCRUB_FRAME_RATE,
            key_repeat_interval: Duration::from_millis(350),
            notice_duration: Duration::from_secs(6),
        }
    }
}

impl ViewerConfig {
    /// Defaults with the persisted server address and session name
    pub fn from_store(store: &dyn ConfigStore) -> Self {
        Self {
            server_address: store.get(SERVER_ADDRESS_KEY),
            session_name: store.get(SESSION_KEY),
            ..Self::default()
        }
    }

    /// Parse a JSON document; missing fields take their defaults.
    /// Durations are given in milliseconds.
    pub fn from_json(json: &str) -> CamViewResult<Self> {
        serde_json::from_str(json).map_err(|e| CamViewError::invalid_message(json, e))
    }

    /// Persist the server address and session name
    pub fn save_to(&self, store: &mut dyn ConfigStore) {
        if let Some(address) = &self.server_address {
            store.set(SERVER_ADDRESS_KEY, address);
        }
        if let Some(session) = &self.session_name {
            store.set(SESSION_KEY, session);
        }
    }

    /// Server address, or `MissingConfiguration`
    pub fn require_server_address(&self) -> CamViewResult<&str> {
        require(&self.server_address, SERVER_ADDRESS_KEY)
    }

    /// Session name, or `MissingConfiguration`
    pub fn require_session_name(&self) -> CamViewResult<&str> {
        require(&self.session_name, "session_name")
    }
}

fn require<'a>(value: &'a Option<String>, field: &str) -> CamViewResult<&'a str> {
    match value.as_deref() {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(CamViewError::MissingConfiguration {
            field: field.to_string(),
        }),
    }
}

/// Key-value store for persisted settings
pub trait ConfigStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory [`ConfigStore`]
#[derive(Debug, Default, Clone)]
pub struct MemoryConfigStore {
    values: HashMap<String, String>,
}

impl MemoryConfigStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
