//! Viewer builder

use crate::config::{ConfigStore, ViewerConfig};
use crate::session::SessionConnector;
use crate::viewer::Viewer;
use camview_core::{CamViewError, CamViewResult, TokenProvider};
use camview_media::BlobDecoder;
use std::sync::Arc;
use std::time::Duration;

/// Builder for configuring and connecting a [`Viewer`]
#[derive(Default)]
pub struct ViewerBuilder {
    config: ViewerConfig,
    tokens: Option<Arc<dyn TokenProvider>>,
    connector: Option<Arc<dyn SessionConnector>>,
    decoder: Option<Arc<dyn BlobDecoder>>,
}

impl ViewerBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Set the media server address (required)
    pub fn server_address(mut self, address: &str) -> Self {
        self.config.server_address = Some(address.to_string());
        self
    }

    /// Set the session to join (required)
    pub fn session_name(mut self, name: &str) -> Self {
        self.config.session_name = Some(name.to_string());
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: ViewerConfig) -> Self {
        self.config = config;
        self
    }

    /// Take the server address and session name persisted in `store`
    pub fn from_store(mut self, store: &dyn ConfigStore) -> Self {
        let stored = ViewerConfig::from_store(store);
        self.config.server_address = stored.server_address;
        self.config.session_name = stored.session_name;
        self
    }

    /// Set the live render rate
    pub fn target_fps(mut self, fps: u32) -> Self {
        self.config.target_fps = fps;
        self
    }

    /// Set the throughput sampling period
    pub fn throughput_interval(mut self, interval: Duration) -> Self {
        self.config.throughput_interval = interval;
        self
    }

    /// Set the token negotiation backend (required)
    pub fn token_provider(mut self, tokens: Arc<dyn TokenProvider>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Set the media session connector (required)
    pub fn connector(mut self, connector: Arc<dyn SessionConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Set the decoder used to play recorded snapshots (required)
    pub fn decoder(mut self, decoder: Arc<dyn BlobDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Build a disconnected viewer.
    ///
    /// Fails with `MissingConfiguration` when a collaborator, the server address
    /// or the session name is missing, and with `InvalidOperation` for a zero
    /// frame rate or a zero sampling or key repeat period.
    pub fn build(self) -> CamViewResult<Viewer> {
        let tokens = self.tokens.ok_or_else(|| missing("token_provider"))?;
        let connector = self.connector.ok_or_else(|| missing("connector"))?;
        let decoder = self.decoder.ok_or_else(|| missing("decoder"))?;
        self.config.require_server_address()?;
        self.config.require_session_name()?;

        if self.config.target_fps == 0 {
            return Err(CamViewError::InvalidOperation {
                operation: "render at 0 fps".to_string(),
            });
        }
        if self.config.throughput_interval.is_zero() {
            return Err(CamViewError::InvalidOperation {
                operation: "sample throughput every 0s".to_string(),
            });
        }
        if self.config.key_repeat_interval.is_zero() {
            return Err(CamViewError::InvalidOperation {
                operation: "repeat keys every 0s".to_string(),
            });
        }

        Ok(Viewer::new(self.config, tokens, connector, decoder))
    }

    /// Build the viewer and join the session
    pub async fn connect(self) -> CamViewResult<Viewer> {
        let mut viewer = self.build()?;
        viewer.connect().await?;
        Ok(viewer)
    }
}

fn missing(field: &str) -> CamViewError {
    CamViewError::MissingConfiguration {
        field: field.to_string(),
    }
}
