//! Access token negotiation port
//!
//! The session-management backend is an external collaborator. Implementors
//! provide the two backend calls; [`TokenProvider::get_token`] composes them and
//! treats an already existing session as success.

use crate::error::{CamViewError, CamViewResult};
use async_trait::async_trait;
use tracing::debug;

/// Negotiates access tokens with the session-management backend
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Create a session named `session_name`, returning the backend session id.
    ///
    /// Must return [`CamViewError::SessionAlreadyExists`] when the backend
    /// reports a name conflict.
    async fn create_session(&self, server: &str, session_name: &str) -> CamViewResult<String>;

    /// Issue a connection token for an existing session
    async fn create_token(&self, server: &str, session_id: &str) -> CamViewResult<String>;

    /// Create (or reuse) the session and issue a token for it
    async fn get_token(&self, server: &str, session_name: &str) -> CamViewResult<String> {
        let session_id = match self.create_session(server, session_name).await {
            Ok(id) => id,
            Err(CamViewError::SessionAlreadyExists { .. }) => {
                debug!("Session {} already exists, reusing it", session_name);
                session_name.to_string()
            }
            Err(e) => return Err(e),
        };

        self.create_token(server, &session_id).await
    }
}
