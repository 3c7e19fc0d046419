//! Directory of known remote users
//!
//! Users are kept in arrival order so the presentation layer can list them
//! stably. All lookups are keyed by connection or stream identity; callers
//! never hold on to positions across mutations.

use crate::user::{User, UserDynamicData};
use camview_core::{CamViewError, CamViewResult, ConnectionId, StreamId};
use tracing::debug;

/// Ordered registry of remote users
#[derive(Debug, Default, Clone)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user. Returns `false` if a user with the same stream is
    /// already registered; the existing entry is kept.
    pub fn insert(&mut self, user: User) -> bool {
        if self.contains_stream(user.stream_id()) {
            debug!("Stream {} already registered", user.stream_id());
            return false;
        }

        debug!(
            "Registered user {} ({})",
            user.connection_id(),
            user.display_name()
        );
        self.users.push(user);
        true
    }

    /// Remove the user publishing `stream_id`
    pub fn remove_stream(&mut self, stream_id: &StreamId) -> Option<User> {
        let index = self.index_of_stream(stream_id)?;
        let user = self.users.remove(index);
        debug!("Removed user {}", user.connection_id());
        Some(user)
    }

    /// Whether a user publishes `stream_id`
    pub fn contains_stream(&self, stream_id: &StreamId) -> bool {
        self.users.iter().any(|u| u.stream_id() == stream_id)
    }

    /// Look up by stream identity
    pub fn get_by_stream(&self, stream_id: &StreamId) -> Option<&User> {
        self.users.iter().find(|u| u.stream_id() == stream_id)
    }

    /// Look up by connection identity
    pub fn get_by_connection(&self, connection_id: &ConnectionId) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.connection_id() == connection_id)
    }

    /// Mutable lookup by connection identity
    pub fn get_by_connection_mut(&mut self, connection_id: &ConnectionId) -> Option<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.connection_id() == connection_id)
    }

    /// Current list position of the user publishing `stream_id`
    pub fn index_of_stream(&self, stream_id: &StreamId) -> Option<usize> {
        self.users.iter().position(|u| u.stream_id() == stream_id)
    }

    /// Replace the dynamic status of the user on `connection_id`
    pub fn apply_status(
        &mut self,
        connection_id: &ConnectionId,
        data: UserDynamicData,
    ) -> CamViewResult<()> {
        let user = self
            .get_by_connection_mut(connection_id)
            .ok_or_else(|| CamViewError::UserNotFound {
                connection_id: connection_id.to_string(),
            })?;
        user.set_dynamic_data(data);
        Ok(())
    }

    /// Users in arrival order
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Iterate users in arrival order
    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.iter()
    }

    /// Number of users
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether no user is known
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Forget every user
    pub fn clear(&mut self) {
        self.users.clear();
    }
}
