//! # camview Core
//!
//! Identities, error taxonomy and backend ports shared by every camview crate.
//! Media handling, the signaling protocol and the viewer state machine build on
//! the types defined here.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod stream;
pub mod token;

// Re-export main types
pub use error::{CamViewError, CamViewResult};
pub use stream::{ConnectionId, StreamDescriptor, StreamId};
pub use token::TokenProvider;
