//! Error types for the swap session

use swap_executor_api::errors::{DiscoveryError, EngineError, MetadataError, UnitsError};
use thiserror::Error;

/// Error type for session and orchestrator operations
///
/// Messages are surfaced to the user verbatim
#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// The operation's inputs are incomplete or invalid; no collaborator was
    /// called
    #[error("{0}")]
    Validation(String),

    /// Route discovery failed or found no routes
    #[error("{0}")]
    Discovery(String),

    /// Network or token metadata could not be fetched
    #[error("{0}")]
    Metadata(String),

    /// The execution engine reported an error
    #[error("{0}")]
    Engine(String),

    /// The operation requires a tracked route and there is none
    #[error("No active route")]
    NoActiveRoute,

    /// The operation is not allowed in the route's current state
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

impl SessionError {
    /// Create a new validation error
    #[allow(clippy::needless_pass_by_value)]
    pub fn validation<T: ToString>(msg: T) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Create a new discovery error
    #[allow(clippy::needless_pass_by_value)]
    pub fn discovery<T: ToString>(msg: T) -> Self {
        Self::Discovery(msg.to_string())
    }

    /// Create a new metadata error
    #[allow(clippy::needless_pass_by_value)]
    pub fn metadata<T: ToString>(msg: T) -> Self {
        Self::Metadata(msg.to_string())
    }

    /// Create a new engine error
    #[allow(clippy::needless_pass_by_value)]
    pub fn engine<T: ToString>(msg: T) -> Self {
        Self::Engine(msg.to_string())
    }

    /// Create a new invalid transition error
    #[allow(clippy::needless_pass_by_value)]
    pub fn invalid_transition<T: ToString>(msg: T) -> Self {
        Self::InvalidTransition(msg.to_string())
    }
}

impl From<DiscoveryError> for SessionError {
    fn from(e: DiscoveryError) -> Self {
        match e {
            DiscoveryError::Validation(msg) => SessionError::Validation(msg),
            other => SessionError::discovery(other),
        }
    }
}

impl From<MetadataError> for SessionError {
    fn from(e: MetadataError) -> Self {
        SessionError::metadata(e)
    }
}

impl From<EngineError> for SessionError {
    fn from(e: EngineError) -> Self {
        SessionError::engine(e)
    }
}

impl From<UnitsError> for SessionError {
    fn from(e: UnitsError) -> Self {
        SessionError::validation(e)
    }
}
