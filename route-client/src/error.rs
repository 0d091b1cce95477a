//! Error types for the route client

use swap_executor_api::errors::{DiscoveryError, MetadataError};
use thiserror::Error;

/// Error type for route client operations
#[derive(Debug, Error, Clone)]
pub enum RouteClientError {
    /// Setup error
    #[error("Setup error: {0}")]
    Setup(String),

    /// Validation error, raised before any request is made
    #[error("Validation error: {0}")]
    Validation(String),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(String),

    /// Parsing error
    #[error("Parsing error: {0}")]
    Parsing(String),
}

impl RouteClientError {
    /// Create a new setup error
    #[allow(clippy::needless_pass_by_value)]
    pub fn setup<T: ToString>(msg: T) -> Self {
        Self::Setup(msg.to_string())
    }

    /// Create a new validation error
    #[allow(clippy::needless_pass_by_value)]
    pub fn validation<T: ToString>(msg: T) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Create a new HTTP error
    #[allow(clippy::needless_pass_by_value)]
    pub fn http<T: ToString>(msg: T) -> Self {
        Self::Http(msg.to_string())
    }

    /// Create a new parsing error
    #[allow(clippy::needless_pass_by_value)]
    pub fn parsing<T: ToString>(msg: T) -> Self {
        Self::Parsing(msg.to_string())
    }
}

impl From<reqwest::Error> for RouteClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RouteClientError::parsing(e)
        } else {
            RouteClientError::http(e)
        }
    }
}

impl From<RouteClientError> for DiscoveryError {
    fn from(e: RouteClientError) -> Self {
        match e {
            RouteClientError::Validation(msg) => DiscoveryError::Validation(msg),
            RouteClientError::Parsing(msg) => DiscoveryError::Parse(msg),
            RouteClientError::Setup(msg) | RouteClientError::Http(msg) => DiscoveryError::Http(msg),
        }
    }
}

impl From<RouteClientError> for MetadataError {
    fn from(e: RouteClientError) -> Self {
        match e {
            RouteClientError::Parsing(msg) => MetadataError::Parse(msg),
            RouteClientError::Setup(msg)
            | RouteClientError::Validation(msg)
            | RouteClientError::Http(msg) => MetadataError::Http(msg),
        }
    }
}
