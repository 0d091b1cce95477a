//! Error types emitted at the boundaries of the swap executor's collaborators

use thiserror::Error;

use crate::types::{chain::ChainId, route::RouteId};

// ---------
// | Units |
// ---------

/// An error converting between decimal and smallest-unit amounts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitsError {
    /// The amount is empty or not a number
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    /// The amount is zero or negative
    #[error("amount must be greater than zero: {0}")]
    NonPositive(String),
    /// The amount has more fractional digits than the token supports
    #[error("amount {amount} has more than {decimals} decimal places")]
    TooManyDecimals {
        /// The offending amount
        amount: String,
        /// The token's decimals
        decimals: u8,
    },
    /// The amount does not fit in 256 bits
    #[error("amount overflows 256 bits: {0}")]
    Overflow(String),
}

// -------------
// | Discovery |
// -------------

/// An error returned by a route discovery client
#[derive(Debug, Clone, Error)]
pub enum DiscoveryError {
    /// The intent failed validation; no request was made
    #[error("invalid swap intent: {0}")]
    Validation(String),
    /// The routing service could not be reached or rejected the request
    #[error("route discovery failed: {0}")]
    Http(String),
    /// The routing service's response could not be parsed
    #[error("failed to parse routes: {0}")]
    Parse(String),
}

impl DiscoveryError {
    /// Create a new validation error
    #[allow(clippy::needless_pass_by_value)]
    pub fn validation<T: ToString>(e: T) -> Self {
        DiscoveryError::Validation(e.to_string())
    }

    /// Create a new http error
    #[allow(clippy::needless_pass_by_value)]
    pub fn http<T: ToString>(e: T) -> Self {
        DiscoveryError::Http(e.to_string())
    }

    /// Create a new parse error
    #[allow(clippy::needless_pass_by_value)]
    pub fn parse<T: ToString>(e: T) -> Self {
        DiscoveryError::Parse(e.to_string())
    }
}

impl From<UnitsError> for DiscoveryError {
    fn from(e: UnitsError) -> Self {
        DiscoveryError::validation(e)
    }
}

/// An error returned by a chain/token metadata source
#[derive(Debug, Clone, Error)]
pub enum MetadataError {
    /// The metadata service could not be reached or rejected the request
    #[error("metadata request failed: {0}")]
    Http(String),
    /// The metadata service's response could not be parsed
    #[error("failed to parse metadata: {0}")]
    Parse(String),
}

impl MetadataError {
    /// Create a new http error
    #[allow(clippy::needless_pass_by_value)]
    pub fn http<T: ToString>(e: T) -> Self {
        MetadataError::Http(e.to_string())
    }

    /// Create a new parse error
    #[allow(clippy::needless_pass_by_value)]
    pub fn parse<T: ToString>(e: T) -> Self {
        MetadataError::Parse(e.to_string())
    }
}

// -------------
// | Execution |
// -------------

/// An error returned by the execution engine
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The route's execution was halted before it finished
    #[error("execution of route {0} was halted")]
    Halted(RouteId),
    /// The engine does not know the route
    #[error("route {0} is not tracked by the engine")]
    UnknownRoute(RouteId),
    /// Execution failed
    #[error("{0}")]
    Execution(String),
}

impl EngineError {
    /// Create a new execution error
    #[allow(clippy::needless_pass_by_value)]
    pub fn execution<T: ToString>(e: T) -> Self {
        EngineError::Execution(e.to_string())
    }
}

/// An error returned by one of the execution hooks to the engine, which is
/// expected to fail the step that invoked it
#[derive(Debug, Clone, Error)]
pub enum HookError {
    /// The hook's route is no longer the tracked route
    #[error("route {0} is no longer active")]
    RouteInactive(RouteId),
    /// The wallet failed to switch networks
    #[error("network switch failed: {0}")]
    Switch(#[from] SwitchError),
    /// The transaction request could not be prepared
    #[error("transaction request rejected: {0}")]
    TransactionRequest(String),
}

impl HookError {
    /// Create a new transaction request error
    #[allow(clippy::needless_pass_by_value)]
    pub fn transaction_request<T: ToString>(e: T) -> Self {
        HookError::TransactionRequest(e.to_string())
    }
}

// ----------
// | Wallet |
// ----------

/// An error switching the connected wallet's network
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwitchError {
    /// The user rejected the switch
    #[error("user rejected the switch to chain {0}")]
    Rejected(ChainId),
    /// The wallet cannot switch to the requested network
    #[error("chain {0} is not supported by the wallet")]
    UnsupportedNetwork(ChainId),
    /// Any other wallet failure
    #[error("{0}")]
    Wallet(String),
}

impl SwitchError {
    /// Create a new wallet error
    #[allow(clippy::needless_pass_by_value)]
    pub fn wallet<T: ToString>(e: T) -> Self {
        SwitchError::Wallet(e.to_string())
    }
}
