//! Interfaces of the external collaborators the swap executor drives
//!
//! The executor never talks to a routing service, a wallet or an execution
//! engine directly; it is handed implementations of these traits

use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;

use crate::{
    errors::{DiscoveryError, EngineError, HookError, MetadataError, SwitchError},
    types::{
        chain::{Chain, ChainId, Token},
        execution::{ExchangeRateUpdate, ExecutionSettings, TransactionRequest},
        intent::SwapIntent,
        route::{Route, RouteId},
    },
};

// -------------------
// | Routing Service |
// -------------------

/// Produces candidate routes for a swap intent
#[async_trait]
pub trait RouteDiscovery: Send + Sync {
    /// Discover routes for the intent, ordered by the client's configured
    /// selection policy; the result may be empty
    async fn discover_routes(&self, intent: &SwapIntent) -> Result<Vec<Route>, DiscoveryError>;
}

/// Lists the networks and tokens a swap intent may be built from
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// List the supported networks
    async fn list_networks(&self) -> Result<Vec<Chain>, MetadataError>;

    /// List the tokens available on a network
    async fn list_tokens(&self, chain_id: ChainId) -> Result<Vec<Token>, MetadataError>;
}

// ----------
// | Wallet |
// ----------

/// The connected wallet
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// The wallet's current address, if one is available
    fn current_address(&self) -> Option<Address>;

    /// Whether a wallet is connected
    fn is_connected(&self) -> bool;

    /// Whether the wallet can be asked to change networks
    fn supports_network_switch(&self) -> bool;

    /// Ask the wallet to switch to the given network
    async fn switch_network(&self, chain_id: ChainId) -> Result<(), SwitchError>;
}

/// A yes/no prompt shown to the user
#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    /// Show the message and resolve to the user's decision
    async fn confirm(&self, message: &str) -> bool;
}

// --------------------
// | Execution Engine |
// --------------------

/// Process-wide lookup of routes the execution engine is still tracking
pub trait ActiveRouteRegistry: Send + Sync {
    /// The routes currently under execution, in the engine's order
    fn list_active_routes(&self) -> Vec<Route>;
}

/// Callbacks the execution engine invokes while executing a route
///
/// Each hook fails independently; a failing hook is expected to fail the
/// step that invoked it
#[async_trait]
pub trait ExecutionHooks: Send + Sync {
    /// Deliver an updated snapshot of the executing route
    async fn update_route(&self, route: Route);

    /// Offer a transaction request for mutation before it is signed
    async fn update_transaction_request(
        &self,
        request: TransactionRequest,
    ) -> Result<TransactionRequest, HookError>;

    /// Ask whether a drifted exchange rate is acceptable
    async fn accept_exchange_rate_update(&self, update: ExchangeRateUpdate) -> bool;

    /// Ask for the wallet to be moved to the given network
    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), HookError>;
}

/// The external engine that signs, submits and tracks route execution
#[async_trait]
pub trait ExecutionEngine: ActiveRouteRegistry {
    /// Execute a route from the beginning, resolving once execution ends
    async fn start_execution(
        &self,
        route: Route,
        hooks: Arc<dyn ExecutionHooks>,
        settings: ExecutionSettings,
    ) -> Result<Route, EngineError>;

    /// Continue executing a previously started route
    async fn resume_execution(
        &self,
        route: Route,
        hooks: Arc<dyn ExecutionHooks>,
        settings: ExecutionSettings,
    ) -> Result<Route, EngineError>;

    /// Request that execution of a route halt; already-submitted
    /// transactions are unaffected
    fn halt_execution(&self, route_id: &RouteId) -> Result<(), EngineError>;

    /// Change the settings of an executing route
    fn reconfigure_execution(
        &self,
        route_id: &RouteId,
        settings: ExecutionSettings,
    ) -> Result<(), EngineError>;
}
