//! The swap session controller: composes route discovery, the orchestrator
//! and the collaborator interfaces into the user-facing swap workflow
//!
//! The controller is the only writer of form and route state; execution
//! state arrives through the orchestrator's listener. The session lock is
//! never held across a call into the orchestrator

use std::sync::Arc;

use swap_executor_api::{
    chain::{Chain, ChainId, Token},
    intent::SwapIntent,
    interfaces::{
        ConfirmationPrompt, ExecutionEngine, MetadataSource, RouteDiscovery, WalletProvider,
    },
    route::Route,
};
use tracing::{info, instrument, warn};

use crate::{
    error::SessionError,
    metrics::record_routes_discovered,
    orchestrator::{
        hooks::{PassThrough, TransactionPolicy},
        ExecutionListener, ExecutionOrchestrator, ExecutionStatus,
    },
};

pub mod state;

use state::{SessionStateHandle, SwapSessionState};

// -------------
// | Constants |
// -------------

/// The error message emitted when the intent is incomplete
pub const ERR_MISSING_FIELDS: &str = "Please fill in all required fields and connect wallet";
/// The error message emitted when discovery returns no routes
pub const ERR_NO_ROUTES: &str = "No routes found";
/// The error message emitted when executing without a route or wallet
pub const ERR_NO_ROUTE_SELECTED: &str = "No route selected or wallet not connected";
/// The error message emitted when executing while a route is running
pub const ERR_ROUTE_ALREADY_EXECUTING: &str = "A route is already executing";
/// The error message emitted when stopping fails
pub const ERR_STOP_FAILED: &str = "Failed to stop route execution";
/// The error message emitted when backgrounding fails
pub const ERR_BACKGROUND_FAILED: &str = "Failed to move route to background";
/// The error message emitted when networks cannot be fetched
pub const ERR_FETCH_CHAINS: &str = "Failed to fetch available chains";
/// The error message emitted when tokens cannot be fetched
pub const ERR_FETCH_TOKENS: &str = "Failed to fetch available tokens";

// -----------
// | Session |
// -----------

/// A single user's swap session
#[derive(Clone)]
pub struct SwapSession {
    /// The session state
    state: SessionStateHandle,
    /// The orchestrator driving the active route
    orchestrator: ExecutionOrchestrator,
    /// The route discovery client
    discovery: Arc<dyn RouteDiscovery>,
    /// The network and token metadata source
    metadata: Arc<dyn MetadataSource>,
    /// The connected wallet
    wallet: Arc<dyn WalletProvider>,
}

impl SwapSession {
    /// Create a session whose transaction requests pass through unchanged
    pub fn new(
        discovery: Arc<dyn RouteDiscovery>,
        metadata: Arc<dyn MetadataSource>,
        engine: Arc<dyn ExecutionEngine>,
        wallet: Arc<dyn WalletProvider>,
        prompt: Arc<dyn ConfirmationPrompt>,
    ) -> Self {
        let policy = Arc::new(PassThrough);
        Self::with_transaction_policy(discovery, metadata, engine, wallet, prompt, policy)
    }

    /// Create a session with a custom transaction policy
    pub fn with_transaction_policy(
        discovery: Arc<dyn RouteDiscovery>,
        metadata: Arc<dyn MetadataSource>,
        engine: Arc<dyn ExecutionEngine>,
        wallet: Arc<dyn WalletProvider>,
        prompt: Arc<dyn ConfirmationPrompt>,
        policy: Arc<dyn TransactionPolicy>,
    ) -> Self {
        let state = SessionStateHandle::default();
        let listener: Arc<dyn ExecutionListener> = Arc::new(state.clone());
        let orchestrator =
            ExecutionOrchestrator::with_policy(engine, wallet.clone(), prompt, policy, listener);

        Self { state, orchestrator, discovery, metadata, wallet }
    }

    /// A copy of the current state
    pub async fn state(&self) -> SwapSessionState {
        self.state.snapshot().await
    }

    /// The orchestrator driving the active route
    pub fn orchestrator(&self) -> &ExecutionOrchestrator {
        &self.orchestrator
    }

    /// Record an error and hand it back
    async fn fail<T: ToString>(&self, message: T, err: SessionError) -> SessionError {
        let mut state = self.state.write().await;
        state.is_loading = false;
        state.set_error(message);
        err
    }

    // ------------------
    // | Initialization |
    // ------------------

    /// Adopt a route the engine is still executing, if any
    #[instrument(skip_all)]
    pub async fn initialize(&self) {
        let untracked = self.orchestrator.recover().await;
        if !untracked.is_empty() {
            self.state.write().await.untracked_active_routes = untracked;
        }
    }

    /// Fetch the supported networks, defaulting the source and destination
    /// to the first two
    #[instrument(skip_all)]
    pub async fn load_networks(&self) -> Result<Vec<Chain>, SessionError> {
        let networks = match self.metadata.list_networks().await {
            Ok(networks) => networks,
            Err(e) => {
                warn!("failed to fetch networks: {e}");
                return Err(self.fail(ERR_FETCH_CHAINS, e.into()).await);
            },
        };

        let mut state = self.state.write().await;
        if let [first, second, ..] = networks.as_slice() {
            if state.from_network.is_none() && state.to_network.is_none() {
                state.from_network = Some(first.id);
                state.to_network = Some(second.id);
            }
        }

        state.networks = networks.clone();
        Ok(networks)
    }

    /// Fetch the token lists of the selected networks, defaulting each token
    /// to the first of its list
    #[instrument(skip_all)]
    pub async fn load_tokens(&self) -> Result<(), SessionError> {
        let (from_network, to_network) = {
            let state = self.state.read().await;
            (state.from_network, state.to_network)
        };
        let (Some(from_network), Some(to_network)) = (from_network, to_network) else {
            return Ok(());
        };

        let res = tokio::try_join!(
            self.metadata.list_tokens(from_network),
            self.metadata.list_tokens(to_network),
        );
        let (from_tokens, to_tokens) = match res {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!("failed to fetch tokens: {e}");
                return Err(self.fail(ERR_FETCH_TOKENS, e.into()).await);
            },
        };

        let mut state = self.state.write().await;
        if state.from_network == Some(from_network) {
            state.from_token = from_tokens.first().cloned();
            state.from_tokens = from_tokens;
        }
        if state.to_network == Some(to_network) {
            state.to_token = to_tokens.first().cloned();
            state.to_tokens = to_tokens;
        }

        Ok(())
    }

    // ----------------
    // | Form Setters |
    // ----------------

    /// Select the source network, clearing the source token
    pub async fn set_from_network(&self, chain_id: ChainId) {
        let mut state = self.state.write().await;
        if state.from_network != Some(chain_id) {
            state.from_network = Some(chain_id);
            state.from_token = None;
            state.from_tokens.clear();
        }
    }

    /// Select the destination network, clearing the destination token
    pub async fn set_to_network(&self, chain_id: ChainId) {
        let mut state = self.state.write().await;
        if state.to_network != Some(chain_id) {
            state.to_network = Some(chain_id);
            state.to_token = None;
            state.to_tokens.clear();
        }
    }

    /// Select the source token
    pub async fn set_from_token(&self, token: Token) {
        self.state.write().await.from_token = Some(token);
    }

    /// Select the destination token
    pub async fn set_to_token(&self, token: Token) {
        self.state.write().await.to_token = Some(token);
    }

    /// Set the decimal amount to swap
    pub async fn set_amount(&self, amount: &str) {
        self.state.write().await.amount = amount.to_string();
    }

    /// Whether the intent is complete and a wallet is connected
    pub async fn is_form_valid(&self) -> bool {
        self.wallet.is_connected() && self.state.read().await.has_complete_intent()
    }

    /// Whether the selected route may be executed
    pub async fn can_execute(&self) -> bool {
        let state = self.state.read().await;
        self.wallet.is_connected() && state.selected_route.is_some() && !state.has_running_route()
    }

    // ----------
    // | Routes |
    // ----------

    /// Discover routes for the form's intent, selecting the first
    #[instrument(skip_all)]
    pub async fn request_routes(&self) -> Result<Vec<Route>, SessionError> {
        let (from_token, to_token, amount) = {
            let state = self.state.read().await;
            let from_token = state.from_token.clone().filter(|_| state.has_complete_intent());
            (from_token, state.to_token.clone(), state.amount.clone())
        };

        let sender = self.wallet.current_address().filter(|_| self.wallet.is_connected());
        let (Some(from_token), Some(to_token), Some(sender)) = (from_token, to_token, sender)
        else {
            let err = SessionError::validation(ERR_MISSING_FIELDS);
            return Err(self.fail(ERR_MISSING_FIELDS, err).await);
        };

        let intent =
            match SwapIntent::from_decimal_amount(&from_token, &to_token, &amount, sender, sender)
            {
                Ok(intent) => intent,
                Err(e) => {
                    let err = SessionError::from(e);
                    return Err(self.fail(&err, err.clone()).await);
                },
            };

        {
            let mut state = self.state.write().await;
            state.is_loading = true;
            state.error = None;
            state.last_intent = Some(intent.clone());
        }

        let res = self.discovery.discover_routes(&intent).await;
        let mut state = self.state.write().await;
        state.is_loading = false;
        match res {
            Ok(routes) if routes.is_empty() => {
                info!("no routes found");
                state.clear_routes();
                state.set_error(ERR_NO_ROUTES);
                Err(SessionError::discovery(ERR_NO_ROUTES))
            },
            Ok(routes) => {
                info!("selected cheapest of {} routes", routes.len());
                record_routes_discovered(intent.source_chain, routes.len());
                state.selected_route = routes.first().cloned();
                state.routes = routes.clone();
                Ok(routes)
            },
            Err(e) => {
                warn!("route discovery failed: {e}");
                let err = SessionError::from(e);
                state.clear_routes();
                state.set_error(&err);
                Err(err)
            },
        }
    }

    /// Select a route; the orchestrator is not involved
    pub async fn select_route(&self, route: Route) {
        self.state.write().await.selected_route = Some(route);
    }

    // -------------
    // | Execution |
    // -------------

    /// Execute the selected route, resolving once the engine finishes with
    /// it
    #[instrument(skip_all)]
    pub async fn execute_selected(&self) -> Result<Option<Route>, SessionError> {
        let route = {
            let mut state = self.state.write().await;
            if state.has_running_route() {
                state.set_error(ERR_ROUTE_ALREADY_EXECUTING);
                return Err(SessionError::validation(ERR_ROUTE_ALREADY_EXECUTING));
            }

            match state.selected_route.clone() {
                Some(route) if self.wallet.is_connected() => {
                    state.error = None;
                    route
                },
                _ => {
                    state.set_error(ERR_NO_ROUTE_SELECTED);
                    return Err(SessionError::validation(ERR_NO_ROUTE_SELECTED));
                },
            }
        };

        match self.orchestrator.start(route).await {
            Ok(route) => Ok(route),
            Err(e) => Err(self.fail(&e, e.clone()).await),
        }
    }

    /// Resume the active route; a no-op without one
    #[instrument(skip_all)]
    pub async fn resume(&self) -> Result<Option<Route>, SessionError> {
        let Some(route) = self.state.read().await.active_route.clone() else {
            return Ok(None);
        };

        match self.orchestrator.resume(&route).await {
            Ok(route) => Ok(route),
            Err(e) => Err(self.fail(&e, e.clone()).await),
        }
    }

    /// Stop the active route; a no-op without one
    ///
    /// The active route and its progress are cleared even if the engine
    /// fails to halt
    #[instrument(skip_all)]
    pub async fn stop(&self) -> Result<(), SessionError> {
        let Some(route) = self.state.read().await.active_route.clone() else {
            return Ok(());
        };

        let res = self.orchestrator.stop(&route).await;
        let mut state = self.state.write().await;
        state.clear_execution(ExecutionStatus::Stopped);
        if let Err(e) = res {
            state.set_error(ERR_STOP_FAILED);
            return Err(e);
        }

        Ok(())
    }

    /// Move the active route to the background; a no-op without one
    #[instrument(skip_all)]
    pub async fn move_to_background(&self) -> Result<(), SessionError> {
        let Some(route) = self.state.read().await.active_route.clone() else {
            return Ok(());
        };

        match self.orchestrator.move_to_background(&route).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail(ERR_BACKGROUND_FAILED, e).await),
        }
    }

    /// Clear routes, selection and execution state; the form is kept
    ///
    /// A route still executing in the engine is detached, not halted
    #[instrument(skip_all)]
    pub async fn reset(&self) {
        self.orchestrator.detach().await;

        let mut state = self.state.write().await;
        state.clear_routes();
        state.clear_execution(ExecutionStatus::Idle);
        state.last_intent = None;
        state.is_loading = false;
        state.error = None;
    }
}
