//! The hook set handed to the execution engine for a single route

use std::sync::Arc;

use async_trait::async_trait;
use swap_executor_api::{
    chain::ChainId,
    errors::HookError,
    execution::{ExchangeRateUpdate, TransactionRequest},
    interfaces::ExecutionHooks,
    route::{Route, RouteId},
    units::format_amount,
};
use tracing::{debug, info, warn};

use super::OrchestratorInner;
use crate::metrics::record_stale_hook_payload;

/// The hook name used when recording stale transaction requests
const TRANSACTION_REQUEST_HOOK: &str = "update_transaction_request";
/// The hook name used when recording stale exchange rate updates
const EXCHANGE_RATE_HOOK: &str = "accept_exchange_rate_update";
/// The hook name used when recording stale network switch requests
const SWITCH_CHAIN_HOOK: &str = "switch_chain";

// ----------------------
// | Transaction Policy |
// ----------------------

/// Mutates transaction requests before the engine signs them
#[async_trait]
pub trait TransactionPolicy: Send + Sync {
    /// Apply the policy to a request
    async fn apply(&self, request: TransactionRequest) -> Result<TransactionRequest, HookError>;
}

/// Leaves transaction requests unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

#[async_trait]
impl TransactionPolicy for PassThrough {
    async fn apply(&self, request: TransactionRequest) -> Result<TransactionRequest, HookError> {
        Ok(request)
    }
}

// ---------
// | Hooks |
// ---------

/// Hooks bound to the route they were created for
///
/// Every hook first checks that its route is still the tracked route, so
/// payloads for a stopped or replaced route never reach the session
pub(crate) struct RouteHooks {
    /// The route the hooks were created for
    route_id: RouteId,
    /// The orchestrator's shared state and collaborators
    inner: Arc<OrchestratorInner>,
}

impl RouteHooks {
    /// Create the hooks of a route
    pub(crate) fn new(route_id: RouteId, inner: Arc<OrchestratorInner>) -> Self {
        Self { route_id, inner }
    }

    /// Whether the hooks' route is still tracked, recording a stale payload
    /// for the given hook if not
    async fn check_tracked(&self, hook: &str) -> bool {
        let tracked = self.inner.is_tracking(&self.route_id).await;
        if !tracked {
            debug!(route_id = %self.route_id.short(), hook, "ignoring hook for untracked route");
            record_stale_hook_payload(hook);
        }

        tracked
    }
}

#[async_trait]
impl ExecutionHooks for RouteHooks {
    async fn update_route(&self, route: Route) {
        self.inner.apply_route_update(&self.route_id, route).await;
    }

    async fn update_transaction_request(
        &self,
        request: TransactionRequest,
    ) -> Result<TransactionRequest, HookError> {
        if !self.check_tracked(TRANSACTION_REQUEST_HOOK).await {
            return Err(HookError::RouteInactive(self.route_id.clone()));
        }

        self.inner.policy.apply(request).await
    }

    async fn accept_exchange_rate_update(&self, update: ExchangeRateUpdate) -> bool {
        if !self.check_tracked(EXCHANGE_RATE_HOOK).await {
            return false;
        }

        let message = exchange_rate_message(&update);
        let accepted = self.inner.prompt.confirm(&message).await;
        info!(route_id = %self.route_id.short(), accepted, "exchange rate update answered");
        accepted
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), HookError> {
        if !self.check_tracked(SWITCH_CHAIN_HOOK).await {
            return Err(HookError::RouteInactive(self.route_id.clone()));
        }

        if !self.inner.wallet.supports_network_switch() {
            debug!(chain_id, "wallet cannot switch networks, skipping");
            return Ok(());
        }

        self.inner.wallet.switch_network(chain_id).await.map_err(|e| {
            warn!(chain_id, "network switch failed: {e}");
            HookError::from(e)
        })
    }
}

/// The prompt shown when the realizable output of a route drifts from its
/// quote
pub fn exchange_rate_message(update: &ExchangeRateUpdate) -> String {
    let symbol = &update.to_token.symbol;
    let decimals = update.to_token.decimals;
    let old_amount = format_amount(update.old_to_amount, decimals);
    let new_amount = format_amount(update.new_to_amount, decimals);

    format!(
        "Exchange rate has changed!\nOld amount: {old_amount} {symbol}\nNew amount: {new_amount} \
         {symbol}\n\nDo you want to continue?"
    )
}
