//! The execution orchestrator: owns the lifecycle of the single tracked
//! route and wires the execution engine's hooks back into the session
//!
//! The orchestrator never mutates session state itself. Every state change
//! is reported through an [`ExecutionListener`]; payloads delivered by hooks
//! are reported while the orchestrator's lock is held, so a concurrent `stop`
//! cannot interleave between a hook's staleness check and its notification

use std::{fmt::Display, sync::Arc};

use async_trait::async_trait;
use swap_executor_api::{
    errors::EngineError,
    execution::ExecutionSettings,
    interfaces::{ConfirmationPrompt, ExecutionEngine, ExecutionHooks, WalletProvider},
    progress::ProgressRecord,
    route::{Route, RouteId},
};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::SessionError,
    metrics::{
        record_execution_completed, record_execution_failed, record_execution_started,
        record_execution_stopped, record_stale_hook_payload,
    },
    progress::{aggregate_progress, RouteNetworks},
};

pub mod hooks;

use hooks::{PassThrough, RouteHooks, TransactionPolicy};

// -------------
// | Constants |
// -------------

/// The error message emitted when the wallet is not connected
const ERR_WALLET_NOT_CONNECTED: &str = "Wallet not connected";
/// The error message emitted when the wallet has no address
const ERR_NO_SENDER_ADDRESS: &str = "No sender address available";
/// The error message emitted when a route has no steps
const ERR_EMPTY_ROUTE: &str = "Route has no steps";

/// The hook name used when recording stale progress payloads
const UPDATE_ROUTE_HOOK: &str = "update_route";

// ---------
// | Types |
// ---------

/// The execution status of the tracked route
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ExecutionStatus {
    /// No route is tracked
    #[default]
    Idle,
    /// The route is executing in the foreground
    Executing,
    /// The route was moved to the background
    Paused,
    /// Every step reached `DONE` or `FAILED`
    Completed,
    /// The engine failed to start or resume the route
    Failed,
    /// The route was stopped by the user
    Stopped,
}

impl ExecutionStatus {
    /// Whether no further transition is possible for the route instance
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionStatus::Completed | ExecutionStatus::Stopped)
    }
}

impl Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Idle => write!(f, "IDLE"),
            ExecutionStatus::Executing => write!(f, "EXECUTING"),
            ExecutionStatus::Paused => write!(f, "PAUSED"),
            ExecutionStatus::Completed => write!(f, "COMPLETED"),
            ExecutionStatus::Failed => write!(f, "FAILED"),
            ExecutionStatus::Stopped => write!(f, "STOPPED"),
        }
    }
}

/// A state change of the tracked route, reported to the session
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionEvent {
    /// A route became the tracked route, by starting or by recovery
    RouteActivated {
        /// The route's current snapshot
        route: Route,
        /// The route's progress record
        progress: ProgressRecord,
        /// The route's status
        status: ExecutionStatus,
    },
    /// The engine delivered a new snapshot of the tracked route
    RouteUpdated {
        /// The route's current snapshot
        route: Route,
        /// The recomputed progress record
        progress: ProgressRecord,
        /// The route's status after the update
        status: ExecutionStatus,
    },
    /// The tracked route's status changed without a new snapshot
    StatusChanged {
        /// The route whose status changed
        route_id: RouteId,
        /// The new status
        status: ExecutionStatus,
    },
    /// The tracked route was forgotten
    RouteCleared {
        /// The route that was cleared
        route_id: RouteId,
        /// The status the orchestrator was left in
        status: ExecutionStatus,
    },
}

/// Receives the orchestrator's state changes
#[async_trait]
pub trait ExecutionListener: Send + Sync {
    /// Handle a state change
    async fn on_event(&self, event: ExecutionEvent);
}

/// The orchestrator's mutable state
#[derive(Debug, Default)]
struct OrchestratorState {
    /// The status of the tracked route
    status: ExecutionStatus,
    /// The id of the tracked route
    active_route_id: Option<RouteId>,
    /// The networks progress is attributed to
    networks: Option<RouteNetworks>,
    /// The latest snapshot of the tracked route
    last_route: Option<Route>,
    /// Whether the active-route registry has been queried
    recovery_attempted: bool,
}

impl OrchestratorState {
    /// Whether the given route is the tracked route
    fn tracks(&self, route_id: &RouteId) -> bool {
        self.active_route_id.as_ref() == Some(route_id)
    }

    /// Track a route in the given status
    fn activate(&mut self, route: &Route, status: ExecutionStatus) -> RouteNetworks {
        let networks = RouteNetworks::of_route(route);
        self.status = status;
        self.active_route_id = Some(route.id.clone());
        self.networks = Some(networks);
        self.last_route = Some(route.clone());
        networks
    }

    /// Forget the tracked route, leaving the given status
    fn clear(&mut self, status: ExecutionStatus) -> Option<Route> {
        self.status = status;
        self.active_route_id = None;
        self.networks = None;
        self.last_route.take()
    }
}

/// The state and collaborators shared between the orchestrator and the hooks
/// it hands to the engine
pub(crate) struct OrchestratorInner {
    /// The orchestrator's state
    state: Mutex<OrchestratorState>,
    /// The execution engine, also the active-route registry
    engine: Arc<dyn ExecutionEngine>,
    /// The connected wallet
    wallet: Arc<dyn WalletProvider>,
    /// The prompt used to confirm exchange rate changes
    prompt: Arc<dyn ConfirmationPrompt>,
    /// The policy applied to transaction requests before signing
    policy: Arc<dyn TransactionPolicy>,
    /// The receiver of state changes
    listener: Arc<dyn ExecutionListener>,
}

impl OrchestratorInner {
    /// Whether the given route is still the tracked route
    async fn is_tracking(&self, route_id: &RouteId) -> bool {
        self.state.lock().await.tracks(route_id)
    }

    /// Apply a route snapshot delivered for the given route
    ///
    /// Snapshots for a route that is no longer tracked are dropped
    async fn apply_route_update(&self, route_id: &RouteId, route: Route) {
        let mut state = self.state.lock().await;
        if route.id != *route_id || !state.tracks(route_id) {
            debug!(route_id = %route_id.short(), "dropping update for untracked route");
            record_stale_hook_payload(UPDATE_ROUTE_HOOK);
            return;
        }

        if let Some(previous) = state.last_route.as_ref() {
            warn_on_regressions(previous, &route);
        }

        let networks = state.networks.unwrap_or_else(|| RouteNetworks::of_route(&route));
        let progress = aggregate_progress(&route, &networks);
        if route.is_execution_complete() && state.status != ExecutionStatus::Completed {
            info!(route_id = %route.id.short(), "route execution completed");
            if route.has_failed_steps() {
                warn!(route_id = %route.id.short(), "route completed with failed steps");
            }

            state.status = ExecutionStatus::Completed;
            record_execution_completed(&route);
        }

        state.last_route = Some(route.clone());
        let status = state.status;
        self.listener.on_event(ExecutionEvent::RouteUpdated { route, progress, status }).await;
    }

    /// Record an engine failure for the given route, if it is still tracked
    async fn mark_failed(&self, route_id: &RouteId) {
        let mut state = self.state.lock().await;
        if !state.tracks(route_id) || state.status == ExecutionStatus::Completed {
            return;
        }

        state.status = ExecutionStatus::Failed;
        if let Some(route) = state.last_route.as_ref() {
            record_execution_failed(route);
        }

        let event =
            ExecutionEvent::StatusChanged { route_id: route_id.clone(), status: state.status };
        self.listener.on_event(event).await;
    }

    /// Restore the status a route had before a failed resume
    async fn restore_status(&self, route_id: &RouteId, status: ExecutionStatus) {
        let mut state = self.state.lock().await;
        if !state.tracks(route_id) || state.status == ExecutionStatus::Completed {
            return;
        }

        state.status = status;
        let event = ExecutionEvent::StatusChanged { route_id: route_id.clone(), status };
        self.listener.on_event(event).await;
    }
}

/// Warn about processes whose status moved backwards between two snapshots
fn warn_on_regressions(previous: &Route, next: &Route) {
    for (idx, (prev_step, next_step)) in previous.steps.iter().zip(next.steps.iter()).enumerate() {
        let (Some(prev_exec), Some(next_exec)) = (&prev_step.execution, &next_step.execution)
        else {
            continue;
        };

        for (prev, next) in prev_exec.process.iter().zip(next_exec.process.iter()) {
            if !prev.status.can_transition_to(next.status) {
                warn!(
                    step = idx,
                    process = %prev.process_type,
                    "process status regressed from {} to {}",
                    prev.status,
                    next.status,
                );
            }
        }
    }
}

// ----------------
// | Orchestrator |
// ----------------

/// Drives the single tracked route through the execution engine
#[derive(Clone)]
pub struct ExecutionOrchestrator {
    /// The shared state and collaborators
    inner: Arc<OrchestratorInner>,
}

impl ExecutionOrchestrator {
    /// Create an orchestrator that passes transaction requests through
    /// unchanged
    pub fn new(
        engine: Arc<dyn ExecutionEngine>,
        wallet: Arc<dyn WalletProvider>,
        prompt: Arc<dyn ConfirmationPrompt>,
        listener: Arc<dyn ExecutionListener>,
    ) -> Self {
        Self::with_policy(engine, wallet, prompt, Arc::new(PassThrough), listener)
    }

    /// Create an orchestrator with a custom transaction policy
    pub fn with_policy(
        engine: Arc<dyn ExecutionEngine>,
        wallet: Arc<dyn WalletProvider>,
        prompt: Arc<dyn ConfirmationPrompt>,
        policy: Arc<dyn TransactionPolicy>,
        listener: Arc<dyn ExecutionListener>,
    ) -> Self {
        let inner = OrchestratorInner {
            state: Mutex::new(OrchestratorState::default()),
            engine,
            wallet,
            prompt,
            policy,
            listener,
        };

        Self { inner: Arc::new(inner) }
    }

    /// The status of the tracked route
    pub async fn status(&self) -> ExecutionStatus {
        self.inner.state.lock().await.status
    }

    /// The id of the tracked route
    pub async fn active_route_id(&self) -> Option<RouteId> {
        self.inner.state.lock().await.active_route_id.clone()
    }

    /// The latest snapshot of the tracked route
    pub async fn active_route(&self) -> Option<Route> {
        let state = self.inner.state.lock().await;
        state.active_route_id.as_ref().and(state.last_route.clone())
    }

    /// Build the hook set bound to a route
    fn hooks_for(&self, route_id: &RouteId) -> Arc<dyn ExecutionHooks> {
        Arc::new(RouteHooks::new(route_id.clone(), self.inner.clone()))
    }

    /// Start executing a route, resolving once the engine finishes with it
    ///
    /// Returns `None` if the engine failed after the route stopped being
    /// tracked, e.g. because it was stopped mid-flight
    #[instrument(skip_all, fields(route_id = %route.id.short()))]
    pub async fn start(&self, route: Route) -> Result<Option<Route>, SessionError> {
        if !self.inner.wallet.is_connected() {
            return Err(SessionError::validation(ERR_WALLET_NOT_CONNECTED));
        }
        if self.inner.wallet.current_address().is_none() {
            return Err(SessionError::validation(ERR_NO_SENDER_ADDRESS));
        }
        if route.steps.is_empty() {
            return Err(SessionError::validation(ERR_EMPTY_ROUTE));
        }

        {
            let mut state = self.inner.state.lock().await;
            if let Some(previous) = state.active_route_id.as_ref() {
                if !state.status.is_terminal() && *previous != route.id {
                    warn!(previous = %previous.short(), "replacing a route that is still tracked");
                }
            }

            let networks = state.activate(&route, ExecutionStatus::Executing);
            let progress = aggregate_progress(&route, &networks);
            let event = ExecutionEvent::RouteActivated {
                route: route.clone(),
                progress,
                status: ExecutionStatus::Executing,
            };
            self.inner.listener.on_event(event).await;
        }

        info!("starting route execution");
        record_execution_started(&route);

        let route_id = route.id.clone();
        let hooks = self.hooks_for(&route_id);
        let res =
            self.inner.engine.start_execution(route, hooks, ExecutionSettings::foreground()).await;
        self.finish_execution(&route_id, res).await
    }

    /// Resume executing the tracked route
    ///
    /// Allowed while executing (to re-attach hooks after recovery), paused or
    /// failed. On engine error the previous status is restored
    #[instrument(skip_all, fields(route_id = %route.id.short()))]
    pub async fn resume(&self, route: &Route) -> Result<Option<Route>, SessionError> {
        let (previous, snapshot) = {
            let mut state = self.inner.state.lock().await;
            if !state.tracks(&route.id) {
                return Err(SessionError::NoActiveRoute);
            }

            let previous = state.status;
            match previous {
                ExecutionStatus::Executing | ExecutionStatus::Paused | ExecutionStatus::Failed => {},
                other => {
                    return Err(SessionError::invalid_transition(format!(
                        "cannot resume a route in status {other}"
                    )));
                },
            }

            state.status = ExecutionStatus::Executing;
            let event = ExecutionEvent::StatusChanged {
                route_id: route.id.clone(),
                status: ExecutionStatus::Executing,
            };
            self.inner.listener.on_event(event).await;

            let snapshot = state.last_route.clone().unwrap_or_else(|| route.clone());
            (previous, snapshot)
        };

        info!("resuming route execution from {previous}");
        let hooks = self.hooks_for(&route.id);
        let res = self
            .inner
            .engine
            .resume_execution(snapshot, hooks, ExecutionSettings::foreground())
            .await;

        match res {
            Ok(final_route) => self.finish_execution(&route.id, Ok(final_route)).await,
            Err(e) => {
                warn!("failed to resume route execution: {e}");
                if !self.inner.is_tracking(&route.id).await {
                    return Ok(None);
                }

                self.inner.restore_status(&route.id, previous).await;
                Err(e.into())
            },
        }
    }

    /// Apply the engine's final result for a route
    async fn finish_execution(
        &self,
        route_id: &RouteId,
        res: Result<Route, EngineError>,
    ) -> Result<Option<Route>, SessionError> {
        match res {
            Ok(final_route) => {
                // The engine may return a snapshot it never published
                self.inner.apply_route_update(route_id, final_route.clone()).await;
                Ok(Some(final_route))
            },
            Err(e) => {
                if !self.inner.is_tracking(route_id).await {
                    debug!("engine returned after the route was cleared: {e}");
                    return Ok(None);
                }

                warn!("route execution failed: {e}");
                self.inner.mark_failed(route_id).await;
                Err(e.into())
            },
        }
    }

    /// Stop the tracked route
    ///
    /// The route is cleared even if the engine fails to halt it; the halt
    /// error is returned afterwards. Stopping an untracked route is a no-op
    #[instrument(skip_all, fields(route_id = %route.id.short()))]
    pub async fn stop(&self, route: &Route) -> Result<(), SessionError> {
        {
            let mut state = self.inner.state.lock().await;
            if !state.tracks(&route.id) {
                debug!("route is not tracked, nothing to stop");
                return Ok(());
            }

            let last_route = state.clear(ExecutionStatus::Stopped);
            record_execution_stopped(last_route.as_ref().unwrap_or(route));

            let event = ExecutionEvent::RouteCleared {
                route_id: route.id.clone(),
                status: ExecutionStatus::Stopped,
            };
            self.inner.listener.on_event(event).await;
        }

        info!("stopped route execution");
        self.inner.engine.halt_execution(&route.id).map_err(|e| {
            warn!("engine failed to halt route: {e}");
            SessionError::from(e)
        })
    }

    /// Move the tracked route to the background
    ///
    /// In-flight transactions are unaffected; the engine continues without
    /// requiring foreground confirmation. Backgrounding a paused route is a
    /// no-op
    #[instrument(skip_all, fields(route_id = %route.id.short()))]
    pub async fn move_to_background(&self, route: &Route) -> Result<(), SessionError> {
        let mut state = self.inner.state.lock().await;
        if !state.tracks(&route.id) {
            return Err(SessionError::NoActiveRoute);
        }

        match state.status {
            ExecutionStatus::Executing => {},
            ExecutionStatus::Paused => return Ok(()),
            other => {
                return Err(SessionError::invalid_transition(format!(
                    "cannot background a route in status {other}"
                )));
            },
        }

        self.inner.engine.reconfigure_execution(&route.id, ExecutionSettings::background())?;
        state.status = ExecutionStatus::Paused;
        info!("moved route execution to the background");

        let event =
            ExecutionEvent::StatusChanged { route_id: route.id.clone(), status: state.status };
        self.inner.listener.on_event(event).await;
        Ok(())
    }

    /// Adopt a route the engine is still executing, e.g. after a restart
    ///
    /// The registry is queried at most once per orchestrator. The first
    /// active route is adopted without calling the engine again; the ids of
    /// any further active routes are returned
    #[instrument(skip_all)]
    pub async fn recover(&self) -> Vec<RouteId> {
        let mut state = self.inner.state.lock().await;
        if state.recovery_attempted {
            return Vec::new();
        }
        state.recovery_attempted = true;

        let mut routes = self.inner.engine.list_active_routes().into_iter();
        if state.active_route_id.is_some() {
            warn!("a route is already tracked, not adopting active routes");
            return routes.map(|route| route.id).collect();
        }

        let Some(route) = routes.next() else {
            debug!("no active routes to recover");
            return Vec::new();
        };

        let untracked: Vec<RouteId> = routes.map(|route| route.id).collect();
        if !untracked.is_empty() {
            warn!("{} further active routes were not adopted", untracked.len());
        }

        let status = if route.is_execution_complete() {
            ExecutionStatus::Completed
        } else {
            ExecutionStatus::Executing
        };
        info!(route_id = %route.id.short(), "recovered active route in status {status}");

        let networks = state.activate(&route, status);
        let progress = aggregate_progress(&route, &networks);
        let event = ExecutionEvent::RouteActivated { route, progress, status };
        self.inner.listener.on_event(event).await;

        untracked
    }

    /// Forget the tracked route without halting the engine
    pub async fn detach(&self) {
        let mut state = self.inner.state.lock().await;
        let Some(route_id) = state.active_route_id.clone() else {
            state.status = ExecutionStatus::Idle;
            return;
        };

        debug!(route_id = %route_id.short(), "detaching from route");
        state.clear(ExecutionStatus::Idle);
        let event = ExecutionEvent::RouteCleared { route_id, status: ExecutionStatus::Idle };
        self.inner.listener.on_event(event).await;
    }
}
