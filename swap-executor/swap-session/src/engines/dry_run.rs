//! An in-process execution engine that walks a route's steps without signing
//! or broadcasting anything
//!
//! Every process produces a placeholder transaction request which is offered
//! to the transaction hook; the hook's answer decides whether the process
//! succeeds

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use swap_executor_api::{
    chain::ChainId,
    errors::EngineError,
    execution::{ExchangeRateUpdate, ExecutionSettings, TransactionRequest},
    interfaces::{ActiveRouteRegistry, ExecutionEngine, ExecutionHooks},
    route::{Execution, Process, ProcessStatus, Route, RouteId, StepStatus},
};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

// -------------
// | Constants |
// -------------

/// The process type of a same-network step
const SWAP_PROCESS: &str = "SWAP";
/// The process type of the sending half of a cross-network step
const CROSS_CHAIN_PROCESS: &str = "CROSS_CHAIN";
/// The process type of the receiving half of a cross-network step
const RECEIVING_CHAIN_PROCESS: &str = "RECEIVING_CHAIN";
/// The process type recorded when the wallet cannot be moved to a step's
/// network
const SWITCH_CHAIN_PROCESS: &str = "SWITCH_CHAIN";

/// The denominator of a basis point fraction
const BPS_DENOMINATOR: u64 = 10_000;

/// The placeholder contract every simulated transaction is sent to
const PLACEHOLDER_TARGET: Address = Address::repeat_byte(0x11);

/// The error message emitted when a rate update is rejected
const ERR_RATE_REJECTED: &str = "Exchange rate update rejected";

// ----------
// | Config |
// ----------

/// The configuration of a dry-run engine
#[derive(Debug, Clone)]
pub struct DryRunConfig {
    /// The delay before each simulated process completes
    pub step_delay: Duration,
    /// The network the simulated wallet starts on
    pub initial_chain: Option<ChainId>,
    /// If set, the final step's output drifts down by this many basis
    /// points and the rate hook is consulted before it completes
    pub rate_drift_bps: Option<u32>,
}

impl Default for DryRunConfig {
    fn default() -> Self {
        Self { step_delay: Duration::from_millis(500), initial_chain: None, rate_drift_bps: None }
    }
}

// ----------
// | Engine |
// ----------

/// A route the engine is executing
#[derive(Debug, Clone)]
struct TrackedRoute {
    /// The latest snapshot of the route
    route: Route,
    /// The settings the route executes with
    settings: ExecutionSettings,
    /// Whether a halt was requested
    halted: bool,
    /// The outcome of the live walk over the route, if one is running
    running: Option<RunOutcome>,
}

/// A handle on the final result of a walk, set once the walk returns
type RunOutcome = watch::Receiver<Option<Result<Route, EngineError>>>;

/// The engine's mutable state
#[derive(Debug, Default)]
struct DryRunState {
    /// The network the simulated wallet is on
    current_chain: Option<ChainId>,
    /// The unfinished routes, in the order they were started
    routes: Vec<TrackedRoute>,
    /// The number of simulated transactions, used to derive placeholder hashes
    tx_count: u64,
}

impl DryRunState {
    /// The tracked entry of a route
    fn tracked_mut(&mut self, route_id: &RouteId) -> Option<&mut TrackedRoute> {
        self.routes.iter_mut().find(|tracked| tracked.route.id == *route_id)
    }
}

/// The outcome of a single simulated process
enum ProcessOutcome {
    /// The process succeeded with the given transaction hash
    Done(String),
    /// The process failed with the given reason
    Failed(String),
}

/// An execution engine that simulates execution in-process
pub struct DryRunEngine {
    /// The engine's configuration
    config: DryRunConfig,
    /// The engine's state
    state: Mutex<DryRunState>,
}

impl DryRunEngine {
    /// Create a new dry-run engine
    pub fn new(config: DryRunConfig) -> Self {
        let state = DryRunState { current_chain: config.initial_chain, ..Default::default() };
        Self { config, state: Mutex::new(state) }
    }

    /// Lock the engine's state
    fn state(&self) -> MutexGuard<'_, DryRunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Begin tracking a route, replacing any earlier entry for it
    fn track(&self, route: &Route, settings: ExecutionSettings, running: RunOutcome) {
        let mut state = self.state();
        state.routes.retain(|tracked| tracked.route.id != route.id);
        let tracked =
            TrackedRoute { route: route.clone(), settings, halted: false, running: Some(running) };
        state.routes.push(tracked);
    }

    /// Attach to a walk already running over a route, applying new settings
    /// to it
    fn attach(&self, route_id: &RouteId, settings: ExecutionSettings) -> Option<RunOutcome> {
        let mut state = self.state();
        let tracked = state.tracked_mut(route_id)?;
        let running = tracked.running.clone()?;

        tracked.settings = settings;
        Some(running)
    }

    /// Stop tracking a route
    fn untrack(&self, route_id: &RouteId) {
        self.state().routes.retain(|tracked| tracked.route.id != *route_id);
    }

    /// Fail if a halt was requested for the route, untracking it
    fn check_halted(&self, route_id: &RouteId) -> Result<(), EngineError> {
        let mut state = self.state();
        let halted = state.tracked_mut(route_id).map_or(true, |tracked| tracked.halted);
        if halted {
            state.routes.retain(|tracked| tracked.route.id != *route_id);
            return Err(EngineError::Halted(route_id.clone()));
        }

        Ok(())
    }

    /// Whether a route is executing in the background
    fn is_background(&self, route_id: &RouteId) -> bool {
        let mut state = self.state();
        state.tracked_mut(route_id).is_some_and(|tracked| tracked.settings.execute_in_background)
    }

    /// Record a snapshot and deliver it to the progress hook
    async fn publish(&self, route: &Route, hooks: &Arc<dyn ExecutionHooks>) {
        {
            let mut state = self.state();
            if let Some(tracked) = state.tracked_mut(&route.id) {
                tracked.route = route.clone();
            }
        }

        hooks.update_route(route.clone()).await;
    }

    /// Ask for the wallet to be moved to a network if it is elsewhere
    async fn ensure_chain(
        &self,
        chain_id: ChainId,
        hooks: &Arc<dyn ExecutionHooks>,
    ) -> Result<(), String> {
        let current_chain = self.state().current_chain;
        if current_chain == Some(chain_id) {
            return Ok(());
        }

        debug!(chain_id, "requesting network switch");
        hooks.switch_chain(chain_id).await.map_err(|e| e.to_string())?;
        self.state().current_chain = Some(chain_id);
        Ok(())
    }

    /// Build the placeholder transaction of a process
    fn placeholder_request(route: &Route, step_index: usize) -> TransactionRequest {
        let step = &route.steps[step_index];
        let value = if step_index == 0 && route.from_token.is_native() {
            route.from_amount
        } else {
            U256::ZERO
        };

        TransactionRequest {
            chain_id: step.from_chain_id,
            from: None,
            to: PLACEHOLDER_TARGET,
            data: Bytes::new(),
            value,
            gas_limit: None,
        }
    }

    /// Simulate a single process
    async fn run_process(
        &self,
        route: &Route,
        step_index: usize,
        hooks: &Arc<dyn ExecutionHooks>,
    ) -> ProcessOutcome {
        tokio::time::sleep(self.config.step_delay).await;

        let request = Self::placeholder_request(route, step_index);
        match hooks.update_transaction_request(request).await {
            Ok(_) => {
                let mut state = self.state();
                state.tx_count += 1;
                ProcessOutcome::Done(format!("{:#066x}", state.tx_count))
            },
            Err(e) => ProcessOutcome::Failed(e.to_string()),
        }
    }

    /// Consult the rate hook about a drifted output, applying the drift if
    /// accepted
    async fn check_rate_drift(
        &self,
        route: &mut Route,
        hooks: &Arc<dyn ExecutionHooks>,
    ) -> Result<(), String> {
        let Some(bps) = self.config.rate_drift_bps else {
            return Ok(());
        };

        let keep = BPS_DENOMINATOR.saturating_sub(u64::from(bps));
        let new_to_amount = route.to_amount * U256::from(keep) / U256::from(BPS_DENOMINATOR);
        let update = ExchangeRateUpdate {
            to_token: route.to_token.clone(),
            old_to_amount: route.to_amount,
            new_to_amount,
        };

        if !hooks.accept_exchange_rate_update(update).await {
            return Err(ERR_RATE_REJECTED.to_string());
        }

        route.to_amount = new_to_amount;
        Ok(())
    }

    /// Mark a step failed, publish the snapshot and build the engine error
    async fn fail_step(
        &self,
        route: &mut Route,
        step_index: usize,
        reason: String,
        hooks: &Arc<dyn ExecutionHooks>,
    ) -> EngineError {
        warn!(step = step_index, "simulated step failed: {reason}");
        if let Some(execution) = route.steps[step_index].execution.as_mut() {
            execution.status = StepStatus::Failed;
        }

        self.publish(route, hooks).await;
        EngineError::execution(reason)
    }

    /// Walk the route's unfinished steps, publishing the result to anyone
    /// attached to the walk
    async fn run(
        &self,
        route: Route,
        hooks: Arc<dyn ExecutionHooks>,
        settings: ExecutionSettings,
    ) -> Result<Route, EngineError> {
        let (outcome_tx, outcome_rx) = watch::channel(None);
        self.track(&route, settings, outcome_rx);

        let route_id = route.id.clone();
        let res = self.walk(route, hooks).await;
        if let Some(tracked) = self.state().tracked_mut(&route_id) {
            tracked.running = None;
        }

        outcome_tx.send_replace(Some(res.clone()));
        res
    }

    /// Wait for the result of a walk started elsewhere
    async fn await_outcome(
        route_id: &RouteId,
        mut outcome: RunOutcome,
    ) -> Result<Route, EngineError> {
        // A closed channel means the walk was dropped before it returned
        let res = match outcome.wait_for(Option::is_some).await {
            Ok(res) => res.clone(),
            Err(_) => None,
        };

        res.unwrap_or_else(|| Err(EngineError::Halted(route_id.clone())))
    }

    /// Execute the route's unfinished steps in order
    async fn walk(
        &self,
        mut route: Route,
        hooks: Arc<dyn ExecutionHooks>,
    ) -> Result<Route, EngineError> {
        let n_steps = route.steps.len();

        for idx in 0..n_steps {
            if route.steps[idx].is_terminal() {
                continue;
            }
            self.check_halted(&route.id)?;
            let background = self.is_background(&route.id);
            debug!(step = idx, background, "executing step");

            let step = &mut route.steps[idx];
            let from_chain = step.from_chain_id;
            let process_types: &[&str] = if step.is_cross_chain() {
                &[CROSS_CHAIN_PROCESS, RECEIVING_CHAIN_PROCESS]
            } else {
                &[SWAP_PROCESS]
            };
            step.execution = Some(Execution { status: StepStatus::Pending, process: Vec::new() });

            if let Err(reason) = self.ensure_chain(from_chain, &hooks).await {
                push_process(&mut route, idx, SWITCH_CHAIN_PROCESS, ProcessStatus::Failed);
                return Err(self.fail_step(&mut route, idx, reason, &hooks).await);
            }

            for process_type in process_types {
                self.check_halted(&route.id)?;
                push_process(&mut route, idx, process_type, ProcessStatus::Pending);
                self.publish(&route, &hooks).await;

                match self.run_process(&route, idx, &hooks).await {
                    ProcessOutcome::Done(tx_hash) => {
                        finish_process(&mut route, idx, ProcessStatus::Done, Some(tx_hash));
                        self.publish(&route, &hooks).await;
                    },
                    ProcessOutcome::Failed(reason) => {
                        finish_process(&mut route, idx, ProcessStatus::Failed, None);
                        return Err(self.fail_step(&mut route, idx, reason, &hooks).await);
                    },
                }
            }

            if idx + 1 == n_steps {
                if let Err(reason) = self.check_rate_drift(&mut route, &hooks).await {
                    return Err(self.fail_step(&mut route, idx, reason, &hooks).await);
                }
            }

            if let Some(execution) = route.steps[idx].execution.as_mut() {
                execution.status = StepStatus::Done;
            }
            self.publish(&route, &hooks).await;
        }

        info!(route_id = %route.id.short(), "simulated route execution finished");
        self.untrack(&route.id);
        Ok(route)
    }
}

/// Append a process to a step's execution record
fn push_process(route: &mut Route, step_index: usize, process_type: &str, status: ProcessStatus) {
    if let Some(execution) = route.steps[step_index].execution.as_mut() {
        execution.process.push(Process::new(process_type, status));
    }
}

/// Set the status of a step's latest process
fn finish_process(
    route: &mut Route,
    step_index: usize,
    status: ProcessStatus,
    tx_hash: Option<String>,
) {
    let process = route.steps[step_index]
        .execution
        .as_mut()
        .and_then(|execution| execution.process.last_mut());

    if let Some(process) = process {
        process.status = status;
        process.tx_hash = tx_hash;
    }
}

impl ActiveRouteRegistry for DryRunEngine {
    fn list_active_routes(&self) -> Vec<Route> {
        self.state().routes.iter().map(|tracked| tracked.route.clone()).collect()
    }
}

#[async_trait]
impl ExecutionEngine for DryRunEngine {
    #[instrument(skip_all, fields(route_id = %route.id.short()))]
    async fn start_execution(
        &self,
        route: Route,
        hooks: Arc<dyn ExecutionHooks>,
        settings: ExecutionSettings,
    ) -> Result<Route, EngineError> {
        self.run(route, hooks, settings).await
    }

    #[instrument(skip_all, fields(route_id = %route.id.short()))]
    async fn resume_execution(
        &self,
        route: Route,
        hooks: Arc<dyn ExecutionHooks>,
        settings: ExecutionSettings,
    ) -> Result<Route, EngineError> {
        // A walk still running in the background is brought back to the
        // foreground rather than started again
        if let Some(outcome) = self.attach(&route.id, settings) {
            info!("attaching to the running execution");
            return Self::await_outcome(&route.id, outcome).await;
        }

        // Resuming restarts the first unfinished step
        let mut route = route;
        for step in route.steps.iter_mut().filter(|step| !step.is_terminal()) {
            step.execution = None;
        }

        self.run(route, hooks, settings).await
    }

    fn halt_execution(&self, route_id: &RouteId) -> Result<(), EngineError> {
        match self.state().tracked_mut(route_id) {
            Some(tracked) => {
                tracked.halted = true;
                info!(route_id = %route_id.short(), "halt requested");
            },
            None => debug!(route_id = %route_id.short(), "halt requested for finished route"),
        }

        Ok(())
    }

    fn reconfigure_execution(
        &self,
        route_id: &RouteId,
        settings: ExecutionSettings,
    ) -> Result<(), EngineError> {
        let mut state = self.state();
        let tracked =
            state.tracked_mut(route_id).ok_or_else(|| EngineError::UnknownRoute(route_id.clone()))?;

        tracked.settings = settings;
        debug!(route_id = %route_id.short(), ?settings, "execution reconfigured");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        orchestrator::ExecutionStatus,
        session::SwapSession,
        test_helpers::{
            mock_route, mock_step, mock_token, two_step_route, MockWallet, RecordingHooks,
            ScriptedPrompt, StaticDiscovery, StaticMetadata,
        },
    };

    /// Build an engine without delays, starting on chain 1
    fn engine() -> DryRunEngine {
        DryRunEngine::new(DryRunConfig {
            step_delay: Duration::ZERO,
            initial_chain: Some(1),
            rate_drift_bps: None,
        })
    }

    /// The process types and statuses of a route, flattened
    fn processes(route: &Route) -> Vec<(String, ProcessStatus)> {
        route
            .steps
            .iter()
            .filter_map(|step| step.execution.as_ref())
            .flat_map(|execution| execution.process.iter())
            .map(|process| (process.process_type.clone(), process.status))
            .collect()
    }

    /// Every step completes and every process gets a placeholder hash
    #[tokio::test]
    async fn test_run_to_completion() {
        let engine = engine();
        let hooks = Arc::new(RecordingHooks::default());

        let route = engine
            .start_execution(two_step_route(None, None), hooks.clone(), ExecutionSettings::default())
            .await
            .unwrap();

        assert!(route.is_execution_complete());
        assert!(!route.has_failed_steps());
        assert_eq!(
            processes(&route),
            vec![
                (CROSS_CHAIN_PROCESS.to_string(), ProcessStatus::Done),
                (RECEIVING_CHAIN_PROCESS.to_string(), ProcessStatus::Done),
                (SWAP_PROCESS.to_string(), ProcessStatus::Done),
            ]
        );
        assert_eq!(hooks.requests().len(), 3);
        assert!(engine.list_active_routes().is_empty());

        let steps = route.steps.iter().filter_map(|step| step.execution.as_ref());
        for process in steps.flat_map(|execution| execution.process.iter()) {
            assert_eq!(process.tx_hash.as_ref().map(String::len), Some(66));
        }
    }

    /// Intermediate snapshots are published and the last matches the result
    #[tokio::test]
    async fn test_snapshots_published() {
        let engine = engine();
        let hooks = Arc::new(RecordingHooks::default());
        let route = engine
            .start_execution(two_step_route(None, None), hooks.clone(), ExecutionSettings::default())
            .await
            .unwrap();

        let snapshots = hooks.snapshots();
        assert!(snapshots.len() > 3);
        assert_eq!(snapshots.last(), Some(&route));
        assert_eq!(snapshots[0].steps[0].execution.as_ref().unwrap().process.len(), 1);
    }

    /// The wallet is moved only when a step starts on another network
    #[tokio::test]
    async fn test_network_switches() {
        let engine = engine();
        let hooks = Arc::new(RecordingHooks::default());
        engine
            .start_execution(two_step_route(None, None), hooks.clone(), ExecutionSettings::default())
            .await
            .unwrap();

        // The first step starts on chain 1, the second on chain 10
        assert_eq!(hooks.switches(), vec![10]);
    }

    /// A refused transaction fails the step and the execution
    #[tokio::test]
    async fn test_refused_transaction_fails_step() {
        let engine = engine();
        let hooks = Arc::new(RecordingHooks::default().refusing_transactions());

        let res = engine
            .start_execution(two_step_route(None, None), hooks.clone(), ExecutionSettings::default())
            .await;
        assert!(matches!(res, Err(EngineError::Execution(_))));

        let last = hooks.snapshots().pop().unwrap();
        assert!(last.has_failed_steps());
        assert_eq!(processes(&last), vec![(CROSS_CHAIN_PROCESS.to_string(), ProcessStatus::Failed)]);

        // Failed routes stay active so they can be resumed
        assert_eq!(engine.list_active_routes().len(), 1);
        let route_id = last.id.clone();
        assert!(engine.reconfigure_execution(&route_id, ExecutionSettings::background()).is_ok());
        assert!(engine.is_background(&route_id));
    }

    /// A halt takes effect before the next process
    #[tokio::test]
    async fn test_halt_between_processes() {
        let engine = Arc::new(engine());
        let route = two_step_route(None, None);
        let route_id = route.id.clone();

        let halting_engine = engine.clone();
        let hooks = Arc::new(RecordingHooks::default().on_transaction(move || {
            halting_engine.halt_execution(&route_id).unwrap();
        }));

        let res = engine.start_execution(route, hooks.clone(), ExecutionSettings::default()).await;
        assert!(matches!(res, Err(EngineError::Halted(_))));
        assert_eq!(hooks.requests().len(), 1);
        assert!(engine.list_active_routes().is_empty());
    }

    /// Halting an unknown route is a no-op; reconfiguring one is an error
    #[test]
    fn test_unknown_route_controls() {
        let engine = engine();
        let route_id = RouteId::new("unknown");
        assert!(engine.halt_execution(&route_id).is_ok());

        let res = engine.reconfigure_execution(&route_id, ExecutionSettings::background());
        assert!(matches!(res, Err(EngineError::UnknownRoute(_))));
    }

    /// Rate drift consults the rate hook and applies the new output
    #[tokio::test]
    async fn test_rate_drift_accepted() {
        let engine = DryRunEngine::new(DryRunConfig {
            step_delay: Duration::ZERO,
            initial_chain: Some(1),
            rate_drift_bps: Some(100),
        });
        let hooks = Arc::new(RecordingHooks::default());
        let route = mock_route("drift", 1, 1, 10_000, vec![mock_step(1, 1)]);

        let route =
            engine.start_execution(route, hooks.clone(), ExecutionSettings::default()).await.unwrap();

        let updates = hooks.rate_updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].old_to_amount, U256::from(10_000u64));
        assert_eq!(updates[0].new_to_amount, U256::from(9_900u64));
        assert_eq!(route.to_amount, U256::from(9_900u64));
    }

    /// A rejected rate change fails the final step
    #[tokio::test]
    async fn test_rate_drift_rejected() {
        let engine = DryRunEngine::new(DryRunConfig {
            step_delay: Duration::ZERO,
            initial_chain: Some(1),
            rate_drift_bps: Some(100),
        });
        let hooks = Arc::new(RecordingHooks::default().rejecting_rates());
        let route = mock_route("drift", 1, 1, 10_000, vec![mock_step(1, 1)]);

        let res = engine.start_execution(route, hooks.clone(), ExecutionSettings::default()).await;
        assert!(matches!(res, Err(EngineError::Execution(msg)) if msg == ERR_RATE_REJECTED));
        assert!(hooks.snapshots().pop().unwrap().has_failed_steps());
    }

    /// Resuming a failed route retries only its unfinished steps
    #[tokio::test]
    async fn test_resume_skips_finished_steps() {
        let engine = engine();
        let route = two_step_route(Some(StepStatus::Done), Some(StepStatus::Failed));
        let mut partial = route.clone();
        partial.steps[1].execution = None;

        let hooks = Arc::new(RecordingHooks::default());
        let route = engine
            .resume_execution(partial, hooks.clone(), ExecutionSettings::default())
            .await
            .unwrap();

        assert!(route.is_execution_complete());
        assert_eq!(hooks.requests().len(), 1);
        assert_eq!(route.steps[0].execution.as_ref().unwrap().process.len(), 1);
    }

    /// A session driven by the dry-run engine completes with full progress
    #[tokio::test]
    async fn test_session_end_to_end() {
        let route = two_step_route(None, None);
        let session = SwapSession::new(
            Arc::new(StaticDiscovery::returning(vec![route])),
            Arc::new(StaticMetadata::default()),
            Arc::new(engine()),
            Arc::new(MockWallet::connected()),
            Arc::new(ScriptedPrompt::answering(true)),
        );
        session.set_from_network(1).await;
        session.set_to_network(10).await;
        session.set_from_token(mock_token(1, "ETH", 18)).await;
        session.set_to_token(mock_token(10, "USDC", 6)).await;

        session.request_routes().await.unwrap();
        let finished = session.execute_selected().await.unwrap().unwrap();
        assert!(finished.is_execution_complete());

        let state = session.state().await;
        assert!(state.completed);
        assert_eq!(state.execution_status, ExecutionStatus::Completed);
        assert_eq!(state.progress.len(), 3);
        assert_eq!(state.progress[0].chain_id, 1);
        assert_eq!(state.progress[2].chain_id, 10);
    }

    /// Resuming a backgrounded route re-attaches to the walk still running
    /// instead of executing its steps a second time
    #[tokio::test]
    async fn test_resume_after_background_attaches() {
        let engine = Arc::new(DryRunEngine::new(DryRunConfig {
            step_delay: Duration::from_millis(50),
            initial_chain: Some(1),
            rate_drift_bps: None,
        }));
        let session = SwapSession::new(
            Arc::new(StaticDiscovery::returning(vec![two_step_route(None, None)])),
            Arc::new(StaticMetadata::default()),
            engine.clone(),
            Arc::new(MockWallet::connected()),
            Arc::new(ScriptedPrompt::answering(true)),
        );
        session.set_from_network(1).await;
        session.set_to_network(10).await;
        session.set_from_token(mock_token(1, "ETH", 18)).await;
        session.set_to_token(mock_token(10, "USDC", 6)).await;
        session.request_routes().await.unwrap();

        let runner = session.clone();
        let execution = tokio::spawn(async move { runner.execute_selected().await });
        while engine.list_active_routes().is_empty()
            || session.state().await.active_route.is_none()
        {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        session.move_to_background().await.unwrap();
        let route_id = engine.list_active_routes()[0].id.clone();
        assert!(engine.is_background(&route_id));

        let resumed = session.resume().await.unwrap().unwrap();
        let started = execution.await.unwrap().unwrap().unwrap();
        assert!(resumed.is_execution_complete());
        assert_eq!(resumed, started);

        // One placeholder transaction per process of the three-process route
        assert_eq!(engine.state().tx_count, 3);
        assert!(engine.list_active_routes().is_empty());
        assert!(session.state().await.completed);
    }

    /// A failed walk is no longer running, so resuming it walks again
    #[tokio::test]
    async fn test_resume_after_failure_walks_again() {
        let engine = engine();
        let refusing = Arc::new(RecordingHooks::default().refusing_transactions());
        let res = engine
            .start_execution(two_step_route(None, None), refusing, ExecutionSettings::default())
            .await;
        assert!(res.is_err());

        let failed = engine.list_active_routes().pop().unwrap();
        let hooks = Arc::new(RecordingHooks::default());
        let route = engine
            .resume_execution(failed, hooks.clone(), ExecutionSettings::default())
            .await
            .unwrap();

        // The failed first step is kept; only the second step is walked
        assert!(route.is_execution_complete());
        assert_eq!(hooks.requests().len(), 1);
        assert_eq!(engine.state().tx_count, 1);
    }
}
