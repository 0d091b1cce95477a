//! In-memory collaborators and fixtures for tests

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use swap_executor_api::{
    chain::{Chain, ChainId, Token},
    errors::{DiscoveryError, EngineError, HookError, MetadataError, SwitchError},
    execution::{ExchangeRateUpdate, ExecutionSettings, TransactionRequest},
    intent::SwapIntent,
    interfaces::{
        ActiveRouteRegistry, ConfirmationPrompt, ExecutionEngine, ExecutionHooks, MetadataSource,
        RouteDiscovery, WalletProvider,
    },
    route::{Execution, Process, ProcessStatus, Route, RouteId, Step, StepEstimate, StepStatus},
};
use tokio::sync::Mutex as AsyncMutex;

use crate::orchestrator::{ExecutionEvent, ExecutionListener};

/// The address of every connected mock wallet
pub const MOCK_WALLET_ADDRESS: Address = Address::repeat_byte(0xaa);

// ------------
// | Fixtures |
// ------------

/// Build a token; `ETH` is the native asset
pub fn mock_token(chain_id: ChainId, symbol: &str, decimals: u8) -> Token {
    let address = if symbol == "ETH" { Address::ZERO } else { Address::with_last_byte(decimals) };
    Token {
        address,
        chain_id,
        symbol: symbol.to_string(),
        decimals,
        name: symbol.to_string(),
        price_usd: None,
    }
}

/// Build a chain
pub fn mock_chain(id: ChainId, name: &str) -> Chain {
    Chain { id, key: name.to_lowercase(), name: name.to_string() }
}

/// Build a step that has not started executing
pub fn mock_step(from_chain_id: ChainId, to_chain_id: ChainId) -> Step {
    let step_type = if from_chain_id == to_chain_id { "swap" } else { "cross" };
    Step {
        id: format!("step-{from_chain_id}-{to_chain_id}"),
        step_type: step_type.to_string(),
        tool: "mock-tool".to_string(),
        from_chain_id,
        to_chain_id,
        estimate: StepEstimate { execution_duration: 30., to_amount: None },
        execution: None,
    }
}

/// Attach an execution record with the given processes to a step
pub fn with_execution(
    mut step: Step,
    status: StepStatus,
    processes: &[(&str, ProcessStatus)],
) -> Step {
    let process = processes.iter().map(|(ty, status)| Process::new(ty, *status)).collect();
    step.execution = Some(Execution { status, process });
    step
}

/// Build an ETH -> USDC route
pub fn mock_route(
    id: &str,
    from_chain_id: ChainId,
    to_chain_id: ChainId,
    to_amount: u64,
    steps: Vec<Step>,
) -> Route {
    Route {
        id: RouteId::new(id),
        from_chain_id,
        to_chain_id,
        from_token: mock_token(from_chain_id, "ETH", 18),
        to_token: mock_token(to_chain_id, "USDC", 6),
        from_amount: U256::from(1_000_000_000_000u64),
        to_amount: U256::from(to_amount),
        to_amount_min: None,
        from_amount_usd: None,
        to_amount_usd: None,
        gas_cost_usd: None,
        steps,
    }
}

/// Build the route `route-1` bridging 1 -> 10 then swapping on 10
///
/// Each step given a status carries one process: `DONE` or `FAILED` to match
/// a terminal step, `PENDING` otherwise
pub fn two_step_route(first: Option<StepStatus>, second: Option<StepStatus>) -> Route {
    /// Attach a single process matching the step status
    fn apply(step: Step, process_type: &str, status: Option<StepStatus>) -> Step {
        let Some(status) = status else {
            return step;
        };

        let process_status = match status {
            StepStatus::Done => ProcessStatus::Done,
            StepStatus::Failed => ProcessStatus::Failed,
            _ => ProcessStatus::Pending,
        };
        with_execution(step, status, &[(process_type, process_status)])
    }

    let steps = vec![
        apply(mock_step(1, 10), "CROSS_CHAIN", first),
        apply(mock_step(10, 10), "SWAP", second),
    ];
    mock_route("route-1", 1, 10, 100, steps)
}

// ----------
// | Engine |
// ----------

/// An engine that records every call and returns the route it was given
#[derive(Default)]
pub struct ScriptedEngine {
    /// The hooks most recently attached to each route
    hooks: Mutex<HashMap<RouteId, Arc<dyn ExecutionHooks>>>,
    /// The number of start calls
    starts: AtomicUsize,
    /// The error the next start call returns
    next_start_error: Mutex<Option<EngineError>>,
    /// The error the next resume call returns
    next_resume_error: Mutex<Option<EngineError>>,
    /// The routes resumed, in order
    resumed: Mutex<Vec<Route>>,
    /// The routes halted, in order
    halted: Mutex<Vec<RouteId>>,
    /// Whether halt calls fail
    fail_halts: AtomicBool,
    /// The reconfiguration calls, in order
    reconfigured: Mutex<Vec<(RouteId, ExecutionSettings)>>,
    /// The routes reported as active
    active_routes: Mutex<Vec<Route>>,
    /// The number of registry queries
    registry_queries: AtomicUsize,
}

impl ScriptedEngine {
    /// The hooks most recently attached to a route
    pub fn hooks(&self, route_id: &RouteId) -> Option<Arc<dyn ExecutionHooks>> {
        self.hooks.lock().unwrap().get(route_id).cloned()
    }

    /// The number of start calls
    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    /// Fail the next start call
    pub fn fail_next_start(&self, err: EngineError) {
        *self.next_start_error.lock().unwrap() = Some(err);
    }

    /// Fail the next resume call
    pub fn fail_next_resume(&self, err: EngineError) {
        *self.next_resume_error.lock().unwrap() = Some(err);
    }

    /// The routes resumed, in order
    pub fn resumed(&self) -> Vec<Route> {
        self.resumed.lock().unwrap().clone()
    }

    /// The routes halted, in order
    pub fn halted(&self) -> Vec<RouteId> {
        self.halted.lock().unwrap().clone()
    }

    /// Fail every subsequent halt call
    pub fn fail_halts(&self) {
        self.fail_halts.store(true, Ordering::SeqCst);
    }

    /// The reconfiguration calls, in order
    pub fn reconfigured(&self) -> Vec<(RouteId, ExecutionSettings)> {
        self.reconfigured.lock().unwrap().clone()
    }

    /// Set the routes reported as active
    pub fn set_active_routes(&self, routes: Vec<Route>) {
        *self.active_routes.lock().unwrap() = routes;
    }

    /// The number of registry queries
    pub fn registry_queries(&self) -> usize {
        self.registry_queries.load(Ordering::SeqCst)
    }

    /// Record the hooks attached to a route
    fn attach(&self, route: &Route, hooks: Arc<dyn ExecutionHooks>) {
        self.hooks.lock().unwrap().insert(route.id.clone(), hooks);
    }
}

impl ActiveRouteRegistry for ScriptedEngine {
    fn list_active_routes(&self) -> Vec<Route> {
        self.registry_queries.fetch_add(1, Ordering::SeqCst);
        self.active_routes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionEngine for ScriptedEngine {
    async fn start_execution(
        &self,
        route: Route,
        hooks: Arc<dyn ExecutionHooks>,
        _settings: ExecutionSettings,
    ) -> Result<Route, EngineError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.attach(&route, hooks);
        match self.next_start_error.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(route),
        }
    }

    async fn resume_execution(
        &self,
        route: Route,
        hooks: Arc<dyn ExecutionHooks>,
        _settings: ExecutionSettings,
    ) -> Result<Route, EngineError> {
        self.attach(&route, hooks);
        self.resumed.lock().unwrap().push(route.clone());
        match self.next_resume_error.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(route),
        }
    }

    fn halt_execution(&self, route_id: &RouteId) -> Result<(), EngineError> {
        if self.fail_halts.load(Ordering::SeqCst) {
            return Err(EngineError::execution("halt failed"));
        }

        self.halted.lock().unwrap().push(route_id.clone());
        Ok(())
    }

    fn reconfigure_execution(
        &self,
        route_id: &RouteId,
        settings: ExecutionSettings,
    ) -> Result<(), EngineError> {
        self.reconfigured.lock().unwrap().push((route_id.clone(), settings));
        Ok(())
    }
}

/// Hooks that record every payload the engine delivers
#[derive(Default)]
pub struct RecordingHooks {
    /// The route snapshots delivered, in order
    snapshots: Mutex<Vec<Route>>,
    /// The transaction requests offered, in order
    requests: Mutex<Vec<TransactionRequest>>,
    /// The network switches requested, in order
    switches: Mutex<Vec<ChainId>>,
    /// The rate updates offered, in order
    rate_updates: Mutex<Vec<ExchangeRateUpdate>>,
    /// Whether transaction requests are refused
    refuse_transactions: bool,
    /// Whether rate updates are rejected
    reject_rates: bool,
    /// Invoked on every transaction request
    on_transaction: Option<Box<dyn Fn() + Send + Sync>>,
}

impl RecordingHooks {
    /// Refuse every transaction request
    pub fn refusing_transactions(mut self) -> Self {
        self.refuse_transactions = true;
        self
    }

    /// Reject every rate update
    pub fn rejecting_rates(mut self) -> Self {
        self.reject_rates = true;
        self
    }

    /// Run a callback on every transaction request
    pub fn on_transaction<F: Fn() + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.on_transaction = Some(Box::new(f));
        self
    }

    /// The route snapshots delivered, in order
    pub fn snapshots(&self) -> Vec<Route> {
        self.snapshots.lock().unwrap().clone()
    }

    /// The transaction requests offered, in order
    pub fn requests(&self) -> Vec<TransactionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The network switches requested, in order
    pub fn switches(&self) -> Vec<ChainId> {
        self.switches.lock().unwrap().clone()
    }

    /// The rate updates offered, in order
    pub fn rate_updates(&self) -> Vec<ExchangeRateUpdate> {
        self.rate_updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionHooks for RecordingHooks {
    async fn update_route(&self, route: Route) {
        self.snapshots.lock().unwrap().push(route);
    }

    async fn update_transaction_request(
        &self,
        request: TransactionRequest,
    ) -> Result<TransactionRequest, HookError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(f) = self.on_transaction.as_ref() {
            f();
        }

        if self.refuse_transactions {
            return Err(HookError::transaction_request("refused"));
        }
        Ok(request)
    }

    async fn accept_exchange_rate_update(&self, update: ExchangeRateUpdate) -> bool {
        self.rate_updates.lock().unwrap().push(update);
        !self.reject_rates
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), HookError> {
        self.switches.lock().unwrap().push(chain_id);
        Ok(())
    }
}

// ----------
// | Wallet |
// ----------

/// A wallet whose connection and switching behavior is fixed at construction
#[derive(Default)]
pub struct MockWallet {
    /// The wallet's address
    address: Option<Address>,
    /// Whether the wallet is connected
    connected: bool,
    /// Whether the wallet supports network switching
    switching: bool,
    /// Whether switch requests are rejected
    rejecting: AtomicBool,
    /// The switches performed, in order
    switches: Mutex<Vec<ChainId>>,
}

impl MockWallet {
    /// A connected wallet with an address
    pub fn connected() -> Self {
        Self { address: Some(MOCK_WALLET_ADDRESS), connected: true, ..Default::default() }
    }

    /// A connected wallet without an address
    pub fn without_address() -> Self {
        Self { connected: true, ..Default::default() }
    }

    /// Support network switching
    pub fn with_network_switching(mut self) -> Self {
        self.switching = true;
        self
    }

    /// Reject every subsequent switch request
    pub fn reject_switches(&self) {
        self.rejecting.store(true, Ordering::SeqCst);
    }

    /// The switches performed, in order
    pub fn switches(&self) -> Vec<ChainId> {
        self.switches.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    fn current_address(&self) -> Option<Address> {
        self.address
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn supports_network_switch(&self) -> bool {
        self.switching
    }

    async fn switch_network(&self, chain_id: ChainId) -> Result<(), SwitchError> {
        if self.rejecting.load(Ordering::SeqCst) {
            return Err(SwitchError::Rejected(chain_id));
        }

        self.switches.lock().unwrap().push(chain_id);
        Ok(())
    }
}

/// A prompt with a fixed answer that records the messages it was shown
pub struct ScriptedPrompt {
    /// The answer to every prompt
    answer: bool,
    /// The messages shown, in order
    messages: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    /// A prompt answering every message with `answer`
    pub fn answering(answer: bool) -> Self {
        Self { answer, messages: Mutex::new(Vec::new()) }
    }

    /// The messages shown, in order
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConfirmationPrompt for ScriptedPrompt {
    async fn confirm(&self, message: &str) -> bool {
        self.messages.lock().unwrap().push(message.to_string());
        self.answer
    }
}

/// A listener that records every event
#[derive(Default)]
pub struct RecordingListener {
    /// The events received, in order
    events: AsyncMutex<Vec<ExecutionEvent>>,
}

impl RecordingListener {
    /// The events received, in order
    pub async fn events(&self) -> Vec<ExecutionEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl ExecutionListener for RecordingListener {
    async fn on_event(&self, event: ExecutionEvent) {
        self.events.lock().await.push(event);
    }
}

// -------------------
// | Routing Service |
// -------------------

/// A discovery client with a fixed result
pub struct StaticDiscovery {
    /// The result of every request
    result: Result<Vec<Route>, DiscoveryError>,
    /// The number of requests
    calls: AtomicUsize,
    /// The intent of the last request
    last_intent: Mutex<Option<SwapIntent>>,
}

impl StaticDiscovery {
    /// A client returning the given routes
    pub fn returning(routes: Vec<Route>) -> Self {
        Self { result: Ok(routes), calls: AtomicUsize::new(0), last_intent: Mutex::new(None) }
    }

    /// A client failing with the given error
    pub fn failing(err: DiscoveryError) -> Self {
        Self { result: Err(err), calls: AtomicUsize::new(0), last_intent: Mutex::new(None) }
    }

    /// The number of requests
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The intent of the last request
    pub fn last_intent(&self) -> Option<SwapIntent> {
        self.last_intent.lock().unwrap().clone()
    }
}

#[async_trait]
impl RouteDiscovery for StaticDiscovery {
    async fn discover_routes(&self, intent: &SwapIntent) -> Result<Vec<Route>, DiscoveryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_intent.lock().unwrap() = Some(intent.clone());
        self.result.clone()
    }
}

/// A metadata source over fixed chains and tokens
#[derive(Default)]
pub struct StaticMetadata {
    /// The supported chains
    chains: Vec<Chain>,
    /// The tokens of each chain
    tokens: HashMap<ChainId, Vec<Token>>,
    /// Whether every request fails
    failing: bool,
}

impl StaticMetadata {
    /// A source failing every request
    pub fn failing() -> Self {
        Self { failing: true, ..Default::default() }
    }

    /// Set the supported chains
    pub fn with_chains(mut self, chains: Vec<Chain>) -> Self {
        self.chains = chains;
        self
    }

    /// Set the tokens of a chain
    pub fn with_tokens(mut self, chain_id: ChainId, tokens: Vec<Token>) -> Self {
        self.tokens.insert(chain_id, tokens);
        self
    }
}

#[async_trait]
impl MetadataSource for StaticMetadata {
    async fn list_networks(&self) -> Result<Vec<Chain>, MetadataError> {
        if self.failing {
            return Err(MetadataError::http("Status 500: unavailable"));
        }
        Ok(self.chains.clone())
    }

    async fn list_tokens(&self, chain_id: ChainId) -> Result<Vec<Token>, MetadataError> {
        if self.failing {
            return Err(MetadataError::http("Status 500: unavailable"));
        }
        Ok(self.tokens.get(&chain_id).cloned().unwrap_or_default())
    }
}
