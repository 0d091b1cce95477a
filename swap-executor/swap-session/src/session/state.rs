//! The user-facing state of a swap session

use std::sync::Arc;

use async_trait::async_trait;
use swap_executor_api::{
    chain::{Chain, ChainId, Token},
    intent::SwapIntent,
    progress::ProgressRecord,
    route::{Route, RouteId},
};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::orchestrator::{ExecutionEvent, ExecutionListener, ExecutionStatus};

/// The amount prefilled in a new session
pub const DEFAULT_AMOUNT: &str = "0.000001";
/// The status message shown once every step of the active route is terminal
pub const EXECUTION_COMPLETED_MESSAGE: &str = "Execution completed";

/// The aggregate state exposed to the user
#[derive(Debug, Clone, PartialEq)]
pub struct SwapSessionState {
    // --- Form --- //
    /// The networks a swap may be built from
    pub networks: Vec<Chain>,
    /// The selected source network
    pub from_network: Option<ChainId>,
    /// The selected destination network
    pub to_network: Option<ChainId>,
    /// The tokens available on the source network
    pub from_tokens: Vec<Token>,
    /// The tokens available on the destination network
    pub to_tokens: Vec<Token>,
    /// The selected source token
    pub from_token: Option<Token>,
    /// The selected destination token
    pub to_token: Option<Token>,
    /// The decimal amount to swap
    pub amount: String,

    // --- Routes --- //
    /// The intent of the last discovery request
    pub last_intent: Option<SwapIntent>,
    /// The discovered routes, cheapest first
    pub routes: Vec<Route>,
    /// The selected route
    pub selected_route: Option<Route>,

    // --- Execution --- //
    /// The route under execution
    pub active_route: Option<Route>,
    /// The progress of the active route
    pub progress: ProgressRecord,
    /// The orchestrator status of the active route
    pub execution_status: ExecutionStatus,
    /// Whether the active route is executing in the foreground
    pub is_executing: bool,
    /// Whether every step of the active route is terminal
    pub completed: bool,
    /// Ids of routes the engine is executing that the session did not adopt
    pub untracked_active_routes: Vec<RouteId>,

    // --- Feedback --- //
    /// Whether a request is in flight
    pub is_loading: bool,
    /// The last error, replaced by each new error
    pub error: Option<String>,
    /// A status line for the user
    pub status_message: Option<String>,
}

impl Default for SwapSessionState {
    fn default() -> Self {
        Self {
            networks: Vec::new(),
            from_network: None,
            to_network: None,
            from_tokens: Vec::new(),
            to_tokens: Vec::new(),
            from_token: None,
            to_token: None,
            amount: DEFAULT_AMOUNT.to_string(),
            last_intent: None,
            routes: Vec::new(),
            selected_route: None,
            active_route: None,
            progress: Vec::new(),
            execution_status: ExecutionStatus::Idle,
            is_executing: false,
            completed: false,
            untracked_active_routes: Vec::new(),
            is_loading: false,
            error: None,
            status_message: None,
        }
    }
}

impl SwapSessionState {
    /// Whether every field of the intent is populated
    pub fn has_complete_intent(&self) -> bool {
        self.from_network.is_some()
            && self.to_network.is_some()
            && self.from_token.is_some()
            && self.to_token.is_some()
            && !self.amount.trim().is_empty()
    }

    /// Whether a route is tracked and has not completed
    pub fn has_running_route(&self) -> bool {
        self.active_route.is_some() && !self.completed
    }

    /// Replace the current error
    pub fn set_error<T: ToString>(&mut self, error: T) {
        self.error = Some(error.to_string());
    }

    /// Clear the discovered routes and the selection
    pub fn clear_routes(&mut self) {
        self.routes.clear();
        self.selected_route = None;
    }

    /// Forget the active route and its progress
    pub fn clear_execution(&mut self, status: ExecutionStatus) {
        self.active_route = None;
        self.progress.clear();
        self.is_executing = false;
        self.completed = false;
        self.status_message = None;
        self.execution_status = status;
    }

    /// Apply an orchestrator status to the execution flags
    fn apply_status(&mut self, status: ExecutionStatus) {
        self.execution_status = status;
        self.is_executing = status == ExecutionStatus::Executing;
        self.completed = status == ExecutionStatus::Completed;
        if self.completed {
            self.status_message = Some(EXECUTION_COMPLETED_MESSAGE.to_string());
        }
    }

    /// Whether an event concerns the active route
    fn is_active(&self, route_id: &RouteId) -> bool {
        self.active_route.as_ref().is_some_and(|route| route.id == *route_id)
    }

    /// Apply an orchestrator event
    pub fn apply_event(&mut self, event: ExecutionEvent) {
        match event {
            ExecutionEvent::RouteActivated { route, progress, status } => {
                self.status_message = None;
                self.active_route = Some(route);
                self.progress = progress;
                self.apply_status(status);
            },
            ExecutionEvent::RouteUpdated { route, progress, status } => {
                self.active_route = Some(route);
                self.progress = progress;
                self.apply_status(status);
            },
            ExecutionEvent::StatusChanged { route_id, status } => {
                if self.is_active(&route_id) {
                    self.apply_status(status);
                }
            },
            ExecutionEvent::RouteCleared { route_id, status } => {
                if self.is_active(&route_id) {
                    self.clear_execution(status);
                }
            },
        }
    }
}

/// A shared handle to the session state; the orchestrator reports into it
#[derive(Clone, Default)]
pub struct SessionStateHandle(Arc<RwLock<SwapSessionState>>);

impl SessionStateHandle {
    /// Acquire a read lock on the state
    pub async fn read(&self) -> RwLockReadGuard<'_, SwapSessionState> {
        self.0.read().await
    }

    /// Acquire a write lock on the state
    pub async fn write(&self) -> RwLockWriteGuard<'_, SwapSessionState> {
        self.0.write().await
    }

    /// A copy of the current state
    pub async fn snapshot(&self) -> SwapSessionState {
        self.read().await.clone()
    }
}

#[async_trait]
impl ExecutionListener for SessionStateHandle {
    async fn on_event(&self, event: ExecutionEvent) {
        self.write().await.apply_event(event);
    }
}

#[cfg(test)]
mod tests {
    use swap_executor_api::route::StepStatus;

    use super::*;
    use crate::test_helpers::two_step_route;

    /// Build a state tracking a freshly activated route
    fn activated_state() -> SwapSessionState {
        let mut state = SwapSessionState::default();
        state.apply_event(ExecutionEvent::RouteActivated {
            route: two_step_route(None, None),
            progress: Vec::new(),
            status: ExecutionStatus::Executing,
        });
        state
    }

    /// New sessions prefill the default amount
    #[test]
    fn test_default_state() {
        let state = SwapSessionState::default();
        assert_eq!(state.amount, DEFAULT_AMOUNT);
        assert_eq!(state.execution_status, ExecutionStatus::Idle);
        assert!(!state.has_complete_intent());
    }

    /// Completion retains the route and sets the completed flag
    #[test]
    fn test_completion_retains_route() {
        let mut state = activated_state();
        assert!(state.is_executing);
        assert!(state.has_running_route());

        let done = two_step_route(Some(StepStatus::Done), Some(StepStatus::Done));
        state.apply_event(ExecutionEvent::RouteUpdated {
            route: done.clone(),
            progress: Vec::new(),
            status: ExecutionStatus::Completed,
        });

        assert_eq!(state.active_route, Some(done));
        assert!(state.completed);
        assert!(!state.is_executing);
        assert!(!state.has_running_route());
        assert_eq!(state.status_message.as_deref(), Some(EXECUTION_COMPLETED_MESSAGE));
    }

    /// Events for another route leave the state alone
    #[test]
    fn test_events_for_other_routes_ignored() {
        let mut state = activated_state();
        let other = RouteId::new("other");

        state.apply_event(ExecutionEvent::StatusChanged {
            route_id: other.clone(),
            status: ExecutionStatus::Paused,
        });
        state.apply_event(ExecutionEvent::RouteCleared {
            route_id: other,
            status: ExecutionStatus::Stopped,
        });

        assert!(state.active_route.is_some());
        assert_eq!(state.execution_status, ExecutionStatus::Executing);
    }

    /// Clearing the route drops its progress
    #[test]
    fn test_route_cleared() {
        let mut state = activated_state();
        let route_id = state.active_route.as_ref().unwrap().id.clone();

        state.apply_event(ExecutionEvent::RouteCleared { route_id, status: ExecutionStatus::Stopped });
        assert!(state.active_route.is_none());
        assert!(state.progress.is_empty());
        assert_eq!(state.execution_status, ExecutionStatus::Stopped);
    }
}
