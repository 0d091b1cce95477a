//! Constants for metric labels and metric names

/// Metric counting the routes returned by discovery
pub const ROUTES_DISCOVERED_METRIC_NAME: &str = "routes_discovered";

/// Metric counting route executions handed to the engine
pub const ROUTE_EXECUTIONS_STARTED_METRIC_NAME: &str = "route_executions_started";

/// Metric counting route executions that reached a terminal status on
/// every step
pub const ROUTE_EXECUTIONS_COMPLETED_METRIC_NAME: &str = "route_executions_completed";

/// Metric counting route executions stopped by the user
pub const ROUTE_EXECUTIONS_STOPPED_METRIC_NAME: &str = "route_executions_stopped";

/// Metric counting route executions the engine failed to start or resume
pub const ROUTE_EXECUTIONS_FAILED_METRIC_NAME: &str = "route_executions_failed";

/// Metric counting hook payloads dropped because their route was no longer
/// tracked
pub const STALE_HOOK_PAYLOADS_METRIC_NAME: &str = "stale_hook_payloads";

/// Metric tag for the route's source chain id
pub const CHAIN_TAG: &str = "chain";

/// Metric tag for the route's destination chain id
pub const DESTINATION_CHAIN_TAG: &str = "destination_chain";

/// Metric tag for whether a completed route had failed steps
pub const HAS_FAILED_STEPS_TAG: &str = "has_failed_steps";

/// Metric tag for the hook that received a stale payload
pub const HOOK_TAG: &str = "hook";
