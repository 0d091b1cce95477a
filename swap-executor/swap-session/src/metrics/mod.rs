//! Metric recording helpers for route discovery and execution

use swap_executor_api::{chain::ChainId, route::Route};

use labels::{
    CHAIN_TAG, DESTINATION_CHAIN_TAG, HAS_FAILED_STEPS_TAG, HOOK_TAG,
    ROUTES_DISCOVERED_METRIC_NAME, ROUTE_EXECUTIONS_COMPLETED_METRIC_NAME,
    ROUTE_EXECUTIONS_FAILED_METRIC_NAME, ROUTE_EXECUTIONS_STARTED_METRIC_NAME,
    ROUTE_EXECUTIONS_STOPPED_METRIC_NAME, STALE_HOOK_PAYLOADS_METRIC_NAME,
};

pub mod labels;

/// Build the chain tags of a route
fn route_tags(route: &Route) -> Vec<(String, String)> {
    vec![
        (CHAIN_TAG.to_string(), route.from_chain_id.to_string()),
        (DESTINATION_CHAIN_TAG.to_string(), route.to_chain_id.to_string()),
    ]
}

/// Record the number of routes a discovery request returned
pub fn record_routes_discovered(chain: ChainId, count: usize) {
    let tags = vec![(CHAIN_TAG.to_string(), chain.to_string())];
    metrics::counter!(ROUTES_DISCOVERED_METRIC_NAME, &tags).increment(count as u64);
}

/// Increment the metric counting started executions
pub fn record_execution_started(route: &Route) {
    let tags = route_tags(route);
    metrics::counter!(ROUTE_EXECUTIONS_STARTED_METRIC_NAME, &tags).increment(1);
}

/// Increment the metric counting completed executions
pub fn record_execution_completed(route: &Route) {
    let mut tags = route_tags(route);
    tags.push((HAS_FAILED_STEPS_TAG.to_string(), route.has_failed_steps().to_string()));
    metrics::counter!(ROUTE_EXECUTIONS_COMPLETED_METRIC_NAME, &tags).increment(1);
}

/// Increment the metric counting stopped executions
pub fn record_execution_stopped(route: &Route) {
    let tags = route_tags(route);
    metrics::counter!(ROUTE_EXECUTIONS_STOPPED_METRIC_NAME, &tags).increment(1);
}

/// Increment the metric counting executions the engine failed
pub fn record_execution_failed(route: &Route) {
    let tags = route_tags(route);
    metrics::counter!(ROUTE_EXECUTIONS_FAILED_METRIC_NAME, &tags).increment(1);
}

/// Increment the metric counting dropped stale hook payloads
pub fn record_stale_hook_payload(hook: &str) {
    let tags = vec![(HOOK_TAG.to_string(), hook.to_string())];
    metrics::counter!(STALE_HOOK_PAYLOADS_METRIC_NAME, &tags).increment(1);
}
