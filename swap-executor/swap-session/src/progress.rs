//! Flattens a route's nested step and process execution state into a
//! progress record

use swap_executor_api::{
    chain::ChainId,
    progress::{ProgressEntry, ProgressRecord},
    route::{Process, Route},
};

/// The networks progress entries are attributed to
///
/// Captured from the route when it becomes active, so attribution does not
/// follow later changes to the session's form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteNetworks {
    /// The network the first step is attributed to
    pub source: ChainId,
    /// The network every later step is attributed to
    pub destination: ChainId,
}

impl RouteNetworks {
    /// The networks of a route's endpoints
    pub fn of_route(route: &Route) -> Self {
        Self { source: route.from_chain_id, destination: route.to_chain_id }
    }

    /// The network a step's processes are attributed to
    pub fn for_step(&self, step_index: usize) -> ChainId {
        if step_index == 0 {
            self.source
        } else {
            self.destination
        }
    }
}

/// Build the progress record of a route: one entry per process, in step
/// order
pub fn aggregate_progress(route: &Route, networks: &RouteNetworks) -> ProgressRecord {
    route
        .steps
        .iter()
        .enumerate()
        .filter_map(|(idx, step)| step.execution.as_ref().map(|execution| (idx, execution)))
        .flat_map(|(idx, execution)| {
            execution.process.iter().map(move |process| progress_entry(idx, process, networks))
        })
        .collect()
}

/// Build the progress entry of a single process
fn progress_entry(step_index: usize, process: &Process, networks: &RouteNetworks) -> ProgressEntry {
    ProgressEntry {
        step_index,
        step_type: process.process_type.clone(),
        status: process.status,
        tx_hash: process.tx_hash.clone(),
        explorer_link: process.explorer_link.clone(),
        chain_id: networks.for_step(step_index),
        message: format!("{}: {}", process.process_type, process.status),
    }
}
