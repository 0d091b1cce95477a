//! The flattened, display-facing view of a route's execution

use serde::{Deserialize, Serialize};

use crate::types::{chain::ChainId, route::ProcessStatus};

/// One process of an executing route, attributed to its step and network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    /// The 0-based index of the step the process belongs to
    pub step_index: usize,
    /// The process type, e.g. `SWAP`
    pub step_type: String,
    /// The process status
    pub status: ProcessStatus,
    /// The hash of the process's transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    /// A block explorer link for the transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_link: Option<String>,
    /// The network the process is attributed to
    pub chain_id: ChainId,
    /// A human-readable description, e.g. `SWAP: PENDING`
    pub message: String,
}

/// The progress of a route: one entry per process across all of its steps,
/// in step order
pub type ProgressRecord = Vec<ProgressEntry>;
