//! Route, step and execution-state types

use std::fmt::Display;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::{
    serialization::{option_u256_string_serialization, u256_string_serialization},
    types::chain::{ChainId, Token},
};

/// The number of seconds in a minute, used for duration estimates
const SECONDS_PER_MINUTE: f64 = 60.0;

// ---------
// | Route |
// ---------

/// The opaque unique identifier of a route
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(String);

impl RouteId {
    /// Create a route id from its string form
    pub fn new<T: Into<String>>(id: T) -> Self {
        Self(id.into())
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A shortened form of the id for logs and display
    pub fn short(&self) -> &str {
        let end = self.0.char_indices().nth(8).map_or(self.0.len(), |(idx, _)| idx);
        &self.0[..end]
    }
}

impl Display for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RouteId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A priced, ordered path of steps converting a source token into a
/// destination token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// The route's unique identifier
    pub id: RouteId,
    /// The network the route starts on
    pub from_chain_id: ChainId,
    /// The network the route ends on
    pub to_chain_id: ChainId,
    /// The token being sold
    pub from_token: Token,
    /// The token being bought
    pub to_token: Token,
    /// The amount sold, in the source token's smallest unit
    #[serde(with = "u256_string_serialization")]
    pub from_amount: U256,
    /// The estimated amount received, in the destination token's smallest unit
    #[serde(with = "u256_string_serialization")]
    pub to_amount: U256,
    /// The minimum amount received after slippage
    #[serde(default, with = "option_u256_string_serialization")]
    pub to_amount_min: Option<U256>,
    /// The USD value of the amount sold
    #[serde(default, rename = "fromAmountUSD")]
    pub from_amount_usd: Option<String>,
    /// The USD value of the estimated amount received
    #[serde(default, rename = "toAmountUSD")]
    pub to_amount_usd: Option<String>,
    /// The estimated gas cost of the whole route in USD
    #[serde(default, rename = "gasCostUSD")]
    pub gas_cost_usd: Option<String>,
    /// The ordered steps of the route
    pub steps: Vec<Step>,
}

impl Route {
    /// The estimated execution time of the route in seconds
    pub fn estimated_duration_secs(&self) -> f64 {
        self.steps.iter().map(|step| step.estimate.execution_duration).sum()
    }

    /// The estimated execution time of the route, rounded up to whole minutes
    pub fn estimated_duration_minutes(&self) -> u64 {
        (self.estimated_duration_secs() / SECONDS_PER_MINUTE).ceil() as u64
    }

    /// The providers used by the route's steps, in order
    pub fn tools(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.tool.as_str()).collect()
    }

    /// Whether every step has reached a terminal execution status
    ///
    /// A step that has not started executing has no execution record and is
    /// therefore never terminal
    pub fn is_execution_complete(&self) -> bool {
        self.steps.iter().all(Step::is_terminal)
    }

    /// Whether any step's execution failed
    pub fn has_failed_steps(&self) -> bool {
        self.steps
            .iter()
            .any(|step| step.execution.as_ref().is_some_and(|e| e.status == StepStatus::Failed))
    }

    /// The total number of process records across all steps
    pub fn process_count(&self) -> usize {
        self.steps.iter().filter_map(|step| step.execution.as_ref()).map(|e| e.process.len()).sum()
    }
}

// ---------
// | Steps |
// ---------

/// One stage of a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// The step's identifier
    pub id: String,
    /// The kind of step, e.g. `swap` or `cross`
    #[serde(rename = "type")]
    pub step_type: String,
    /// The tool (bridge or exchange) executing the step
    pub tool: String,
    /// The network the step starts on
    pub from_chain_id: ChainId,
    /// The network the step ends on
    pub to_chain_id: ChainId,
    /// The step's estimates
    pub estimate: StepEstimate,
    /// The step's execution state, present once execution has started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution: Option<Execution>,
}

impl Step {
    /// Whether the step crosses from one network to another
    pub fn is_cross_chain(&self) -> bool {
        self.from_chain_id != self.to_chain_id
    }

    /// Whether the step's execution reached `DONE` or `FAILED`
    pub fn is_terminal(&self) -> bool {
        self.execution.as_ref().is_some_and(|e| e.status.is_terminal())
    }
}

/// The estimates attached to a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepEstimate {
    /// The estimated execution duration in seconds
    #[serde(default)]
    pub execution_duration: f64,
    /// The estimated output amount of the step
    #[serde(default, with = "option_u256_string_serialization")]
    pub to_amount: Option<U256>,
}

// -------------
// | Execution |
// -------------

/// The overall execution status of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    /// Execution has not started
    NotStarted,
    /// Execution is in progress
    Pending,
    /// The user must act (e.g. sign) before execution continues
    ActionRequired,
    /// The step executed successfully
    Done,
    /// The step failed
    Failed,
}

impl StepStatus {
    /// Whether the status is `DONE` or `FAILED`
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Done | StepStatus::Failed)
    }
}

/// The execution record of a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    /// The overall status of the step
    pub status: StepStatus,
    /// The sub-actions performed for the step, in order
    #[serde(default)]
    pub process: Vec<Process>,
}

/// The status of a single on-chain action within a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessStatus {
    /// The action is in flight
    Pending,
    /// The user must act before the action continues
    ActionRequired,
    /// The action succeeded
    Done,
    /// The action failed
    Failed,
}

impl ProcessStatus {
    /// Whether the status is `DONE` or `FAILED`
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessStatus::Done | ProcessStatus::Failed)
    }

    /// Whether a process may move from this status to `next`
    ///
    /// Terminal statuses are immutable; `PENDING` and `ACTION_REQUIRED` may
    /// alternate while a process waits on the user
    pub fn can_transition_to(&self, next: ProcessStatus) -> bool {
        !self.is_terminal() || *self == next
    }
}

impl Display for ProcessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessStatus::Pending => write!(f, "PENDING"),
            ProcessStatus::ActionRequired => write!(f, "ACTION_REQUIRED"),
            ProcessStatus::Done => write!(f, "DONE"),
            ProcessStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// One on-chain action (approval, swap, bridge call) within a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    /// The kind of action, e.g. `TOKEN_ALLOWANCE` or `CROSS_CHAIN`
    #[serde(rename = "type")]
    pub process_type: String,
    /// The action's status
    pub status: ProcessStatus,
    /// The hash of the transaction performing the action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    /// A block explorer link for the transaction
    #[serde(default, alias = "txLink", skip_serializing_if = "Option::is_none")]
    pub explorer_link: Option<String>,
}

impl Process {
    /// Create a new process in the given status
    pub fn new<T: ToString>(process_type: T, status: ProcessStatus) -> Self {
        Self { process_type: process_type.to_string(), status, tx_hash: None, explorer_link: None }
    }
}
