//! Route execution orchestration and the swap session controller
//!
//! A [`session::SwapSession`] turns a user's swap form into discovered
//! routes, hands the selected route to an [`orchestrator::ExecutionOrchestrator`]
//! and folds the engine's progress back into the session state

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(unsafe_code)]
#![deny(clippy::needless_pass_by_ref_mut)]
#![deny(clippy::unused_async)]

pub mod engines;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod progress;
pub mod session;
pub mod telemetry;
pub mod wallet;

#[cfg(test)]
mod test_helpers;
