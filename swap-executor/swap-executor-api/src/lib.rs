//! Shared types and collaborator interfaces for the swap executor
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(unsafe_code)]

pub mod errors;
pub mod interfaces;
pub mod serialization;
mod types;
pub mod units;

pub use types::*;
