//! Execution engines bundled with the swap session

pub mod dry_run;

pub use dry_run::{DryRunConfig, DryRunEngine};
