//! API types for the swap executor

pub mod chain;
pub mod execution;
pub mod intent;
pub mod progress;
pub mod route;

pub use chain::*;
pub use execution::*;
pub use intent::*;
pub use progress::*;
pub use route::*;
