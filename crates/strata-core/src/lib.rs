//! Strata Core
//!
//! Shared building blocks for the Strata panel runtime: generational storage,
//! scratch-object pooling, protected hook execution, logging and profiling.

pub mod alloc;
pub mod logging;
pub mod math;
pub mod profiling;
pub mod protected;
