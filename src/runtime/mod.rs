//! Runtime support for the middleware.
//!
//! This module provides execution-environment detection and the
//! per-request context the lifecycle hooks share.

mod context;
mod cycle;

pub use context::Environment;
pub use cycle::RequestCycle;
