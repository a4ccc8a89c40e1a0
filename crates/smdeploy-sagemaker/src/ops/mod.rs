//! Resource operations.
//!
//! Each submodule adds methods to [`crate::Deployer`]: models (and the
//! one-call deploy), endpoints, and batch transform jobs. Every name is
//! qualified with the project prefix and every created resource is tagged.

pub mod batch;
pub mod endpoint;
pub mod model;
