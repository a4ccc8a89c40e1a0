//! Configuration resolution and naming rules for smdeploy.
//!
//! This crate decides *where* and *under which names* SageMaker resources are
//! created for a team/project: it resolves a [`DeployConfig`] from explicit
//! overrides, environment variables and SageMaker domain discovery, and
//! provides the prefixing and role-naming rules every operation shares.
//!
//! # Architecture
//!
//! ```text
//!  ConfigOverrides ──┐
//!  EnvSource ────────┼──> ConfigResolver ──> Arc<DeployConfig>
//!  PlatformMetadata ─┘        │
//!                        FlightCache (per overrides, single-flight)
//! ```

mod cache;
pub mod config;
pub mod discovery;
pub mod env;
mod error;
pub mod naming;
mod resolver;
#[cfg(test)]
mod testing;
mod types;

pub use cache::FlightCache;
pub use config::{ConfigOverrides, DeployConfig, Tag, VpcPlacement};
pub use discovery::{DomainDescription, PlatformMetadata, ProjectIdentity};
pub use env::{EnvSource, ProcessEnv};
pub use error::{ConfigError, ConfigResult, PlatformError, RequiredField};
pub use resolver::{ConfigResolver, DEFAULT_COMPANY};
pub use types::{AccountId, AwsRegion};
