//! Integration tests for smdeploy.
//!
//! These tests call SageMaker with the ambient AWS credentials and expect a
//! Studio domain whose user profile carries `Team` and `Project` tags (or the
//! `TEAM` and `PROJECT` variables). They are marked `#[ignore]` so they don't
//! run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p smdeploy-integration -- --ignored
//! ```
//!
//! The deployment round trip additionally needs `SMDEPLOY_TEST_IMAGE_URI` and
//! `SMDEPLOY_TEST_MODEL_DATA_URL`; it is skipped when either is unset.

use std::sync::{Arc, Once};

use smdeploy_core::{ConfigOverrides, ConfigResolver};
use smdeploy_sagemaker::{AwsPlatform, Deployer, WaitPolicy};

mod test_config;
mod test_deploy;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_test_writer()
            .init();
    });
}

/// Load the platform from the default AWS configuration chain.
pub async fn platform() -> Arc<AwsPlatform> {
    init_tracing();
    Arc::new(AwsPlatform::load().await)
}

/// A deployer for the ambient team/project.
///
/// # Panics
///
/// Panics when the configuration cannot be resolved.
pub async fn deployer() -> Deployer<AwsPlatform> {
    let platform = platform().await;
    let resolver = ConfigResolver::new(platform.clone());
    Deployer::from_resolver(platform, &resolver, &ConfigOverrides::new())
        .await
        .expect("resolve deployment configuration")
        .with_endpoint_wait(WaitPolicy::new(std::time::Duration::from_secs(15), 80))
}

/// Read a required test variable, `None` when unset or empty.
#[must_use]
pub fn test_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
