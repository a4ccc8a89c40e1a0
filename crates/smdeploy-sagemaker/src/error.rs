//! Errors raised by resource operations.

use smdeploy_core::{ConfigError, PlatformError};

/// Failure of a deploy, endpoint or batch transform operation.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The deployment configuration could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A SageMaker call failed.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// The resource did not reach the awaited state in time.
    #[error("timed out waiting for {resource} after {attempts} attempts")]
    WaitTimedOut {
        /// Resource name.
        resource: String,
        /// Number of status checks made.
        attempts: u32,
    },

    /// The resource entered a state it cannot leave.
    #[error("{resource} entered status {status}{}", reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
    WaitFailed {
        /// Resource name.
        resource: String,
        /// Terminal status.
        status: String,
        /// Failure reason reported by the service.
        reason: Option<String>,
    },

    /// A request payload could not be encoded.
    #[error("failed to encode payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenient result alias for operations.
pub type DeployResult<T> = Result<T, DeployError>;

impl DeployError {
    /// Whether the underlying platform error means "already exists".
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::Platform(e) if e.is_already_exists())
    }

    /// Whether the underlying platform error means "not found".
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Platform(e) if e.is_not_found())
    }
}
