//! Error types for configuration resolution and platform calls.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// A configuration value that must be resolved from some layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    /// Team id (`TEAM`, or the user profile's `Team` tag).
    Team,
    /// Project name (`PROJECT`, or the user profile's `Project` tag).
    Project,
    /// VPC id (`VPC_ID`, or the domain's VPC).
    VpcId,
    /// Private subnets (`PRIVATE_SUBNET_1_ID` / `PRIVATE_SUBNET_2_ID`, or the domain's subnets).
    SubnetIds,
    /// Security groups (`SG_SAGEMAKER_STUDIO`, or the domain's default user settings).
    SecurityGroupIds,
}

impl RequiredField {
    /// How an operator supplies this value.
    #[must_use]
    pub fn hint(self) -> &'static str {
        match self {
            Self::Team => "set TEAM or tag the user profile with Team",
            Self::Project => "set PROJECT or tag the user profile with Project",
            Self::VpcId => "set VPC_ID",
            Self::SubnetIds => "set PRIVATE_SUBNET_1_ID and PRIVATE_SUBNET_2_ID",
            Self::SecurityGroupIds => "set SG_SAGEMAKER_STUDIO",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Team => "team",
            Self::Project => "project",
            Self::VpcId => "VPC id",
            Self::SubnetIds => "subnet ids",
            Self::SecurityGroupIds => "security group ids",
        })
    }
}

/// Failure of a call against the SageMaker, STS or runtime APIs.
///
/// Cloneable so that one failed call can be reported to every caller waiting on it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PlatformError {
    /// The service returned an error, or the request never completed.
    #[error("{operation} failed: {message}")]
    Service {
        /// API operation name, e.g. `DescribeDomain`.
        operation: &'static str,
        /// Service error code, e.g. `ValidationException`.
        code: Option<String>,
        /// Service error message.
        message: String,
        /// The underlying SDK error.
        source: Option<Arc<dyn StdError + Send + Sync>>,
    },

    /// A request could not be assembled from the given input.
    #[error("invalid {operation} request: {message}")]
    InvalidRequest {
        /// API operation name.
        operation: &'static str,
        /// What was wrong.
        message: String,
    },

    /// The response lacked a value the caller depends on.
    #[error("{operation} response is missing {field}")]
    MalformedResponse {
        /// API operation name.
        operation: &'static str,
        /// Missing member.
        field: &'static str,
    },
}

impl PlatformError {
    /// Wrap a service failure.
    pub fn service<E>(
        operation: &'static str,
        code: Option<String>,
        message: impl Into<String>,
        source: E,
    ) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Service {
            operation,
            code,
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }

    /// A service failure with no underlying error value (used by test doubles).
    pub fn message(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Service {
            operation,
            code: None,
            message: message.into(),
            source: None,
        }
    }

    /// The API operation that failed.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Service { operation, .. }
            | Self::InvalidRequest { operation, .. }
            | Self::MalformedResponse { operation, .. } => operation,
        }
    }

    /// The service error code, if the service returned one.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Whether the service refused to create something that already exists.
    ///
    /// SageMaker reports these as `ValidationException`s, so the message is inspected.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        match self {
            Self::Service { message, .. } => {
                let message = message.to_ascii_lowercase();
                message.contains("already exist")
            }
            _ => false,
        }
    }

    /// Whether the service could not find the named resource.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Service { code, message, .. } => {
                code.as_deref() == Some("ResourceNotFound")
                    || message.to_ascii_lowercase().contains("could not find")
            }
            _ => false,
        }
    }
}

/// Configuration resolution error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// A required value was absent from every layer.
    #[error("could not resolve {field}: {}", .field.hint())]
    Unresolved {
        /// The value that could not be resolved.
        field: RequiredField,
    },

    /// The identity call returned something that is not an account id.
    #[error("invalid AWS account ID: {0} (must be 12-digit numeric string)")]
    InvalidAccountId(String),

    /// A required platform call (caller identity) failed.
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl ConfigError {
    /// The unresolved field, when this is an [`ConfigError::Unresolved`] error.
    #[must_use]
    pub fn field(&self) -> Option<RequiredField> {
        match self {
            Self::Unresolved { field } => Some(*field),
            _ => None,
        }
    }
}

impl From<RequiredField> for ConfigError {
    fn from(field: RequiredField) -> Self {
        Self::Unresolved { field }
    }
}

/// Convenience result type for configuration resolution.
pub type ConfigResult<T> = Result<T, ConfigError>;
