//! Request, summary and status types exchanged with SageMaker.
//!
//! These are the shapes the [`crate::SageMakerApi`] seam speaks. They carry
//! fully qualified names; prefixing happens in the operation layer.

use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use smdeploy_core::{Tag, VpcPlacement};

/// Name of the single production variant every endpoint config carries.
pub const VARIANT_NAME: &str = "AllTraffic";

/// Lifecycle status of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EndpointStatus {
    /// `OutOfService`
    OutOfService,
    /// `Creating`
    Creating,
    /// `Updating`
    Updating,
    /// `SystemUpdating`
    SystemUpdating,
    /// `RollingBack`
    RollingBack,
    /// `InService`
    InService,
    /// `Deleting`
    Deleting,
    /// `Failed`
    Failed,
    /// `UpdateRollbackFailed`
    UpdateRollbackFailed,
    /// A status this crate does not know about.
    Unknown(String),
}

impl EndpointStatus {
    /// Wire name of the status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::OutOfService => "OutOfService",
            Self::Creating => "Creating",
            Self::Updating => "Updating",
            Self::SystemUpdating => "SystemUpdating",
            Self::RollingBack => "RollingBack",
            Self::InService => "InService",
            Self::Deleting => "Deleting",
            Self::Failed => "Failed",
            Self::UpdateRollbackFailed => "UpdateRollbackFailed",
            Self::Unknown(s) => s,
        }
    }

    /// Whether waiting for `InService` can no longer succeed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::UpdateRollbackFailed)
    }
}

impl From<&str> for EndpointStatus {
    fn from(s: &str) -> Self {
        match s {
            "OutOfService" => Self::OutOfService,
            "Creating" => Self::Creating,
            "Updating" => Self::Updating,
            "SystemUpdating" => Self::SystemUpdating,
            "RollingBack" => Self::RollingBack,
            "InService" => Self::InService,
            "Deleting" => Self::Deleting,
            "Failed" => Self::Failed,
            "UpdateRollbackFailed" => Self::UpdateRollbackFailed,
            other => Self::Unknown(other.to_owned()),
        }
    }
}

impl fmt::Display for EndpointStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EndpointStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Lifecycle status of a batch transform job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransformJobStatus {
    /// `InProgress`
    InProgress,
    /// `Completed`
    Completed,
    /// `Failed`
    Failed,
    /// `Stopping`
    Stopping,
    /// `Stopped`
    Stopped,
    /// A status this crate does not know about.
    Unknown(String),
}

impl TransformJobStatus {
    /// Wire name of the status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::InProgress => "InProgress",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Stopping => "Stopping",
            Self::Stopped => "Stopped",
            Self::Unknown(s) => s,
        }
    }

    /// Whether the job has finished, successfully or not.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Stopped)
    }
}

impl From<&str> for TransformJobStatus {
    fn from(s: &str) -> Self {
        match s {
            "InProgress" => Self::InProgress,
            "Completed" => Self::Completed,
            "Failed" => Self::Failed,
            "Stopping" => Self::Stopping,
            "Stopped" => Self::Stopped,
            other => Self::Unknown(other.to_owned()),
        }
    }
}

impl fmt::Display for TransformJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TransformJobStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Compute backing the `AllTraffic` variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantSpec {
    /// Provisioned instances.
    RealTime {
        /// Instance type, e.g. `ml.t2.medium`.
        instance_type: String,
        /// Initial instance count.
        instance_count: i32,
    },
    /// Serverless inference.
    Serverless {
        /// Memory per worker in MB.
        memory_mb: i32,
        /// Maximum concurrent invocations.
        max_concurrency: i32,
    },
}

impl VariantSpec {
    /// Default real-time instance type.
    pub const DEFAULT_INSTANCE_TYPE: &str = "ml.t2.medium";
    /// Default serverless memory size.
    pub const DEFAULT_MEMORY_MB: i32 = 2048;
    /// Default serverless concurrency.
    pub const DEFAULT_MAX_CONCURRENCY: i32 = 5;

    /// Real-time variant with the given instance type and count.
    #[must_use]
    pub fn real_time(instance_type: impl Into<String>, instance_count: i32) -> Self {
        Self::RealTime {
            instance_type: instance_type.into(),
            instance_count,
        }
    }

    /// Serverless variant with default memory and concurrency.
    #[must_use]
    pub fn serverless() -> Self {
        Self::Serverless {
            memory_mb: Self::DEFAULT_MEMORY_MB,
            max_concurrency: Self::DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl Default for VariantSpec {
    fn default() -> Self {
        Self::real_time(Self::DEFAULT_INSTANCE_TYPE, 1)
    }
}

/// Input of `CreateModel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateModelRequest {
    /// Qualified model name.
    pub model_name: String,
    /// Inference container image.
    pub image_uri: String,
    /// S3 URI of the model artifact.
    pub model_data_url: String,
    /// Container environment.
    pub environment: HashMap<String, String>,
    /// Role the model runs as.
    pub execution_role_arn: String,
    /// Subnets and security groups.
    pub vpc: VpcPlacement,
    /// Block outbound network calls from the container.
    pub enable_network_isolation: bool,
    /// Resource tags.
    pub tags: Vec<Tag>,
}

/// Input of `CreateEndpointConfig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEndpointConfigRequest {
    /// Qualified config name.
    pub config_name: String,
    /// Qualified model served by the variant.
    pub model_name: String,
    /// Compute of the `AllTraffic` variant.
    pub variant: VariantSpec,
    /// Resource tags.
    pub tags: Vec<Tag>,
}

/// Input of `CreateTransformJob`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTransformJobRequest {
    /// Unique job name.
    pub job_name: String,
    /// Qualified model name.
    pub model_name: String,
    /// S3 prefix holding the input records.
    pub input_s3_uri: String,
    /// MIME type of the input.
    pub content_type: String,
    /// How input files are split into records (`Line`, `None`, ...).
    pub split_type: String,
    /// S3 prefix for the results.
    pub output_s3_uri: String,
    /// Instance type.
    pub instance_type: String,
    /// Instance count.
    pub instance_count: i32,
    /// `MultiRecord` or `SingleRecord`.
    pub strategy: String,
    /// Maximum payload per request in MB.
    pub max_payload_mb: i32,
    /// Resource tags.
    pub tags: Vec<Tag>,
}

/// Input of `InvokeEndpoint`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeRequest {
    /// Qualified endpoint name.
    pub endpoint_name: String,
    /// MIME type of `body`.
    pub content_type: String,
    /// Accepted response MIME type.
    pub accept: String,
    /// Request payload.
    pub body: Bytes,
}

/// A model as listed by `ListModels`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    /// Model name.
    pub name: String,
    /// Model ARN.
    pub arn: String,
    /// Creation time, when reported.
    pub creation_time: Option<DateTime<Utc>>,
}

/// Result of `DescribeEndpoint`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDescription {
    /// Endpoint name.
    pub name: String,
    /// Endpoint ARN.
    pub arn: String,
    /// Config currently backing the endpoint.
    pub config_name: String,
    /// Current status.
    pub status: EndpointStatus,
    /// Reason of the last failure, if any.
    pub failure_reason: Option<String>,
}

/// An endpoint as listed by `ListEndpoints`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSummary {
    /// Endpoint name.
    pub name: String,
    /// Current status.
    pub status: EndpointStatus,
    /// Creation time, when reported.
    pub creation_time: Option<DateTime<Utc>>,
    /// Last modification time, when reported.
    pub last_modified: Option<DateTime<Utc>>,
}

/// Result of `DescribeTransformJob`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformJobDescription {
    /// Job name.
    pub name: String,
    /// Current status.
    pub status: TransformJobStatus,
    /// Reason of the failure, if any.
    pub failure_reason: Option<String>,
    /// S3 prefix the results are written to.
    pub output_path: Option<String>,
}

/// A job as listed by `ListTransformJobs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformJobSummary {
    /// Job name.
    pub name: String,
    /// Current status.
    pub status: TransformJobStatus,
    /// Creation time, when reported.
    pub creation_time: Option<DateTime<Utc>>,
    /// End time, once finished.
    pub end_time: Option<DateTime<Utc>>,
}
