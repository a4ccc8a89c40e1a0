//! Inputs of the high-level operations.
//!
//! Names in these specs are short names; the operations qualify them with the
//! project prefix.

use std::collections::HashMap;

use typed_builder::TypedBuilder;

use crate::types::VariantSpec;

/// A model to register.
///
/// # Examples
///
/// ```
/// use smdeploy_sagemaker::ModelSpec;
///
/// let spec = ModelSpec::builder()
///     .name("sklearn-v1")
///     .model_data_url("s3://acme-sm-rc-churn/models/model.tar.gz")
///     .image_uri("123456789012.dkr.ecr.ap-northeast-1.amazonaws.com/sklearn:latest")
///     .build();
/// assert!(spec.environment.is_empty());
/// assert!(!spec.enable_network_isolation);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct ModelSpec {
    /// Short model name.
    #[builder(setter(into))]
    pub name: String,
    /// S3 URI of the `model.tar.gz` artifact.
    #[builder(setter(into))]
    pub model_data_url: String,
    /// Inference container image.
    #[builder(setter(into))]
    pub image_uri: String,
    /// Container environment variables.
    #[builder(default)]
    pub environment: HashMap<String, String>,
    /// Block outbound network calls from the container.
    #[builder(default = false)]
    pub enable_network_isolation: bool,
}

/// A model to register and serve from an endpoint of the same name.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct DeploySpec {
    /// The model to create.
    pub model: ModelSpec,
    /// Compute of the endpoint variant; one `ml.t2.medium` instance by default.
    #[builder(default)]
    pub variant: VariantSpec,
    /// Wait for the endpoint to be `InService`.
    #[builder(default = true)]
    pub wait: bool,
}

/// A batch transform job to start.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct TransformSpec {
    /// Short job name; a timestamp is appended.
    #[builder(setter(into))]
    pub job_name: String,
    /// Model to run; qualified if needed.
    #[builder(setter(into))]
    pub model_name: String,
    /// S3 prefix holding the input records.
    #[builder(setter(into))]
    pub input_s3_uri: String,
    /// Where results go; defaults to `s3://<bucket>/batch-transform/<job>/<timestamp>/`.
    #[builder(default, setter(strip_option, into))]
    pub output_s3_uri: Option<String>,
    /// Instance type.
    #[builder(default = String::from("ml.m5.large"), setter(into))]
    pub instance_type: String,
    /// Instance count.
    #[builder(default = 1)]
    pub instance_count: i32,
    /// MIME type of the input.
    #[builder(default = String::from("text/csv"), setter(into))]
    pub content_type: String,
    /// How input files are split into records.
    #[builder(default = String::from("Line"), setter(into))]
    pub split_type: String,
    /// `MultiRecord` or `SingleRecord`.
    #[builder(default = String::from("MultiRecord"), setter(into))]
    pub strategy: String,
    /// Maximum payload per request in MB.
    #[builder(default = 6)]
    pub max_payload_mb: i32,
    /// Wait until the job completes, fails or is stopped.
    #[builder(default = true)]
    pub wait: bool,
}

/// What to remove along with an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOptions {
    /// Delete the endpoint config backing the endpoint.
    pub delete_config: bool,
    /// Delete the models referenced by that config; requires `delete_config`.
    pub delete_model: bool,
}

impl Default for DeleteOptions {
    fn default() -> Self {
        Self {
            delete_config: true,
            delete_model: false,
        }
    }
}
