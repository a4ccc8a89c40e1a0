//! The resolved deployment configuration.
//!
//! [`DeployConfig`] is produced by [`crate::ConfigResolver`] and read by every
//! resource operation: it fixes the naming prefix, tags, roles, network
//! placement and storage location for one team/project.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::{ConfigResult, RequiredField};
use crate::naming;
use crate::types::{AccountId, AwsRegion};

/// Default key prefix for model artifacts in the project bucket.
pub const DEFAULT_MODEL_PREFIX: &str = "models";

/// Default key prefix for inference output in the project bucket.
pub const DEFAULT_OUTPUT_PREFIX: &str = "inference/output";

/// Fully resolved, immutable deployment configuration.
///
/// # Examples
///
/// ```
/// use smdeploy_core::{AccountId, AwsRegion, DeployConfig};
///
/// let config = DeployConfig::builder()
///     .company("acme".into())
///     .team("rc".into())
///     .project("fraud-detection".into())
///     .region(AwsRegion::default())
///     .account_id(AccountId::new("123456789012").unwrap())
///     .vpc_id("vpc-1".into())
///     .subnet_ids(vec!["subnet-a".into()])
///     .security_group_ids(vec!["sg-1".into()])
///     .inference_role_arn("arn:aws:iam::123456789012:role/Inference".into())
///     .execution_role_arn("arn:aws:iam::123456789012:role/Execution".into())
///     .bucket("acme-sm-rc-fraud-detection".into())
///     .build();
///
/// assert_eq!(config.name_prefix(), "rc-fraud-detection");
/// assert_eq!(config.qualify("xgb"), "rc-fraud-detection-xgb");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct DeployConfig {
    /// Company name.
    pub company: String,
    /// Team id.
    pub team: String,
    /// Project name.
    pub project: String,
    /// Region all clients are bound to.
    pub region: AwsRegion,
    /// Account the roles live in.
    pub account_id: AccountId,

    /// VPC the models run in.
    pub vpc_id: String,
    /// Private subnets, in preference order.
    pub subnet_ids: Vec<String>,
    /// Security groups attached to model containers.
    pub security_group_ids: Vec<String>,

    /// Role assumed by models and endpoints.
    pub inference_role_arn: String,
    /// Role assumed by jobs.
    pub execution_role_arn: String,

    /// Project bucket.
    pub bucket: String,
    /// Key prefix for model artifacts.
    #[builder(default = DEFAULT_MODEL_PREFIX.to_owned())]
    #[serde(default = "default_model_prefix")]
    pub model_prefix: String,
    /// Key prefix for inference output.
    #[builder(default = DEFAULT_OUTPUT_PREFIX.to_owned())]
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,

    /// Extra tags applied to every created resource.
    #[builder(default)]
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

fn default_model_prefix() -> String {
    DEFAULT_MODEL_PREFIX.to_owned()
}

fn default_output_prefix() -> String {
    DEFAULT_OUTPUT_PREFIX.to_owned()
}

/// A resource tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: String,
}

impl Tag {
    /// Create a tag.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Network placement passed to `CreateModel`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VpcPlacement {
    /// Subnet ids.
    pub subnets: Vec<String>,
    /// Security group ids.
    pub security_group_ids: Vec<String>,
}

impl DeployConfig {
    /// `<team>-<project>`, the prefix shared by every resource of this project.
    ///
    /// IAM policies for the project roles only allow resources carrying this prefix.
    #[must_use]
    pub fn name_prefix(&self) -> String {
        format!("{}-{}", self.team, self.project)
    }

    /// Qualify a short resource name with [`Self::name_prefix`].
    #[must_use]
    pub fn qualify(&self, name: &str) -> String {
        naming::qualify(&self.name_prefix(), name)
    }

    /// Placement for `CreateModel`; every model must run inside the VPC.
    #[must_use]
    pub fn vpc_config(&self) -> VpcPlacement {
        VpcPlacement {
            subnets: self.subnet_ids.clone(),
            security_group_ids: self.security_group_ids.clone(),
        }
    }

    /// `Team`, `Project` and `ManagedBy` followed by the extra tags.
    #[must_use]
    pub fn default_tags(&self) -> Vec<Tag> {
        let mut tags = vec![
            Tag::new("Team", &self.team),
            Tag::new("Project", &self.project),
            Tag::new("ManagedBy", format!("{}-sagemaker", self.company)),
        ];
        tags.extend(self.tags.iter().map(|(k, v)| Tag::new(k, v)));
        tags
    }

    /// A copy of this configuration with additional tags.
    #[must_use]
    pub fn with_tags<I, K, V>(&self, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut config = self.clone();
        config
            .tags
            .extend(tags.into_iter().map(|(k, v)| (k.into(), v.into())));
        config
    }

    /// Check that every required field is populated.
    ///
    /// Records from [`crate::ConfigResolver`] always pass. Records assembled with
    /// the builder or deserialized must pass before resources are created from them.
    pub fn validate(&self) -> ConfigResult<()> {
        let missing = |values: &[String]| values.is_empty() || values.iter().any(String::is_empty);
        let field = if self.team.is_empty() {
            Some(RequiredField::Team)
        } else if self.project.is_empty() {
            Some(RequiredField::Project)
        } else if self.vpc_id.is_empty() {
            Some(RequiredField::VpcId)
        } else if missing(&self.subnet_ids) {
            Some(RequiredField::SubnetIds)
        } else if missing(&self.security_group_ids) {
            Some(RequiredField::SecurityGroupIds)
        } else {
            None
        };
        field.map_or(Ok(()), |field| Err(field.into()))
    }

    /// `s3://<bucket>/<model_prefix>/<key>`.
    #[must_use]
    pub fn model_uri(&self, key: &str) -> String {
        format!("s3://{}/{}/{key}", self.bucket, self.model_prefix)
    }
}

/// Caller-supplied values that take precedence over every other source.
///
/// Also the cache key of [`crate::ConfigResolver`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConfigOverrides {
    /// Company override.
    pub company: Option<String>,
    /// Team override.
    pub team: Option<String>,
    /// Project override.
    pub project: Option<String>,
}

impl ConfigOverrides {
    /// No overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the company.
    #[must_use]
    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Override the team.
    #[must_use]
    pub fn team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    /// Override the project.
    #[must_use]
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }
}
