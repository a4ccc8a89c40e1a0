//! Environment variable access.
//!
//! The resolver reads every variable through [`EnvSource`] so tests can supply a
//! fixed map instead of mutating the process environment.

use std::collections::HashMap;

/// Environment variables read by the resolver.
pub mod vars {
    /// Company name used in the IAM path, tags and default bucket.
    pub const COMPANY: &str = "COMPANY";
    /// Team id.
    pub const TEAM: &str = "TEAM";
    /// Project name.
    pub const PROJECT: &str = "PROJECT";
    /// SageMaker domain id.
    pub const DOMAIN_ID: &str = "DOMAIN_ID";
    /// SageMaker user profile name.
    pub const USER_PROFILE_NAME: &str = "USER_PROFILE_NAME";
    /// VPC id.
    pub const VPC_ID: &str = "VPC_ID";
    /// First private subnet.
    pub const PRIVATE_SUBNET_1_ID: &str = "PRIVATE_SUBNET_1_ID";
    /// Second private subnet.
    pub const PRIVATE_SUBNET_2_ID: &str = "PRIVATE_SUBNET_2_ID";
    /// Studio security group.
    pub const SG_SAGEMAKER_STUDIO: &str = "SG_SAGEMAKER_STUDIO";
    /// IAM path for the derived roles.
    pub const IAM_PATH: &str = "IAM_PATH";
    /// S3 bucket.
    pub const BUCKET: &str = "BUCKET";
    /// Region fallback when the SDK session has none.
    pub const AWS_REGION: &str = "AWS_REGION";

    /// `TEAM_<TEAM>_FULLNAME`, the display name used to build role names.
    #[must_use]
    pub fn team_fullname(team: &str) -> String {
        format!("TEAM_{}_FULLNAME", team.to_ascii_uppercase())
    }
}

/// A source of environment variables.
pub trait EnvSource: Send + Sync {
    /// Raw lookup.
    fn get(&self, key: &str) -> Option<String>;

    /// Lookup that treats an empty value as unset.
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_empty())
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}
