//! Best-effort discovery from the SageMaker domain and user profile.
//!
//! When running inside SageMaker Studio, the domain knows the VPC, subnets and
//! security groups, and the user profile carries `Team` / `Project` tags. These
//! lookups fill gaps left by the environment; they never fail resolution. Any
//! error is logged at `debug` with the step that failed and treated as "nothing
//! discovered".

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use crate::env::{EnvSource, vars};
use crate::error::PlatformError;

/// Network settings of a SageMaker domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainDescription {
    /// VPC id, empty when the domain does not report one.
    pub vpc_id: String,
    /// Subnets the domain launches into.
    pub subnet_ids: Vec<String>,
    /// Security groups from the domain's default user settings.
    pub security_group_ids: Vec<String>,
}

/// Team and project read from user-profile tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectIdentity {
    /// Value of the `Team` tag, if any.
    pub team: Option<String>,
    /// Value of the `Project` tag, if any.
    pub project: Option<String>,
}

impl ProjectIdentity {
    /// Extract identity from a tag map; tags must be named exactly `Team` and `Project`.
    #[must_use]
    pub fn from_tags(tags: &HashMap<String, String>) -> Self {
        let pick = |key: &str| tags.get(key).filter(|v| !v.is_empty()).cloned();
        Self {
            team: pick("Team"),
            project: pick("Project"),
        }
    }
}

/// Read-only platform calls the resolver depends on.
#[async_trait]
pub trait PlatformMetadata: Send + Sync {
    /// Id of the first SageMaker domain in the account, if any.
    async fn first_domain_id(&self) -> Result<Option<String>, PlatformError>;

    /// Describe a SageMaker domain.
    async fn describe_domain(&self, domain_id: &str) -> Result<DomainDescription, PlatformError>;

    /// Tags of a user profile.
    async fn user_profile_tags(
        &self,
        domain_id: &str,
        user_profile_name: &str,
    ) -> Result<HashMap<String, String>, PlatformError>;

    /// Account id of the calling identity.
    async fn caller_account_id(&self) -> Result<String, PlatformError>;

    /// Region configured on the SDK session, if any.
    fn session_region(&self) -> Option<String>;
}

/// Look up network placement from the current (or first) domain.
pub async fn discover_domain(
    platform: &dyn PlatformMetadata,
    env: &dyn EnvSource,
) -> Option<DomainDescription> {
    let domain_id = match env.var(vars::DOMAIN_ID) {
        Some(id) => id,
        None => match platform.first_domain_id().await {
            Ok(Some(id)) if !id.is_empty() => id,
            Ok(_) => {
                debug!("no SageMaker domain found");
                return None;
            }
            Err(e) => {
                debug!(step = "list_domains", error = %e, "domain discovery skipped");
                return None;
            }
        },
    };

    match platform.describe_domain(&domain_id).await {
        Ok(domain) => {
            debug!(
                domain_id = %domain_id,
                vpc_id = %domain.vpc_id,
                subnets = domain.subnet_ids.len(),
                security_groups = domain.security_group_ids.len(),
                "discovered domain network settings"
            );
            Some(domain)
        }
        Err(e) => {
            debug!(step = "describe_domain", domain_id = %domain_id, error = %e, "domain discovery skipped");
            None
        }
    }
}

/// Look up team and project from the current user profile's tags.
///
/// Only attempted when both `DOMAIN_ID` and `USER_PROFILE_NAME` are set.
pub async fn discover_identity(
    platform: &dyn PlatformMetadata,
    env: &dyn EnvSource,
) -> Option<ProjectIdentity> {
    let (Some(domain_id), Some(profile)) = (
        env.var(vars::DOMAIN_ID),
        env.var(vars::USER_PROFILE_NAME),
    ) else {
        return None;
    };

    match platform.user_profile_tags(&domain_id, &profile).await {
        Ok(tags) => {
            let identity = ProjectIdentity::from_tags(&tags);
            debug!(
                user_profile = %profile,
                team = ?identity.team,
                project = ?identity.project,
                "discovered project identity"
            );
            Some(identity)
        }
        Err(e) => {
            debug!(step = "user_profile_tags", user_profile = %profile, error = %e, "identity discovery skipped");
            None
        }
    }
}
