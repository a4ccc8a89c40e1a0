//! Configuration resolution.
//!
//! [`ConfigResolver`] merges three layers per field, highest first:
//!
//! 1. explicit [`ConfigOverrides`] (company, team, project);
//! 2. process environment variables (see [`crate::env::vars`]);
//! 3. best-effort discovery from the SageMaker domain and user profile.
//!
//! Results are memoized per override set for the lifetime of the resolver.
//! Concurrent first calls with the same overrides share a single resolution.
//! Region and account id are cached separately since they do not depend on
//! the overrides.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::cache::FlightCache;
use crate::config::{ConfigOverrides, DeployConfig, DEFAULT_MODEL_PREFIX, DEFAULT_OUTPUT_PREFIX};
use crate::discovery::{self, DomainDescription, PlatformMetadata};
use crate::env::{EnvSource, ProcessEnv, vars};
use crate::error::{ConfigError, ConfigResult, RequiredField};
use crate::naming::{self, RoleKind};
use crate::types::{AccountId, AwsRegion};

/// Company used when neither an override nor `COMPANY` is given.
pub const DEFAULT_COMPANY: &str = "acme";

/// Resolves and caches [`DeployConfig`] values.
///
/// Cheap to clone; clones share the same caches.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    sources: Arc<Sources>,
    configs: Arc<FlightCache<ConfigOverrides, Arc<DeployConfig>, ConfigError>>,
}

struct Sources {
    platform: Arc<dyn PlatformMetadata>,
    env: Arc<dyn EnvSource>,
    region: OnceCell<AwsRegion>,
    account_id: OnceCell<AccountId>,
}

impl std::fmt::Debug for Sources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sources")
            .field("region", &self.region.get())
            .field("account_id", &self.account_id.get())
            .finish_non_exhaustive()
    }
}

impl ConfigResolver {
    /// Create a resolver that reads the process environment.
    #[must_use]
    pub fn new(platform: Arc<dyn PlatformMetadata>) -> Self {
        Self::with_env(platform, Arc::new(ProcessEnv))
    }

    /// Create a resolver with an explicit environment source.
    #[must_use]
    pub fn with_env(platform: Arc<dyn PlatformMetadata>, env: Arc<dyn EnvSource>) -> Self {
        Self {
            sources: Arc::new(Sources {
                platform,
                env,
                region: OnceCell::new(),
                account_id: OnceCell::new(),
            }),
            configs: Arc::new(FlightCache::new()),
        }
    }

    /// Resolve the configuration for `overrides`, or return the cached one.
    ///
    /// # Errors
    /// [`ConfigError::Unresolved`] when a required field is missing from every
    /// layer, [`ConfigError::Platform`] when the identity call fails.
    pub async fn resolve(&self, overrides: &ConfigOverrides) -> ConfigResult<Arc<DeployConfig>> {
        let sources = Arc::clone(&self.sources);
        let key = overrides.clone();
        self.configs
            .get_or_try_init(overrides.clone(), move || {
                async move { sources.resolve(&key).await.map(Arc::new) }.boxed()
            })
            .await
    }

    /// Resolve with no overrides.
    ///
    /// # Errors
    /// See [`Self::resolve`].
    pub async fn resolve_default(&self) -> ConfigResult<Arc<DeployConfig>> {
        self.resolve(&ConfigOverrides::default()).await
    }

    /// The session region, resolved once.
    pub async fn region(&self) -> AwsRegion {
        self.sources.region().await
    }

    /// The caller's account id, resolved once.
    ///
    /// # Errors
    /// Propagates identity-call failures.
    pub async fn account_id(&self) -> ConfigResult<AccountId> {
        self.sources.account_id().await
    }
}

impl Sources {
    fn env(&self, key: &str) -> Option<String> {
        self.env.var(key)
    }

    async fn region(&self) -> AwsRegion {
        self.region
            .get_or_init(|| async {
                let region = AwsRegion::first_of([
                    self.platform.session_region(),
                    self.env(vars::AWS_REGION),
                ]);
                debug!(region = %region, "resolved region");
                region
            })
            .await
            .clone()
    }

    async fn account_id(&self) -> ConfigResult<AccountId> {
        self.account_id
            .get_or_try_init(|| async {
                self.platform
                    .caller_account_id()
                    .await
                    .map_err(ConfigError::from)
                    .and_then(AccountId::new)
            })
            .await
            .cloned()
    }

    async fn resolve(&self, overrides: &ConfigOverrides) -> ConfigResult<DeployConfig> {
        let platform = self.platform.as_ref();
        let env = self.env.as_ref();

        let domain = discovery::discover_domain(platform, env)
            .await
            .unwrap_or_default();
        let identity = discovery::discover_identity(platform, env)
            .await
            .unwrap_or_default();

        let company = non_empty(overrides.company.clone())
            .or_else(|| self.env(vars::COMPANY))
            .unwrap_or_else(|| DEFAULT_COMPANY.to_owned());
        let team = pick(
            overrides.team.clone(),
            identity.team.clone(),
            self.env(vars::TEAM),
        )
        .ok_or(RequiredField::Team)?;
        let project = pick(
            overrides.project.clone(),
            identity.project.clone(),
            self.env(vars::PROJECT),
        )
        .ok_or(RequiredField::Project)?;

        let region = self.region().await;
        let account_id = self.account_id().await?;

        let network = self.network(&domain)?;
        let (inference_role_arn, execution_role_arn) =
            self.role_arns(&company, &team, &project, &account_id);
        let bucket = self
            .env(vars::BUCKET)
            .unwrap_or_else(|| format!("{company}-sm-{team}-{project}"));

        let config = DeployConfig {
            company,
            team,
            project,
            region,
            account_id,
            vpc_id: network.vpc_id,
            subnet_ids: network.subnet_ids,
            security_group_ids: network.security_group_ids,
            inference_role_arn,
            execution_role_arn,
            bucket,
            model_prefix: DEFAULT_MODEL_PREFIX.to_owned(),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_owned(),
            tags: Default::default(),
        };
        config.validate()?;

        info!(
            team = %config.team,
            project = %config.project,
            region = %config.region,
            vpc_id = %config.vpc_id,
            "resolved deployment configuration"
        );
        Ok(config)
    }

    /// VPC, subnets and security groups; environment first, then the domain.
    fn network(&self, domain: &DomainDescription) -> ConfigResult<DomainDescription> {
        let vpc_id = self
            .env(vars::VPC_ID)
            .or_else(|| non_empty(Some(domain.vpc_id.clone())))
            .ok_or(RequiredField::VpcId)?;

        let mut subnet_ids: Vec<String> = [vars::PRIVATE_SUBNET_1_ID, vars::PRIVATE_SUBNET_2_ID]
            .into_iter()
            .filter_map(|key| self.env(key))
            .collect();
        if subnet_ids.is_empty() {
            subnet_ids.clone_from(&domain.subnet_ids);
        }
        if subnet_ids.is_empty() {
            return Err(RequiredField::SubnetIds.into());
        }

        let security_group_ids = match self.env(vars::SG_SAGEMAKER_STUDIO) {
            Some(sg) => vec![sg],
            None => domain.security_group_ids.clone(),
        };
        if security_group_ids.is_empty() {
            return Err(RequiredField::SecurityGroupIds.into());
        }

        Ok(DomainDescription {
            vpc_id,
            subnet_ids,
            security_group_ids,
        })
    }

    fn role_arns(
        &self,
        company: &str,
        team: &str,
        project: &str,
        account_id: &AccountId,
    ) -> (String, String) {
        let team_fullname = self
            .env(&vars::team_fullname(team))
            .unwrap_or_else(|| team.to_owned());
        // An explicitly empty IAM_PATH selects the root path.
        let iam_path = self
            .env
            .get(vars::IAM_PATH)
            .unwrap_or_else(|| format!("/{company}-sagemaker/"));
        let iam_path = naming::normalize_iam_path(&iam_path);

        let arn = |kind| {
            let name = naming::role_name(&team_fullname, project, kind);
            naming::role_arn(account_id.as_str(), &iam_path, &name)
        };
        (arn(RoleKind::Inference), arn(RoleKind::Execution))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Override, then discovered value, then environment.
fn pick(
    explicit: Option<String>,
    discovered: Option<String>,
    env: Option<String>,
) -> Option<String> {
    non_empty(explicit)
        .or_else(|| non_empty(discovered))
        .or(env)
}
