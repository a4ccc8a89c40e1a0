//! The [`Deployer`] entry point.
//!
//! A [`Deployer`] binds a [`SageMakerApi`] to one resolved [`DeployConfig`].
//! Individual operations are implemented in the [`crate::ops`] submodules.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use smdeploy_core::{ConfigOverrides, ConfigResolver, DeployConfig};
use tracing::info;

use crate::api::SageMakerApi;
use crate::error::{DeployError, DeployResult};
use crate::types::{
    EndpointDescription, EndpointStatus, TransformJobDescription, TransformJobStatus,
};
use crate::waiter::{Probe, WaitPolicy, poll_until};

/// Format of the timestamps appended to config and job names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Creates, updates, invokes and removes the SageMaker resources of one project.
///
/// Cloning is cheap; clones share the API client and configuration.
pub struct Deployer<A> {
    pub(crate) api: Arc<A>,
    pub(crate) config: Arc<DeployConfig>,
    pub(crate) endpoint_wait: WaitPolicy,
    pub(crate) transform_wait: WaitPolicy,
    pub(crate) clock: fn() -> DateTime<Utc>,
}

impl<A: SageMakerApi> Deployer<A> {
    /// Bind `api` to an already resolved configuration.
    ///
    /// Fails with [`DeployError::Config`] when a required field of `config` is
    /// empty.
    pub fn new(api: Arc<A>, config: Arc<DeployConfig>) -> DeployResult<Self> {
        config.validate()?;
        Ok(Self {
            api,
            config,
            endpoint_wait: WaitPolicy::ENDPOINT,
            transform_wait: WaitPolicy::TRANSFORM_JOB,
            clock: Utc::now,
        })
    }

    /// Resolve the configuration for `overrides` and bind `api` to it.
    pub async fn from_resolver(
        api: Arc<A>,
        resolver: &ConfigResolver,
        overrides: &ConfigOverrides,
    ) -> DeployResult<Self> {
        let config = resolver.resolve(overrides).await?;
        Self::new(api, config)
    }

    /// Replace the policy used when waiting for endpoints.
    #[must_use]
    pub fn with_endpoint_wait(mut self, policy: WaitPolicy) -> Self {
        self.endpoint_wait = policy;
        self
    }

    /// Replace the policy used when waiting for batch transform jobs.
    #[must_use]
    pub fn with_transform_wait(mut self, policy: WaitPolicy) -> Self {
        self.transform_wait = policy;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// The configuration every name and tag is derived from.
    #[must_use]
    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    /// The underlying API.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    pub(crate) fn timestamp(&self) -> String {
        (self.clock)().format(TIMESTAMP_FORMAT).to_string()
    }

    /// Poll until the endpoint is `InService`.
    pub(crate) async fn wait_for_endpoint(
        &self,
        endpoint_name: &str,
    ) -> DeployResult<EndpointDescription> {
        info!(endpoint = %endpoint_name, "waiting for endpoint to be InService");
        let resource = &format!("endpoint {endpoint_name}");
        let api = &self.api;
        let endpoint = poll_until(resource, self.endpoint_wait, move || async move {
            let description = api.describe_endpoint(endpoint_name).await?;
            if description.status == EndpointStatus::InService {
                Ok(Probe::Done(description))
            } else if description.status.is_failure() {
                Err(DeployError::WaitFailed {
                    resource: resource.clone(),
                    status: description.status.to_string(),
                    reason: description.failure_reason,
                })
            } else {
                Ok(Probe::Pending(description.status.to_string()))
            }
        })
        .await?;
        info!(endpoint = %endpoint_name, "endpoint is InService");
        Ok(endpoint)
    }

    /// Poll until the job is `Completed` or `Stopped`; a `Failed` job is an error.
    pub(crate) async fn wait_for_transform_job(
        &self,
        job_name: &str,
    ) -> DeployResult<TransformJobDescription> {
        info!(job = %job_name, "waiting for transform job to finish");
        let resource = &format!("transform job {job_name}");
        let api = &self.api;
        poll_until(resource, self.transform_wait, move || async move {
            let description = api.describe_transform_job(job_name).await?;
            if description.status == TransformJobStatus::Failed {
                Err(DeployError::WaitFailed {
                    resource: resource.clone(),
                    status: description.status.to_string(),
                    reason: description.failure_reason,
                })
            } else if description.status.is_terminal() {
                Ok(Probe::Done(description))
            } else {
                Ok(Probe::Pending(description.status.to_string()))
            }
        })
        .await
    }
}

impl<A> Clone for Deployer<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            config: Arc::clone(&self.config),
            endpoint_wait: self.endpoint_wait,
            transform_wait: self.transform_wait,
            clock: self.clock,
        }
    }
}

impl<A> fmt::Debug for Deployer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deployer")
            .field("prefix", &self.config.name_prefix())
            .field("region", &self.config.region)
            .field("endpoint_wait", &self.endpoint_wait)
            .field("transform_wait", &self.transform_wait)
            .finish_non_exhaustive()
    }
}
