//! Batch transform operations.

use tracing::{error, info, warn};

use crate::api::SageMakerApi;
use crate::deployer::Deployer;
use crate::error::DeployResult;
use crate::spec::TransformSpec;
use crate::types::{
    CreateTransformJobRequest, TransformJobDescription, TransformJobStatus, TransformJobSummary,
};

/// Default page size of [`Deployer::list_transform_jobs`].
pub const DEFAULT_MAX_RESULTS: i32 = 20;

impl<A: SageMakerApi> Deployer<A> {
    /// Start a batch transform job named `<prefix>-<job>-<timestamp>`.
    ///
    /// When `spec.wait` is set, polls until the job completes or is stopped and
    /// logs the outcome; a job that fails is returned as
    /// [`DeployError::WaitFailed`](crate::DeployError::WaitFailed). Returns the
    /// job name.
    pub async fn create_batch_transform(&self, spec: &TransformSpec) -> DeployResult<String> {
        let timestamp = self.timestamp();
        let job_name = format!("{}-{timestamp}", self.config.qualify(&spec.job_name));
        let output_s3_uri = spec.output_s3_uri.clone().unwrap_or_else(|| {
            format!(
                "s3://{}/batch-transform/{}/{timestamp}/",
                self.config.bucket, spec.job_name
            )
        });

        let request = CreateTransformJobRequest {
            job_name: job_name.clone(),
            model_name: self.config.qualify(&spec.model_name),
            input_s3_uri: spec.input_s3_uri.clone(),
            content_type: spec.content_type.clone(),
            split_type: spec.split_type.clone(),
            output_s3_uri,
            instance_type: spec.instance_type.clone(),
            instance_count: spec.instance_count,
            strategy: spec.strategy.clone(),
            max_payload_mb: spec.max_payload_mb,
            tags: self.config.default_tags(),
        };
        self.api.create_transform_job(&request).await?;
        info!(
            job = %job_name,
            input = %request.input_s3_uri,
            output = %request.output_s3_uri,
            "transform job created"
        );

        if spec.wait {
            let job = self.wait_for_transform_job(&job_name).await?;
            log_outcome(&job, &request.output_s3_uri);
        }
        Ok(job_name)
    }

    /// Describe a batch transform job.
    pub async fn describe_transform_job(&self, name: &str) -> DeployResult<TransformJobDescription> {
        Ok(self
            .api
            .describe_transform_job(&self.config.qualify(name))
            .await?)
    }

    /// Ask a running job to stop. Returns `false` (and logs) on any failure.
    pub async fn stop_transform_job(&self, name: &str) -> bool {
        let job_name = self.config.qualify(name);
        match self.api.stop_transform_job(&job_name).await {
            Ok(()) => {
                info!(job = %job_name, "transform job stopping");
                true
            }
            Err(e) => {
                error!(job = %job_name, error = %e, "failed to stop transform job");
                false
            }
        }
    }

    /// Up to `max_results` jobs of this project, newest first.
    pub async fn list_transform_jobs(
        &self,
        max_results: Option<i32>,
    ) -> DeployResult<Vec<TransformJobSummary>> {
        Ok(self
            .api
            .list_transform_jobs(
                &self.config.name_prefix(),
                max_results.unwrap_or(DEFAULT_MAX_RESULTS),
            )
            .await?)
    }
}

fn log_outcome(job: &TransformJobDescription, output: &str) {
    match &job.status {
        TransformJobStatus::Completed => {
            info!(job = %job.name, output = %output, "transform job completed");
        }
        status => warn!(
            job = %job.name,
            status = %status,
            reason = job.failure_reason.as_deref().unwrap_or("unknown"),
            "transform job stopped before completing"
        ),
    }
}
