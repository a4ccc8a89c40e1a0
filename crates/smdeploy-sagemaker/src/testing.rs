//! In-memory [`SageMakerApi`] that records every call.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use smdeploy_core::{AccountId, AwsRegion, DeployConfig, PlatformError, Tag};

use crate::api::SageMakerApi;
use crate::deployer::Deployer;
use crate::types::{
    CreateEndpointConfigRequest, CreateModelRequest, CreateTransformJobRequest,
    EndpointDescription, EndpointStatus, EndpointSummary, InvokeRequest, ModelSummary,
    TransformJobDescription, TransformJobStatus, TransformJobSummary,
};
use crate::waiter::WaitPolicy;

pub(crate) const PREFIX: &str = "rc-churn";

pub(crate) fn sample_config() -> DeployConfig {
    DeployConfig::builder()
        .company("acme".into())
        .team("rc".into())
        .project("churn".into())
        .region(AwsRegion::default())
        .account_id(AccountId::new("123456789012").expect("account"))
        .vpc_id("vpc-1".into())
        .subnet_ids(vec!["subnet-a".into(), "subnet-b".into()])
        .security_group_ids(vec!["sg-1".into()])
        .inference_role_arn("arn:aws:iam::123456789012:role/I".into())
        .execution_role_arn("arn:aws:iam::123456789012:role/E".into())
        .bucket("acme-sm-rc-churn".into())
        .build()
}

/// 2024-03-05 06:07:08 UTC.
pub(crate) fn fixed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 5, 6, 7, 8)
        .single()
        .expect("valid date")
}

pub(crate) const FIXED_TIMESTAMP: &str = "20240305-060708";

/// A deployer over `api` that polls every millisecond.
pub(crate) fn deployer(api: FakeSageMaker) -> (Arc<FakeSageMaker>, Deployer<FakeSageMaker>) {
    let api = Arc::new(api);
    let fast = WaitPolicy::new(std::time::Duration::from_millis(1), 5);
    let deployer = Deployer::new(Arc::clone(&api), Arc::new(sample_config()))
        .expect("valid config")
        .with_endpoint_wait(fast)
        .with_transform_wait(fast)
        .with_clock(fixed_clock);
    (api, deployer)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    CreateModel(CreateModelRequest),
    DeleteModel(String),
    ListModels(String),
    CreateEndpointConfig(CreateEndpointConfigRequest),
    EndpointConfigModels(String),
    DeleteEndpointConfig(String),
    CreateEndpoint {
        endpoint: String,
        config: String,
        tags: Vec<Tag>,
    },
    UpdateEndpoint {
        endpoint: String,
        config: String,
    },
    DescribeEndpoint(String),
    DeleteEndpoint(String),
    ListEndpoints(String),
    InvokeEndpoint(InvokeRequest),
    CreateTransformJob(CreateTransformJobRequest),
    DescribeTransformJob(String),
    StopTransformJob(String),
    ListTransformJobs(String, i32),
}

#[derive(Debug, Default)]
struct State {
    models: Vec<String>,
    configs: HashMap<String, Vec<String>>,
    endpoints: HashMap<String, String>,
    endpoint_statuses: VecDeque<EndpointStatus>,
    jobs: HashMap<String, CreateTransformJobRequest>,
    job_statuses: VecDeque<TransformJobStatus>,
    failure_reason: Option<String>,
    invoke_response: Bytes,
    failing: HashSet<&'static str>,
}

#[derive(Debug, Default)]
pub(crate) struct FakeSageMaker {
    calls: Mutex<Vec<Call>>,
    state: Mutex<State>,
}

impl FakeSageMaker {
    pub(crate) fn with_model(self, name: &str) -> Self {
        self.state.lock().models.push(name.to_owned());
        self
    }

    pub(crate) fn with_config(self, name: &str, models: &[&str]) -> Self {
        self.state.lock().configs.insert(
            name.to_owned(),
            models.iter().map(|m| (*m).to_owned()).collect(),
        );
        self
    }

    pub(crate) fn with_endpoint(self, name: &str, config: &str) -> Self {
        self.state
            .lock()
            .endpoints
            .insert(name.to_owned(), config.to_owned());
        self
    }

    /// Statuses returned by successive `DescribeEndpoint` calls; the last one sticks.
    pub(crate) fn with_endpoint_statuses(self, statuses: &[EndpointStatus]) -> Self {
        self.state.lock().endpoint_statuses = statuses.iter().cloned().collect();
        self
    }

    /// Statuses returned by successive `DescribeTransformJob` calls; the last one sticks.
    pub(crate) fn with_job_statuses(self, statuses: &[TransformJobStatus]) -> Self {
        self.state.lock().job_statuses = statuses.iter().cloned().collect();
        self
    }

    pub(crate) fn with_failure_reason(self, reason: &str) -> Self {
        self.state.lock().failure_reason = Some(reason.to_owned());
        self
    }

    pub(crate) fn with_invoke_response(self, body: &'static [u8]) -> Self {
        self.state.lock().invoke_response = Bytes::from_static(body);
        self
    }

    /// Make every call of `operation` fail.
    pub(crate) fn failing(self, operation: &'static str) -> Self {
        self.state.lock().failing.insert(operation);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub(crate) fn models(&self) -> Vec<String> {
        self.state.lock().models.clone()
    }

    pub(crate) fn has_config(&self, name: &str) -> bool {
        self.state.lock().configs.contains_key(name)
    }

    pub(crate) fn has_endpoint(&self, name: &str) -> bool {
        self.state.lock().endpoints.contains_key(name)
    }

    fn record(&self, operation: &'static str, call: Call) -> Result<(), PlatformError> {
        self.calls.lock().push(call);
        if self.state.lock().failing.contains(operation) {
            return Err(PlatformError::message(operation, "injected failure"));
        }
        Ok(())
    }
}

fn next_status<T: Clone>(queue: &mut VecDeque<T>, fallback: T) -> T {
    if queue.len() > 1 {
        queue.pop_front().unwrap_or(fallback)
    } else {
        queue.front().cloned().unwrap_or(fallback)
    }
}

fn created() -> Option<DateTime<Utc>> {
    Some(fixed_clock())
}

#[async_trait]
impl SageMakerApi for FakeSageMaker {
    async fn create_model(&self, request: &CreateModelRequest) -> Result<String, PlatformError> {
        self.record("CreateModel", Call::CreateModel(request.clone()))?;
        let mut state = self.state.lock();
        let arn = format!(
            "arn:aws:sagemaker:ap-northeast-1:123456789012:model/{}",
            request.model_name
        );
        if state.models.contains(&request.model_name) {
            return Err(PlatformError::message(
                "CreateModel",
                format!("Cannot create already existing model \"{arn}\"."),
            ));
        }
        state.models.push(request.model_name.clone());
        Ok(arn)
    }

    async fn delete_model(&self, model_name: &str) -> Result<(), PlatformError> {
        self.record("DeleteModel", Call::DeleteModel(model_name.to_owned()))?;
        let mut state = self.state.lock();
        let before = state.models.len();
        state.models.retain(|m| m != model_name);
        if state.models.len() == before {
            return Err(PlatformError::message(
                "DeleteModel",
                format!("Could not find model \"{model_name}\"."),
            ));
        }
        Ok(())
    }

    async fn list_models(&self, name_contains: &str) -> Result<Vec<ModelSummary>, PlatformError> {
        self.record("ListModels", Call::ListModels(name_contains.to_owned()))?;
        let state = self.state.lock();
        Ok(state
            .models
            .iter()
            .rev()
            .filter(|m| m.contains(name_contains))
            .map(|m| ModelSummary {
                name: m.clone(),
                arn: format!("arn:aws:sagemaker:ap-northeast-1:123456789012:model/{m}"),
                creation_time: created(),
            })
            .collect())
    }

    async fn create_endpoint_config(
        &self,
        request: &CreateEndpointConfigRequest,
    ) -> Result<(), PlatformError> {
        self.record(
            "CreateEndpointConfig",
            Call::CreateEndpointConfig(request.clone()),
        )?;
        self.state.lock().configs.insert(
            request.config_name.clone(),
            vec![request.model_name.clone()],
        );
        Ok(())
    }

    async fn endpoint_config_models(
        &self,
        config_name: &str,
    ) -> Result<Vec<String>, PlatformError> {
        self.record(
            "DescribeEndpointConfig",
            Call::EndpointConfigModels(config_name.to_owned()),
        )?;
        self.state
            .lock()
            .configs
            .get(config_name)
            .cloned()
            .ok_or_else(|| {
                PlatformError::message(
                    "DescribeEndpointConfig",
                    format!("Could not find endpoint configuration \"{config_name}\"."),
                )
            })
    }

    async fn delete_endpoint_config(&self, config_name: &str) -> Result<(), PlatformError> {
        self.record(
            "DeleteEndpointConfig",
            Call::DeleteEndpointConfig(config_name.to_owned()),
        )?;
        self.state.lock().configs.remove(config_name);
        Ok(())
    }

    async fn create_endpoint(
        &self,
        endpoint_name: &str,
        config_name: &str,
        tags: &[Tag],
    ) -> Result<(), PlatformError> {
        self.record(
            "CreateEndpoint",
            Call::CreateEndpoint {
                endpoint: endpoint_name.to_owned(),
                config: config_name.to_owned(),
                tags: tags.to_vec(),
            },
        )?;
        let mut state = self.state.lock();
        if state.endpoints.contains_key(endpoint_name) {
            return Err(PlatformError::message(
                "CreateEndpoint",
                format!(
                    "Cannot create already existing endpoint \"arn:aws:sagemaker:ap-northeast-1:123456789012:endpoint/{endpoint_name}\"."
                ),
            ));
        }
        state
            .endpoints
            .insert(endpoint_name.to_owned(), config_name.to_owned());
        Ok(())
    }

    async fn update_endpoint(
        &self,
        endpoint_name: &str,
        config_name: &str,
    ) -> Result<(), PlatformError> {
        self.record(
            "UpdateEndpoint",
            Call::UpdateEndpoint {
                endpoint: endpoint_name.to_owned(),
                config: config_name.to_owned(),
            },
        )?;
        match self.state.lock().endpoints.get_mut(endpoint_name) {
            Some(config) => {
                config_name.clone_into(config);
                Ok(())
            }
            None => Err(PlatformError::message(
                "UpdateEndpoint",
                format!("Could not find endpoint \"{endpoint_name}\"."),
            )),
        }
    }

    async fn describe_endpoint(
        &self,
        endpoint_name: &str,
    ) -> Result<EndpointDescription, PlatformError> {
        self.record(
            "DescribeEndpoint",
            Call::DescribeEndpoint(endpoint_name.to_owned()),
        )?;
        let mut state = self.state.lock();
        let Some(config_name) = state.endpoints.get(endpoint_name).cloned() else {
            return Err(PlatformError::message(
                "DescribeEndpoint",
                format!("Could not find endpoint \"{endpoint_name}\"."),
            ));
        };
        let status = next_status(&mut state.endpoint_statuses, EndpointStatus::InService);
        Ok(EndpointDescription {
            name: endpoint_name.to_owned(),
            arn: format!("arn:aws:sagemaker:ap-northeast-1:123456789012:endpoint/{endpoint_name}"),
            config_name,
            status,
            failure_reason: state.failure_reason.clone(),
        })
    }

    async fn delete_endpoint(&self, endpoint_name: &str) -> Result<(), PlatformError> {
        self.record("DeleteEndpoint", Call::DeleteEndpoint(endpoint_name.to_owned()))?;
        match self.state.lock().endpoints.remove(endpoint_name) {
            Some(_) => Ok(()),
            None => Err(PlatformError::message(
                "DeleteEndpoint",
                format!("Could not find endpoint \"{endpoint_name}\"."),
            )),
        }
    }

    async fn list_endpoints(
        &self,
        name_contains: &str,
    ) -> Result<Vec<EndpointSummary>, PlatformError> {
        self.record("ListEndpoints", Call::ListEndpoints(name_contains.to_owned()))?;
        let state = self.state.lock();
        let mut names: Vec<&String> = state
            .endpoints
            .keys()
            .filter(|e| e.contains(name_contains))
            .collect();
        names.sort();
        Ok(names
            .into_iter()
            .map(|name| EndpointSummary {
                name: name.clone(),
                status: EndpointStatus::InService,
                creation_time: created(),
                last_modified: None,
            })
            .collect())
    }

    async fn invoke_endpoint(&self, request: &InvokeRequest) -> Result<Bytes, PlatformError> {
        self.record("InvokeEndpoint", Call::InvokeEndpoint(request.clone()))?;
        Ok(self.state.lock().invoke_response.clone())
    }

    async fn create_transform_job(
        &self,
        request: &CreateTransformJobRequest,
    ) -> Result<(), PlatformError> {
        self.record(
            "CreateTransformJob",
            Call::CreateTransformJob(request.clone()),
        )?;
        self.state
            .lock()
            .jobs
            .insert(request.job_name.clone(), request.clone());
        Ok(())
    }

    async fn describe_transform_job(
        &self,
        job_name: &str,
    ) -> Result<TransformJobDescription, PlatformError> {
        self.record(
            "DescribeTransformJob",
            Call::DescribeTransformJob(job_name.to_owned()),
        )?;
        let mut state = self.state.lock();
        let Some(output) = state.jobs.get(job_name).map(|j| j.output_s3_uri.clone()) else {
            return Err(PlatformError::message(
                "DescribeTransformJob",
                format!("Could not find job \"{job_name}\"."),
            ));
        };
        let status = next_status(&mut state.job_statuses, TransformJobStatus::Completed);
        Ok(TransformJobDescription {
            name: job_name.to_owned(),
            failure_reason: (status == TransformJobStatus::Failed)
                .then(|| state.failure_reason.clone())
                .flatten(),
            status,
            output_path: Some(output),
        })
    }

    async fn stop_transform_job(&self, job_name: &str) -> Result<(), PlatformError> {
        self.record("StopTransformJob", Call::StopTransformJob(job_name.to_owned()))
    }

    async fn list_transform_jobs(
        &self,
        name_contains: &str,
        max_results: i32,
    ) -> Result<Vec<TransformJobSummary>, PlatformError> {
        self.record(
            "ListTransformJobs",
            Call::ListTransformJobs(name_contains.to_owned(), max_results),
        )?;
        let state = self.state.lock();
        let mut names: Vec<&String> = state
            .jobs
            .keys()
            .filter(|j| j.contains(name_contains))
            .collect();
        names.sort();
        Ok(names
            .into_iter()
            .take(usize::try_from(max_results).unwrap_or(0))
            .map(|name| TransformJobSummary {
                name: name.clone(),
                status: TransformJobStatus::Completed,
                creation_time: created(),
                end_time: created(),
            })
            .collect())
    }
}
