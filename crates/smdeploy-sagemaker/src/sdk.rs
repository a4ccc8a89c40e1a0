//! [`SageMakerApi`] and [`PlatformMetadata`] on top of the AWS SDK.
//!
//! One [`AwsPlatform`] holds the SageMaker, SageMaker runtime and STS clients
//! built from a single [`SdkConfig`], so discovery and operations share the
//! same credentials and region.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_sagemaker::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_sagemaker::primitives::DateTime as SdkDateTime;
use aws_sdk_sagemaker::types::{
    AssemblyType, BatchStrategy, ContainerDefinition, EndpointSortKey,
    EndpointStatus as SdkEndpointStatus, ModelSortKey, OrderKey, ProductionVariant,
    ProductionVariantInstanceType, ProductionVariantServerlessConfig, S3DataType, SortBy,
    SortOrder, SplitType, Tag as SdkTag, TransformDataSource, TransformInput,
    TransformInstanceType, TransformJobStatus as SdkTransformJobStatus, TransformOutput,
    TransformResources, TransformS3DataSource, VpcConfig,
};
use aws_sdk_sagemakerruntime::primitives::Blob;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use smdeploy_core::{DomainDescription, PlatformError, PlatformMetadata, Tag};
use tracing::debug;

use crate::api::SageMakerApi;
use crate::types::{
    CreateEndpointConfigRequest, CreateModelRequest, CreateTransformJobRequest,
    EndpointDescription, EndpointStatus, EndpointSummary, InvokeRequest, ModelSummary,
    TransformJobDescription, TransformJobStatus, TransformJobSummary, VARIANT_NAME, VariantSpec,
};

/// AWS-backed platform client.
#[derive(Clone)]
pub struct AwsPlatform {
    sagemaker: aws_sdk_sagemaker::Client,
    runtime: aws_sdk_sagemakerruntime::Client,
    sts: aws_sdk_sts::Client,
    region: Option<String>,
}

impl AwsPlatform {
    /// Build clients from the default credential and region chain.
    pub async fn load() -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::from_conf(&config)
    }

    /// Build clients from an existing SDK configuration.
    #[must_use]
    pub fn from_conf(config: &SdkConfig) -> Self {
        Self {
            sagemaker: aws_sdk_sagemaker::Client::new(config),
            runtime: aws_sdk_sagemakerruntime::Client::new(config),
            sts: aws_sdk_sts::Client::new(config),
            region: config.region().map(ToString::to_string),
        }
    }
}

impl fmt::Debug for AwsPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsPlatform")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

/// Map an SDK failure, keeping the service code and message.
fn sdk_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> PlatformError
where
    E: ProvideErrorMetadata + StdError + Send + Sync + 'static,
    R: fmt::Debug + Send + Sync + 'static,
{
    let code = err.code().map(str::to_owned);
    let message = err
        .message()
        .map_or_else(|| DisplayErrorContext(&err).to_string(), str::to_owned);
    debug!(operation, code = ?code, message = %message, "SageMaker call failed");
    PlatformError::service(operation, code, message, err)
}

fn build_error(operation: &'static str, err: &BuildError) -> PlatformError {
    PlatformError::InvalidRequest {
        operation,
        message: err.to_string(),
    }
}

/// Required members come back as `&str`, optional ones as `Option<&str>`.
fn opt_str<'a>(value: impl Into<Option<&'a str>>) -> Option<&'a str> {
    value.into()
}

/// Same as [`opt_str`] for non-string members.
fn opt<'a, T: ?Sized>(value: impl Into<Option<&'a T>>) -> Option<&'a T> {
    value.into()
}

fn owned(value: Option<&str>) -> String {
    value.unwrap_or_default().to_owned()
}

fn to_chrono(value: &SdkDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(value.secs(), value.subsec_nanos())
}

fn sdk_tags(operation: &'static str, tags: &[Tag]) -> Result<Vec<SdkTag>, PlatformError> {
    tags.iter()
        .map(|tag| {
            SdkTag::builder()
                .key(&tag.key)
                .value(&tag.value)
                .build()
        })
        .map(Ok)
        .collect()
}

#[async_trait]
impl PlatformMetadata for AwsPlatform {
    async fn first_domain_id(&self) -> Result<Option<String>, PlatformError> {
        let output = self
            .sagemaker
            .list_domains()
            .max_results(1)
            .send()
            .await
            .map_err(|e| sdk_error("ListDomains", e))?;
        Ok(output
            .domains()
            .first()
            .and_then(|d| opt_str(d.domain_id()))
            .map(str::to_owned))
    }

    async fn describe_domain(&self, domain_id: &str) -> Result<DomainDescription, PlatformError> {
        let output = self
            .sagemaker
            .describe_domain()
            .domain_id(domain_id)
            .send()
            .await
            .map_err(|e| sdk_error("DescribeDomain", e))?;
        Ok(DomainDescription {
            vpc_id: owned(opt_str(output.vpc_id())),
            subnet_ids: output.subnet_ids().to_vec(),
            security_group_ids: output
                .default_user_settings()
                .map(|s| s.security_groups().to_vec())
                .unwrap_or_default(),
        })
    }

    async fn user_profile_tags(
        &self,
        domain_id: &str,
        user_profile_name: &str,
    ) -> Result<HashMap<String, String>, PlatformError> {
        let profile = self
            .sagemaker
            .describe_user_profile()
            .domain_id(domain_id)
            .user_profile_name(user_profile_name)
            .send()
            .await
            .map_err(|e| sdk_error("DescribeUserProfile", e))?;
        let arn = opt_str(profile.user_profile_arn()).ok_or(PlatformError::MalformedResponse {
            operation: "DescribeUserProfile",
            field: "UserProfileArn",
        })?;

        let mut tags = HashMap::new();
        let mut pages = self
            .sagemaker
            .list_tags()
            .resource_arn(arn)
            .into_paginator()
            .send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| sdk_error("ListTags", e))?;
            for tag in page.tags() {
                tags.insert(owned(opt_str(tag.key())), owned(opt_str(tag.value())));
            }
        }
        Ok(tags)
    }

    async fn caller_account_id(&self) -> Result<String, PlatformError> {
        let identity = self
            .sts
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| sdk_error("GetCallerIdentity", e))?;
        opt_str(identity.account())
            .map(str::to_owned)
            .ok_or(PlatformError::MalformedResponse {
                operation: "GetCallerIdentity",
                field: "Account",
            })
    }

    fn session_region(&self) -> Option<String> {
        self.region.clone()
    }
}

#[async_trait]
impl SageMakerApi for AwsPlatform {
    async fn create_model(&self, request: &CreateModelRequest) -> Result<String, PlatformError> {
        const OP: &str = "CreateModel";
        let container = ContainerDefinition::builder()
            .image(&request.image_uri)
            .model_data_url(&request.model_data_url)
            .set_environment(Some(request.environment.clone()))
            .build();
        let vpc = VpcConfig::builder()
            .set_security_group_ids(Some(request.vpc.security_group_ids.clone()))
            .set_subnets(Some(request.vpc.subnets.clone()))
            .build();

        let output = self
            .sagemaker
            .create_model()
            .model_name(&request.model_name)
            .primary_container(container)
            .execution_role_arn(&request.execution_role_arn)
            .vpc_config(vpc)
            .enable_network_isolation(request.enable_network_isolation)
            .set_tags(Some(sdk_tags(OP, &request.tags)?))
            .send()
            .await
            .map_err(|e| sdk_error(OP, e))?;
        Ok(owned(opt_str(output.model_arn())))
    }

    async fn delete_model(&self, model_name: &str) -> Result<(), PlatformError> {
        self.sagemaker
            .delete_model()
            .model_name(model_name)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteModel", e))?;
        Ok(())
    }

    async fn list_models(&self, name_contains: &str) -> Result<Vec<ModelSummary>, PlatformError> {
        let mut models = Vec::new();
        let mut pages = self
            .sagemaker
            .list_models()
            .name_contains(name_contains)
            .sort_by(ModelSortKey::CreationTime)
            .sort_order(OrderKey::Descending)
            .into_paginator()
            .send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| sdk_error("ListModels", e))?;
            models.extend(page.models().iter().map(|m| ModelSummary {
                name: owned(opt_str(m.model_name())),
                arn: owned(opt_str(m.model_arn())),
                creation_time: opt::<SdkDateTime>(m.creation_time()).and_then(to_chrono),
            }));
        }
        Ok(models)
    }

    async fn create_endpoint_config(
        &self,
        request: &CreateEndpointConfigRequest,
    ) -> Result<(), PlatformError> {
        const OP: &str = "CreateEndpointConfig";
        let variant = ProductionVariant::builder()
            .variant_name(VARIANT_NAME)
            .model_name(&request.model_name);
        let variant = match &request.variant {
            VariantSpec::RealTime {
                instance_type,
                instance_count,
            } => variant
                .instance_type(ProductionVariantInstanceType::from(instance_type.as_str()))
                .initial_instance_count(*instance_count)
                .initial_variant_weight(1.0),
            VariantSpec::Serverless {
                memory_mb,
                max_concurrency,
            } => variant.serverless_config(
                ProductionVariantServerlessConfig::builder()
                    .memory_size_in_mb(*memory_mb)
                    .max_concurrency(*max_concurrency)
                    .build(),
            ),
        }
        .build();

        self.sagemaker
            .create_endpoint_config()
            .endpoint_config_name(&request.config_name)
            .production_variants(variant)
            .set_tags(Some(sdk_tags(OP, &request.tags)?))
            .send()
            .await
            .map_err(|e| sdk_error(OP, e))?;
        Ok(())
    }

    async fn endpoint_config_models(
        &self,
        config_name: &str,
    ) -> Result<Vec<String>, PlatformError> {
        let output = self
            .sagemaker
            .describe_endpoint_config()
            .endpoint_config_name(config_name)
            .send()
            .await
            .map_err(|e| sdk_error("DescribeEndpointConfig", e))?;
        Ok(output
            .production_variants()
            .iter()
            .filter_map(|v| opt_str(v.model_name()).map(str::to_owned))
            .collect())
    }

    async fn delete_endpoint_config(&self, config_name: &str) -> Result<(), PlatformError> {
        self.sagemaker
            .delete_endpoint_config()
            .endpoint_config_name(config_name)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteEndpointConfig", e))?;
        Ok(())
    }

    async fn create_endpoint(
        &self,
        endpoint_name: &str,
        config_name: &str,
        tags: &[Tag],
    ) -> Result<(), PlatformError> {
        const OP: &str = "CreateEndpoint";
        self.sagemaker
            .create_endpoint()
            .endpoint_name(endpoint_name)
            .endpoint_config_name(config_name)
            .set_tags(Some(sdk_tags(OP, tags)?))
            .send()
            .await
            .map_err(|e| sdk_error(OP, e))?;
        Ok(())
    }

    async fn update_endpoint(
        &self,
        endpoint_name: &str,
        config_name: &str,
    ) -> Result<(), PlatformError> {
        self.sagemaker
            .update_endpoint()
            .endpoint_name(endpoint_name)
            .endpoint_config_name(config_name)
            .send()
            .await
            .map_err(|e| sdk_error("UpdateEndpoint", e))?;
        Ok(())
    }

    async fn describe_endpoint(
        &self,
        endpoint_name: &str,
    ) -> Result<EndpointDescription, PlatformError> {
        let output = self
            .sagemaker
            .describe_endpoint()
            .endpoint_name(endpoint_name)
            .send()
            .await
            .map_err(|e| sdk_error("DescribeEndpoint", e))?;
        Ok(EndpointDescription {
            name: owned(opt_str(output.endpoint_name())),
            arn: owned(opt_str(output.endpoint_arn())),
            config_name: owned(opt_str(output.endpoint_config_name())),
            status: opt::<SdkEndpointStatus>(output.endpoint_status())
                .map_or(EndpointStatus::Unknown(String::new()), |s| {
                    EndpointStatus::from(s.as_str())
                }),
            failure_reason: opt_str(output.failure_reason()).map(str::to_owned),
        })
    }

    async fn delete_endpoint(&self, endpoint_name: &str) -> Result<(), PlatformError> {
        self.sagemaker
            .delete_endpoint()
            .endpoint_name(endpoint_name)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteEndpoint", e))?;
        Ok(())
    }

    async fn list_endpoints(
        &self,
        name_contains: &str,
    ) -> Result<Vec<EndpointSummary>, PlatformError> {
        let mut endpoints = Vec::new();
        let mut pages = self
            .sagemaker
            .list_endpoints()
            .name_contains(name_contains)
            .sort_by(EndpointSortKey::CreationTime)
            .sort_order(OrderKey::Descending)
            .into_paginator()
            .send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| sdk_error("ListEndpoints", e))?;
            endpoints.extend(page.endpoints().iter().map(|e| EndpointSummary {
                name: owned(opt_str(e.endpoint_name())),
                status: opt::<SdkEndpointStatus>(e.endpoint_status())
                    .map_or(EndpointStatus::Unknown(String::new()), |s| {
                        EndpointStatus::from(s.as_str())
                    }),
                creation_time: opt::<SdkDateTime>(e.creation_time()).and_then(to_chrono),
                last_modified: opt::<SdkDateTime>(e.last_modified_time()).and_then(to_chrono),
            }));
        }
        Ok(endpoints)
    }

    async fn invoke_endpoint(&self, request: &InvokeRequest) -> Result<Bytes, PlatformError> {
        let output = self
            .runtime
            .invoke_endpoint()
            .endpoint_name(&request.endpoint_name)
            .content_type(&request.content_type)
            .accept(&request.accept)
            .body(Blob::new(request.body.to_vec()))
            .send()
            .await
            .map_err(|e| sdk_error("InvokeEndpoint", e))?;
        Ok(opt::<Blob>(output.body())
            .map(|b| Bytes::copy_from_slice(b.as_ref()))
            .unwrap_or_default())
    }

    async fn create_transform_job(
        &self,
        request: &CreateTransformJobRequest,
    ) -> Result<(), PlatformError> {
        const OP: &str = "CreateTransformJob";
        let s3 = TransformS3DataSource::builder()
            .s3_data_type(S3DataType::S3Prefix)
            .s3_uri(&request.input_s3_uri)
            .build();
        let source = TransformDataSource::builder()
            .s3_data_source(s3)
            .build();
        let input = TransformInput::builder()
            .data_source(source)
            .content_type(&request.content_type)
            .split_type(SplitType::from(request.split_type.as_str()))
            .build();
        let output = TransformOutput::builder()
            .s3_output_path(&request.output_s3_uri)
            .assemble_with(AssemblyType::Line)
            .build();
        let resources = TransformResources::builder()
            .instance_type(TransformInstanceType::from(request.instance_type.as_str()))
            .instance_count(request.instance_count)
            .build();

        self.sagemaker
            .create_transform_job()
            .transform_job_name(&request.job_name)
            .model_name(&request.model_name)
            .transform_input(input)
            .transform_output(output)
            .transform_resources(resources)
            .batch_strategy(BatchStrategy::from(request.strategy.as_str()))
            .max_payload_in_mb(request.max_payload_mb)
            .set_tags(Some(sdk_tags(OP, &request.tags)?))
            .send()
            .await
            .map_err(|e| sdk_error(OP, e))?;
        Ok(())
    }

    async fn describe_transform_job(
        &self,
        job_name: &str,
    ) -> Result<TransformJobDescription, PlatformError> {
        let output = self
            .sagemaker
            .describe_transform_job()
            .transform_job_name(job_name)
            .send()
            .await
            .map_err(|e| sdk_error("DescribeTransformJob", e))?;
        Ok(TransformJobDescription {
            name: owned(opt_str(output.transform_job_name())),
            status: opt::<SdkTransformJobStatus>(output.transform_job_status())
                .map_or(TransformJobStatus::Unknown(String::new()), |s| {
                    TransformJobStatus::from(s.as_str())
                }),
            failure_reason: opt_str(output.failure_reason()).map(str::to_owned),
            output_path: output
                .transform_output()
                .and_then(|o| opt_str(o.s3_output_path()))
                .map(str::to_owned),
        })
    }

    async fn stop_transform_job(&self, job_name: &str) -> Result<(), PlatformError> {
        self.sagemaker
            .stop_transform_job()
            .transform_job_name(job_name)
            .send()
            .await
            .map_err(|e| sdk_error("StopTransformJob", e))?;
        Ok(())
    }

    async fn list_transform_jobs(
        &self,
        name_contains: &str,
        max_results: i32,
    ) -> Result<Vec<TransformJobSummary>, PlatformError> {
        let output = self
            .sagemaker
            .list_transform_jobs()
            .name_contains(name_contains)
            .sort_by(SortBy::CreationTime)
            .sort_order(SortOrder::Descending)
            .max_results(max_results)
            .send()
            .await
            .map_err(|e| sdk_error("ListTransformJobs", e))?;
        Ok(output
            .transform_job_summaries()
            .iter()
            .map(|j| TransformJobSummary {
                name: owned(opt_str(j.transform_job_name())),
                status: opt::<SdkTransformJobStatus>(j.transform_job_status())
                    .map_or(TransformJobStatus::Unknown(String::new()), |s| {
                        TransformJobStatus::from(s.as_str())
                    }),
                creation_time: opt::<SdkDateTime>(j.creation_time()).and_then(to_chrono),
                end_time: opt::<SdkDateTime>(j.transform_end_time()).and_then(to_chrono),
            })
            .collect())
    }
}
