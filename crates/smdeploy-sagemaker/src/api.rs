//! The SageMaker control- and data-plane calls operations are built on.
//!
//! [`SageMakerApi`] is object-safe (`#[async_trait]`) so that operations can be
//! exercised against an in-memory double. [`crate::AwsPlatform`] implements it
//! on top of the AWS SDK.

use async_trait::async_trait;
use bytes::Bytes;
use smdeploy_core::PlatformError;

use crate::types::{
    CreateEndpointConfigRequest, CreateModelRequest, CreateTransformJobRequest,
    EndpointDescription, EndpointSummary, InvokeRequest, ModelSummary, TransformJobDescription,
    TransformJobSummary,
};

/// SageMaker calls used by [`crate::Deployer`].
///
/// All names are passed through as given. Listing calls filter by substring
/// and return newest first.
#[async_trait]
pub trait SageMakerApi: Send + Sync {
    /// `CreateModel`; returns the model ARN.
    async fn create_model(&self, request: &CreateModelRequest) -> Result<String, PlatformError>;

    /// `DeleteModel`.
    async fn delete_model(&self, model_name: &str) -> Result<(), PlatformError>;

    /// `ListModels`, all pages.
    async fn list_models(&self, name_contains: &str) -> Result<Vec<ModelSummary>, PlatformError>;

    /// `CreateEndpointConfig`.
    async fn create_endpoint_config(
        &self,
        request: &CreateEndpointConfigRequest,
    ) -> Result<(), PlatformError>;

    /// `DescribeEndpointConfig`; returns the models behind its variants.
    async fn endpoint_config_models(&self, config_name: &str)
    -> Result<Vec<String>, PlatformError>;

    /// `DeleteEndpointConfig`.
    async fn delete_endpoint_config(&self, config_name: &str) -> Result<(), PlatformError>;

    /// `CreateEndpoint`.
    async fn create_endpoint(
        &self,
        endpoint_name: &str,
        config_name: &str,
        tags: &[smdeploy_core::Tag],
    ) -> Result<(), PlatformError>;

    /// `UpdateEndpoint`.
    async fn update_endpoint(
        &self,
        endpoint_name: &str,
        config_name: &str,
    ) -> Result<(), PlatformError>;

    /// `DescribeEndpoint`.
    async fn describe_endpoint(
        &self,
        endpoint_name: &str,
    ) -> Result<EndpointDescription, PlatformError>;

    /// `DeleteEndpoint`.
    async fn delete_endpoint(&self, endpoint_name: &str) -> Result<(), PlatformError>;

    /// `ListEndpoints`, all pages.
    async fn list_endpoints(
        &self,
        name_contains: &str,
    ) -> Result<Vec<EndpointSummary>, PlatformError>;

    /// `InvokeEndpoint` on the runtime API; returns the raw response body.
    async fn invoke_endpoint(&self, request: &InvokeRequest) -> Result<Bytes, PlatformError>;

    /// `CreateTransformJob`.
    async fn create_transform_job(
        &self,
        request: &CreateTransformJobRequest,
    ) -> Result<(), PlatformError>;

    /// `DescribeTransformJob`.
    async fn describe_transform_job(
        &self,
        job_name: &str,
    ) -> Result<TransformJobDescription, PlatformError>;

    /// `StopTransformJob`.
    async fn stop_transform_job(&self, job_name: &str) -> Result<(), PlatformError>;

    /// `ListTransformJobs`, a single page of at most `max_results`.
    async fn list_transform_jobs(
        &self,
        name_contains: &str,
        max_results: i32,
    ) -> Result<Vec<TransformJobSummary>, PlatformError>;
}
