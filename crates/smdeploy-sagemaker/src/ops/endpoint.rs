//! Endpoint operations.
//!
//! Implements endpoint config creation, endpoint create/update/delete,
//! invocation, describe and list.

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::SageMakerApi;
use crate::deployer::Deployer;
use crate::error::DeployResult;
use crate::spec::DeleteOptions;
use crate::types::{
    CreateEndpointConfigRequest, EndpointDescription, EndpointSummary, InvokeRequest, VariantSpec,
};

const APPLICATION_JSON: &str = "application/json";

impl<A: SageMakerApi> Deployer<A> {
    /// Create an endpoint config with a single `AllTraffic` variant serving `model_name`.
    ///
    /// Returns the qualified config name.
    pub async fn create_endpoint_config(
        &self,
        name: &str,
        model_name: &str,
        variant: &VariantSpec,
    ) -> DeployResult<String> {
        let request = CreateEndpointConfigRequest {
            config_name: self.config.qualify(name),
            model_name: self.config.qualify(model_name),
            variant: variant.clone(),
            tags: self.config.default_tags(),
        };
        self.api.create_endpoint_config(&request).await?;
        info!(config = %request.config_name, model = %request.model_name, "endpoint config created");
        Ok(request.config_name)
    }

    /// Create an endpoint from an existing config, optionally waiting for `InService`.
    pub async fn create_endpoint(
        &self,
        name: &str,
        config_name: &str,
        wait: bool,
    ) -> DeployResult<String> {
        let endpoint_name = self.config.qualify(name);
        let config_name = self.config.qualify(config_name);
        self.api
            .create_endpoint(&endpoint_name, &config_name, &self.config.default_tags())
            .await?;
        info!(endpoint = %endpoint_name, config = %config_name, "endpoint creating");

        if wait {
            self.wait_for_endpoint(&endpoint_name).await?;
        }
        Ok(endpoint_name)
    }

    /// Switch an endpoint to another config (blue/green), optionally waiting for `InService`.
    pub async fn update_endpoint(
        &self,
        name: &str,
        config_name: &str,
        wait: bool,
    ) -> DeployResult<String> {
        let endpoint_name = self.config.qualify(name);
        let config_name = self.config.qualify(config_name);
        self.api.update_endpoint(&endpoint_name, &config_name).await?;
        info!(endpoint = %endpoint_name, config = %config_name, "endpoint updating");

        if wait {
            self.wait_for_endpoint(&endpoint_name).await?;
        }
        Ok(endpoint_name)
    }

    /// Delete an endpoint and, on request, its config and the config's models.
    ///
    /// Returns `false` when the endpoint does not exist. Failures while removing
    /// the config or models are logged and do not fail the call.
    pub async fn delete_endpoint(&self, name: &str, options: DeleteOptions) -> DeployResult<bool> {
        let endpoint_name = self.config.qualify(name);
        let endpoint = match self.api.describe_endpoint(&endpoint_name).await {
            Ok(endpoint) => endpoint,
            Err(e) if e.is_not_found() => {
                warn!(endpoint = %endpoint_name, "endpoint not found");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        match self.api.delete_endpoint(&endpoint_name).await {
            Ok(()) => info!(endpoint = %endpoint_name, "endpoint deleted"),
            Err(e) if e.is_not_found() => {
                warn!(endpoint = %endpoint_name, "endpoint not found");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        }

        if options.delete_config {
            self.delete_config_and_models(&endpoint.config_name, options.delete_model)
                .await;
        }
        Ok(true)
    }

    async fn delete_config_and_models(&self, config_name: &str, delete_models: bool) {
        let models = match self.api.endpoint_config_models(config_name).await {
            Ok(models) => models,
            Err(e) => {
                warn!(config = %config_name, error = %e, "could not describe endpoint config");
                return;
            }
        };

        if let Err(e) = self.api.delete_endpoint_config(config_name).await {
            warn!(config = %config_name, error = %e, "could not delete endpoint config");
            return;
        }
        info!(config = %config_name, "endpoint config deleted");

        if !delete_models {
            return;
        }
        for model in models {
            match self.api.delete_model(&model).await {
                Ok(()) => info!(model = %model, "model deleted"),
                Err(e) => warn!(model = %model, error = %e, "could not delete model"),
            }
        }
    }

    /// Send `body` to an endpoint and return the raw response.
    pub async fn invoke_endpoint(
        &self,
        name: &str,
        content_type: &str,
        accept: &str,
        body: impl Into<Bytes>,
    ) -> DeployResult<Bytes> {
        let request = InvokeRequest {
            endpoint_name: self.config.qualify(name),
            content_type: content_type.to_owned(),
            accept: accept.to_owned(),
            body: body.into(),
        };
        let response = self.api.invoke_endpoint(&request).await?;
        debug!(
            endpoint = %request.endpoint_name,
            request_bytes = request.body.len(),
            response_bytes = response.len(),
            "endpoint invoked"
        );
        Ok(response)
    }

    /// Send `payload` as JSON and parse the response as JSON.
    ///
    /// A response that is not valid JSON comes back as a JSON string holding the
    /// raw text.
    pub async fn invoke_json<T>(&self, name: &str, payload: &T) -> DeployResult<Value>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(payload)?;
        let response = self
            .invoke_endpoint(name, APPLICATION_JSON, APPLICATION_JSON, body)
            .await?;
        Ok(serde_json::from_slice(&response)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&response).into_owned())))
    }

    /// Describe an endpoint.
    pub async fn describe_endpoint(&self, name: &str) -> DeployResult<EndpointDescription> {
        Ok(self
            .api
            .describe_endpoint(&self.config.qualify(name))
            .await?)
    }

    /// Endpoints of this project, newest first.
    pub async fn list_endpoints(&self) -> DeployResult<Vec<EndpointSummary>> {
        Ok(self.api.list_endpoints(&self.config.name_prefix()).await?)
    }
}
