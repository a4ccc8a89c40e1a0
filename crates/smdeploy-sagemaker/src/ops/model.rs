//! Model operations.
//!
//! Implements `create_model`, `deploy_model`, `delete_model` and `list_models`.

use tracing::{info, warn};

use crate::api::SageMakerApi;
use crate::deployer::Deployer;
use crate::error::DeployResult;
use crate::spec::{DeploySpec, ModelSpec};
use crate::types::{CreateModelRequest, ModelSummary};

impl<A: SageMakerApi> Deployer<A> {
    /// Register a model running as the inference role inside the project VPC.
    ///
    /// A model that already exists is left untouched. Returns the qualified name.
    pub async fn create_model(&self, spec: &ModelSpec) -> DeployResult<String> {
        let model_name = self.config.qualify(&spec.name);
        let request = CreateModelRequest {
            model_name: model_name.clone(),
            image_uri: spec.image_uri.clone(),
            model_data_url: spec.model_data_url.clone(),
            environment: spec.environment.clone(),
            execution_role_arn: self.config.inference_role_arn.clone(),
            vpc: self.config.vpc_config(),
            enable_network_isolation: spec.enable_network_isolation,
            tags: self.config.default_tags(),
        };

        match self.api.create_model(&request).await {
            Ok(arn) => {
                info!(model = %model_name, arn = %arn, "model created");
                Ok(model_name)
            }
            Err(e) if e.is_already_exists() => {
                warn!(model = %model_name, "model already exists");
                Ok(model_name)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Create the model, a fresh endpoint config, and an endpoint named after the model.
    ///
    /// An existing endpoint is switched to the new config instead. Returns the
    /// endpoint name.
    pub async fn deploy_model(&self, spec: &DeploySpec) -> DeployResult<String> {
        let model_name = self.create_model(&spec.model).await?;
        let config_name = format!("{model_name}-config-{}", self.timestamp());
        let config_name = self
            .create_endpoint_config(&config_name, &model_name, &spec.variant)
            .await?;

        let endpoint_name = model_name;
        let tags = self.config.default_tags();
        match self
            .api
            .create_endpoint(&endpoint_name, &config_name, &tags)
            .await
        {
            Ok(()) => info!(endpoint = %endpoint_name, config = %config_name, "endpoint creating"),
            Err(e) if e.is_already_exists() => {
                warn!(endpoint = %endpoint_name, config = %config_name, "endpoint exists, updating");
                self.api.update_endpoint(&endpoint_name, &config_name).await?;
            }
            Err(e) => return Err(e.into()),
        }

        if spec.wait {
            self.wait_for_endpoint(&endpoint_name).await?;
        }
        Ok(endpoint_name)
    }

    /// Delete a model. Returns `false` if it did not exist.
    pub async fn delete_model(&self, name: &str) -> DeployResult<bool> {
        let model_name = self.config.qualify(name);
        match self.api.delete_model(&model_name).await {
            Ok(()) => {
                info!(model = %model_name, "model deleted");
                Ok(true)
            }
            Err(e) if e.is_not_found() => {
                warn!(model = %model_name, "model not found");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Models of this project, newest first.
    pub async fn list_models(&self) -> DeployResult<Vec<ModelSummary>> {
        Ok(self.api.list_models(&self.config.name_prefix()).await?)
    }
}
