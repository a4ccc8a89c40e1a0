//! Deployment round trip: model, serverless endpoint, invocation, teardown.

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use smdeploy_sagemaker::{
        DeleteOptions, DeploySpec, EndpointStatus, ModelSpec, TIMESTAMP_FORMAT, VariantSpec,
    };

    use crate::{deployer, test_var};

    #[tokio::test]
    #[ignore = "creates billable SageMaker resources"]
    async fn test_should_deploy_invoke_and_delete_serverless_endpoint() {
        let (Some(image_uri), Some(model_data_url)) = (
            test_var("SMDEPLOY_TEST_IMAGE_URI"),
            test_var("SMDEPLOY_TEST_MODEL_DATA_URL"),
        ) else {
            tracing::warn!("SMDEPLOY_TEST_IMAGE_URI or SMDEPLOY_TEST_MODEL_DATA_URL unset, skipping");
            return;
        };
        let deployer = deployer().await;
        let name = format!("it-{}", Utc::now().format(TIMESTAMP_FORMAT));

        let spec = DeploySpec::builder()
            .model(
                ModelSpec::builder()
                    .name(name.as_str())
                    .model_data_url(model_data_url)
                    .image_uri(image_uri)
                    .build(),
            )
            .variant(VariantSpec::serverless())
            .build();
        let endpoint = deployer.deploy_model(&spec).await.expect("deploy");
        assert_eq!(endpoint, deployer.config().qualify(&name));

        let description = deployer.describe_endpoint(&name).await.expect("describe");
        assert_eq!(description.status, EndpointStatus::InService);

        let response = deployer
            .invoke_json(&name, &serde_json::json!({ "instances": [[0.0, 1.0]] }))
            .await;
        tracing::info!(?response, "invocation result");

        let deleted = deployer
            .delete_endpoint(
                &name,
                DeleteOptions {
                    delete_config: true,
                    delete_model: true,
                },
            )
            .await
            .expect("delete");
        assert!(deleted);
        assert!(
            deployer
                .list_models()
                .await
                .expect("list models")
                .iter()
                .all(|m| m.name != endpoint)
        );
    }
}
