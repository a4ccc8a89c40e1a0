//! Configuration discovery integration tests.

#[cfg(test)]
mod tests {
    use smdeploy_core::{ConfigOverrides, ConfigResolver};

    use crate::platform;

    #[tokio::test]
    #[ignore = "requires AWS credentials and a SageMaker Studio domain"]
    async fn test_should_resolve_ambient_configuration() {
        let platform = platform().await;
        let resolver = ConfigResolver::new(platform);

        let config = resolver.resolve_default().await.expect("resolve");
        assert!(!config.team.is_empty());
        assert!(!config.project.is_empty());
        assert_eq!(config.account_id.as_str().len(), 12);
        assert!(config.inference_role_arn.starts_with("arn:aws:iam::"));
        assert!(!config.subnet_ids.is_empty());
        assert_eq!(
            config.name_prefix(),
            format!("{}-{}", config.team, config.project)
        );
    }

    #[tokio::test]
    #[ignore = "requires AWS credentials and a SageMaker Studio domain"]
    async fn test_should_share_resolution_between_calls() {
        let platform = platform().await;
        let resolver = ConfigResolver::new(platform);

        let (first, second) = tokio::join!(resolver.resolve_default(), resolver.resolve_default());
        let (first, second) = (first.expect("first"), second.expect("second"));
        assert!(std::sync::Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    #[ignore = "requires AWS credentials and a SageMaker Studio domain"]
    async fn test_should_apply_overrides() {
        let platform = platform().await;
        let resolver = ConfigResolver::new(platform);

        let overrides = ConfigOverrides::new().team("it").project("smoke");
        let config = resolver.resolve(&overrides).await.expect("resolve");
        assert_eq!(config.name_prefix(), "it-smoke");
        assert!(config.bucket.ends_with("-sm-it-smoke"));
    }
}
