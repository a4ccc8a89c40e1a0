//! SageMaker resource operations for smdeploy.
//!
//! [`Deployer`] creates models, endpoint configs, endpoints and batch
//! transform jobs for one team/project, using the names, tags, roles and VPC
//! placement of a resolved [`smdeploy_core::DeployConfig`]. The calls go
//! through the [`SageMakerApi`] seam; [`AwsPlatform`] implements it (and the
//! discovery seam [`smdeploy_core::PlatformMetadata`]) with the AWS SDK.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use smdeploy_core::{ConfigOverrides, ConfigResolver};
//! use smdeploy_sagemaker::{AwsPlatform, DeploySpec, Deployer, ModelSpec};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let platform = Arc::new(AwsPlatform::load().await);
//! let resolver = ConfigResolver::new(platform.clone());
//! let deployer = Deployer::from_resolver(platform, &resolver, &ConfigOverrides::new()).await?;
//!
//! let spec = DeploySpec::builder()
//!     .model(
//!         ModelSpec::builder()
//!             .name("sklearn-v1")
//!             .model_data_url(deployer.config().model_uri("sklearn-v1/model.tar.gz"))
//!             .image_uri("123456789012.dkr.ecr.ap-northeast-1.amazonaws.com/sklearn:latest")
//!             .build(),
//!     )
//!     .build();
//! let endpoint = deployer.deploy_model(&spec).await?;
//! println!("{endpoint} is InService");
//! # Ok(())
//! # }
//! ```

mod api;
mod deployer;
mod error;
pub mod ops;
mod sdk;
mod spec;
#[cfg(test)]
mod testing;
pub mod types;
mod waiter;

pub use api::SageMakerApi;
pub use deployer::{Deployer, TIMESTAMP_FORMAT};
pub use error::{DeployError, DeployResult};
pub use ops::batch::DEFAULT_MAX_RESULTS;
pub use sdk::AwsPlatform;
pub use spec::{DeleteOptions, DeploySpec, ModelSpec, TransformSpec};
pub use types::{
    EndpointDescription, EndpointStatus, EndpointSummary, ModelSummary, TransformJobDescription,
    TransformJobStatus, TransformJobSummary, VariantSpec,
};
pub use waiter::WaitPolicy;
