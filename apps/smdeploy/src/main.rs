//! smdeploy: inspect the deployment configuration and SageMaker resources of
//! one team/project.
//!
//! The configuration is discovered from the SageMaker Studio domain, the
//! caller's user profile tags and the account identity. Values can be pinned
//! with environment variables or command-line flags.
//!
//! # Environment variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `COMPANY` | `acme` | Company used for bucket, role and tag names |
//! | `TEAM` | profile tag `Team` | Team id of the naming prefix |
//! | `PROJECT` | profile tag `Project` | Project name of the naming prefix |
//! | `DOMAIN_ID` | first Studio domain | Domain to read network settings from |
//! | `USER_PROFILE_NAME` | | Studio user profile to read tags from |
//! | `VPC_ID`, `PRIVATE_SUBNET_1_ID`, `PRIVATE_SUBNET_2_ID`, `SG_SAGEMAKER_STUDIO` | domain settings | Network placement of models |
//! | `IAM_PATH` | `/{company}-sagemaker/` | Path of the inference and execution roles |
//! | `TEAM_{ID}_FULLNAME` | team id | Team name used in role names |
//! | `BUCKET` | `{company}-sm-{team}-{project}` | Project bucket |
//! | `AWS_REGION` | SDK default chain | Region of every client |
//! | `LOG_LEVEL` | `info` | Log level used when `RUST_LOG` is unset |
//! | `RUST_LOG` | | Full `tracing` filter directive |
//!
//! All output is JSON on stdout; logs go to stderr.

mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use smdeploy_core::ConfigResolver;
use smdeploy_sagemaker::{AwsPlatform, Deployer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, Invocation, USAGE};

/// Read the log level from `LOG_LEVEL`, defaulting to `info`.
fn log_level() -> String {
    std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_owned())
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` takes precedence over `log_level` when set.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

async fn run(invocation: Invocation) -> Result<()> {
    let Invocation { overrides, command } = invocation;
    if command == Command::Help {
        println!("{USAGE}");
        return Ok(());
    }

    let platform = Arc::new(AwsPlatform::load().await);
    let resolver = ConfigResolver::new(platform.clone());

    if command == Command::Config {
        let config = resolver
            .resolve(&overrides)
            .await
            .context("failed to resolve deployment configuration")?;
        return print_json(config.as_ref());
    }

    let deployer = Deployer::from_resolver(platform, &resolver, &overrides)
        .await
        .context("failed to resolve deployment configuration")?;
    info!(prefix = %deployer.config().name_prefix(), "configuration resolved");

    match command {
        Command::Models => print_json(&deployer.list_models().await?),
        Command::Endpoints => print_json(&deployer.list_endpoints().await?),
        Command::Endpoint(name) => print_json(
            &deployer
                .describe_endpoint(&name)
                .await
                .with_context(|| format!("failed to describe endpoint {name}"))?,
        ),
        Command::Jobs(max) => print_json(&deployer.list_transform_jobs(Some(max)).await?),
        Command::StopJob(name) => {
            let stopped = deployer.stop_transform_job(&name).await;
            print_json(&serde_json::json!({ "job": name, "stopping": stopped }))
        }
        Command::Config | Command::Help => Ok(()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(&log_level())?;
    let invocation = cli::parse(std::env::args().skip(1))?;
    run(invocation).await
}
