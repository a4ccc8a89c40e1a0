//! Command-line parsing.

use anyhow::{Context, Result, bail};
use smdeploy_core::ConfigOverrides;
use smdeploy_sagemaker::DEFAULT_MAX_RESULTS;

pub(crate) const USAGE: &str = "\
usage: smdeploy [--company NAME] [--team ID] [--project NAME] <command>

commands:
  config              print the resolved deployment configuration
  models              list the project's models
  endpoints           list the project's endpoints
  endpoint <name>     describe one endpoint
  jobs [max]          list the project's batch transform jobs (default 20)
  stop-job <name>     stop a batch transform job";

/// What to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Config,
    Models,
    Endpoints,
    Endpoint(String),
    Jobs(i32),
    StopJob(String),
    Help,
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Invocation {
    pub overrides: ConfigOverrides,
    pub command: Command,
}

/// Parse the arguments following the program name.
pub(crate) fn parse<I>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = String>,
{
    let mut overrides = ConfigOverrides::new();
    let mut positional = Vec::new();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                return Ok(Invocation {
                    overrides,
                    command: Command::Help,
                });
            }
            "--company" | "--team" | "--project" => {
                let value = args
                    .next()
                    .with_context(|| format!("{arg} requires a value"))?;
                overrides = match arg.as_str() {
                    "--company" => overrides.company(value),
                    "--team" => overrides.team(value),
                    _ => overrides.project(value),
                };
            }
            flag if flag.starts_with("--") => bail!("unknown option {flag}\n\n{USAGE}"),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        None | Some("help") => Command::Help,
        Some("config") => Command::Config,
        Some("models") => Command::Models,
        Some("endpoints") => Command::Endpoints,
        Some("endpoint") => Command::Endpoint(
            positional
                .next()
                .context("endpoint requires an endpoint name")?,
        ),
        Some("jobs") => Command::Jobs(match positional.next() {
            Some(max) => max
                .parse()
                .with_context(|| format!("invalid max results: {max}"))?,
            None => DEFAULT_MAX_RESULTS,
        }),
        Some("stop-job") => {
            Command::StopJob(positional.next().context("stop-job requires a job name")?)
        }
        Some(other) => bail!("unknown command {other}\n\n{USAGE}"),
    };

    if let Some(extra) = positional.next() {
        bail!("unexpected argument {extra}");
    }
    Ok(Invocation { overrides, command })
}
