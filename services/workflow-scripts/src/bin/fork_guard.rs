//! Fork PR Test Gate
//!
//! Writes `should_run` for the triggering event. Fork PRs need a
//! maintainer's `/allow` comment on the current head commit.
//!
//! ## Usage
//! ```bash
//! GITHUB_TOKEN=<TOKEN> INPUT_SUITE_NAME=terraform fork-guard
//! ```

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use workflow_scripts::fork_guard::{self, DEFAULT_SUITE_NAME};
use workflow_scripts::github::{client::DEFAULT_API_URL, DryRunGitHub, GitHubApi, GitHubClient};
use workflow_scripts::{runtime, EventContext};

/// Fork PR Test Gate
#[derive(Parser, Debug)]
#[command(name = "fork-guard")]
#[command(about = "Decide whether tests may run, gating fork PRs on maintainer approval")]
#[command(version)]
struct Args {
    /// Test suite named in approval comments
    #[arg(long, env = "INPUT_SUITE_NAME")]
    suite_name: Option<String>,

    /// GitHub token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Log comments instead of posting them
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

async fn run(args: Args) -> Result<()> {
    let suite = runtime::input(args.suite_name).unwrap_or_else(|| DEFAULT_SUITE_NAME.to_string());
    let ctx = EventContext::from_env()?;

    let token = runtime::input(args.token).context("GITHUB_TOKEN is not set")?;
    let client = GitHubClient::new(token, args.api_url)?;
    let github: Box<dyn GitHubApi> = if args.dry_run {
        Box::new(DryRunGitHub::new(client))
    } else {
        Box::new(client)
    };

    let mut outputs = runtime::outputs_from_env();
    fork_guard::run(&ctx, github.as_ref(), &suite, outputs.as_mut()).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    runtime::init_tracing(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            runtime::report_failure(&err);
            ExitCode::FAILURE
        }
    }
}
