//! Label Drift Notifier
//!
//! Run on `label` events. Opens an issue assigned to whoever changed the
//! label by hand, pointing them at the label config file.
//!
//! ## Usage
//! ```bash
//! GITHUB_TOKEN=<TOKEN> INPUT_CONFIG_FILE=.github/labels.yml label-issue
//! ```

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use workflow_scripts::github::{client::DEFAULT_API_URL, DryRunGitHub, GitHubApi, GitHubClient};
use workflow_scripts::label_drift::{self, DEFAULT_CONFIG_FILE};
use workflow_scripts::{runtime, EventContext};

/// Label Drift Notifier
#[derive(Parser, Debug)]
#[command(name = "label-issue")]
#[command(about = "Open an issue when a label is changed outside the label config")]
#[command(version)]
struct Args {
    /// Label config file referenced in the issue
    #[arg(long, env = "INPUT_CONFIG_FILE")]
    config_file: Option<String>,

    /// GitHub token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Log the issue instead of creating it
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

async fn run(args: Args) -> Result<()> {
    let config_file =
        runtime::input(args.config_file).unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
    let ctx = EventContext::from_env()?;

    let token = runtime::input(args.token).context("GITHUB_TOKEN is not set")?;
    let client = GitHubClient::new(token, args.api_url)?;
    let github: Box<dyn GitHubApi> = if args.dry_run {
        Box::new(DryRunGitHub::new(client))
    } else {
        Box::new(client)
    };

    let issue = label_drift::notify(&ctx, github.as_ref(), &config_file).await?;
    if let Some(url) = issue.html_url {
        info!("Issue: {}", url);
    }
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
