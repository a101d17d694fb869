//! Changelog Release Tag
//!
//! Derives `release_tag` and `changelog_file` outputs from the single
//! changelog file changed by a release-notes merge.
//!
//! ## Usage
//! ```bash
//! INPUT_CHANGES="docs/CHANGES/feature-x.md" INPUT_PROJECT_SRC=aws release-tag
//! # release_tag=aws/CHANGES/feature-x
//! # changelog_file=docs/CHANGES/feature-x.md
//! ```

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use workflow_scripts::{release_tag, runtime};

/// Changelog Release Tag
#[derive(Parser, Debug)]
#[command(name = "release-tag")]
#[command(about = "Compute a release tag from a changed changelog file")]
#[command(version)]
struct Args {
    /// Comma-separated changed files; exactly one is expected
    #[arg(long, env = "INPUT_CHANGES")]
    changes: Option<String>,

    /// Prefix prepended to the tag as `<project_src>/`
    #[arg(long, env = "INPUT_PROJECT_SRC")]
    project_src: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: Args) -> Result<()> {
    let changes = runtime::required_input("CHANGES", args.changes)?;
    let project_src = runtime::input(args.project_src).unwrap_or_default();

    let mut outputs = runtime::outputs_from_env();
    release_tag::run(&changes, &project_src, outputs.as_mut())?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    runtime::init_tracing(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            runtime::report_failure(&err);
            ExitCode::FAILURE
        }
    }
}
