//! Label Drift Notifier
//!
//! Labels are managed from a config file. When someone edits a label by
//! hand, open an issue assigned to them pointing at the config file.

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::context::{EventContext, EventPayload};
use crate::github::{GitHubApi, Issue, NewIssue};

pub const DEFAULT_CONFIG_FILE: &str = ".github/labels.yml";

/// Issue asking `actor` to change `label` through `config_file` instead
pub fn drift_issue(actor: &str, label: &str, config_file: &str) -> NewIssue {
    let body = format!(
        "
Hi @{actor}

A manual action has been performed on the label: `{label}`.

Labels are managed centrally in the config file: `{config_file}` and any manual changes will be overwritten to match the configuration.

Please propose changes via PR to the config file instead of manually changing labels.
"
    );

    NewIssue {
        title: format!("[bug] Manual action on label: `{}`", label),
        body,
        assignees: vec![actor.to_string()],
    }
}

/// File the drift issue for a `label` event
pub async fn notify(ctx: &EventContext, github: &dyn GitHubApi, config_file: &str) -> Result<Issue> {
    let EventPayload::Label(event) = &ctx.payload else {
        bail!("Expected a label event, got {}", ctx.event_name);
    };
    let actor = ctx.actor.as_deref().context("GITHUB_ACTOR is not set")?;

    info!(
        repo = %ctx.repo,
        actor = %actor,
        label = %event.label.name,
        "🏷️  Manual label change detected"
    );

    let issue = drift_issue(actor, &event.label.name, config_file);
    let created = github
        .create_issue(&ctx.repo, &issue)
        .await
        .context("Failed to create label drift issue")?;

    info!(issue = created.number, "✅ Opened label drift issue");
    Ok(created)
}
