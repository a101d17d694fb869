//! Fork PR Test Gate
//!
//! Decides whether a test workflow may run for the triggering event and
//! publishes the answer as the `should_run` output.
//!
//! ## Event handling
//!
//! - `schedule`, `workflow_dispatch`: always run.
//! - `pull_request`, `merge_group`: run for same-repository PRs. Fork PRs run
//!   only when a maintainer (MEMBER or OWNER) comment carries the approval
//!   marker for the current head SHA.
//! - `issue_comment`: a maintainer's `/allow` on a PR posts that approval
//!   marker for the PR's current head. Anyone else gets a single rejection
//!   notice per PR.
//! - anything else: do not run.
//!
//! The approval comment is read back by a later `pull_request` run. Comments
//! are read, then written, without any lock: two concurrent non-maintainer
//! `/allow` runs can both post a rejection notice. The run-id jitter below
//! only makes that less likely.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use tracing::{debug, info, warn};

use crate::context::{EventContext, EventPayload, IssueCommentEvent};
use crate::github::{Comment, GitHubApi, PullRequest, RepoRef};
use crate::marker::{self, ApprovalMarker, REJECTION_MARKER};
use crate::runtime::OutputSink;

/// Slash command a maintainer posts to approve a fork PR
pub const APPROVE_COMMAND: &str = "/allow";

pub const DEFAULT_SUITE_NAME: &str = "terraform";

/// Delay derived from the run id: last two digits, modulo 10, in seconds.
///
/// Missing or non-numeric run ids yield no delay.
pub fn jitter_delay(run_id: Option<&str>) -> Duration {
    let Some(run_id) = run_id else {
        warn!("GITHUB_RUN_ID not set; skipping jitter delay");
        return Duration::ZERO;
    };

    let tail: String = {
        let mut last: Vec<char> = run_id.chars().rev().take(2).collect();
        last.reverse();
        last.into_iter().collect()
    };

    match tail.parse::<u64>() {
        Ok(n) => Duration::from_millis((n % 10) * 1000),
        Err(_) => {
            warn!(run_id = %run_id, "GITHUB_RUN_ID is not numeric; skipping jitter delay");
            Duration::ZERO
        }
    }
}

fn check_is_maintainer(comment: &Comment) -> bool {
    let is_maintainer = comment.author_association.is_maintainer();

    info!(
        "Slash command from: {} ({}) : {}",
        comment.user.login,
        comment.author_association,
        if is_maintainer { "✅ Maintainer" } else { "❌ Not Maintainer" }
    );

    is_maintainer
}

fn log_pull_request(pr: &PullRequest) {
    info!(
        "PR #{}: {} -> {} <---> Is fork: {}, SHA: {}",
        pr.number,
        pr.head_repo_name(),
        pr.base_repo_name(),
        pr.is_fork(),
        pr.head.sha
    );
}

/// Notice posted to a non-maintainer who tried `/allow`
pub fn rejection_comment(commenter: &str, association: impl std::fmt::Display) -> String {
    format!(
        "@{} - Sorry, only maintainers can approve tests on fork PRs. Required: MEMBER or OWNER. Current: {}\n\n{}",
        commenter, association, REJECTION_MARKER
    )
}

/// Approval comment binding `commenter`'s approval to `sha`
pub fn approval_comment(commenter: &str, sha: &str, suite: &str, approved_at: &str) -> String {
    [
        "## ✅ Test Approved".to_string(),
        String::new(),
        format!("@{commenter} has approved running {suite} tests for commit `{sha}`."),
        String::new(),
        "**Approval Details:**".to_string(),
        format!("- Commit SHA: `{sha}`"),
        format!("- Approved by: @{commenter}"),
        format!("- Approved at: {approved_at}"),
        String::new(),
        "**Important:** If new commits are pushed, tests will need to be re-approved.".to_string(),
        String::new(),
        ApprovalMarker::new(sha).html_comment(),
    ]
    .join("\n")
}

/// Gate for `pull_request` and `merge_group` runs
pub async fn check_pull_request(
    github: &dyn GitHubApi,
    repo: &RepoRef,
    pr: &PullRequest,
) -> Result<bool> {
    log_pull_request(pr);

    if !pr.is_fork() {
        info!("Internal PR - running tests automatically");
        return Ok(true);
    }

    let comments = github
        .list_issue_comments(repo, pr.number)
        .await
        .with_context(|| format!("Failed to list comments on PR #{}", pr.number))?;

    let marker = ApprovalMarker::new(&pr.head.sha);
    let approval = comments
        .iter()
        .filter(|comment| marker.is_in(&comment.body))
        .find(|comment| check_is_maintainer(comment));

    match approval {
        Some(comment) => {
            info!(
                sha = %pr.head.sha,
                approved_by = %comment.user.login,
                "✅ Fork PR approved for current commit"
            );
            Ok(true)
        }
        None => {
            let stale: Vec<String> = comments
                .iter()
                .flat_map(|comment| ApprovalMarker::parse_all(&comment.body))
                .filter(|found| found.sha != pr.head.sha)
                .map(|found| found.sha)
                .collect();
            if !stale.is_empty() {
                info!(stale = ?stale, "Approvals exist only for older commits; re-approval required");
            }
            info!(sha = %pr.head.sha, "⏸️  Fork PR awaiting maintainer {}", APPROVE_COMMAND);
            Ok(false)
        }
    }
}

/// Gate for `issue_comment` runs: handles the `/allow` command
pub async fn check_comment(
    github: &dyn GitHubApi,
    repo: &RepoRef,
    event: &IssueCommentEvent,
    run_id: Option<&str>,
    suite: &str,
) -> Result<bool> {
    if !event.issue.is_pull_request() {
        debug!(issue = event.issue.number, "Comment is not on a pull request");
        return Ok(false);
    }
    if event.comment.body.trim().to_lowercase() != APPROVE_COMMAND {
        debug!(issue = event.issue.number, "Comment is not {}", APPROVE_COMMAND);
        return Ok(false);
    }

    let delay = jitter_delay(run_id);
    debug!(delay_ms = delay.as_millis() as u64, "Staggering concurrent runs");
    tokio::time::sleep(delay).await;

    let commenter = &event.comment.user.login;
    let issue_number = event.issue.number;

    if !check_is_maintainer(&event.comment) {
        let comments = github
            .list_issue_comments(repo, issue_number)
            .await
            .with_context(|| format!("Failed to list comments on PR #{}", issue_number))?;

        if comments.iter().any(|comment| marker::has_rejection(&comment.body)) {
            debug!(issue = issue_number, "Rejection notice already posted");
        } else {
            github
                .create_issue_comment(
                    repo,
                    issue_number,
                    &rejection_comment(commenter, event.comment.author_association),
                )
                .await
                .context("Failed to post rejection comment")?;
            info!(issue = issue_number, commenter = %commenter, "Posted rejection notice");
        }
        return Ok(false);
    }

    // The issue number doubles as the PR number. Always re-fetch so the
    // approval binds to the head that exists right now.
    let pr = github
        .get_pull_request(repo, issue_number)
        .await
        .with_context(|| format!("Failed to fetch PR #{}", issue_number))?;
    log_pull_request(&pr);

    let approved_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    github
        .create_issue_comment(
            repo,
            issue_number,
            &approval_comment(commenter, &pr.head.sha, suite, &approved_at),
        )
        .await
        .context("Failed to post approval comment")?;

    info!(
        "[fork-guard] APPROVAL_GRANTED sha={} by={} pr={} at={}",
        pr.head.sha, commenter, pr.number, approved_at
    );

    Ok(true)
}

/// Decide whether tests should run for this event
pub async fn should_run(ctx: &EventContext, github: &dyn GitHubApi, suite: &str) -> Result<bool> {
    match &ctx.payload {
        EventPayload::Schedule | EventPayload::WorkflowDispatch => {
            info!(event = %ctx.event_name, "Trusted trigger - running tests");
            Ok(true)
        }
        EventPayload::PullRequest(event) => {
            check_pull_request(github, &ctx.repo, &event.pull_request).await
        }
        EventPayload::MergeGroup(event) => match &event.pull_request {
            Some(pr) => check_pull_request(github, &ctx.repo, pr).await,
            None => {
                // Merge queue commits are created inside the base repository
                let head_sha = event
                    .merge_group
                    .as_ref()
                    .map(|group| group.head_sha.as_str())
                    .unwrap_or("unknown");
                info!(sha = %head_sha, "Merge queue commit - running tests automatically");
                Ok(true)
            }
        },
        EventPayload::IssueComment(event) => {
            check_comment(github, &ctx.repo, event, ctx.run_id.as_deref(), suite).await
        }
        EventPayload::Label(_) | EventPayload::Other(_) => {
            info!(event = %ctx.event_name, "Event does not gate tests - not running");
            Ok(false)
        }
    }
}

/// Decide and publish `should_run` ("true" / "false").
///
/// On error nothing is published.
pub async fn run(
    ctx: &EventContext,
    github: &dyn GitHubApi,
    suite: &str,
    outputs: &mut dyn OutputSink,
) -> Result<bool> {
    let decision = should_run(ctx, github, suite).await?;
    outputs.set_output("should_run", &decision.to_string())?;
    Ok(decision)
}
