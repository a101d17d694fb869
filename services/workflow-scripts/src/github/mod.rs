//! GitHub API Collaborator
//!
//! The four REST operations the workflow scripts need, behind a trait so the
//! handlers can run against the live API, a dry-run wrapper, or an in-memory
//! fake in tests.

pub mod client;
pub mod dry_run;
#[cfg(test)]
pub mod fake;
pub mod types;

pub use client::GitHubClient;
pub use dry_run::DryRunGitHub;
pub use types::{AuthorAssociation, Comment, Issue, NewIssue, PullRequest, User};

use anyhow::Result;
use async_trait::async_trait;

/// Repository coordinates (`owner/repo`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parse `owner/repo`, as found in `GITHUB_REPOSITORY`
    pub fn parse(value: &str) -> Option<Self> {
        let parts: Vec<&str> = value.split('/').collect();
        match parts.as_slice() {
            [owner, repo] if !owner.is_empty() && !repo.is_empty() => {
                Some(Self::new(*owner, *repo))
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Source-control hosting operations used by the workflow scripts.
///
/// Every call is a single request/response; implementations never retry.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Create an issue
    async fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<Issue>;

    /// All comments on an issue or pull request, in listing order
    async fn list_issue_comments(&self, repo: &RepoRef, issue_number: u64) -> Result<Vec<Comment>>;

    /// Post a comment on an issue or pull request
    async fn create_issue_comment(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        body: &str,
    ) -> Result<Comment>;

    /// Fetch a pull request by number
    async fn get_pull_request(&self, repo: &RepoRef, pull_number: u64) -> Result<PullRequest>;
}
