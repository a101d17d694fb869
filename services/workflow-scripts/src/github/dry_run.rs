//! Dry-run wrapper: reads hit the real API, writes are only logged.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::types::{AuthorAssociation, Comment, Issue, NewIssue, PullRequest, User};
use super::{GitHubApi, RepoRef};

pub struct DryRunGitHub<A> {
    inner: A,
}

impl<A: GitHubApi> DryRunGitHub<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<A: GitHubApi> GitHubApi for DryRunGitHub<A> {
    async fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<Issue> {
        info!(
            repo = %repo,
            title = %issue.title,
            assignees = ?issue.assignees,
            "🔍 Dry run: would create issue"
        );
        Ok(Issue {
            number: 0,
            html_url: None,
            pull_request: None,
        })
    }

    async fn list_issue_comments(&self, repo: &RepoRef, issue_number: u64) -> Result<Vec<Comment>> {
        self.inner.list_issue_comments(repo, issue_number).await
    }

    async fn create_issue_comment(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        body: &str,
    ) -> Result<Comment> {
        info!(repo = %repo, issue = issue_number, "🔍 Dry run: would post comment:\n{}", body);
        Ok(Comment {
            id: 0,
            body: body.to_string(),
            author_association: AuthorAssociation::None,
            user: User {
                login: "dry-run".to_string(),
            },
        })
    }

    async fn get_pull_request(&self, repo: &RepoRef, pull_number: u64) -> Result<PullRequest> {
        self.inner.get_pull_request(repo, pull_number).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::fake::FakeGitHub;

    #[tokio::test]
    async fn test_dry_run_skips_writes() {
        let fake = FakeGitHub::new().with_comment("existing", AuthorAssociation::Member, "alice");
        let dry = DryRunGitHub::new(fake.clone());
        let repo = RepoRef::new("acme", "infra");

        dry.create_issue_comment(&repo, 3, "hello").await.unwrap();
        let comments = dry.list_issue_comments(&repo, 3).await.unwrap();

        assert_eq!(comments.len(), 1);
        assert!(fake.created_comments().is_empty());
    }
}
