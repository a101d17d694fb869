//! GitHub REST Client
//!
//! reqwest-based implementation of [`GitHubApi`] authenticated with the
//! workflow's `GITHUB_TOKEN`.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{Comment, Issue, NewIssue, PullRequest};
use super::{GitHubApi, RepoRef};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = "lornu-ai-workflow-scripts";
const API_VERSION: &str = "2022-11-28";
const COMMENTS_PER_PAGE: usize = 100;

/// GitHub REST API client
pub struct GitHubClient {
    client: Client,
    token: String,
    api_url: String,
}

impl GitHubClient {
    /// Create a client for the given API base URL (GitHub.com or GHES)
    pub fn new(token: impl Into<String>, api_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            token: token.into(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    fn repo_url(&self, repo: &RepoRef, path: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.api_url, repo.owner, repo.repo, path)
    }

    async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("GitHub API error ({}): {}", status, body);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse {} response", what))
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<Issue> {
        let url = self.repo_url(repo, "issues");
        debug!(url = %url, title = %issue.title, "Creating issue");

        let response = self
            .authorized(self.client.post(&url))
            .json(issue)
            .send()
            .await
            .context("Failed to send create issue request")?;

        Self::parse(response, "create issue").await
    }

    async fn list_issue_comments(&self, repo: &RepoRef, issue_number: u64) -> Result<Vec<Comment>> {
        let url = self.repo_url(repo, &format!("issues/{}/comments", issue_number));
        let mut comments = Vec::new();
        let mut page = 1u32;

        loop {
            debug!(url = %url, page, "Listing issue comments");

            let response = self
                .authorized(self.client.get(&url))
                .query(&[("per_page", COMMENTS_PER_PAGE.to_string()), ("page", page.to_string())])
                .send()
                .await
                .context("Failed to send list comments request")?;

            let batch: Vec<Comment> = Self::parse(response, "list comments").await?;
            let done = batch.len() < COMMENTS_PER_PAGE;
            comments.extend(batch);

            if done {
                break;
            }
            page += 1;
        }

        Ok(comments)
    }

    async fn create_issue_comment(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        body: &str,
    ) -> Result<Comment> {
        let url = self.repo_url(repo, &format!("issues/{}/comments", issue_number));
        debug!(url = %url, "Creating issue comment");

        let response = self
            .authorized(self.client.post(&url))
            .json(&serde_json::json!({ "body": body }))
            .send()
            .await
            .context("Failed to send create comment request")?;

        Self::parse(response, "create comment").await
    }

    async fn get_pull_request(&self, repo: &RepoRef, pull_number: u64) -> Result<PullRequest> {
        let url = self.repo_url(repo, &format!("pulls/{}", pull_number));
        debug!(url = %url, "Fetching pull request");

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .context("Failed to send get pull request request")?;

        Self::parse(response, "pull request").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct PageParams {
        page: usize,
        per_page: usize,
    }

    async fn serve(app: Router) -> GitHubClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        GitHubClient::new("test-token", format!("http://{}", addr)).unwrap()
    }

    #[test]
    fn test_repo_url_trims_trailing_slash() {
        let client = GitHubClient::new("token", "https://ghe.example.com/api/v3/").unwrap();
        let url = client.repo_url(&RepoRef::new("acme", "infra"), "pulls/4");
        assert_eq!(url, "https://ghe.example.com/api/v3/repos/acme/infra/pulls/4");
    }

    #[tokio::test]
    async fn test_list_comments_follows_pages() {
        let app = Router::new().route(
            "/repos/acme/infra/issues/7/comments",
            get(|Query(params): Query<PageParams>| async move {
                let count = if params.page == 1 { params.per_page } else { 3 };
                let first = (params.page - 1) * params.per_page + 1;
                let comments: Vec<serde_json::Value> = (first..first + count)
                    .map(|id| {
                        serde_json::json!({
                            "id": id,
                            "body": format!("comment {}", id),
                            "author_association": "NONE",
                            "user": { "login": "someone" }
                        })
                    })
                    .collect();
                Json(comments)
            }),
        );
        let client = serve(app).await;

        let comments = client
            .list_issue_comments(&RepoRef::new("acme", "infra"), 7)
            .await
            .unwrap();

        assert_eq!(comments.len(), COMMENTS_PER_PAGE + 3);
        assert_eq!(comments[0].body, "comment 1");
        assert_eq!(comments.last().unwrap().id, 103);
    }

    #[tokio::test]
    async fn test_error_status_is_reported_with_body() {
        let app = Router::new().route(
            "/repos/acme/infra/pulls/9",
            get(|| async { (StatusCode::FORBIDDEN, "API rate limit exceeded") }),
        );
        let client = serve(app).await;

        let err = client
            .get_pull_request(&RepoRef::new("acme", "infra"), 9)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "GitHub API error (403 Forbidden): API rate limit exceeded"
        );
    }
}
