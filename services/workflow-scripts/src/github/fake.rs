//! In-memory [`GitHubApi`] for tests.
//!
//! Holds the comment thread of a single pull request. Comments created
//! through the fake are appended to that thread, so later listings see them.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::types::{AuthorAssociation, Branch, Comment, Issue, NewIssue, PullRequest, Repository, User};
use super::{GitHubApi, RepoRef};

#[derive(Default)]
struct State {
    comments: Vec<Comment>,
    created_comments: Vec<(u64, String)>,
    created_issues: Vec<NewIssue>,
    pull_request: Option<PullRequest>,
    calls: Vec<String>,
    failure: Option<String>,
}

#[derive(Clone, Default)]
pub struct FakeGitHub {
    state: Arc<Mutex<State>>,
}

impl FakeGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_comment(self, body: &str, association: AuthorAssociation, login: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = state.comments.len() as u64 + 1;
            state.comments.push(Comment {
                id,
                body: body.to_string(),
                author_association: association,
                user: User {
                    login: login.to_string(),
                },
            });
        }
        self
    }

    pub fn with_pull_request(self, pr: PullRequest) -> Self {
        self.state.lock().unwrap().pull_request = Some(pr);
        self
    }

    /// Every call fails with `message`
    pub fn failing(self, message: &str) -> Self {
        self.state.lock().unwrap().failure = Some(message.to_string());
        self
    }

    pub fn created_comments(&self) -> Vec<(u64, String)> {
        self.state.lock().unwrap().created_comments.clone()
    }

    pub fn created_issues(&self) -> Vec<NewIssue> {
        self.state.lock().unwrap().created_issues.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: String) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match &state.failure {
            Some(message) => Err(anyhow!("{}", message)),
            None => Ok(()),
        }
    }
}

/// Build a pull request record for tests
pub fn pull_request(number: u64, head_repo: &str, base_repo: &str, head_sha: &str) -> PullRequest {
    PullRequest {
        number,
        head: Branch {
            sha: head_sha.to_string(),
            repo: Some(Repository {
                full_name: head_repo.to_string(),
            }),
        },
        base: Branch {
            sha: "base000".to_string(),
            repo: Some(Repository {
                full_name: base_repo.to_string(),
            }),
        },
    }
}

#[async_trait]
impl GitHubApi for FakeGitHub {
    async fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<Issue> {
        self.record(format!("create_issue {}", repo))?;
        let mut state = self.state.lock().unwrap();
        state.created_issues.push(issue.clone());
        Ok(Issue {
            number: state.created_issues.len() as u64,
            html_url: None,
            pull_request: None,
        })
    }

    async fn list_issue_comments(&self, repo: &RepoRef, issue_number: u64) -> Result<Vec<Comment>> {
        self.record(format!("list_issue_comments {}#{}", repo, issue_number))?;
        Ok(self.state.lock().unwrap().comments.clone())
    }

    async fn create_issue_comment(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        body: &str,
    ) -> Result<Comment> {
        self.record(format!("create_issue_comment {}#{}", repo, issue_number))?;
        let mut state = self.state.lock().unwrap();
        let comment = Comment {
            id: state.comments.len() as u64 + 1,
            body: body.to_string(),
            author_association: AuthorAssociation::None,
            user: User {
                login: "github-actions[bot]".to_string(),
            },
        };
        state.comments.push(comment.clone());
        state.created_comments.push((issue_number, body.to_string()));
        Ok(comment)
    }

    async fn get_pull_request(&self, repo: &RepoRef, pull_number: u64) -> Result<PullRequest> {
        self.record(format!("get_pull_request {}#{}", repo, pull_number))?;
        self.state
            .lock()
            .unwrap()
            .pull_request
            .clone()
            .ok_or_else(|| anyhow!("GitHub API error (404 Not Found): pull request {}", pull_number))
    }
}
