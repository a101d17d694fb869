//! GitHub REST Types
//!
//! The subset of issue, comment and pull request payloads the workflow
//! scripts read. Shared between webhook event payloads and API responses.

use serde::{Deserialize, Serialize};

/// A GitHub account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
}

/// Relationship of a comment author to the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorAssociation {
    /// Repository owner
    Owner,
    /// Member of the organization that owns the repository
    Member,
    /// User with write access to the repository
    Collaborator,
    /// User who has contributed in the past
    Contributor,
    FirstTimer,
    FirstTimeContributor,
    Mannequin,
    /// No relationship
    None,
    /// Any value GitHub adds later
    #[serde(other)]
    Unknown,
}

impl AuthorAssociation {
    /// Maintainer-class authors may approve test runs on fork PRs.
    pub fn is_maintainer(self) -> bool {
        matches!(self, AuthorAssociation::Member | AuthorAssociation::Owner)
    }
}

impl std::fmt::Display for AuthorAssociation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthorAssociation::Owner => write!(f, "OWNER"),
            AuthorAssociation::Member => write!(f, "MEMBER"),
            AuthorAssociation::Collaborator => write!(f, "COLLABORATOR"),
            AuthorAssociation::Contributor => write!(f, "CONTRIBUTOR"),
            AuthorAssociation::FirstTimer => write!(f, "FIRST_TIMER"),
            AuthorAssociation::FirstTimeContributor => write!(f, "FIRST_TIME_CONTRIBUTOR"),
            AuthorAssociation::Mannequin => write!(f, "MANNEQUIN"),
            AuthorAssociation::None => write!(f, "NONE"),
            AuthorAssociation::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// An issue or pull request comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: u64,
    /// Body is null for some comment kinds; treated as empty
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: String,
    pub author_association: AuthorAssociation,
    pub user: User,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A repository reference inside a pull request branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub full_name: String,
}

/// Head or base side of a pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub sha: String,
    /// Null when the head repository (a fork) has been deleted
    pub repo: Option<Repository>,
}

/// A pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub head: Branch,
    pub base: Branch,
}

impl PullRequest {
    pub fn head_repo_name(&self) -> &str {
        self.head.repo.as_ref().map(|r| r.full_name.as_str()).unwrap_or("<deleted>")
    }

    pub fn base_repo_name(&self) -> &str {
        self.base.repo.as_ref().map(|r| r.full_name.as_str()).unwrap_or("<deleted>")
    }

    /// A pull request whose head lives in a different repository than its base.
    /// A deleted head repository counts as a fork.
    pub fn is_fork(&self) -> bool {
        match (&self.head.repo, &self.base.repo) {
            (Some(head), Some(base)) => head.full_name != base.full_name,
            _ => true,
        }
    }
}

/// An issue as carried by `issue_comment` events and returned by issue creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    #[serde(default)]
    pub html_url: Option<String>,
    /// Present only when the issue is a pull request
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

/// Request body for creating an issue
#[derive(Debug, Clone, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub assignees: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_association_parsing() {
        let comment: Comment = serde_json::from_value(serde_json::json!({
            "id": 7,
            "body": "hello",
            "author_association": "FIRST_TIME_CONTRIBUTOR",
            "user": { "login": "octocat" }
        }))
        .unwrap();
        assert_eq!(comment.author_association, AuthorAssociation::FirstTimeContributor);
        assert!(!comment.author_association.is_maintainer());

        let unknown: AuthorAssociation = serde_json::from_str("\"SOMETHING_NEW\"").unwrap();
        assert_eq!(unknown, AuthorAssociation::Unknown);
    }

    #[test]
    fn test_maintainer_class() {
        assert!(AuthorAssociation::Owner.is_maintainer());
        assert!(AuthorAssociation::Member.is_maintainer());
        assert!(!AuthorAssociation::Collaborator.is_maintainer());
        assert!(!AuthorAssociation::None.is_maintainer());
        assert_eq!(AuthorAssociation::Collaborator.to_string(), "COLLABORATOR");
    }

    #[test]
    fn test_null_comment_body() {
        let comment: Comment = serde_json::from_value(serde_json::json!({
            "body": null,
            "author_association": "NONE",
            "user": { "login": "ghost" }
        }))
        .unwrap();
        assert_eq!(comment.body, "");
    }

    #[test]
    fn test_fork_detection() {
        let mut pr: PullRequest = serde_json::from_value(serde_json::json!({
            "number": 12,
            "head": { "sha": "abc", "repo": { "full_name": "someone/infra" } },
            "base": { "sha": "def", "repo": { "full_name": "acme/infra" } }
        }))
        .unwrap();
        assert!(pr.is_fork());

        pr.head.repo = Some(Repository { full_name: "acme/infra".to_string() });
        assert!(!pr.is_fork());

        pr.head.repo = None;
        assert!(pr.is_fork());
        assert_eq!(pr.head_repo_name(), "<deleted>");
    }
}
