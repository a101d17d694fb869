//! Workflow Event Context
//!
//! The triggering event as seen by a workflow step: event name, repository,
//! actor, run id, and the webhook payload decoded into a closed set of
//! supported event kinds.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::github::{Comment, Issue, PullRequest, RepoRef};

/// Errors loading the event context
#[derive(Debug, Error)]
pub enum ContextError {
    /// A required runner variable is unset
    #[error("Environment variable {0} is not set")]
    MissingVar(&'static str),

    /// `GITHUB_REPOSITORY` is not `owner/repo`
    #[error("Invalid repository format: {0}. Expected: owner/repo")]
    InvalidRepository(String),

    /// The event payload file could not be read
    #[error("Failed to read event payload {path}: {source}")]
    ReadPayload {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The payload of a supported event kind lacks required fields
    #[error("Malformed {event} event payload: {source}")]
    MalformedPayload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub name: String,
}

/// `label` event
#[derive(Debug, Clone, Deserialize)]
pub struct LabelEvent {
    #[serde(default)]
    pub action: Option<String>,
    pub label: Label,
}

/// `pull_request` event
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    pub pull_request: PullRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MergeGroup {
    pub head_sha: String,
    #[serde(default)]
    pub head_ref: Option<String>,
    #[serde(default)]
    pub base_ref: Option<String>,
}

/// `merge_group` event. GitHub does not send a pull request with it.
#[derive(Debug, Clone, Deserialize)]
pub struct MergeGroupEvent {
    #[serde(default)]
    pub merge_group: Option<MergeGroup>,
    #[serde(default)]
    pub pull_request: Option<PullRequest>,
}

/// `issue_comment` event
#[derive(Debug, Clone, Deserialize)]
pub struct IssueCommentEvent {
    pub issue: Issue,
    pub comment: Comment,
}

/// Supported event kinds with their required payload fields
#[derive(Debug, Clone)]
pub enum EventPayload {
    Label(LabelEvent),
    PullRequest(PullRequestEvent),
    MergeGroup(MergeGroupEvent),
    IssueComment(IssueCommentEvent),
    Schedule,
    WorkflowDispatch,
    /// Any other event name; never inspected
    Other(String),
}

impl EventPayload {
    /// Decode the payload for `event_name`.
    ///
    /// Unknown event names map to [`EventPayload::Other`] without looking at
    /// the payload.
    pub fn parse(event_name: &str, payload: serde_json::Value) -> Result<Self, ContextError> {
        fn decode<T: serde::de::DeserializeOwned>(
            event: &str,
            payload: serde_json::Value,
        ) -> Result<T, ContextError> {
            serde_json::from_value(payload).map_err(|source| ContextError::MalformedPayload {
                event: event.to_string(),
                source,
            })
        }

        Ok(match event_name {
            "label" => EventPayload::Label(decode(event_name, payload)?),
            "pull_request" => EventPayload::PullRequest(decode(event_name, payload)?),
            "merge_group" => EventPayload::MergeGroup(decode(event_name, payload)?),
            "issue_comment" => EventPayload::IssueComment(decode(event_name, payload)?),
            "schedule" => EventPayload::Schedule,
            "workflow_dispatch" => EventPayload::WorkflowDispatch,
            other => EventPayload::Other(other.to_string()),
        })
    }
}

/// Everything a workflow step knows about its trigger
#[derive(Debug, Clone)]
pub struct EventContext {
    pub event_name: String,
    pub repo: RepoRef,
    pub actor: Option<String>,
    pub run_id: Option<String>,
    pub payload: EventPayload,
}

impl EventContext {
    /// Load from the runner environment (`GITHUB_EVENT_NAME`, `GITHUB_EVENT_PATH`,
    /// `GITHUB_REPOSITORY`, `GITHUB_ACTOR`, `GITHUB_RUN_ID`)
    pub fn from_env() -> Result<Self, ContextError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ContextError> {
        let event_name = var("GITHUB_EVENT_NAME")
            .filter(|v| !v.is_empty())
            .ok_or(ContextError::MissingVar("GITHUB_EVENT_NAME"))?;

        let repository = var("GITHUB_REPOSITORY").ok_or(ContextError::MissingVar("GITHUB_REPOSITORY"))?;
        let repo = RepoRef::parse(&repository).ok_or(ContextError::InvalidRepository(repository))?;

        let payload = match var("GITHUB_EVENT_PATH").filter(|v| !v.is_empty()) {
            Some(path) => read_payload(Path::new(&path))?,
            None => serde_json::Value::Object(Default::default()),
        };

        Ok(Self {
            payload: EventPayload::parse(&event_name, payload)?,
            event_name,
            repo,
            actor: var("GITHUB_ACTOR").filter(|v| !v.is_empty()),
            run_id: var("GITHUB_RUN_ID").filter(|v| !v.is_empty()),
        })
    }
}

fn read_payload(path: &Path) -> Result<serde_json::Value, ContextError> {
    let read_error = |source| ContextError::ReadPayload {
        path: path.display().to_string(),
        source,
    };

    let raw = std::fs::read_to_string(path).map_err(read_error)?;
    serde_json::from_str(&raw).map_err(|source| ContextError::MalformedPayload {
        event: "webhook".to_string(),
        source,
    })
}
