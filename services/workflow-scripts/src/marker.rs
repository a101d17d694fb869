//! Comment Markers
//!
//! Approval state for fork PRs lives only in PR comments. Two literal
//! markers carry it:
//!
//! - `APPROVAL_MARKER:<sha>`: a maintainer approved the commit `<sha>`.
//!   Written inside an HTML comment so it stays invisible in the rendered
//!   thread. A new push changes the head SHA, so older approvals no longer
//!   match.
//! - `<!-- REJECTION_MARKER -->`: a rejection notice was already posted on
//!   this PR; used to post at most one.
//!
//! The writer (`html_comment`) and the reader (`is_in`, `parse_all`) share
//! the same prefix so the two cannot drift apart.

const APPROVAL_PREFIX: &str = "APPROVAL_MARKER:";

/// Marks a PR as having at least one rejection notice
pub const REJECTION_MARKER: &str = "<!-- REJECTION_MARKER -->";

/// Approval of a single commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalMarker {
    pub sha: String,
}

impl ApprovalMarker {
    pub fn new(sha: impl Into<String>) -> Self {
        Self { sha: sha.into() }
    }

    /// The machine-readable token, `APPROVAL_MARKER:<sha>`
    pub fn token(&self) -> String {
        format!("{}{}", APPROVAL_PREFIX, self.sha)
    }

    /// The token wrapped in an HTML comment, as embedded in approval comments
    pub fn html_comment(&self) -> String {
        format!("<!-- {} -->", self.token())
    }

    /// Whether `body` carries this approval (exact substring match)
    pub fn is_in(&self, body: &str) -> bool {
        body.contains(&self.token())
    }

    /// Every approval marker found in `body`, in order of appearance
    pub fn parse_all(body: &str) -> Vec<ApprovalMarker> {
        body.match_indices(APPROVAL_PREFIX)
            .map(|(start, _)| {
                let rest = &body[start + APPROVAL_PREFIX.len()..];
                let end = rest
                    .find(|c: char| !c.is_ascii_alphanumeric())
                    .unwrap_or(rest.len());
                &rest[..end]
            })
            .filter(|sha| !sha.is_empty())
            .map(ApprovalMarker::new)
            .collect()
    }
}

impl std::fmt::Display for ApprovalMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.token())
    }
}

pub fn has_rejection(body: &str) -> bool {
    body.contains(REJECTION_MARKER)
}
