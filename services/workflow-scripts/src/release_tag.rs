//! Changelog Release Tag
//!
//! Derives a release tag from the single changelog file changed by a
//! release-notes merge. `docs/CHANGES/feature-x.md` becomes
//! `CHANGES/feature-x` (or `<project_src>/CHANGES/feature-x`).

use thiserror::Error;
use tracing::info;

use crate::runtime::{OutputSink, RuntimeError};

#[derive(Debug, Error)]
pub enum ReleaseTagError {
    /// Zero or several changed files: the release is ambiguous
    #[error("Expected exactly one item in changes input, but found {0}")]
    ItemCount(usize),

    /// The changed file has no subdirectory
    #[error("Invalid item format: {0}")]
    InvalidItem(String),

    #[error(transparent)]
    Output(#[from] RuntimeError),
}

/// A computed tag and the changelog file it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag {
    pub tag: String,
    pub changelog_file: String,
}

/// Strip one leading and one trailing quote character (`'` or `"`)
fn strip_quotes(item: &str) -> &str {
    let item = item.strip_prefix(['\'', '"']).unwrap_or(item);
    item.strip_suffix(['\'', '"']).unwrap_or(item)
}

/// Changed files listed in a comma-separated `changes` input
pub fn split_changes(changes: &str) -> Vec<&str> {
    changes
        .split(',')
        .map(str::trim)
        .map(strip_quotes)
        .filter(|item| !item.is_empty())
        .collect()
}

/// Compute the release tag for `changes`, prefixed with `project_src` when non-empty
pub fn extract(changes: &str, project_src: &str) -> Result<ReleaseTag, ReleaseTagError> {
    let items = split_changes(changes);
    let [item] = items.as_slice() else {
        return Err(ReleaseTagError::ItemCount(items.len()));
    };

    let segments: Vec<&str> = item.split('/').collect();
    if segments.len() < 2 {
        return Err(ReleaseTagError::InvalidItem(item.to_string()));
    }

    let path = segments[1..].join("/");
    let tag = path.strip_suffix(".md").unwrap_or(&path);
    let tag = if project_src.is_empty() {
        tag.to_string()
    } else {
        format!("{}/{}", project_src, tag)
    };

    Ok(ReleaseTag {
        tag,
        changelog_file: item.to_string(),
    })
}

/// Compute the tag and publish `release_tag` and `changelog_file`.
///
/// Nothing is written when the input is rejected.
pub fn run(
    changes: &str,
    project_src: &str,
    outputs: &mut dyn OutputSink,
) -> Result<ReleaseTag, ReleaseTagError> {
    let release = extract(changes, project_src)?;

    info!("Tag: {}", release.tag);
    info!("Changelog item: {}", release.changelog_file);

    outputs.set_output("release_tag", &release.tag)?;
    outputs.set_output("changelog_file", &release.changelog_file)?;

    Ok(release)
}
