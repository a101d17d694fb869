//! Workflow Scripts Library
//!
//! Helpers invoked as steps from GitHub Actions workflows. Each binary is a
//! short handler: read inputs and the event context, call the GitHub API,
//! write step outputs.
//!
//! ## Binaries
//!
//! - `label-issue`: open an issue when a label is edited by hand instead of
//!   through the label config file
//! - `release-tag`: derive a release tag from the changed changelog file
//! - `fork-guard`: decide whether tests may run, gating fork PRs on a
//!   maintainer's `/allow`
//!
//! ## Example Workflow Step
//!
//! ```yaml
//! - name: Check fork approval
//!   id: guard
//!   run: fork-guard
//!   env:
//!     GITHUB_TOKEN: ${{ secrets.GITHUB_TOKEN }}
//!
//! - name: Terraform test
//!   if: steps.guard.outputs.should_run == 'true'
//!   run: terraform test
//! ```
//!
//! Failures are reported as an `::error::` workflow command and a non-zero
//! exit; outputs written before the failure are kept.

pub mod context;
pub mod fork_guard;
pub mod github;
pub mod label_drift;
pub mod marker;
pub mod release_tag;
pub mod runtime;

pub use context::{EventContext, EventPayload};
pub use github::{GitHubApi, GitHubClient, RepoRef};
