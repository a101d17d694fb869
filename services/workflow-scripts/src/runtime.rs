//! Workflow Step Runtime
//!
//! The pieces every script needs from the Actions runner: input
//! normalization, step outputs, failure reporting, and logging setup.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A required input is missing or blank
    #[error("Input required and not supplied: {0}")]
    MissingInput(String),

    /// The output value contains the heredoc delimiter
    #[error("Unexpected input: value for output {name} contains the delimiter")]
    DelimiterCollision { name: String },

    #[error("Failed to write output {name} to {path}: {source}")]
    WriteOutput {
        name: String,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Normalize an optional input: surrounding whitespace trimmed, blank treated as absent
pub fn input(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normalize a required input, failing when it is absent or blank
pub fn required_input(name: &str, value: Option<String>) -> Result<String, RuntimeError> {
    input(value).ok_or_else(|| RuntimeError::MissingInput(name.to_string()))
}

/// Destination for step outputs
pub trait OutputSink {
    fn set_output(&mut self, name: &str, value: &str) -> Result<(), RuntimeError>;
}

/// Appends outputs to the file named by `GITHUB_OUTPUT`
pub struct GithubOutputFile {
    path: PathBuf,
}

impl GithubOutputFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputSink for GithubOutputFile {
    fn set_output(&mut self, name: &str, value: &str) -> Result<(), RuntimeError> {
        let delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
        if name.contains(&delimiter) || value.contains(&delimiter) {
            return Err(RuntimeError::DelimiterCollision {
                name: name.to_string(),
            });
        }

        let write_error = |source| RuntimeError::WriteOutput {
            name: name.to_string(),
            path: self.path.display().to_string(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_error)?;

        writeln!(file, "{name}<<{delimiter}\n{value}\n{delimiter}").map_err(write_error)
    }
}

/// Fallback when no output file is configured (local runs)
pub struct StdoutOutputs;

impl OutputSink for StdoutOutputs {
    fn set_output(&mut self, name: &str, value: &str) -> Result<(), RuntimeError> {
        println!("{name}={value}");
        Ok(())
    }
}

/// Keeps outputs in memory
#[derive(Debug, Default)]
pub struct MemoryOutputs {
    pub values: BTreeMap<String, String>,
}

impl MemoryOutputs {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

impl OutputSink for MemoryOutputs {
    fn set_output(&mut self, name: &str, value: &str) -> Result<(), RuntimeError> {
        self.values.insert(name.to_string(), value.to_string());
        Ok(())
    }
}

/// Output sink for the current runner: `GITHUB_OUTPUT` when set, stdout otherwise
pub fn outputs_from_env() -> Box<dyn OutputSink> {
    match std::env::var("GITHUB_OUTPUT").ok().filter(|p| !p.is_empty()) {
        Some(path) => Box::new(GithubOutputFile::new(path)),
        None => {
            warn!("GITHUB_OUTPUT not set; printing outputs to stdout");
            Box::new(StdoutOutputs)
        }
    }
}

/// Escape a message for a workflow command
fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Workflow command marking the step as failed with `message`
pub fn error_command(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}

/// Record an invocation failure. The caller exits non-zero afterwards.
pub fn report_failure(err: &anyhow::Error) {
    error!("{err:#}");
    println!("{}", error_command(&format!("{err:#}")));
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the default level.
pub fn init_tracing(verbose: bool) {
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_input() {
        assert_eq!(required_input("CHANGES", Some(" a/b.md ".into())).unwrap(), "a/b.md");

        let err = required_input("CHANGES", Some("   ".into())).unwrap_err();
        assert_eq!(err.to_string(), "Input required and not supplied: CHANGES");
        assert!(required_input("CHANGES", None).is_err());
    }

    #[test]
    fn test_optional_input() {
        assert_eq!(input(None), None);
        assert_eq!(input(Some(String::new())), None);
        assert_eq!(input(Some(" infra ".into())).as_deref(), Some("infra"));
    }

    #[test]
    fn test_github_output_file_format() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut outputs = GithubOutputFile::new(file.path());

        outputs.set_output("release_tag", "CHANGES/feature-x").unwrap();
        outputs.set_output("should_run", "true").unwrap();

        let written = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("release_tag<<ghadelimiter_"));
        assert_eq!(lines[1], "CHANGES/feature-x");
        assert_eq!(lines[2], &lines[0]["release_tag<<".len()..]);
        assert!(lines[3].starts_with("should_run<<ghadelimiter_"));
        assert_eq!(lines[4], "true");
    }

    #[test]
    fn test_error_command_escaping() {
        assert_eq!(
            error_command("50% done\nsecond line"),
            "::error::50%25 done%0Asecond line"
        );
    }

    #[test]
    fn test_memory_outputs() {
        let mut outputs = MemoryOutputs::default();
        outputs.set_output("changelog_file", "docs/x.md").unwrap();
        assert_eq!(outputs.get("changelog_file"), Some("docs/x.md"));
        assert_eq!(outputs.get("release_tag"), None);
    }
}
