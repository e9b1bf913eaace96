use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolchainError {
    #[error("xcodebuild not found")]
    NotFound,

    #[error("xcodebuild {step} failed ({status}): {stderr}")]
    CommandFailed {
        step: &'static str,
        status: String,
        stderr: String,
    },

    #[error("Failed to run {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

const STDERR_TAIL_LINES: usize = 20;

/// Last lines of a tool's stderr, which is where `xcodebuild` puts the
/// actual failure after pages of build output.
pub(crate) fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::{ToolchainError, stderr_tail};

    #[test]
    fn stderr_tail_keeps_last_lines() {
        let stderr: String = (1..=30).map(|n| format!("line {n}\n\n")).collect();

        let tail = stderr_tail(stderr.as_bytes());

        assert!(tail.starts_with("line 11\n"));
        assert!(tail.ends_with("line 30"));
        assert_eq!(tail.lines().count(), 20);
    }

    #[test]
    fn command_failed_formats_step_and_stderr() {
        let error = ToolchainError::CommandFailed {
            step: "archive",
            status: "exit status: 65".to_string(),
            stderr: "** ARCHIVE FAILED **".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "xcodebuild archive failed (exit status: 65): ** ARCHIVE FAILED **"
        );
    }
}
