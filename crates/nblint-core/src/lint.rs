//! Linter and type-checker orchestration.
//!
//! Both tools are run as child processes against a document's scratch file.
//! Their outputs are concatenated and filtered down to the lines that point
//! into a `.py` file, which drops banners and summaries from either tool.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::config::Config;
use crate::error::{AnalysisError, Result};

/// Substring every finding line carries: the scratch file's extension.
pub const FINDING_MARKER: &str = ".py";

/// Exit code the linter reserves for its own failures (bad arguments,
/// internal errors). Any other non-zero code means "findings reported".
const LINTER_FAILURE_EXIT_CODE: i32 = 2;

/// Runs the configured linter and type checker.
#[derive(Debug, Clone)]
pub struct Linter {
    config: Config,
}

/// Captured output of one tool run.
#[derive(Debug)]
struct ToolOutput {
    status: ExitStatus,
    text: String,
}

impl Linter {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Lint one scratch file and return the retained finding lines.
    ///
    /// Both tools are resolved before either runs. A tool missing from
    /// `PATH` fails the whole cycle, as does linter exit status 2.
    #[tracing::instrument(level = "debug", skip(self), fields(linter = %self.config.linter))]
    pub fn run(&self, scratch: &Path) -> Result<String> {
        let linter = resolve_tool(&self.config.linter)?;
        let type_checker = match &self.config.type_checker {
            Some(name) => Some(resolve_tool(name).inspect_err(|err| {
                tracing::error!(%err, "type checker unavailable");
            })?),
            None => None,
        };

        let lint_output = self.run_linter(&linter, scratch)?;
        let mut combined = lint_output.text;

        if let Some(type_checker) = type_checker {
            let mut command = Command::new(&type_checker);
            command.arg(scratch).args(&self.config.type_checker_args);
            let output = capture(command)?;
            tracing::debug!(status = %output.status, "type checker finished");
            if !combined.is_empty() && !combined.ends_with('\n') {
                combined.push('\n');
            }
            combined.push_str(&output.text);
        }

        Ok(retain_finding_lines(&combined))
    }

    fn run_linter(&self, linter: &Path, scratch: &Path) -> Result<ToolOutput> {
        let mut command = Command::new(linter);
        command.args(&self.config.linter_args).arg(scratch);
        let output = capture(command)?;
        tracing::debug!(status = %output.status, "linter finished");

        if output.status.code() == Some(LINTER_FAILURE_EXIT_CODE) {
            return Err(AnalysisError::LinterFailed {
                output: output.text,
            });
        }
        Ok(output)
    }
}

/// Resolve an executable on `PATH`.
pub fn resolve_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|source| AnalysisError::ToolNotFound {
        tool: name.to_string(),
        source,
    })
}

/// Run a command, capturing stdout, or stderr when stdout is empty.
///
/// Some tools report on stderr depending on their exit status.
fn capture(mut command: Command) -> Result<ToolOutput> {
    let output = command.output()?;
    let stream = if output.stdout.is_empty() {
        &output.stderr
    } else {
        &output.stdout
    };
    Ok(ToolOutput {
        status: output.status,
        text: String::from_utf8_lossy(stream).into_owned(),
    })
}

/// Keep only lines that reference a `.py` file.
pub fn retain_finding_lines(output: &str) -> String {
    output
        .lines()
        .filter(|line| line.contains(FINDING_MARKER))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retains_only_finding_lines() {
        let output = "nb.py:4:1: E501 line too long\n\
                      Found 1 error.\n\
                      nb.py:7:5: error: Name \"x\" is not defined  [name-defined]\n\
                      Found 1 error in 1 file (checked 1 source file)";
        assert_eq!(
            retain_finding_lines(output),
            "nb.py:4:1: E501 line too long\n\
             nb.py:7:5: error: Name \"x\" is not defined  [name-defined]"
        );
    }

    #[test]
    fn all_clear_output_is_dropped() {
        assert_eq!(retain_finding_lines("All checks passed!\n"), "");
    }

    #[test]
    fn missing_linter_is_reported() {
        let linter = Linter::new(Config {
            linter: "nblint-test-no-such-linter".to_string(),
            ..Config::default()
        });
        let err = linter.run(Path::new("nb.py")).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::ToolNotFound { ref tool, .. } if tool == "nblint-test-no-such-linter"
        ));
    }

    #[cfg(unix)]
    mod with_fake_tools {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        fn script(dir: &Path, name: &str, body: &str) -> String {
            let path = dir.join(name);
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path.to_string_lossy().into_owned()
        }

        #[test]
        fn combines_linter_and_type_checker_output() {
            let tmp = tempfile::tempdir().unwrap();
            let linter = script(
                tmp.path(),
                "lint",
                "echo \"$2:4:1: E501 line too long\"\necho 'Found 1 error.'\nexit 1",
            );
            let checker = script(
                tmp.path(),
                "check",
                "echo \"$1:2:1: error: Name \\\"y\\\" is not defined  [name-defined]\"\nexit 1",
            );
            let config = Config {
                linter,
                type_checker: Some(checker),
                ..Config::default()
            };

            let output = Linter::new(config).run(Path::new("/tmp/nb.py")).unwrap();
            assert_eq!(
                output,
                "/tmp/nb.py:4:1: E501 line too long\n\
                 /tmp/nb.py:2:1: error: Name \"y\" is not defined  [name-defined]"
            );
        }

        #[test]
        fn stderr_is_used_when_stdout_is_empty() {
            let tmp = tempfile::tempdir().unwrap();
            let linter = script(tmp.path(), "lint", "echo \"$2:1:1: F401 unused\" >&2\nexit 1");
            let config = Config {
                linter,
                type_checker: None,
                ..Config::default()
            };

            let output = Linter::new(config).run(Path::new("nb.py")).unwrap();
            assert_eq!(output, "nb.py:1:1: F401 unused");
        }

        #[test]
        fn exit_status_two_fails_the_cycle() {
            let tmp = tempfile::tempdir().unwrap();
            let linter = script(tmp.path(), "lint", "echo 'bad config'\nexit 2");
            let config = Config {
                linter,
                type_checker: None,
                ..Config::default()
            };

            let err = Linter::new(config).run(Path::new("nb.py")).unwrap_err();
            assert!(matches!(err, AnalysisError::LinterFailed { ref output } if output.contains("bad config")));
        }

        #[test]
        fn missing_type_checker_fails_the_cycle() {
            let tmp = tempfile::tempdir().unwrap();
            let linter = script(tmp.path(), "lint", "exit 0");
            let config = Config {
                linter,
                type_checker: Some("nblint-test-no-such-checker".to_string()),
                ..Config::default()
            };

            let err = Linter::new(config).run(Path::new("nb.py")).unwrap_err();
            assert!(matches!(err, AnalysisError::ToolNotFound { .. }));
        }
    }
}
