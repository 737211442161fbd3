//! Error types for the analysis core.

use thiserror::Error;

/// Result alias used throughout `nblint-core`.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur while caching, linting or translating a document.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// An external tool could not be resolved on the search path.
    #[error("Tool not found on PATH: {tool}")]
    ToolNotFound {
        /// The executable name that was looked up
        tool: String,
        /// The underlying lookup failure
        #[source]
        source: which::Error,
    },

    /// IO error while writing a scratch file or spawning a tool.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The linter exited with status 2, which it reserves for its own failures.
    #[error("Linter failed (exit status 2): {output}")]
    LinterFailed {
        /// Whatever the linter printed before failing
        output: String,
    },

    /// A tool output line did not have the `LINE:COLUMN:...` shape.
    #[error("Could not parse tool output line {line:?}: {reason}")]
    Parse {
        /// The offending line
        line: String,
        /// What was wrong with it
        reason: String,
    },
}

impl AnalysisError {
    /// Create a parse error for a tool output line.
    pub fn parse(line: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            line: line.into(),
            reason: reason.into(),
        }
    }
}
