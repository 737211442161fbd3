//! Translation of linter output into diagnostics.
//!
//! Every retained tool line has the shape
//! `<path>.py:LINE:COLUMN:CODE DESCRIPTION`. Lines are parsed one at a time;
//! a malformed line is skipped with a warning instead of failing the batch.

use crate::error::{AnalysisError, Result};
use crate::lint::FINDING_MARKER;
use crate::notebook;
use crate::types::{Diagnostic, DiagnosticSeverity, Range};

/// End column of the synthetic whole-line range given to every diagnostic.
/// Tool columns are not tracked for ranges.
pub const FULL_LINE_END: u32 = 10_000;

/// Globals a notebook runtime defines implicitly.
pub const IMPLICIT_NOTEBOOK_GLOBALS: [&str; 2] = ["spark", "dbutils"];

/// One parsed line of tool output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinterFinding {
    pub file_path: String,
    /// 1-based line number, as printed by the tool.
    pub line: u32,
    pub column: u32,
    pub code: String,
    pub description: String,
}

/// Split a tool line at the last `.py:` marker.
///
/// Returns the path (extension included) and everything after the marker.
pub(crate) fn split_at_marker(line: &str) -> Option<(String, &str)> {
    let marker = format!("{FINDING_MARKER}:");
    line.rsplit_once(marker.as_str())
        .map(|(path, rest)| (format!("{path}{FINDING_MARKER}"), rest))
}

/// Parse one tool output line into a finding.
pub fn parse_finding(line: &str) -> Result<LinterFinding> {
    let (file_path, rest) = split_at_marker(line)
        .ok_or_else(|| AnalysisError::parse(line, "missing file marker"))?;

    let mut fields = rest.splitn(3, ':');
    let line_no = parse_number(line, fields.next(), "line")?;
    let column = parse_number(line, fields.next(), "column")?;
    let remainder = fields.next().unwrap_or_default().trim();

    let (code, description) = match remainder.split_once(char::is_whitespace) {
        Some((code, description)) => (code, description.trim()),
        None => (remainder, ""),
    };

    Ok(LinterFinding {
        file_path,
        line: line_no,
        column,
        code: code.trim_end_matches(':').to_string(),
        description: description.to_string(),
    })
}

fn parse_number(line: &str, field: Option<&str>, what: &str) -> Result<u32> {
    let field = field.ok_or_else(|| AnalysisError::parse(line, format!("missing {what} field")))?;
    field
        .trim()
        .parse()
        .map_err(|err| AnalysisError::parse(line, format!("invalid {what} {field:?}: {err}")))
}

/// Severity from a finding code.
///
/// `E…` codes and `warning` are warnings, `F…` codes and `error` are
/// errors, anything else is informational.
pub fn severity_for(code: &str) -> DiagnosticSeverity {
    if code.contains('E') || code.contains("warning") {
        DiagnosticSeverity::Warning
    } else if code.contains('F') || code.contains("error") {
        DiagnosticSeverity::Error
    } else {
        DiagnosticSeverity::Information
    }
}

fn is_undefined_name(finding: &LinterFinding) -> bool {
    let description = finding.description.to_lowercase();
    finding.code == "F821"
        || description.contains("undefined name")
        || description.contains("is not defined")
}

fn names_implicit_global(description: &str) -> bool {
    IMPLICIT_NOTEBOOK_GLOBALS.iter().any(|name| {
        description.contains(&format!("`{name}`")) || description.contains(&format!("\"{name}\""))
    })
}

/// Whether a finding is noise caused by the notebook runtime.
///
/// In a notebook, undefined-name findings about the implicit globals are
/// dropped. Everything else, and every finding in a plain Python file,
/// is kept.
pub fn is_suppressed(finding: &LinterFinding, is_notebook: bool) -> bool {
    is_notebook && is_undefined_name(finding) && names_implicit_global(&finding.description)
}

/// Build a diagnostic from a finding.
pub fn finding_to_diagnostic(finding: LinterFinding) -> Diagnostic {
    let range = Range::line(finding.line.saturating_sub(1), FULL_LINE_END);
    let severity = severity_for(&finding.code);
    let message = if finding.description.is_empty() {
        finding.code.clone()
    } else {
        finding.description
    };
    Diagnostic::new(range, severity, message).with_code(finding.code)
}

/// Translate cached tool output into diagnostics for a document.
///
/// `document_text` decides whether notebook suppressions apply.
pub fn publish_diagnostics(cached: &str, document_text: &str) -> Vec<Diagnostic> {
    let is_notebook = notebook::is_notebook(document_text);

    cached
        .lines()
        .filter(|line| line.contains(FINDING_MARKER))
        .filter_map(|line| match parse_finding(line) {
            Ok(finding) => Some(finding),
            Err(err) => {
                tracing::warn!(%err, "skipping malformed tool output");
                None
            }
        })
        .filter(|finding| {
            let suppressed = is_suppressed(finding, is_notebook);
            if suppressed {
                tracing::debug!(code = %finding.code, line = finding.line, "suppressed notebook finding");
            }
            !suppressed
        })
        .map(finding_to_diagnostic)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTEBOOK_HEADER: &str = "# Databricks notebook source\n";

    #[test]
    fn parses_linter_line() {
        let finding = parse_finding("x.py:4:1: E501 line too long").unwrap();
        assert_eq!(
            finding,
            LinterFinding {
                file_path: "x.py".to_string(),
                line: 4,
                column: 1,
                code: "E501".to_string(),
                description: "line too long".to_string(),
            }
        );
    }

    #[test]
    fn parses_type_checker_line() {
        let finding = parse_finding(
            ".nblint/.tempFiles/.temp_0_file___nb.py:12:5: error: Name \"spark\" is not defined  [name-defined]",
        )
        .unwrap();
        assert_eq!(finding.file_path, ".nblint/.tempFiles/.temp_0_file___nb.py");
        assert_eq!(finding.line, 12);
        assert_eq!(finding.column, 5);
        assert_eq!(finding.code, "error");
        assert_eq!(finding.description, "Name \"spark\" is not defined  [name-defined]");
    }

    #[test]
    fn malformed_numbers_are_parse_errors() {
        let err = parse_finding("x.py:four:1: E501 line too long").unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { .. }));
        assert!(parse_finding("x.py: error: cannot read file").is_err());
        assert!(parse_finding("no marker here").is_err());
    }

    #[test]
    fn severity_follows_code() {
        assert_eq!(severity_for("E501"), DiagnosticSeverity::Warning);
        assert_eq!(severity_for("warning"), DiagnosticSeverity::Warning);
        assert_eq!(severity_for("F401"), DiagnosticSeverity::Error);
        assert_eq!(severity_for("error"), DiagnosticSeverity::Error);
        assert_eq!(severity_for("W291"), DiagnosticSeverity::Information);
        assert_eq!(severity_for("note"), DiagnosticSeverity::Information);
    }

    #[test]
    fn line_too_long_example() {
        let diagnostics = publish_diagnostics("x.py:4:1: E501 line too long", "");
        assert_eq!(diagnostics.len(), 1);
        let diag = &diagnostics[0];
        assert_eq!(diag.range, Range::line(3, FULL_LINE_END));
        assert_eq!(diag.severity, DiagnosticSeverity::Warning);
        assert_eq!(diag.code.as_deref(), Some("E501"));
        assert_eq!(diag.message, "line too long");
        insta::assert_snapshot!(
            serde_json::to_string(diag).unwrap(),
            @r#"{"range":{"start":{"line":3,"character":0},"end":{"line":3,"character":10000}},"severity":"warning","code":"E501","source":"nblint","message":"line too long"}"#
        );
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let cached = "x.py:oops:1: E501 line too long\nx.py:2:1: F401 `os` imported but unused";
        let diagnostics = publish_diagnostics(cached, "");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code.as_deref(), Some("F401"));
    }

    #[test]
    fn implicit_globals_are_suppressed_in_notebooks() {
        let cached = "nb.py:3:1: F821 Undefined name `spark`\n\
                      nb.py:4:1: error: Name \"dbutils\" is not defined  [name-defined]\n\
                      nb.py:5:1: F821 Undefined name `sparkle`";
        let diagnostics = publish_diagnostics(cached, NOTEBOOK_HEADER);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Undefined name `sparkle`");
    }

    #[test]
    fn plain_files_keep_undefined_names() {
        let cached = "nb.py:3:1: F821 Undefined name `spark`";
        let diagnostics = publish_diagnostics(cached, "import os\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, DiagnosticSeverity::Error);
    }

    #[test]
    fn code_only_finding_uses_code_as_message() {
        let diagnostics = publish_diagnostics("x.py:1:1: E999", "");
        assert_eq!(diagnostics[0].message, "E999");
    }
}
