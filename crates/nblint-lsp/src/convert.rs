//! Conversion between nblint-core types and tower_lsp::lsp_types.

use tower_lsp::lsp_types::{
    Diagnostic as LspDiagnostic, DiagnosticSeverity as LspSeverity, Hover, HoverContents,
    MarkedString, NumberOrString, Position as LspPosition, Range as LspRange, SemanticToken,
    SemanticTokens,
};

use nblint_core::{Diagnostic, DiagnosticSeverity, EncodedToken, Position, Range};

/// Convert an lsp-types Position to an nblint-core Position.
pub fn position_from_lsp(pos: &LspPosition) -> Position {
    Position::new(pos.line, pos.character)
}

/// Convert an nblint-core Position to an lsp-types Position.
pub fn position_to_lsp(pos: &Position) -> LspPosition {
    LspPosition {
        line: pos.line,
        character: pos.character,
    }
}

/// Convert an nblint-core Range to an lsp-types Range.
pub fn range_to_lsp(range: &Range) -> LspRange {
    LspRange {
        start: position_to_lsp(&range.start),
        end: position_to_lsp(&range.end),
    }
}

/// Convert an nblint-core DiagnosticSeverity to an lsp-types DiagnosticSeverity.
pub fn severity_to_lsp(severity: &DiagnosticSeverity) -> LspSeverity {
    match severity {
        DiagnosticSeverity::Error => LspSeverity::ERROR,
        DiagnosticSeverity::Warning => LspSeverity::WARNING,
        DiagnosticSeverity::Information => LspSeverity::INFORMATION,
        DiagnosticSeverity::Hint => LspSeverity::HINT,
    }
}

/// Convert an nblint-core Diagnostic to an lsp-types Diagnostic.
pub fn diagnostic_to_lsp(diag: &Diagnostic) -> LspDiagnostic {
    LspDiagnostic {
        range: range_to_lsp(&diag.range),
        severity: Some(severity_to_lsp(&diag.severity)),
        code: diag.code.clone().map(NumberOrString::String),
        code_description: None,
        source: diag.source.clone(),
        message: diag.message.clone(),
        related_information: None,
        tags: None,
        data: None,
    }
}

/// Wrap hover text as plain-string hover contents.
pub fn hover_to_lsp(text: String) -> Hover {
    Hover {
        contents: HoverContents::Scalar(MarkedString::String(text)),
        range: None,
    }
}

/// Convert encoded tokens to lsp-types semantic tokens.
///
/// `SemanticToken` serializes to the same five integers per token.
pub fn semantic_tokens_to_lsp(tokens: &[EncodedToken]) -> SemanticTokens {
    SemanticTokens {
        result_id: None,
        data: tokens
            .iter()
            .map(|t| SemanticToken {
                delta_line: t.delta_line,
                delta_start: t.delta_column,
                length: t.length,
                token_type: t.kind,
                token_modifiers_bitset: t.modifiers,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_conversion() {
        let lsp_pos = position_to_lsp(&Position::new(10, 5));
        assert_eq!(lsp_pos.line, 10);
        assert_eq!(lsp_pos.character, 5);
        assert_eq!(position_from_lsp(&lsp_pos), Position::new(10, 5));
    }

    #[test]
    fn test_severity_conversion() {
        assert_eq!(severity_to_lsp(&DiagnosticSeverity::Error), LspSeverity::ERROR);
        assert_eq!(severity_to_lsp(&DiagnosticSeverity::Warning), LspSeverity::WARNING);
        assert_eq!(
            severity_to_lsp(&DiagnosticSeverity::Information),
            LspSeverity::INFORMATION
        );
        assert_eq!(severity_to_lsp(&DiagnosticSeverity::Hint), LspSeverity::HINT);
    }

    #[test]
    fn test_diagnostic_conversion() {
        let core_diag = Diagnostic::new(
            Range::line(3, 10_000),
            DiagnosticSeverity::Warning,
            "line too long",
        )
        .with_code("E501");

        let lsp_diag = diagnostic_to_lsp(&core_diag);
        assert_eq!(lsp_diag.message, "line too long");
        assert_eq!(lsp_diag.severity, Some(LspSeverity::WARNING));
        assert_eq!(lsp_diag.code, Some(NumberOrString::String("E501".into())));
        assert_eq!(lsp_diag.source.as_deref(), Some("nblint"));
        assert_eq!(lsp_diag.range.start.line, 3);
    }

    #[test]
    fn test_hover_is_plain_string() {
        let hover = hover_to_lsp("E501 line too long".to_string());
        assert_eq!(
            hover.contents,
            HoverContents::Scalar(MarkedString::String("E501 line too long".to_string()))
        );
    }

    #[test]
    fn test_semantic_tokens_serialize_flat() {
        let tokens = [
            EncodedToken {
                delta_line: 10,
                delta_column: 2,
                length: 6,
                kind: 1,
                modifiers: 0,
            },
            EncodedToken {
                delta_line: 0,
                delta_column: 7,
                length: 1,
                kind: 2,
                modifiers: 0,
            },
        ];
        let json = serde_json::to_string(&semantic_tokens_to_lsp(&tokens)).unwrap();
        insta::assert_snapshot!(json, @r#"{"data":[10,2,6,1,0,0,7,1,2,0]}"#);
    }
}
