//! LSP capability negotiation.

use tower_lsp::lsp_types::{
    HoverProviderCapability, SemanticTokenModifier, SemanticTokenType, SemanticTokensFullOptions,
    SemanticTokensLegend, SemanticTokensOptions, SemanticTokensServerCapabilities,
    ServerCapabilities, TextDocumentSyncCapability, TextDocumentSyncKind, TextDocumentSyncOptions,
    WorkDoneProgressOptions,
};

use nblint_core::{TOKEN_MODIFIERS, TOKEN_TYPES};

/// Semantic token legend advertised to clients.
pub fn legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: TOKEN_TYPES
            .iter()
            .copied()
            .map(SemanticTokenType::new)
            .collect(),
        token_modifiers: TOKEN_MODIFIERS
            .iter()
            .copied()
            .map(SemanticTokenModifier::new)
            .collect(),
    }
}

/// Get the server capabilities to report to the client.
pub fn server_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        // Every change carries the full text; documents are re-analyzed whole
        text_document_sync: Some(TextDocumentSyncCapability::Options(
            TextDocumentSyncOptions {
                open_close: Some(true),
                change: Some(TextDocumentSyncKind::FULL),
                will_save: None,
                will_save_wait_until: None,
                save: None,
            },
        )),

        hover_provider: Some(HoverProviderCapability::Simple(true)),

        semantic_tokens_provider: Some(SemanticTokensServerCapabilities::SemanticTokensOptions(
            SemanticTokensOptions {
                work_done_progress_options: WorkDoneProgressOptions::default(),
                legend: legend(),
                range: None,
                full: Some(SemanticTokensFullOptions::Bool(true)),
            },
        )),

        ..Default::default()
    }
}
