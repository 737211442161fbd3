//! LSP server implementation using tower-lsp.

use std::sync::Arc;
use tokio::sync::Mutex;
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};

use nblint_core::{Config, Event, Outcome, Session};

use crate::capabilities::server_capabilities;
use crate::convert;

/// The nblint language server.
pub struct NblintLanguageServer {
    /// The LSP client for sending notifications.
    client: Client,
    /// Configuration from the command line, before client overrides.
    base_config: Config,
    /// Analysis state. Every event is handled under this lock, so events
    /// never interleave.
    session: Arc<Mutex<Session>>,
}

impl NblintLanguageServer {
    /// Create a new language server instance.
    pub fn new(client: Client, config: Config) -> Self {
        Self {
            client,
            session: Arc::new(Mutex::new(Session::new(config.clone()))),
            base_config: config,
        }
    }

    /// Run one event to completion off the async runtime.
    ///
    /// Linting spawns external processes and blocks, so the session is
    /// driven from the blocking pool.
    async fn dispatch(&self, event: Event) -> Option<Outcome> {
        let session = Arc::clone(&self.session);
        match tokio::task::spawn_blocking(move || session.blocking_lock().handle(event)).await {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                tracing::error!(%err, "event handler did not complete");
                None
            }
        }
    }

    /// Dispatch an editing event and publish what it produced.
    async fn dispatch_and_publish(&self, uri: Url, event: Event) {
        let Some(Outcome::Diagnostics { diagnostics, .. }) = self.dispatch(event).await else {
            return;
        };

        let diagnostics: Vec<Diagnostic> =
            diagnostics.iter().map(convert::diagnostic_to_lsp).collect();
        self.client
            .publish_diagnostics(uri, diagnostics, None)
            .await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for NblintLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let config = match params.initialization_options {
            Some(options) => self.base_config.merged_with(&options).map_err(|err| {
                tracing::error!(%err, "invalid initialization options");
                Error::invalid_params(format!("invalid initialization options: {err}"))
            })?,
            None => self.base_config.clone(),
        };
        tracing::debug!(?config, "initializing");

        {
            let mut session = self.session.lock().await;
            session.reconfigure(config);
            if let Err(err) = session.initialize() {
                tracing::error!(%err, "failed to create cache directory");
            }
        }

        Ok(InitializeResult {
            capabilities: server_capabilities(),
            server_info: Some(ServerInfo {
                name: "nblint".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        tracing::info!("client initialized");
        self.client
            .log_message(MessageType::INFO, "nblint server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("shutting down");
        self.dispatch(Event::Shutdown).await;
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let event = Event::Open {
            uri: uri.to_string(),
            text: params.text_document.text,
            version: Some(params.text_document.version),
        };
        self.dispatch_and_publish(uri, event).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;

        // We're using full document sync, so take the last change
        if let Some(change) = params.content_changes.into_iter().last() {
            let event = Event::Change {
                uri: uri.to_string(),
                text: change.text,
                version: Some(params.text_document.version),
            };
            self.dispatch_and_publish(uri, event).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        let event = Event::Close {
            uri: uri.to_string(),
        };
        // Clears diagnostics for the closed document
        self.dispatch_and_publish(uri, event).await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let doc = params.text_document_position_params;
        let event = Event::Hover {
            uri: doc.text_document.uri.to_string(),
            position: convert::position_from_lsp(&doc.position),
        };

        match self.dispatch(event).await {
            Some(Outcome::Hover(Some(text))) => Ok(Some(convert::hover_to_lsp(text))),
            _ => Ok(None),
        }
    }

    async fn semantic_tokens_full(
        &self,
        params: SemanticTokensParams,
    ) -> Result<Option<SemanticTokensResult>> {
        let event = Event::SemanticTokensFull {
            uri: params.text_document.uri.to_string(),
        };

        match self.dispatch(event).await {
            Some(Outcome::SemanticTokens(Some(tokens))) => Ok(Some(SemanticTokensResult::Tokens(
                convert::semantic_tokens_to_lsp(&tokens),
            ))),
            _ => Ok(None),
        }
    }
}

/// Run the LSP server over stdio.
pub async fn run_server(config: Config) {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) =
        LspService::new(move |client| NblintLanguageServer::new(client, config.clone()));
    Server::new(stdin, stdout, socket).serve(service).await;
}
