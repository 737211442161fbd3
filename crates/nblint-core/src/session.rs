//! The analysis session: open documents, cached lint results, and the
//! typed events that drive them.
//!
//! A `Session` is synchronous and handles one [`Event`] at a time. Editing
//! events re-write the scratch file and re-run both tools end to end; there
//! is no debouncing and no incremental work.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::Config;
use crate::diagnostics;
use crate::document::DocumentStore;
use crate::error::Result;
use crate::hover;
use crate::lint::Linter;
use crate::scratch::ScratchSpace;
use crate::semantic_tokens::{self, EncodedToken};
use crate::types::{Diagnostic, Position};

/// Every request or notification the core understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Open {
        uri: String,
        text: String,
        version: Option<i32>,
    },
    Change {
        uri: String,
        text: String,
        version: Option<i32>,
    },
    Close {
        uri: String,
    },
    /// `position` is 0-based, as sent by the client.
    Hover {
        uri: String,
        position: Position,
    },
    SemanticTokensFull {
        uri: String,
    },
    Shutdown,
}

/// What handling an [`Event`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Diagnostics to publish for a document.
    Diagnostics {
        uri: String,
        diagnostics: Vec<Diagnostic>,
    },
    Hover(Option<String>),
    /// `None` when the document is not a notebook.
    SemanticTokens(Option<Vec<EncodedToken>>),
    Done,
}

/// Document store plus linter result cache, owned by the request handler.
#[derive(Debug)]
pub struct Session {
    config: Config,
    documents: DocumentStore,
    lint_results: HashMap<String, String>,
    scratch: ScratchSpace,
    linter: Linter,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            scratch: ScratchSpace::new(&config),
            linter: Linter::new(config.clone()),
            config,
            documents: DocumentStore::new(),
            lint_results: HashMap::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the configuration. Open documents and cached results are kept.
    pub fn reconfigure(&mut self, config: Config) {
        self.scratch = ScratchSpace::new(&config);
        self.linter = Linter::new(config.clone());
        self.config = config;
    }

    /// Create the cache directory. Called once the client has connected.
    pub fn initialize(&mut self) -> Result<()> {
        self.scratch.ensure()?;
        Ok(())
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    /// The cached, filtered tool output for a document.
    pub fn lint_result(&self, uri: &str) -> Option<&str> {
        self.lint_results.get(uri).map(String::as_str)
    }

    /// Handle one event to completion.
    pub fn handle(&mut self, event: Event) -> Outcome {
        match event {
            Event::Open { uri, text, version } => {
                tracing::info!(%uri, "opened");
                self.documents.open(uri.clone(), text, version);
                self.refresh(uri)
            }
            Event::Change { uri, text, version } => {
                tracing::debug!(%uri, "changed");
                self.documents.update(&uri, text, version);
                self.refresh(uri)
            }
            Event::Close { uri } => {
                self.close(&uri);
                Outcome::Diagnostics {
                    uri,
                    diagnostics: Vec::new(),
                }
            }
            Event::Hover { uri, position } => Outcome::Hover(self.hover(&uri, position)),
            Event::SemanticTokensFull { uri } => {
                Outcome::SemanticTokens(self.semantic_tokens(&uri))
            }
            Event::Shutdown => {
                self.shutdown();
                Outcome::Done
            }
        }
    }

    /// Cache, lint and translate a document.
    ///
    /// Failures are logged; the document then publishes no diagnostics.
    fn refresh(&mut self, uri: String) -> Outcome {
        let linted = self
            .cache_document(&uri)
            .and_then(|_| self.lint_document(&uri));
        if let Err(err) = linted {
            tracing::error!(%uri, %err, "lint cycle failed");
            self.lint_results.remove(&uri);
        }

        let diagnostics = self.publish_diagnostics(&uri);
        tracing::debug!(%uri, count = diagnostics.len(), "published diagnostics");
        Outcome::Diagnostics { uri, diagnostics }
    }

    /// Mirror a document's current text to its scratch file.
    pub fn cache_document(&self, uri: &str) -> Result<PathBuf> {
        Ok(self.scratch.write(uri, self.documents.get(uri))?)
    }

    /// Run the tools against a document's scratch file and replace its
    /// cached result.
    pub fn lint_document(&mut self, uri: &str) -> Result<()> {
        let output = self.linter.run(&self.scratch.path_for(uri))?;
        self.lint_results.insert(uri.to_string(), output);
        Ok(())
    }

    /// Diagnostics from the cached result of the last lint run.
    pub fn publish_diagnostics(&self, uri: &str) -> Vec<Diagnostic> {
        match self.lint_results.get(uri) {
            Some(cached) => diagnostics::publish_diagnostics(cached, self.documents.get(uri)),
            None => Vec::new(),
        }
    }

    /// Hover text for a 0-based position.
    pub fn hover(&self, uri: &str, position: Position) -> Option<String> {
        let cached = self.lint_results.get(uri)?;
        let text = hover::hover_text(cached, position.line + 1);
        if text.is_none() {
            tracing::debug!(%uri, line = position.line, "no linter message");
        }
        text
    }

    pub fn semantic_tokens(&self, uri: &str) -> Option<Vec<EncodedToken>> {
        semantic_tokens::semantic_tokens(self.documents.get(uri))
    }

    fn close(&mut self, uri: &str) {
        self.documents.close(uri);
        self.lint_results.remove(uri);
        if let Err(err) = self.scratch.remove(uri) {
            tracing::debug!(%uri, %err, "no scratch file to remove");
        }
    }

    /// Delete every scratch file and the cache directory.
    pub fn shutdown(&mut self) {
        let uris: Vec<String> = self.documents.uris().map(str::to_string).collect();
        self.scratch.cleanup(uris.iter().map(String::as_str));
        self.lint_results.clear();
    }
}
