//! Transport-agnostic analysis for notebook source files.
//!
//! This crate holds the analysis core of the `nblint` language server
//! without any LSP protocol dependencies.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          nblint-core                            │
//! │                                                                 │
//! │  semantic tokens:  notebook ─▶ tokens ─▶ semantic_tokens        │
//! │  diagnostics:      scratch ─▶ lint ─▶ diagnostics / hover       │
//! │                                                                 │
//! │  session: document store + lint result cache + typed events     │
//! └─────────────────────────────────────────────────────────────────┘
//!                                 │
//!                                 ▼
//!                    ┌───────────────────────┐
//!                    │      nblint-lsp       │
//!                    │  (tower-lsp server)   │
//!                    └───────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use nblint_core::{Config, Event, Session};
//!
//! let mut session = Session::new(Config::default());
//! session.initialize()?;
//! let outcome = session.handle(Event::Open {
//!     uri: "file:///nb.py".into(),
//!     text: content,
//!     version: Some(1),
//! });
//! ```

pub mod config;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod hover;
pub mod keywords;
pub mod lint;
pub mod notebook;
pub mod scratch;
pub mod semantic_tokens;
pub mod session;
pub mod tokens;
pub mod types;

// Re-export main types and functions for convenience
pub use config::Config;
pub use diagnostics::{LinterFinding, publish_diagnostics};
pub use document::{Document, DocumentStore};
pub use error::{AnalysisError, Result};
pub use semantic_tokens::{EncodedToken, TOKEN_MODIFIERS, TOKEN_TYPES};
pub use session::{Event, Outcome, Session};
pub use tokens::{RawToken, TokenKind};
pub use types::{Diagnostic, DiagnosticSeverity, Position, Range};
