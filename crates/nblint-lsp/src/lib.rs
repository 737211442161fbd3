//! Language Server Protocol implementation for notebook source files.
//!
//! This crate provides the LSP server for exported notebooks, wrapping
//! `nblint-core` with the tower-lsp framework.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                          nblint-lsp                           │
//! │    tower-lsp wrapper, JSON-RPC/stdio, `nblint lsp` command    │
//! │                                                               │
//! │  ┌──────────────┐  ┌─────────────┐  ┌──────────────────────┐  │
//! │  │  server.rs   │  │ convert.rs  │  │   capabilities.rs    │  │
//! │  │LanguageServer│  │ Core ↔ LSP  │  │ Capability/legend    │  │
//! │  └──────┬───────┘  └──────┬──────┘  └──────────────────────┘  │
//! │         │ Event / Outcome │                                   │
//! │         └─────────────────┴──────────────────┐                │
//! │                                              │                │
//! │  ┌───────────────────────────────────────────▼─────────────┐  │
//! │  │                       nblint-core                       │  │
//! │  │         (Transport-agnostic analysis session)           │  │
//! │  └─────────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! The LSP server is invoked via the `nblint lsp` subcommand:
//!
//! ```bash
//! nblint lsp
//! ```
//!
//! Or programmatically:
//!
//! ```rust,ignore
//! nblint_lsp::run_server(nblint_core::Config::default()).await;
//! ```

pub mod capabilities;
pub mod convert;
pub mod server;

pub use server::run_server;
