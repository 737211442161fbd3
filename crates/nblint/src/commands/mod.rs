//! Command implementations for the nblint CLI
//!
//! Each command module handles the CLI interface and delegates to
//! nblint-core and nblint-lsp for the actual work.

pub mod lsp;
