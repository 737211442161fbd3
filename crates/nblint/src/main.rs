//! nblint CLI - Main entry point

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "nblint")]
#[command(version)]
#[command(about = "Lint and highlight exported notebook source files", long_about = None)]
struct Cli {
    /// Write logs to FILE instead of stderr
    #[arg(long, global = true, value_name = "FILE")]
    log: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the language server over stdio
    Lsp(LspArgs),
}

/// Configuration flags for the language server.
///
/// Anything left unset keeps its default; the client can still override
/// every value through `initializationOptions`.
#[derive(Args, Debug, Default)]
pub struct LspArgs {
    /// Linter executable
    #[arg(long)]
    linter: Option<String>,

    /// Argument passed to the linter before the file path (repeatable)
    #[arg(long = "linter-arg", value_name = "ARG", allow_hyphen_values = true)]
    linter_args: Vec<String>,

    /// Type-checker executable
    #[arg(long, conflicts_with = "no_type_checker")]
    type_checker: Option<String>,

    /// Run the linter only
    #[arg(long)]
    no_type_checker: bool,

    /// Directory for scratch files, removed on shutdown
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,
}

fn init_logging(log: Option<&PathBuf>) -> Result<()> {
    // stdout carries the protocol, so logs never go there
    let writer = match log {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            BoxMakeWriter::new(std::sync::Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nblint=info,nblint_core=info,nblint_lsp=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(log.is_none()),
        )
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log.as_ref())?;

    match cli.command {
        Commands::Lsp(args) => commands::lsp::execute(args),
    }
}
