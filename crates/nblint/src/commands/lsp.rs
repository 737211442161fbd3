//! LSP server command implementation.

use anyhow::Result;
use nblint_core::Config;

use crate::LspArgs;

/// Layer command-line flags over the default configuration.
fn config_from_args(args: LspArgs) -> Config {
    let mut config = Config::default();
    if let Some(linter) = args.linter {
        config.linter = linter;
    }
    if !args.linter_args.is_empty() {
        config.linter_args = args.linter_args;
    }
    if args.no_type_checker {
        config.type_checker = None;
    } else if let Some(type_checker) = args.type_checker {
        config.type_checker = Some(type_checker);
    }
    if let Some(cache_dir) = args.cache_dir {
        config.cache_dir = cache_dir;
    }
    config
}

/// Execute the LSP server.
///
/// This starts the nblint language server, communicating over stdio with
/// JSON-RPC messages.
pub fn execute(args: LspArgs) -> Result<()> {
    let config = config_from_args(args);
    tracing::info!(
        linter = %config.linter,
        type_checker = ?config.type_checker,
        cache_dir = %config.cache_dir.display(),
        "starting language server"
    );

    // Create a new tokio runtime for the LSP server
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async {
        nblint_lsp::run_server(config).await;
    });

    Ok(())
}
