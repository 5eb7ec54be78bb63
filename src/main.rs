use clap::Parser;
use tower_lsp::{LspService, Server};
use tracing::info;

use gocode_language_server::logging::init_logger;
use gocode_language_server::lsp::Backend;

/// Language server providing Go code completion backed by gocode.
#[derive(Debug, Parser)]
#[command(name = "gocode-language-server", version)]
struct Args {
    /// Log level for stderr output (overrides RUST_LOG).
    #[arg(long)]
    log_level: Option<String>,

    /// Disable ANSI colors in stderr output.
    #[arg(long)]
    no_color: bool,

    /// Disable session file logging in the cache directory.
    #[arg(long)]
    no_file_log: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _guard = init_logger(args.no_color, args.log_level.as_deref(), !args.no_file_log)?;

    info!("starting gocode-language-server on stdio");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();
    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}
