use anyhow::Result;
use tokio::io::{stdin, stdout};
use tower_lsp::{LspService, Server};

use crate::Config;
use crate::lsp::backend::Backend;

/// Start the LSP server
pub async fn serve() -> Result<()> {
    let config = Config::from_args_and_env()?;

    // stdout carries the protocol; logs go to stderr.
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    for source in &config.sources {
        log::info!("applied settings {}", source.display());
    }

    let (service, socket) =
        LspService::build(move |client| Backend::new(client, config.clone())).finish();

    Server::new(stdin(), stdout(), socket).serve(service).await;

    Ok(())
}
