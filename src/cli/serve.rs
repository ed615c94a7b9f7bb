//! Language server command handler

use crate::server::{Backend, ACTIVE_EDITOR_METHOD};
use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tower_lsp::{LspService, Server};
use tracing::info;

/// Run the language server on stdin/stdout until the client exits
pub fn run() -> Result<()> {
    let rt = Runtime::new().context("Failed to create tokio runtime")?;

    rt.block_on(async {
        let (service, socket) = LspService::build(Backend::new)
            .custom_method(ACTIVE_EDITOR_METHOD, Backend::handle_active_editor)
            .finish();

        Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
            .serve(service)
            .await;
    });

    info!("funcloc language server exited");
    Ok(())
}
