use std::sync::Arc;

use tokio::sync::Mutex;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::Config;
use crate::config::Settings;
use crate::lsp::handlers::{HandleDocumentSync, HandleWorkspace};
use crate::sync::SyncEngine;

/// The main LSP backend that holds state and implements the Language Server Protocol
pub struct Backend {
    pub client: Client,
    pub config: Arc<Mutex<Config>>,
    /// Workspace root announced by the client in `initialize`
    pub workspace: Arc<Mutex<Option<Url>>>,
    /// Sole owner of the package set. Every lifecycle event holds this lock
    /// for its whole handler, sweep included, so events never interleave.
    pub engine: Arc<Mutex<Option<SyncEngine>>>,
}

impl Backend {
    pub fn new(client: Client, config: Config) -> Self {
        Self {
            client,
            config: Arc::new(Mutex::new(config)),
            workspace: Arc::new(Mutex::new(None)),
            engine: Arc::new(Mutex::new(None)),
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(
        &self,
        params: InitializeParams,
    ) -> tower_lsp::jsonrpc::Result<InitializeResult> {
        #[allow(deprecated)]
        let root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .map(|folder| folder.uri.clone())
            .or(params.root_uri);

        match &root {
            Some(uri) => log::info!("workspace root: {}", uri),
            None => log::warn!("no workspace root provided by client"),
        }
        *self.workspace.lock().await = root;

        if let Some(options) = params.initialization_options {
            match Settings::from_json(options) {
                Ok(settings) => self.config.lock().await.apply_client_options(settings),
                Err(e) => log::warn!("ignoring initialization options: {:#}", e),
            }
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "gunkls".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        // Must claim the engine lock before any later notification is polled.
        self.load_workspace().await;

        self.client
            .log_message(MessageType::INFO, "gunkls initialized")
            .await;
    }

    async fn shutdown(&self) -> tower_lsp::jsonrpc::Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.handle_did_open(params).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        self.handle_did_change(params).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.handle_did_close(params).await;
    }
}
