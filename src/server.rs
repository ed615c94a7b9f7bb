//! Language server front end
//!
//! The editor is an LSP client. Open documents live in a [`DocumentStore`],
//! the focused one is tracked by the [`UpdateScheduler`], and finished
//! passes are pushed to the client as `funcloc/decorations` notifications.
//! The same labels are served as inlay hints for clients that do not
//! understand the custom notification.

use crate::config::{load_config, Config};
use crate::document::{Document, DocumentStore};
use crate::error::{FuncLocError, Result};
use crate::metrics::collect_metrics;
use crate::providers::{SymbolProvider, TreeSitterProvider};
use crate::render::{Decorations, DecorationsNotification, DecorationsParams, Label};
use crate::scheduler::{Measurement, PassOutcome, Pipeline, Trigger, UpdateScheduler};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::{Error as RpcError, Result as RpcResult};
use tower_lsp::lsp_types::{
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    ExecuteCommandOptions, ExecuteCommandParams, InitializeParams, InitializeResult,
    InitializedParams, InlayHint, InlayHintLabel, InlayHintParams, InlayHintTooltip, MessageType,
    OneOf, Range, ServerCapabilities, ServerInfo, TextDocumentSyncCapability,
    TextDocumentSyncKind, Url,
};
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, info, warn};

/// Command id for a manual recalculation.
pub const RECALCULATE_COMMAND: &str = "funcloc.recalculate";

/// Client → server notification sent when the focused editor changes.
pub const ACTIVE_EDITOR_METHOD: &str = "funcloc/didChangeActiveEditor";

/// Params of [`ACTIVE_EDITOR_METHOD`]. `uri: null` means no editor has focus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEditorParams {
    #[serde(default)]
    pub uri: Option<Url>,
}

/// Measures documents from the store and publishes to the client.
struct LspPipeline {
    client: Client,
    documents: DocumentStore,
    provider: Arc<dyn SymbolProvider>,
    config: RwLock<Config>,
    /// Labels of the last published pass per document, for inlay hints.
    published: DashMap<Url, Vec<Label>>,
    /// Client advertised `workspace.inlayHint.refreshSupport`.
    refresh_inlay_hints: AtomicBool,
}

#[async_trait]
impl Pipeline for LspPipeline {
    async fn measure(&self, uri: &Url) -> Result<Measurement> {
        let document = self
            .documents
            .get(uri)
            .ok_or(FuncLocError::NoActiveDocument)?;
        Ok(Measurement {
            version: document.version(),
            metrics: collect_metrics(self.provider.as_ref(), &document).await,
        })
    }

    async fn publish(&self, uri: &Url, measurement: Measurement) {
        let decorations = {
            let config = self.config.read().await;
            Decorations::from_metrics(&measurement.metrics, &config)
        };

        if decorations.is_clear() {
            self.published.remove(uri);
        } else {
            self.published
                .insert(uri.clone(), decorations.labels().to_vec());
        }

        self.client
            .send_notification::<DecorationsNotification>(DecorationsParams {
                uri: uri.clone(),
                version: measurement.version,
                decorations,
            })
            .await;

        if self.refresh_inlay_hints.load(Ordering::Relaxed) {
            if let Err(e) = self.client.inlay_hint_refresh().await {
                debug!("Client rejected inlay hint refresh: {}", e);
            }
        }
    }
}

pub struct Backend {
    pipeline: Arc<LspPipeline>,
    scheduler: UpdateScheduler,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self::with_provider(client, Arc::new(TreeSitterProvider::new()))
    }

    pub fn with_provider(client: Client, provider: Arc<dyn SymbolProvider>) -> Self {
        let pipeline = Arc::new(LspPipeline {
            client,
            documents: DocumentStore::new(),
            provider,
            config: RwLock::new(Config::default()),
            published: DashMap::new(),
            refresh_inlay_hints: AtomicBool::new(false),
        });
        let scheduler = UpdateScheduler::new(Arc::clone(&pipeline) as Arc<dyn Pipeline>);
        Self {
            pipeline,
            scheduler,
        }
    }

    fn client(&self) -> &Client {
        &self.pipeline.client
    }

    /// Handle `funcloc/didChangeActiveEditor`.
    pub async fn handle_active_editor(&self, params: ActiveEditorParams) {
        // Focus on a document we were never told about is the same as no focus
        let uri = params
            .uri
            .filter(|uri| self.pipeline.documents.get(uri).is_some());
        if uri == self.scheduler.active_document() {
            self.scheduler.schedule(Trigger::FocusChange);
        } else {
            self.scheduler.switch_document(uri);
        }
    }

    async fn recalculate(&self) -> Option<Value> {
        match self.scheduler.run_now().await {
            Ok(PassOutcome::Published { functions }) => {
                self.client()
                    .show_message(
                        MessageType::INFO,
                        format!("funcloc: measured {} functions", functions),
                    )
                    .await;
                Some(Value::from(functions))
            }
            Ok(PassOutcome::Superseded) => {
                self.client()
                    .show_message(
                        MessageType::INFO,
                        "funcloc: document changed during recalculation, retrying shortly",
                    )
                    .await;
                None
            }
            Err(FuncLocError::NoActiveDocument) => {
                self.client()
                    .show_message(MessageType::INFO, "funcloc: no active document")
                    .await;
                None
            }
            Err(e) => {
                warn!("Manual recalculation failed: {}", e);
                self.client()
                    .show_message(
                        MessageType::ERROR,
                        format!("funcloc: recalculation failed: {}", e),
                    )
                    .await;
                None
            }
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> RpcResult<InitializeResult> {
        info!("funcloc language server initializing");

        let mut config = workspace_root(&params)
            .map(|root| load_config(&root))
            .unwrap_or_default();
        if let Some(options) = params.initialization_options {
            match Config::from_json(options) {
                Ok(client_config) => config = client_config,
                Err(e) => warn!("Ignoring initializationOptions: {}", e),
            }
        }
        *self.pipeline.config.write().await = config;

        let refresh_support = params
            .capabilities
            .workspace
            .as_ref()
            .and_then(|workspace| workspace.inlay_hint.as_ref())
            .and_then(|inlay_hint| inlay_hint.refresh_support)
            .unwrap_or(false);
        self.pipeline
            .refresh_inlay_hints
            .store(refresh_support, Ordering::Relaxed);

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::INCREMENTAL,
                )),
                inlay_hint_provider: Some(OneOf::Left(true)),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: vec![RECALCULATE_COMMAND.to_string()],
                    ..Default::default()
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "funcloc".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("funcloc language server initialized");
    }

    async fn shutdown(&self) -> RpcResult<()> {
        info!("funcloc language server shutting down");
        self.scheduler.shutdown();
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        debug!("Opened {} (v{})", doc.uri, doc.version);
        self.pipeline
            .documents
            .open(Document::new(doc.uri.clone(), doc.version, doc.text));
        self.scheduler.switch_document(Some(doc.uri));
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        if self
            .pipeline
            .documents
            .change(&uri, &params.content_changes, version)
            .is_none()
        {
            warn!("Change for unopened document {}", uri);
            return;
        }
        if self.scheduler.active_document().as_ref() == Some(&uri) {
            self.scheduler.schedule(Trigger::Edit);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.pipeline.documents.close(&uri);
        self.pipeline.published.remove(&uri);
        if self.scheduler.active_document().as_ref() == Some(&uri) {
            self.scheduler.switch_document(None);
        }
    }

    async fn inlay_hint(&self, params: InlayHintParams) -> RpcResult<Option<Vec<InlayHint>>> {
        let Some(labels) = self.pipeline.published.get(&params.text_document.uri) else {
            return Ok(None);
        };
        Ok(Some(inlay_hints(&labels, params.range)))
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> RpcResult<Option<Value>> {
        if params.command != RECALCULATE_COMMAND {
            return Err(RpcError::invalid_params(format!(
                "unknown command '{}'",
                params.command
            )));
        }
        Ok(self.recalculate().await)
    }
}

#[allow(deprecated)]
fn workspace_root(params: &InitializeParams) -> Option<PathBuf> {
    params
        .workspace_folders
        .as_ref()
        .and_then(|folders| folders.first())
        .map(|folder| &folder.uri)
        .or(params.root_uri.as_ref())
        .and_then(|uri| uri.to_file_path().ok())
}

/// Inlay hints for labels whose anchor line falls inside `range`.
fn inlay_hints(labels: &[Label], range: Range) -> Vec<InlayHint> {
    labels
        .iter()
        .filter(|label| {
            let line = label.position.line;
            line >= range.start.line && line <= range.end.line
        })
        .map(|label| InlayHint {
            position: label.position.into(),
            label: InlayHintLabel::String(label.text.clone()),
            kind: None,
            text_edits: None,
            tooltip: Some(InlayHintTooltip::String(format!(
                "{} LOC ({} tier)",
                label.loc, label.category
            ))),
            padding_left: Some(true),
            padding_right: None,
            data: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Position};
    use futures::StreamExt;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tower::{Service, ServiceExt};
    use tower_lsp::jsonrpc::{self, Request};
    use tower_lsp::{lsp_types, LspService};

    const TWO_FUNCTIONS: &str = "fn one() {\n    1;\n}\n\nfn two() {\n    2;\n}\n";
    const WAIT: Duration = Duration::from_secs(5);

    /// Drives a [`Backend`] through its tower service and collects
    /// everything the server sends to the client.
    struct TestClient {
        service: LspService<Backend>,
        outgoing: mpsc::UnboundedReceiver<Request>,
        next_id: i64,
    }

    impl TestClient {
        async fn start() -> Self {
            let (service, socket) = LspService::build(Backend::new)
                .custom_method(ACTIVE_EDITOR_METHOD, Backend::handle_active_editor)
                .finish();
            let (tx, outgoing) = mpsc::unbounded_channel();
            tokio::spawn(async move {
                let mut socket = Box::pin(socket);
                while let Some(message) = socket.next().await {
                    if tx.send(message).is_err() {
                        break;
                    }
                }
            });

            let mut client = Self {
                service,
                outgoing,
                next_id: 0,
            };
            client
                .request("initialize", json!({ "capabilities": {} }))
                .await
                .unwrap();
            client.notify("initialized", json!({})).await;
            client
        }

        async fn request(&mut self, method: &'static str, params: Value) -> jsonrpc::Result<Value> {
            self.next_id += 1;
            let request = Request::build(method)
                .params(params)
                .id(self.next_id)
                .finish();
            let response = self
                .service
                .ready()
                .await
                .unwrap()
                .call(request)
                .await
                .unwrap()
                .expect("requests get a response");
            response.into_parts().1
        }

        async fn notify(&mut self, method: &'static str, params: Value) {
            let request = Request::build(method).params(params).finish();
            let response = self
                .service
                .ready()
                .await
                .unwrap()
                .call(request)
                .await
                .unwrap();
            assert!(response.is_none());
        }

        async fn open(&mut self, uri: &str, text: &str) {
            self.notify(
                "textDocument/didOpen",
                json!({
                    "textDocument": {
                        "uri": uri,
                        "languageId": "",
                        "version": 1,
                        "text": text,
                    }
                }),
            )
            .await;
        }

        async fn recalculate(&mut self) -> jsonrpc::Result<Value> {
            self.request(
                "workspace/executeCommand",
                json!({ "command": RECALCULATE_COMMAND, "arguments": [] }),
            )
            .await
        }

        /// Params of the next server message named `method`, skipping others.
        async fn next(&mut self, method: &str, wait: Duration) -> Option<Value> {
            let outgoing = &mut self.outgoing;
            tokio::time::timeout(wait, async {
                while let Some(message) = outgoing.recv().await {
                    if message.method() == method {
                        return message.params().cloned();
                    }
                }
                None
            })
            .await
            .ok()
            .flatten()
        }

        async fn next_decorations(&mut self) -> DecorationsParams {
            let params = self
                .next("funcloc/decorations", WAIT)
                .await
                .expect("decorations are published");
            serde_json::from_value(params).unwrap()
        }

        async fn next_message(&mut self) -> String {
            let params = self
                .next("window/showMessage", WAIT)
                .await
                .expect("a message is shown");
            params["message"].as_str().unwrap().to_string()
        }
    }

    fn label(line: u32, loc: u32) -> Label {
        Label {
            position: Position::new(line, 20),
            text: format!("{} LOC", loc),
            color: "#4caf50".to_string(),
            category: Category::Low,
            loc,
        }
    }

    #[test]
    fn test_inlay_hints_limited_to_requested_lines() {
        let labels = [label(2, 4), label(10, 7), label(40, 3)];
        let range = lsp_types::Range::new(
            lsp_types::Position::new(0, 0),
            lsp_types::Position::new(10, 0),
        );
        let hints = inlay_hints(&labels, range);
        assert_eq!(hints.len(), 2);
        assert_eq!(hints[1].position, lsp_types::Position::new(10, 20));
        assert!(matches!(&hints[0].label, InlayHintLabel::String(s) if s == "4 LOC"));
    }

    #[test]
    fn test_active_editor_params() {
        let params: ActiveEditorParams =
            serde_json::from_value(serde_json::json!({ "uri": "file:///tmp/a.rs" })).unwrap();
        assert_eq!(params.uri.unwrap().path(), "/tmp/a.rs");

        let params: ActiveEditorParams =
            serde_json::from_value(serde_json::json!({ "uri": null })).unwrap();
        assert!(params.uri.is_none());
        let params: ActiveEditorParams = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(params.uri.is_none());
    }

    #[test]
    #[allow(deprecated)]
    fn test_workspace_root_prefers_folders() {
        let mut params = InitializeParams {
            root_uri: Some(Url::parse("file:///srv/root").unwrap()),
            ..Default::default()
        };
        assert_eq!(workspace_root(&params), Some(PathBuf::from("/srv/root")));

        params.workspace_folders = Some(vec![lsp_types::WorkspaceFolder {
            uri: Url::parse("file:///srv/folder").unwrap(),
            name: "folder".to_string(),
        }]);
        assert_eq!(workspace_root(&params), Some(PathBuf::from("/srv/folder")));
    }

    #[tokio::test]
    async fn test_open_document_publishes_measured_version() {
        let mut client = TestClient::start().await;
        client.open("file:///tmp/lib.rs", TWO_FUNCTIONS).await;

        let published = client.next_decorations().await;
        assert_eq!(published.uri.path(), "/tmp/lib.rs");
        assert_eq!(published.version, 1);
        match published.decorations {
            Decorations::Paint { highlights, labels } => {
                assert_eq!(labels.len(), 2);
                assert_eq!(highlights.low.len(), 2);
                assert_eq!(labels[0].text, "2 LOC");
            }
            Decorations::Clear => panic!("expected paint"),
        }
    }

    #[tokio::test]
    async fn test_edit_publishes_edited_version() {
        let mut client = TestClient::start().await;
        client.open("file:///tmp/lib.rs", TWO_FUNCTIONS).await;
        assert_eq!(client.next_decorations().await.version, 1);

        client
            .notify(
                "textDocument/didChange",
                json!({
                    "textDocument": { "uri": "file:///tmp/lib.rs", "version": 2 },
                    "contentChanges": [{ "text": "fn only() {\n    0;\n}\n" }],
                }),
            )
            .await;

        let published = client.next_decorations().await;
        assert_eq!(published.version, 2);
        assert!(
            matches!(published.decorations, Decorations::Paint { ref labels, .. } if labels.len() == 1)
        );
    }

    #[tokio::test]
    async fn test_unsupported_document_publishes_clear() {
        let mut client = TestClient::start().await;
        client.open("file:///tmp/notes.txt", "just some notes\n").await;

        let published = client
            .next("funcloc/decorations", WAIT)
            .await
            .expect("decorations are published");
        assert_eq!(published["decorations"], json!({ "kind": "clear" }));
        assert_eq!(published["uri"], "file:///tmp/notes.txt");
    }

    #[tokio::test]
    async fn test_recalculate_without_active_document() {
        let mut client = TestClient::start().await;

        assert_eq!(client.recalculate().await.unwrap(), Value::Null);
        assert!(client.next_message().await.contains("no active document"));
    }

    #[tokio::test]
    async fn test_recalculate_reports_function_count() {
        let mut client = TestClient::start().await;
        client.open("file:///tmp/lib.rs", TWO_FUNCTIONS).await;

        assert_eq!(client.recalculate().await.unwrap(), json!(2));
        // The pass publishes before the command reports back
        assert_eq!(client.next_decorations().await.version, 1);
        assert_eq!(client.next_message().await, "funcloc: measured 2 functions");
    }

    #[tokio::test]
    async fn test_unknown_command_is_rejected() {
        let mut client = TestClient::start().await;

        let error = client
            .request(
                "workspace/executeCommand",
                json!({ "command": "funcloc.nope", "arguments": [] }),
            )
            .await
            .unwrap_err();
        assert_eq!(error.code, jsonrpc::ErrorCode::InvalidParams);
        assert!(error.message.contains("funcloc.nope"));
    }

    #[tokio::test]
    async fn test_close_active_document_drops_pending_pass() {
        let mut client = TestClient::start().await;
        client.open("file:///tmp/lib.rs", TWO_FUNCTIONS).await;
        client
            .notify(
                "textDocument/didClose",
                json!({ "textDocument": { "uri": "file:///tmp/lib.rs" } }),
            )
            .await;

        let late = client
            .next("funcloc/decorations", Duration::from_millis(600))
            .await;
        assert!(late.is_none(), "closed document was published: {:?}", late);
        assert_eq!(client.recalculate().await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_active_editor_switch_and_refocus() {
        let mut client = TestClient::start().await;
        client.open("file:///tmp/a.rs", "fn a() {\n}\n").await;
        client.open("file:///tmp/b.rs", TWO_FUNCTIONS).await;

        // Opening b replaced a before a's timer fired
        assert_eq!(client.next_decorations().await.uri.path(), "/tmp/b.rs");

        client
            .notify(ACTIVE_EDITOR_METHOD, json!({ "uri": "file:///tmp/a.rs" }))
            .await;
        assert_eq!(client.next_decorations().await.uri.path(), "/tmp/a.rs");

        // Refocusing the active document measures it again
        client
            .notify(ACTIVE_EDITOR_METHOD, json!({ "uri": "file:///tmp/a.rs" }))
            .await;
        assert_eq!(client.next_decorations().await.uri.path(), "/tmp/a.rs");

        // Focus on a document never opened means no active document
        client
            .notify(ACTIVE_EDITOR_METHOD, json!({ "uri": "file:///tmp/other.rs" }))
            .await;
        assert_eq!(client.recalculate().await.unwrap(), Value::Null);
        assert!(client.next_message().await.contains("no active document"));
    }
}
