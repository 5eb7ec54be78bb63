//! LSP backend wiring the suggestion pipeline to an editor client
//!
//! Document state is tracked from the text synchronization notifications so
//! the pipeline can feed unsaved edits to gocode over stdin. The pipeline is
//! rebuilt during `initialize` once the client's configuration is known.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    CompletionOptions, CompletionParams, CompletionResponse, CompletionTriggerKind,
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    InitializeParams, InitializeResult, InitializedParams, MessageType, ServerCapabilities,
    TextDocumentSyncCapability, TextDocumentSyncKind, Url,
};
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, info};

use crate::config::ProviderConfig;
use crate::document::DocumentState;
use crate::gocode::{PathLocator, TokioExecutor};
use crate::notify::ClientNotifier;
use crate::packages::GopathPackageIndex;
use crate::suggest::SuggestionPipeline;

pub struct Backend {
    client: Client,
    documents: RwLock<HashMap<Url, DocumentState>>,
    pipeline: RwLock<Arc<SuggestionPipeline>>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        let pipeline = Self::build_pipeline(client.clone(), ProviderConfig::default());
        Backend {
            client,
            documents: RwLock::new(HashMap::new()),
            pipeline: RwLock::new(pipeline),
        }
    }

    fn build_pipeline(client: Client, config: ProviderConfig) -> Arc<SuggestionPipeline> {
        Arc::new(SuggestionPipeline::new(
            config,
            Arc::new(PathLocator),
            Arc::new(TokioExecutor),
            Arc::new(GopathPackageIndex::new()),
            Arc::new(ClientNotifier::new(client)),
        ))
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let config = ProviderConfig::from_init_options(params.initialization_options.as_ref());
        debug!("provider configuration: {:?}", config);
        *self.pipeline.write().await = Self::build_pipeline(self.client.clone(), config);

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::INCREMENTAL,
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![".".to_string()]),
                    ..Default::default()
                }),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("gocode-language-server initialized");
        self.client
            .log_message(MessageType::INFO, "gocode-language-server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri.clone();
        let document = DocumentState::new(
            uri.clone(),
            &params.text_document.text,
            params.text_document.version,
        );
        self.documents.write().await.insert(uri, document);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        let mut documents = self.documents.write().await;
        match documents.get_mut(&uri) {
            Some(document) => document.apply(params.content_changes, version),
            None => {
                // Change for a document we never saw opened; rebuild from the
                // last full-text change if there is one.
                if let Some(full) = params
                    .content_changes
                    .iter()
                    .rev()
                    .find(|c| c.range.is_none())
                {
                    documents.insert(uri.clone(), DocumentState::new(uri, &full.text, version));
                }
            }
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents
            .write()
            .await
            .remove(&params.text_document.uri);
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        debug!("completion request at {}:{:?}", uri, position);

        let document = {
            let documents = self.documents.read().await;
            match documents.get(&uri) {
                Some(document) => document.clone(),
                None => {
                    debug!("document not found: {}", uri);
                    return Ok(None);
                }
            }
        };

        let activated_manually = params
            .context
            .map(|c| c.trigger_kind == CompletionTriggerKind::INVOKED)
            .unwrap_or(false);

        let pipeline = self.pipeline.read().await.clone();
        let suggestions = pipeline
            .suggestions(&document, position, activated_manually)
            .await;
        if suggestions.is_empty() {
            return Ok(None);
        }

        Ok(Some(CompletionResponse::Array(
            suggestions.iter().map(|s| s.to_completion_item()).collect(),
        )))
    }
}
