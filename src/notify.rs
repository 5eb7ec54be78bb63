//! User-facing notification surface
//!
//! The pipeline reports degraded-tool and malformed-output conditions through
//! [`Notifier`] so the rendering (and the editor client) stays external. The
//! one-shot gating for the degraded-tool warning lives in the pipeline, not
//! here.

use tower_lsp::Client;
use tower_lsp::lsp_types::MessageType;

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Dismissible warning that the tool is misbehaving, with remediation
    /// guidance. Fired at most once per provider lifetime.
    async fn warn_degraded_tool(&self, detail: &str);

    /// Error notification for malformed tool output. May repeat.
    async fn error(&self, message: &str);
}

/// Notifier forwarding to the LSP client via `window/showMessage`.
pub struct ClientNotifier {
    client: Client,
}

impl ClientNotifier {
    pub fn new(client: Client) -> Self {
        ClientNotifier { client }
    }
}

#[async_trait::async_trait]
impl Notifier for ClientNotifier {
    async fn warn_degraded_tool(&self, detail: &str) {
        self.client
            .show_message(
                MessageType::WARNING,
                format!(
                    "gocode is returning panics and completions are degraded ({detail}). \
                     Restarting it usually helps: run `gocode close` or rebuild gocode \
                     against your current Go version."
                ),
            )
            .await;
    }

    async fn error(&self, message: &str) {
        self.client.show_message(MessageType::ERROR, message.to_string()).await;
    }
}
