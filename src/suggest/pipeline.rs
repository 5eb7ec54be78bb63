//! The suggestion pipeline
//!
//! Orchestrates one completion request end to end:
//!
//! 1. Suppression pre-check against scope descriptors and the character
//!    before the cursor (import-path contexts always stay active).
//! 2. Decide between refiltering the cached result set and a fresh query.
//! 3. Fresh query: resolve the tool, invoke it with the buffer on stdin and
//!    the cursor as a UTF-8 byte offset, decode candidates.
//! 4. On an empty result after the member-access trigger, resolve an import
//!    for the referenced package and retry the query once.
//! 5. Map candidates to suggestions and replace the cache atomically.
//!
//! There is no cancellation: a newer request does not cancel an older one,
//! and whichever resolves last wins the shared cache. A failed or timed-out
//! invocation is treated identically to a clean empty result.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tower_lsp::lsp_types::Position;
use tracing::{debug, error, warn};

use crate::config::{IMPORT_SCOPE, ProviderConfig};
use crate::document::DocumentState;
use crate::gocode::{
    CompletionResponse, ProtocolError, RawCandidate, ToolExecutor, ToolLocator, parse_response,
};
use crate::notify::Notifier;
use crate::suggest::import_resolver::{self, PackageIndex};
use crate::suggest::matcher;
use crate::suggest::suggestion::Suggestion;

/// Name of the external signature-introspection tool.
const TOOL_NAME: &str = "gocode";

/// The member-access trigger character.
const MEMBER_TRIGGER: &str = ".";

/// One completion provider instance. Owns the suggestion cache and the
/// one-shot degraded-tool flag; both live until the provider is torn down.
pub struct SuggestionPipeline {
    config: ProviderConfig,
    locator: Arc<dyn ToolLocator>,
    executor: Arc<dyn ToolExecutor>,
    packages: Arc<dyn PackageIndex>,
    notifier: Arc<dyn Notifier>,

    /// Last-returned suggestions, replaced wholesale on every fresh query and
    /// read by the refilter path. Last write wins.
    cached: RwLock<Arc<Vec<Suggestion>>>,

    /// Set once when gocode first returns the PANIC sentinel; gates a single
    /// user-facing warning per provider lifetime.
    tool_degraded: AtomicBool,
}

impl SuggestionPipeline {
    pub fn new(
        config: ProviderConfig,
        locator: Arc<dyn ToolLocator>,
        executor: Arc<dyn ToolExecutor>,
        packages: Arc<dyn PackageIndex>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        SuggestionPipeline {
            config,
            locator,
            executor,
            packages,
            notifier,
            cached: RwLock::new(Arc::new(Vec::new())),
            tool_degraded: AtomicBool::new(false),
        }
    }

    /// Run one completion request.
    pub async fn suggestions(
        &self,
        doc: &DocumentState,
        position: Position,
        activated_manually: bool,
    ) -> Vec<Suggestion> {
        let scopes = doc.scopes(position);
        if self.is_suppressed(doc, position, &scopes) {
            debug!("completion suppressed at {:?} (scopes {:?})", position, scopes);
            return Vec::new();
        }

        let prefix = doc.prefix(position);
        if prefix.is_empty() && !activated_manually {
            return Vec::new();
        }

        if !prefix.is_empty() && prefix != MEMBER_TRIGGER {
            let cached = self.cached.read().clone();
            if !cached.is_empty() {
                debug!("refiltering {} cached suggestions for '{}'", cached.len(), prefix);
                return matcher::refilter(&cached, &prefix);
            }
        }

        self.query(doc, position, &prefix).await
    }

    /// The current suggestion cache.
    pub fn cached_suggestions(&self) -> Arc<Vec<Suggestion>> {
        self.cached.read().clone()
    }

    /// A completion request is discarded when the character before the cursor
    /// or the active scopes are in the configured block-lists; an
    /// import-identifier context always overrides suppression, so strings
    /// that are actually import paths stay active.
    fn is_suppressed(&self, doc: &DocumentState, position: Position, scopes: &[String]) -> bool {
        if scopes.iter().any(|s| s == IMPORT_SCOPE) {
            return false;
        }

        if let Some(c) = doc.char_before(position) {
            if self.config.suppressed_characters.contains(&c) {
                return true;
            }
        }

        self.config
            .suppressed_scopes
            .iter()
            .any(|suppressed| scopes.iter().any(|s| s.starts_with(suppressed.as_str())))
    }

    async fn query(&self, doc: &DocumentState, position: Position, prefix: &str) -> Vec<Suggestion> {
        let Some(tool) = self.locator.locate(TOOL_NAME).await else {
            debug!("{} could not be resolved, resolving empty", TOOL_NAME);
            return Vec::new();
        };
        let Some(file_path) = doc.file_path() else {
            debug!("document {} has no filesystem path", doc.uri);
            return Vec::new();
        };

        let offset = doc.byte_offset(position);
        let text = doc.text.to_string();
        let mut response = self.invoke(&tool, &file_path, offset, &text).await;

        // Member-access completion on an unimported package: patch an import
        // into a buffer copy and retry once.
        if response.candidates.is_empty()
            && prefix == MEMBER_TRIGGER
            && self.config.unimported_packages
        {
            if let Some(package) = doc.ident_before_dot(position) {
                if let Some(patched) =
                    import_resolver::resolve(self.packages.as_ref(), &text, offset, &package).await
                {
                    response = self
                        .invoke(&tool, &file_path, patched.offset, &patched.text)
                        .await;
                }
            }
        }

        let replacement = self.replacement_prefix(doc, position, response.prefix_length, prefix);
        self.resolve_candidates(response.candidates, &replacement).await
    }

    /// One tool invocation. Invocation errors and non-empty stderr are
    /// logged; only malformed stdout surfaces a user-visible error.
    async fn invoke(
        &self,
        tool: &Path,
        file_path: &Path,
        offset: usize,
        text: &str,
    ) -> CompletionResponse {
        let mut args: Vec<String> = Vec::with_capacity(5);
        if self.config.propose_builtins {
            args.push("-builtin".to_string());
        }
        args.push("-f=json".to_string());
        args.push("autocomplete".to_string());
        args.push(file_path.display().to_string());
        args.push(offset.to_string());

        let output = match self.executor.execute(tool, &args, &[], text).await {
            Ok(output) => output,
            Err(e) => {
                warn!("{}", ProtocolError::Invocation(e));
                return CompletionResponse::default();
            }
        };

        if !output.stderr.trim().is_empty() {
            warn!("{} stderr: {}", TOOL_NAME, output.stderr.trim());
        }

        match parse_response(&output.stdout) {
            Ok(response) => response,
            Err(e) => {
                error!("{}", e);
                self.notifier
                    .error(&format!("Failed to decode {TOOL_NAME} output: {e}"))
                    .await;
                CompletionResponse::default()
            }
        }
    }

    /// Map raw candidates into suggestions and replace the cache atomically.
    /// The PANIC sentinel maps to nothing but triggers the one-shot
    /// degraded-tool warning the first time it is seen.
    async fn resolve_candidates(
        &self,
        candidates: Vec<RawCandidate>,
        replacement_prefix: &str,
    ) -> Vec<Suggestion> {
        if candidates.first().is_some_and(RawCandidate::is_panic)
            && !self.tool_degraded.swap(true, Ordering::SeqCst)
        {
            warn!("{} returned the PANIC sentinel", TOOL_NAME);
            self.notifier
                .warn_degraded_tool("it returned the PANIC sentinel")
                .await;
        }

        let suggestions: Vec<Suggestion> = candidates
            .iter()
            .filter_map(|c| {
                Suggestion::from_candidate(c, self.config.snippet_mode, replacement_prefix)
            })
            .collect();

        *self.cached.write() = Arc::new(suggestions.clone());
        suggestions
    }

    /// Buffer text the candidates replace: the `prefix_length` bytes gocode
    /// reports, falling back to the typed prefix when that span is not valid
    /// UTF-8 in the buffer. The bare trigger replaces nothing.
    fn replacement_prefix(
        &self,
        doc: &DocumentState,
        position: Position,
        prefix_length: usize,
        prefix: &str,
    ) -> String {
        if prefix == MEMBER_TRIGGER {
            return String::new();
        }
        if prefix_length == 0 {
            return prefix.to_string();
        }
        let end = doc.byte_offset(position);
        let start = end.saturating_sub(prefix_length);
        doc.text
            .get_byte_slice(start..end)
            .map(|s| s.to_string())
            .unwrap_or_else(|| prefix.to_string())
    }
}
