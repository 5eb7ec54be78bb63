//! End-to-end tests for the suggestion pipeline with mock collaborators:
//! scripted tool executor, fixed tool locator and package index, and a
//! recording notifier.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tower_lsp::lsp_types::{Position, Url};

use gocode_language_server::config::ProviderConfig;
use gocode_language_server::document::DocumentState;
use gocode_language_server::gocode::{ToolExecutor, ToolLocator, ToolOutput};
use gocode_language_server::notify::Notifier;
use gocode_language_server::suggest::SuggestionPipeline;
use gocode_language_server::suggest::import_resolver::PackageIndex;

struct StaticLocator(Option<PathBuf>);

#[async_trait::async_trait]
impl ToolLocator for StaticLocator {
    async fn locate(&self, _name: &str) -> Option<PathBuf> {
        self.0.clone()
    }
}

/// Executor returning scripted stdout payloads in order, recording every
/// invocation's arguments and stdin.
#[derive(Default)]
struct ScriptedExecutor {
    responses: Mutex<Vec<ToolOutput>>,
    calls: Mutex<Vec<(Vec<String>, String)>>,
}

impl ScriptedExecutor {
    fn with_stdout(payloads: &[&str]) -> Arc<Self> {
        let responses = payloads
            .iter()
            .map(|stdout| ToolOutput {
                exit_code: Some(0),
                stdout: stdout.to_string(),
                stderr: String::new(),
            })
            .collect();
        Arc::new(ScriptedExecutor {
            responses: Mutex::new(responses),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn call_args(&self, index: usize) -> Vec<String> {
        self.calls.lock()[index].0.clone()
    }
}

#[async_trait::async_trait]
impl ToolExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        _program: &Path,
        args: &[String],
        _env: &[(String, String)],
        stdin: &str,
    ) -> io::Result<ToolOutput> {
        self.calls.lock().push((args.to_vec(), stdin.to_string()));
        let mut responses = self.responses.lock();
        if responses.is_empty() {
            Ok(ToolOutput::default())
        } else {
            Ok(responses.remove(0))
        }
    }
}

struct StaticIndex(HashMap<String, Vec<String>>);

impl StaticIndex {
    fn with(entries: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(StaticIndex(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), vec![v.to_string()]))
                .collect(),
        ))
    }
}

#[async_trait::async_trait]
impl PackageIndex for StaticIndex {
    async fn all_packages(&self) -> HashMap<String, Vec<String>> {
        self.0.clone()
    }

    async fn is_vendor_supported(&self) -> bool {
        false
    }
}

#[derive(Default)]
struct RecordingNotifier {
    warnings: AtomicUsize,
    errors: AtomicUsize,
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn warn_degraded_tool(&self, _detail: &str) {
        self.warnings.fetch_add(1, Ordering::SeqCst);
    }

    async fn error(&self, _message: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }
}

fn doc(text: &str) -> DocumentState {
    let uri = Url::from_file_path("/tmp/main.go").expect("file uri");
    DocumentState::new(uri, text, 1)
}

fn pos(line: u32, character: u32) -> Position {
    Position { line, character }
}

fn pipeline(
    config: ProviderConfig,
    executor: Arc<ScriptedExecutor>,
    index: Arc<StaticIndex>,
    notifier: Arc<RecordingNotifier>,
) -> SuggestionPipeline {
    SuggestionPipeline::new(
        config,
        Arc::new(StaticLocator(Some(PathBuf::from("/usr/bin/gocode")))),
        executor,
        index,
        notifier,
    )
}

const MEMBER_QUERY: &str = "package main\n\nfunc main() {\n\tfmt.\n}\n";

const FMT_RESPONSE: &str = r#"[0, [
    {"class": "func", "name": "Println", "type": "func(a ...interface{}) (n int, err error)"},
    {"class": "func", "name": "Printf", "type": "func(format string, a ...interface{}) (n int, err error)"},
    {"class": "var", "name": "Stdout", "type": "*File"}
]]"#;

const PANIC_RESPONSE: &str = r#"[0, [{"class": "PANIC", "name": "PANIC", "type": "PANIC"}]]"#;

#[tokio::test]
async fn member_access_query_maps_candidates() {
    let executor = ScriptedExecutor::with_stdout(&[FMT_RESPONSE]);
    let p = pipeline(
        ProviderConfig::default(),
        executor.clone(),
        StaticIndex::with(&[]),
        Arc::new(RecordingNotifier::default()),
    );

    let suggestions = p.suggestions(&doc(MEMBER_QUERY), pos(3, 5), false).await;
    assert_eq!(executor.call_count(), 1);
    assert_eq!(suggestions.len(), 3);
    assert_eq!(suggestions[0].fuzzy_key, "Println");
    assert_eq!(suggestions[0].snippet.as_deref(), Some("Println()$0"));
    assert_eq!(suggestions[2].text.as_deref(), Some("Stdout"));

    // The query's byte offset is the fourth positional argument.
    let args = executor.call_args(0);
    assert_eq!(args[0], "-f=json");
    assert_eq!(args[1], "autocomplete");
    assert_eq!(args[3], MEMBER_QUERY.find("fmt.").map(|i| i + 4).expect("offset").to_string());
}

#[tokio::test]
async fn nonempty_prefix_with_cache_refilters_without_invoking_the_tool() {
    let executor = ScriptedExecutor::with_stdout(&[FMT_RESPONSE]);
    let p = pipeline(
        ProviderConfig::default(),
        executor.clone(),
        StaticIndex::with(&[]),
        Arc::new(RecordingNotifier::default()),
    );

    // Seed the cache with a fresh member-access query.
    p.suggestions(&doc(MEMBER_QUERY), pos(3, 5), false).await;
    assert_eq!(executor.call_count(), 1);

    // Typing continues; the prior result set is refiltered locally.
    let continued = "package main\n\nfunc main() {\n\tfmt.Pr\n}\n";
    let refiltered = p.suggestions(&doc(continued), pos(3, 7), false).await;
    assert_eq!(executor.call_count(), 1);
    assert!(refiltered.iter().any(|s| s.fuzzy_key == "Println"));
    assert!(!refiltered.iter().any(|s| s.fuzzy_key == "Stdout"));
    assert!(refiltered.iter().all(|s| s.replacement_prefix == "Pr"));
}

#[tokio::test]
async fn nonempty_prefix_without_cache_queries_the_tool() {
    let executor = ScriptedExecutor::with_stdout(&[FMT_RESPONSE]);
    let p = pipeline(
        ProviderConfig::default(),
        executor.clone(),
        StaticIndex::with(&[]),
        Arc::new(RecordingNotifier::default()),
    );

    let text = "package main\n\nfunc main() {\n\tfmt.Pr\n}\n";
    p.suggestions(&doc(text), pos(3, 7), false).await;
    assert_eq!(executor.call_count(), 1);
}

#[tokio::test]
async fn empty_prefix_without_manual_activation_resolves_empty() {
    let executor = ScriptedExecutor::with_stdout(&[FMT_RESPONSE]);
    let p = pipeline(
        ProviderConfig::default(),
        executor.clone(),
        StaticIndex::with(&[]),
        Arc::new(RecordingNotifier::default()),
    );

    let text = "package main\n\nfunc main() {\n\n}\n";
    let suggestions = p.suggestions(&doc(text), pos(3, 0), false).await;
    assert!(suggestions.is_empty());
    assert_eq!(executor.call_count(), 0);
}

#[tokio::test]
async fn unresolvable_tool_resolves_empty() {
    let executor = ScriptedExecutor::with_stdout(&[FMT_RESPONSE]);
    let p = SuggestionPipeline::new(
        ProviderConfig::default(),
        Arc::new(StaticLocator(None)),
        executor.clone(),
        StaticIndex::with(&[]),
        Arc::new(RecordingNotifier::default()),
    );

    let suggestions = p.suggestions(&doc(MEMBER_QUERY), pos(3, 5), false).await;
    assert!(suggestions.is_empty());
    assert_eq!(executor.call_count(), 0);
}

#[tokio::test]
async fn panic_sentinel_warns_exactly_once() {
    let executor = ScriptedExecutor::with_stdout(&[PANIC_RESPONSE, PANIC_RESPONSE]);
    let notifier = Arc::new(RecordingNotifier::default());
    let p = pipeline(
        ProviderConfig::default(),
        executor.clone(),
        StaticIndex::with(&[]),
        notifier.clone(),
    );

    let first = p.suggestions(&doc(MEMBER_QUERY), pos(3, 5), false).await;
    let second = p.suggestions(&doc(MEMBER_QUERY), pos(3, 5), false).await;
    assert!(first.is_empty());
    assert!(second.is_empty());
    assert_eq!(executor.call_count(), 2);
    assert_eq!(notifier.warnings.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn malformed_output_notifies_per_occurrence() {
    let executor = ScriptedExecutor::with_stdout(&["gocode: panic", "also not json"]);
    let notifier = Arc::new(RecordingNotifier::default());
    let p = pipeline(
        ProviderConfig::default(),
        executor.clone(),
        StaticIndex::with(&[]),
        notifier.clone(),
    );

    assert!(p.suggestions(&doc(MEMBER_QUERY), pos(3, 5), false).await.is_empty());
    assert!(p.suggestions(&doc(MEMBER_QUERY), pos(3, 5), false).await.is_empty());
    assert_eq!(notifier.errors.load(Ordering::SeqCst), 2);
    assert_eq!(notifier.warnings.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn stderr_is_not_fatal() {
    let executor = Arc::new(ScriptedExecutor {
        responses: Mutex::new(vec![ToolOutput {
            exit_code: Some(0),
            stdout: FMT_RESPONSE.to_string(),
            stderr: "warning: cache miss\n".to_string(),
        }]),
        calls: Mutex::new(Vec::new()),
    });
    let notifier = Arc::new(RecordingNotifier::default());
    let p = pipeline(
        ProviderConfig::default(),
        executor.clone(),
        StaticIndex::with(&[]),
        notifier.clone(),
    );

    let suggestions = p.suggestions(&doc(MEMBER_QUERY), pos(3, 5), false).await;
    assert_eq!(suggestions.len(), 3);
    assert_eq!(notifier.errors.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_member_access_result_retries_once_with_an_import() {
    let executor = ScriptedExecutor::with_stdout(&["[]", FMT_RESPONSE]);
    let mut config = ProviderConfig::default();
    config.unimported_packages = true;
    let p = pipeline(
        config,
        executor.clone(),
        StaticIndex::with(&[("fmt", "fmt")]),
        Arc::new(RecordingNotifier::default()),
    );

    let suggestions = p.suggestions(&doc(MEMBER_QUERY), pos(3, 5), false).await;
    assert_eq!(executor.call_count(), 2);
    assert_eq!(suggestions.len(), 3);

    // The retry runs against the patched buffer with a shifted offset.
    let original_offset = MEMBER_QUERY.find("fmt.").expect("cursor") + 4;
    let inserted = "\nimport \"fmt\"\n".len();
    let retry_args = executor.call_args(1);
    assert_eq!(retry_args[3], (original_offset + inserted).to_string());
    let retry_stdin = executor.calls.lock()[1].1.clone();
    assert!(retry_stdin.contains("import \"fmt\"\n"));
}

#[tokio::test]
async fn import_retry_failure_falls_back_to_the_empty_result() {
    let executor = ScriptedExecutor::with_stdout(&["[]"]);
    let mut config = ProviderConfig::default();
    config.unimported_packages = true;
    let p = pipeline(
        config,
        executor.clone(),
        StaticIndex::with(&[]),
        Arc::new(RecordingNotifier::default()),
    );

    let suggestions = p.suggestions(&doc(MEMBER_QUERY), pos(3, 5), false).await;
    assert!(suggestions.is_empty());
    assert_eq!(executor.call_count(), 1);
}

#[tokio::test]
async fn comment_scope_suppresses_the_request() {
    let executor = ScriptedExecutor::with_stdout(&[FMT_RESPONSE]);
    let p = pipeline(
        ProviderConfig::default(),
        executor.clone(),
        StaticIndex::with(&[]),
        Arc::new(RecordingNotifier::default()),
    );

    let text = "package main\n\n// fo\n";
    let suggestions = p.suggestions(&doc(text), pos(2, 5), true).await;
    assert!(suggestions.is_empty());
    assert_eq!(executor.call_count(), 0);
}

#[tokio::test]
async fn import_path_strings_override_string_suppression() {
    let executor = ScriptedExecutor::with_stdout(&[FMT_RESPONSE]);
    let p = pipeline(
        ProviderConfig::default(),
        executor.clone(),
        StaticIndex::with(&[]),
        Arc::new(RecordingNotifier::default()),
    );

    let text = "package main\n\nimport (\n\t\"fm\n)\n";
    p.suggestions(&doc(text), pos(3, 4), false).await;
    assert_eq!(executor.call_count(), 1);
}

#[tokio::test]
async fn propose_builtins_passes_the_flag_through() {
    let executor = ScriptedExecutor::with_stdout(&[FMT_RESPONSE]);
    let mut config = ProviderConfig::default();
    config.propose_builtins = true;
    let p = pipeline(
        config,
        executor.clone(),
        StaticIndex::with(&[]),
        Arc::new(RecordingNotifier::default()),
    );

    p.suggestions(&doc(MEMBER_QUERY), pos(3, 5), false).await;
    assert_eq!(executor.call_args(0)[0], "-builtin");
}
