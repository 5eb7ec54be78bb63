//! Provider configuration
//!
//! Read-only settings for the completion provider, taken from the LSP
//! `initializationOptions` with environment-variable fallbacks. Checks in
//! order:
//! 1. Environment variables (`GOCODE_LS_*`)
//! 2. Explicit initialization options
//! 3. Built-in defaults

use serde::Deserialize;
use tracing::warn;

use crate::suggest::snippet::SnippetMode;

/// Scope descriptor marking an import path identifier. Completions in this
/// context are never suppressed, even inside string literals.
pub const IMPORT_SCOPE: &str = "entity.name.import.go";

fn default_suppressed_scopes() -> Vec<String> {
    vec![
        "comment.line".to_string(),
        "comment.block".to_string(),
        "string.quoted".to_string(),
    ]
}

fn default_suppressed_characters() -> Vec<char> {
    vec![' ', '\t', ',', ';', ')', '}']
}

/// Completion provider settings, externally managed and read-only here.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Ask gocode to propose language builtins as well.
    pub propose_builtins: bool,

    /// Retry a failed member-access completion after inserting an import for
    /// the referenced package.
    pub unimported_packages: bool,

    /// Scope descriptors in which completion requests are discarded.
    pub suppressed_scopes: Vec<String>,

    /// Characters immediately preceding the cursor that discard a request.
    pub suppressed_characters: Vec<char>,

    /// How much per-argument detail generated snippets carry.
    pub snippet_mode: SnippetMode,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            propose_builtins: false,
            unimported_packages: false,
            suppressed_scopes: default_suppressed_scopes(),
            suppressed_characters: default_suppressed_characters(),
            snippet_mode: SnippetMode::default(),
        }
    }
}

impl ProviderConfig {
    /// Build configuration from LSP initialization options, then apply any
    /// environment overrides.
    pub fn from_init_options(options: Option<&serde_json::Value>) -> Self {
        let mut config = match options {
            Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
                warn!("invalid initialization options ({}), using defaults", e);
                ProviderConfig::default()
            }),
            None => ProviderConfig::default(),
        };

        if let Ok(value) = std::env::var("GOCODE_LS_SNIPPET_MODE") {
            config.snippet_mode = parse_snippet_mode(&value, config.snippet_mode);
        }
        if let Ok(value) = std::env::var("GOCODE_LS_PROPOSE_BUILTINS") {
            config.propose_builtins = value == "1" || value.eq_ignore_ascii_case("true");
        }
        if let Ok(value) = std::env::var("GOCODE_LS_UNIMPORTED_PACKAGES") {
            config.unimported_packages = value == "1" || value.eq_ignore_ascii_case("true");
        }

        config
    }
}

fn parse_snippet_mode(s: &str, fallback: SnippetMode) -> SnippetMode {
    match s.trim().to_lowercase().as_str() {
        "fullnames" | "full-names" => SnippetMode::FullNames,
        "identifiersonly" | "identifiers-only" | "name" => SnippetMode::IdentifiersOnly,
        "none" => SnippetMode::None,
        other => {
            warn!("unknown snippet mode '{}', keeping current", other);
            fallback
        }
    }
}
