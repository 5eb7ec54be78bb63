//! Completion suggestions
//!
//! Maps raw gocode candidates into the externally visible completion items:
//! function candidates get a parsed signature and an editable snippet, the
//! rest insert their name as plain text.

use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, InsertTextFormat};

use crate::gocode::{CandidateClass, RawCandidate};
use crate::suggest::signature::parse_type;
use crate::suggest::snippet::{self, SnippetMode, render_returns};

/// Kind of a suggestion, mirroring gocode's candidate classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    Function,
    Package,
    Variable,
    Type,
    Constant,
}

impl SuggestionKind {
    fn completion_item_kind(self) -> CompletionItemKind {
        match self {
            SuggestionKind::Function => CompletionItemKind::FUNCTION,
            SuggestionKind::Package => CompletionItemKind::MODULE,
            SuggestionKind::Variable => CompletionItemKind::VARIABLE,
            SuggestionKind::Type => CompletionItemKind::CLASS,
            SuggestionKind::Constant => CompletionItemKind::CONSTANT,
        }
    }
}

/// One completion item, cached between requests for fuzzy refiltering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// Plain insertion text, for candidates without a snippet.
    pub text: Option<String>,
    /// Editable snippet with tab-stops, for function candidates.
    pub snippet: Option<String>,
    pub display_text: String,
    /// Return types, shown beside the item.
    pub left_label: String,
    pub kind: SuggestionKind,
    /// Buffer text the insertion replaces.
    pub replacement_prefix: String,
    /// Key the fuzzy refilter matches the prefix against.
    pub fuzzy_key: String,
}

impl Suggestion {
    /// Map a raw candidate into a suggestion. PANIC-sentinel and unknown
    /// classes map to nothing.
    pub fn from_candidate(
        candidate: &RawCandidate,
        mode: SnippetMode,
        replacement_prefix: &str,
    ) -> Option<Suggestion> {
        let kind = match candidate.class {
            CandidateClass::Func => SuggestionKind::Function,
            CandidateClass::Package => SuggestionKind::Package,
            CandidateClass::Var => SuggestionKind::Variable,
            CandidateClass::Type => SuggestionKind::Type,
            CandidateClass::Const => SuggestionKind::Constant,
            CandidateClass::Panic | CandidateClass::Unknown => return None,
        };

        if kind == SuggestionKind::Function {
            let signature = parse_type(&candidate.type_text);
            let generated = snippet::generate(
                &candidate.name,
                signature.is_function.then_some(&signature),
                mode,
            );
            return Some(Suggestion {
                text: None,
                snippet: Some(generated.snippet),
                display_text: generated.display_text,
                left_label: render_returns(&signature.returns),
                kind,
                replacement_prefix: replacement_prefix.to_string(),
                fuzzy_key: candidate.name.clone(),
            });
        }

        Some(Suggestion {
            text: Some(candidate.name.clone()),
            snippet: None,
            display_text: candidate.name.clone(),
            left_label: candidate.type_text.clone(),
            kind,
            replacement_prefix: replacement_prefix.to_string(),
            fuzzy_key: candidate.name.clone(),
        })
    }

    pub fn to_completion_item(&self) -> CompletionItem {
        let (insert_text, format) = match &self.snippet {
            Some(snippet) => (snippet.clone(), InsertTextFormat::SNIPPET),
            None => (
                self.text.clone().unwrap_or_else(|| self.display_text.clone()),
                InsertTextFormat::PLAIN_TEXT,
            ),
        };
        CompletionItem {
            label: self.display_text.clone(),
            kind: Some(self.kind.completion_item_kind()),
            detail: (!self.left_label.is_empty()).then(|| self.left_label.clone()),
            filter_text: Some(self.fuzzy_key.clone()),
            insert_text: Some(insert_text),
            insert_text_format: Some(format),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gocode::CandidateClass;

    fn candidate(class: CandidateClass, name: &str, type_text: &str) -> RawCandidate {
        RawCandidate {
            class,
            name: name.to_string(),
            type_text: type_text.to_string(),
        }
    }

    #[test]
    fn function_candidates_get_snippets_and_return_labels() {
        let c = candidate(
            CandidateClass::Func,
            "Fprintf",
            "func(w io.Writer, format string, a ...interface{}) (n int, err error)",
        );
        let s = Suggestion::from_candidate(&c, SnippetMode::FullNames, "Fp").unwrap();
        assert_eq!(
            s.snippet.as_deref(),
            Some("Fprintf(${1:w io.Writer}, ${2:format string})$0")
        );
        assert_eq!(
            s.display_text,
            "Fprintf(w io.Writer, format string, a ...interface{})"
        );
        assert_eq!(s.left_label, "(n int, err error)");
        assert_eq!(s.replacement_prefix, "Fp");
        assert_eq!(s.fuzzy_key, "Fprintf");
    }

    #[test]
    fn variable_candidates_insert_plain_text() {
        let c = candidate(CandidateClass::Var, "Stdout", "*File");
        let s = Suggestion::from_candidate(&c, SnippetMode::FullNames, "St").unwrap();
        assert_eq!(s.text.as_deref(), Some("Stdout"));
        assert!(s.snippet.is_none());
        assert_eq!(s.left_label, "*File");
        assert_eq!(s.kind, SuggestionKind::Variable);
    }

    #[test]
    fn package_candidates_map_to_modules() {
        let c = candidate(CandidateClass::Package, "fmt", "");
        let s = Suggestion::from_candidate(&c, SnippetMode::FullNames, "").unwrap();
        assert_eq!(s.kind, SuggestionKind::Package);
        assert_eq!(s.left_label, "");
    }

    #[test]
    fn panic_sentinel_maps_to_nothing() {
        let c = candidate(CandidateClass::Panic, "PANIC", "PANIC");
        assert!(Suggestion::from_candidate(&c, SnippetMode::FullNames, "").is_none());
    }

    #[test]
    fn completion_item_conversion_marks_snippets() {
        let c = candidate(CandidateClass::Func, "Close", "func() error");
        let item = Suggestion::from_candidate(&c, SnippetMode::FullNames, "")
            .unwrap()
            .to_completion_item();
        assert_eq!(item.kind, Some(CompletionItemKind::FUNCTION));
        assert_eq!(item.insert_text_format, Some(InsertTextFormat::SNIPPET));
        assert_eq!(item.detail.as_deref(), Some("error"));
    }
}
