//! Completion suggestion engine
//!
//! This module provides:
//! - Parsing of gocode's rendered function types into structured signatures
//! - Snippet synthesis with numbered tab-stops for function candidates
//! - The refresh decision pipeline (fresh query vs. cached refilter)
//! - Auto-import-and-retry for member access on unimported packages

pub mod import_resolver;
pub mod matcher;
pub mod pipeline;
pub mod signature;
pub mod snippet;
pub mod suggestion;

pub use import_resolver::{PackageIndex, PatchedBuffer};
pub use pipeline::SuggestionPipeline;
pub use signature::{Parameter, ParameterKind, Signature, parse_type};
pub use snippet::{GeneratedSnippet, SnippetMode, generate};
pub use suggestion::{Suggestion, SuggestionKind};
