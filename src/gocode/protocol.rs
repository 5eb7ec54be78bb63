//! Wire protocol for gocode's `-f=json autocomplete` output
//!
//! gocode writes a single JSON array to stdout: `[prefix_length, [candidate,
//! ...]]`, or `[]` when it has nothing to offer. Each candidate carries a
//! `class` (func, package, var, type, const), a `name`, and a `type` string
//! that is empty for non-typed classes.

use serde::Deserialize;
use thiserror::Error;

/// Candidate classes emitted by gocode.
///
/// `PANIC` is a sentinel gocode emits when its internal state is corrupted;
/// the pipeline turns it into a one-shot degraded-tool notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateClass {
    Func,
    Package,
    Var,
    Type,
    Const,
    #[serde(rename = "PANIC")]
    Panic,
    #[serde(other)]
    Unknown,
}

/// One raw completion candidate as produced by gocode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawCandidate {
    pub class: CandidateClass,
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_text: String,
}

impl RawCandidate {
    /// Whether this candidate is the PANIC sentinel (class, name, and type
    /// all equal the literal `PANIC`).
    pub fn is_panic(&self) -> bool {
        self.class == CandidateClass::Panic && self.name == "PANIC" && self.type_text == "PANIC"
    }
}

/// A decoded autocomplete response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionResponse {
    /// Number of bytes before the cursor that the candidates replace.
    pub prefix_length: usize,
    pub candidates: Vec<RawCandidate>,
}

/// Errors from one gocode interaction. Only [`ProtocolError::MalformedOutput`]
/// surfaces to the user; the rest degrade to an empty candidate list.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("gocode executable could not be resolved")]
    ToolUnresolved,
    #[error("gocode invocation failed: {0}")]
    Invocation(#[source] std::io::Error),
    #[error("malformed gocode output: {0}")]
    MalformedOutput(#[from] serde_json::Error),
}

/// Decode gocode's stdout. Empty output and the bare `[]` response both
/// decode to an empty candidate list.
pub fn parse_response(stdout: &str) -> Result<CompletionResponse, ProtocolError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() || trimmed == "[]" {
        return Ok(CompletionResponse::default());
    }
    let (prefix_length, candidates): (usize, Vec<RawCandidate>) = serde_json::from_str(trimmed)?;
    Ok(CompletionResponse {
        prefix_length,
        candidates,
    })
}
