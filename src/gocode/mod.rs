//! Interface to the external gocode signature-introspection tool

pub mod executor;
pub mod locator;
pub mod protocol;

pub use executor::{TokioExecutor, ToolExecutor, ToolOutput};
pub use locator::{PathLocator, ToolLocator};
pub use protocol::{CandidateClass, CompletionResponse, ProtocolError, RawCandidate, parse_response};
