//! LSP server surface

pub mod backend;

pub use backend::Backend;
