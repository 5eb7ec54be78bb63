pub mod config;
pub mod document;
pub mod gocode;
pub mod logging;
pub mod lsp;
pub mod notify;
pub mod packages;
pub mod suggest;
