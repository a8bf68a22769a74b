//! LSP Protocol Implementation
//!
//! tower-lsp backend that feeds document lifecycle notifications to the
//! sync engine and publishes its diagnostics back to the client.

pub mod backend;
pub mod handlers;
pub mod server;
pub mod sink;

pub use backend::Backend;
pub use sink::ClientSink;
