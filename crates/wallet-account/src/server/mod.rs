//! Line-delimited JSON-RPC 2.0 over TCP.

pub mod protocol;
pub mod tcp;

pub use tcp::{process_line, AccountServer, ServerError};
