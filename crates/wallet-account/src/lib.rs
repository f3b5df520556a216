//! Multi-chain account and transaction gateway.
//!
//! Requests name a chain; the [`dispatcher::Dispatcher`] looks up the
//! [`adaptor::ChainAdaptor`] registered for it in the
//! [`registry::ChainRegistry`] and returns the adaptor's reply. The
//! Ethereum adaptor builds and verifies EIP-1559 transactions with
//! `chain-eth` and reads chain state through the collaborators in
//! [`client`].

pub mod adaptor;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod ethereum;
pub mod logging;
pub mod registry;
pub mod server;
pub mod types;

pub use error::{AccountError, ErrorCode};
