//! Routes inbound calls to the adaptor registered for their chain.
//!
//! The dispatcher checks one thing, that the named chain is registered,
//! and otherwise hands the request to the adaptor untouched. It is also
//! the single place where a panic inside an adaptor is caught and turned
//! into [`DispatchError::Internal`].

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::adaptor::ChainAdaptor;
use crate::error::AccountError;
use crate::registry::ChainRegistry;
use crate::types::*;

/// Failures that cannot be expressed as an operation reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("method not found: {0}")]
    UnknownMethod(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("internal error: {0}")]
    Internal(String),
}

const UNSUPPORTED_CHAIN_MSG: &str = "Unsupport chain";

macro_rules! methods {
    ($( $variant:ident($req:ty) => $wire:literal, $op:ident, $payload:ty; )*) => {
        /// A decoded inbound call.
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum MethodCall {
            $( $variant($req), )*
        }

        impl MethodCall {
            /// Decodes `params` as the request type of `method`.
            pub fn parse(method: &str, params: Value) -> Result<Self, DispatchError> {
                match method {
                    $(
                        $wire => serde_json::from_value::<$req>(params)
                            .map(Self::$variant)
                            .map_err(|e| DispatchError::InvalidParams(e.to_string())),
                    )*
                    other => Err(DispatchError::UnknownMethod(other.to_string())),
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$variant(_) => $wire, )*
                }
            }

            pub fn chain(&self) -> &str {
                match self {
                    $( Self::$variant(req) => req.chain(), )*
                }
            }

            /// Names of every method the gateway answers.
            pub fn names() -> &'static [&'static str] {
                &[$( $wire, )*]
            }
        }

        async fn invoke(adaptor: &dyn ChainAdaptor, call: &MethodCall) -> Result<Value, DispatchError> {
            match call {
                $( MethodCall::$variant(req) => encode(&adaptor.$op(req).await), )*
            }
        }

        fn unsupported(call: &MethodCall, err: &AccountError) -> Result<Value, DispatchError> {
            match call {
                $( MethodCall::$variant(_) => encode(&Reply::<$payload>::failure(UNSUPPORTED_CHAIN_MSG, err)), )*
            }
        }
    };
}

methods! {
    SupportChains(SupportChainsRequest) => "getSupportChains", support_chains, SupportChains;
    ConvertAddress(ConvertAddressRequest) => "convertAddress", convert_address, ConvertAddress;
    ValidAddress(ValidAddressRequest) => "validAddress", valid_address, ValidAddress;
    BlockByNumber(BlockNumberRequest) => "getBlockByNumber", block_by_number, Block;
    BlockByHash(BlockHashRequest) => "getBlockByHash", block_by_hash, Block;
    BlockHeaderByNumber(BlockHeaderNumberRequest) => "getBlockHeaderByNumber", block_header_by_number, BlockHeaderInfo;
    BlockHeaderByHash(BlockHeaderHashRequest) => "getBlockHeaderByHash", block_header_by_hash, BlockHeaderInfo;
    BlockByRange(BlockByRangeRequest) => "getBlockByRange", block_by_range, BlockRange;
    Account(AccountRequest) => "getAccount", account, Account;
    Fee(FeeRequest) => "getFee", fee, Fee;
    SendTx(SendTxRequest) => "sendTx", send_tx, SendTx;
    TxByAddress(TxAddressRequest) => "getTxByAddress", tx_by_address, TxList;
    TxByHash(TxHashRequest) => "getTxByHash", tx_by_hash, TxDetail;
    CreateUnSignTransaction(UnSignTransactionRequest) => "createUnSignTransaction", create_unsign_transaction, UnSignTransaction;
    BuildSignedTransaction(SignedTransactionRequest) => "buildSignedTransaction", build_signed_transaction, SignedTransaction;
    DecodeTransaction(DecodeTransactionRequest) => "decodeTransaction", decode_transaction, DecodeTransaction;
    VerifySignedTransaction(VerifyTransactionRequest) => "verifySignedTransaction", verify_signed_transaction, VerifyTransaction;
    ExtraData(ExtraDataRequest) => "getExtraData", extra_data, ExtraData;
}

fn encode<T: Serialize>(reply: &T) -> Result<Value, DispatchError> {
    serde_json::to_value(reply).map_err(|e| DispatchError::Internal(e.to_string()))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: ChainRegistry,
}

impl Dispatcher {
    pub fn new(registry: ChainRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    /// Decodes and dispatches one call by method name.
    pub async fn handle(&self, method: &str, params: Value) -> Result<Value, DispatchError> {
        let call = MethodCall::parse(method, params)?;
        self.dispatch(call).await
    }

    /// Routes `call` and returns the serialized reply.
    ///
    /// An unregistered chain yields an `UnsupportedChain` reply without
    /// touching any adaptor. A panic while serving the call is logged and
    /// returned as [`DispatchError::Internal`].
    pub async fn dispatch(&self, call: MethodCall) -> Result<Value, DispatchError> {
        let method = call.name();
        tracing::info!(method, chain = %call.chain(), "handling request");

        let outcome = AssertUnwindSafe(self.route(&call)).catch_unwind().await;

        match outcome {
            Ok(result) => {
                tracing::debug!(method, reply = ?result, "finish handling");
                result
            }
            Err(panic) => {
                let msg = panic_message(panic.as_ref());
                tracing::error!(method, chain = %call.chain(), panic = %msg, "recovered panic");
                Err(DispatchError::Internal(format!("Panic err: {msg}")))
            }
        }
    }

    async fn route(&self, call: &MethodCall) -> Result<Value, DispatchError> {
        let Some(adaptor) = self.registry.get(call.chain()) else {
            let err = AccountError::UnsupportedChain(call.chain().to_string());
            tracing::warn!(method = call.name(), chain = %call.chain(), "unsupported chain");
            return unsupported(call, &err);
        };
        invoke(adaptor, call).await
    }
}
