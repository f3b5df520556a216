//! Ethereum adaptor.
//!
//! Codec work (addresses, call data, EIP-1559 envelopes) is delegated to
//! `chain-eth`; chain state comes from an [`EthClient`] and an
//! [`EthDataClient`].

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use chain_eth::address::{format_address, is_valid_address, parse_address, pubkey_hex_to_address};
use chain_eth::erc20::decode_transfer;
use chain_eth::numeric::{parse_decimal, parse_decimal_u64, to_decimal};
use chain_eth::request::{is_native_asset, TransactionRequest};
use chain_eth::transaction::{build_signed_transaction, UnsignedFeeTransaction};

use crate::adaptor::ChainAdaptor;
use crate::client::{
    AddressTx, ClientError, EthClient, EthDataClient, ExplorerClient, HistoryKind, RpcBlock,
    RpcClient, RpcHeader, RpcReceipt, RpcTransaction,
};
use crate::config::EthNodeConfig;
use crate::error::AccountError;
use crate::types::*;

pub const CHAIN_NAME: &str = "Ethereum";

const STUB_DECODED_TX: &str = "0x000000";
const STUB_EXTRA_DATA: &str = "not data";

/// Most headers one `getBlockByRange` call may fetch.
pub const MAX_BLOCK_RANGE: u64 = 1000;

pub struct EthereumAdaptor {
    client: Arc<dyn EthClient>,
    data: Arc<dyn EthDataClient>,
}

impl std::fmt::Debug for EthereumAdaptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EthereumAdaptor").finish_non_exhaustive()
    }
}

impl EthereumAdaptor {
    pub fn new(client: Arc<dyn EthClient>, data: Arc<dyn EthDataClient>) -> Self {
        Self { client, data }
    }

    /// Builds the HTTP collaborators from configuration. A malformed
    /// endpoint is a setup failure.
    pub fn from_config(config: &EthNodeConfig) -> Result<Self, AccountError> {
        let setup = |e: ClientError| AccountError::Setup {
            chain: CHAIN_NAME.to_string(),
            reason: e.to_string(),
        };

        let client = RpcClient::new(&config.rpc_url, config.timeout()).map_err(setup)?;
        let data = ExplorerClient::new(&config.data_api_url, &config.data_api_key, config.timeout())
            .map_err(setup)?;

        Ok(Self::new(Arc::new(client), Arc::new(data)))
    }

    async fn load_account(&self, req: &AccountRequest) -> Result<Account, AccountError> {
        let address = parse_address(&req.address)?;
        let nonce = self.client.transaction_count(address).await?;

        let contract = (!is_native_asset(&req.contract_address)).then_some(req.contract_address.as_str());
        let balance = self.data.balance(&req.address, contract).await?;

        Ok(Account {
            account_number: "0".to_string(),
            sequence: nonce.to_string(),
            balance: balance.map_or_else(|| "0".to_string(), |b| to_decimal(&b)),
        })
    }

    /// The `*2`/`*3` suffixes on the faster tiers are labels only. No
    /// multiplied price is computed.
    async fn load_fee(&self) -> Result<Fee, AccountError> {
        let price = self.client.gas_price().await?;
        let tip = self.client.gas_tip_cap().await?;

        let base = format!("{}|{}", to_decimal(&price), to_decimal(&tip));
        Ok(Fee {
            slow_fee: base.clone(),
            normal_fee: format!("{base}|*2"),
            fast_fee: format!("{base}|*3"),
        })
    }

    async fn load_range(&self, req: &BlockByRangeRequest) -> Result<BlockRange, AccountError> {
        let start = parse_decimal_u64("start", &req.start)?;
        let end = parse_decimal_u64("end", &req.end)?;
        if start > end {
            return Ok(BlockRange::default());
        }
        if end - start >= MAX_BLOCK_RANGE {
            return Err(AccountError::InvalidNumericField {
                field: "end".to_string(),
                value: format!("{} (range exceeds {MAX_BLOCK_RANGE} blocks)", req.end),
            });
        }

        let headers = self.client.headers_by_range(start, end).await?;
        Ok(BlockRange {
            block_header: headers.iter().map(header_to_reply).collect(),
        })
    }

    async fn broadcast(&self, req: &SendTxRequest) -> Result<SendTx, AccountError> {
        let raw = decode_hex(&req.raw_tx)?;
        if raw.is_empty() {
            return Err(AccountError::InvalidEncoding("raw transaction is empty".into()));
        }

        let hash = self
            .client
            .send_raw_transaction(&raw)
            .await
            .map_err(|e| AccountError::BroadcastFailed(e.to_string()))?;

        Ok(SendTx {
            tx_hash: hash_hex(&hash),
        })
    }

    async fn load_history(&self, req: &TxAddressRequest) -> Result<TxList, AccountError> {
        let kind = HistoryKind::for_contract(&req.contract_address);
        let rows = self
            .data
            .transactions_by_address(&req.address, req.page, req.pagesize, &kind)
            .await?;

        Ok(TxList {
            tx: rows.iter().map(history_to_message).collect(),
        })
    }

    async fn load_transaction(&self, req: &TxHashRequest) -> Result<TxDetail, AccountError> {
        let hash = parse_hash(&req.hash)?;
        let tx = self.client.transaction_by_hash(hash).await?;
        let receipt = self.client.receipt_by_hash(hash).await?;

        let transfer = match tx.to {
            None => ObservedTransfer {
                to: String::new(),
                value: tx.value,
                contract: String::new(),
            },
            Some(to) => {
                let code = self.client.code_at(to).await?;
                observe_transfer(&tx, to, !code.is_empty())
            }
        };

        Ok(TxDetail {
            tx: Some(transaction_to_message(&tx, &receipt, transfer)),
        })
    }
}

/// Destination and value a transaction economically moves.
struct ObservedTransfer {
    to: String,
    value: U256,
    contract: String,
}

fn observe_transfer(tx: &RpcTransaction, to: Address, is_contract: bool) -> ObservedTransfer {
    if !is_contract {
        return ObservedTransfer {
            to: format_address(&to),
            value: tx.value,
            contract: format_address(&Address::ZERO),
        };
    }

    match decode_transfer(&tx.input) {
        Some(transfer) => ObservedTransfer {
            to: format_address(&transfer.to),
            value: transfer.amount,
            contract: format_address(&to),
        },
        None => ObservedTransfer {
            to: format_address(&to),
            value: U256::ZERO,
            contract: format_address(&to),
        },
    }
}

fn transaction_to_message(
    tx: &RpcTransaction,
    receipt: &RpcReceipt,
    transfer: ObservedTransfer,
) -> TxMessage {
    let status = if receipt.status.map(|s| s.to::<u64>()) == Some(1) {
        TxStatus::Success
    } else {
        TxStatus::Failed
    };

    let price = receipt.effective_gas_price.or(tx.gas_price).unwrap_or_default();
    let fee = price.saturating_mul(U256::from(receipt.gas_used.to::<u64>()));

    TxMessage {
        hash: hash_hex(&tx.hash),
        index: u32::try_from(receipt.transaction_index.to::<u64>()).unwrap_or(u32::MAX),
        froms: vec![AddressEntry {
            address: format_address(&tx.from),
        }],
        tos: vec![AddressEntry {
            address: transfer.to,
        }],
        values: vec![ValueEntry {
            value: to_decimal(&transfer.value),
        }],
        fee: to_decimal(&fee),
        status,
        tx_type: 0,
        height: receipt.block_number.to::<u64>().to_string(),
        contract_address: transfer.contract,
        data: format!("0x{}", hex::encode(&tx.input)),
    }
}

/// Fee is `gasUsed * gasPrice` when the explorer reports both.
fn history_fee(row: &AddressTx) -> String {
    let used = parse_decimal("gasUsed", &row.gas_used).ok();
    let price = parse_decimal("gasPrice", &row.gas_price).ok();

    used.zip(price)
        .and_then(|(used, price)| used.checked_mul(price))
        .map_or_else(|| "0".to_string(), |fee| to_decimal(&fee))
}

fn history_to_message(row: &AddressTx) -> TxMessage {
    TxMessage {
        hash: row.hash.clone(),
        index: 0,
        froms: vec![AddressEntry {
            address: row.from.clone(),
        }],
        tos: vec![AddressEntry {
            address: row.to.clone(),
        }],
        values: vec![ValueEntry {
            value: row.value.clone(),
        }],
        fee: history_fee(row),
        status: TxStatus::Success,
        tx_type: 1,
        height: row.block_number.clone(),
        contract_address: row.contract_address.clone(),
        data: String::new(),
    }
}

fn header_to_reply(header: &RpcHeader) -> BlockHeader {
    BlockHeader {
        hash: hash_hex(&header.hash),
        parent_hash: hash_hex(&header.parent_hash),
        uncle_hash: hash_hex(&header.uncles_hash),
        coin_base: format_address(&header.miner),
        root: hash_hex(&header.state_root),
        tx_hash: hash_hex(&header.transactions_root),
        receipt_hash: hash_hex(&header.receipts_root),
        parent_beacon_root: hash_hex(&header.parent_beacon_block_root.unwrap_or_default()),
        difficulty: to_decimal(&header.difficulty),
        number: header.number.to::<u64>().to_string(),
        gas_limit: header.gas_limit.to::<u64>(),
        gas_used: header.gas_used.to::<u64>(),
        time: header.timestamp.to::<u64>(),
        extra: hex::encode(&header.extra_data),
        mix_digest: hash_hex(&header.mix_hash),
        nonce: u64::from_be_bytes(header.nonce.0).to_string(),
        base_fee: header
            .base_fee_per_gas
            .map_or_else(|| "0".to_string(), |fee| to_decimal(&fee)),
        withdrawals_hash: hash_hex(&header.withdrawals_root.unwrap_or_default()),
        blob_gas_used: header.blob_gas_used.map_or(0, |v| v.to::<u64>()),
        excess_blob_gas: header.excess_blob_gas.map_or(0, |v| v.to::<u64>()),
    }
}

fn block_to_reply(block: &RpcBlock) -> Block {
    let height = block.header.number.to::<u64>();
    let transactions = block
        .transactions
        .iter()
        .map(|tx| {
            let to = tx.to.as_ref().map(format_address).unwrap_or_default();
            BlockTransaction {
                from: format_address(&tx.from),
                token_address: to.clone(),
                contract_wallet: to.clone(),
                to,
                hash: hash_hex(&tx.hash),
                height,
                amount: to_decimal(&tx.value),
            }
        })
        .collect();

    Block {
        height,
        hash: hash_hex(&block.header.hash),
        base_fee: block
            .header
            .base_fee_per_gas
            .map_or_else(|| "0".to_string(), |fee| to_decimal(&fee)),
        transactions,
    }
}

fn hash_hex(hash: &B256) -> String {
    format!("{hash:#x}")
}

fn decode_hex(text: &str) -> Result<Vec<u8>, AccountError> {
    let body = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    hex::decode(body).map_err(|e| AccountError::InvalidEncoding(format!("{text:?} is not hex: {e}")))
}

fn parse_hash(text: &str) -> Result<B256, AccountError> {
    let bytes = decode_hex(text)?;
    if bytes.len() != 32 {
        return Err(AccountError::InvalidEncoding(format!(
            "expected a 32-byte hash, got {} bytes",
            bytes.len()
        )));
    }
    Ok(B256::from_slice(&bytes))
}

fn height_selector(height: u64) -> Option<u64> {
    (height != 0).then_some(height)
}

/// Turns an operation result into its reply, logging the failure.
fn respond<T: Default>(operation: &str, result: Result<T, AccountError>) -> Reply<T> {
    match result {
        Ok(data) => Reply::success(format!("{operation} success"), data),
        Err(err) => {
            tracing::warn!(chain = CHAIN_NAME, operation, err = %err, "operation failed");
            Reply::failure(format!("{operation} fail"), &err)
        }
    }
}

#[async_trait]
impl ChainAdaptor for EthereumAdaptor {
    fn chain_name(&self) -> &'static str {
        CHAIN_NAME
    }

    async fn support_chains(&self, _req: &SupportChainsRequest) -> Reply<SupportChains> {
        Reply::success("Support this chain", SupportChains { support: true })
    }

    async fn convert_address(&self, req: &ConvertAddressRequest) -> Reply<ConvertAddress> {
        match pubkey_hex_to_address(&req.public_key) {
            Ok(address) => Reply::success(
                "convert address success",
                ConvertAddress {
                    address: format_address(&address),
                },
            ),
            Err(err) => {
                let err = AccountError::from(err);
                tracing::warn!(chain = CHAIN_NAME, err = %err, "convert address failed");
                Reply::failure_with(
                    "convert address fail",
                    &err,
                    ConvertAddress {
                        address: format_address(&Address::ZERO),
                    },
                )
            }
        }
    }

    async fn valid_address(&self, req: &ValidAddressRequest) -> Reply<ValidAddress> {
        if is_valid_address(&req.address) {
            Reply::success("valid address", ValidAddress { valid: true })
        } else {
            let err = AccountError::InvalidEncoding(format!("{:?} is not an address", req.address));
            Reply::failure("invalid address", &err)
        }
    }

    async fn block_by_number(&self, req: &BlockNumberRequest) -> Reply<Block> {
        let result = self
            .client
            .block_by_number(height_selector(req.height))
            .await
            .map(|block| block_to_reply(&block))
            .map_err(AccountError::from);
        respond("block by number", result)
    }

    async fn block_by_hash(&self, req: &BlockHashRequest) -> Reply<Block> {
        let result = match parse_hash(&req.hash) {
            Ok(hash) => self
                .client
                .block_by_hash(hash)
                .await
                .map(|block| block_to_reply(&block))
                .map_err(AccountError::from),
            Err(err) => Err(err),
        };
        respond("block by hash", result)
    }

    async fn block_header_by_number(
        &self,
        req: &BlockHeaderNumberRequest,
    ) -> Reply<BlockHeaderInfo> {
        let result = self
            .client
            .header_by_number(height_selector(req.height))
            .await
            .map(|header| BlockHeaderInfo {
                block_header: Some(header_to_reply(&header)),
            })
            .map_err(AccountError::from);
        respond("get block header", result)
    }

    async fn block_header_by_hash(&self, req: &BlockHeaderHashRequest) -> Reply<BlockHeaderInfo> {
        let result = match parse_hash(&req.hash) {
            Ok(hash) => self
                .client
                .header_by_hash(hash)
                .await
                .map(|header| BlockHeaderInfo {
                    block_header: Some(header_to_reply(&header)),
                })
                .map_err(AccountError::from),
            Err(err) => Err(err),
        };
        respond("get block header", result)
    }

    async fn block_by_range(&self, req: &BlockByRangeRequest) -> Reply<BlockRange> {
        respond("get block range", self.load_range(req).await)
    }

    async fn account(&self, req: &AccountRequest) -> Reply<Account> {
        match self.load_account(req).await {
            Ok(account) => Reply::success("get account response success", account),
            Err(err) => {
                tracing::warn!(chain = CHAIN_NAME, err = %err, "get account failed");
                Reply::failure_with(
                    "get account fail",
                    &err,
                    Account {
                        balance: "0".to_string(),
                        ..Account::default()
                    },
                )
            }
        }
    }

    async fn fee(&self, _req: &FeeRequest) -> Reply<Fee> {
        respond("get gas price", self.load_fee().await)
    }

    async fn send_tx(&self, req: &SendTxRequest) -> Reply<SendTx> {
        respond("send tx", self.broadcast(req).await)
    }

    async fn tx_by_address(&self, req: &TxAddressRequest) -> Reply<TxList> {
        respond("get tx list", self.load_history(req).await)
    }

    async fn tx_by_hash(&self, req: &TxHashRequest) -> Reply<TxDetail> {
        respond("get transaction", self.load_transaction(req).await)
    }

    async fn create_unsign_transaction(
        &self,
        req: &UnSignTransactionRequest,
    ) -> Reply<UnSignTransaction> {
        let result = TransactionRequest::from_base64(&req.base64_tx)
            .and_then(|request| UnsignedFeeTransaction::from_request(&request))
            .map(|tx| UnSignTransaction {
                un_sign_tx: format!("0x{}", hex::encode(tx.encode_unsigned())),
                sign_hash: hash_hex(&tx.signing_hash()),
            })
            .map_err(AccountError::from);
        respond("create un sign tx", result)
    }

    async fn build_signed_transaction(
        &self,
        req: &SignedTransactionRequest,
    ) -> Reply<SignedTransaction> {
        let result = TransactionRequest::from_base64(&req.base64_tx)
            .and_then(|request| build_signed_transaction(&request, &req.signature))
            .map_err(AccountError::from);

        match result {
            Ok(signed) => {
                tracing::info!(
                    chain = CHAIN_NAME,
                    sender = %format_address(&signed.signer),
                    tx_hash = %signed.tx_hash_hex(),
                    "signed transaction assembled"
                );
                Reply::success(
                    signed.tx_hash_hex(),
                    SignedTransaction {
                        signed_tx: signed.raw_tx_hex(),
                        tx_hash: signed.tx_hash_hex(),
                    },
                )
            }
            Err(err) => {
                tracing::error!(chain = CHAIN_NAME, err = %err, "build signed transaction failed");
                Reply::failure("build signed tx fail", &err)
            }
        }
    }

    async fn decode_transaction(&self, _req: &DecodeTransactionRequest) -> Reply<DecodeTransaction> {
        Reply::success(
            "decode tx success",
            DecodeTransaction {
                base64_tx: STUB_DECODED_TX.to_string(),
            },
        )
    }

    async fn verify_signed_transaction(
        &self,
        _req: &VerifyTransactionRequest,
    ) -> Reply<VerifyTransaction> {
        Reply::success("verify tx success", VerifyTransaction { verify: true })
    }

    async fn extra_data(&self, _req: &ExtraDataRequest) -> Reply<ExtraData> {
        Reply::success(
            "get extra data success",
            ExtraData {
                value: STUB_EXTRA_DATA.to_string(),
            },
        )
    }
}
