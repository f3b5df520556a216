use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_rlp::{Encodable, RlpEncodable};

use crate::address::{format_address, parse_address};
use crate::erc20;
use crate::error::EthError;
use crate::numeric::parse_decimal;
use crate::request::TransactionRequest;
use crate::signature::DetachedSignature;

/// EIP-2718 type byte of a dynamic-fee transaction.
pub const EIP1559_TX_TYPE: u8 = 0x02;

/// An unsigned EIP-1559 (type 2) transaction in its canonical shape.
///
/// Either `data` is empty and `to`/`value` describe a native transfer, or
/// `data` is a token call and `value` is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedFeeTransaction {
    pub chain_id: U256,
    pub nonce: u64,
    pub gas_tip_cap: U256,
    pub gas_fee_cap: U256,
    pub gas_limit: u64,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionShape {
    NativeTransfer,
    ContractCall,
}

/// A signed EIP-1559 transaction ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedFeeTransaction {
    /// `0x02 || rlp(signed fields)`.
    pub raw_tx: Vec<u8>,
    /// Keccak-256 of `raw_tx`.
    pub tx_hash: B256,
    /// Address recovered from the signature.
    pub signer: Address,
}

impl SignedFeeTransaction {
    pub fn raw_tx_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw_tx))
    }

    pub fn tx_hash_hex(&self) -> String {
        format!("{:#x}", self.tx_hash)
    }
}

impl UnsignedFeeTransaction {
    /// Validates the request's numeric fields and picks the transaction shape.
    ///
    /// Numeric fields are checked in the order chain id, priority fee, max
    /// fee, amount; the first failure is reported. A native-asset contract
    /// address yields a plain transfer, anything else an ERC-20 `transfer`
    /// call against the contract for the requested recipient and amount.
    pub fn from_request(request: &TransactionRequest) -> Result<Self, EthError> {
        let chain_id = parse_decimal("chainId", &request.chain_id)?;
        let gas_tip_cap = parse_decimal("maxPriorityFeePerGas", &request.max_priority_fee_per_gas)?;
        let gas_fee_cap = parse_decimal("maxFeePerGas", &request.max_fee_per_gas)?;
        let amount = parse_decimal("amount", &request.amount)?;

        // A malformed recipient is an error, never the zero address.
        let recipient = parse_address(&request.to_address)?;

        let (to, value, data) = if request.is_native_transfer() {
            (recipient, amount, Bytes::new())
        } else {
            let contract = parse_address(&request.contract_address)?;
            let call = erc20::encode_transfer(&recipient, amount);
            (contract, U256::ZERO, Bytes::from(call))
        };

        tracing::debug!(
            chain_id = %chain_id,
            to = %format_address(&to),
            native = request.is_native_transfer(),
            "shaped fee transaction"
        );

        Ok(Self {
            chain_id,
            nonce: request.nonce,
            gas_tip_cap,
            gas_fee_cap,
            gas_limit: request.gas_limit,
            to,
            value,
            data,
        })
    }

    pub fn shape(&self) -> TransactionShape {
        if self.data.is_empty() {
            TransactionShape::NativeTransfer
        } else {
            TransactionShape::ContractCall
        }
    }

    /// Encodes the pre-signature payload `0x02 || rlp(fields)`.
    ///
    /// The RLP list is `[chain_id, nonce, max_priority_fee_per_gas,
    /// max_fee_per_gas, gas_limit, to, value, data, access_list]` with an
    /// empty access list.
    pub fn encode_unsigned(&self) -> Vec<u8> {
        let fields = UnsignedTxFields {
            chain_id: self.chain_id,
            nonce: self.nonce,
            max_priority_fee_per_gas: self.gas_tip_cap,
            max_fee_per_gas: self.gas_fee_cap,
            gas_limit: self.gas_limit,
            to: self.to,
            value: self.value,
            data: self.data.clone(),
            access_list: Vec::new(),
        };

        typed_envelope(&fields)
    }

    /// Keccak-256 of [`encode_unsigned`](Self::encode_unsigned); the digest
    /// an external signer signs.
    pub fn signing_hash(&self) -> B256 {
        keccak256(self.encode_unsigned())
    }

    /// Attaches a detached signature and recovers the signer.
    ///
    /// The signer is not compared with anything here; see
    /// [`build_signed_transaction`] for the sender check.
    pub fn attach_signature(
        &self,
        signature: &DetachedSignature,
    ) -> Result<SignedFeeTransaction, EthError> {
        let signer = signature.recover_address(&self.signing_hash())?;

        let fields = SignedTxFields {
            chain_id: self.chain_id,
            nonce: self.nonce,
            max_priority_fee_per_gas: self.gas_tip_cap,
            max_fee_per_gas: self.gas_fee_cap,
            gas_limit: self.gas_limit,
            to: self.to,
            value: self.value,
            data: self.data.clone(),
            access_list: Vec::new(),
            signature_y_parity: signature.y_parity(),
            signature_r: signature.r(),
            signature_s: signature.s(),
        };

        let raw_tx = typed_envelope(&fields);
        let tx_hash = keccak256(&raw_tx);

        Ok(SignedFeeTransaction {
            raw_tx,
            tx_hash,
            signer,
        })
    }
}

/// Rebuilds the unsigned transaction from `request`, attaches `signature`
/// and checks that it recovers to the request's `fromAddress`.
///
/// On a mismatch nothing is returned but the error: a transaction signed
/// by someone other than the declared sender never leaves this function.
pub fn build_signed_transaction(
    request: &TransactionRequest,
    signature_hex: &str,
) -> Result<SignedFeeTransaction, EthError> {
    let unsigned = UnsignedFeeTransaction::from_request(request)?;
    let signature = DetachedSignature::from_hex(signature_hex)?;
    let signed = unsigned.attach_signature(&signature)?;

    let declared = parse_address(&request.from_address).ok();
    if declared != Some(signed.signer) {
        return Err(EthError::SenderMismatch {
            expected: request.from_address.clone(),
            recovered: signed.signer.to_checksum(None),
        });
    }

    Ok(signed)
}

fn typed_envelope<T: Encodable>(fields: &T) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + fields.length());
    out.push(EIP1559_TX_TYPE);
    fields.encode(&mut out);
    out
}

// ---------------------------------------------------------------------------
// RLP-encodable structures
// ---------------------------------------------------------------------------

#[derive(RlpEncodable)]
struct UnsignedTxFields {
    chain_id: U256,
    nonce: u64,
    max_priority_fee_per_gas: U256,
    max_fee_per_gas: U256,
    gas_limit: u64,
    to: Address,
    value: U256,
    data: Bytes,
    access_list: Vec<AccessListItem>,
}

#[derive(RlpEncodable)]
struct SignedTxFields {
    chain_id: U256,
    nonce: u64,
    max_priority_fee_per_gas: U256,
    max_fee_per_gas: U256,
    gas_limit: u64,
    to: Address,
    value: U256,
    data: Bytes,
    access_list: Vec<AccessListItem>,
    signature_y_parity: bool,
    signature_r: U256,
    signature_s: U256,
}

/// EIP-2930 access list entry; always empty here.
#[derive(Debug, Clone, RlpEncodable)]
struct AccessListItem {
    address: Address,
    storage_keys: Vec<B256>,
}
