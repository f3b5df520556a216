use async_trait::async_trait;

use crate::types::*;

/// The capability set every supported chain provides.
///
/// Methods never fail: local errors are folded into the returned
/// [`Reply`]. Adding a chain means adding one implementation and one
/// factory entry in the registry.
#[async_trait]
pub trait ChainAdaptor: Send + Sync {
    /// Name requests use to route to this adaptor.
    fn chain_name(&self) -> &'static str;

    async fn support_chains(&self, req: &SupportChainsRequest) -> Reply<SupportChains>;

    async fn convert_address(&self, req: &ConvertAddressRequest) -> Reply<ConvertAddress>;

    async fn valid_address(&self, req: &ValidAddressRequest) -> Reply<ValidAddress>;

    async fn block_by_number(&self, req: &BlockNumberRequest) -> Reply<Block>;

    async fn block_by_hash(&self, req: &BlockHashRequest) -> Reply<Block>;

    async fn block_header_by_number(&self, req: &BlockHeaderNumberRequest)
        -> Reply<BlockHeaderInfo>;

    async fn block_header_by_hash(&self, req: &BlockHeaderHashRequest) -> Reply<BlockHeaderInfo>;

    async fn block_by_range(&self, req: &BlockByRangeRequest) -> Reply<BlockRange>;

    async fn account(&self, req: &AccountRequest) -> Reply<Account>;

    async fn fee(&self, req: &FeeRequest) -> Reply<Fee>;

    async fn send_tx(&self, req: &SendTxRequest) -> Reply<SendTx>;

    async fn tx_by_address(&self, req: &TxAddressRequest) -> Reply<TxList>;

    async fn tx_by_hash(&self, req: &TxHashRequest) -> Reply<TxDetail>;

    async fn create_unsign_transaction(
        &self,
        req: &UnSignTransactionRequest,
    ) -> Reply<UnSignTransaction>;

    async fn build_signed_transaction(
        &self,
        req: &SignedTransactionRequest,
    ) -> Reply<SignedTransaction>;

    async fn decode_transaction(&self, req: &DecodeTransactionRequest) -> Reply<DecodeTransaction>;

    async fn verify_signed_transaction(
        &self,
        req: &VerifyTransactionRequest,
    ) -> Reply<VerifyTransaction>;

    async fn extra_data(&self, req: &ExtraDataRequest) -> Reply<ExtraData>;
}
