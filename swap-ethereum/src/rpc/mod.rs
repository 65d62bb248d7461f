use std::time::Duration;

use alloy::{
    primitives::{Address, Bytes, B256, U256, U64},
    rpc::{
        client::{ClientBuilder, ReqwestClient},
        types::{BlockId, BlockNumberOrTag, TransactionRequest},
    },
    transports::http::reqwest,
};
use serde::Deserialize;
use swap_common::models::swap::TxReceipt;
use tracing::instrument;

pub mod errors;

use crate::rpc::errors::{RPCError, RequestError, RpcResultExt};

/// This struct wraps the ReqwestClient and provides the Ethereum RPC methods needed to read
/// token state, quote through routers and broadcast signed transactions.
///
/// Requests are sent exactly once: a failed request is reported to the caller, which decides
/// whether issuing a new one is safe. It is cheap to clone, as the `inner` internally uses an
/// Arc for the ReqwestClient.
#[derive(Clone, Debug)]
pub struct EthereumRpcClient {
    inner: ReqwestClient,
    url: String,
}

impl EthereumRpcClient {
    pub fn new(rpc_url: &str) -> Result<Self, RPCError> {
        let url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| {
                RPCError::SetupError(format!("Invalid RPC URL: {}", e))
            })?;

        let http_client = reqwest::ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| RPCError::SetupError(format!("Failed to create HTTP client: {e}")))?;

        let rpc = ClientBuilder::default().http_with_client(http_client, url);

        Ok(Self { inner: rpc, url: rpc_url.to_string() })
    }

    pub fn get_url(&self) -> &str {
        &self.url
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get_chain_id(&self) -> Result<u64, RPCError> {
        let chain_id: U64 = self
            .inner
            .request_noparams("eth_chainId")
            .await
            .rpc_context("Failed to get chain id")?;

        Ok(chain_id.to::<u64>())
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get_block_number(&self) -> Result<u64, RPCError> {
        let block_number: U64 = self
            .inner
            .request_noparams("eth_blockNumber")
            .await
            .rpc_context("Failed to get block number")?;

        Ok(block_number.to::<u64>())
    }

    /// Gets the gas price from the node using eth_gasPrice RPC method.
    ///
    /// Returns the gas price in wei as a u128.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_gas_price(&self) -> Result<u128, RPCError> {
        let gas_price: U256 = self
            .inner
            .request_noparams("eth_gasPrice")
            .await
            .rpc_context("Failed to get gas price")?;

        Ok(gas_price.saturating_to::<u128>())
    }

    /// Suggested priority fee (tip) per gas in wei, for EIP-1559 transactions.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_max_priority_fee_per_gas(&self) -> Result<u128, RPCError> {
        let fee: U256 = self
            .inner
            .request_noparams("eth_maxPriorityFeePerGas")
            .await
            .rpc_context("Failed to get max priority fee per gas")?;

        Ok(fee.saturating_to::<u128>())
    }

    /// Base fee per gas of the given block, `None` on chains without EIP-1559.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_base_fee_per_gas(&self, block_id: BlockId) -> Result<Option<u128>, RPCError> {
        // Only the header field we need is deserialized, some chains return blocks that don't fit
        // alloy's full block type.
        #[derive(Debug, Deserialize)]
        struct BlockFees {
            #[serde(rename = "baseFeePerGas")]
            base_fee_per_gas: Option<U256>,
        }

        let full_tx_objects = false;
        let block: Option<BlockFees> = self
            .inner
            .request("eth_getBlockByNumber", (block_id, full_tx_objects))
            .await
            .with_rpc_context(|| format!("Failed to get block for block id {block_id}"))?;

        let block = block.ok_or(RPCError::RequestError(RequestError::Other(format!(
            "Failed to get block for block id {block_id}: Block not found"
        ))))?;

        Ok(block
            .base_fee_per_gas
            .map(|fee| fee.saturating_to::<u128>()))
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn eth_get_balance(
        &self,
        block_id: BlockNumberOrTag,
        address: Address,
    ) -> Result<U256, RPCError> {
        self.inner
            .request("eth_getBalance", (address, block_id))
            .await
            .with_rpc_context(|| {
                format!("Failed to get balance for address {address}, block {block_id}")
            })
    }

    /// Executes a new message call immediately without creating a transaction on the blockchain.
    /// See https://ethereum.org/en/developers/docs/apis/json-rpc/#eth_call
    ///
    /// Returns the output data from the call or an error if the call failed. Use
    /// [`RPCError::is_revert`] to tell a reverted call apart from a failed request.
    #[instrument(level = "debug", skip(self, request))]
    pub async fn eth_call(
        &self,
        request: TransactionRequest,
        block: BlockNumberOrTag,
    ) -> Result<Bytes, RPCError> {
        self.inner
            .request("eth_call", (&request, block))
            .await
            .with_rpc_context(|| format!("Failed to send an eth_call request for block {block}"))
    }

    #[instrument(level = "debug", skip(self, request))]
    pub async fn eth_estimate_gas(&self, request: &TransactionRequest) -> Result<u64, RPCError> {
        let gas: U64 = self
            .inner
            .request("eth_estimateGas", (request,))
            .await
            .rpc_context("Failed to estimate gas")?;

        Ok(gas.to::<u64>())
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn eth_get_transaction_count(
        &self,
        address: Address,
        block_id: BlockNumberOrTag,
    ) -> Result<u64, RPCError> {
        let nonce: U64 = self
            .inner
            .request("eth_getTransactionCount", (address, block_id))
            .await
            .with_rpc_context(|| {
                format!("Failed to get transaction count for {address}, block {block_id}")
            })?;

        Ok(nonce.to::<u64>())
    }

    /// Broadcasts an EIP-2718 encoded signed transaction and returns its hash.
    #[instrument(level = "debug", skip(self, raw_tx))]
    pub async fn eth_send_raw_transaction(&self, raw_tx: Bytes) -> Result<B256, RPCError> {
        self.inner
            .request("eth_sendRawTransaction", (raw_tx,))
            .await
            .rpc_context("Failed to send raw transaction")
    }

    /// Returns the receipt of a mined transaction, `None` while it is still pending.
    #[instrument(level = "debug", skip(self))]
    pub async fn eth_get_transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<TxReceipt>, RPCError> {
        // Only the fields the engine reports are deserialized, so receipts of chains that extend
        // the receipt format (L2 fee fields, deposit receipts, ...) decode as well.
        #[derive(Debug, Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct ReceiptFields {
            transaction_hash: B256,
            block_number: Option<U64>,
            gas_used: U64,
            status: Option<U64>,
        }

        let receipt: Option<ReceiptFields> = self
            .inner
            .request("eth_getTransactionReceipt", (tx_hash,))
            .await
            .with_rpc_context(|| format!("Failed to get receipt for transaction {tx_hash}"))?;

        let Some(receipt) = receipt else {
            return Ok(None);
        };
        // Some nodes return a receipt skeleton for transactions that are not yet in a block.
        let Some(block_number) = receipt.block_number else {
            return Ok(None);
        };
        let status = receipt.status.ok_or_else(|| {
            RPCError::DecodeError(format!(
                "Receipt of {tx_hash} has no status field (pre-byzantium receipts are not supported)"
            ))
        })?;

        Ok(Some(TxReceipt {
            tx_hash: receipt.transaction_hash,
            block_number: block_number.to::<u64>(),
            gas_used: receipt.gas_used.to::<u64>(),
            success: status == U64::from(1),
        }))
    }
}
