use std::time::Duration;

use alloy::{
    eips::eip2718::Encodable2718,
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, TxHash},
    rpc::types::{BlockNumberOrTag, TransactionInput, TransactionRequest},
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use swap_common::{
    models::swap::{ContractCall, TxReceipt},
    traits::TransactionSubmitter,
    ChainCallError,
};
use tracing::{debug, info, instrument, trace};

use crate::{
    config::ChainConfig,
    gas::GasPrice,
    rpc::{errors::RPCError, EthereumRpcClient},
};

/// Signs transactions with a local key and broadcasts them through an [`EthereumRpcClient`].
///
/// Each submission reads the signer's `pending` nonce. Two submissions for the same signer that
/// race each other can get the same nonce; callers serialize requests per account.
#[derive(Clone)]
pub struct EthereumTransactionSubmitter {
    rpc: EthereumRpcClient,
    wallet: EthereumWallet,
    sender: Address,
    chain_id: u64,
    gas_price: Option<GasPrice>,
    poll_interval: Duration,
}

impl std::fmt::Debug for EthereumTransactionSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EthereumTransactionSubmitter")
            .field("sender", &self.sender)
            .field("chain_id", &self.chain_id)
            .field("gas_price", &self.gas_price)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl EthereumTransactionSubmitter {
    pub fn new(rpc: EthereumRpcClient, signer: PrivateKeySigner, chain: &ChainConfig) -> Self {
        let sender = signer.address();
        Self {
            rpc,
            wallet: EthereumWallet::from(signer),
            sender,
            chain_id: chain.chain_id,
            gas_price: chain.gas_price.clone(),
            poll_interval: chain.receipt_poll_interval(),
        }
    }

    /// Checks that the node serves the chain this submitter signs for. Signing for the wrong
    /// chain id would make every transaction invalid.
    pub async fn verify_chain_id(&self) -> Result<(), RPCError> {
        let node_chain_id = self.rpc.get_chain_id().await?;
        if node_chain_id != self.chain_id {
            return Err(RPCError::SetupError(format!(
                "Node at {} serves chain {node_chain_id}, expected {}",
                self.rpc.get_url(),
                self.chain_id
            )));
        }
        Ok(())
    }

    async fn build_request(&self, call: &ContractCall) -> Result<TransactionRequest, RPCError> {
        let request = TransactionRequest::default()
            .from(self.sender)
            .to(call.to)
            .value(call.value)
            .input(TransactionInput::both(call.data.clone()));

        let gas_limit = self
            .rpc
            .eth_estimate_gas(&request)
            .await?;
        let nonce = self
            .rpc
            .eth_get_transaction_count(self.sender, BlockNumberOrTag::Pending)
            .await?;
        let gas_price = match &self.gas_price {
            Some(price) => price.clone(),
            None => GasPrice::fetch(&self.rpc).await?,
        };
        trace!(gas_limit, nonce, ?gas_price, "Prepared transaction");

        Ok(gas_price.apply(
            request
                .with_chain_id(self.chain_id)
                .with_nonce(nonce)
                .with_gas_limit(gas_limit),
        ))
    }
}

#[async_trait]
impl TransactionSubmitter for EthereumTransactionSubmitter {
    fn sender(&self) -> Address {
        self.sender
    }

    #[instrument(level = "debug", skip(self, call), fields(to = %call.to, value = %call.value))]
    async fn submit(&self, call: ContractCall) -> Result<TxHash, ChainCallError> {
        let request = self.build_request(&call).await?;

        let envelope = request
            .build(&self.wallet)
            .await
            .map_err(|e| ChainCallError::Signing(e.to_string()))?;
        let raw_tx = envelope.encoded_2718();

        let tx_hash = self
            .rpc
            .eth_send_raw_transaction(raw_tx.into())
            .await?;
        info!(%tx_hash, to = %call.to, "Transaction submitted");
        Ok(tx_hash)
    }

    #[instrument(level = "debug", skip(self))]
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt, ChainCallError> {
        loop {
            if let Some(receipt) = self
                .rpc
                .eth_get_transaction_receipt(tx_hash)
                .await?
            {
                debug!(?receipt, "Transaction mined");
                return Ok(receipt);
            }
            trace!(%tx_hash, "Transaction pending");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
