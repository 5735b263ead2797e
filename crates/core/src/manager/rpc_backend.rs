use super::backend::{SubmitError, TimelockBackend, TimelockSettings};
use crate::bindings::timelock::Timelock;
use crate::error::{Result, TimelockError};
use crate::types::{contract_interaction::ContractInteraction, transaction_id::TransactionId};
use alloy::network::{ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, B256, U256};
use alloy::providers::Provider;
use alloy::rpc::types::{BlockNumberOrTag, BlockTransactionsKind, TransactionRequest};
use alloy::transports::TransportError;
use async_trait::async_trait;
use log::{debug, info};

/// [`TimelockBackend`] over an alloy provider. Submissions need a provider
/// built with a wallet; reads work with any provider.
pub struct RpcTimelock<P> {
    timelock: Address,
    provider: P,
}

impl<P> RpcTimelock<P>
where
    P: Provider + Clone,
{
    pub fn new(timelock: Address, provider: P) -> Self {
        Self { timelock, provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

fn rpc_error(e: impl std::fmt::Display) -> TimelockError {
    TimelockError::Rpc(e.to_string())
}

fn to_u64(value: U256, field: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| TimelockError::Rpc(format!("{} does not fit in u64: {}", field, value)))
}

// Error responses from the node (failed gas estimation, reverts) are rejections
// and keep the node's message as is. Anything else means the request failed.
fn classify(err: TransportError) -> SubmitError {
    match err.as_error_resp() {
        Some(payload) => SubmitError::Reverted(payload.message.to_string()),
        None => SubmitError::Transport(err.to_string()),
    }
}

fn confirmed(tx_hash: B256, status: bool) -> Result<B256, SubmitError> {
    if !status {
        return Err(SubmitError::Reverted(format!(
            "transaction {} reverted",
            tx_hash
        )));
    }
    debug!("Transaction {} confirmed", tx_hash);
    Ok(tx_hash)
}

#[async_trait]
impl<P> TimelockBackend for RpcTimelock<P>
where
    P: Provider + Clone + Send + Sync + 'static,
{
    fn timelock(&self) -> Address {
        self.timelock
    }

    async fn latest_timestamp(&self) -> Result<u64> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest, BlockTransactionsKind::Hashes)
            .await
            .map_err(rpc_error)?
            .ok_or_else(|| TimelockError::Rpc("latest block not available".to_string()))?;
        Ok(block.header.timestamp)
    }

    async fn settings(&self) -> Result<TimelockSettings> {
        let timelock = Timelock::new(self.timelock, self.provider.clone());
        let delay = timelock.delay().call().await.map_err(rpc_error)?.delay;
        let grace_period = timelock
            .GRACE_PERIOD()
            .call()
            .await
            .map_err(rpc_error)?
            .gracePeriod;
        let minimum_delay = timelock
            .MINIMUM_DELAY()
            .call()
            .await
            .map_err(rpc_error)?
            .minimumDelay;
        let maximum_delay = timelock
            .MAXIMUM_DELAY()
            .call()
            .await
            .map_err(rpc_error)?
            .maximumDelay;

        Ok(TimelockSettings {
            delay: to_u64(delay, "delay")?,
            grace_period: to_u64(grace_period, "GRACE_PERIOD")?,
            minimum_delay: to_u64(minimum_delay, "MINIMUM_DELAY")?,
            maximum_delay: to_u64(maximum_delay, "MAXIMUM_DELAY")?,
        })
    }

    async fn admin(&self) -> Result<Address> {
        let timelock = Timelock::new(self.timelock, self.provider.clone());
        Ok(timelock.admin().call().await.map_err(rpc_error)?.admin)
    }

    async fn pending_admin(&self) -> Result<Address> {
        let timelock = Timelock::new(self.timelock, self.provider.clone());
        Ok(timelock
            .pendingAdmin()
            .call()
            .await
            .map_err(rpc_error)?
            .pendingAdmin)
    }

    async fn is_queued(&self, id: TransactionId) -> Result<bool> {
        let timelock = Timelock::new(self.timelock, self.provider.clone());
        Ok(timelock
            .queuedTransactions(id.as_b256())
            .call()
            .await
            .map_err(rpc_error)?
            .queued)
    }

    async fn submit(&self, interaction: &ContractInteraction) -> Result<B256, SubmitError> {
        let tx = TransactionRequest::default()
            .with_to(interaction.contract)
            .with_value(interaction.value)
            .with_input(interaction.data.clone());

        let pending = self.provider.send_transaction(tx).await.map_err(classify)?;
        let tx_hash = *pending.tx_hash();
        info!("Submitted transaction {}, waiting for receipt", tx_hash);

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        confirmed(tx_hash, receipt.status())
    }
}
