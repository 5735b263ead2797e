use crate::error::Result;
use crate::types::{contract_interaction::ContractInteraction, transaction_id::TransactionId};
use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

/// Governance delay parameters, always read live from the timelock since they
/// can change between queue and execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelockSettings {
    pub delay: u64,
    pub grace_period: u64,
    pub minimum_delay: u64,
    pub maximum_delay: u64,
}

/// Why a submitted call did not land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The node or the contract refused the call; carries the reason verbatim.
    Reverted(String),
    /// The call never got an answer.
    Transport(String),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Reverted(reason) => write!(f, "{}", reason),
            SubmitError::Transport(reason) => write!(f, "transport error: {}", reason),
        }
    }
}

/// The chain as seen by the lifecycle manager: one timelock contract, the
/// chain clock, and a way to send raw calls.
#[async_trait]
pub trait TimelockBackend: Send + Sync {
    fn timelock(&self) -> Address;

    /// Timestamp of the latest block, the clock the contract itself checks against.
    async fn latest_timestamp(&self) -> Result<u64>;

    async fn settings(&self) -> Result<TimelockSettings>;

    async fn admin(&self) -> Result<Address>;

    async fn pending_admin(&self) -> Result<Address>;

    async fn is_queued(&self, id: TransactionId) -> Result<bool>;

    /// Signs, sends and waits for the receipt. Returns the confirming hash.
    async fn submit(&self, interaction: &ContractInteraction) -> Result<B256, SubmitError>;
}
