use crate::types::transaction_id::TransactionId;
use alloy::primitives::B256;
use thiserror::Error;

/// Every failure the ledger and lifecycle manager can surface.
///
/// `NotYetExecutable` and `Expired` are kept apart because the remedy differs:
/// wait and retry versus abandon (and purge) the entry.
#[derive(Debug, Error)]
pub enum TimelockError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("transaction rejected by timelock: {0}")]
    TransactionRejected(String),

    #[error("execution reverted: {0}")]
    ExecutionReverted(String),

    #[error("transaction {id} not found in {network} ledger")]
    NotFound { id: TransactionId, network: String },

    #[error("transaction {id} is not executable before {eta} (chain time {now})")]
    NotYetExecutable { id: TransactionId, eta: u64, now: u64 },

    #[error("transaction {id} expired at {expired_at} (chain time {now})")]
    Expired {
        id: TransactionId,
        expired_at: u64,
        now: u64,
    },

    #[error("transaction {0} is in the local ledger but not queued on-chain")]
    NotQueuedOnChain(TransactionId),

    #[error("unauthorized admin transition: {0}")]
    UnauthorizedTransition(String),

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("ledger io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ledger serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The chain accepted `tx_hash` but the ledger could not record it.
    #[error("transaction {id} landed in {tx_hash} but the ledger was not updated: {source}")]
    Persist {
        id: TransactionId,
        tx_hash: B256,
        #[source]
        source: Box<TimelockError>,
    },
}

pub type Result<T, E = TimelockError> = std::result::Result<T, E>;
