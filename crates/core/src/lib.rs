pub mod actions;
pub mod bindings;
pub mod commands;
pub mod error;
pub mod ledger;
pub mod manager;
pub mod types;
pub mod utils;

pub use error::{Result, TimelockError};
pub use ledger::Ledger;
pub use manager::{
    backend::{TimelockBackend, TimelockSettings},
    rpc_backend::RpcTimelock,
    timelock_manager::{
        QueueRequest, QueuedTransaction, Submission, SubmissionOutcome, TimelockManager,
    },
};
pub use types::{
    config_wrapper::ConfigWrapper,
    contract_interaction::ContractInteraction,
    timelock_transaction::{TimelockTransaction, TransactionStatus},
    transaction_id::TransactionId,
};
pub use utils::wallet::{HardwareWalletType, load_wallet};
