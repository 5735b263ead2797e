pub mod config_wrapper;
pub mod contract_interaction;
pub mod timelock_transaction;
pub mod transaction_id;
