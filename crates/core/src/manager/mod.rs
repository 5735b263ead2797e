pub mod backend;
#[cfg(test)]
pub mod mock;
pub mod rpc_backend;
pub mod timelock_manager;
