pub mod master_chef;
pub mod timelock;
