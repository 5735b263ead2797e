pub mod contract_interface;
pub mod wallet;
