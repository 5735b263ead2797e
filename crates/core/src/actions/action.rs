use crate::types::contract_interaction::ContractInteraction;
use alloy::primitives::{Address, Bytes, U256};
use serde_json::Value;

pub trait Action: Send + Sync {
    fn target(&self) -> Address;
    fn value(&self) -> U256 {
        U256::ZERO
    }
    fn data(&self) -> Bytes; // encode to tx data
    fn describe(&self) -> Value;

    fn interaction(&self) -> ContractInteraction {
        ContractInteraction {
            contract: self.target(),
            value: self.value(),
            data: self.data(),
        }
    }
}
