use alloy::primitives::{Address, Bytes, U256};
use serde::Serialize;
use std::fmt;

/// A raw call ready for an external signer, typically a multisig wallet that
/// does not decode governance semantics itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractInteraction {
    pub contract: Address,
    pub value: U256,
    pub data: Bytes,
}

impl fmt::Display for ContractInteraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Contract: {}", self.contract.to_checksum(None))?;
        if !self.value.is_zero() {
            writeln!(f, "Value: {}", self.value)?;
        }
        write!(f, "Data: 0x{}", hex::encode(&self.data))
    }
}
