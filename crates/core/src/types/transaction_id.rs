use crate::error::TimelockError;
use alloy::primitives::{Address, B256, Bytes, U256, keccak256};
use alloy::sol_types::{SolType, sol_data};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error};
use std::fmt;
use std::str::FromStr;

// abi.encode(target, value, signature, data, eta), as hashed by the timelock contract.
type QueuedCallParams = (
    sol_data::Address,
    sol_data::Uint<256>,
    sol_data::String,
    sol_data::Bytes,
    sol_data::Uint<256>,
);

/// Fingerprint of a timelocked call.
///
/// This is the same hash the timelock stores in `queuedTransactions`, so the id
/// computed locally at queue time is the key the contract checks at execute time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TransactionId(B256);

impl TransactionId {
    pub fn derive(target: Address, value: U256, signature: &str, data: &Bytes, eta: u64) -> Self {
        let encoded = QueuedCallParams::abi_encode_params(&(
            target,
            value,
            signature.to_string(),
            data.clone(),
            U256::from(eta),
        ));
        Self(keccak256(encoded))
    }

    pub fn as_b256(&self) -> B256 {
        self.0
    }
}

impl From<B256> for TransactionId {
    fn from(hash: B256) -> Self {
        Self(hash)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for TransactionId {
    type Err = TimelockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        B256::from_str(s.trim())
            .map(Self)
            .map_err(|e| TimelockError::Validation(format!("invalid transaction id {s}: {e}")))
    }
}

// Serialized as a plain hex string so it can be used as a JSON object key.
impl Serialize for TransactionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TransactionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
