use super::transaction_id::TransactionId;
use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error};
use serde_json::{Number, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetContract {
    pub name: String,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetFunction {
    /// Function name (`add`) or full signature (`add(uint256,address,address)`).
    pub identifier: String,
    pub args: Vec<FunctionArg>,
}

impl TargetFunction {
    pub fn new(identifier: impl Into<String>, args: Vec<FunctionArg>) -> Self {
        Self {
            identifier: identifier.into(),
            args,
        }
    }
}

/// A single call argument in textual form, coerced against the declared
/// parameter type at encode time.
///
/// Older ledgers stored numeric arguments as JSON numbers, so those are accepted
/// too and normalized to their decimal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionArg(String);

impl FunctionArg {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FunctionArg {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FunctionArg {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<Address> for FunctionArg {
    fn from(addr: Address) -> Self {
        Self(addr.to_checksum(None))
    }
}

impl From<U256> for FunctionArg {
    fn from(v: U256) -> Self {
        Self(v.to_string())
    }
}

impl From<u64> for FunctionArg {
    fn from(v: u64) -> Self {
        Self(v.to_string())
    }
}

impl From<bool> for FunctionArg {
    fn from(v: bool) -> Self {
        Self(v.to_string())
    }
}

impl fmt::Display for FunctionArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for FunctionArg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for FunctionArg {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Self(s)),
            Value::Number(n) => Ok(Self(integral_text(&n))),
            Value::Bool(b) => Ok(Self(b.to_string())),
            other => Err(D::Error::custom(format!(
                "unsupported function argument: {other}"
            ))),
        }
    }
}

// Integers beyond u64 arrive as floats, e.g. `1e+21` or `100.0`. Whole
// floats are written out in full so they parse as integers.
fn integral_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 => format!("{:.0}", f),
        _ => n.to_string(),
    }
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => s.parse::<U256>().map_err(D::Error::custom),
        Value::Number(n) => integral_text(&n)
            .parse::<U256>()
            .map_err(|_| D::Error::custom(format!("invalid amount: {n}"))),
        other => Err(D::Error::custom(format!("invalid amount: {other}"))),
    }
}

/// A call queued on the timelock and not yet executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelockTransaction {
    /// Restored from the ledger key on load when an older entry omits it.
    #[serde(default)]
    pub id: TransactionId,
    pub target_contract: TargetContract,
    pub target_function: TargetFunction,
    #[serde(deserialize_with = "deserialize_amount")]
    pub value: U256,
    pub eta: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queued_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_tx_hash: Option<B256>,
}

impl TimelockTransaction {
    pub fn status(&self, now: u64, grace_period: u64) -> TransactionStatus {
        if now < self.eta {
            TransactionStatus::Queued
        } else if now <= self.expires_at(grace_period) {
            TransactionStatus::Executable
        } else {
            TransactionStatus::Expired
        }
    }

    pub fn expires_at(&self, grace_period: u64) -> u64 {
        self.eta.saturating_add(grace_period)
    }
}

/// Derived from ledger membership and chain time, never stored. An executed
/// transaction is simply no longer in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Queued,
    Executable,
    Expired,
    /// Past its eta but no longer flagged on-chain, typically executed
    /// outside this tool. Only a chain lookup can tell.
    NotQueued,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Queued => write!(f, "queued"),
            TransactionStatus::Executable => write!(f, "executable"),
            TransactionStatus::Expired => write!(f, "expired"),
            TransactionStatus::NotQueued => write!(f, "not queued on-chain"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use serde_json::json;

    #[test]
    fn test_loads_entry_without_optional_fields() {
        let tx: TimelockTransaction = serde_json::from_value(json!({
            "targetContract": {
                "name": "BeethovenxMasterChef",
                "address": "0x8166994d9ebBe5829EC86Bd81258149B87faCfd3"
            },
            "targetFunction": {
                "identifier": "add",
                "args": [100, "0x1111111111111111111111111111111111111111", "0x0000000000000000000000000000000000000000"]
            },
            "value": 0,
            "eta": 1650000000
        }))
        .unwrap();

        assert_eq!(tx.id, TransactionId::default());
        assert_eq!(tx.value, U256::ZERO);
        assert_eq!(tx.target_function.args[0].as_str(), "100");
        assert_eq!(
            tx.target_contract.address,
            address!("0x8166994d9ebBe5829EC86Bd81258149B87faCfd3")
        );
        assert!(tx.queued_at.is_none());
        assert!(tx.queue_tx_hash.is_none());
    }

    #[test]
    fn test_status_windows() {
        let tx = TimelockTransaction {
            id: TransactionId::default(),
            target_contract: TargetContract {
                name: "Timelock".to_string(),
                address: Address::ZERO,
            },
            target_function: TargetFunction::new("acceptAdmin", vec![]),
            value: U256::ZERO,
            eta: 1_000,
            queued_at: None,
            queue_tx_hash: None,
        };
        assert_eq!(tx.status(999, 100), TransactionStatus::Queued);
        assert_eq!(tx.status(1_000, 100), TransactionStatus::Executable);
        assert_eq!(tx.status(1_100, 100), TransactionStatus::Executable);
        assert_eq!(tx.status(1_101, 100), TransactionStatus::Expired);
    }

    #[test]
    fn test_amount_accepts_decimal_and_hex_strings() {
        let decimal: U256 =
            deserialize_amount(&mut serde_json::Deserializer::from_str("\"1000\"")).unwrap();
        let hex: U256 =
            deserialize_amount(&mut serde_json::Deserializer::from_str("\"0x3e8\"")).unwrap();
        assert_eq!(decimal, U256::from(1000));
        assert_eq!(hex, decimal);
    }

    #[test]
    fn test_amount_accepts_large_and_whole_float_numbers() {
        let amount = |raw: &str| deserialize_amount(&mut serde_json::Deserializer::from_str(raw));

        assert_eq!(amount("1000").unwrap(), U256::from(1000));
        assert_eq!(amount("100.0").unwrap(), U256::from(100));
        assert_eq!(
            amount("1e18").unwrap(),
            U256::from(1_000_000_000_000_000_000u128)
        );
        // Above u64::MAX, serde_json only keeps a float.
        assert_eq!(
            amount("10000000000000000000000").unwrap(),
            U256::from(10_000_000_000_000_000_000_000u128)
        );
        assert!(amount("1.5").is_err());
        assert!(amount("-1").is_err());
    }

    #[test]
    fn test_numeric_arg_keeps_whole_floats_integral() {
        let args: Vec<FunctionArg> = serde_json::from_str("[1e21, -5, 2.5]").unwrap();
        assert_eq!(args[0].as_str(), "1000000000000000000000");
        assert_eq!(args[1].as_str(), "-5");
        assert_eq!(args[2].as_str(), "2.5");
    }
}
