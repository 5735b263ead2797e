use crate::bindings::{master_chef::BeethovenxMasterChef, timelock::Timelock};
use crate::error::{Result, TimelockError};
use crate::types::timelock_transaction::TargetFunction;
use alloy::dyn_abi::{DynSolValue, JsonAbiExt, Specifier};
use alloy::json_abi::Function;
use alloy::primitives::{Bytes, Selector};
use alloy::sol_types::SolCall;

pub const TIMELOCK: &str = "Timelock";
pub const MASTER_CHEF: &str = "BeethovenxMasterChef";

/// A call encoded in the split form the timelock expects: the canonical
/// signature plus the ABI-encoded arguments without the selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCall {
    pub signature: String,
    pub selector: Selector,
    pub args: Bytes,
}

impl EncodedCall {
    /// Full calldata as the target contract receives it.
    pub fn calldata(&self) -> Bytes {
        [self.selector.as_slice(), &self.args[..]].concat().into()
    }
}

/// Callable functions of one of the contracts governed by the timelock.
pub struct ContractInterface {
    name: String,
    functions: Vec<Function>,
}

impl ContractInterface {
    pub fn from_signatures(name: &str, signatures: &[&str]) -> Result<Self> {
        let functions = signatures
            .iter()
            .map(|s| {
                Function::parse(s).map_err(|e| {
                    TimelockError::Validation(format!("invalid signature {s} for {name}: {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: name.to_string(),
            functions,
        })
    }

    /// Interface of a known contract by its logical name.
    pub fn for_contract(name: &str) -> Result<Self> {
        match name {
            TIMELOCK => Self::from_signatures(
                name,
                &[
                    Timelock::setPendingAdminCall::SIGNATURE,
                    Timelock::acceptAdminCall::SIGNATURE,
                    Timelock::setDelayCall::SIGNATURE,
                ],
            ),
            MASTER_CHEF => Self::from_signatures(
                name,
                &[
                    BeethovenxMasterChef::addCall::SIGNATURE,
                    BeethovenxMasterChef::setCall::SIGNATURE,
                ],
            ),
            other => Err(TimelockError::Validation(format!(
                "unknown contract {other}"
            ))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolves a function by name or by full signature. A bare name matching
    /// several overloads is ambiguous.
    pub fn function(&self, identifier: &str) -> Result<&Function> {
        let mut matches = self
            .functions
            .iter()
            .filter(|f| f.name == identifier || f.signature() == identifier);
        let function = matches.next().ok_or_else(|| {
            TimelockError::Validation(format!("{} has no function {}", self.name, identifier))
        })?;
        if matches.next().is_some() {
            return Err(TimelockError::Validation(format!(
                "{} is overloaded on {}, use the full signature",
                identifier, self.name
            )));
        }
        Ok(function)
    }

    pub fn encode(&self, target_function: &TargetFunction) -> Result<EncodedCall> {
        let function = self.function(&target_function.identifier)?;

        if function.inputs.len() != target_function.args.len() {
            return Err(TimelockError::Validation(format!(
                "{} expects {} argument(s), got {}",
                function.signature(),
                function.inputs.len(),
                target_function.args.len()
            )));
        }

        let values = function
            .inputs
            .iter()
            .zip(target_function.args.iter())
            .map(|(param, arg)| {
                let ty = param.resolve().map_err(|e| {
                    TimelockError::Validation(format!("unsupported parameter {}: {e}", param.name))
                })?;
                ty.coerce_str(arg.as_str()).map_err(|e| {
                    TimelockError::Validation(format!(
                        "invalid value {} for {} {}: {e}",
                        arg, param.ty, param.name
                    ))
                })
            })
            .collect::<Result<Vec<DynSolValue>>>()?;

        let args = function
            .abi_encode_input_raw(&values)
            .map_err(|e| TimelockError::Validation(format!("failed to encode call: {e}")))?;

        Ok(EncodedCall {
            signature: function.signature(),
            selector: function.selector(),
            args: args.into(),
        })
    }
}
