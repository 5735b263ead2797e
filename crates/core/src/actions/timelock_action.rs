use crate::{
    actions::action::Action, bindings::timelock::Timelock,
    types::transaction_id::TransactionId, utils::contract_interface::EncodedCall,
};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Queue,
    Execute,
}

/// A call routed through the timelock. The same tuple is used for both the
/// queue and the execute step, so the contract-side hash check lines up.
pub struct TimelockAction {
    mode: Mode,
    timelock: Address,
    target: Address,
    value: U256,
    call: EncodedCall,
    eta: u64,
}

impl TimelockAction {
    pub fn new(timelock: Address, target: Address, value: U256, call: EncodedCall, eta: u64) -> Self {
        Self {
            mode: Mode::Queue,
            timelock,
            target,
            value,
            call,
            eta,
        }
    }

    pub fn toggle_mode(&mut self) {
        match self.mode {
            Mode::Queue => self.mode = Mode::Execute,
            Mode::Execute => self.mode = Mode::Queue,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn id(&self) -> TransactionId {
        TransactionId::derive(
            self.target,
            self.value,
            &self.call.signature,
            &self.call.args,
            self.eta,
        )
    }
}

impl Action for TimelockAction {
    fn target(&self) -> Address {
        self.timelock
    }

    // executeTransaction is payable and forwards the attached value to the target.
    fn value(&self) -> U256 {
        match self.mode {
            Mode::Queue => U256::ZERO,
            Mode::Execute => self.value,
        }
    }

    fn data(&self) -> Bytes {
        let target = self.target;
        let value = self.value;
        let signature = self.call.signature.clone();
        let data = self.call.args.clone();
        let eta = U256::from(self.eta);
        let tx_data = match self.mode {
            Mode::Queue => Timelock::queueTransactionCall {
                target,
                value,
                signature,
                data,
                eta,
            }
            .abi_encode(),
            Mode::Execute => Timelock::executeTransactionCall {
                target,
                value,
                signature,
                data,
                eta,
            }
            .abi_encode(),
        };

        Bytes::from(tx_data)
    }

    fn describe(&self) -> Value {
        let action = match self.mode {
            Mode::Queue => "QueueTransaction",
            Mode::Execute => "ExecuteTransaction",
        };
        json!({
            "action": action,
            "timelock": self.timelock.to_string(),
            "id": self.id().to_string(),
            "target": self.target.to_string(),
            "value": self.value.to_string(),
            "signature": self.call.signature,
            "data": self.call.args.to_string(),
            "eta": self.eta,
        })
    }
}
