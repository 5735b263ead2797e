use crate::{actions::action::Action, bindings::timelock::Timelock};
use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolCall;
use serde_json::{Value, json};

/// First step of the admin hand-off, sent directly by the current admin.
pub struct SetPendingAdminAction {
    timelock: Address,
    pending_admin: Address,
}

impl SetPendingAdminAction {
    pub fn new(timelock: Address, pending_admin: Address) -> Self {
        Self {
            timelock,
            pending_admin,
        }
    }
}

impl Action for SetPendingAdminAction {
    fn target(&self) -> Address {
        self.timelock
    }

    fn data(&self) -> Bytes {
        Bytes::from(
            Timelock::setPendingAdminCall {
                newPendingAdmin: self.pending_admin,
            }
            .abi_encode(),
        )
    }

    fn describe(&self) -> Value {
        json!({
            "action": "SetPendingAdmin",
            "timelock": self.timelock.to_string(),
            "pending_admin": self.pending_admin.to_string(),
        })
    }
}

/// Second step, only valid when sent by the pending admin.
pub struct AcceptAdminAction {
    timelock: Address,
}

impl AcceptAdminAction {
    pub fn new(timelock: Address) -> Self {
        Self { timelock }
    }
}

impl Action for AcceptAdminAction {
    fn target(&self) -> Address {
        self.timelock
    }

    fn data(&self) -> Bytes {
        Bytes::from(Timelock::acceptAdminCall::new(()).abi_encode())
    }

    fn describe(&self) -> Value {
        json!({
            "action": "AcceptAdmin",
            "timelock": self.timelock.to_string(),
        })
    }
}
