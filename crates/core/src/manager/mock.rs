use super::backend::{SubmitError, TimelockBackend, TimelockSettings};
use crate::bindings::{master_chef::BeethovenxMasterChef, timelock::Timelock};
use crate::error::Result;
use crate::types::{contract_interaction::ContractInteraction, transaction_id::TransactionId};
use alloy::primitives::{Address, B256, U256, address, keccak256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

pub const TIMELOCK: Address = address!("0x2222222222222222222222222222222222222222");
pub const MASTER_CHEF: Address = address!("0x8166994d9ebBe5829EC86Bd81258149B87faCfd3");
pub const ADMIN: Address = address!("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");

pub const DELAY: u64 = 6 * 3600;
pub const GRACE_PERIOD: u64 = 14 * 86_400;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Farm {
    pub alloc_point: U256,
    pub lp_token: Address,
    pub rewarder: Address,
}

#[derive(Clone)]
struct ChainState {
    now: u64,
    sender: Address,
    admin: Address,
    pending_admin: Address,
    delay: u64,
    grace_period: u64,
    queued: HashSet<TransactionId>,
    farms: Vec<Farm>,
    submissions: usize,
}

/// In-memory Compound timelock owning a MasterChef, with a settable clock and
/// sender. Enforces the same checks and revert messages as the contracts.
pub struct MockTimelock {
    state: Mutex<ChainState>,
}

fn require(condition: bool, reason: &str) -> Result<(), String> {
    if condition {
        Ok(())
    } else {
        Err(reason.to_string())
    }
}

impl MockTimelock {
    pub fn new(now: u64) -> Self {
        Self {
            state: Mutex::new(ChainState {
                now,
                sender: ADMIN,
                admin: ADMIN,
                pending_admin: Address::ZERO,
                delay: DELAY,
                grace_period: GRACE_PERIOD,
                queued: HashSet::new(),
                farms: Vec::new(),
                submissions: 0,
            }),
        }
    }

    pub fn set_sender(&self, sender: Address) {
        self.state.lock().unwrap().sender = sender;
    }

    pub fn advance_to(&self, timestamp: u64) {
        self.state.lock().unwrap().now = timestamp;
    }

    pub fn set_grace_period(&self, grace_period: u64) {
        self.state.lock().unwrap().grace_period = grace_period;
    }

    pub fn farms(&self) -> Vec<Farm> {
        self.state.lock().unwrap().farms.clone()
    }

    pub fn submissions(&self) -> usize {
        self.state.lock().unwrap().submissions
    }

    pub fn queue_directly(&self, id: TransactionId) {
        self.state.lock().unwrap().queued.insert(id);
    }

    fn dispatch(
        state: &mut ChainState,
        sender: Address,
        to: Address,
        data: &[u8],
    ) -> Result<(), String> {
        if data.len() < 4 {
            return Err("missing selector".to_string());
        }
        let selector: [u8; 4] = [data[0], data[1], data[2], data[3]];
        let decode_err = |e: alloy::sol_types::Error| e.to_string();

        if to == TIMELOCK {
            if selector == Timelock::queueTransactionCall::SELECTOR {
                let call = Timelock::queueTransactionCall::abi_decode(data, true).map_err(decode_err)?;
                require(
                    sender == state.admin,
                    "Timelock::queueTransaction: Call must come from admin.",
                )?;
                require(
                    call.eta >= U256::from(state.now + state.delay),
                    "Timelock::queueTransaction: Estimated execution block must satisfy delay.",
                )?;
                let eta = u64::try_from(call.eta).map_err(|e| e.to_string())?;
                state.queued.insert(TransactionId::derive(
                    call.target,
                    call.value,
                    &call.signature,
                    &call.data,
                    eta,
                ));
                Ok(())
            } else if selector == Timelock::executeTransactionCall::SELECTOR {
                let call =
                    Timelock::executeTransactionCall::abi_decode(data, true).map_err(decode_err)?;
                require(
                    sender == state.admin,
                    "Timelock::executeTransaction: Call must come from admin.",
                )?;
                let eta = u64::try_from(call.eta).map_err(|e| e.to_string())?;
                let id = TransactionId::derive(
                    call.target,
                    call.value,
                    &call.signature,
                    &call.data,
                    eta,
                );
                require(
                    state.queued.contains(&id),
                    "Timelock::executeTransaction: Transaction hasn't been queued.",
                )?;
                require(
                    state.now >= eta,
                    "Timelock::executeTransaction: Transaction hasn't surpassed time lock.",
                )?;
                require(
                    state.now <= eta + state.grace_period,
                    "Timelock::executeTransaction: Transaction is stale.",
                )?;
                state.queued.remove(&id);

                let inner = [
                    &keccak256(call.signature.as_bytes())[..4],
                    &call.data[..],
                ]
                .concat();
                Self::dispatch(state, TIMELOCK, call.target, &inner).map_err(|_| {
                    "Timelock::executeTransaction: Transaction execution reverted.".to_string()
                })
            } else if selector == Timelock::setPendingAdminCall::SELECTOR {
                let call = Timelock::setPendingAdminCall::abi_decode(data, true).map_err(decode_err)?;
                require(
                    sender == TIMELOCK || sender == state.admin,
                    "Timelock::setPendingAdmin: Call must come from Timelock.",
                )?;
                state.pending_admin = call.newPendingAdmin;
                Ok(())
            } else if selector == Timelock::acceptAdminCall::SELECTOR {
                require(
                    state.pending_admin != Address::ZERO && sender == state.pending_admin,
                    "Timelock::acceptAdmin: Call must come from pendingAdmin.",
                )?;
                state.admin = state.pending_admin;
                state.pending_admin = Address::ZERO;
                Ok(())
            } else {
                Err("unknown timelock function".to_string())
            }
        } else if to == MASTER_CHEF {
            require(sender == TIMELOCK, "Ownable: caller is not the owner")?;
            if selector == BeethovenxMasterChef::addCall::SELECTOR {
                let call = BeethovenxMasterChef::addCall::abi_decode(data, true).map_err(decode_err)?;
                state.farms.push(Farm {
                    alloc_point: call.allocPoint,
                    lp_token: call.lpToken,
                    rewarder: call.rewarder,
                });
                Ok(())
            } else if selector == BeethovenxMasterChef::setCall::SELECTOR {
                let call = BeethovenxMasterChef::setCall::abi_decode(data, true).map_err(decode_err)?;
                let pid = usize::try_from(call.pid).map_err(|e| e.to_string())?;
                let farm = state.farms.get_mut(pid).ok_or("invalid pid")?;
                farm.alloc_point = call.allocPoint;
                if call.overwrite {
                    farm.rewarder = call.rewarder;
                }
                Ok(())
            } else {
                Err("unknown master chef function".to_string())
            }
        } else {
            Err("call to non-contract".to_string())
        }
    }
}

#[async_trait]
impl TimelockBackend for MockTimelock {
    fn timelock(&self) -> Address {
        TIMELOCK
    }

    async fn latest_timestamp(&self) -> Result<u64> {
        Ok(self.state.lock().unwrap().now)
    }

    async fn settings(&self) -> Result<TimelockSettings> {
        let state = self.state.lock().unwrap();
        Ok(TimelockSettings {
            delay: state.delay,
            grace_period: state.grace_period,
            minimum_delay: 6 * 3600,
            maximum_delay: 30 * 86_400,
        })
    }

    async fn admin(&self) -> Result<Address> {
        Ok(self.state.lock().unwrap().admin)
    }

    async fn pending_admin(&self) -> Result<Address> {
        Ok(self.state.lock().unwrap().pending_admin)
    }

    async fn is_queued(&self, id: TransactionId) -> Result<bool> {
        Ok(self.state.lock().unwrap().queued.contains(&id))
    }

    async fn submit(&self, interaction: &ContractInteraction) -> Result<B256, SubmitError> {
        let mut state = self.state.lock().unwrap();
        let sender = state.sender;
        // A revert undoes every state change of the call.
        let snapshot = state.clone();
        if let Err(reason) = Self::dispatch(&mut state, sender, interaction.contract, &interaction.data) {
            *state = snapshot;
            return Err(SubmitError::Reverted(reason));
        }
        state.submissions += 1;
        Ok(keccak256(state.submissions.to_be_bytes()))
    }
}
