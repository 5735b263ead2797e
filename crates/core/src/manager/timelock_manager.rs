use super::backend::{SubmitError, TimelockBackend, TimelockSettings};
use crate::actions::{
    action::Action,
    admin_action::{AcceptAdminAction, SetPendingAdminAction},
    timelock_action::TimelockAction,
};
use crate::error::{Result, TimelockError};
use crate::ledger::Ledger;
use crate::types::{
    contract_interaction::ContractInteraction,
    timelock_transaction::{
        FunctionArg, TargetContract, TargetFunction, TimelockTransaction, TransactionStatus,
    },
    transaction_id::TransactionId,
};
use crate::utils::contract_interface::{ContractInterface, MASTER_CHEF, TIMELOCK};
use alloy::primitives::{Address, B256, U256};
use log::{debug, error, info, warn};

/// How a prepared call leaves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Sign with the local wallet, send, and wait for the receipt.
    Direct,
    /// Only produce the `(contract, calldata)` pair for a multisig.
    Multisig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Submitted(B256),
    Prepared(ContractInteraction),
}

/// A call to route through the timelock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueRequest {
    pub target_contract: TargetContract,
    pub target_function: TargetFunction,
    pub value: U256,
    pub eta: u64,
}

impl QueueRequest {
    /// Registers a new farm on the MasterChef.
    pub fn farms_add(
        master_chef: Address,
        allocation_points: u64,
        lp_token: Address,
        rewarder: Address,
        eta: u64,
    ) -> Self {
        Self {
            target_contract: TargetContract {
                name: MASTER_CHEF.to_string(),
                address: master_chef,
            },
            target_function: TargetFunction::new(
                "add",
                vec![allocation_points.into(), lp_token.into(), rewarder.into()],
            ),
            value: U256::ZERO,
            eta,
        }
    }

    /// Updates the allocation (and optionally the rewarder) of an existing farm.
    pub fn farms_set(
        master_chef: Address,
        pid: u64,
        allocation_points: u64,
        rewarder: Address,
        overwrite: bool,
        eta: u64,
    ) -> Self {
        Self {
            target_contract: TargetContract {
                name: MASTER_CHEF.to_string(),
                address: master_chef,
            },
            target_function: TargetFunction::new(
                "set",
                vec![
                    pid.into(),
                    allocation_points.into(),
                    rewarder.into(),
                    overwrite.into(),
                ],
            ),
            value: U256::ZERO,
            eta,
        }
    }

    /// Nominates a pending admin through the timelock itself.
    pub fn set_pending_admin(timelock: Address, pending_admin: Address, eta: u64) -> Self {
        Self {
            target_contract: TargetContract {
                name: TIMELOCK.to_string(),
                address: timelock,
            },
            target_function: TargetFunction::new(
                "setPendingAdmin",
                vec![FunctionArg::from(pending_admin)],
            ),
            value: U256::ZERO,
            eta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedTransaction {
    pub transaction: TimelockTransaction,
    /// The `queueTransaction` call on the timelock.
    pub interaction: ContractInteraction,
    /// Hash of the confirmed queue submission, `None` when prepared for a multisig.
    pub tx_hash: Option<B256>,
}

/// Drives timelocked calls through queue, wait and execute.
///
/// Holds no ledger state of its own: the per-network [`Ledger`] is passed into
/// every operation that reads or mutates it.
pub struct TimelockManager<B> {
    backend: B,
}

impl<B: TimelockBackend> TimelockManager<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn timelock(&self) -> Address {
        self.backend.timelock()
    }

    pub async fn now(&self) -> Result<u64> {
        self.backend.latest_timestamp().await
    }

    pub async fn settings(&self) -> Result<TimelockSettings> {
        self.backend.settings().await
    }

    pub async fn admin(&self) -> Result<Address> {
        self.backend.admin().await
    }

    pub async fn pending_admin(&self) -> Result<Address> {
        self.backend.pending_admin().await
    }

    /// Encodes the call, queues it on the timelock and records it in the ledger.
    ///
    /// Nothing is written to the ledger unless the submission succeeded (or, for
    /// a multisig, the pair was produced).
    pub async fn queue(
        &self,
        ledger: &mut Ledger,
        request: QueueRequest,
        submission: Submission,
    ) -> Result<QueuedTransaction> {
        let interface = ContractInterface::for_contract(&request.target_contract.name)?;
        let call = interface.encode(&request.target_function)?;

        let now = self.backend.latest_timestamp().await?;
        if request.eta <= now {
            return Err(TimelockError::Validation(format!(
                "eta {} is not in the future (chain time {})",
                request.eta, now
            )));
        }

        let settings = self.backend.settings().await?;
        if request.eta < now.saturating_add(settings.delay) {
            warn!(
                "eta {} is sooner than the current delay of {}s allows, the timelock will likely reject it",
                request.eta, settings.delay
            );
        } else if request.eta > now.saturating_add(settings.maximum_delay) {
            warn!(
                "eta {} is further out than the maximum delay of {}s",
                request.eta, settings.maximum_delay
            );
        }

        let action = TimelockAction::new(
            self.backend.timelock(),
            request.target_contract.address,
            request.value,
            call,
            request.eta,
        );
        let id = action.id();
        if ledger.contains(&id) {
            return Err(TimelockError::Validation(format!(
                "transaction {} is already queued in the {} ledger",
                id,
                ledger.network()
            )));
        }

        debug!("{}", action.describe());
        let interaction = action.interaction();
        let tx_hash = match submission {
            Submission::Direct => {
                let hash = self
                    .backend
                    .submit(&interaction)
                    .await
                    .map_err(|e| match e {
                        SubmitError::Reverted(reason) => TimelockError::TransactionRejected(reason),
                        SubmitError::Transport(reason) => TimelockError::Rpc(reason),
                    })?;
                Some(hash)
            }
            Submission::Multisig => None,
        };

        let transaction = TimelockTransaction {
            id,
            target_contract: request.target_contract,
            target_function: request.target_function,
            value: request.value,
            eta: request.eta,
            queued_at: Some(now),
            queue_tx_hash: tx_hash,
        };
        if let Err(e) = ledger.insert(transaction.clone()) {
            return Err(match tx_hash {
                Some(tx_hash) => Self::persist_error(&transaction, tx_hash, e),
                None => e,
            });
        }
        info!(
            "Queued {} on {} with eta {}: {}",
            transaction.target_function.identifier,
            transaction.target_contract.name,
            transaction.eta,
            id
        );

        Ok(QueuedTransaction {
            transaction,
            interaction,
            tx_hash,
        })
    }

    /// Executes a queued transaction and removes it from the ledger.
    pub async fn execute(&self, ledger: &mut Ledger, id: &TransactionId) -> Result<B256> {
        let action = self.executable_action(ledger, id).await?;
        debug!("{}", action.describe());

        let tx_hash = self
            .backend
            .submit(&action.interaction())
            .await
            .map_err(|e| match e {
                SubmitError::Reverted(reason) => TimelockError::ExecutionReverted(reason),
                SubmitError::Transport(reason) => TimelockError::Rpc(reason),
            })?;
        info!("Executed {} in {}", id, tx_hash);

        if let Err(e) = ledger.remove(id) {
            return Err(match ledger.get(id) {
                Some(transaction) => Self::persist_error(transaction, tx_hash, e),
                None => e,
            });
        }
        Ok(tx_hash)
    }

    /// Logs the whole entry so it can be reconciled by hand.
    fn persist_error(
        transaction: &TimelockTransaction,
        tx_hash: B256,
        source: TimelockError,
    ) -> TimelockError {
        let entry = serde_json::to_string(transaction)
            .unwrap_or_else(|e| format!("<unserializable entry: {e}>"));
        error!(
            "Ledger {} out of sync with chain after {}: {}",
            transaction.id, tx_hash, entry
        );
        TimelockError::Persist {
            id: transaction.id,
            tx_hash,
            source: Box::new(source),
        }
    }

    /// Same checks as [`Self::execute`], but returns the `executeTransaction`
    /// pair for a multisig. The ledger entry stays until the execution is seen.
    pub async fn prepare_execute(
        &self,
        ledger: &Ledger,
        id: &TransactionId,
    ) -> Result<ContractInteraction> {
        Ok(self.executable_action(ledger, id).await?.interaction())
    }

    async fn executable_action(&self, ledger: &Ledger, id: &TransactionId) -> Result<TimelockAction> {
        let transaction = ledger.get(id).ok_or_else(|| TimelockError::NotFound {
            id: *id,
            network: ledger.network().to_string(),
        })?;

        let mut action = self.timelock_action(transaction)?;
        if action.id() != *id {
            return Err(TimelockError::Validation(format!(
                "ledger entry {} re-derives to {}, refusing to execute",
                id,
                action.id()
            )));
        }

        let settings = self.backend.settings().await?;
        let now = self.backend.latest_timestamp().await?;
        match transaction.status(now, settings.grace_period) {
            TransactionStatus::Queued => {
                return Err(TimelockError::NotYetExecutable {
                    id: *id,
                    eta: transaction.eta,
                    now,
                });
            }
            TransactionStatus::Expired => {
                return Err(TimelockError::Expired {
                    id: *id,
                    expired_at: transaction.expires_at(settings.grace_period),
                    now,
                });
            }
            TransactionStatus::Executable | TransactionStatus::NotQueued => {}
        }

        if !self.backend.is_queued(*id).await? {
            return Err(TimelockError::NotQueuedOnChain(*id));
        }

        action.toggle_mode();
        Ok(action)
    }

    fn timelock_action(&self, transaction: &TimelockTransaction) -> Result<TimelockAction> {
        let interface = ContractInterface::for_contract(&transaction.target_contract.name)?;
        let call = interface.encode(&transaction.target_function)?;
        Ok(TimelockAction::new(
            self.backend.timelock(),
            transaction.target_contract.address,
            transaction.value,
            call,
            transaction.eta,
        ))
    }

    /// First hand-off step through the timelock, for a self-governed timelock.
    pub async fn queue_set_pending_admin(
        &self,
        ledger: &mut Ledger,
        pending_admin: Address,
        eta: u64,
        submission: Submission,
    ) -> Result<QueuedTransaction> {
        let request = QueueRequest::set_pending_admin(self.backend.timelock(), pending_admin, eta);
        self.queue(ledger, request, submission).await
    }

    /// First hand-off step sent directly by the current admin.
    pub async fn set_pending_admin(&self, pending_admin: Address) -> Result<B256> {
        let action = SetPendingAdminAction::new(self.backend.timelock(), pending_admin);
        debug!("{}", action.describe());
        let tx_hash = self
            .backend
            .submit(&action.interaction())
            .await
            .map_err(Self::admin_error)?;
        info!("Pending admin set to {} in {}", pending_admin, tx_hash);
        Ok(tx_hash)
    }

    /// The direct `setPendingAdmin` call for a multisig admin to send.
    pub fn prepare_set_pending_admin(&self, pending_admin: Address) -> ContractInteraction {
        SetPendingAdminAction::new(self.backend.timelock(), pending_admin).interaction()
    }

    /// Second hand-off step. The acceptor is a different identity than the
    /// current admin, so for a multisig only the pair is returned.
    pub async fn accept_admin(&self, submission: Submission) -> Result<SubmissionOutcome> {
        let interaction = AcceptAdminAction::new(self.backend.timelock()).interaction();
        match submission {
            Submission::Multisig => Ok(SubmissionOutcome::Prepared(interaction)),
            Submission::Direct => {
                let tx_hash = self
                    .backend
                    .submit(&interaction)
                    .await
                    .map_err(Self::admin_error)?;
                info!("Admin accepted in {}", tx_hash);
                Ok(SubmissionOutcome::Submitted(tx_hash))
            }
        }
    }

    fn admin_error(e: SubmitError) -> TimelockError {
        match e {
            SubmitError::Reverted(reason) => TimelockError::UnauthorizedTransition(reason),
            SubmitError::Transport(reason) => TimelockError::Rpc(reason),
        }
    }

    /// Ledger entries with their status at the current chain time.
    ///
    /// Executable entries are checked against `queuedTransactions`, so one
    /// executed through a multisig shows up as [`TransactionStatus::NotQueued`].
    pub async fn list(&self, ledger: &Ledger) -> Result<Vec<(TimelockTransaction, TransactionStatus)>> {
        let settings = self.backend.settings().await?;
        let now = self.backend.latest_timestamp().await?;

        let mut listed = Vec::with_capacity(ledger.len());
        for tx in ledger.iter() {
            let status = match tx.status(now, settings.grace_period) {
                TransactionStatus::Executable if !self.backend.is_queued(tx.id).await? => {
                    TransactionStatus::NotQueued
                }
                status => status,
            };
            listed.push((tx.clone(), status));
        }
        Ok(listed)
    }

    /// Explicitly drops one entry, whatever its status.
    pub fn purge(&self, ledger: &mut Ledger, id: &TransactionId) -> Result<TimelockTransaction> {
        ledger.remove(id)?.ok_or_else(|| TimelockError::NotFound {
            id: *id,
            network: ledger.network().to_string(),
        })
    }

    /// Drops every entry that can no longer execute: past its grace period,
    /// or past its eta without being queued on-chain.
    pub async fn purge_expired(&self, ledger: &mut Ledger) -> Result<Vec<TimelockTransaction>> {
        let expired = self
            .list(ledger)
            .await?
            .into_iter()
            .filter(|(_, status)| {
                matches!(status, TransactionStatus::Expired | TransactionStatus::NotQueued)
            })
            .map(|(tx, _)| tx.id)
            .collect::<Vec<_>>();

        let mut removed = Vec::with_capacity(expired.len());
        for id in expired {
            if let Some(tx) = ledger.remove(&id)? {
                removed.push(tx);
            }
        }
        Ok(removed)
    }
}
