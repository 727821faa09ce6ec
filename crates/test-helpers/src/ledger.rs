//! In-process ledger for tests.

use crate::fixtures::{gas_coin, REFERENCE_GAS_PRICE};
use crate::interpreter::{Execution, WorldState};
use async_trait::async_trait;
use kiosk_provisioner_core::{GasPayment, LedgerClient, LedgerError, ResponseOptions};
use kiosk_provisioner_types::{
    transaction_signing_digest, Command, ExecutionStatus, ObjectChange, ObjectId, Owner,
    PackageId, SignedTransaction, StructTag, SuiAddress, TransactionData, TransactionDigest,
    TransactionEffectsReport,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// What happened at a tick of the ledger's logical clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerEventKind {
    /// A transaction was accepted for execution.
    Submitted,
    /// Finality of a transaction was reported to a caller.
    Confirmed,
}

/// One entry in the ledger's event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEvent {
    pub tick: u64,
    pub kind: LedgerEventKind,
    pub digest: TransactionDigest,
    /// `publish` or the target of the transaction's first move call.
    pub label: String,
}

/// Misbehaviour injected into one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Report a failure status without applying any change.
    FailStatus(String),
    /// Fail the call without executing.
    Transport(String),
    /// Omit the created `Publisher` from the report.
    DropPublisher,
    /// Omit the `published` change from the report.
    DropPublished,
    /// Omit the created `TransferPolicyCap` from the report.
    DropPolicyCap,
    /// Omit every `mutated` change from the report.
    DropMutations,
    /// Never report finality for this transaction.
    StallFinality,
}

/// Pauses one ledger call until released.
#[derive(Debug, Default)]
pub struct PauseGate {
    entered: Notify,
    release: Notify,
}

impl PauseGate {
    /// Resolves once the paused call has reached the gate.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let the paused call continue.
    pub fn release(&self) {
        self.release.notify_one();
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

#[derive(Default)]
struct LedgerState {
    world: WorldState,
    executed: HashMap<TransactionDigest, (TransactionEffectsReport, String)>,
    stalled: HashSet<TransactionDigest>,
    faults: HashMap<usize, Fault>,
    execute_gate: Option<Arc<PauseGate>>,
    finality_gate: Option<Arc<PauseGate>>,
    /// Gas balance of every sender; unlimited when `None`.
    gas_balance: Option<u64>,
    last_submission: Option<TransactionData>,
    clock: u64,
    events: Vec<LedgerEvent>,
}

impl LedgerState {
    fn record(&mut self, kind: LedgerEventKind, digest: TransactionDigest, label: String) {
        self.clock += 1;
        self.events.push(LedgerEvent {
            tick: self.clock,
            kind,
            digest,
            label,
        });
    }
}

/// A ledger that executes provisioning transactions in memory.
///
/// Transactions are checked the way a full node would: the signature must
/// come from the sender, object inputs must match the live version and be
/// owned by the sender, and every created object must end up transferred or
/// shared. Effects are reported with the same four change kinds a real node
/// reports.
///
/// Every sender owns one gas coin, [`gas_coin`], priced at
/// [`REFERENCE_GAS_PRICE`]. Gas is never charged, but a transaction without
/// gas payment is refused.
///
/// Submissions are numbered from zero in call order; [`FakeLedger::inject_fault`]
/// targets one of them.
#[derive(Default)]
pub struct FakeLedger {
    state: Mutex<LedgerState>,
    execute_calls: AtomicUsize,
    finality_calls: AtomicUsize,
    gas_selections: AtomicUsize,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `fault` to the `submission`-th call of `execute_transaction`.
    pub fn inject_fault(&self, submission: usize, fault: Fault) {
        self.state.lock().faults.insert(submission, fault);
    }

    /// Hold the next `execute_transaction` call until the gate is released.
    pub fn pause_next_execution(&self) -> Arc<PauseGate> {
        let gate = Arc::new(PauseGate::default());
        self.state.lock().execute_gate = Some(gate.clone());
        gate
    }

    /// Hold the next `wait_for_finality` call until the gate is released.
    pub fn pause_next_finality(&self) -> Arc<PauseGate> {
        let gate = Arc::new(PauseGate::default());
        self.state.lock().finality_gate = Some(gate.clone());
        gate
    }

    /// Limit the gas balance of every sender.
    pub fn set_gas_balance(&self, balance: u64) {
        self.state.lock().gas_balance = Some(balance);
    }

    /// Number of `select_gas` calls.
    pub fn gas_selections(&self) -> usize {
        self.gas_selections.load(Ordering::SeqCst)
    }

    /// Transaction data of the latest `execute_transaction` call.
    pub fn last_submission(&self) -> Option<TransactionData> {
        self.state.lock().last_submission.clone()
    }

    /// Number of `execute_transaction` calls, including failed ones.
    pub fn execute_calls(&self) -> usize {
        self.execute_calls.load(Ordering::SeqCst)
    }

    /// Number of `wait_for_finality` calls.
    pub fn finality_calls(&self) -> usize {
        self.finality_calls.load(Ordering::SeqCst)
    }

    /// Full event log, in tick order.
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.state.lock().events.clone()
    }

    /// Submitted events only.
    pub fn submissions(&self) -> Vec<LedgerEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.kind == LedgerEventKind::Submitted)
            .collect()
    }

    /// Tick of the first event of `kind` whose label is `label`.
    pub fn first_tick(&self, kind: LedgerEventKind, label: &str) -> Option<u64> {
        self.state
            .lock()
            .events
            .iter()
            .find(|event| event.kind == kind && event.label == label)
            .map(|event| event.tick)
    }

    /// Current owner of an object.
    pub fn owner_of(&self, id: &ObjectId) -> Option<Owner> {
        self.state.lock().world.objects.get(id).map(|live| live.owner)
    }

    /// Type of a live object.
    pub fn type_of(&self, id: &ObjectId) -> Option<StructTag> {
        self.state
            .lock()
            .world
            .objects
            .get(id)
            .map(|live| live.object_type.clone())
    }

    /// Whether a package has been published.
    pub fn has_package(&self, id: &PackageId) -> bool {
        self.state.lock().world.packages.contains(id)
    }
}

fn describe(commands: &[Command]) -> String {
    commands
        .iter()
        .find_map(|command| match command {
            Command::Publish(..) => Some("publish".to_string()),
            Command::MoveCall(call) => Some(call.target()),
            Command::TransferObjects(..) => None,
        })
        .unwrap_or_else(|| "transfer".to_string())
}

fn verify_signatures(transaction: &SignedTransaction) -> Result<(), LedgerError> {
    let message = transaction_signing_digest(&transaction.data.to_bytes());
    let signed_by_sender = transaction.signatures.iter().any(|signature| {
        signature.public_key().to_address() == transaction.data.sender
            && signature.public_key().verify(message.as_bytes(), signature)
    });
    if signed_by_sender {
        Ok(())
    } else {
        Err(LedgerError::Rejected {
            code: -32002,
            message: "Transaction is not signed by its sender".to_string(),
        })
    }
}

fn verify_gas(data: &TransactionData) -> Result<(), LedgerError> {
    if data.has_gas() {
        Ok(())
    } else {
        Err(LedgerError::Rejected {
            code: -32602,
            message: "Transaction has no gas payment".to_string(),
        })
    }
}

fn apply_report_fault(fault: &Fault, changes: &mut Vec<ObjectChange>) {
    changes.retain(|change| match (fault, change) {
        (Fault::DropPublished, ObjectChange::Published { .. }) => false,
        (Fault::DropPublisher, ObjectChange::Created { object_type, .. }) => {
            !object_type.is_named(PackageId::SUI_FRAMEWORK, "package", "Publisher")
        }
        (Fault::DropPolicyCap, ObjectChange::Created { object_type, .. }) => {
            !object_type.is_named(PackageId::SUI_FRAMEWORK, "transfer_policy", "TransferPolicyCap")
        }
        (Fault::DropMutations, ObjectChange::Mutated { .. }) => false,
        _ => true,
    });
}

#[async_trait]
impl LedgerClient for FakeLedger {
    async fn select_gas(&self, owner: SuiAddress, budget: u64) -> Result<GasPayment, LedgerError> {
        self.gas_selections.fetch_add(1, Ordering::SeqCst);
        if let Some(balance) = self.state.lock().gas_balance {
            if balance < budget {
                return Err(LedgerError::InsufficientGas {
                    owner,
                    budget,
                    balance,
                });
            }
        }
        Ok(GasPayment::new(vec![gas_coin(owner)], REFERENCE_GAS_PRICE))
    }

    async fn execute_transaction(
        &self,
        transaction: &SignedTransaction,
        options: ResponseOptions,
    ) -> Result<TransactionEffectsReport, LedgerError> {
        let submission = self.execute_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.state.lock().execute_gate.take();
        if let Some(gate) = gate {
            gate.pass().await;
        }

        let mut state = self.state.lock();
        let fault = state.faults.remove(&submission);
        if let Some(Fault::Transport(message)) = &fault {
            return Err(LedgerError::Transport(message.clone()));
        }
        state.last_submission = Some(transaction.data.clone());
        verify_signatures(transaction)?;
        verify_gas(&transaction.data)?;

        let digest = transaction.digest();
        if let Some((report, _)) = state.executed.get(&digest) {
            return Ok(report.clone());
        }

        let label = describe(transaction.data.commands());
        state.record(LedgerEventKind::Submitted, digest, label.clone());

        let mut report = match &fault {
            Some(Fault::FailStatus(error)) => TransactionEffectsReport::new(
                digest,
                ExecutionStatus::Failure {
                    error: error.clone(),
                },
                vec![],
            ),
            _ => match Execution::run(&state.world, &transaction.data, digest) {
                Ok(outcome) => {
                    let changes = outcome.commit(&mut state.world);
                    TransactionEffectsReport::new(digest, ExecutionStatus::Success, changes)
                }
                Err(error) => {
                    TransactionEffectsReport::new(digest, ExecutionStatus::Failure { error }, vec![])
                }
            },
        };
        if let Some(fault) = &fault {
            apply_report_fault(fault, &mut report.object_changes);
            if *fault == Fault::StallFinality {
                state.stalled.insert(digest);
            }
        }
        state.executed.insert(digest, (report.clone(), label));

        if !options.show_object_changes {
            report.object_changes.clear();
        }
        Ok(report)
    }

    async fn wait_for_finality(&self, digest: &TransactionDigest) -> Result<(), LedgerError> {
        self.finality_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.state.lock().finality_gate.take();
        if let Some(gate) = gate {
            gate.pass().await;
        }

        let stalled = {
            let mut state = self.state.lock();
            let Some(label) = state.executed.get(digest).map(|(_, label)| label.clone()) else {
                return Err(LedgerError::FinalityTimeout {
                    digest: *digest,
                    after: Duration::ZERO,
                });
            };
            let stalled = state.stalled.contains(digest);
            if !stalled {
                state.record(LedgerEventKind::Confirmed, *digest, label);
            }
            stalled
        };
        if stalled {
            std::future::pending::<()>().await;
        }
        Ok(())
    }
}
