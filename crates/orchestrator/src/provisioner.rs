//! The provisioning state machine.

use crate::{
    PhaseSnapshot, ProvisionError, ProvisionPhase, ProvisionRequest, ProvisionStage,
    ProvisioningResult,
};
use kiosk_provisioner_builder::{build_publish_transaction, PolicyTransactionBuilder};
use kiosk_provisioner_core::{LedgerClient, PackageBuilder, TransactionSigner};
use kiosk_provisioner_effects::{
    find_created_object_of_type, find_created_ref_of_type, find_published_package, is_mutated,
    published_package_count, publisher_type, transfer_policy_cap_type, transfer_policy_type,
};
use kiosk_provisioner_executor::{ExecutorConfig, SubmissionExecutor};
use kiosk_provisioner_types::{
    ObjectId, PackageId, StructTag, SuiAddress, TransactionData, TransactionEffectsReport,
};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Moves the phase to `Failed(Cancelled)` if a run is dropped before it
/// reaches a terminal phase.
struct CancelOnDrop<'a> {
    phase: &'a RwLock<ProvisionPhase>,
}

impl Drop for CancelOnDrop<'_> {
    fn drop(&mut self) {
        let mut phase = self.phase.write();
        if !phase.is_terminal() {
            warn!(phase = %phase.snapshot(), "Provisioning dropped mid-sequence");
            *phase = ProvisionPhase::Failed(ProvisionError::Cancelled);
        }
    }
}

/// Publishes a package, creates its transfer policy and memoizes the
/// resulting identifiers.
///
/// One instance performs at most one provisioning run. Share it through an
/// `Arc`; concurrent [`Provisioner::provision`] calls wait for the run in
/// flight and observe its outcome.
///
/// # Example
///
/// ```ignore
/// let provisioner = Provisioner::new(ledger, signer, builder, request, ExecutorConfig::default());
/// let result = provisioner.provision().await?;
/// println!("policy {}", result.policy_id);
/// assert_eq!(provisioner.policy_id()?, result.policy_id);
/// ```
pub struct Provisioner {
    executor: SubmissionExecutor,
    signer: Arc<dyn TransactionSigner>,
    builder: Arc<dyn PackageBuilder>,
    request: ProvisionRequest,
    guard: tokio::sync::Mutex<()>,
    phase: RwLock<ProvisionPhase>,
}

impl Provisioner {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        signer: Arc<dyn TransactionSigner>,
        builder: Arc<dyn PackageBuilder>,
        request: ProvisionRequest,
        executor_config: ExecutorConfig,
    ) -> Self {
        Self {
            executor: SubmissionExecutor::new(ledger, executor_config),
            signer,
            builder,
            request,
            guard: tokio::sync::Mutex::new(()),
            phase: RwLock::new(ProvisionPhase::Uninitialized),
        }
    }

    pub fn request(&self) -> &ProvisionRequest {
        &self.request
    }

    /// Current phase, for diagnostics.
    pub fn phase(&self) -> PhaseSnapshot {
        self.phase.read().snapshot()
    }

    /// Run provisioning, or return the outcome of the run that already
    /// happened.
    ///
    /// The first call performs the whole sequence. Calls that arrive while it
    /// is in flight wait for it; later calls return the memoized result or
    /// the same error.
    pub async fn provision(&self) -> Result<Arc<ProvisioningResult>, ProvisionError> {
        if let Some(outcome) = self.settled() {
            return outcome;
        }

        let _guard = self.guard.lock().await;
        if let Some(outcome) = self.settled() {
            return outcome;
        }

        let _cancel = CancelOnDrop { phase: &self.phase };
        match self.run().await {
            Ok(result) => {
                info!(
                    package_id = %result.package_id,
                    policy_id = %result.policy_id,
                    policy_cap_id = %result.policy_cap_id,
                    "Provisioning complete"
                );
                self.transition(ProvisionPhase::Ready(result.clone()));
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, "Provisioning failed");
                self.transition(ProvisionPhase::Failed(e.clone()));
                Err(e)
            }
        }
    }

    fn settled(&self) -> Option<Result<Arc<ProvisioningResult>, ProvisionError>> {
        match &*self.phase.read() {
            ProvisionPhase::Ready(result) => Some(Ok(result.clone())),
            ProvisionPhase::Failed(e) => Some(Err(e.clone())),
            _ => None,
        }
    }

    fn transition(&self, next: ProvisionPhase) {
        let to = next.snapshot();
        let from = {
            let mut phase = self.phase.write();
            let from = phase.snapshot();
            *phase = next;
            from
        };
        info!(%from, %to, "Provisioning phase changed");
    }

    async fn run(&self) -> Result<Arc<ProvisioningResult>, ProvisionError> {
        self.request.validate()?;
        let sender = self.signer.address();
        let gas_budget = self.request.gas_budget;

        let rules = match &self.request.rules_path {
            Some(rules_path) => {
                self.transition(ProvisionPhase::PublishingRules);
                let report = self
                    .publish_package(ProvisionStage::RulesPublish, rules_path, sender)
                    .await?;
                let rules_package_id = published_package(ProvisionStage::RulesPublish, &report)?;
                Some((rules_package_id, report))
            }
            None => None,
        };

        self.transition(ProvisionPhase::PublishingPackage);
        let publish_response = self
            .publish_package(ProvisionStage::Publish, &self.request.package_path, sender)
            .await?;
        let package_id = published_package(ProvisionStage::Publish, &publish_response)?;
        let publisher = find_created_ref_of_type(&publish_response, &publisher_type()).ok_or_else(
            || ProvisionError::PreconditionNotFound {
                stage: ProvisionStage::Publish,
                what: format!("a created {}", publisher_type()),
            },
        )?;

        self.transition(ProvisionPhase::PublishingPolicyPrereqs {
            package_id,
            publisher: publisher.object_id,
        });
        let item = self.request.policy_target.type_tag(package_id)?;
        let mut policy_tx = PolicyTransactionBuilder::new(package_id, publisher, sender, gas_budget)
            .with_target(self.request.policy_target.clone());
        if let Some((rules_package_id, _)) = &rules {
            policy_tx = policy_tx.with_rules(*rules_package_id, self.request.royalty);
        }
        let policy_tx = policy_tx.build()?;

        self.transition(ProvisionPhase::CreatingPolicy {
            package_id,
            publisher: publisher.object_id,
        });
        let policy_response = self
            .submit(ProvisionStage::PolicyCreation, policy_tx)
            .await?;

        let policy_type = transfer_policy_type(&item);
        let policy_id = created_object(&policy_response, &policy_type)?;
        let cap_type = transfer_policy_cap_type(&item);
        let policy_cap_id = created_object(&policy_response, &cap_type)?;
        if !is_mutated(&policy_response, publisher.object_id) {
            return Err(ProvisionError::PreconditionNotFound {
                stage: ProvisionStage::PolicyCreation,
                what: format!("a mutation of publisher {}", publisher.object_id),
            });
        }

        let (rules_package_id, rules_response) = match rules {
            Some((id, report)) => (Some(id), Some(report)),
            None => (None, None),
        };
        Ok(Arc::new(ProvisioningResult {
            package_id,
            publisher_object_id: publisher.object_id,
            policy_id,
            policy_cap_id,
            rules_package_id,
            publish_response,
            policy_response,
            rules_response,
        }))
    }

    async fn publish_package(
        &self,
        stage: ProvisionStage,
        path: &Path,
        sender: SuiAddress,
    ) -> Result<TransactionEffectsReport, ProvisionError> {
        debug!(%stage, path = %path.display(), "Building package");
        let artifact = self.builder.build(path).await?;
        debug!(
            %stage,
            modules = artifact.modules().len(),
            bytes = artifact.bytecode_len(),
            "Package built"
        );
        let transaction = build_publish_transaction(artifact, sender, self.request.gas_budget)?;
        self.submit(stage, transaction).await
    }

    async fn submit(
        &self,
        stage: ProvisionStage,
        transaction: TransactionData,
    ) -> Result<TransactionEffectsReport, ProvisionError> {
        self.executor
            .submit_and_confirm(transaction, self.signer.as_ref())
            .await
            .map_err(|e| ProvisionError::from_submission(stage, e))
    }

    fn ready(&self) -> Result<Arc<ProvisioningResult>, ProvisionError> {
        match &*self.phase.read() {
            ProvisionPhase::Ready(result) => Ok(result.clone()),
            _ => Err(ProvisionError::NotReady),
        }
    }

    /// The memoized result.
    pub fn result(&self) -> Result<Arc<ProvisioningResult>, ProvisionError> {
        self.ready()
    }

    pub fn package_id(&self) -> Result<PackageId, ProvisionError> {
        Ok(self.ready()?.package_id)
    }

    pub fn publisher_object_id(&self) -> Result<ObjectId, ProvisionError> {
        Ok(self.ready()?.publisher_object_id)
    }

    pub fn policy_id(&self) -> Result<ObjectId, ProvisionError> {
        Ok(self.ready()?.policy_id)
    }

    pub fn policy_cap_id(&self) -> Result<ObjectId, ProvisionError> {
        Ok(self.ready()?.policy_cap_id)
    }

    pub fn publish_response(&self) -> Result<TransactionEffectsReport, ProvisionError> {
        Ok(self.ready()?.publish_response.clone())
    }

    pub fn policy_response(&self) -> Result<TransactionEffectsReport, ProvisionError> {
        Ok(self.ready()?.policy_response.clone())
    }

    /// `None` when no rules package was configured.
    pub fn rules_package_id(&self) -> Result<Option<PackageId>, ProvisionError> {
        Ok(self.ready()?.rules_package_id)
    }

    /// `None` when no rules package was configured.
    pub fn rules_response(&self) -> Result<Option<TransactionEffectsReport>, ProvisionError> {
        Ok(self.ready()?.rules_response.clone())
    }
}

fn published_package(
    stage: ProvisionStage,
    report: &TransactionEffectsReport,
) -> Result<PackageId, ProvisionError> {
    let count = published_package_count(report);
    if count > 1 {
        warn!(%stage, count, "Multiple packages published, using the first");
    }
    find_published_package(report).ok_or_else(|| ProvisionError::PreconditionNotFound {
        stage,
        what: "a published package".to_string(),
    })
}

fn created_object(
    report: &TransactionEffectsReport,
    object_type: &StructTag,
) -> Result<ObjectId, ProvisionError> {
    find_created_object_of_type(report, object_type).ok_or_else(|| {
        ProvisionError::PreconditionNotFound {
            stage: ProvisionStage::PolicyCreation,
            what: format!("a created {object_type}"),
        }
    })
}
