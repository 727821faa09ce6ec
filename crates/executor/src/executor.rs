//! Sign, submit, confirm.

use crate::{ExecutorConfig, SubmissionError};
use kiosk_provisioner_core::{LedgerClient, ResponseOptions, TransactionSigner};
use kiosk_provisioner_types::{
    transaction_signing_digest, SignedTransaction, TransactionData, TransactionEffectsReport,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Sign `data` over its intent message.
pub fn sign_transaction(data: TransactionData, signer: &dyn TransactionSigner) -> SignedTransaction {
    let message = transaction_signing_digest(&data.to_bytes());
    let signature = signer.sign(message.as_bytes());
    SignedTransaction::new(data, vec![signature])
}

/// Submits transactions one at a time and waits for each to be final.
pub struct SubmissionExecutor {
    ledger: Arc<dyn LedgerClient>,
    config: ExecutorConfig,
}

impl SubmissionExecutor {
    pub fn new(ledger: Arc<dyn LedgerClient>, config: ExecutorConfig) -> Self {
        Self { ledger, config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Sign and submit `transaction`, then wait for finality.
    ///
    /// Gas coins and price are selected from the ledger unless the
    /// transaction already carries them. Returns the report only when the
    /// status is success and finality was observed within
    /// [`ExecutorConfig::confirmation_timeout`].
    pub async fn submit_and_confirm(
        &self,
        transaction: TransactionData,
        signer: &dyn TransactionSigner,
    ) -> Result<TransactionEffectsReport, SubmissionError> {
        let transaction = self.with_gas(transaction).await?;
        let signed = sign_transaction(transaction, signer);
        let digest = signed.digest();
        debug!(
            %digest,
            commands = signed.data.commands().len(),
            gas_budget = signed.data.gas_budget,
            gas_price = signed.data.gas_price,
            "Submitting transaction"
        );

        let report = self
            .ledger
            .execute_transaction(&signed, ResponseOptions::full())
            .await
            .map_err(|e| {
                warn!(%digest, error = %e, "Submission failed");
                SubmissionError::from_ledger(digest, e)
            })?;

        if !report.is_success() {
            warn!(digest = %report.digest, status = %report.status, "Transaction rejected");
            return Err(SubmissionError::TransactionRejected {
                digest: report.digest,
                status: report.status,
            });
        }

        let timeout = self.config.confirmation_timeout;
        match tokio::time::timeout(timeout, self.ledger.wait_for_finality(&report.digest)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(digest = %report.digest, error = %e, "Finality wait failed");
                return Err(SubmissionError::from_ledger(report.digest, e));
            }
            Err(_) => {
                warn!(digest = %report.digest, ?timeout, "Finality not observed in time");
                return Err(SubmissionError::ConfirmationTimeout {
                    digest: report.digest,
                    after: timeout,
                });
            }
        }

        debug!(
            digest = %report.digest,
            changes = report.changes().len(),
            "Transaction confirmed"
        );
        Ok(report)
    }

    async fn with_gas(&self, transaction: TransactionData) -> Result<TransactionData, SubmissionError> {
        if transaction.has_gas() {
            return Ok(transaction);
        }
        let gas = self
            .ledger
            .select_gas(transaction.sender, transaction.gas_budget)
            .await
            .map_err(|e| {
                warn!(sender = %transaction.sender, error = %e, "Gas selection failed");
                SubmissionError::Transport(e)
            })?;
        debug!(coins = gas.coins.len(), price = gas.price, "Gas selected");
        Ok(transaction.with_gas(gas.coins, gas.price))
    }
}
