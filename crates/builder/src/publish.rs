//! Package publish transaction.

use crate::{ProgrammableTransactionBuilder, TransactionBuildError};
use kiosk_provisioner_types::{BuildArtifact, SuiAddress, TransactionData};

/// Publish `artifact` and hand the resulting upgrade capability to `sender`.
///
/// Commands:
///
/// 1. `Publish(modules, dependencies)`
/// 2. `TransferObjects([upgrade cap], sender)`
pub fn build_publish_transaction(
    artifact: BuildArtifact,
    sender: SuiAddress,
    gas_budget: u64,
) -> Result<TransactionData, TransactionBuildError> {
    validate_sender(sender, gas_budget)?;
    if artifact.modules().is_empty() {
        return Err(TransactionBuildError::NoModules);
    }
    if let Some(index) = artifact.modules().iter().position(|module| module.is_empty()) {
        return Err(TransactionBuildError::EmptyModule { index });
    }
    if artifact.dependencies().iter().any(|dep| dep.is_zero()) {
        return Err(TransactionBuildError::ZeroIdentifier { what: "dependency" });
    }

    let (modules, dependencies) = artifact.into_parts();
    let mut ptb = ProgrammableTransactionBuilder::new();
    let recipient = ptb.pure_address(sender)?;
    let upgrade_cap = ptb.publish(modules, dependencies)?;
    ptb.transfer_objects(vec![upgrade_cap], recipient)?;

    Ok(TransactionData::new(sender, ptb.finish(), gas_budget))
}

pub(crate) fn validate_sender(
    sender: SuiAddress,
    gas_budget: u64,
) -> Result<(), TransactionBuildError> {
    if sender.is_zero() {
        return Err(TransactionBuildError::ZeroIdentifier { what: "sender" });
    }
    if gas_budget == 0 {
        return Err(TransactionBuildError::ZeroGasBudget);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_provisioner_types::{Argument, CallArg, Command, PackageId};

    fn sender() -> SuiAddress {
        SuiAddress::new([7u8; 32])
    }

    fn artifact() -> BuildArtifact {
        BuildArtifact::new(
            vec![vec![0xa1, 0x1c], vec![0xeb]],
            vec![PackageId::MOVE_STDLIB, PackageId::SUI_FRAMEWORK],
        )
    }

    #[test]
    fn test_publish_then_transfer_upgrade_cap() {
        let tx = build_publish_transaction(artifact(), sender(), 100_000_000).unwrap();

        assert_eq!(tx.sender, sender());
        assert_eq!(tx.gas_budget, 100_000_000);
        assert_eq!(tx.kind.inputs, vec![CallArg::Pure(vec![7u8; 32])]);
        assert_eq!(
            tx.commands(),
            &[
                Command::Publish(
                    vec![vec![0xa1, 0x1c], vec![0xeb]],
                    vec![PackageId::MOVE_STDLIB, PackageId::SUI_FRAMEWORK],
                ),
                Command::TransferObjects(vec![Argument::Result(0)], Argument::Input(0)),
            ]
        );
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        assert_eq!(
            build_publish_transaction(artifact(), SuiAddress::ZERO, 1),
            Err(TransactionBuildError::ZeroIdentifier { what: "sender" })
        );
        assert_eq!(
            build_publish_transaction(artifact(), sender(), 0),
            Err(TransactionBuildError::ZeroGasBudget)
        );
        assert_eq!(
            build_publish_transaction(BuildArtifact::new(vec![], vec![]), sender(), 1),
            Err(TransactionBuildError::NoModules)
        );
        assert_eq!(
            build_publish_transaction(BuildArtifact::new(vec![vec![1], vec![]], vec![]), sender(), 1),
            Err(TransactionBuildError::EmptyModule { index: 1 })
        );
        assert_eq!(
            build_publish_transaction(
                BuildArtifact::new(vec![vec![1]], vec![PackageId::ZERO]),
                sender(),
                1
            ),
            Err(TransactionBuildError::ZeroIdentifier { what: "dependency" })
        );
    }
}
