//! Transfer-policy creation transaction.
//!
//! The policy transaction consumes the `Publisher` created by the publish
//! transaction:
//!
//! ```text
//! 0: 0x2::transfer_policy::new<T>(publisher)          -> (policy, cap)
//!    {rules}::royalty_rule::add<T>(policy, cap, bp, min)      [rules only]
//!    {rules}::kiosk_lock_rule::add<T>(policy, cap)            [rules only]
//!    {rules}::personal_kiosk_rule::add<T>(policy, cap)        [rules only]
//! n: TransferObjects([cap], sender)
//! n+1: 0x2::transfer::public_share_object<TransferPolicy<T>>(policy)
//! ```

use crate::publish::validate_sender;
use crate::{ProgrammableTransactionBuilder, TransactionBuildError};
use kiosk_provisioner_effects::transfer_policy_type;
use kiosk_provisioner_types::{
    ObjectRef, PackageId, RoyaltyConfig, StructTag, SuiAddress, TransactionData,
};
use serde::{Deserialize, Serialize};

/// The type a transfer policy is created for, relative to the published
/// package: `{package}::{module}::{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyTarget {
    pub module: String,
    pub name: String,
}

impl Default for PolicyTarget {
    fn default() -> Self {
        Self {
            module: "sword".to_string(),
            name: "Sword".to_string(),
        }
    }
}

impl PolicyTarget {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }

    /// Full type tag of the target within `package_id`.
    pub fn type_tag(&self, package_id: PackageId) -> Result<StructTag, TransactionBuildError> {
        Ok(StructTag::new(
            package_id,
            self.module.as_str(),
            self.name.as_str(),
            vec![],
        )?)
    }
}

/// Rule modules attached to the policy before it is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyRules {
    /// Package providing `royalty_rule`, `kiosk_lock_rule` and
    /// `personal_kiosk_rule`.
    pub rules_package: PackageId,
    pub royalty: RoyaltyConfig,
}

/// Configurable policy transaction.
///
/// # Example
///
/// ```ignore
/// let tx = PolicyTransactionBuilder::new(package_id, publisher, sender, gas_budget)
///     .with_target(PolicyTarget::new("sword", "Sword"))
///     .with_rules(rules_package, royalty)
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct PolicyTransactionBuilder {
    package_id: PackageId,
    publisher: ObjectRef,
    sender: SuiAddress,
    gas_budget: u64,
    target: PolicyTarget,
    rules: Option<PolicyRules>,
}

impl PolicyTransactionBuilder {
    pub fn new(
        package_id: PackageId,
        publisher: ObjectRef,
        sender: SuiAddress,
        gas_budget: u64,
    ) -> Self {
        Self {
            package_id,
            publisher,
            sender,
            gas_budget,
            target: PolicyTarget::default(),
            rules: None,
        }
    }

    /// Set the type the policy governs.
    pub fn with_target(mut self, target: PolicyTarget) -> Self {
        self.target = target;
        self
    }

    /// Attach royalty, kiosk-lock and personal-kiosk rules from `rules_package`.
    pub fn with_rules(mut self, rules_package: PackageId, royalty: RoyaltyConfig) -> Self {
        self.rules = Some(PolicyRules {
            rules_package,
            royalty,
        });
        self
    }

    fn validate(&self) -> Result<StructTag, TransactionBuildError> {
        validate_sender(self.sender, self.gas_budget)?;
        if self.package_id.is_zero() {
            return Err(TransactionBuildError::ZeroIdentifier { what: "package" });
        }
        if self.publisher.object_id.is_zero() {
            return Err(TransactionBuildError::ZeroIdentifier { what: "publisher" });
        }
        if !self.publisher.is_well_formed() {
            return Err(TransactionBuildError::MalformedObjectRef {
                what: "publisher",
                object_ref: self.publisher,
            });
        }
        if let Some(rules) = &self.rules {
            if rules.rules_package.is_zero() {
                return Err(TransactionBuildError::ZeroIdentifier {
                    what: "rules package",
                });
            }
        }
        self.target.type_tag(self.package_id)
    }

    pub fn build(self) -> Result<TransactionData, TransactionBuildError> {
        let item = self.validate()?;
        let item_tag = item.clone().into_type_tag();

        let mut ptb = ProgrammableTransactionBuilder::new();
        let publisher = ptb.object(self.publisher)?;
        let recipient = ptb.pure_address(self.sender)?;

        let (policy, cap) = ptb.move_call_pair(
            PackageId::SUI_FRAMEWORK,
            "transfer_policy",
            "new",
            vec![item_tag.clone()],
            vec![publisher],
        )?;

        if let Some(rules) = self.rules {
            let basis_points = ptb.pure_u16(rules.royalty.basis_points())?;
            let min_amount = ptb.pure_u64(rules.royalty.min_amount())?;
            ptb.move_call(
                rules.rules_package,
                "royalty_rule",
                "add",
                vec![item_tag.clone()],
                vec![policy, cap, basis_points, min_amount],
            )?;
            for module in ["kiosk_lock_rule", "personal_kiosk_rule"] {
                ptb.move_call(
                    rules.rules_package,
                    module,
                    "add",
                    vec![item_tag.clone()],
                    vec![policy, cap],
                )?;
            }
        }

        ptb.transfer_objects(vec![cap], recipient)?;
        ptb.move_call(
            PackageId::SUI_FRAMEWORK,
            "transfer",
            "public_share_object",
            vec![transfer_policy_type(&item).into_type_tag()],
            vec![policy],
        )?;

        Ok(TransactionData::new(self.sender, ptb.finish(), self.gas_budget))
    }
}

/// Policy transaction for the default `sword::Sword` target, without rules.
pub fn build_policy_transaction(
    package_id: PackageId,
    publisher: ObjectRef,
    sender: SuiAddress,
    gas_budget: u64,
) -> Result<TransactionData, TransactionBuildError> {
    PolicyTransactionBuilder::new(package_id, publisher, sender, gas_budget).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_provisioner_types::{
        Argument, CallArg, Command, Digest, MoveCall, ObjectId, SequenceNumber, TypeTag, TypeTagError,
    };

    fn package() -> PackageId {
        PackageId::from_hex_literal("0xabc").unwrap()
    }

    fn publisher() -> ObjectRef {
        ObjectRef::new(
            ObjectId::from_hex_literal("0x51").unwrap(),
            SequenceNumber(3),
            Digest::from_bytes(b"publisher"),
        )
    }

    fn sender() -> SuiAddress {
        SuiAddress::new([7u8; 32])
    }

    fn move_call(command: &Command) -> &MoveCall {
        match command {
            Command::MoveCall(call) => call,
            other => panic!("expected move call, got {}", other.kind()),
        }
    }

    #[test]
    fn test_default_policy_transaction() {
        let tx = build_policy_transaction(package(), publisher(), sender(), 50_000_000).unwrap();
        let commands = tx.commands();
        assert_eq!(commands.len(), 3);

        let sword: TypeTag = "0xabc::sword::Sword".parse().unwrap();
        let new = move_call(&commands[0]);
        assert_eq!(new.target(), "0x2::transfer_policy::new");
        assert_eq!(new.type_arguments, vec![sword]);
        assert_eq!(new.arguments, vec![Argument::Input(0)]);
        assert_eq!(tx.kind.inputs[0], CallArg::Object(publisher()));

        assert_eq!(
            commands[1],
            Command::TransferObjects(vec![Argument::NestedResult(0, 1)], Argument::Input(1))
        );

        let share = move_call(&commands[2]);
        assert_eq!(share.target(), "0x2::transfer::public_share_object");
        assert_eq!(
            share.type_arguments,
            vec!["0x2::transfer_policy::TransferPolicy<0xabc::sword::Sword>"
                .parse::<TypeTag>()
                .unwrap()]
        );
        assert_eq!(share.arguments, vec![Argument::NestedResult(0, 0)]);
    }

    #[test]
    fn test_rules_sit_between_new_and_cap_transfer() {
        let rules = PackageId::from_hex_literal("0xfee").unwrap();
        let royalty = RoyaltyConfig::new(250, 42).unwrap();
        let tx = PolicyTransactionBuilder::new(package(), publisher(), sender(), 1)
            .with_rules(rules, royalty)
            .build()
            .unwrap();
        let commands = tx.commands();
        assert_eq!(commands.len(), 6);

        let targets: Vec<String> = commands
            .iter()
            .filter_map(|command| match command {
                Command::MoveCall(call) => Some(call.target()),
                _ => None,
            })
            .collect();
        assert_eq!(
            targets,
            vec![
                "0x2::transfer_policy::new",
                "0xfee::royalty_rule::add",
                "0xfee::kiosk_lock_rule::add",
                "0xfee::personal_kiosk_rule::add",
                "0x2::transfer::public_share_object",
            ]
        );
        assert!(matches!(commands[4], Command::TransferObjects(..)));

        let royalty_call = move_call(&commands[1]);
        assert_eq!(
            royalty_call.arguments,
            vec![
                Argument::NestedResult(0, 0),
                Argument::NestedResult(0, 1),
                Argument::Input(2),
                Argument::Input(3),
            ]
        );
        assert_eq!(tx.kind.inputs[2], CallArg::Pure(250u16.to_le_bytes().to_vec()));
        assert_eq!(tx.kind.inputs[3], CallArg::Pure(42u64.to_le_bytes().to_vec()));
    }

    #[test]
    fn test_custom_target() {
        let tx = PolicyTransactionBuilder::new(package(), publisher(), sender(), 1)
            .with_target(PolicyTarget::new("hero", "Hero"))
            .build()
            .unwrap();
        let new = move_call(&tx.commands()[0]);
        assert_eq!(
            new.type_arguments,
            vec!["0xabc::hero::Hero".parse::<TypeTag>().unwrap()]
        );
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        assert_eq!(
            build_policy_transaction(PackageId::ZERO, publisher(), sender(), 1),
            Err(TransactionBuildError::ZeroIdentifier { what: "package" })
        );

        let zero_version = ObjectRef::new(publisher().object_id, SequenceNumber(0), publisher().digest);
        assert_eq!(
            build_policy_transaction(package(), zero_version, sender(), 1),
            Err(TransactionBuildError::MalformedObjectRef {
                what: "publisher",
                object_ref: zero_version,
            })
        );

        let zero_digest = ObjectRef::new(publisher().object_id, SequenceNumber(3), Digest::ZERO);
        assert!(matches!(
            build_policy_transaction(package(), zero_digest, sender(), 1),
            Err(TransactionBuildError::MalformedObjectRef { .. })
        ));

        let zero_id = ObjectRef::new(ObjectId::ZERO, SequenceNumber(3), publisher().digest);
        assert_eq!(
            build_policy_transaction(package(), zero_id, sender(), 1),
            Err(TransactionBuildError::ZeroIdentifier { what: "publisher" })
        );

        assert_eq!(
            PolicyTransactionBuilder::new(package(), publisher(), sender(), 1)
                .with_target(PolicyTarget::new("sword", "Sword<T>"))
                .build(),
            Err(TransactionBuildError::InvalidTarget(
                TypeTagError::InvalidIdentifier("Sword<T>".to_string())
            ))
        );

        assert_eq!(
            build_policy_transaction(package(), publisher(), sender(), 0),
            Err(TransactionBuildError::ZeroGasBudget)
        );
    }

    #[test]
    fn test_policy_target_from_toml() {
        let target: PolicyTarget = toml::from_str("module = \"hero\"\nname = \"Hero\"").unwrap();
        assert_eq!(target, PolicyTarget::new("hero", "Hero"));

        let defaulted: PolicyTarget = toml::from_str("").unwrap();
        assert_eq!(defaulted, PolicyTarget::default());
    }
}
