//! Type tags of framework and game objects the parser looks for.

use kiosk_provisioner_types::{PackageId, StructTag, TypeTag};

fn framework(module: &str, name: &str, type_params: Vec<TypeTag>) -> StructTag {
    StructTag {
        address: PackageId::SUI_FRAMEWORK,
        module: module.to_string(),
        name: name.to_string(),
        type_params,
    }
}

/// `0x2::package::Publisher`
pub fn publisher_type() -> StructTag {
    framework("package", "Publisher", vec![])
}

/// `0x2::package::UpgradeCap`
pub fn upgrade_cap_type() -> StructTag {
    framework("package", "UpgradeCap", vec![])
}

/// `0x2::transfer_policy::TransferPolicy<item>`
pub fn transfer_policy_type(item: &StructTag) -> StructTag {
    framework(
        "transfer_policy",
        "TransferPolicy",
        vec![item.clone().into_type_tag()],
    )
}

/// `0x2::transfer_policy::TransferPolicyCap<item>`
pub fn transfer_policy_cap_type(item: &StructTag) -> StructTag {
    framework(
        "transfer_policy",
        "TransferPolicyCap",
        vec![item.clone().into_type_tag()],
    )
}

/// `package::hero::Hero`
pub fn hero_type(package: PackageId) -> StructTag {
    StructTag {
        address: package,
        module: "hero".to_string(),
        name: "Hero".to_string(),
        type_params: vec![],
    }
}

/// `package::blacksmith::Sword`
pub fn sword_type(package: PackageId) -> StructTag {
    StructTag {
        address: package,
        module: "blacksmith".to_string(),
        name: "Sword".to_string(),
        type_params: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_forms() {
        assert_eq!(publisher_type().to_string(), "0x2::package::Publisher");
        assert_eq!(upgrade_cap_type().to_string(), "0x2::package::UpgradeCap");

        let item: StructTag = "0xabc::sword::Sword".parse().unwrap();
        assert_eq!(
            transfer_policy_type(&item).to_string(),
            "0x2::transfer_policy::TransferPolicy<0xabc::sword::Sword>"
        );
        assert_eq!(
            transfer_policy_cap_type(&item).to_string(),
            "0x2::transfer_policy::TransferPolicyCap<0xabc::sword::Sword>"
        );
    }

    #[test]
    fn test_constructed_tags_equal_parsed_tags() {
        let parsed: StructTag = "0x2::package::Publisher".parse().unwrap();
        assert_eq!(publisher_type(), parsed);
    }
}
