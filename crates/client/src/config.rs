//! Command-line configuration file.

use kiosk_provisioner_orchestrator::{ExecutorConfig, PolicyTarget, ProvisionRequest};
use kiosk_provisioner_types::{KeyError, KeyPair, RoyaltyConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Environment variable that overrides `admin_key`.
pub const ADMIN_KEY_ENV: &str = "KIOSK_PROVISIONER_ADMIN_KEY";

/// Errors loading a [`ProvisionerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("No admin key configured (set admin_key or {env})", env = ADMIN_KEY_ENV)]
    MissingAdminKey,

    #[error("Invalid admin key: {0}")]
    InvalidAdminKey(#[from] KeyError),

    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("Invalid setting {field}: {reason}")]
    InvalidSetting {
        field: &'static str,
        reason: &'static str,
    },
}

/// Public ledger networks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Localnet,
    Devnet,
    Testnet,
    Mainnet,
}

impl Network {
    /// Full node JSON-RPC URL.
    pub fn rpc_url(self) -> &'static str {
        match self {
            Network::Localnet => "http://127.0.0.1:9000",
            Network::Devnet => "https://fullnode.devnet.sui.io:443",
            Network::Testnet => "https://fullnode.testnet.sui.io:443",
            Network::Mainnet => "https://fullnode.mainnet.sui.io:443",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Network::Localnet => "localnet",
            Network::Devnet => "devnet",
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
        };
        f.write_str(name)
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "localnet" | "local" => Ok(Network::Localnet),
            "devnet" => Ok(Network::Devnet),
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            _ => Err(ConfigError::UnknownNetwork(s.to_string())),
        }
    }
}

/// Settings of the `kiosk-provisioner` binary.
///
/// ```toml
/// network = "localnet"
/// admin_key = "AC...="
/// package_path = "../sword"
/// rules_path = "../kiosk"
///
/// [royalty]
/// basis_points = 250
/// min_amount = 1000
///
/// [policy]
/// module = "sword"
/// name = "Sword"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProvisionerConfig {
    pub network: Network,
    /// Overrides the network's URL.
    pub rpc_url: Option<String>,
    /// Base64 `flag || seed`.
    pub admin_key: Option<String>,
    pub package_path: PathBuf,
    pub rules_path: Option<PathBuf>,
    pub royalty: RoyaltyConfig,
    pub policy: PolicyTarget,
    pub gas_budget: u64,
    /// How long each transaction may take to become final.
    pub confirmation_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        let request = ProvisionRequest::default();
        Self {
            network: Network::default(),
            rpc_url: None,
            admin_key: None,
            package_path: request.package_path,
            rules_path: request.rules_path,
            royalty: request.royalty,
            policy: request.policy_target,
            gas_budget: request.gas_budget,
            confirmation_timeout_ms: 60_000,
            poll_interval_ms: 500,
        }
    }
}

impl ProvisionerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no run could succeed with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.confirmation_timeout_ms == 0 {
            return Err(ConfigError::InvalidSetting {
                field: "confirmation_timeout_ms",
                reason: "must be at least one millisecond",
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidSetting {
                field: "poll_interval_ms",
                reason: "must be at least one millisecond",
            });
        }
        Ok(())
    }

    /// Replace the confirmation timeout, at millisecond precision.
    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Read `path` and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_toml_str(&contents)?.with_env_overrides())
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_admin_key_override(std::env::var(ADMIN_KEY_ENV).ok())
    }

    /// Replace `admin_key` when `key` is set and non-empty.
    pub fn with_admin_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|key| !key.trim().is_empty()) {
            self.admin_key = Some(key);
        }
        self
    }

    /// Explicit URL if set, otherwise the network's.
    pub fn rpc_url(&self) -> String {
        self.rpc_url
            .clone()
            .unwrap_or_else(|| self.network.rpc_url().to_string())
    }

    pub fn admin_keypair(&self) -> Result<KeyPair, ConfigError> {
        let key = self.admin_key.as_deref().ok_or(ConfigError::MissingAdminKey)?;
        Ok(KeyPair::from_base64(key)?)
    }

    pub fn provision_request(&self) -> ProvisionRequest {
        let mut request = ProvisionRequest::new(self.package_path.clone())
            .with_royalty(self.royalty)
            .with_policy_target(self.policy.clone())
            .with_gas_budget(self.gas_budget);
        if let Some(rules_path) = &self.rules_path {
            request = request.with_rules_path(rules_path.clone());
        }
        request
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.confirmation_timeout_ms)
    }

    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig::default().with_confirmation_timeout(self.confirmation_timeout())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_provisioner_types::SignatureScheme;
    use std::io::Write;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ProvisionerConfig::from_toml_str("").unwrap();

        assert_eq!(config, ProvisionerConfig::default());
        assert_eq!(config.rpc_url(), "http://127.0.0.1:9000");
        assert_eq!(config.provision_request(), ProvisionRequest::default());
        assert_eq!(config.confirmation_timeout(), Duration::from_secs(60));
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_full_document() {
        let config = ProvisionerConfig::from_toml_str(
            r#"
            network = "testnet"
            package_path = "/work/sword"
            rules_path = "/work/kiosk"
            gas_budget = 5000
            confirmation_timeout_ms = 5000

            [royalty]
            basis_points = 250
            min_amount = 1000

            [policy]
            module = "hero"
            name = "Hero"
            "#,
        )
        .unwrap();

        assert_eq!(config.rpc_url(), "https://fullnode.testnet.sui.io:443");
        let request = config.provision_request();
        assert_eq!(request.package_path, PathBuf::from("/work/sword"));
        assert_eq!(request.rules_path, Some(PathBuf::from("/work/kiosk")));
        assert_eq!(request.royalty, RoyaltyConfig::new(250, 1000).unwrap());
        assert_eq!(request.policy_target, PolicyTarget::new("hero", "Hero"));
        assert_eq!(request.gas_budget, 5000);
        assert_eq!(
            config.executor_config().confirmation_timeout,
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_zero_durations_rejected() {
        for document in ["confirmation_timeout_ms = 0", "poll_interval_ms = 0"] {
            let result = ProvisionerConfig::from_toml_str(document);
            assert!(
                matches!(result, Err(ConfigError::InvalidSetting { .. })),
                "{document}"
            );
        }
    }

    #[test]
    fn test_sub_second_timeout_kept() {
        let config =
            ProvisionerConfig::default().with_confirmation_timeout(Duration::from_millis(500));
        config.validate().unwrap();
        assert_eq!(config.confirmation_timeout(), Duration::from_millis(500));
        assert_eq!(
            config.executor_config().confirmation_timeout,
            Duration::from_millis(500)
        );

        let config = config.with_confirmation_timeout(Duration::from_micros(10));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSetting {
                field: "confirmation_timeout_ms",
                ..
            })
        ));
    }

    #[test]
    fn test_explicit_rpc_url_wins() {
        let config = ProvisionerConfig::from_toml_str(
            "network = \"mainnet\"\nrpc_url = \"http://10.0.0.1:9000\"",
        )
        .unwrap();
        assert_eq!(config.rpc_url(), "http://10.0.0.1:9000");
    }

    #[test]
    fn test_royalty_out_of_range_rejected() {
        let result = ProvisionerConfig::from_toml_str(
            "[royalty]\nbasis_points = 10001\nmin_amount = 0",
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = ProvisionerConfig::from_toml_str("gas_budjet = 10");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_admin_key() {
        let keypair = KeyPair::from_seed(SignatureScheme::Ed25519, &[9u8; 32]);
        let config = ProvisionerConfig::default();
        assert!(matches!(
            config.admin_keypair(),
            Err(ConfigError::MissingAdminKey)
        ));

        let config = config.with_admin_key_override(Some(keypair.to_base64()));
        assert_eq!(config.admin_keypair().unwrap().address(), keypair.address());

        let config = config.with_admin_key_override(Some("not base64!".to_string()));
        assert!(matches!(
            config.admin_keypair(),
            Err(ConfigError::InvalidAdminKey(_))
        ));
    }

    #[test]
    fn test_empty_override_keeps_file_key() {
        let config = ProvisionerConfig {
            admin_key: Some("from-file".to_string()),
            ..Default::default()
        };
        let config = config
            .with_admin_key_override(Some("  ".to_string()))
            .with_admin_key_override(None);
        assert_eq!(config.admin_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "network = \"devnet\"\ngas_budget = 42").unwrap();

        let config = ProvisionerConfig::load(file.path()).unwrap();

        assert_eq!(config.network, Network::Devnet);
        assert_eq!(config.gas_budget, 42);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ProvisionerConfig::load(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_network_names() {
        for network in [
            Network::Localnet,
            Network::Devnet,
            Network::Testnet,
            Network::Mainnet,
        ] {
            assert_eq!(network.to_string().parse::<Network>().unwrap(), network);
        }
        assert!(matches!(
            "moonnet".parse::<Network>(),
            Err(ConfigError::UnknownNetwork(_))
        ));
    }
}
