//! Configuration for the transfer bot
//!
//! Every constant the issuer depends on lives here with a default, so a
//! config file only needs to name what differs.

pub mod keys;
pub mod rpc;

use crate::units::to_smallest_unit;
use crate::{Error, Result};
use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub use keys::load_private_keys;
pub use rpc::RpcConfig;

/// Default key file, relative to the working directory
pub const DEFAULT_KEYS_PATH: &str = "privateKeys.json";

/// Bounds for randomized transfer parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferSettings {
    /// Minimum amount per transfer (ether)
    pub min_amount: f64,
    /// Maximum amount per transfer (ether)
    pub max_amount: f64,
    /// Minimum gas price (wei)
    pub min_gas_price: u64,
    /// Maximum gas price (wei)
    pub max_gas_price: u64,
    /// Gas limit for a plain value transfer
    pub gas_limit: u64,
    /// Balance below which a wallet's slot is skipped (ether)
    pub min_balance_reserve: f64,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            min_amount: 0.000001,
            max_amount: 0.000005,
            min_gas_price: 900_000,
            max_gas_price: 1_500_000,
            gas_limit: 21_000,
            min_balance_reserve: 0.001,
        }
    }
}

/// Retry behavior for remote calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Attempts per remote operation, including the first
    pub max_attempts: u32,
    /// Fixed delay between attempts (milliseconds)
    pub delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay_ms: 5_000,
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ledger RPC endpoint; the RPC_URL environment variable wins over this
    pub rpc_url: Option<String>,
    /// Chain id used for EIP-155 signatures
    pub chain_id: u64,
    /// JSON file holding an array of hex private keys
    pub keys_path: String,
    /// Transfer parameter bounds
    pub transfer: TransferSettings,
    /// Remote call retry settings
    pub retry: RetrySettings,
    /// Sleep the full interval after a skipped slot too
    pub wait_after_skip: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: None,
            chain_id: 88817,
            keys_path: DEFAULT_KEYS_PATH.to_string(),
            transfer: TransferSettings::default(),
            retry: RetrySettings::default(),
            wait_after_skip: false,
        }
    }
}

impl Config {
    /// Load a JSON config file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let config: Config = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse config {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the issuer cannot run with
    pub fn validate(&self) -> Result<()> {
        let t = &self.transfer;

        if to_smallest_unit(t.min_amount).is_err() || to_smallest_unit(t.max_amount).is_err() {
            return Err(Error::Config(
                "transfer amounts must be finite and non-negative".to_string(),
            ));
        }
        if t.min_amount > t.max_amount {
            return Err(Error::Config(format!(
                "min_amount {} exceeds max_amount {}",
                t.min_amount, t.max_amount
            )));
        }
        if t.min_gas_price > t.max_gas_price {
            return Err(Error::Config(format!(
                "min_gas_price {} exceeds max_gas_price {}",
                t.min_gas_price, t.max_gas_price
            )));
        }
        if t.gas_limit == 0 {
            return Err(Error::Config("gas_limit must be positive".to_string()));
        }
        if !(t.min_balance_reserve.is_finite() && t.min_balance_reserve > t.max_amount) {
            return Err(Error::Config(format!(
                "min_balance_reserve {} must exceed max_amount {}",
                t.min_balance_reserve, t.max_amount
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::Config("retry.max_attempts must be at least 1".to_string()));
        }

        Ok(())
    }

    /// Reserve threshold in wei
    pub fn min_balance_wei(&self) -> Result<U256> {
        to_smallest_unit(self.transfer.min_balance_reserve)
            .map_err(|e| Error::Config(e.to_string()))
    }
}

/// What a single run does: how many transfers and how far apart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPlan {
    /// Transfers attempted per wallet
    pub transactions_per_wallet: u64,
    /// Interval between slots
    pub wait: Duration,
}

impl RunPlan {
    pub fn new(transactions_per_wallet: u64, wait_seconds: u64) -> Self {
        Self {
            transactions_per_wallet,
            wait: Duration::from_secs(wait_seconds),
        }
    }

    /// Total number of slots for `wallet_count` wallets
    pub fn total_slots(&self, wallet_count: usize) -> u64 {
        self.transactions_per_wallet
            .saturating_mul(wallet_count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.chain_id, 88817);
        assert_eq!(config.transfer.gas_limit, 21_000);
        assert_eq!(
            config.min_balance_wei().unwrap(),
            U256::from(1_000_000_000_000_000u64)
        );
    }

    #[test]
    fn test_partial_config_takes_defaults() {
        let value = serde_json::json!({
            "chain_id": 1,
            "retry": { "max_attempts": 2 },
            "transfer": { "gas_limit": 25000 }
        });
        let parsed: Config = serde_json::from_value(value).expect("parse config");
        assert_eq!(parsed.chain_id, 1);
        assert_eq!(parsed.retry.max_attempts, 2);
        assert_eq!(parsed.retry.delay_ms, 5_000);
        assert_eq!(parsed.transfer.gas_limit, 25_000);
        assert_eq!(parsed.transfer.max_amount, TransferSettings::default().max_amount);
        assert_eq!(parsed.keys_path, DEFAULT_KEYS_PATH);
        assert!(!parsed.wait_after_skip);
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let mut config = Config::default();
        config.transfer.min_amount = 0.01;
        config.transfer.max_amount = 0.001;
        assert!(config.validate().unwrap_err().is_configuration());

        let mut config = Config::default();
        config.transfer.min_gas_price = 2;
        config.transfer.max_gas_price = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_reserve_above_max_amount() {
        let mut config = Config::default();
        config.transfer.min_balance_reserve = config.transfer.max_amount;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "rpc_url": "http://localhost:8545", "wait_after_skip": true }}"#)
            .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.rpc_url.as_deref(), Some("http://localhost:8545"));
        assert!(config.wait_after_skip);
    }

    #[test]
    fn test_load_reports_bad_json_as_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(Config::load(file.path()).unwrap_err().is_configuration());
    }

    #[test]
    fn test_run_plan_total_slots() {
        let plan = RunPlan::new(3, 10);
        assert_eq!(plan.total_slots(4), 12);
        assert_eq!(plan.total_slots(0), 0);
        assert_eq!(RunPlan::new(0, 0).total_slots(5), 0);
        assert_eq!(plan.wait, Duration::from_secs(10));
    }
}
