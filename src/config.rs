use crate::error::{ForwarderError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Operator-provided settings.
///
/// Only the distributor key and the receiver address are required;
/// everything else defaults to the public-network values.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub distributor_secret_key: String,
    pub receiver_address: String,
    /// Fraction of each qualifying incoming transfer to forward.
    #[serde(default = "default_send_fraction")]
    pub send_fraction: Decimal,
    /// Incoming transfers below this amount are ignored.
    #[serde(default)]
    pub min_incoming: Decimal,
    /// Starting fee-per-operation, in stroops.
    #[serde(default = "default_min_fee")]
    pub min_fee: u32,
    /// Fee escalation stops at this value.
    #[serde(default = "default_fee_cap")]
    pub fee_cap: u32,
    #[serde(default = "default_horizon_url")]
    pub horizon_url: String,
    #[serde(default = "default_network_passphrase")]
    pub network_passphrase: String,
    #[serde(default = "default_cursor_file")]
    pub cursor_file: PathBuf,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_send_fraction() -> Decimal {
    dec!(0.25)
}

fn default_min_fee() -> u32 {
    100
}

fn default_fee_cap() -> u32 {
    2000
}

fn default_horizon_url() -> String {
    "https://horizon.stellar.org".to_string()
}

fn default_network_passphrase() -> String {
    "Public Global Stellar Network ; September 2015".to_string()
}

fn default_cursor_file() -> PathBuf {
    PathBuf::from("cursor.txt")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ForwarderError::ConfigError(format!("cannot read {}: {e}", path.display()))
        })?;
        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            ForwarderError::ConfigError(format!("cannot parse {}: {e}", path.display()))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.distributor_secret_key.trim().is_empty() {
            return Err(ForwarderError::ConfigError(
                "distributor_secret_key is not set".to_string(),
            ));
        }
        if self.receiver_address.trim().is_empty() {
            return Err(ForwarderError::ConfigError(
                "receiver_address is not set".to_string(),
            ));
        }
        if self.send_fraction <= Decimal::ZERO || self.send_fraction > Decimal::ONE {
            return Err(ForwarderError::ConfigError(format!(
                "send_fraction must be in (0, 1], got {}",
                self.send_fraction
            )));
        }
        if self.fee_cap < self.min_fee {
            return Err(ForwarderError::ConfigError(format!(
                "fee_cap ({}) must be at least min_fee ({})",
                self.fee_cap, self.min_fee
            )));
        }
        Ok(())
    }
}
