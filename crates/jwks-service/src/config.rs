use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Default SQLite database, recreated on every start.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://totally_not_my_privateKeys.db";

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";

/// Lifetime of the valid key, and how far in the past the expired key expired.
pub const DEFAULT_KEY_LIFETIME_SECONDS: i64 = 3600;

/// One year.
pub const MAX_KEY_LIFETIME_SECONDS: i64 = 365 * 24 * 3600;

pub const DEFAULT_RSA_KEY_BITS: usize = 2048;

/// Minimum RSA modulus size accepted for RS256.
pub const MIN_RSA_KEY_BITS: usize = 2048;

pub const MAX_RSA_KEY_BITS: usize = 4096;

pub const DEFAULT_DRAIN_SECONDS: u64 = 0;

/// How the key store decides which record is "valid" and which is "expired".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeySelectionPolicy {
    /// Compare each record's `exp` against the current time.
    #[default]
    Expiry,
    /// Select by insertion order of the two startup keys (`kid = 1` for valid,
    /// first `kid < 2` for expired).
    KeyId,
}

impl KeySelectionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySelectionPolicy::Expiry => "expiry",
            KeySelectionPolicy::KeyId => "key-id",
        }
    }
}

impl FromStr for KeySelectionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "expiry" => Ok(KeySelectionPolicy::Expiry),
            "key-id" | "key_id" | "kid" => Ok(KeySelectionPolicy::KeyId),
            other => Err(ConfigError::InvalidSelectionPolicy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub key_selection_policy: KeySelectionPolicy,
    pub key_lifetime_seconds: i64,
    pub rsa_key_bits: usize,
    pub drain_seconds: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid key selection policy: {0} (expected 'expiry' or 'key-id')")]
    InvalidSelectionPolicy(String),

    #[error("Invalid key lifetime: {0}")]
    InvalidKeyLifetime(String),

    #[error("Invalid RSA key size: {0}")]
    InvalidKeyBits(String),

    #[error("Invalid drain period: {0}")]
    InvalidDrainSeconds(String),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            key_selection_policy: KeySelectionPolicy::default(),
            key_lifetime_seconds: DEFAULT_KEY_LIFETIME_SECONDS,
            rsa_key_bits: DEFAULT_RSA_KEY_BITS,
            drain_seconds: DEFAULT_DRAIN_SECONDS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let key_selection_policy = match vars.get("KEY_SELECTION_POLICY") {
            Some(value) => value.parse()?,
            None => KeySelectionPolicy::default(),
        };

        let key_lifetime_seconds = match vars.get("KEY_LIFETIME_SECONDS") {
            Some(value) => {
                let seconds: i64 = value.parse().map_err(|e| {
                    ConfigError::InvalidKeyLifetime(format!("'{}' is not an integer: {}", value, e))
                })?;
                if seconds <= 0 {
                    return Err(ConfigError::InvalidKeyLifetime(format!(
                        "must be positive, got {}",
                        seconds
                    )));
                }
                if seconds > MAX_KEY_LIFETIME_SECONDS {
                    return Err(ConfigError::InvalidKeyLifetime(format!(
                        "must be at most {}, got {}",
                        MAX_KEY_LIFETIME_SECONDS, seconds
                    )));
                }
                seconds
            }
            None => DEFAULT_KEY_LIFETIME_SECONDS,
        };

        let rsa_key_bits = match vars.get("RSA_KEY_BITS") {
            Some(value) => {
                let bits: usize = value.parse().map_err(|e| {
                    ConfigError::InvalidKeyBits(format!("'{}' is not an integer: {}", value, e))
                })?;
                if !(MIN_RSA_KEY_BITS..=MAX_RSA_KEY_BITS).contains(&bits) {
                    return Err(ConfigError::InvalidKeyBits(format!(
                        "expected {}..={}, got {}",
                        MIN_RSA_KEY_BITS, MAX_RSA_KEY_BITS, bits
                    )));
                }
                bits
            }
            None => DEFAULT_RSA_KEY_BITS,
        };

        let drain_seconds = match vars.get("DRAIN_SECONDS") {
            Some(value) => value.parse().map_err(|e| {
                ConfigError::InvalidDrainSeconds(format!("'{}' is not an integer: {}", value, e))
            })?,
            None => DEFAULT_DRAIN_SECONDS,
        };

        Ok(Config {
            database_url,
            bind_address,
            key_selection_policy,
            key_lifetime_seconds,
            rsa_key_bits,
            drain_seconds,
        })
    }
}
