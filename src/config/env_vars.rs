use std::fmt;

use log::error;

use crate::config::StorageConfig;
use crate::error::BackupError;

/// COS credentials read from the process environment.
///
/// `Debug` never prints the secret values.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub secret_id: String,
    pub secret_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("secret_id", &"<REDACTED>")
            .field("secret_key", &"<REDACTED>")
            .finish()
    }
}

impl Credentials {
    /// Read both credential variables named by `config` from the environment.
    pub fn from_env(config: &StorageConfig) -> Result<Self, BackupError> {
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }

    /// Read both credential variables through `lookup`.
    ///
    /// Fails on the first missing or empty variable, in the order id then key.
    pub fn from_lookup<F>(config: &StorageConfig, lookup: F) -> Result<Self, BackupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_id = read_required_var(&config.secret_id_var, &lookup)?;
        let secret_key = read_required_var(&config.secret_key_var, &lookup)?;
        Ok(Self { secret_id, secret_key })
    }
}

/// Look up one required variable, logging and failing when it is absent.
pub fn read_required_var<F>(name: &str, lookup: &F) -> Result<String, BackupError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => {
            error!("Missing environment variable: {}", name);
            Err(BackupError::Configuration(format!(
                "missing environment variable: {}",
                name
            )))
        }
    }
}
