use std::{fmt, path::PathBuf, time::Duration};

use ethers::signers::LocalWallet;
use eyre::{eyre, Result, WrapErr};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_ARTIFACTS_DIR, DEFAULT_CONFIRMATIONS, DEFAULT_POLL_INTERVAL, ENV_PREFIX,
};

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from(DEFAULT_ARTIFACTS_DIR)
}

fn default_confirmations() -> usize {
    DEFAULT_CONFIRMATIONS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

/// Where to deploy from and to. Read from `DEPLOYER_*` environment variables.
#[derive(Clone, Deserialize)]
pub struct DeployConfig {
    /// The JSON-RPC endpoint. If None, a local anvil node is spawned.
    pub ethereum_url: Option<String>,
    private_key: Option<String>,
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,
    #[serde(default = "default_confirmations")]
    pub confirmations: usize,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

// The private key stays out of logs.
impl fmt::Debug for DeployConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployConfig")
            .field("ethereum_url", &self.ethereum_url)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("artifacts_dir", &self.artifacts_dir)
            .field("confirmations", &self.confirmations)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .finish()
    }
}

impl DeployConfig {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::prefixed(ENV_PREFIX)
            .from_iter(vars)
            .wrap_err("invalid deployer configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.confirmations == 0 {
            return Err(eyre!("{ENV_PREFIX}CONFIRMATIONS must be at least 1"));
        }
        if self.ethereum_url.is_some() && self.private_key.is_none() {
            return Err(eyre!(
                "{ENV_PREFIX}PRIVATE_KEY is required when {ENV_PREFIX}ETHEREUM_URL is set"
            ));
        }
        self.wallet()?;
        Ok(())
    }

    /// The deployer's wallet, if a private key was configured.
    pub fn wallet(&self) -> Result<Option<LocalWallet>> {
        self.private_key
            .as_deref()
            .map(|key| {
                key.trim()
                    .trim_start_matches("0x")
                    .parse::<LocalWallet>()
                    .map_err(|_| eyre!("{ENV_PREFIX}PRIVATE_KEY is not a valid private key"))
            })
            .transpose()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
