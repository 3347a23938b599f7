use std::time::Duration;

/// The contract this deployer creates. Its constructor takes no arguments.
pub const CONTRACT_NAME: &str = "ChainYieldProtocol";

/// The prefix of every environment variable the deployer reads.
pub const ENV_PREFIX: &str = "DEPLOYER_";

pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";
pub const DEFAULT_CONFIRMATIONS: usize = 1;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
