//! Drives a single contract deployment: resolve a factory, submit the
//! deployment transaction, wait for confirmation.
//!
//! Every step is awaited in order and the first failure ends the run. Nothing
//! is retried here; a failed deployment is re-attempted by running the
//! deployer again.

use async_trait::async_trait;
use ethers::types::{Address, TxHash};
use eyre::{Result, WrapErr};
use tracing::info;

use crate::constants::CONTRACT_NAME;

/// Resolves a contract name to a factory that can deploy it.
#[async_trait]
pub trait FactoryResolver: Send + Sync {
    type Factory: DeploymentFactory;

    async fn resolve(&self, contract: &str) -> Result<Self::Factory>;
}

/// Submits a deployment transaction. A factory is used up by its deployment.
#[async_trait]
pub trait DeploymentFactory: Send {
    type Pending: PendingDeployment;

    /// Sends the deployment transaction and returns without waiting for it to
    /// be mined.
    async fn deploy(self) -> Result<Self::Pending>;
}

/// A deployment transaction that was accepted but isn't confirmed yet.
#[async_trait]
pub trait PendingDeployment: Send {
    fn tx_hash(&self) -> TxHash;

    /// Waits until the transaction is confirmed and returns the address of
    /// the created contract.
    async fn confirm(self) -> Result<Address>;
}

/// A confirmed contract deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deployment {
    pub contract: String,
    pub address: Address,
    pub transaction_hash: TxHash,
}

pub struct DeploymentDriver<R> {
    resolver: R,
    contract: String,
}

impl<R: FactoryResolver> DeploymentDriver<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            contract: CONTRACT_NAME.to_string(),
        }
    }

    /// Deploys `contract` instead of the default contract.
    pub fn with_contract(mut self, contract: impl Into<String>) -> Self {
        self.contract = contract.into();
        self
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// Runs the deployment to completion. The driver is consumed, so each
    /// driver sends at most one deployment transaction.
    pub async fn run(self) -> Result<Deployment> {
        let Self { resolver, contract } = self;

        let factory = resolver
            .resolve(&contract)
            .await
            .wrap_err_with(|| format!("failed to resolve factory for {contract}"))?;
        info!(%contract, "factory resolved");

        let pending = factory
            .deploy()
            .await
            .wrap_err_with(|| format!("failed to submit deployment of {contract}"))?;
        let transaction_hash = pending.tx_hash();
        info!(%contract, tx_hash = ?transaction_hash, "deployment submitted");

        let address = pending.confirm().await.wrap_err_with(|| {
            format!("failed to confirm deployment of {contract} in {transaction_hash:?}")
        })?;
        info!(%contract, address = ?address, "deployment confirmed");

        Ok(Deployment {
            contract,
            address,
            transaction_hash,
        })
    }
}
