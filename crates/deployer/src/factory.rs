//! Deployment factories backed by compiled artifacts and an ethers client.

use std::sync::Arc;

use async_trait::async_trait;
use contract_artifacts::ArtifactStore;
use ethers::{
    contract::ContractFactory,
    providers::{Middleware, PendingTransaction},
    types::{Address, TxHash, U64},
};
use eyre::{eyre, Result, WrapErr};
use tracing::debug;

use crate::driver::{DeploymentFactory, FactoryResolver, PendingDeployment};

/// Resolves contracts from an artifact store and deploys them with `client`,
/// which holds the deployer's signer.
pub struct ArtifactResolver<M> {
    store: ArtifactStore,
    client: Arc<M>,
    confirmations: usize,
}

impl<M: Middleware + 'static> ArtifactResolver<M> {
    pub fn new(store: ArtifactStore, client: Arc<M>, confirmations: usize) -> Self {
        Self {
            store,
            client,
            confirmations,
        }
    }
}

#[async_trait]
impl<M: Middleware + 'static> FactoryResolver for ArtifactResolver<M> {
    type Factory = EthersFactory<M>;

    async fn resolve(&self, contract: &str) -> Result<EthersFactory<M>> {
        let artifact = self.store.load(contract)?;
        Ok(EthersFactory {
            factory: ContractFactory::new(artifact.abi, artifact.bytecode, self.client.clone()),
            client: self.client.clone(),
            confirmations: self.confirmations,
        })
    }
}

pub struct EthersFactory<M> {
    factory: ContractFactory<M>,
    client: Arc<M>,
    confirmations: usize,
}

#[async_trait]
impl<M: Middleware + 'static> DeploymentFactory for EthersFactory<M> {
    type Pending = EthersPendingDeployment<M>;

    async fn deploy(self) -> Result<EthersPendingDeployment<M>> {
        // The constructor takes no arguments. An ABI that declares some makes
        // the encoding fail here, before anything is sent.
        let deployer = self
            .factory
            .deploy(())
            .wrap_err("couldn't build the deployment transaction")?;
        debug!(tx = ?deployer.tx, "sending deployment transaction");

        let tx_hash = *self.client.send_transaction(deployer.tx, None).await?;

        Ok(EthersPendingDeployment {
            client: self.client,
            tx_hash,
            confirmations: self.confirmations,
        })
    }
}

pub struct EthersPendingDeployment<M> {
    client: Arc<M>,
    tx_hash: TxHash,
    confirmations: usize,
}

#[async_trait]
impl<M: Middleware + 'static> PendingDeployment for EthersPendingDeployment<M> {
    fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    async fn confirm(self) -> Result<Address> {
        let receipt = PendingTransaction::new(self.tx_hash, self.client.provider())
            .confirmations(self.confirmations)
            .await?
            .ok_or_else(|| eyre!("transaction {:?} was dropped from the mempool", self.tx_hash))?;
        debug!(
            block_number = ?receipt.block_number,
            gas_used = ?receipt.gas_used,
            "deployment mined"
        );

        // Out of gas shows up as a revert as well.
        if receipt.status == Some(U64::zero()) {
            return Err(eyre!(
                "transaction {:?} reverted in block {}",
                self.tx_hash,
                receipt
                    .block_number
                    .map_or_else(|| "?".to_string(), |number| number.to_string())
            ));
        }

        receipt
            .contract_address
            .ok_or_else(|| eyre!("receipt of {:?} has no contract address", self.tx_hash))
    }
}
