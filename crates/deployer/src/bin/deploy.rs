//! Deploys the ChainYieldProtocol contract and prints its address.
//!
//! The network and the deployer's key are configured through `DEPLOYER_*`
//! environment variables, optionally from a `.env` file. Without an RPC URL
//! the contract is deployed to a throwaway anvil node.

use std::{io, process::ExitCode};

use contract_artifacts::ArtifactStore;
use deployer::{
    chain::Chain,
    config::DeployConfig,
    driver::{Deployment, DeploymentDriver},
    factory::ArtifactResolver,
    report::report,
};
use eyre::Result;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // The .env file is optional.
    dotenvy::dotenv().ok();

    // Logs go to stderr so that stdout only carries the deployed address.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let result = deploy().await;
    report(&result, &mut io::stdout().lock(), &mut io::stderr().lock()).into()
}

async fn deploy() -> Result<Deployment> {
    let config = DeployConfig::from_env()?;
    debug!(?config, "loaded configuration");

    // Connect to the chain and get a client for the deployer. The chain has
    // to outlive the deployment since it may own the anvil node.
    let chain = Chain::connect(config.ethereum_url.clone(), config.poll_interval()).await?;
    let signer = match config.wallet()? {
        Some(wallet) => wallet,
        None => chain.dev_account()?,
    };
    let client = chain.client(signer).await?;

    let resolver = ArtifactResolver::new(
        ArtifactStore::new(&config.artifacts_dir),
        client,
        config.confirmations,
    );
    DeploymentDriver::new(resolver).run().await
}
