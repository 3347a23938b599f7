use std::{fs, path::Path, sync::Arc, time::Duration};

use contract_artifacts::ArtifactStore;
use deployer::{
    chain::{Chain, ChainClient},
    driver::DeploymentDriver,
    factory::ArtifactResolver,
};
use ethers::{
    providers::Middleware,
    signers::{LocalWallet, Signer},
    types::Bytes,
    utils::{keccak256, parse_ether},
};
use eyre::Result;

/// Creation code that returns a one byte runtime (`STOP`).
const STOP_INIT_CODE: &str = "0x6001600c60003960016000f300";

/// Creation code that reverts.
const REVERT_INIT_CODE: &str = "0x60006000fd";

fn write_artifact(root: &Path, name: &str, bytecode: &str) -> Result<()> {
    let dir = root.join(format!("contracts/{name}.sol"));
    fs::create_dir_all(&dir)?;
    fs::write(
        dir.join(format!("{name}.json")),
        format!(r#"{{"contractName":"{name}","abi":[],"bytecode":"{bytecode}"}}"#),
    )?;
    Ok(())
}

async fn setup(artifacts: &Path) -> Result<(Chain, Arc<ChainClient<LocalWallet>>)> {
    let _ = tracing_subscriber::fmt::try_init();

    // Fund a fresh deployer on a local anvil chain.
    let chain = Chain::connect(None, Duration::from_millis(1)).await?;
    let alice = LocalWallet::from_bytes(&keccak256("alice"))?;
    chain.deal(alice.address(), parse_ether(10)?).await?;
    let client = chain.client(alice).await?;

    write_artifact(artifacts, "ChainYieldProtocol", STOP_INIT_CODE)?;
    write_artifact(artifacts, "Reverting", REVERT_INIT_CODE)?;

    Ok((chain, client))
}

// Needs `anvil` on the PATH.
#[ignore]
#[tokio::test]
async fn test_deploy_to_anvil() -> Result<()> {
    let artifacts = tempfile::tempdir()?;
    let (_chain, client) = setup(artifacts.path()).await?;
    let resolver = || {
        ArtifactResolver::new(
            ArtifactStore::new(artifacts.path()),
            client.clone(),
            1,
        )
    };

    let first = DeploymentDriver::new(resolver()).run().await?;
    assert_eq!(first.contract, "ChainYieldProtocol");
    let code = client.get_code(first.address, None).await?;
    assert_eq!(code, Bytes::from(vec![0x00]));

    // Running again creates a second contract.
    let second = DeploymentDriver::new(resolver()).run().await?;
    assert_ne!(first.address, second.address);
    assert_ne!(first.transaction_hash, second.transaction_hash);

    Ok(())
}

#[ignore]
#[tokio::test]
async fn test_deploy_failures_on_anvil() -> Result<()> {
    let artifacts = tempfile::tempdir()?;
    let (_chain, client) = setup(artifacts.path()).await?;
    let resolver = || {
        ArtifactResolver::new(
            ArtifactStore::new(artifacts.path()),
            client.clone(),
            1,
        )
    };

    let err = DeploymentDriver::new(resolver())
        .with_contract("Missing")
        .run()
        .await
        .unwrap_err();
    assert!(format!("{err:?}").contains("artifact not found"));

    // The node rejects the reverting constructor while estimating gas, so the
    // deployment never makes it into a block.
    let nonce = client.get_transaction_count(client.address(), None).await?;
    let err = DeploymentDriver::new(resolver())
        .with_contract("Reverting")
        .run()
        .await
        .unwrap_err();
    assert!(err.to_string().contains("failed to submit deployment"));
    assert_eq!(
        client.get_transaction_count(client.address(), None).await?,
        nonce
    );

    Ok(())
}
