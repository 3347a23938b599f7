use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use ethers::{
    core::utils::Anvil,
    middleware::{signer::SignerMiddlewareError, SignerMiddleware},
    providers::{
        Http, HttpRateLimitRetryPolicy, Middleware, Provider, RetryClient, RetryClientBuilder,
    },
    signers::{LocalWallet, Signer},
    types::{Address, U256},
    utils::AnvilInstance,
};
use eyre::{eyre, Result};
use tracing::info;

type ChainClientProvider = Arc<RetryClient<Http>>;

type ChainClientInner<S> = SignerMiddleware<Provider<ChainClientProvider>, S>;

/// A signing client. Transport errors that the node flags as rate limiting
/// are retried by the provider; everything else surfaces to the caller.
#[derive(Debug)]
pub struct ChainClient<S: Signer + 'static> {
    inner: ChainClientInner<S>,
    address: Address,
}

impl<S: Signer + 'static> ChainClient<S> {
    pub async fn new(provider: Provider<Http>, signer: S) -> Result<Self> {
        let interval = provider.get_interval();
        let provider = RetryClientBuilder::default()
            .rate_limit_retries(10)
            .timeout_retries(3)
            .initial_backoff(Duration::from_millis(100))
            .build(
                provider.as_ref().clone(),
                Box::<HttpRateLimitRetryPolicy>::default(),
            );
        let provider = Provider::new(Arc::new(provider)).interval(interval);

        // The signer picks up the chain id from the node so that the signed
        // transaction is replay protected.
        let inner = SignerMiddleware::new_with_provider_chain(provider, signer).await?;
        let address = inner.address();

        Ok(Self { inner, address })
    }

    /// Gets the client's address.
    pub fn address(&self) -> Address {
        self.address
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<S: Signer + 'static> Middleware for ChainClient<S> {
    // NOTE: This is a pass-through middleware implementation, so we just use
    // the error from the top of the middleware stack.
    type Error = SignerMiddlewareError<Self::Inner, S>;

    type Provider = ChainClientProvider;
    type Inner = ChainClientInner<S>;

    fn inner(&self) -> &Self::Inner {
        &self.inner
    }
}

/// The network a deployment is sent to. Without an RPC URL, a throwaway anvil
/// node is spawned and lives as long as the `Chain`.
pub struct Chain {
    provider: Provider<Http>,
    client_version: String,
    maybe_anvil: Option<AnvilInstance>,
}

impl Chain {
    /// Connects to the node at `maybe_rpc_url`, or spawns an anvil node if the
    /// URL is excluded. Fails if the node doesn't answer.
    pub async fn connect(maybe_rpc_url: Option<String>, interval: Duration) -> Result<Self> {
        let (provider, maybe_anvil) = if let Some(rpc_url) = maybe_rpc_url {
            (Provider::<Http>::try_from(rpc_url)?, None)
        } else {
            let anvil = Anvil::new().try_spawn()?;
            (Provider::<Http>::try_from(anvil.endpoint())?, Some(anvil))
        };
        let provider = provider.interval(interval);
        let client_version = provider.client_version().await?;
        info!(%client_version, "connected to chain");

        Ok(Self {
            provider,
            client_version,
            maybe_anvil,
        })
    }
}

impl Chain {
    /// A provider that can access the chain.
    pub fn provider(&self) -> Provider<Http> {
        self.provider.clone()
    }

    /// A client that can access the chain.
    pub async fn client<S: Signer + 'static>(&self, signer: S) -> Result<Arc<ChainClient<S>>> {
        Ok(Arc::new(ChainClient::new(self.provider(), signer).await?))
    }

    /// The first funded account of a spawned anvil node.
    pub fn dev_account(&self) -> Result<LocalWallet> {
        self.maybe_anvil
            .as_ref()
            .and_then(|anvil| anvil.keys().first())
            .map(|key| LocalWallet::from(key.clone()))
            .ok_or_else(|| eyre!("no dev accounts: the chain wasn't spawned by the deployer"))
    }

    /// Mints ether to an address. This only works for anvil chains.
    pub async fn deal<U: Into<U256>>(&self, address: Address, amount: U) -> Result<()> {
        if !self.is_anvil() {
            return Err(eyre!("can't deal ether on a non-anvil chain"));
        }
        let balance = self.provider.get_balance(address, None).await?;
        self.provider
            .request::<(Address, U256), ()>("anvil_setBalance", (address, balance + amount.into()))
            .await?;
        Ok(())
    }

    /// Checks to see if the underlying chain is an anvil chain.
    fn is_anvil(&self) -> bool {
        self.client_version.contains("anvil")
    }
}
