use super::*;
use crate::{Config, Credential};
use async_trait::async_trait;
use blobsas_core::{Context, ProvideCredential, ProvideCredentialChain, Result};

/// DefaultCredentialProvider resolves a bearer token the way a developer
/// machine and a deployed service both expect.
///
/// Providers are tried in this order:
///
/// 1. [`EnvCredentialProvider`]: `AZURE_STORAGE_BEARER_TOKEN`
/// 2. [`ClientSecretCredentialProvider`]: service principal with a secret
/// 3. [`WorkloadIdentityCredentialProvider`]: federated token in AKS
/// 4. [`ImdsCredentialProvider`]: managed identity
/// 5. [`AzureCliCredentialProvider`]: `az login` of the current user
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl DefaultCredentialProvider {
    /// Create a new default provider that loads everything from env.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new default provider with given config.
    ///
    /// Fields left as `None` are still loaded from env.
    pub fn with_config(config: Config) -> Self {
        let chain = ProvideCredentialChain::new()
            .push(EnvCredentialProvider::new())
            .push(ClientSecretCredentialProvider::with_config(config.clone()))
            .push(WorkloadIdentityCredentialProvider::with_config(
                config.clone(),
            ))
            .push(ImdsCredentialProvider::with_config(config))
            .push(AzureCliCredentialProvider::new());

        Self { chain }
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}
