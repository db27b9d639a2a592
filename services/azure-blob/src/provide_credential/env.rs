use crate::constants::AZURE_STORAGE_BEARER_TOKEN;
use crate::Credential;
use async_trait::async_trait;
use blobsas_core::{Context, ProvideCredential, Result};

/// EnvCredentialProvider loads a pre-issued bearer token from
/// `AZURE_STORAGE_BEARER_TOKEN`.
#[derive(Debug, Default, Clone)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new env provider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        Ok(ctx
            .env_var_non_empty(AZURE_STORAGE_BEARER_TOKEN)
            .map(|token| Credential::with_bearer_token(&token, None)))
    }
}
