use crate::Credential;
use async_trait::async_trait;
use blobsas_core::{Context, ProvideCredential, Result};

/// StaticCredentialProvider always returns the bearer token it was built with.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    token: String,
}

impl StaticCredentialProvider {
    /// Create a new static provider from a bearer token.
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
        }
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(Credential::with_bearer_token(&self.token, None)))
    }
}
