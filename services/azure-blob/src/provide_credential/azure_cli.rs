use crate::constants::AZURE_STORAGE_RESOURCE;
use crate::Credential;
use async_trait::async_trait;
use blobsas_core::time::{parse_rfc3339, DateTime};
use blobsas_core::{Context, ProvideCredential, Result};
use log::debug;
use serde::Deserialize;

/// Load credential from the Azure CLI login of the current user.
///
/// Runs `az account get-access-token`. A missing `az` binary or a logged out
/// CLI is not an error, the provider just returns `None`.
#[derive(Debug, Default, Clone)]
pub struct AzureCliCredentialProvider;

impl AzureCliCredentialProvider {
    /// Create a new Azure CLI provider.
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzureCliToken {
    access_token: String,
    /// Local time like `2023-10-31 21:59:10.000000`, kept for older CLIs.
    expires_on: Option<String>,
    /// Unix timestamp, only reported by CLI 2.54.0 and later.
    #[serde(rename = "expires_on")]
    expires_on_timestamp: Option<i64>,
}

impl AzureCliToken {
    fn expires_at(&self) -> Option<DateTime> {
        if let Some(ts) = self.expires_on_timestamp {
            return chrono::DateTime::from_timestamp(ts, 0);
        }

        let expires_on = self.expires_on.as_deref()?;
        chrono::NaiveDateTime::parse_from_str(expires_on, "%Y-%m-%d %H:%M:%S%.f")
            .ok()
            .and_then(|t| t.and_local_timezone(chrono::Local).single())
            .map(|t| t.with_timezone(&chrono::Utc))
            .or_else(|| parse_rfc3339(expires_on).ok())
    }
}

#[async_trait]
impl ProvideCredential for AzureCliCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let output = match ctx
            .command_execute(
                "az",
                &[
                    "account",
                    "get-access-token",
                    "--resource",
                    AZURE_STORAGE_RESOURCE,
                    "--output",
                    "json",
                ],
            )
            .await
        {
            Ok(output) => output,
            Err(err) => {
                debug!("azure cli is not available: {err}");
                return Ok(None);
            }
        };

        if !output.success() {
            debug!(
                "azure cli failed to get access token: {}",
                String::from_utf8_lossy(&output.stderr)
            );
            return Ok(None);
        }

        let token: AzureCliToken = match serde_json::from_slice(&output.stdout) {
            Ok(token) => token,
            Err(err) => {
                debug!("failed to parse azure cli output: {err}");
                return Ok(None);
            }
        };

        Ok(Some(Credential::with_bearer_token(
            &token.access_token,
            token.expires_at(),
        )))
    }
}
