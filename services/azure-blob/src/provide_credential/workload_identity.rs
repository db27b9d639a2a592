use super::token_endpoint_error;
use crate::constants::AZURE_STORAGE_SCOPE;
use crate::{Config, Credential};
use async_trait::async_trait;
use blobsas_core::time::now;
use blobsas_core::{Context, Error, ProvideCredential, Result};
use http::header::CONTENT_TYPE;
use log::debug;

const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// Load credential from Azure Workload Identity.
///
/// Exchanges the federated token found in `AZURE_FEDERATED_TOKEN_FILE` for a
/// storage bearer token. Used by workloads running in AKS.
///
/// Reference: <https://learn.microsoft.com/en-us/azure/aks/workload-identity-overview>
#[derive(Debug, Default, Clone)]
pub struct WorkloadIdentityCredentialProvider {
    config: Config,
}

impl WorkloadIdentityCredentialProvider {
    /// Create a new workload identity provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new workload identity provider with given config.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProvideCredential for WorkloadIdentityCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let config = self.config.clone().from_env(ctx);

        let (Some(tenant_id), Some(client_id), Some(token_file)) = (
            config.tenant_id.as_deref(),
            config.client_id.as_deref(),
            config.federated_token_file.as_deref(),
        ) else {
            return Ok(None);
        };

        let federated_token = match ctx.file_read_as_string(token_file).await {
            Ok(content) => content,
            Err(err) => {
                debug!("failed to read federated token file {token_file}: {err}");
                return Ok(None);
            }
        };
        let federated_token = federated_token.trim();
        if federated_token.is_empty() {
            return Ok(None);
        }

        let url = format!(
            "{}/{tenant_id}/oauth2/v2.0/token",
            config.authority_host()
        );
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("scope", AZURE_STORAGE_SCOPE)
            .append_pair("client_id", client_id)
            .append_pair("client_assertion_type", CLIENT_ASSERTION_TYPE)
            .append_pair("client_assertion", federated_token)
            .append_pair("grant_type", "client_credentials")
            .finish();

        let req = http::Request::post(&url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body.into())?;

        let resp = ctx.http_send(req).await?;
        if !resp.status().is_success() {
            return Err(token_endpoint_error(
                "workload identity",
                resp.status(),
                resp.body(),
            ));
        }

        let token: TokenResponse = serde_json::from_slice(resp.body()).map_err(|e| {
            Error::unexpected("failed to parse workload identity response").with_source(e)
        })?;
        let expires_on = now() + chrono::TimeDelta::seconds(token.expires_in);

        Ok(Some(Credential::with_bearer_token(
            &token.access_token,
            Some(expires_on),
        )))
    }
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}
