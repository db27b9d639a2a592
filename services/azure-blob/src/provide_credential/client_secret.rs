use super::token_endpoint_error;
use crate::constants::AZURE_STORAGE_SCOPE;
use crate::{Config, Credential};
use async_trait::async_trait;
use blobsas_core::time::now;
use blobsas_core::{Context, Error, ProvideCredential, Result};
use http::header::CONTENT_TYPE;
use log::debug;

/// Load credential from a Microsoft Entra ID application secret.
///
/// Requires `tenant_id`, `client_id` and `client_secret`, either set on the
/// config or available as `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and
/// `AZURE_CLIENT_SECRET`. Returns `None` when any of them is missing.
///
/// Reference: <https://learn.microsoft.com/en-us/entra/identity-platform/v2-oauth2-client-creds-grant-flow>
#[derive(Debug, Default, Clone)]
pub struct ClientSecretCredentialProvider {
    config: Config,
}

impl ClientSecretCredentialProvider {
    /// Create a new client secret provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new client secret provider with given config.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProvideCredential for ClientSecretCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let config = self.config.clone().from_env(ctx);

        let (Some(tenant_id), Some(client_id), Some(client_secret)) = (
            config.tenant_id.as_deref(),
            config.client_id.as_deref(),
            config.client_secret.as_deref(),
        ) else {
            return Ok(None);
        };

        let url = format!(
            "{}/{tenant_id}/oauth2/v2.0/token",
            config.authority_host()
        );
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("scope", AZURE_STORAGE_SCOPE)
            .append_pair("client_id", client_id)
            .append_pair("client_secret", client_secret)
            .append_pair("grant_type", "client_credentials")
            .finish();

        let req = http::Request::post(&url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body.into())?;

        debug!("requesting bearer token for client {client_id} from {url}");
        let resp = ctx.http_send(req).await?;
        if !resp.status().is_success() {
            return Err(token_endpoint_error(
                "client secret",
                resp.status(),
                resp.body(),
            ));
        }

        let token: TokenResponse = serde_json::from_slice(resp.body()).map_err(|e| {
            Error::unexpected("failed to parse client secret response").with_source(e)
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
