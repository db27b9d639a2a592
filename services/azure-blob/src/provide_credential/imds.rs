use super::token_endpoint_error;
use crate::constants::*;
use crate::{Config, Credential};
use async_trait::async_trait;
use blobsas_core::time::{now, parse_rfc3339, parse_timestamp, DateTime};
use blobsas_core::{Context, Error, ProvideCredential, Result};
use log::debug;

const IMDS_API_VERSION: &str = "2018-02-01";

/// Load credential from the Azure Instance Metadata Service.
///
/// Works on VMs, App Service and other hosts with a managed identity. A user
/// assigned identity is selected by `object_id`, `client_id` or `msi_res_id`,
/// checked in that order.
///
/// Reference: <https://learn.microsoft.com/en-us/entra/identity/managed-identities-azure-resources/how-to-use-vm-token>
#[derive(Debug, Default, Clone)]
pub struct ImdsCredentialProvider {
    config: Config,
}

impl ImdsCredentialProvider {
    /// Create a new IMDS provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new IMDS provider with given config.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProvideCredential for ImdsCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let config = self.config.clone().from_env(ctx);

        let endpoint = config.msi_endpoint.as_deref().unwrap_or(AZURE_IMDS_ENDPOINT);
        let url = token_url(endpoint, &config);

        let mut req = http::Request::get(&url).header("Metadata", "true");
        if let Some(secret) = &config.msi_secret {
            req = req.header(X_MS_IDENTITY_HEADER, secret);
        }

        debug!("requesting managed identity token from {endpoint}");
        let resp = ctx.http_send(req.body(bytes::Bytes::new())?).await?;
        if !resp.status().is_success() {
            return Err(token_endpoint_error("IMDS", resp.status(), resp.body()));
        }

        let token: TokenResponse = serde_json::from_slice(resp.body())
            .map_err(|e| Error::unexpected("failed to parse IMDS response").with_source(e))?;

        Ok(Some(Credential::with_bearer_token(
            &token.access_token,
            Some(parse_expires_on(&token.expires_on)),
        )))
    }
}

/// The serializer is not `Send`, keep it out of the provider future.
fn token_url(endpoint: &str, config: &Config) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query
        .append_pair("api-version", IMDS_API_VERSION)
        .append_pair("resource", AZURE_STORAGE_RESOURCE);
    if let Some(object_id) = &config.object_id {
        query.append_pair("object_id", object_id);
    } else if let Some(client_id) = &config.client_id {
        query.append_pair("client_id", client_id);
    } else if let Some(msi_res_id) = &config.msi_res_id {
        query.append_pair("msi_res_id", msi_res_id);
    }

    format!("{endpoint}?{}", query.finish())
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_on: String,
}

/// IMDS reports `expires_on` as epoch seconds, while App Service reports an
/// RFC 3339 time. Unknown formats expire in ten minutes.
fn parse_expires_on(expires_on: &str) -> DateTime {
    parse_timestamp(expires_on)
        .or_else(|_| parse_rfc3339(expires_on))
        .unwrap_or_else(|_| now() + chrono::TimeDelta::minutes(10))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provide_credential::mock::MockHttpSend;
    use blobsas_core::{ErrorKind, StaticEnv};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_imds() {
        let http = MockHttpSend::new(
            200,
            r#"{"access_token":"msi-token","expires_on":"1646122354","resource":"https://storage.azure.com/","token_type":"Bearer"}"#,
        );
        let ctx = Context::new()
            .with_http_send(http.clone())
            .with_env(StaticEnv::from_pairs([
                ("AZURE_CLIENT_ID", "client"),
                ("AZURE_MSI_SECRET", "identity-secret"),
            ]));

        let cred = ImdsCredentialProvider::new()
            .provide_credential(&ctx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cred.token, "msi-token");
        assert_eq!(
            cred.expires_in,
            Some(chrono::Utc.with_ymd_and_hms(2022, 3, 1, 8, 12, 34).unwrap())
        );

        let requests = http.requests();
        assert_eq!(
            requests[0].uri(),
            "http://169.254.169.254/metadata/identity/oauth2/token?api-version=2018-02-01&resource=https%3A%2F%2Fstorage.azure.com%2F&client_id=client"
        );
        assert_eq!(requests[0].headers()["Metadata"], "true");
        assert_eq!(requests[0].headers()[X_MS_IDENTITY_HEADER], "identity-secret");
    }

    #[tokio::test]
    async fn test_imds_object_id_wins() {
        let http = MockHttpSend::new(200, r#"{"access_token":"msi-token"}"#);
        let config = Config {
            object_id: Some("object".to_string()),
            client_id: Some("client".to_string()),
            msi_endpoint: Some("http://localhost:42356/msi/token".to_string()),
            ..Default::default()
        };
        let ctx = Context::new().with_http_send(http.clone());

        let cred = ImdsCredentialProvider::with_config(config)
            .provide_credential(&ctx)
            .await
            .unwrap()
            .unwrap();
        assert!(cred.expires_in.unwrap() > now());

        let requests = http.requests();
        assert_eq!(
            requests[0].uri(),
            "http://localhost:42356/msi/token?api-version=2018-02-01&resource=https%3A%2F%2Fstorage.azure.com%2F&object_id=object"
        );
    }

    #[tokio::test]
    async fn test_imds_failure() {
        let http = MockHttpSend::new(400, r#"{"error":"invalid_request"}"#);
        let ctx = Context::new().with_http_send(http);

        let err = ImdsCredentialProvider::new()
            .provide_credential(&ctx)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CredentialDenied);
    }

    #[tokio::test]
    async fn test_imds_runs_on_spawned_task() {
        let http = MockHttpSend::new(200, r#"{"access_token":"msi-token"}"#);
        let ctx = Context::new().with_http_send(http);

        let cred = tokio::spawn(async move {
            ImdsCredentialProvider::new().provide_credential(&ctx).await
        })
        .await
        .unwrap()
        .unwrap()
        .unwrap();
        assert_eq!(cred.token, "msi-token");
    }

    #[test]
    fn test_token_url_with_resource_id() {
        let config = Config {
            msi_res_id: Some("/subscriptions/sub/rg/id".to_string()),
            ..Default::default()
        };

        assert_eq!(
            token_url(AZURE_IMDS_ENDPOINT, &config),
            "http://169.254.169.254/metadata/identity/oauth2/token?api-version=2018-02-01&resource=https%3A%2F%2Fstorage.azure.com%2F&msi_res_id=%2Fsubscriptions%2Fsub%2Frg%2Fid"
        );
    }

    #[test]
    fn test_parse_expires_on() {
        let expected = chrono::Utc.with_ymd_and_hms(2022, 3, 1, 8, 12, 34).unwrap();
        assert_eq!(parse_expires_on("1646122354"), expected);
        assert_eq!(parse_expires_on("2022-03-01T08:12:34+00:00"), expected);
        assert!(parse_expires_on("soon") > now());
    }
}
