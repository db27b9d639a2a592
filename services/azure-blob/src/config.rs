use blobsas_core::Context;

use crate::constants::*;

/// Config carries the settings used by the credential providers.
///
/// Every field that is already `Some` wins over the environment; the rest are
/// filled by [`Config::from_env`].
#[derive(Clone, Default)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Config {
    /// `tenant_id` value will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_TENANT_ID`]
    pub tenant_id: Option<String>,
    /// `client_id` value will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_CLIENT_ID`]
    ///
    /// Also selects a user assigned managed identity when talking to IMDS.
    pub client_id: Option<String>,
    /// `client_secret` value will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_CLIENT_SECRET`]
    pub client_secret: Option<String>,
    /// `federated_token_file` value will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_FEDERATED_TOKEN_FILE`]
    pub federated_token_file: Option<String>,
    /// `authority_host` value will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_AUTHORITY_HOST`]
    /// - `https://login.microsoftonline.com`
    pub authority_host: Option<String>,
    /// Object id of a user assigned managed identity.
    ///
    /// Takes precedence over `client_id` and `msi_res_id` when talking to IMDS.
    pub object_id: Option<String>,
    /// ARM resource id of a user assigned managed identity.
    pub msi_res_id: Option<String>,
    /// Endpoint from which the managed identity token should be retrieved.
    ///
    /// Falls back to `http://169.254.169.254/metadata/identity/oauth2/token`.
    pub msi_endpoint: Option<String>,
    /// Secret sent as `X-IDENTITY-HEADER` to the managed identity endpoint.
    ///
    /// This header mitigates server-side request forgery (SSRF) attacks.
    pub msi_secret: Option<String>,
}

impl Config {
    /// Fill every unset field from the environment of `ctx`.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let load = |field: &mut Option<String>, key: &str| {
            if field.is_none() {
                *field = ctx.env_var_non_empty(key);
            }
        };

        load(&mut self.tenant_id, AZURE_TENANT_ID);
        load(&mut self.client_id, AZURE_CLIENT_ID);
        load(&mut self.client_secret, AZURE_CLIENT_SECRET);
        load(&mut self.federated_token_file, AZURE_FEDERATED_TOKEN_FILE);
        load(&mut self.authority_host, AZURE_AUTHORITY_HOST);
        load(&mut self.object_id, AZURE_OBJECT_ID);
        load(&mut self.msi_res_id, AZURE_MSI_RES_ID);
        load(&mut self.msi_endpoint, AZURE_MSI_ENDPOINT);
        load(&mut self.msi_secret, AZURE_MSI_SECRET);

        if self.authority_host.is_none() {
            self.authority_host = Some(AZURE_PUBLIC_CLOUD.to_string());
        }

        self
    }

    /// Authority host without trailing slash.
    pub(crate) fn authority_host(&self) -> &str {
        self.authority_host
            .as_deref()
            .unwrap_or(AZURE_PUBLIC_CLOUD)
            .trim_end_matches('/')
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use blobsas_core::utils::Redact;

        f.debug_struct("Config")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &Redact::from(&self.client_secret))
            .field("federated_token_file", &self.federated_token_file)
            .field("authority_host", &self.authority_host)
            .field("object_id", &self.object_id)
            .field("msi_res_id", &self.msi_res_id)
            .field("msi_endpoint", &self.msi_endpoint)
            .field("msi_secret", &Redact::from(&self.msi_secret))
            .finish()
    }
}
