mod static_provider;
pub use static_provider::StaticCredentialProvider;

mod env;
pub use env::EnvCredentialProvider;

mod client_secret;
pub use client_secret::ClientSecretCredentialProvider;

mod workload_identity;
pub use workload_identity::WorkloadIdentityCredentialProvider;

mod imds;
pub use imds::ImdsCredentialProvider;

mod azure_cli;
pub use azure_cli::AzureCliCredentialProvider;

mod default;
pub use default::DefaultCredentialProvider;

use blobsas_core::Error;
use http::StatusCode;

/// Turn a non-success token endpoint response into an error.
///
/// 400 and 401 mean the identity itself was refused, everything else is
/// unexpected.
fn token_endpoint_error(source: &str, status: StatusCode, body: &[u8]) -> Error {
    let body = String::from_utf8_lossy(body);
    let message = format!("{source} request failed with status {status}: {body}");
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => Error::credential_denied(message),
        _ => Error::unexpected(message),
    }
}
