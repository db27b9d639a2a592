use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

// Headers used in azure services.
pub const X_MS_DATE: &str = "x-ms-date";
pub const X_MS_VERSION: &str = "x-ms-version";
pub const X_MS_BLOB_TYPE: &str = "x-ms-blob-type";
pub const X_MS_BLOB_CONTENT_TYPE: &str = "x-ms-blob-content-type";
pub const X_MS_IDENTITY_HEADER: &str = "X-IDENTITY-HEADER";

/// Service version sent with every request and used as `sv` in SAS tokens.
pub const AZURE_STORAGE_VERSION: &str = "2022-11-02";

// Block blob limits.
pub const DEFAULT_BLOCK_SIZE: usize = 4 * 1024 * 1024;
pub const MAX_BLOCK_SIZE: usize = 4000 * 1024 * 1024;
pub const MAX_BLOCK_COUNT: usize = 50_000;

// Env values used to resolve credentials.
pub const AZURE_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const AZURE_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const AZURE_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
pub const AZURE_FEDERATED_TOKEN_FILE: &str = "AZURE_FEDERATED_TOKEN_FILE";
pub const AZURE_AUTHORITY_HOST: &str = "AZURE_AUTHORITY_HOST";
pub const AZURE_OBJECT_ID: &str = "AZURE_OBJECT_ID";
pub const AZURE_MSI_RES_ID: &str = "AZURE_MSI_RES_ID";
pub const AZURE_MSI_ENDPOINT: &str = "AZURE_MSI_ENDPOINT";
pub const AZURE_MSI_SECRET: &str = "AZURE_MSI_SECRET";
pub const AZURE_STORAGE_BEARER_TOKEN: &str = "AZURE_STORAGE_BEARER_TOKEN";

pub const AZURE_PUBLIC_CLOUD: &str = "https://login.microsoftonline.com";
pub const AZURE_IMDS_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
pub const AZURE_STORAGE_RESOURCE: &str = "https://storage.azure.com/";
pub const AZURE_STORAGE_SCOPE: &str = "https://storage.azure.com/.default";

/// Characters left untouched when encoding SAS values and blob paths.
pub static AZURE_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'/')
    .remove(b'~');
