use crate::QuickstartError;
use blobsas_core::{Context, Error};
use chrono::TimeDelta;

/// Storage account the sample uploads to.
pub const DEFAULT_ACCOUNT_URL: &str = "https://juvodev.blob.core.windows.net";
/// Container the sample uploads to.
pub const DEFAULT_CONTAINER_NAME: &str = "file-uploads";
/// Local file the sample uploads.
pub const DEFAULT_LOCAL_FILE_NAME: &str = "blob-example.docx";

const BLOB_QUICKSTART_ACCOUNT_URL: &str = "BLOB_QUICKSTART_ACCOUNT_URL";
const BLOB_QUICKSTART_CONTAINER: &str = "BLOB_QUICKSTART_CONTAINER";
const BLOB_QUICKSTART_FILE: &str = "BLOB_QUICKSTART_FILE";
const BLOB_QUICKSTART_VALIDITY_HOURS: &str = "BLOB_QUICKSTART_VALIDITY_HOURS";

/// A user delegation key can't be valid for more than seven days.
const MAX_VALIDITY_HOURS: i64 = 7 * 24;

/// Config for the quickstart run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Blob service endpoint of the storage account.
    pub account_url: String,
    /// Container the blob is uploaded into. Must already exist.
    pub container_name: String,
    /// Path of the local file to upload.
    pub local_file_name: String,
    /// How long both the delegation key and the SAS stay valid.
    pub validity: TimeDelta,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            account_url: DEFAULT_ACCOUNT_URL.to_string(),
            container_name: DEFAULT_CONTAINER_NAME.to_string(),
            local_file_name: DEFAULT_LOCAL_FILE_NAME.to_string(),
            validity: TimeDelta::days(1),
        }
    }
}

impl Config {
    /// Override values from `BLOB_QUICKSTART_*` env.
    pub fn from_env(mut self, ctx: &Context) -> Result<Self, QuickstartError> {
        if let Some(v) = ctx.env_var_non_empty(BLOB_QUICKSTART_ACCOUNT_URL) {
            self.account_url = v;
        }
        if let Some(v) = ctx.env_var_non_empty(BLOB_QUICKSTART_CONTAINER) {
            self.container_name = v;
        }
        if let Some(v) = ctx.env_var_non_empty(BLOB_QUICKSTART_FILE) {
            self.local_file_name = v;
        }
        if let Some(v) = ctx.env_var_non_empty(BLOB_QUICKSTART_VALIDITY_HOURS) {
            let hours: i64 = v.trim().parse().map_err(|e| {
                QuickstartError::Config(
                    Error::config_invalid(format!(
                        "{BLOB_QUICKSTART_VALIDITY_HOURS} '{v}' is not a number of hours"
                    ))
                    .with_source(e),
                )
            })?;
            if !(1..=MAX_VALIDITY_HOURS).contains(&hours) {
                return Err(QuickstartError::Config(Error::config_invalid(format!(
                    "{BLOB_QUICKSTART_VALIDITY_HOURS} must be between 1 and {MAX_VALIDITY_HOURS}, got {hours}"
                ))));
            }
            self.validity = TimeDelta::hours(hours);
        }

        Ok(self)
    }
}
