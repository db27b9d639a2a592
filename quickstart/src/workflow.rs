use crate::{Config, QuickstartError};
use blobsas_azure_blob::{
    generate_blob_sas, BlobClient, BlobSasPermissions, BlobServiceClient, Credential, SasKey,
    UploadOptions, UserDelegationKey,
};
use blobsas_core::time::{now, DateTime};
use blobsas_core::{Context, Error, ProvideCredential, Result};
use chrono::TimeDelta;
use log::info;
use std::io::Write;

/// Generate a fresh blob name, a random UUID v4.
pub fn new_blob_name() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Request a user delegation key valid from `start` for `validity`.
pub async fn request_user_delegation_key(
    service: &BlobServiceClient,
    start: DateTime,
    validity: TimeDelta,
) -> Result<UserDelegationKey> {
    service.get_user_delegation_key(start, start + validity).await
}

/// Sign a read only SAS for `blob` valid from `start` for `validity`.
pub fn create_user_delegation_sas_blob(
    blob: &BlobClient,
    key: &UserDelegationKey,
    start: DateTime,
    validity: TimeDelta,
) -> Result<String> {
    let params = blob.sas_parameters(BlobSasPermissions::read_only(), start, start + validity);
    generate_blob_sas(&params, SasKey::UserDelegation(key))
}

/// Quickstart uploads one file and prints a read only link to it.
///
/// The credential provider is injected, the binary passes the default
/// provider chain while tests pass a static token.
#[derive(Debug)]
pub struct Quickstart<P> {
    ctx: Context,
    config: Config,
    provider: P,
    time: Option<DateTime>,
}

impl<P> Quickstart<P>
where
    P: ProvideCredential<Credential = Credential>,
{
    /// Create a new quickstart run.
    pub fn new(ctx: Context, config: Config, provider: P) -> Self {
        Self {
            ctx,
            config,
            provider,
            time: None,
        }
    }

    /// Pin the clock used for the key and SAS windows.
    ///
    /// Only meant for tests, a real run always uses the current time.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    fn now(&self) -> DateTime {
        self.time.unwrap_or_else(now)
    }

    /// Run every step in order, writing progress to `out`.
    ///
    /// Returns the blob URL with the SAS appended. The first failing step
    /// stops the run, a blob uploaded before that failure is left in place.
    pub async fn run<W: Write>(&self, out: &mut W) -> std::result::Result<String, QuickstartError> {
        writeln!(out, "Azure Blob Storage Rust quickstart sample")?;

        let credential = self
            .provider
            .provide_credential(&self.ctx)
            .await
            .map_err(QuickstartError::Credential)?
            .ok_or_else(|| {
                QuickstartError::Credential(Error::credential_invalid(
                    "no credential provider returned a credential",
                ))
            })?;

        let service = BlobServiceClient::new(self.ctx.clone(), &self.config.account_url, credential)
            .map_err(QuickstartError::Config)?;
        let blob = service.blob_client(&self.config.container_name, &new_blob_name());

        writeln!(
            out,
            "\nUploading to Azure Storage as blob:\n\t{}",
            self.config.local_file_name
        )?;

        let path = &self.config.local_file_name;
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| QuickstartError::LocalFile {
                path: path.clone(),
                source: Error::config_invalid("local file can't be opened").with_source(e),
            })?;
        // The file is moved into upload and dropped there on every path.
        blob.upload(file, &UploadOptions::default())
            .await
            .map_err(|source| QuickstartError::Upload {
                url: blob.url(),
                source,
            })?;

        let key = request_user_delegation_key(&service, self.now(), self.config.validity)
            .await
            .map_err(|source| QuickstartError::DelegationKey {
                url: service.url().to_string(),
                source,
            })?;

        let sas_token =
            create_user_delegation_sas_blob(&blob, &key, self.now(), self.config.validity)
                .map_err(|source| QuickstartError::SasToken {
                    url: blob.url(),
                    source,
                })?;

        let sas_url = format!("{}?{sas_token}", blob.url());
        info!("created read only link for blob {}", blob.blob_name());
        writeln!(out, "{sas_url}")?;

        Ok(sas_url)
    }
}
