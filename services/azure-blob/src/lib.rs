//! Azure Blob Storage client for uploading a blob and sharing it through a
//! user delegation SAS.
//!
//! This crate provides:
//! - Bearer token credentials and the providers that resolve them
//!   (client secret, workload identity, managed identity, Azure CLI)
//! - A request signer that authorizes requests with the bearer token
//! - [`BlobServiceClient`] / [`BlobClient`] for uploading blobs and requesting
//!   user delegation keys
//! - [`generate_blob_sas`] for computing blob SAS tokens locally
//!
//! # Example
//!
//! ```rust,no_run
//! use blobsas_azure_blob::{
//!     BlobSasPermissions, BlobServiceClient, DefaultCredentialProvider, SasKey, UploadOptions,
//! };
//! use blobsas_core::time::now;
//! use blobsas_core::{Context, OsEnv, ProvideCredential};
//! use blobsas_http_send_reqwest::ReqwestHttpSend;
//!
//! # async fn example() -> blobsas_core::Result<()> {
//! let ctx = Context::new()
//!     .with_http_send(ReqwestHttpSend::default())
//!     .with_env(OsEnv);
//!
//! let credential = DefaultCredentialProvider::new()
//!     .provide_credential(&ctx)
//!     .await?
//!     .expect("credential must be available");
//!
//! let service = BlobServiceClient::new(ctx, "https://account.blob.core.windows.net", credential)?;
//! let blob = service.blob_client("container", "hello.txt");
//! blob.upload(&b"hello"[..], &UploadOptions::default()).await?;
//!
//! let start = now();
//! let expiry = start + chrono::TimeDelta::hours(1);
//! let key = service.get_user_delegation_key(start, expiry).await?;
//! let url = blob.generate_sas_url(
//!     &blob.sas_parameters(BlobSasPermissions::read_only(), start, expiry),
//!     SasKey::UserDelegation(&key),
//! )?;
//! println!("{url}");
//! # Ok(())
//! # }
//! ```

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod sign_request;
pub use sign_request::RequestSigner;

mod provide_credential;
pub use provide_credential::*;

mod client;
pub use client::{BlobClient, BlobServiceClient, UploadOptions};

mod delegation_key;
pub use delegation_key::UserDelegationKey;

mod sas;
pub use sas::{generate_blob_sas, BlobSasParameters, BlobSasPermissions, SasKey, SasProtocol};
