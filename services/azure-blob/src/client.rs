use crate::constants::*;
use crate::delegation_key::key_info_xml;
use crate::sas::{generate_blob_sas, BlobSasParameters, BlobSasPermissions, SasKey};
use crate::{Credential, RequestSigner, UserDelegationKey};
use blobsas_core::hash::base64_encode;
use blobsas_core::time::{format_rfc3339, DateTime};
use blobsas_core::{Context, Error, Result, SignRequest};
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, IF_NONE_MATCH};
use http::{Request, Response, StatusCode, Uri};
use log::{debug, info};
use percent_encoding::utf8_percent_encode;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Client for account level operations of the Blob service.
///
/// Holds the resolved credential and authorizes every request with it.
#[derive(Debug, Clone)]
pub struct BlobServiceClient {
    ctx: Context,
    endpoint: String,
    account_name: String,
    credential: Credential,
    signer: RequestSigner,
}

impl BlobServiceClient {
    /// Create a client for the account behind `account_url`.
    ///
    /// Both `https://{account}.blob.core.windows.net` and path style
    /// endpoints like `http://127.0.0.1:10000/{account}` are accepted.
    pub fn new(ctx: Context, account_url: &str, credential: Credential) -> Result<Self> {
        let endpoint = account_url.trim().trim_end_matches('/');
        let uri: Uri = endpoint.parse().map_err(|e| {
            Error::config_invalid(format!("account url '{account_url}' is invalid")).with_source(e)
        })?;

        match uri.scheme_str() {
            Some("https") | Some("http") => {}
            _ => {
                return Err(Error::config_invalid(format!(
                    "account url '{account_url}' must start with https:// or http://"
                )))
            }
        }
        if uri.query().is_some() {
            return Err(Error::config_invalid(format!(
                "account url '{account_url}' must not contain a query"
            )));
        }
        let account_name = account_name_from_uri(&uri).ok_or_else(|| {
            Error::config_invalid(format!(
                "account url '{account_url}' does not name a storage account"
            ))
        })?;

        Ok(Self {
            ctx,
            endpoint: endpoint.to_string(),
            account_name,
            credential,
            signer: RequestSigner::new(),
        })
    }

    /// The account endpoint, without trailing slash.
    pub fn url(&self) -> &str {
        &self.endpoint
    }

    /// Name of the storage account.
    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    /// Create a client for `blob` inside `container`.
    ///
    /// Nothing is checked against the service.
    pub fn blob_client(&self, container: &str, blob: &str) -> BlobClient {
        BlobClient {
            service: self.clone(),
            container: container.to_string(),
            blob: blob.to_string(),
        }
    }

    /// Request a user delegation key valid from `start` to `expiry`.
    ///
    /// The key is tied to the principal behind the bearer credential and
    /// can sign SAS tokens for the blob service.
    ///
    /// - [Get User Delegation Key](https://learn.microsoft.com/en-us/rest/api/storageservices/get-user-delegation-key)
    pub async fn get_user_delegation_key(
        &self,
        start: DateTime,
        expiry: DateTime,
    ) -> Result<UserDelegationKey> {
        if expiry <= start {
            return Err(Error::request_invalid(format!(
                "delegation key expiry {} must be after start {}",
                format_rfc3339(expiry),
                format_rfc3339(start)
            )));
        }

        let body = key_info_xml(start, expiry)?;
        let req = Request::post(format!(
            "{}/?restype=service&comp=userdelegationkey",
            self.endpoint
        ))
        .header(CONTENT_TYPE, "application/xml")
        .header(CONTENT_LENGTH, body.len().to_string())
        .body(Bytes::from(body))?;

        debug!(
            "requesting user delegation key for {} valid until {}",
            self.account_name,
            format_rfc3339(expiry)
        );
        let resp = self.send(req).await?;
        if resp.status() != StatusCode::OK {
            return Err(service_error("get user delegation key", &resp));
        }

        let key = UserDelegationKey::from_xml(&String::from_utf8_lossy(resp.body()))?;
        info!(
            "got user delegation key for {} expiring at {}",
            self.account_name, key.signed_expiry
        );
        Ok(key)
    }

    async fn send(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        let (mut parts, body) = req.into_parts();
        self.signer
            .sign_request(&self.ctx, &mut parts, Some(&self.credential))
            .await?;
        self.ctx.http_send(Request::from_parts(parts, body)).await
    }
}

/// Options for [`BlobClient::upload`].
#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// Replace the blob if it already exists.
    ///
    /// When false the upload fails with a conflict instead.
    pub overwrite: bool,
    /// Content type stored with the blob, `application/octet-stream` if unset.
    pub content_type: Option<String>,
    /// Bytes read from the source per request.
    ///
    /// A source shorter than one block goes up in a single Put Blob, anything
    /// longer as staged blocks committed by one Put Block List.
    pub block_size: usize,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            content_type: None,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl UploadOptions {
    fn content_type(&self) -> &str {
        self.content_type
            .as_deref()
            .unwrap_or("application/octet-stream")
    }
}

/// Client for a single blob.
#[derive(Debug, Clone)]
pub struct BlobClient {
    service: BlobServiceClient,
    container: String,
    blob: String,
}

impl BlobClient {
    /// Name of the storage account.
    pub fn account_name(&self) -> &str {
        self.service.account_name()
    }

    /// Name of the container.
    pub fn container_name(&self) -> &str {
        &self.container
    }

    /// Name of the blob.
    pub fn blob_name(&self) -> &str {
        &self.blob
    }

    /// Full URL of the blob, without any query.
    pub fn url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.service.url(),
            utf8_percent_encode(&self.container, &AZURE_QUERY_ENCODE_SET),
            utf8_percent_encode(&self.blob, &AZURE_QUERY_ENCODE_SET)
        )
    }

    /// Upload everything readable from `source` as a block blob.
    ///
    /// The source is read one block at a time, so at most one block is held
    /// in memory. It is dropped once fully read, before the blob is created
    /// or committed, and on every error path. Blocks only become visible when
    /// all of them were staged.
    ///
    /// - [Put Blob](https://learn.microsoft.com/en-us/rest/api/storageservices/put-blob)
    /// - [Put Block](https://learn.microsoft.com/en-us/rest/api/storageservices/put-block)
    /// - [Put Block List](https://learn.microsoft.com/en-us/rest/api/storageservices/put-block-list)
    pub async fn upload<R>(&self, mut source: R, options: &UploadOptions) -> Result<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        let block_size = options.block_size;
        if block_size == 0 || block_size > MAX_BLOCK_SIZE {
            return Err(Error::request_invalid(format!(
                "block size must be between 1 and {MAX_BLOCK_SIZE} bytes"
            ))
            .with_context(format!("block_size: {block_size}")));
        }

        let first = read_block(&mut source, block_size).await?;
        if first.len() < block_size {
            drop(source);
            return self.put_blob(first, options).await;
        }

        let mut block_ids = Vec::new();
        let mut block = first;
        loop {
            if block_ids.len() == MAX_BLOCK_COUNT {
                return Err(Error::request_invalid(format!(
                    "source needs more than {MAX_BLOCK_COUNT} blocks"
                ))
                .with_context(format!("block_size: {block_size}")));
            }

            let block_id = block_id(block_ids.len());
            let full = block.len() == block_size;
            self.put_block(&block_id, block).await?;
            block_ids.push(block_id);

            if !full {
                break;
            }
            block = read_block(&mut source, block_size).await?;
            if block.is_empty() {
                break;
            }
        }
        drop(source);

        self.put_block_list(&block_ids, options).await
    }

    async fn put_blob(&self, content: Bytes, options: &UploadOptions) -> Result<()> {
        let mut req = Request::put(self.url())
            .header(X_MS_BLOB_TYPE, "BlockBlob")
            .header(CONTENT_TYPE, options.content_type())
            .header(CONTENT_LENGTH, content.len().to_string());
        if !options.overwrite {
            req = req.header(IF_NONE_MATCH, "*");
        }
        let req = req.body(content)?;

        debug!("uploading blob {}/{}", self.container, self.blob);
        let resp = self.service.send(req).await?;
        if resp.status() != StatusCode::CREATED {
            return Err(service_error("put blob", &resp));
        }

        info!("uploaded blob {}/{}", self.container, self.blob);
        Ok(())
    }

    async fn put_block(&self, block_id: &str, content: Bytes) -> Result<()> {
        let url = format!(
            "{}?comp=block&blockid={}",
            self.url(),
            utf8_percent_encode(block_id, &AZURE_QUERY_ENCODE_SET)
        );
        let req = Request::put(url)
            .header(CONTENT_LENGTH, content.len().to_string())
            .body(content)?;

        debug!("staging block {block_id} of {}/{}", self.container, self.blob);
        let resp = self.service.send(req).await?;
        if resp.status() != StatusCode::CREATED {
            return Err(service_error("put block", &resp));
        }
        Ok(())
    }

    async fn put_block_list(&self, block_ids: &[String], options: &UploadOptions) -> Result<()> {
        let body = block_list_xml(block_ids)?;
        let mut req = Request::put(format!("{}?comp=blocklist", self.url()))
            .header(X_MS_BLOB_CONTENT_TYPE, options.content_type())
            .header(CONTENT_TYPE, "application/xml")
            .header(CONTENT_LENGTH, body.len().to_string());
        if !options.overwrite {
            req = req.header(IF_NONE_MATCH, "*");
        }
        let req = req.body(Bytes::from(body))?;

        debug!(
            "committing {} blocks of {}/{}",
            block_ids.len(),
            self.container,
            self.blob
        );
        let resp = self.service.send(req).await?;
        if resp.status() != StatusCode::CREATED {
            return Err(service_error("put block list", &resp));
        }

        info!(
            "uploaded blob {}/{} in {} blocks",
            self.container,
            self.blob,
            block_ids.len()
        );
        Ok(())
    }

    /// Build SAS parameters for this blob.
    pub fn sas_parameters(
        &self,
        permissions: BlobSasPermissions,
        start: DateTime,
        expiry: DateTime,
    ) -> BlobSasParameters {
        BlobSasParameters::new(
            self.account_name(),
            &self.container,
            &self.blob,
            permissions,
            expiry,
        )
        .with_start(start)
    }

    /// Sign `params` with `key` and append the token to the blob URL.
    pub fn generate_sas_url(&self, params: &BlobSasParameters, key: SasKey<'_>) -> Result<String> {
        let token = generate_blob_sas(params, key)?;
        Ok(format!("{}?{token}", self.url()))
    }
}

/// Fill one block from `source`. Shorter than `size` only at EOF.
async fn read_block<R>(source: &mut R, size: usize) -> Result<Bytes>
where
    R: AsyncRead + Unpin + Send,
{
    let mut buf = Vec::new();
    source
        .take(size as u64)
        .read_to_end(&mut buf)
        .await
        .map_err(|e| Error::unexpected("failed to read upload source").with_source(e))?;
    Ok(Bytes::from(buf))
}

/// Block ids must have the same length within a blob.
fn block_id(index: usize) -> String {
    base64_encode(format!("block-{index:06}").as_bytes())
}

#[derive(Serialize)]
#[serde(rename = "BlockList")]
struct BlockList<'a> {
    #[serde(rename = "Latest")]
    latest: &'a [String],
}

fn block_list_xml(block_ids: &[String]) -> Result<String> {
    let xml = quick_xml::se::to_string(&BlockList { latest: block_ids })
        .map_err(|e| Error::unexpected("failed to serialize block list").with_source(e))?;
    Ok(format!(r#"<?xml version="1.0" encoding="utf-8"?>{xml}"#))
}

/// Account name is the first label of the host, or the first path segment
/// for IP and localhost endpoints.
fn account_name_from_uri(uri: &Uri) -> Option<String> {
    let host = uri.host()?;
    let bare = host.trim_start_matches('[').trim_end_matches(']');

    let name = if bare.parse::<IpAddr>().is_ok() || bare.eq_ignore_ascii_case("localhost") {
        uri.path().trim_start_matches('/').split('/').next()?
    } else {
        host.split('.').next()?
    };

    (!name.is_empty()).then(|| name.to_string())
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StorageErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Map a failed storage response into an error carrying the service's
/// error code and message.
fn service_error(operation: &str, resp: &Response<Bytes>) -> Error {
    let status = resp.status();
    let body = String::from_utf8_lossy(resp.body());
    let body = body.strip_prefix('\u{feff}').unwrap_or(&body);
    let mut parsed: StorageErrorBody = quick_xml::de::from_str(body).unwrap_or_default();
    if parsed.code.is_empty() {
        if let Some(code) = resp.headers().get("x-ms-error-code") {
            parsed.code = code.to_str().unwrap_or_default().to_string();
        }
    }

    let mut message = format!("{operation} failed with status {status}");
    if !parsed.code.is_empty() {
        message.push_str(&format!(": {}", parsed.code));
    }
    if let Some(detail) = parsed.message.lines().next().filter(|v| !v.is_empty()) {
        message.push_str(&format!(": {detail}"));
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::credential_denied(message),
        s if s.is_client_error() => Error::request_invalid(message),
        _ => Error::unexpected(message),
    }
}
