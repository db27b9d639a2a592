//! Blob shared access signatures.
//!
//! - [Create a user delegation SAS](https://learn.microsoft.com/en-us/rest/api/storageservices/create-user-delegation-sas)
//! - [Create a service SAS](https://learn.microsoft.com/en-us/rest/api/storageservices/create-service-sas)

mod permissions;
pub use permissions::BlobSasPermissions;

use crate::constants::{AZURE_QUERY_ENCODE_SET, AZURE_STORAGE_VERSION};
use crate::UserDelegationKey;
use blobsas_core::hash::{base64_decode, base64_hmac_sha256};
use blobsas_core::time::{format_rfc3339, parse_rfc3339, DateTime};
use blobsas_core::{Error, Result};
use log::{debug, warn};
use percent_encoding::utf8_percent_encode;
use std::fmt::{Display, Formatter};

/// Protocols a SAS may be used with (`spr`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SasProtocol {
    /// HTTPS only.
    Https,
    /// Both HTTPS and HTTP.
    HttpsAndHttp,
}

impl Display for SasProtocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SasProtocol::Https => f.write_str("https"),
            SasProtocol::HttpsAndHttp => f.write_str("https,http"),
        }
    }
}

/// Key used to sign a blob SAS.
#[derive(Debug, Clone, Copy)]
pub enum SasKey<'a> {
    /// Sign with a user delegation key, producing a user delegation SAS.
    UserDelegation(&'a UserDelegationKey),
    /// Sign with the base64 encoded storage account key, producing a service SAS.
    AccountKey(&'a str),
}

/// Everything a blob SAS grants, except the key that signs it.
#[derive(Debug, Clone)]
pub struct BlobSasParameters {
    account_name: String,
    container: String,
    blob: String,
    permissions: BlobSasPermissions,
    start: Option<DateTime>,
    expiry: DateTime,
    ip: Option<String>,
    protocol: Option<SasProtocol>,
    identifier: Option<String>,
    cache_control: Option<String>,
    content_disposition: Option<String>,
    content_encoding: Option<String>,
    content_language: Option<String>,
    content_type: Option<String>,
    version: String,
}

impl BlobSasParameters {
    /// Create parameters for a SAS on `container/blob` valid until `expiry`.
    pub fn new(
        account_name: &str,
        container: &str,
        blob: &str,
        permissions: BlobSasPermissions,
        expiry: DateTime,
    ) -> Self {
        Self {
            account_name: account_name.to_string(),
            container: container.to_string(),
            blob: blob.to_string(),
            permissions,
            start: None,
            expiry,
            ip: None,
            protocol: None,
            identifier: None,
            cache_control: None,
            content_disposition: None,
            content_encoding: None,
            content_language: None,
            content_type: None,
            version: AZURE_STORAGE_VERSION.to_string(),
        }
    }

    /// Set the time the SAS becomes valid (`st`).
    pub fn with_start(mut self, start: DateTime) -> Self {
        self.start = Some(start);
        self
    }

    /// Restrict the SAS to an IP or an IP range like `168.1.5.60-168.1.5.70` (`sip`).
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    /// Restrict the protocols the SAS may be used with (`spr`).
    pub fn with_protocol(mut self, protocol: SasProtocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    /// Reference a stored access policy on the container (`si`).
    ///
    /// Only valid for SAS signed with the account key.
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Override `Cache-Control` on responses served with this SAS (`rscc`).
    pub fn with_cache_control(mut self, v: impl Into<String>) -> Self {
        self.cache_control = Some(v.into());
        self
    }

    /// Override `Content-Disposition` on responses served with this SAS (`rscd`).
    pub fn with_content_disposition(mut self, v: impl Into<String>) -> Self {
        self.content_disposition = Some(v.into());
        self
    }

    /// Override `Content-Encoding` on responses served with this SAS (`rsce`).
    pub fn with_content_encoding(mut self, v: impl Into<String>) -> Self {
        self.content_encoding = Some(v.into());
        self
    }

    /// Override `Content-Language` on responses served with this SAS (`rscl`).
    pub fn with_content_language(mut self, v: impl Into<String>) -> Self {
        self.content_language = Some(v.into());
        self
    }

    /// Override `Content-Type` on responses served with this SAS (`rsct`).
    pub fn with_content_type(mut self, v: impl Into<String>) -> Self {
        self.content_type = Some(v.into());
        self
    }

    /// Set the signed service version (`sv`).
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    fn canonicalized_resource(&self) -> String {
        format!(
            "/blob/{}/{}/{}",
            self.account_name, self.container, self.blob
        )
    }

    fn validate(&self, key: &SasKey<'_>) -> Result<()> {
        if self.account_name.is_empty() || self.container.is_empty() || self.blob.is_empty() {
            return Err(Error::request_invalid(
                "account name, container name and blob name must not be empty",
            ));
        }
        if self.permissions.is_empty() {
            return Err(Error::request_invalid("sas permissions must not be empty"));
        }
        if let Some(start) = self.start {
            if self.expiry <= start {
                return Err(Error::request_invalid(format!(
                    "sas expiry {} must be after start {}",
                    format_rfc3339(self.expiry),
                    format_rfc3339(start)
                )));
            }
        }

        if let SasKey::UserDelegation(key) = key {
            if self.start.is_none() {
                return Err(Error::request_invalid(
                    "user delegation sas requires a start time",
                ));
            }
            if self.identifier.is_some() {
                return Err(Error::request_invalid(
                    "user delegation sas does not support stored access policies",
                ));
            }
            if let Ok(key_expiry) = parse_rfc3339(&key.signed_expiry) {
                if self.expiry > key_expiry {
                    warn!(
                        "sas expiry {} is later than delegation key expiry {}, the sas stops working at key expiry",
                        format_rfc3339(self.expiry),
                        key.signed_expiry
                    );
                }
            }
        }

        Ok(())
    }
}

/// Generate a blob SAS token, without the leading `?`.
///
/// Nothing is sent over the network: the token is an HMAC-SHA256 signature
/// over the parameters, computed with the given key.
pub fn generate_blob_sas(params: &BlobSasParameters, key: SasKey<'_>) -> Result<String> {
    params.validate(&key)?;

    let sp = params.permissions.to_string();
    let st = params.start.map(format_rfc3339).unwrap_or_default();
    let se = format_rfc3339(params.expiry);
    let sip = params.ip.clone().unwrap_or_default();
    let spr = params.protocol.map(|v| v.to_string()).unwrap_or_default();
    let resource = params.canonicalized_resource();
    let overrides = [
        ("rscc", params.cache_control.as_deref().unwrap_or_default()),
        ("rscd", params.content_disposition.as_deref().unwrap_or_default()),
        ("rsce", params.content_encoding.as_deref().unwrap_or_default()),
        ("rscl", params.content_language.as_deref().unwrap_or_default()),
        ("rsct", params.content_type.as_deref().unwrap_or_default()),
    ];

    let (string_to_sign, signing_key) = match key {
        SasKey::UserDelegation(key) => {
            let mut fields: Vec<&str> = vec![
                sp.as_str(),
                st.as_str(),
                se.as_str(),
                resource.as_str(),
                key.signed_oid.as_str(),
                key.signed_tid.as_str(),
                key.signed_start.as_str(),
                key.signed_expiry.as_str(),
                key.signed_service.as_str(),
                key.signed_version.as_str(),
                // Authorized object id, unauthorized object id and correlation id.
                "",
                "",
                "",
                sip.as_str(),
                spr.as_str(),
                params.version.as_str(),
                "b",
                // Snapshot time and encryption scope.
                "",
                "",
            ];
            fields.extend(overrides.iter().map(|(_, v)| *v));
            (fields.join("\n"), key.value.as_str())
        }
        SasKey::AccountKey(account_key) => {
            let mut fields: Vec<&str> = vec![
                sp.as_str(),
                st.as_str(),
                se.as_str(),
                resource.as_str(),
                params.identifier.as_deref().unwrap_or_default(),
                sip.as_str(),
                spr.as_str(),
                params.version.as_str(),
                "b",
                // Snapshot time and encryption scope.
                "",
                "",
            ];
            fields.extend(overrides.iter().map(|(_, v)| *v));
            (fields.join("\n"), account_key)
        }
    };
    debug!("blob sas string to sign: {string_to_sign:?}");

    let signature = base64_hmac_sha256(&base64_decode(signing_key)?, string_to_sign.as_bytes());

    let mut query: Vec<(&str, &str)> = Vec::with_capacity(20);
    if !st.is_empty() {
        query.push(("st", st.as_str()));
    }
    query.push(("se", se.as_str()));
    query.push(("sp", sp.as_str()));
    if !sip.is_empty() {
        query.push(("sip", sip.as_str()));
    }
    if !spr.is_empty() {
        query.push(("spr", spr.as_str()));
    }
    query.push(("sv", params.version.as_str()));
    if let Some(si) = &params.identifier {
        query.push(("si", si.as_str()));
    }
    query.push(("sr", "b"));
    query.extend(overrides.iter().filter(|(_, v)| !v.is_empty()).copied());
    if let SasKey::UserDelegation(key) = key {
        query.push(("skoid", key.signed_oid.as_str()));
        query.push(("sktid", key.signed_tid.as_str()));
        query.push(("skt", key.signed_start.as_str()));
        query.push(("ske", key.signed_expiry.as_str()));
        query.push(("sks", key.signed_service.as_str()));
        query.push(("skv", key.signed_version.as_str()));
    }
    query.push(("sig", signature.as_str()));

    Ok(query
        .iter()
        .map(|(k, v)| format!("{k}={}", utf8_percent_encode(v, &AZURE_QUERY_ENCODE_SET)))
        .collect::<Vec<_>>()
        .join("&"))
}
