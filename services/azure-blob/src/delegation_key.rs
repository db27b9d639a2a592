use blobsas_core::time::{format_rfc3339, DateTime};
use blobsas_core::utils::Redact;
use blobsas_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};

/// A user delegation key returned by `Get User Delegation Key`.
///
/// The key is bound to the Entra ID principal that requested it and signs
/// SAS tokens on behalf of that principal until `signed_expiry`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserDelegationKey {
    /// Object id of the principal the key was issued to (`skoid`).
    pub signed_oid: String,
    /// Tenant id of the principal (`sktid`).
    pub signed_tid: String,
    /// Start of the key validity (`skt`).
    pub signed_start: String,
    /// End of the key validity (`ske`).
    pub signed_expiry: String,
    /// Service the key is valid for, `b` for blob (`sks`).
    pub signed_service: String,
    /// Service version used to create the key (`skv`).
    pub signed_version: String,
    /// Base64 encoded key material.
    pub value: String,
}

impl Debug for UserDelegationKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDelegationKey")
            .field("signed_oid", &self.signed_oid)
            .field("signed_tid", &self.signed_tid)
            .field("signed_start", &self.signed_start)
            .field("signed_expiry", &self.signed_expiry)
            .field("signed_service", &self.signed_service)
            .field("signed_version", &self.signed_version)
            .field("value", &Redact::from(&self.value))
            .finish()
    }
}

impl UserDelegationKey {
    /// Parse the XML body of a `Get User Delegation Key` response.
    pub fn from_xml(body: &str) -> Result<Self> {
        let body = body.strip_prefix('\u{feff}').unwrap_or(body);
        let key: UserDelegationKey = quick_xml::de::from_str(body).map_err(|e| {
            Error::unexpected("failed to parse user delegation key response").with_source(e)
        })?;
        if key.value.is_empty() {
            return Err(Error::unexpected(
                "user delegation key response has an empty key value",
            ));
        }
        Ok(key)
    }
}

#[derive(Serialize)]
#[serde(rename = "KeyInfo", rename_all = "PascalCase")]
struct KeyInfo {
    start: String,
    expiry: String,
}

/// Build the request body of `Get User Delegation Key`.
pub(crate) fn key_info_xml(start: DateTime, expiry: DateTime) -> Result<String> {
    let info = KeyInfo {
        start: format_rfc3339(start),
        expiry: format_rfc3339(expiry),
    };
    let xml = quick_xml::se::to_string(&info)
        .map_err(|e| Error::unexpected("failed to serialize key info").with_source(e))?;
    Ok(format!(r#"<?xml version="1.0" encoding="utf-8"?>{xml}"#))
}
