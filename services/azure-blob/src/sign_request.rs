use crate::constants::*;
use crate::Credential;
use async_trait::async_trait;
use blobsas_core::time::{format_http_date, now, DateTime};
use blobsas_core::{Context, Error, Result, SignRequest, SigningCredential};
use http::request::Parts;
use http::{header, HeaderValue};

/// RequestSigner authorizes Azure Storage requests with a bearer token.
///
/// - [Authorize with Microsoft Entra ID](https://learn.microsoft.com/en-us/rest/api/storageservices/authorize-with-azure-active-directory)
#[derive(Debug, Clone)]
pub struct RequestSigner {
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer for Azure Storage requests.
    pub fn new() -> Self {
        Self { time: None }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut Parts,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::request_invalid("credential is required"));
        };
        if !cred.is_valid() {
            return Err(Error::credential_expired(
                "bearer token is empty or about to expire",
            ));
        }

        if req.uri.authority().is_none() {
            return Err(Error::request_invalid(
                "request without authority can't be signed",
            ));
        }

        let signed_at = self.time.unwrap_or_else(now);
        let headers = &mut req.headers;
        headers.insert(X_MS_DATE, format_http_date(signed_at).parse()?);
        if !headers.contains_key(X_MS_VERSION) {
            headers.insert(X_MS_VERSION, HeaderValue::from_static(AZURE_STORAGE_VERSION));
        }
        let mut bearer: HeaderValue = format!("Bearer {}", cred.token).parse()?;
        bearer.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, bearer);

        Ok(())
    }
}
