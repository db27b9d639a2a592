//! Reqwest-based HTTP sending implementation.
//!
//! `ReqwestHttpSend` implements [`HttpSend`] so that credential providers and
//! the blob clients can talk to the network through a shared `reqwest::Client`.
//!
//! ```no_run
//! use blobsas_core::Context;
//! use blobsas_http_send_reqwest::ReqwestHttpSend;
//!
//! let ctx = Context::new().with_http_send(ReqwestHttpSend::default());
//! ```

use async_trait::async_trait;
use blobsas_core::{Error, HttpSend, Result};
use bytes::Bytes;
use http_body_util::BodyExt;
use reqwest::{Client, Request};

/// [`HttpSend`] over a shared `reqwest::Client`.
///
/// Connection pooling and timeouts are whatever the wrapped client was built
/// with.
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Wrap an existing client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let target = format!("{} {}", req.method(), req.uri());
        let req = Request::try_from(req).map_err(|e| {
            Error::request_invalid("request can't be sent by reqwest")
                .with_context(target.clone())
                .with_source(e)
        })?;

        let resp: http::Response<reqwest::Body> = self
            .client
            .execute(req)
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    "http request timed out"
                } else if e.is_connect() {
                    "failed to connect"
                } else {
                    "failed to send http request"
                };
                Error::unexpected(message)
                    .with_context(target.clone())
                    .with_source(e)
            })?
            .into();

        let (parts, body) = resp.into_parts();
        let body = body.collect().await.map_err(|e| {
            Error::unexpected("failed to read response body")
                .with_context(target)
                .with_source(e)
        })?;
        Ok(http::Response::from_parts(parts, body.to_bytes()))
    }
}
