//! Core components for uploading and sharing blobs.
//!
//! This crate provides the foundational types and traits shared by the
//! blobsas workspace: the runtime [`Context`], the [`Error`] type, and the
//! traits used to resolve credentials and sign outgoing requests.
//!
//! ## Overview
//!
//! - **Context**: A container that holds implementations for file reading, HTTP sending,
//!   environment access and command execution.
//! - **Traits**: [`ProvideCredential`] loads a credential, [`SignRequest`] applies it to a
//!   request, [`SigningCredential`] tells whether a credential is still usable.
//! - **Chain**: [`ProvideCredentialChain`] tries a list of providers in order.
//!
//! ## Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use blobsas_core::{Context, ProvideCredential, Result, SigningCredential};
//!
//! #[derive(Clone, Debug)]
//! struct MyCredential {
//!     token: String,
//! }
//!
//! impl SigningCredential for MyCredential {
//!     fn is_valid(&self) -> bool {
//!         !self.token.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyProvider;
//!
//! #[async_trait]
//! impl ProvideCredential for MyProvider {
//!     type Credential = MyCredential;
//!
//!     async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
//!         Ok(ctx.env_var("MY_TOKEN").map(|token| MyCredential { token }))
//!     }
//! }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: Base64 and HMAC helpers
//! - [`time`]: Time formatting and parsing
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::{
    CommandExecute, CommandOutput, Context, Env, FileRead, HttpSend, NoopCommandExecute, NoopEnv,
    NoopFileRead, NoopHttpSend, OsEnv, StaticEnv,
};

mod error;
pub use error::{Error, ErrorKind, Result};

mod api;
pub use api::{ProvideCredential, SignRequest, SigningCredential};
mod chain;
pub use chain::ProvideCredentialChain;
