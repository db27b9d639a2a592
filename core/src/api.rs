use crate::{Context, Result};
use std::fmt::Debug;

/// A credential a signer can put on a request.
pub trait SigningCredential: Clone + Debug + Send + Sync + Unpin + 'static {
    /// Whether the credential can still be used, including some slack before expiry.
    fn is_valid(&self) -> bool;
}

/// ProvideCredential is the trait used to load the credential from the environment.
///
/// Returning `Ok(None)` means this provider has nothing to offer in the current
/// environment, so a chain may move on to the next one.
#[async_trait::async_trait]
pub trait ProvideCredential: Debug + Send + Sync + Unpin + 'static {
    /// Credential returned by this provider.
    type Credential: Send + Sync + Unpin + 'static;

    /// Load credential from current env.
    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>>;
}

/// SignRequest is the trait used to apply a credential to an outgoing request.
#[async_trait::async_trait]
pub trait SignRequest: Debug + Send + Sync + Unpin + 'static {
    /// Credential used by this signer.
    type Credential: Send + Sync + Unpin + 'static;

    /// Sign the request parts in place.
    ///
    /// Signers must return an error instead of sending an unsigned request when
    /// the credential is missing.
    async fn sign_request(
        &self,
        ctx: &Context,
        req: &mut http::request::Parts,
        credential: Option<&Self::Credential>,
    ) -> Result<()>;
}
