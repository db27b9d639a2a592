use std::fmt;

/// Error returned by every crate in the workspace.
///
/// The [`ErrorKind`] tells callers what went wrong in broad strokes, the
/// message says what failed, and the optional context lines carry the
/// values that help to debug it (paths, urls, programs).
#[derive(thiserror::Error, Debug)]
#[error("{message}{}", display_context(.context))]
pub struct Error {
    kind: ErrorKind,
    message: String,
    context: Vec<String>,
    #[source]
    source: Option<anyhow::Error>,
}

/// Broad category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A credential was found but can't be used, e.g. a malformed token.
    CredentialInvalid,
    /// A credential expired or is about to.
    CredentialExpired,
    /// The identity endpoint or the storage service refused the caller.
    CredentialDenied,
    /// A request or SAS can't be built from the given input.
    RequestInvalid,
    /// Configuration is missing or malformed.
    ConfigInvalid,
    /// Anything else: network failures, I/O, unexpected service replies.
    Unexpected,
}

impl Error {
    /// Create an error of `kind`.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: Vec::new(),
            source: None,
        }
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach a line of debugging context, shown after the message.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// The broad category.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The message alone, without context or source.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the error is about a credential rather than the request.
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::CredentialInvalid
                | ErrorKind::CredentialExpired
                | ErrorKind::CredentialDenied
        )
    }

    /// Shortcut for [`ErrorKind::CredentialInvalid`].
    pub fn credential_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CredentialInvalid, message)
    }

    /// Shortcut for [`ErrorKind::CredentialExpired`].
    pub fn credential_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CredentialExpired, message)
    }

    /// Shortcut for [`ErrorKind::CredentialDenied`].
    pub fn credential_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CredentialDenied, message)
    }

    /// Shortcut for [`ErrorKind::RequestInvalid`].
    pub fn request_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestInvalid, message)
    }

    /// Shortcut for [`ErrorKind::ConfigInvalid`].
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Shortcut for [`ErrorKind::Unexpected`].
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

fn display_context(context: &[String]) -> String {
    if context.is_empty() {
        String::new()
    } else {
        format!(" ({})", context.join(", "))
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::CredentialInvalid => "invalid credential",
            ErrorKind::CredentialExpired => "expired credential",
            ErrorKind::CredentialDenied => "credential denied",
            ErrorKind::RequestInvalid => "invalid request",
            ErrorKind::ConfigInvalid => "invalid configuration",
            ErrorKind::Unexpected => "unexpected error",
        };
        f.write_str(s)
    }
}

/// Result with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(err)
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::request_invalid(err.to_string()).with_source(err)
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::request_invalid("header value contains invalid characters").with_source(err)
    }
}
