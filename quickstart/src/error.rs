use blobsas_core::Error;
use std::error::Error as _;

/// Failure of one step of the quickstart.
///
/// Every variant keeps the underlying error as source, use
/// [`QuickstartError::report`] to render the whole chain.
#[derive(Debug, thiserror::Error)]
pub enum QuickstartError {
    /// The run was configured with invalid values.
    #[error("invalid configuration")]
    Config(#[source] Error),
    /// No credential could be resolved for the storage account.
    #[error("failed to resolve a credential")]
    Credential(#[source] Error),
    /// The local file could not be opened.
    #[error("failed to open local file {path}")]
    LocalFile {
        /// Path of the local file.
        path: String,
        /// Underlying error.
        #[source]
        source: Error,
    },
    /// The blob upload failed.
    #[error("failed to upload blob {url}")]
    Upload {
        /// URL of the target blob.
        url: String,
        /// Underlying error.
        #[source]
        source: Error,
    },
    /// The service refused to issue a user delegation key.
    #[error("failed to get user delegation key from {url}")]
    DelegationKey {
        /// URL of the blob service.
        url: String,
        /// Underlying error.
        #[source]
        source: Error,
    },
    /// The SAS token could not be computed.
    #[error("failed to generate sas token for {url}")]
    SasToken {
        /// URL of the target blob.
        url: String,
        /// Underlying error.
        #[source]
        source: Error,
    },
    /// Progress could not be written.
    #[error("failed to write output")]
    Output(#[from] std::io::Error),
}

impl QuickstartError {
    /// Render this error followed by all its sources, separated by `: `.
    pub fn report(&self) -> String {
        let mut out = self.to_string();
        let mut source = self.source();
        while let Some(err) = source {
            out.push_str(": ");
            out.push_str(&err.to_string());
            source = err.source();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_report() {
        let err = QuickstartError::Upload {
            url: "https://juvodev.blob.core.windows.net/file-uploads/a".to_string(),
            source: Error::unexpected("failed to read upload source").with_source(
                std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "file truncated"),
            ),
        };

        assert_eq!(
            err.report(),
            "failed to upload blob https://juvodev.blob.core.windows.net/file-uploads/a: failed to read upload source: file truncated"
        );
    }

    #[test]
    fn test_report_without_source() {
        let err = QuickstartError::Credential(Error::credential_invalid(
            "no credential provider returned a credential",
        ));

        assert_eq!(
            err.report(),
            "failed to resolve a credential: no credential provider returned a credential"
        );
    }
}
