//! Upload a local file to Azure Blob Storage and share it through a user
//! delegation SAS.
//!
//! The binary runs [`Quickstart`] with the ambient credential of the host;
//! tests drive the same workflow with a fixed clock and fake transports.

mod config;
pub use config::Config;

mod error;
pub use error::QuickstartError;

mod workflow;
pub use workflow::{
    create_user_delegation_sas_blob, new_blob_name, request_user_delegation_key, Quickstart,
};
