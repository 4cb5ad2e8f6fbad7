//! Error types for the token exchange.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for token exchange operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can end a run. None of these are retried.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad, missing, duplicate or unsupported command line arguments.
    #[error("invalid arguments: {0}")]
    Configuration(String),

    /// The private key could not be read.
    #[error("could not read private key from {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The token could not be written out.
    #[error("could not write output")]
    Output(#[source] std::io::Error),

    /// The key is not a usable RSA private key, or signing failed.
    #[error("failed to sign assertion")]
    Signing(#[source] jsonwebtoken::errors::Error),

    /// The system clock reads earlier than 1970-01-01T00:00:00Z.
    #[error("system clock is set before the Unix epoch")]
    Clock(#[source] std::time::SystemTimeError),

    /// Transport failure or timeout talking to the API.
    #[error("{operation} request failed")]
    Network {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a status other than the one expected.
    #[error("{operation} failed with status {status}: {body}")]
    Api {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// No installation of the app matched.
    #[error("unable to locate installation for app {app_id}{}", account_suffix(.account))]
    NotFound {
        app_id: u64,
        account: Option<String>,
    },

    /// The API answered successfully but with a body we could not read.
    #[error("unexpected {operation} response body")]
    MalformedResponse {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

fn account_suffix(account: &Option<String>) -> String {
    match account {
        Some(login) => format!(" on account '{login}'"),
        None => String::new(),
    }
}

impl Error {
    /// HTTP status carried by an [`Error::Api`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
