// Error taxonomy for the client. Every variant here is recoverable: the
// UI loop prints the message and returns to the menu, nothing aborts the
// process.

use thiserror::Error;

/// Errors produced by the API gateway, the session controller and the
/// credential store.
#[derive(Debug, Error)]
pub enum Error {
    /// User input failed validation (e.g. a malformed phone number).
    /// No state change has happened; the user can simply re-enter.
    #[error("{0}")]
    Validation(String),

    /// Transport-level failure: connection refused, DNS, timeout.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered, but with `success: false` or a body we
    /// could not interpret. Carries the server-supplied message.
    #[error("{0}")]
    Api(String),

    /// An authenticated operation was attempted without a token.
    #[error("please log in first")]
    AuthRequired,

    /// The credential file exists but is not in the expected two-line
    /// `KEY=VALUE` format.
    #[error("credential file error: {0}")]
    Store(String),

    /// Filesystem errors while reading or writing the credential file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand used by the session controller for validation failures.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }
}
