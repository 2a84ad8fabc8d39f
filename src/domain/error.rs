use std::path::PathBuf;
use thiserror::Error;

/// Failures on the client's side of the wire.
///
/// HTTP error statuses are not errors; they come back inside an `ApiResponse`.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{endpoint}: request could not be built: {message}")]
    InvalidRequest {
        endpoint: &'static str,
        message: String,
    },

    #[error("{endpoint}: transport failure: {message}")]
    Transport {
        endpoint: &'static str,
        message: String,
    },

    #[error("cannot read photo {}: {message}", path.display())]
    Photo { path: PathBuf, message: String },
}
