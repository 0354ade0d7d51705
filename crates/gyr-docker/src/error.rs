//! Error types for the registry backend.

use thiserror::Error;

/// Errors from resolving a container image reference.
#[derive(Debug, Error)]
pub enum DockerError {
    /// The image name does not parse as a reference.
    #[error("malformed image reference '{image}': {reason}")]
    MalformedReference { image: String, reason: String },

    /// The lookup was abandoned because the cancellation token fired.
    #[error("resolution cancelled")]
    Cancelled,

    /// Transport-level failure talking to the registry.
    #[error("registry request: {0}")]
    Http(#[from] reqwest::Error),

    /// The registry answered a manifest request with a non-success status.
    #[error("registry returned {status} for {image}")]
    Status { status: u16, image: String },

    /// The token service answered with a non-success status.
    #[error("token service returned {status} for {image}")]
    TokenService { status: u16, image: String },

    /// The registry requires authentication but did not offer a bearer
    /// challenge this backend can answer anonymously.
    #[error("unsupported auth challenge for {image}: '{header}'")]
    UnsupportedChallenge { image: String, header: String },

    /// The token service answered without a usable token.
    #[error("token service issued no token for {image}")]
    TokenMissing { image: String },
}

/// Result alias for registry backend operations.
pub type DockerResult<T> = Result<T, DockerError>;
