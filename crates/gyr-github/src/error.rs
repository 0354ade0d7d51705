//! Error types for the GitHub backend.

use thiserror::Error;

/// Errors from resolving a GitHub reference.
#[derive(Debug, Error)]
pub enum GithubError {
    /// The reference body does not look like `owner/repo#ref`.
    #[error("malformed reference '{reference}': expected owner/repo#ref")]
    MalformedReference { reference: String },

    /// The lookup was abandoned because the cancellation token fired.
    #[error("resolution cancelled")]
    Cancelled,

    /// Transport-level failure talking to the API.
    #[error("github api request: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("github api returned {status} for {repository}@{git_ref}: {message}")]
    Status {
        status: u16,
        repository: String,
        git_ref: String,
        message: String,
    },
}

/// Result alias for GitHub backend operations.
pub type GithubResult<T> = Result<T, GithubError>;
