//! GitHub backend for gyr.
//!
//! Claims `gyr+gh://` and resolves `gyr+gh://owner/repo#ref` to the SHA of
//! the commit the ref currently points at, where `ref` is a branch, a tag,
//! or any commit-ish the GitHub API accepts. Works anonymously against
//! public repositories; a token (from `GITHUB_TOKEN` or the builder) raises
//! rate limits and reaches private ones.
//!
//! # Modules
//!
//! - [`backend`] — [`GithubBackend`] and reference parsing
//! - [`error`] — [`GithubError`]

pub mod backend;
pub mod error;

pub use backend::{GithubBackend, PREFIX};
pub use error::{GithubError, GithubResult};
