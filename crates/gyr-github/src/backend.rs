//! Commit lookup against the GitHub API.

use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use gyr_engine::{Backend, BackendError};

use crate::error::{GithubError, GithubResult};

/// Scheme prefix claimed by [`GithubBackend`].
pub const PREFIX: &str = "gyr+gh://";

const DEFAULT_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("gyr/", env!("CARGO_PKG_VERSION"));

/// Resolves `gyr+gh://owner/repo#ref` to the commit SHA of `ref`.
///
/// One API call per reference: `GET /repos/{owner}/{repo}/commits/{ref}`,
/// which GitHub answers with the commit `ref` currently points at whether
/// it is a branch, a tag, or an abbreviated SHA.
pub struct GithubBackend {
    client: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

impl GithubBackend {
    /// A backend against api.github.com, authenticating with `GITHUB_TOKEN`
    /// when the variable is set.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            token: std::env::var("GITHUB_TOKEN").ok(),
        }
    }

    /// Replace the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Point at a different API root (GitHub Enterprise, test servers).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    async fn lookup_commit(
        &self,
        token: CancellationToken,
        reference: &str,
    ) -> GithubResult<String> {
        let (repository, git_ref) = split_reference(reference)?;
        let url = format!("{}/repos/{}/commits/{}", self.api_base, repository, git_ref);
        debug!(repository, git_ref, "looking up commit");

        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(bearer) = &self.token {
            request = request.bearer_auth(bearer);
        }

        let response = tokio::select! {
            _ = token.cancelled() => return Err(GithubError::Cancelled),
            response = request.send() => response?,
        };

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .ok()
                .and_then(|body| serde_json::from_str::<ApiError>(&body).ok())
                .map(|error| error.message)
                .unwrap_or_else(|| "no error message".to_string());
            return Err(GithubError::Status {
                status: status.as_u16(),
                repository: repository.to_string(),
                git_ref: git_ref.to_string(),
                message,
            });
        }

        let commit: Commit = response.json().await?;
        Ok(commit.sha)
    }
}

impl Default for GithubBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for GithubBackend {
    fn prefix(&self) -> &str {
        PREFIX
    }

    async fn resolve(
        &self,
        token: CancellationToken,
        reference: &str,
    ) -> Result<String, BackendError> {
        Ok(self.lookup_commit(token, reference).await?)
    }
}

/// Split `gyr+gh://owner/repo#ref` into (`owner/repo`, `ref`).
///
/// Exactly one `#` separates the repository from the ref; both sides must
/// be non-empty. The ref itself may contain slashes (`feature/login`).
fn split_reference(reference: &str) -> GithubResult<(&str, &str)> {
    let malformed = || GithubError::MalformedReference {
        reference: reference.to_string(),
    };

    let body = reference.strip_prefix(PREFIX).ok_or_else(malformed)?;
    let (repository, git_ref) = match body.split('#').collect::<Vec<_>>()[..] {
        [repository, git_ref] => (repository, git_ref),
        _ => return Err(malformed()),
    };
    if repository.is_empty() || git_ref.is_empty() {
        return Err(malformed());
    }
    Ok((repository, git_ref))
}

#[derive(Deserialize)]
struct Commit {
    sha: String,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_repository_and_ref() {
        let (repository, git_ref) =
            split_reference("gyr+gh://monero-project/monero#master").unwrap();
        assert_eq!(repository, "monero-project/monero");
        assert_eq!(git_ref, "master");
    }

    #[test]
    fn ref_may_contain_slashes() {
        let (_, git_ref) = split_reference("gyr+gh://owner/repo#feature/login").unwrap();
        assert_eq!(git_ref, "feature/login");
    }

    #[test]
    fn rejects_malformed_references() {
        for reference in [
            "gyr+gh://owner/repo",          // no ref
            "gyr+gh://owner/repo#a#b",      // two separators
            "gyr+gh://#master",             // empty repository
            "gyr+gh://owner/repo#",         // empty ref
            "gh://owner/repo#master",       // missing scheme prefix
        ] {
            let err = split_reference(reference).unwrap_err();
            assert!(
                matches!(err, GithubError::MalformedReference { .. }),
                "{reference} should be malformed"
            );
        }
    }

    #[test]
    fn claims_the_gh_scheme() {
        assert_eq!(GithubBackend::new().prefix(), "gyr+gh://");
    }

    #[test]
    fn commit_payload_decodes_sha() {
        let commit: Commit = serde_json::from_str(
            r#"{"sha": "8fde7128a3d29d7ef1e2e2e8547d0a0a1b8d5f64", "commit": {"message": "m"}}"#,
        )
        .unwrap();
        assert_eq!(commit.sha, "8fde7128a3d29d7ef1e2e2e8547d0a0a1b8d5f64");
    }

    #[test]
    fn api_error_payload_decodes_message() {
        let error: ApiError =
            serde_json::from_str(r#"{"message": "Not Found", "documentation_url": "x"}"#).unwrap();
        assert_eq!(error.message, "Not Found");
    }

    #[tokio::test]
    async fn cancelled_token_aborts_before_the_request() {
        let backend = GithubBackend::new()
            .with_api_base("http://127.0.0.1:1")
            .with_token("unused");
        let token = CancellationToken::new();
        token.cancel();

        let err = backend
            .resolve(token, "gyr+gh://owner/repo#main")
            .await
            .unwrap_err();
        let github = err.downcast_ref::<GithubError>().unwrap();
        assert!(matches!(github, GithubError::Cancelled));
    }

    #[tokio::test]
    async fn malformed_reference_fails_without_network() {
        let backend = GithubBackend::new().with_api_base("http://127.0.0.1:1");
        let err = backend
            .resolve(CancellationToken::new(), "gyr+gh://just-an-owner")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("expected owner/repo#ref"));
    }
}
