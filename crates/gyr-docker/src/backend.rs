//! Manifest digest lookup against the Registry HTTP API V2.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT, WWW_AUTHENTICATE};
use reqwest::{Method, Response, StatusCode};
use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use gyr_engine::{Backend, BackendError};

use crate::auth::{BearerChallenge, TokenResponse};
use crate::error::{DockerError, DockerResult};
use crate::reference::ImageReference;

/// Scheme prefix claimed by [`DockerBackend`].
pub const PREFIX: &str = "gyr+docker://";

/// Digest header set by registries on manifest responses.
const DIGEST_HEADER: &str = "docker-content-digest";

/// Manifest media types we accept. The list mirrors what `docker pull`
/// sends; the registry computes the digest over whichever representation
/// it serves, so the Accept set decides which digest comes back.
const MANIFEST_ACCEPT: &str = "application/vnd.docker.distribution.manifest.v2+json, \
     application/vnd.docker.distribution.manifest.list.v2+json, \
     application/vnd.oci.image.manifest.v1+json, \
     application/vnd.oci.image.index.v1+json";

/// Resolves `gyr+docker://image` to the image's digest-pinned name.
///
/// The lookup is a HEAD on the manifest endpoint. A 401 with a bearer
/// challenge triggers one anonymous token fetch and a retry; registries
/// that omit the digest header get a GET and the digest is computed over
/// the manifest bytes.
pub struct DockerBackend {
    client: reqwest::Client,
}

impl DockerBackend {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn lookup_digest(
        &self,
        cancel: CancellationToken,
        reference: &str,
    ) -> DockerResult<String> {
        let name = reference.strip_prefix(PREFIX).unwrap_or(reference);
        let image = ImageReference::parse(name)?;
        debug!(image = %image, "resolving manifest digest");

        let mut bearer: Option<String> = None;
        let mut response = self
            .manifest_request(&cancel, &image, Method::HEAD, None)
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            let challenge = bearer_challenge(&image, response.headers())?;
            bearer = Some(self.fetch_token(&cancel, &image, &challenge).await?);
            response = self
                .manifest_request(&cancel, &image, Method::HEAD, bearer.as_deref())
                .await?;
        }

        let status = response.status();
        if !status.is_success() {
            return Err(DockerError::Status {
                status: status.as_u16(),
                image: image.canonical(),
            });
        }

        let digest = match header_digest(&response) {
            Some(digest) => digest,
            // Some registries omit the digest header on HEAD.
            None => {
                self.digest_from_manifest(&cancel, &image, bearer.as_deref())
                    .await?
            }
        };

        Ok(image.pinned(&digest))
    }

    async fn manifest_request(
        &self,
        cancel: &CancellationToken,
        image: &ImageReference,
        method: Method,
        bearer: Option<&str>,
    ) -> DockerResult<Response> {
        let url = format!(
            "https://{}/v2/{}/manifests/{}",
            image.api_host(),
            image.repository(),
            image.manifest().as_str()
        );

        let mut request = self.client.request(method, &url).header(ACCEPT, MANIFEST_ACCEPT);
        if let Some(bearer) = bearer {
            request = request.bearer_auth(bearer);
        }

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(DockerError::Cancelled),
            response = request.send() => response?,
        };
        Ok(response)
    }

    /// Fetch an anonymous pull token from the challenge's realm.
    async fn fetch_token(
        &self,
        cancel: &CancellationToken,
        image: &ImageReference,
        challenge: &BearerChallenge,
    ) -> DockerResult<String> {
        let pull_scope = format!("repository:{}:pull", image.repository());
        let scope = challenge.scope.as_deref().unwrap_or(&pull_scope);

        let mut query: Vec<(&str, &str)> = vec![("scope", scope)];
        if let Some(service) = &challenge.service {
            query.push(("service", service));
        }

        let request = self.client.get(&challenge.realm).query(&query);
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(DockerError::Cancelled),
            response = request.send() => response?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(DockerError::TokenService {
                status: status.as_u16(),
                image: image.canonical(),
            });
        }

        let issued: TokenResponse = response.json().await?;
        issued.into_token().ok_or_else(|| DockerError::TokenMissing {
            image: image.canonical(),
        })
    }

    /// GET the manifest and hash its bytes.
    async fn digest_from_manifest(
        &self,
        cancel: &CancellationToken,
        image: &ImageReference,
        bearer: Option<&str>,
    ) -> DockerResult<String> {
        let response = self
            .manifest_request(cancel, image, Method::GET, bearer)
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DockerError::Status {
                status: status.as_u16(),
                image: image.canonical(),
            });
        }

        let body = tokio::select! {
            _ = cancel.cancelled() => return Err(DockerError::Cancelled),
            body = response.bytes() => body?,
        };
        Ok(format!("sha256:{}", hex::encode(Sha256::digest(&body))))
    }
}

impl Default for DockerBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for DockerBackend {
    fn prefix(&self) -> &str {
        PREFIX
    }

    async fn resolve(
        &self,
        token: CancellationToken,
        reference: &str,
    ) -> Result<String, BackendError> {
        Ok(self.lookup_digest(token, reference).await?)
    }
}

fn bearer_challenge(image: &ImageReference, headers: &HeaderMap) -> DockerResult<BearerChallenge> {
    let header = headers
        .get(WWW_AUTHENTICATE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    BearerChallenge::parse(header).ok_or_else(|| DockerError::UnsupportedChallenge {
        image: image.canonical(),
        header: header.to_string(),
    })
}

fn header_digest(response: &Response) -> Option<String> {
    response
        .headers()
        .get(DIGEST_HEADER)?
        .to_str()
        .ok()
        .map(str::to_string)
}
