//! Image reference parsing and canonicalization.
//!
//! Short names follow Docker's conventions:
//!
//! - the first path component is a registry host only when it contains a
//!   `.` or a `:` or equals `localhost`; otherwise the default registry
//!   applies
//! - single-component repositories on the default registry live under the
//!   `library/` namespace
//! - `:tag` after the last slash selects a tag, `@sha256:...` a digest,
//!   and a bare name means `:latest`
//!
//! Docker Hub references canonicalize to the `index.docker.io` name while
//! API traffic goes to `registry-1.docker.io`, matching how the Hub splits
//! its canonical name from its endpoint. The `docker.io` alias is folded
//! into `index.docker.io` at parse time, so aliased references follow the
//! same namespace and endpoint rules as bare short names.

use std::fmt;

use crate::error::{DockerError, DockerResult};

/// Canonical registry for short names.
pub const DEFAULT_REGISTRY: &str = "index.docker.io";
/// Implicit tag for references that name neither a tag nor a digest.
pub const DEFAULT_TAG: &str = "latest";

/// API endpoint standing in for [`DEFAULT_REGISTRY`].
const DEFAULT_REGISTRY_HOST: &str = "registry-1.docker.io";
/// Hub alias accepted wherever [`DEFAULT_REGISTRY`] is meant.
const REGISTRY_ALIAS: &str = "docker.io";
/// Implicit namespace for single-component repositories on the Hub.
const DEFAULT_NAMESPACE: &str = "library";

/// Tag or digest selecting one manifest of a repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManifestRef {
    Tag(String),
    Digest(String),
}

impl ManifestRef {
    /// The path segment used in manifest API requests.
    pub fn as_str(&self) -> &str {
        match self {
            ManifestRef::Tag(tag) => tag,
            ManifestRef::Digest(digest) => digest,
        }
    }
}

/// A parsed, canonicalized image reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageReference {
    registry: String,
    repository: String,
    manifest: ManifestRef,
}

impl ImageReference {
    /// Parse an image name, applying short-name canonicalization.
    ///
    /// When both a tag and a digest are present (`name:tag@sha256:...`)
    /// the digest selects the manifest and the tag is dropped from the
    /// canonical form.
    pub fn parse(image: &str) -> DockerResult<Self> {
        let malformed = |reason: &str| DockerError::MalformedReference {
            image: image.to_string(),
            reason: reason.to_string(),
        };

        if image.is_empty() {
            return Err(malformed("empty image name"));
        }

        let (name, digest) = match image.split_once('@') {
            Some((name, digest)) => (name, Some(digest)),
            None => (image, None),
        };

        let (registry, remainder) = match name.split_once('/') {
            Some((first, rest)) if is_registry_host(first) => {
                let host = if first == REGISTRY_ALIAS {
                    DEFAULT_REGISTRY
                } else {
                    first
                };
                (host.to_string(), rest)
            }
            _ => (DEFAULT_REGISTRY.to_string(), name),
        };

        // Only the last component can carry a tag; a colon further left
        // would have been a registry port and is already consumed.
        let (repository, tag) = match remainder.rsplit_once(':') {
            Some((repository, tag)) if !tag.contains('/') => (repository, Some(tag)),
            _ => (remainder, None),
        };
        if repository.is_empty() {
            return Err(malformed("empty repository"));
        }
        if tag == Some("") {
            return Err(malformed("empty tag"));
        }

        let mut repository = repository.to_string();
        if registry == DEFAULT_REGISTRY && !repository.contains('/') {
            repository = format!("{DEFAULT_NAMESPACE}/{repository}");
        }

        let manifest = match digest {
            Some(digest) => {
                validate_digest(digest).map_err(|reason| malformed(&reason))?;
                ManifestRef::Digest(digest.to_string())
            }
            None => ManifestRef::Tag(tag.unwrap_or(DEFAULT_TAG).to_string()),
        };

        Ok(Self {
            registry,
            repository,
            manifest,
        })
    }

    pub fn registry(&self) -> &str {
        &self.registry
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn manifest(&self) -> &ManifestRef {
        &self.manifest
    }

    /// Host to direct API requests at.
    pub fn api_host(&self) -> &str {
        if self.registry == DEFAULT_REGISTRY {
            DEFAULT_REGISTRY_HOST
        } else {
            &self.registry
        }
    }

    /// The full canonical rendering, digest or tag included.
    pub fn canonical(&self) -> String {
        match &self.manifest {
            ManifestRef::Tag(tag) => format!("{}/{}:{}", self.registry, self.repository, tag),
            ManifestRef::Digest(digest) => {
                format!("{}/{}@{}", self.registry, self.repository, digest)
            }
        }
    }

    /// The pinned rendering with `digest` applied, e.g.
    /// `index.docker.io/library/ubuntu:latest@sha256:...`.
    ///
    /// A reference that already carried a digest renders with the single
    /// authoritative digest, not two.
    pub fn pinned(&self, digest: &str) -> String {
        match &self.manifest {
            ManifestRef::Tag(_) => format!("{}@{}", self.canonical(), digest),
            ManifestRef::Digest(_) => {
                format!("{}/{}@{}", self.registry, self.repository, digest)
            }
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

fn is_registry_host(component: &str) -> bool {
    component.contains('.') || component.contains(':') || component == "localhost"
}

/// A digest must be `sha256:` followed by 64 hex characters.
fn validate_digest(digest: &str) -> Result<(), String> {
    let hexdigest = digest
        .strip_prefix("sha256:")
        .ok_or_else(|| format!("unsupported digest algorithm in '{digest}'"))?;
    if hexdigest.len() != 64 || !hexdigest.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("invalid sha256 digest '{digest}'"));
    }
    Ok(())
}
