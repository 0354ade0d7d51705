//! Container registry backend for gyr.
//!
//! Claims `gyr+docker://` and resolves an image reference to its
//! digest-pinned form: `gyr+docker://ubuntu` becomes
//! `index.docker.io/library/ubuntu:latest@sha256:...`. Short names are
//! expanded with Docker's conventions before the lookup, and the digest
//! comes from the Registry HTTP API V2, fetching an anonymous pull token
//! when the registry asks for one.
//!
//! # Modules
//!
//! - [`reference`] — [`ImageReference`] parsing and canonicalization
//! - [`auth`] — [`BearerChallenge`] parsing for anonymous pull tokens
//! - [`backend`] — [`DockerBackend`]: the manifest digest lookup
//! - [`error`] — [`DockerError`]

pub mod auth;
pub mod backend;
pub mod error;
pub mod reference;

pub use auth::BearerChallenge;
pub use backend::{DockerBackend, PREFIX};
pub use error::{DockerError, DockerResult};
pub use reference::{ImageReference, ManifestRef};
