//! The resolution capability trait.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::BackendError;

/// A resolver for one reference scheme.
///
/// A backend turns a mutable, scheme-prefixed reference into an immutable
/// identifier: a repository pointer into a commit SHA, an image name into a
/// name pinned by digest. Implementations are shared across the concurrent
/// fan-out, so they must be `Send + Sync`; interior state needs its own
/// synchronization.
#[async_trait]
pub trait Backend: Send + Sync {
    /// The literal scheme prefix this backend claims, e.g. `gyr+gh://`.
    ///
    /// A reference is routed here when its trimmed value starts with this
    /// string. The prefix must stay constant for the backend's lifetime.
    fn prefix(&self) -> &str;

    /// Resolve a full reference, prefix included, to its pinned form.
    ///
    /// Cancellation is advisory: implementations should abandon work
    /// promptly once `token` fires, typically by racing their network call
    /// against `token.cancelled()`, and report the interruption as an
    /// error.
    async fn resolve(
        &self,
        token: CancellationToken,
        reference: &str,
    ) -> Result<String, BackendError>;
}
