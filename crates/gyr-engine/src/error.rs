//! Error types for the resolution engine.

use thiserror::Error;

/// Boxed error returned by backend implementations.
///
/// Backends keep their own error enums; the engine only needs to carry the
/// failure to the caller with the reference it belongs to. `?` converts any
/// `Send + Sync` error into this type.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from a resolve call.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A backend failed to resolve one reference. The whole call aborts
    /// and no document is mutated.
    #[error("{prefix} resolve {reference}: {source}")]
    Resolution {
        prefix: String,
        reference: String,
        #[source]
        source: BackendError,
    },

    /// A resolution task panicked or was aborted by the runtime.
    #[error("resolution task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// An indexed reference matched no backend at fan-out time. The
    /// registry is never modified during a resolve call, so this is an
    /// internal consistency failure, not a user error.
    #[error("no backend claims indexed reference {reference}")]
    UnclaimedReference { reference: String },

    /// A reference survived the fan-out without a recorded value.
    #[error("no resolved value recorded for reference {reference}")]
    MissingResolution { reference: String },

    /// An indexed position stopped addressing a node before write-back.
    #[error("indexed position for reference {reference} no longer exists")]
    StalePosition { reference: String },
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
