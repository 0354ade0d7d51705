//! Reference resolution engine for gyr.
//!
//! gyr rewrites mutable, scheme-prefixed references embedded in structured
//! documents (`gyr+gh://owner/repo#branch`, `gyr+docker://image:tag`) into
//! the immutable identifiers they currently point at. This crate is the
//! format-agnostic core: it finds references in a document forest, routes
//! each one to a backend, resolves distinct references concurrently, and
//! writes the results back in place.
//!
//! # Resolution pipeline
//!
//! A call to [`ResolutionEngine::resolve`] runs four phases:
//!
//! 1. **Scan** — walk the forest and index every string scalar whose
//!    trimmed value starts with a registered scheme prefix, grouped by
//!    value ([`ReferenceIndex`]).
//! 2. **Fan out** — spawn one task per distinct reference. Duplicates are
//!    resolved exactly once no matter how many places they appear.
//! 3. **Join** — wait for every task. The first failure is returned after
//!    all siblings have finished.
//! 4. **Write back** — only when every reference resolved, replace each
//!    indexed node with its resolved value. On error the forest is
//!    untouched.
//!
//! # Modules
//!
//! - [`backend`] — The [`Backend`] trait resolvers implement
//! - [`registry`] — [`BackendRegistry`]: ordered prefix dispatch
//! - [`index`] — [`ReferenceIndex`]: deduplicated reference positions
//! - [`engine`] — [`ResolutionEngine`]: the pipeline itself
//! - [`memory`] — [`InMemoryBackend`] for tests and embedding
//! - [`error`] — [`EngineError`] and the boxed [`BackendError`]
//!
//! # Quick start
//!
//! ```
//! use std::sync::Arc;
//!
//! use gyr_engine::{InMemoryBackend, ResolutionEngine};
//! use gyr_tree::{Document, Node};
//! use tokio_util::sync::CancellationToken;
//!
//! let backend = InMemoryBackend::new("gyr+demo://").with_mapping("gyr+demo://app", "v1.2.3");
//! let mut engine = ResolutionEngine::new();
//! engine.register(Arc::new(backend));
//!
//! let mut forest = vec![Document::new(Node::string("gyr+demo://app"))];
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! runtime
//!     .block_on(engine.resolve(CancellationToken::new(), &mut forest))
//!     .unwrap();
//!
//! assert_eq!(forest[0].root().as_str(), Some("v1.2.3"));
//! ```

pub mod backend;
pub mod engine;
pub mod error;
pub mod index;
pub mod memory;
pub mod registry;

pub use backend::Backend;
pub use engine::ResolutionEngine;
pub use error::{BackendError, EngineError, EngineResult};
pub use index::ReferenceIndex;
pub use memory::InMemoryBackend;
pub use registry::BackendRegistry;
