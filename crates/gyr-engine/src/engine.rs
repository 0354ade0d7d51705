//! The resolution pipeline: scan, fan out, join, write back.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use gyr_tree::{node_at_mut, Document, Node, Scalar};

use crate::backend::Backend;
use crate::error::{EngineError, EngineResult};
use crate::index::ReferenceIndex;
use crate::registry::BackendRegistry;

/// Resolves every reference in a document forest, in place.
///
/// Distinct references are resolved concurrently, one task each; identical
/// references are resolved exactly once and every occurrence receives the
/// same value. A resolve call either rewrites the whole forest or leaves it
/// untouched: write-back starts only after every task has succeeded.
pub struct ResolutionEngine {
    registry: BackendRegistry,
}

impl ResolutionEngine {
    /// An engine with no backends. Resolving through it is a no-op.
    pub fn new() -> Self {
        Self {
            registry: BackendRegistry::new(),
        }
    }

    /// An engine with `backends` registered in iteration order.
    pub fn with_backends<I>(backends: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Backend>>,
    {
        let mut engine = Self::new();
        for backend in backends {
            engine.register(backend);
        }
        engine
    }

    /// Append a backend. Registration order is dispatch order.
    pub fn register(&mut self, backend: Arc<dyn Backend>) {
        self.registry.register(backend);
    }

    /// The registry this engine dispatches through.
    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Resolve every claimed reference in `forest`, mutating it in place.
    ///
    /// `token` is handed to every backend call; cancelling it makes
    /// in-flight resolutions fail, which surfaces here as an ordinary
    /// resolution error and leaves the forest unmodified.
    pub async fn resolve(
        &self,
        token: CancellationToken,
        forest: &mut [Document],
    ) -> EngineResult<()> {
        let index = ReferenceIndex::scan(forest, &self.registry);
        debug!(
            documents = forest.len(),
            references = index.len(),
            positions = index.position_count(),
            "indexed forest"
        );
        if index.is_empty() {
            return Ok(());
        }

        let resolved = self.resolve_index(token, &index).await?;
        write_back(forest, &index, &resolved)
    }

    /// Fan out one task per distinct reference and join them all.
    ///
    /// Every task runs to completion even after a sibling fails; the first
    /// error in completion order is returned and any values the other
    /// tasks resolved are discarded.
    async fn resolve_index(
        &self,
        token: CancellationToken,
        index: &ReferenceIndex,
    ) -> EngineResult<HashMap<String, String>> {
        let resolved = Arc::new(RwLock::new(HashMap::new()));
        let mut tasks: JoinSet<EngineResult<()>> = JoinSet::new();

        for reference in index.references() {
            let reference = reference.to_string();
            let registry = self.registry.clone();
            let resolved = Arc::clone(&resolved);
            let token = token.clone();

            tasks.spawn(async move {
                let backend =
                    registry
                        .find(&reference)
                        .ok_or_else(|| EngineError::UnclaimedReference {
                            reference: reference.clone(),
                        })?;

                match backend.resolve(token, &reference).await {
                    Ok(value) => {
                        debug!(reference = %reference, backend = backend.prefix(), "resolved");
                        resolved
                            .write()
                            .expect("lock poisoned")
                            .insert(reference, value);
                        Ok(())
                    }
                    Err(source) => Err(EngineError::Resolution {
                        prefix: backend.prefix().to_string(),
                        reference,
                        source,
                    }),
                }
            });
        }

        let mut first_error = None;
        while let Some(outcome) = tasks.join_next().await {
            let result = match outcome {
                Ok(result) => result,
                Err(join_error) => Err(EngineError::Task(join_error)),
            };
            if let Err(error) = result {
                if first_error.is_none() {
                    first_error = Some(error);
                }
            }
        }
        if let Some(error) = first_error {
            return Err(error);
        }

        let resolved = match Arc::try_unwrap(resolved) {
            Ok(lock) => lock.into_inner().expect("lock poisoned"),
            Err(shared) => shared.read().expect("lock poisoned").clone(),
        };
        Ok(resolved)
    }
}

impl Default for ResolutionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace every indexed node with the value resolved for its reference.
///
/// Runs strictly after a fully successful fan-out; a missing value or a
/// dangling position means the index and the forest went out of sync.
fn write_back(
    forest: &mut [Document],
    index: &ReferenceIndex,
    resolved: &HashMap<String, String>,
) -> EngineResult<()> {
    for (reference, positions) in index.iter() {
        let value = resolved
            .get(reference)
            .ok_or_else(|| EngineError::MissingResolution {
                reference: reference.to_string(),
            })?;

        for position in positions {
            let node =
                node_at_mut(forest, position).ok_or_else(|| EngineError::StalePosition {
                    reference: reference.to_string(),
                })?;
            *node = Node::Scalar(Scalar::String(value.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use gyr_tree::{node_at, NodePath, Step};
    use gyr_yaml::YamlCodec;

    use crate::error::BackendError;
    use crate::memory::InMemoryBackend;

    fn forest(input: &str) -> Vec<Document> {
        YamlCodec::decode_str(input).unwrap()
    }

    fn token() -> CancellationToken {
        CancellationToken::new()
    }

    /// Succeeds after a delay and raises a flag, to observe join behavior.
    struct SlowBackend {
        prefix: &'static str,
        delay: Duration,
        finished: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Backend for SlowBackend {
        fn prefix(&self) -> &str {
            self.prefix
        }

        async fn resolve(
            &self,
            _token: CancellationToken,
            _reference: &str,
        ) -> Result<String, BackendError> {
            tokio::time::sleep(self.delay).await;
            self.finished.store(true, Ordering::SeqCst);
            Ok("slow-value".to_string())
        }
    }

    /// Fails only once the token fires.
    struct CancelAwareBackend {
        prefix: &'static str,
    }

    #[async_trait]
    impl Backend for CancelAwareBackend {
        fn prefix(&self) -> &str {
            self.prefix
        }

        async fn resolve(
            &self,
            token: CancellationToken,
            _reference: &str,
        ) -> Result<String, BackendError> {
            token.cancelled().await;
            Err("interrupted".into())
        }
    }

    // -----------------------------------------------------------------------
    // 1. No backends: nothing changes
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn resolve_without_backends_is_a_noop() {
        let engine = ResolutionEngine::new();
        let mut docs = forest("foo: gyr+foo://test\n");
        let before = docs.clone();

        engine.resolve(token(), &mut docs).await.unwrap();
        assert_eq!(docs, before);
        assert_eq!(
            YamlCodec::encode_string(&docs).unwrap(),
            "---\nfoo: gyr+foo://test\n"
        );
    }

    // -----------------------------------------------------------------------
    // 2. Unclaimed schemes pass through untouched
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn unclaimed_scheme_passes_through() {
        let mut engine = ResolutionEngine::new();
        engine.register(Arc::new(
            InMemoryBackend::new("gyr+blabla://").with_mapping("gyr+blabla://x", "y"),
        ));

        let mut docs = forest("foo: gyr+foo://test\n");
        let before = docs.clone();
        engine.resolve(token(), &mut docs).await.unwrap();
        assert_eq!(docs, before);
    }

    // -----------------------------------------------------------------------
    // 3. A claimed reference is rewritten in place
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn claimed_reference_is_rewritten() {
        let mut engine = ResolutionEngine::new();
        engine.register(Arc::new(
            InMemoryBackend::new("gyr+foo://").with_mapping("gyr+foo://test", "bar"),
        ));

        let mut docs = forest("foo: gyr+foo://test\n");
        engine.resolve(token(), &mut docs).await.unwrap();
        assert_eq!(YamlCodec::encode_string(&docs).unwrap(), "---\nfoo: bar\n");
    }

    // -----------------------------------------------------------------------
    // 4. Multiple documents, multiple backends
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn resolves_across_documents_and_backends() {
        let engine = ResolutionEngine::with_backends([
            Arc::new(InMemoryBackend::new("gyr+first://").with_mapping("gyr+first://one", "1"))
                as Arc<dyn Backend>,
            Arc::new(InMemoryBackend::new("gyr+second://").with_mapping("gyr+second://two", "2")),
        ]);

        let mut docs = forest("---\nfoo: gyr+first://one\n---\ncaz: gyr+second://two\n");
        engine.resolve(token(), &mut docs).await.unwrap();

        let first = node_at(&docs, &NodePath::new(0, vec![Step::Value(0)]));
        let second = node_at(&docs, &NodePath::new(1, vec![Step::Value(0)]));
        assert_eq!(first.unwrap().as_str(), Some("1"));
        assert_eq!(second.unwrap().as_str(), Some("2"));
    }

    // -----------------------------------------------------------------------
    // 5. Duplicates resolve once and rewrite everywhere
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn duplicate_references_resolve_once() {
        let backend = Arc::new(
            InMemoryBackend::new("gyr+dup://").with_mapping("gyr+dup://shared", "pinned"),
        );
        let mut engine = ResolutionEngine::new();
        engine.register(backend.clone());

        let mut docs = forest(
            "---\na: gyr+dup://shared\nb: gyr+dup://shared\n---\nc: gyr+dup://shared\n",
        );
        engine.resolve(token(), &mut docs).await.unwrap();

        assert_eq!(backend.calls(), 1);
        let encoded = YamlCodec::encode_string(&docs).unwrap();
        assert_eq!(encoded.matches("pinned").count(), 3);
        assert!(!encoded.contains("gyr+dup://"));
    }

    // -----------------------------------------------------------------------
    // 6. Whitespace-padded duplicates share one resolution
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn padded_duplicates_share_one_resolution() {
        let backend =
            Arc::new(InMemoryBackend::new("gyr+dup://").with_mapping("gyr+dup://ref", "pinned"));
        let mut engine = ResolutionEngine::new();
        engine.register(backend.clone());

        let mut docs = forest("a: \"  gyr+dup://ref \"\nb: gyr+dup://ref\n");
        engine.resolve(token(), &mut docs).await.unwrap();

        assert_eq!(backend.calls(), 1);
        // The padded occurrence is replaced by the trimmed resolution.
        let Node::Mapping(entries) = docs[0].root() else {
            panic!("expected mapping");
        };
        assert_eq!(entries[0].1.as_str(), Some("pinned"));
        assert_eq!(entries[1].1.as_str(), Some("pinned"));
    }

    // -----------------------------------------------------------------------
    // 7. A failing reference aborts the call and names itself
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn failure_names_prefix_and_reference() {
        let mut engine = ResolutionEngine::new();
        engine.register(Arc::new(InMemoryBackend::new("gyr+foo://")));

        let mut docs = forest("foo: gyr+foo://test\n");
        let err = engine.resolve(token(), &mut docs).await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("gyr+foo://"), "missing prefix: {message}");
        assert!(
            message.contains("gyr+foo://test"),
            "missing reference: {message}"
        );
    }

    // -----------------------------------------------------------------------
    // 8. Failure leaves every document untouched
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn failure_leaves_forest_untouched() {
        let engine = ResolutionEngine::with_backends([
            Arc::new(InMemoryBackend::new("gyr+ok://").with_mapping("gyr+ok://fine", "resolved"))
                as Arc<dyn Backend>,
            Arc::new(InMemoryBackend::new("gyr+bad://")), // empty table: always fails
        ]);

        let mut docs = forest("---\na: gyr+ok://fine\n---\nb: gyr+bad://broken\n");
        let before = docs.clone();

        let err = engine.resolve(token(), &mut docs).await.unwrap_err();
        assert!(matches!(err, EngineError::Resolution { .. }));
        assert_eq!(docs, before, "sibling resolution must not leak into the forest");
    }

    // -----------------------------------------------------------------------
    // 9. A failure still waits for the remaining tasks
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn failure_waits_for_running_siblings() {
        let finished = Arc::new(AtomicBool::new(false));
        let engine = ResolutionEngine::with_backends([
            Arc::new(InMemoryBackend::new("gyr+bad://")) as Arc<dyn Backend>,
            Arc::new(SlowBackend {
                prefix: "gyr+slow://",
                delay: Duration::from_millis(50),
                finished: finished.clone(),
            }),
        ]);

        let mut docs = forest("a: gyr+bad://fails\nb: gyr+slow://takes-a-while\n");
        engine.resolve(token(), &mut docs).await.unwrap_err();

        assert!(
            finished.load(Ordering::SeqCst),
            "slow task must complete before the error is returned"
        );
    }

    // -----------------------------------------------------------------------
    // 10. Registration order decides overlapping prefixes
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn overlapping_prefixes_dispatch_by_registration_order() {
        let broad = Arc::new(
            InMemoryBackend::new("gyr+x://").with_mapping("gyr+x://pin/thing", "from-broad"),
        );
        let narrow = Arc::new(
            InMemoryBackend::new("gyr+x://pin/").with_mapping("gyr+x://pin/thing", "from-narrow"),
        );
        let mut engine = ResolutionEngine::new();
        engine.register(broad.clone());
        engine.register(narrow.clone());

        // Both prefixes match the reference; the first registered wins.
        let mut docs = forest("x: gyr+x://pin/thing\n");
        engine.resolve(token(), &mut docs).await.unwrap();

        assert_eq!(broad.calls(), 1);
        assert_eq!(narrow.calls(), 0);
        let Node::Mapping(entries) = docs[0].root() else {
            panic!("expected mapping");
        };
        assert_eq!(entries[0].1.as_str(), Some("from-broad"));
    }

    // -----------------------------------------------------------------------
    // 11. Cancellation surfaces as the failing reference's error
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn cancelled_token_fails_the_resolution() {
        let mut engine = ResolutionEngine::new();
        engine.register(Arc::new(CancelAwareBackend {
            prefix: "gyr+net://",
        }));

        let cancel = token();
        cancel.cancel();

        let mut docs = forest("a: gyr+net://endpoint\n");
        let before = docs.clone();
        let err = engine.resolve(cancel, &mut docs).await.unwrap_err();

        assert!(err.to_string().contains("interrupted"));
        assert_eq!(docs, before);
    }

    // -----------------------------------------------------------------------
    // 12. Empty forest resolves trivially
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn empty_forest_resolves() {
        let mut engine = ResolutionEngine::new();
        engine.register(Arc::new(InMemoryBackend::new("gyr+x://")));
        engine.resolve(token(), &mut []).await.unwrap();
    }

    // -----------------------------------------------------------------------
    // 13. References inside sequences and keys are rewritten too
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn rewrites_sequence_items_and_mapping_keys() {
        let mut engine = ResolutionEngine::new();
        engine.register(Arc::new(
            InMemoryBackend::new("gyr+x://").with_mapping("gyr+x://ref", "pinned"),
        ));

        let mut docs = forest("items:\n  - gyr+x://ref\ngyr+x://ref: value\n");
        engine.resolve(token(), &mut docs).await.unwrap();

        let encoded = YamlCodec::encode_string(&docs).unwrap();
        assert!(!encoded.contains("gyr+x://"));
        assert_eq!(encoded.matches("pinned").count(), 2);
    }
}
