//! Table-backed backend for tests and embedding.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::backend::Backend;
use crate::error::BackendError;

/// A deterministic backend resolving from a fixed table.
///
/// No I/O: a reference either has a row in the table or the resolution
/// fails, the same way a network backend fails an unknown reference. Calls
/// are counted, which makes deduplication observable in tests.
pub struct InMemoryBackend {
    prefix: String,
    table: HashMap<String, String>,
    calls: AtomicUsize,
}

impl InMemoryBackend {
    /// An empty backend claiming `prefix`. Every resolution fails until
    /// mappings are added.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            table: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Add one `reference -> value` row.
    pub fn with_mapping(mut self, reference: impl Into<String>, value: impl Into<String>) -> Self {
        self.table.insert(reference.into(), value.into());
        self
    }

    /// Number of resolve calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    async fn resolve(
        &self,
        _token: CancellationToken,
        reference: &str,
    ) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.table.get(reference) {
            Some(value) => Ok(value.clone()),
            None => Err(format!("no mapping for {reference}").into()),
        }
    }
}
