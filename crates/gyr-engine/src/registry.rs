//! Ordered prefix dispatch over registered backends.

use std::fmt;
use std::sync::Arc;

use crate::backend::Backend;

/// The set of registered backends, dispatched by scheme prefix.
///
/// Dispatch is a linear scan in registration order: the first backend whose
/// prefix starts the reference wins. Overlapping prefixes are legal and not
/// validated, so with `gyr+x://` registered before `gyr+x://pin/`, every
/// `gyr+x://pin/` reference routes to the former. Register the more
/// specific prefix first if both must coexist.
///
/// Cloning is cheap; clones share the same backends.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    backends: Vec<Arc<dyn Backend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    /// Append a backend. Registration order is dispatch order.
    pub fn register(&mut self, backend: Arc<dyn Backend>) {
        self.backends.push(backend);
    }

    /// The first registered backend whose prefix starts `reference`.
    pub fn find(&self, reference: &str) -> Option<Arc<dyn Backend>> {
        self.backends
            .iter()
            .find(|backend| reference.starts_with(backend.prefix()))
            .cloned()
    }

    /// Whether any registered backend claims `reference`.
    pub fn is_resolvable(&self, reference: &str) -> bool {
        self.find(reference).is_some()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefixes: Vec<&str> = self.backends.iter().map(|b| b.prefix()).collect();
        f.debug_struct("BackendRegistry")
            .field("prefixes", &prefixes)
            .finish()
    }
}
