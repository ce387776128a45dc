//! Dispatch Registries — facet kind to read resolver (with debounce) and
//! facet kind to write resolver, populated once at startup.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use hcbridge_domain::facet::FacetKind;

use crate::ports::{ReadResolver, WriteResolver};

/// A read-table entry.
#[derive(Clone)]
pub struct ReadEntry {
    pub resolver: Arc<dyn ReadResolver>,
    /// Delay before an on-demand read fetches from the hub.
    pub debounce: Duration,
}

impl std::fmt::Debug for ReadEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadEntry")
            .field("debounce", &self.debounce)
            .finish_non_exhaustive()
    }
}

/// Both lookup tables.
#[derive(Default)]
pub struct DispatchRegistry {
    reads: HashMap<FacetKind, ReadEntry>,
    writes: HashMap<FacetKind, Arc<dyn WriteResolver>>,
}

impl DispatchRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the read resolver for `kind`.
    pub fn register_read(
        &mut self,
        kind: FacetKind,
        resolver: impl ReadResolver + 'static,
        debounce: Duration,
    ) -> &mut Self {
        self.reads.insert(
            kind,
            ReadEntry {
                resolver: Arc::new(resolver),
                debounce,
            },
        );
        self
    }

    /// Register (or replace) the write resolver for `kind`.
    pub fn register_write(
        &mut self,
        kind: FacetKind,
        resolver: impl WriteResolver + 'static,
    ) -> &mut Self {
        self.writes.insert(kind, Arc::new(resolver));
        self
    }

    #[must_use]
    pub fn read(&self, kind: FacetKind) -> Option<&ReadEntry> {
        self.reads.get(&kind)
    }

    #[must_use]
    pub fn write(&self, kind: FacetKind) -> Option<&Arc<dyn WriteResolver>> {
        self.writes.get(&kind)
    }

    /// Facet kinds with a read resolver.
    #[must_use]
    pub fn readable_kinds(&self) -> Vec<FacetKind> {
        let mut kinds: Vec<_> = self.reads.keys().copied().collect();
        kinds.sort_by_key(|k| k.as_str());
        kinds
    }
}

impl std::fmt::Debug for DispatchRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchRegistry")
            .field("reads", &self.reads.len())
            .field("writes", &self.writes.len())
            .finish()
    }
}
