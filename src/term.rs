//! Interned IRI terms.
//!
//! Every IRI (and literal lexical form) appearing in a loaded ontology is
//! interned exactly once into a compact [`TermId`]. The [`TermInterner`]
//! holds the bidirectional mapping and allocates ids; graph queries work on
//! ids and only touch strings at the display boundary.

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};

/// Well-known IRIs the ontology layer special-cases.
pub mod iri {
    /// `rdf:type` — concept declarations assert `<c> rdf:type owl:Class`.
    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    /// `owl:Class` — the object of a concept declaration.
    pub const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
    /// `rdfs:subClassOf` — canonical spelling of the subclass predicate.
    pub const RDFS_SUB_CLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
}

/// Unique, niche-optimized identifier for an interned term.
///
/// Uses `NonZeroU64` so that `Option<TermId>` is the same size as `TermId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct TermId(NonZeroU64);

impl TermId {
    /// Create a `TermId` from a raw `u64`. Returns `None` if `raw` is zero.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(TermId)
    }

    /// Get the underlying `u64` value.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for TermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "term:{}", self.0)
    }
}

/// Bidirectional IRI ↔ [`TermId`] interner.
///
/// Ids are allocated monotonically starting from 1. Interning the same
/// string twice always yields the same id.
pub struct TermInterner {
    /// IRI string → id (source of truth for dedup).
    by_iri: DashMap<String, TermId>,
    /// Reverse map: id → IRI string.
    by_id: DashMap<TermId, String>,
    /// Next raw id to hand out.
    next: AtomicU64,
}

impl TermInterner {
    /// Create a new empty interner.
    pub fn new() -> Self {
        Self {
            by_iri: DashMap::new(),
            by_id: DashMap::new(),
            next: AtomicU64::new(1),
        }
    }

    /// Intern an IRI, returning its id (existing or freshly allocated).
    pub fn get_or_intern(&self, iri: &str) -> TermId {
        if let Some(id) = self.by_iri.get(iri) {
            return *id.value();
        }
        match self.by_iri.entry(iri.to_string()) {
            Entry::Occupied(occupied) => *occupied.get(),
            Entry::Vacant(vacant) => {
                let raw = self.next.fetch_add(1, Ordering::Relaxed);
                let id = TermId::new(raw).expect("term id space exhausted");
                // Reverse entry goes in before the forward entry becomes
                // visible, so a concurrent `iri()` never sees a half-interned
                // term.
                self.by_id.insert(id, iri.to_string());
                vacant.insert(id);
                id
            }
        }
    }

    /// Look up an already-interned IRI without creating it.
    pub fn get(&self, iri: &str) -> Option<TermId> {
        self.by_iri.get(iri).map(|id| *id.value())
    }

    /// Get the IRI string for an id.
    pub fn iri(&self, id: TermId) -> Option<String> {
        self.by_id.get(&id).map(|s| s.value().clone())
    }

    /// Get the IRI string for an id, falling back to `term:{id}`.
    pub fn resolve_iri(&self, id: TermId) -> String {
        self.iri(id).unwrap_or_else(|| format!("term:{}", id.get()))
    }

    /// Number of interned terms.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the interner is empty.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl Default for TermInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TermInterner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermInterner")
            .field("terms", &self.len())
            .finish()
    }
}
