//! Triple graph: pattern queries, neighbor aggregation, degree ranking.
//!
//! The graph stores directed, typed edges `(subject, predicate, object)`
//! over interned [`TermId`](crate::term::TermId)s.
//!
//! - [`store::TripleStore`] — multigraph with wildcard pattern matching
//! - [`related`] — bidirectional neighbor aggregation
//! - [`rank`] — global-degree candidate ranking
//!
//! The store is populated once at load time and treated as read-only
//! afterwards. Every query's result order is stable for a given store
//! instance but otherwise unspecified; downstream code must not read
//! meaning into it.

pub mod rank;
pub mod related;
pub mod store;

use serde::{Deserialize, Serialize};

use crate::term::TermId;

/// A directed, typed edge in the graph.
///
/// The same `(subject, object)` pair may be connected by several triples,
/// including exact duplicates; the store never deduplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    /// The subject of the triple.
    pub subject: TermId,
    /// The predicate (relation type) of the triple.
    pub predicate: TermId,
    /// The object of the triple.
    pub object: TermId,
}

impl Triple {
    /// Create a new triple.
    pub fn new(subject: TermId, predicate: TermId, object: TermId) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}
