//! In-memory triple store with wildcard pattern matching.
//!
//! Uses `petgraph` for the multigraph structure and `DashMap` for fast
//! lookups by subject, predicate, or object.

use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::term::TermId;

use super::Triple;

/// In-memory triple multigraph backed by petgraph with dual-indexing.
///
/// Nodes are the terms appearing in subject or object position; edges carry
/// the predicate term. Parallel edges and exact duplicates are kept as
/// distinct triples.
///
/// Query results are stable for a given store instance; the order itself is
/// unspecified and must not be assigned meaning by callers.
pub struct TripleStore {
    /// The directed multigraph: node weights are terms, edge weights the
    /// predicate term.
    graph: RwLock<DiGraph<TermId, TermId>>,
    /// TermId → NodeIndex mapping for O(1) node lookups.
    node_index: DashMap<TermId, NodeIndex>,
    /// Predicate index: predicate term → (subject, object) pairs in
    /// insertion order.
    predicate_index: DashMap<TermId, Vec<(TermId, TermId)>>,
    /// Triple count.
    triple_count: AtomicUsize,
}

impl TripleStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            graph: RwLock::new(DiGraph::new()),
            node_index: DashMap::new(),
            predicate_index: DashMap::new(),
            triple_count: AtomicUsize::new(0),
        }
    }

    /// Ensure a node exists for the given term, returning its NodeIndex.
    fn ensure_node(&self, term: TermId) -> NodeIndex {
        if let Some(idx) = self.node_index.get(&term) {
            return *idx.value();
        }
        let mut graph = self.graph.write().expect("graph lock poisoned");
        // Double-check after acquiring the write lock
        if let Some(idx) = self.node_index.get(&term) {
            return *idx.value();
        }
        let idx = graph.add_node(term);
        self.node_index.insert(term, idx);
        idx
    }

    /// Insert a triple.
    ///
    /// Creates nodes for subject and object on demand. Duplicates are kept:
    /// inserting the same triple twice yields two matchable instances.
    pub fn insert(&self, triple: Triple) {
        let subj_idx = self.ensure_node(triple.subject);
        let obj_idx = self.ensure_node(triple.object);

        {
            let mut graph = self.graph.write().expect("graph lock poisoned");
            graph.add_edge(subj_idx, obj_idx, triple.predicate);
        }

        self.predicate_index
            .entry(triple.predicate)
            .or_default()
            .push((triple.subject, triple.object));

        self.triple_count.fetch_add(1, Ordering::Relaxed);
    }

    /// All triples matching a pattern; `None` is a wildcard in any position.
    pub fn matching(
        &self,
        subject: Option<TermId>,
        predicate: Option<TermId>,
        object: Option<TermId>,
    ) -> Vec<Triple> {
        match (subject, predicate, object) {
            (Some(s), p, o) => self
                .triples_from(s)
                .into_iter()
                .filter(|t| p.map_or(true, |p| t.predicate == p))
                .filter(|t| o.map_or(true, |o| t.object == o))
                .collect(),
            (None, Some(p), o) => self
                .triples_for_predicate(p)
                .into_iter()
                .filter(|t| o.map_or(true, |o| t.object == o))
                .collect(),
            (None, None, Some(o)) => self.triples_to(o),
            (None, None, None) => self.all_triples(),
        }
    }

    /// Whether the exact triple `(s, p, o)` exists.
    pub fn contains(&self, subject: TermId, predicate: TermId, object: TermId) -> bool {
        self.triples_from(subject)
            .iter()
            .any(|t| t.predicate == predicate && t.object == object)
    }

    /// All objects for a given subject and predicate.
    pub fn objects_of(&self, subject: TermId, predicate: TermId) -> Vec<TermId> {
        let graph = self.graph.read().expect("graph lock poisoned");
        let subj_idx = match self.node_index.get(&subject) {
            Some(idx) => *idx.value(),
            None => return vec![],
        };

        graph
            .edges_directed(subj_idx, Direction::Outgoing)
            .filter(|e| *e.weight() == predicate)
            .filter_map(|e| graph.node_weight(e.target()).copied())
            .collect()
    }

    /// All subjects for a given predicate and object.
    pub fn subjects_of(&self, predicate: TermId, object: TermId) -> Vec<TermId> {
        let graph = self.graph.read().expect("graph lock poisoned");
        let obj_idx = match self.node_index.get(&object) {
            Some(idx) => *idx.value(),
            None => return vec![],
        };

        graph
            .edges_directed(obj_idx, Direction::Incoming)
            .filter(|e| *e.weight() == predicate)
            .filter_map(|e| graph.node_weight(e.source()).copied())
            .collect()
    }

    /// All triples where the given term appears as subject.
    pub fn triples_from(&self, subject: TermId) -> Vec<Triple> {
        let graph = self.graph.read().expect("graph lock poisoned");
        let subj_idx = match self.node_index.get(&subject) {
            Some(idx) => *idx.value(),
            None => return vec![],
        };

        graph
            .edges_directed(subj_idx, Direction::Outgoing)
            .filter_map(|e| {
                let object = *graph.node_weight(e.target())?;
                Some(Triple::new(subject, *e.weight(), object))
            })
            .collect()
    }

    /// All triples where the given term appears as object (incoming edges).
    pub fn triples_to(&self, object: TermId) -> Vec<Triple> {
        let graph = self.graph.read().expect("graph lock poisoned");
        let obj_idx = match self.node_index.get(&object) {
            Some(idx) => *idx.value(),
            None => return vec![],
        };

        graph
            .edges_directed(obj_idx, Direction::Incoming)
            .filter_map(|e| {
                let subject = *graph.node_weight(e.source())?;
                Some(Triple::new(subject, *e.weight(), object))
            })
            .collect()
    }

    /// All triples carrying the given predicate.
    fn triples_for_predicate(&self, predicate: TermId) -> Vec<Triple> {
        self.predicate_index
            .get(&predicate)
            .map(|pairs| {
                pairs
                    .value()
                    .iter()
                    .map(|&(s, o)| Triple::new(s, predicate, o))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All triples in the store.
    pub fn all_triples(&self) -> Vec<Triple> {
        let graph = self.graph.read().expect("graph lock poisoned");
        graph
            .edge_indices()
            .filter_map(|ei| {
                let (src, dst) = graph.edge_endpoints(ei)?;
                let subject = *graph.node_weight(src)?;
                let object = *graph.node_weight(dst)?;
                let predicate = *graph.edge_weight(ei)?;
                Some(Triple::new(subject, predicate, object))
            })
            .collect()
    }

    /// Global degree: the number of triples in which the term appears as
    /// subject or object.
    ///
    /// Each triple instance counts, so a self-loop contributes 2 (once per
    /// role) and parallel edges contribute once each. Recomputed on every
    /// call, never cached.
    pub fn degree(&self, term: TermId) -> usize {
        let graph = self.graph.read().expect("graph lock poisoned");
        let idx = match self.node_index.get(&term) {
            Some(idx) => *idx.value(),
            None => return 0,
        };

        graph.edges_directed(idx, Direction::Outgoing).count()
            + graph.edges_directed(idx, Direction::Incoming).count()
    }

    /// Number of distinct terms appearing as subject or object.
    pub fn node_count(&self) -> usize {
        self.node_index.len()
    }

    /// Number of triples.
    pub fn triple_count(&self) -> usize {
        self.triple_count.load(Ordering::Relaxed)
    }
}

impl Default for TripleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TripleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TripleStore")
            .field("nodes", &self.node_count())
            .field("triples", &self.triple_count())
            .finish()
    }
}
