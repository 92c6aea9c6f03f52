//! Degree-based ranking of concepts.

use crate::term::TermId;

use super::store::TripleStore;

/// Order concepts by global degree, highest first.
///
/// The result is a permutation of the input: nothing is dropped, not even
/// concepts absent from the store (their degree is 0). Ties keep the input
/// order. Degrees are read from the store at call time, never cached.
pub fn rank_by_degree(store: &TripleStore, concepts: Vec<TermId>) -> Vec<TermId> {
    let mut scored: Vec<(TermId, usize)> = concepts
        .into_iter()
        .map(|concept| (concept, store.degree(concept)))
        .collect();

    // sort_by is stable, so equal degrees retain input order
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    scored.into_iter().map(|(concept, _)| concept).collect()
}
