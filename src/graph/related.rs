//! Neighborhood queries over the triple store.

use std::collections::HashSet;

use crate::term::TermId;

use super::store::TripleStore;

/// Concepts related to `concept`, looking both directions.
///
/// With a bound `predicate` only triples carrying that predicate count, and
/// the concept itself may appear in the result if it has a matching
/// self-loop. With `None` every predicate counts but the concept itself is
/// filtered out.
///
/// The result is duplicate-free, ordered by first appearance: outgoing
/// matches first, then incoming.
pub fn related_concepts(
    store: &TripleStore,
    concept: TermId,
    predicate: Option<TermId>,
) -> Vec<TermId> {
    let mut seen = HashSet::new();
    let mut related = Vec::new();

    let candidates: Vec<TermId> = match predicate {
        Some(p) => store
            .objects_of(concept, p)
            .into_iter()
            .chain(store.subjects_of(p, concept))
            .collect(),
        None => store
            .triples_from(concept)
            .into_iter()
            .map(|t| t.object)
            .chain(store.triples_to(concept).into_iter().map(|t| t.subject))
            .filter(|&other| other != concept)
            .collect(),
    };

    for candidate in candidates {
        if seen.insert(candidate) {
            related.push(candidate);
        }
    }

    related
}
