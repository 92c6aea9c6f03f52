//! # panakeia
//!
//! An ontology-backed recommendation engine for medical concepts. Loads a
//! Turtle ontology into an in-memory labeled multigraph, maps free text onto
//! declared concepts, and ranks and explains the concepts related to them,
//! with an OpenAI-compatible chat service rewriting the explanations as
//! patient-friendly prose.
//!
//! ## Architecture
//!
//! - **Terms** (`term`): interned IRIs and literals behind copyable ids
//! - **Graph** (`graph`): petgraph-backed triple store with pattern matching,
//!   neighborhood queries, and degree ranking
//! - **Ontology** (`ontology`): Turtle loading, namespace handling, concept
//!   declarations, label resolution
//! - **Explanations** (`explain`): templated relationship sentences
//! - **Collaborator** (`llm`): blocking chat-completion client behind the
//!   classifier and enhancer traits
//! - **Recommendations** (`recommend`): aggregate → rank → explain → enhance
//!
//! ## Library usage
//!
//! ```no_run
//! use panakeia::graph::rank::rank_by_degree;
//! use panakeia::graph::related::related_concepts;
//! use panakeia::ontology::Ontology;
//!
//! let onto = Ontology::bundled_demo();
//! let diabetes = onto.resolve_concept("Diabetes").unwrap();
//! let related = related_concepts(onto.store(), diabetes, None);
//! for concept in rank_by_degree(onto.store(), related) {
//!     println!("{}", onto.local_name(concept));
//! }
//! ```

pub mod error;
pub mod explain;
pub mod graph;
pub mod llm;
pub mod ontology;
pub mod recommend;
pub mod repl;
pub mod term;
