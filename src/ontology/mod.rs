//! Ontology facade: namespace handling, concept declaration, and label
//! resolution over the triple store.
//!
//! An [`Ontology`] owns the term interner, the relation store, and the set
//! of declared concepts. Typing assertions (`rdf:type owl:Class`) mark a
//! term as a concept but are not relations themselves; everything else a
//! document states, including literal annotations, lands in the store.

pub mod turtle;

use std::path::Path;
use std::sync::RwLock;

use crate::error::OntologyError;
use crate::graph::Triple;
use crate::graph::store::TripleStore;
use crate::term::{TermId, TermInterner, iri};

use turtle::{TurtleDocument, TurtleTerm};

/// Namespace of the bundled demo ontology, and the fallback when a loaded
/// document declares no default prefix.
pub const DEFAULT_NAMESPACE: &str = "http://example.org/medical_ontology#";

// ── Bundled demo ontology ───────────────────────────────────────────────

const DEMO_ONTOLOGY: &str = include_str!("../../data/ontology.owl");

/// The knowledge graph plus its namespace and declared-concept set.
///
/// Built once, then treated as read-only by every query path. The
/// `declare_concept`/`predicate`/`insert` builders exist for programmatic
/// construction (tests, embedding callers); file loading goes through
/// [`Ontology::from_turtle_path`].
pub struct Ontology {
    terms: TermInterner,
    store: TripleStore,
    /// Declared concepts in declaration order, no duplicates.
    concepts: RwLock<Vec<TermId>>,
    namespace: String,
}

impl Ontology {
    /// Create an empty ontology with the given namespace.
    pub fn new(namespace: &str) -> Self {
        Self {
            terms: TermInterner::new(),
            store: TripleStore::new(),
            concepts: RwLock::new(Vec::new()),
            namespace: namespace.to_string(),
        }
    }

    /// Load the demo ontology bundled into the binary.
    pub fn bundled_demo() -> Self {
        let doc = turtle::parse(DEMO_ONTOLOGY).expect("bundled demo ontology parses");
        let ontology = Self::from_document(doc, None);
        tracing::debug!(
            triples = ontology.store.triple_count(),
            "bundled demo ontology loaded"
        );
        ontology
    }

    /// Parse a Turtle document from a string.
    ///
    /// An explicit `namespace` wins; otherwise the document's default prefix
    /// (`@prefix : <…>`) is used, falling back to [`DEFAULT_NAMESPACE`].
    pub fn from_turtle_str(source: &str, namespace: Option<&str>) -> Result<Self, OntologyError> {
        let doc = turtle::parse(source)?;
        Ok(Self::from_document(doc, namespace))
    }

    /// Read and parse a Turtle ontology file.
    pub fn from_turtle_path(path: &Path, namespace: Option<&str>) -> Result<Self, OntologyError> {
        let source = std::fs::read_to_string(path).map_err(|source| OntologyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let ontology = Self::from_turtle_str(&source, namespace)?;
        tracing::info!(
            path = %path.display(),
            triples = ontology.store.triple_count(),
            concepts = ontology.concept_count(),
            "ontology loaded"
        );
        Ok(ontology)
    }

    fn from_document(doc: TurtleDocument, namespace: Option<&str>) -> Self {
        let namespace = namespace
            .map(str::to_string)
            .or_else(|| doc.prefixes.get("").cloned())
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

        let ontology = Self::new(&namespace);
        for (subject, predicate, object) in doc.triples {
            // `x a owl:Class` declares a concept; it is not a relation.
            if predicate == iri::RDF_TYPE && object == TurtleTerm::Iri(iri::OWL_CLASS.into()) {
                let concept = ontology.terms.get_or_intern(&subject);
                ontology.push_concept(concept);
                continue;
            }
            let s = ontology.terms.get_or_intern(&subject);
            let p = ontology.terms.get_or_intern(&predicate);
            // Literals are interned by lexical form; they participate in
            // degree like any other node.
            let o = match object {
                TurtleTerm::Iri(iri) => ontology.terms.get_or_intern(&iri),
                TurtleTerm::Literal(lexical) => ontology.terms.get_or_intern(&lexical),
            };
            ontology.store.insert(Triple::new(s, p, o));
        }
        ontology
    }

    fn push_concept(&self, concept: TermId) {
        let mut concepts = self.concepts.write().expect("concept list lock poisoned");
        if !concepts.contains(&concept) {
            concepts.push(concept);
        }
    }

    /// Declare a concept by local name. Idempotent.
    pub fn declare_concept(&self, local_name: &str) -> TermId {
        let concept = self
            .terms
            .get_or_intern(&format!("{}{}", self.namespace, local_name));
        self.push_concept(concept);
        concept
    }

    /// Intern a predicate by local name, without asserting anything.
    pub fn predicate(&self, local_name: &str) -> TermId {
        self.terms
            .get_or_intern(&format!("{}{}", self.namespace, local_name))
    }

    /// Intern a full IRI (or literal lexical form) outside the namespace.
    pub fn intern(&self, iri: &str) -> TermId {
        self.terms.get_or_intern(iri)
    }

    /// Insert a relation between already-interned terms.
    pub fn insert(&self, subject: TermId, predicate: TermId, object: TermId) {
        self.store.insert(Triple::new(subject, predicate, object));
    }

    /// The underlying triple store.
    pub fn store(&self) -> &TripleStore {
        &self.store
    }

    /// The ontology namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Look up an already-interned term by IRI.
    pub fn term(&self, iri: &str) -> Option<TermId> {
        self.terms.get(iri)
    }

    /// The IRI (or literal lexical form) behind a term.
    pub fn iri(&self, term: TermId) -> String {
        self.terms.resolve_iri(term)
    }

    /// The display label of a term: the IRI with the ontology namespace
    /// stripped, else the fragment after the last `#` or `/`, else the raw
    /// form (literals).
    pub fn local_name(&self, term: TermId) -> String {
        let iri = self.terms.resolve_iri(term);
        match iri.strip_prefix(&self.namespace) {
            Some(local) => local.to_string(),
            None => match iri.rsplit_once(['#', '/']) {
                Some((_, fragment)) => fragment.to_string(),
                None => iri,
            },
        }
    }

    /// Whether the term is a declared concept.
    pub fn is_concept(&self, term: TermId) -> bool {
        self.concepts
            .read()
            .expect("concept list lock poisoned")
            .contains(&term)
    }

    /// All declared concepts, declaration order.
    pub fn concepts(&self) -> Vec<TermId> {
        self.concepts
            .read()
            .expect("concept list lock poisoned")
            .clone()
    }

    /// Number of declared concepts.
    pub fn concept_count(&self) -> usize {
        self.concepts
            .read()
            .expect("concept list lock poisoned")
            .len()
    }

    /// Display labels of all declared concepts, same order as [`concepts`].
    ///
    /// [`concepts`]: Ontology::concepts
    pub fn concept_labels(&self) -> Vec<String> {
        self.concepts()
            .into_iter()
            .map(|concept| self.local_name(concept))
            .collect()
    }

    /// Resolve a label to a declared concept.
    ///
    /// Exact match against `namespace + label` first; otherwise the first
    /// declared concept whose local name matches case-insensitively, in
    /// declaration order.
    pub fn resolve_concept(&self, label: &str) -> Option<TermId> {
        let exact_iri = format!("{}{}", self.namespace, label);
        if let Some(term) = self.terms.get(&exact_iri) {
            if self.is_concept(term) {
                return Some(term);
            }
        }

        let wanted = label.to_lowercase();
        self.concepts()
            .into_iter()
            .find(|&concept| self.local_name(concept).to_lowercase() == wanted)
    }

    /// Summary counts for display.
    pub fn info(&self) -> OntologyInfo {
        OntologyInfo {
            namespace: self.namespace.clone(),
            term_count: self.terms.len(),
            node_count: self.store.node_count(),
            triple_count: self.store.triple_count(),
            concept_count: self.concept_count(),
        }
    }
}

impl std::fmt::Debug for Ontology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ontology")
            .field("namespace", &self.namespace)
            .field("terms", &self.terms.len())
            .field("triples", &self.store.triple_count())
            .field("concepts", &self.concept_count())
            .finish()
    }
}

/// Snapshot of ontology-wide counts.
#[derive(Debug, Clone)]
pub struct OntologyInfo {
    pub namespace: String,
    pub term_count: usize,
    pub node_count: usize,
    pub triple_count: usize,
    pub concept_count: usize,
}

impl std::fmt::Display for OntologyInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "panakeia ontology info")?;
        writeln!(f, "  namespace:  {}", self.namespace)?;
        writeln!(f, "  terms:      {}", self.term_count)?;
        writeln!(f, "  nodes:      {}", self.node_count)?;
        writeln!(f, "  triples:    {}", self.triple_count)?;
        writeln!(f, "  concepts:   {}", self.concept_count)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Ontology {
        let onto = Ontology::new(DEFAULT_NAMESPACE);
        let diabetes = onto.declare_concept("Diabetes");
        let thirst = onto.declare_concept("Thirst");
        let insulin = onto.declare_concept("Insulin");
        let has_symptom = onto.predicate("hasSymptom");
        let treated_by = onto.predicate("treatedBy");
        let treats = onto.predicate("treats");
        onto.insert(diabetes, has_symptom, thirst);
        onto.insert(diabetes, treated_by, insulin);
        onto.insert(insulin, treats, diabetes);
        onto
    }

    #[test]
    fn exact_label_resolution() {
        let onto = sample();
        let resolved = onto.resolve_concept("Diabetes").unwrap();
        assert_eq!(onto.local_name(resolved), "Diabetes");
        assert!(onto.is_concept(resolved));
    }

    #[test]
    fn case_insensitive_fallback() {
        let onto = sample();
        let exact = onto.resolve_concept("Insulin").unwrap();
        assert_eq!(onto.resolve_concept("insulin"), Some(exact));
        assert_eq!(onto.resolve_concept("INSULIN"), Some(exact));
    }

    #[test]
    fn non_concept_terms_do_not_resolve() {
        let onto = sample();
        // hasSymptom is interned under the namespace but never declared.
        assert_eq!(onto.resolve_concept("hasSymptom"), None);
        assert_eq!(onto.resolve_concept("Nonexistent"), None);
    }

    #[test]
    fn declaration_is_idempotent_and_not_a_relation() {
        let onto = Ontology::new(DEFAULT_NAMESPACE);
        let first = onto.declare_concept("Diabetes");
        let second = onto.declare_concept("Diabetes");
        assert_eq!(first, second);
        assert_eq!(onto.concepts(), vec![first]);
        // Declaring adds no triples; the concept starts with degree 0.
        assert_eq!(onto.store().triple_count(), 0);
        assert_eq!(onto.store().degree(first), 0);
    }

    #[test]
    fn local_names() {
        let onto = sample();
        let diabetes = onto.resolve_concept("Diabetes").unwrap();
        assert_eq!(onto.local_name(diabetes), "Diabetes");

        let foreign = onto.intern("http://www.w3.org/2002/07/owl#Class");
        assert_eq!(onto.local_name(foreign), "Class");

        let literal = onto.intern("just a literal");
        assert_eq!(onto.local_name(literal), "just a literal");
    }

    #[test]
    fn loads_turtle_with_inferred_namespace() {
        let onto = Ontology::from_turtle_str(
            concat!(
                "@prefix : <http://example.org/medical_ontology#> .\n",
                "@prefix owl: <http://www.w3.org/2002/07/owl#> .\n",
                ":Diabetes a owl:Class ;\n",
                "    :hasSymptom :Thirst .\n",
                ":Thirst a owl:Class .\n",
            ),
            None,
        )
        .unwrap();

        assert_eq!(onto.namespace(), "http://example.org/medical_ontology#");
        assert_eq!(onto.concept_labels(), vec!["Diabetes", "Thirst"]);

        let diabetes = onto.resolve_concept("Diabetes").unwrap();
        let thirst = onto.resolve_concept("Thirst").unwrap();
        let has_symptom = onto
            .term("http://example.org/medical_ontology#hasSymptom")
            .unwrap();
        assert!(onto.store().contains(diabetes, has_symptom, thirst));
        // The typing assertions are declarations, not relations.
        assert_eq!(onto.store().triple_count(), 1);
    }

    #[test]
    fn explicit_namespace_overrides_document_prefix() {
        let onto = Ontology::from_turtle_str(
            concat!(
                "@prefix : <http://example.org/other#> .\n",
                "@prefix owl: <http://www.w3.org/2002/07/owl#> .\n",
                ":Diabetes a owl:Class .\n",
            ),
            Some("http://example.org/medical_ontology#"),
        )
        .unwrap();

        assert_eq!(onto.namespace(), "http://example.org/medical_ontology#");
        // The concept lives in the document namespace, so exact resolution
        // fails and the case-insensitive scan still finds it by local name.
        let resolved = onto.resolve_concept("diabetes").unwrap();
        assert_eq!(onto.iri(resolved), "http://example.org/other#Diabetes");
    }

    #[test]
    fn literal_annotations_count_toward_degree() {
        let onto = Ontology::from_turtle_str(
            concat!(
                "@prefix : <http://example.org/x#> .\n",
                "@prefix owl: <http://www.w3.org/2002/07/owl#> .\n",
                "@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .\n",
                ":A a owl:Class ;\n",
                "    rdfs:label \"A label\" .\n",
            ),
            None,
        )
        .unwrap();

        let a = onto.resolve_concept("A").unwrap();
        // The label annotation is an ordinary stored triple.
        assert_eq!(onto.store().degree(a), 1);
    }

    #[test]
    fn bundled_demo_loads() {
        let onto = Ontology::bundled_demo();
        assert_eq!(onto.namespace(), DEFAULT_NAMESPACE);
        assert_eq!(onto.concept_count(), 12);
        assert!(onto.store().triple_count() > 20);
        assert!(onto.resolve_concept("Diabetes").is_some());
        assert!(onto.resolve_concept("insulin").is_some());
        assert!(onto.resolve_concept("Type1Diabetes").is_some());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err =
            Ontology::from_turtle_path(Path::new("/nonexistent/panakeia.owl"), None).unwrap_err();
        assert!(matches!(err, OntologyError::Io { .. }));
    }

    #[test]
    fn info_counts() {
        let onto = sample();
        let info = onto.info();
        assert_eq!(info.concept_count, 3);
        assert_eq!(info.triple_count, 3);
        let rendered = info.to_string();
        assert!(rendered.contains("concepts:   3"));
    }
}
