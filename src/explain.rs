//! Rule-based relationship explanations.
//!
//! A small closed taxonomy of predicates maps to sentence templates. The
//! synthesizer looks at the relations connecting two concepts and renders
//! the first one it recognizes; everything else falls through to a fixed
//! sentinel sentence.

use crate::ontology::Ontology;
use crate::term::TermId;

/// Returned when no known relation connects two concepts in either
/// direction. Callers filter on this exact string.
pub const NO_DIRECT_RELATIONSHIP: &str = "No direct relationship found.";

/// The closed set of predicates with explanation templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    SubClassOf,
    HasSymptom,
    TreatedBy,
    Treats,
    /// Any other predicate; has no template and is skipped when scanning.
    Other,
}

impl RelationKind {
    /// Classify a predicate by the local name of its IRI.
    ///
    /// Matching on the local name makes the ontology-namespace spelling and
    /// `rdfs:subClassOf` equivalent.
    pub fn classify(ontology: &Ontology, predicate: TermId) -> Self {
        match ontology.local_name(predicate).as_str() {
            "subClassOf" => Self::SubClassOf,
            "hasSymptom" => Self::HasSymptom,
            "treatedBy" => Self::TreatedBy,
            "treats" => Self::Treats,
            _ => Self::Other,
        }
    }
}

/// Template explanation of how `a` and `b` relate.
///
/// Relations are scanned in store order, `a`-as-subject first, then
/// `b`-as-subject; the first relation of a known kind produces the sentence.
/// `hasSymptom`, `treatedBy` and `treats` phrase the sentence from the
/// argument roles (`b` relative to `a`) whichever direction the matched
/// triple points; only `subClassOf` consults the triple's direction.
pub fn explain(ontology: &Ontology, a: TermId, b: TermId) -> String {
    let store = ontology.store();
    let mut relations = store.matching(Some(a), None, Some(b));
    relations.extend(store.matching(Some(b), None, Some(a)));

    let name_a = ontology.local_name(a);
    let name_b = ontology.local_name(b);

    for relation in relations {
        let sentence = match RelationKind::classify(ontology, relation.predicate) {
            RelationKind::SubClassOf => {
                if store.contains(a, relation.predicate, b) {
                    format!("{name_a} is a subclass of {name_b}.")
                } else {
                    format!("{name_b} is a subclass of {name_a}.")
                }
            }
            RelationKind::HasSymptom => format!("{name_b} is a symptom of {name_a}."),
            RelationKind::TreatedBy => format!("{name_b} is a treatment for {name_a}."),
            RelationKind::Treats => format!("{name_b} treats {name_a}."),
            RelationKind::Other => continue,
        };
        return sentence;
    }

    NO_DIRECT_RELATIONSHIP.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::DEFAULT_NAMESPACE;
    use crate::term::iri;

    fn empty() -> Ontology {
        Ontology::new(DEFAULT_NAMESPACE)
    }

    #[test]
    fn no_relation_yields_sentinel() {
        let onto = empty();
        let a = onto.declare_concept("Diabetes");
        let b = onto.declare_concept("Headache");
        assert_eq!(explain(&onto, a, b), NO_DIRECT_RELATIONSHIP);
    }

    #[test]
    fn unknown_predicates_yield_sentinel() {
        let onto = empty();
        let a = onto.declare_concept("Diabetes");
        let b = onto.declare_concept("Obesity");
        let related_to = onto.predicate("relatedTo");
        onto.insert(a, related_to, b);
        onto.insert(b, related_to, a);
        assert_eq!(explain(&onto, a, b), NO_DIRECT_RELATIONSHIP);
    }

    #[test]
    fn symptom_template() {
        let onto = empty();
        let diabetes = onto.declare_concept("Diabetes");
        let thirst = onto.declare_concept("Thirst");
        onto.insert(diabetes, onto.predicate("hasSymptom"), thirst);

        assert_eq!(
            explain(&onto, diabetes, thirst),
            "Thirst is a symptom of Diabetes."
        );
    }

    #[test]
    fn symptom_template_uses_argument_roles() {
        let onto = empty();
        let diabetes = onto.declare_concept("Diabetes");
        let thirst = onto.declare_concept("Thirst");
        onto.insert(diabetes, onto.predicate("hasSymptom"), thirst);

        // Swapping the arguments swaps the roles in the sentence even though
        // the stored triple still points the same way.
        assert_eq!(
            explain(&onto, thirst, diabetes),
            "Diabetes is a symptom of Thirst."
        );
    }

    #[test]
    fn treated_by_template() {
        let onto = empty();
        let diabetes = onto.declare_concept("Diabetes");
        let insulin = onto.declare_concept("Insulin");
        onto.insert(diabetes, onto.predicate("treatedBy"), insulin);

        assert_eq!(
            explain(&onto, diabetes, insulin),
            "Insulin is a treatment for Diabetes."
        );
    }

    #[test]
    fn treats_template() {
        let onto = empty();
        let diabetes = onto.declare_concept("Diabetes");
        let insulin = onto.declare_concept("Insulin");
        onto.insert(insulin, onto.predicate("treats"), diabetes);

        assert_eq!(explain(&onto, diabetes, insulin), "Insulin treats Diabetes.");
    }

    #[test]
    fn subclass_checks_direction() {
        let onto = empty();
        let diabetes = onto.declare_concept("Diabetes");
        let type1 = onto.declare_concept("Type1Diabetes");
        onto.insert(type1, onto.predicate("subClassOf"), diabetes);

        assert_eq!(
            explain(&onto, type1, diabetes),
            "Type1Diabetes is a subclass of Diabetes."
        );
        assert_eq!(
            explain(&onto, diabetes, type1),
            "Type1Diabetes is a subclass of Diabetes."
        );
    }

    #[test]
    fn rdfs_subclass_spelling_classifies() {
        let onto = empty();
        let diabetes = onto.declare_concept("Diabetes");
        let type1 = onto.declare_concept("Type1Diabetes");
        let rdfs_sub = onto.intern(iri::RDFS_SUB_CLASS_OF);
        onto.insert(type1, rdfs_sub, diabetes);

        assert_eq!(
            RelationKind::classify(&onto, rdfs_sub),
            RelationKind::SubClassOf
        );
        assert_eq!(
            explain(&onto, type1, diabetes),
            "Type1Diabetes is a subclass of Diabetes."
        );
    }

    #[test]
    fn known_kind_wins_over_unknown_in_any_order() {
        let onto = empty();
        let a = onto.declare_concept("Diabetes");
        let b = onto.declare_concept("Thirst");
        onto.insert(a, onto.predicate("relatedTo"), b);
        onto.insert(a, onto.predicate("hasSymptom"), b);
        assert_eq!(explain(&onto, a, b), "Thirst is a symptom of Diabetes.");

        let onto = empty();
        let a = onto.declare_concept("Diabetes");
        let b = onto.declare_concept("Thirst");
        onto.insert(a, onto.predicate("hasSymptom"), b);
        onto.insert(a, onto.predicate("relatedTo"), b);
        assert_eq!(explain(&onto, a, b), "Thirst is a symptom of Diabetes.");
    }

    #[test]
    fn result_is_stable() {
        let onto = empty();
        let a = onto.declare_concept("Diabetes");
        let b = onto.declare_concept("Insulin");
        onto.insert(a, onto.predicate("treatedBy"), b);
        onto.insert(b, onto.predicate("treats"), a);

        let first = explain(&onto, a, b);
        assert!(
            first == "Insulin is a treatment for Diabetes." || first == "Insulin treats Diabetes."
        );
        assert_eq!(explain(&onto, a, b), first);
    }

    #[test]
    fn classification_by_local_name() {
        let onto = empty();
        assert_eq!(
            RelationKind::classify(&onto, onto.predicate("subClassOf")),
            RelationKind::SubClassOf
        );
        assert_eq!(
            RelationKind::classify(&onto, onto.predicate("hasSymptom")),
            RelationKind::HasSymptom
        );
        assert_eq!(
            RelationKind::classify(&onto, onto.predicate("treatedBy")),
            RelationKind::TreatedBy
        );
        assert_eq!(
            RelationKind::classify(&onto, onto.predicate("treats")),
            RelationKind::Treats
        );
        assert_eq!(
            RelationKind::classify(&onto, onto.predicate("somethingElse")),
            RelationKind::Other
        );
    }
}
