//! Recommendation orchestration: aggregate, rank, explain, enhance.
//!
//! The [`Recommender`] is an explicit context object wiring the ontology to
//! the collaborator traits. It owns no state of its own and holds no
//! module-level globals.

use crate::error::RecommendError;
use crate::explain::{self, NO_DIRECT_RELATIONSHIP};
use crate::graph::rank::rank_by_degree;
use crate::graph::related::related_concepts;
use crate::llm::{ConceptClassifier, ExplanationEnhancer};
use crate::ontology::Ontology;
use crate::term::TermId;

/// One ranked recommendation: a related concept's label and its explanation
/// prose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub label: String,
    pub explanation: String,
}

/// Composes the graph pipeline with the collaborator.
pub struct Recommender<'a> {
    ontology: &'a Ontology,
    classifier: &'a dyn ConceptClassifier,
    enhancer: &'a dyn ExplanationEnhancer,
}

impl<'a> Recommender<'a> {
    pub fn new(
        ontology: &'a Ontology,
        classifier: &'a dyn ConceptClassifier,
        enhancer: &'a dyn ExplanationEnhancer,
    ) -> Self {
        Self {
            ontology,
            classifier,
            enhancer,
        }
    }

    /// Route free text through the classifier, then resolve its answer.
    ///
    /// `Ok(None)` when the classifier matches nothing or its answer does not
    /// resolve to a declared concept; the caller routes that to
    /// unknown-concept handling.
    pub fn resolve_input(&self, text: &str) -> Result<Option<TermId>, RecommendError> {
        let labels = self.ontology.concept_labels();
        let reply = self
            .classifier
            .classify(text, &labels)
            .map_err(|source| RecommendError::Classify { source })?;
        Ok(reply.and_then(|label| self.ontology.resolve_concept(&label)))
    }

    /// Ranked recommendations for a resolved concept.
    ///
    /// Aggregates neighbors over every predicate, ranks them by global
    /// degree, and enhances each candidate's templated explanation with one
    /// sequential collaborator call. Candidates whose explanation is the
    /// "no direct relationship" sentinel are dropped, never emitted.
    pub fn recommend(&self, concept: TermId) -> Result<Vec<Recommendation>, RecommendError> {
        let store = self.ontology.store();
        let related = related_concepts(store, concept, None);
        let ranked = rank_by_degree(store, related);

        let concept_label = self.ontology.local_name(concept);
        tracing::debug!(
            concept = %concept_label,
            candidates = ranked.len(),
            "recommending"
        );

        let mut recommendations = Vec::new();
        for candidate in ranked {
            let basic = explain::explain(self.ontology, concept, candidate);
            if basic == NO_DIRECT_RELATIONSHIP {
                continue;
            }
            let candidate_label = self.ontology.local_name(candidate);
            let prose = self
                .enhancer
                .enhance(&concept_label, &candidate_label, &basic)
                .map_err(|source| RecommendError::Enhance {
                    related: candidate_label.clone(),
                    source,
                })?;
            recommendations.push(Recommendation {
                label: candidate_label,
                explanation: prose,
            });
        }
        Ok(recommendations)
    }

    /// Resolve a label directly, bypassing the classifier, then recommend.
    pub fn recommend_label(&self, label: &str) -> Result<Vec<Recommendation>, RecommendError> {
        let concept =
            self.ontology
                .resolve_concept(label)
                .ok_or_else(|| RecommendError::UnknownConcept {
                    label: label.to_string(),
                })?;
        self.recommend(concept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use crate::ontology::DEFAULT_NAMESPACE;
    use std::cell::RefCell;

    /// Classifier that always answers with a fixed label (or nothing).
    struct FixedClassifier(Option<&'static str>);

    impl ConceptClassifier for FixedClassifier {
        fn classify(&self, _text: &str, _labels: &[String]) -> Result<Option<String>, LlmError> {
            Ok(self.0.map(str::to_string))
        }
    }

    struct FailingClassifier;

    impl ConceptClassifier for FailingClassifier {
        fn classify(&self, _text: &str, _labels: &[String]) -> Result<Option<String>, LlmError> {
            Err(LlmError::RequestFailed {
                message: "connection refused".into(),
            })
        }
    }

    /// Enhancer that prefixes the basic sentence and records its calls.
    struct EchoEnhancer {
        calls: RefCell<Vec<String>>,
    }

    impl EchoEnhancer {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl ExplanationEnhancer for EchoEnhancer {
        fn enhance(&self, _concept: &str, related: &str, basic: &str) -> Result<String, LlmError> {
            self.calls.borrow_mut().push(related.to_string());
            Ok(format!("enhanced: {basic}"))
        }
    }

    struct FailingEnhancer;

    impl ExplanationEnhancer for FailingEnhancer {
        fn enhance(&self, _concept: &str, _related: &str, _basic: &str) -> Result<String, LlmError> {
            Err(LlmError::RequestFailed {
                message: "connection refused".into(),
            })
        }
    }

    /// Diabetes / Thirst / Insulin fixture.
    fn scenario() -> Ontology {
        let onto = Ontology::new(DEFAULT_NAMESPACE);
        let diabetes = onto.declare_concept("Diabetes");
        let thirst = onto.declare_concept("Thirst");
        let insulin = onto.declare_concept("Insulin");
        onto.insert(diabetes, onto.predicate("hasSymptom"), thirst);
        onto.insert(diabetes, onto.predicate("treatedBy"), insulin);
        onto.insert(insulin, onto.predicate("treats"), diabetes);
        onto
    }

    #[test]
    fn recommends_in_degree_order_with_enhanced_prose() {
        let onto = scenario();
        let enhancer = EchoEnhancer::new();
        let recommender = Recommender::new(&onto, &FixedClassifier(None), &enhancer);

        let diabetes = onto.resolve_concept("Diabetes").unwrap();
        let recs = recommender.recommend(diabetes).unwrap();

        // Insulin touches two relations, Thirst one.
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].label, "Insulin");
        assert_eq!(recs[1].label, "Thirst");
        assert_eq!(recs[1].explanation, "enhanced: Thirst is a symptom of Diabetes.");
        assert!(recs[0].explanation.starts_with("enhanced: Insulin"));

        assert_eq!(*enhancer.calls.borrow(), vec!["Insulin", "Thirst"]);
    }

    #[test]
    fn sentinel_candidates_are_dropped_without_enhancement() {
        let onto = scenario();
        // Obesity is connected only through a predicate with no template.
        let diabetes = onto.resolve_concept("Diabetes").unwrap();
        let obesity = onto.declare_concept("Obesity");
        onto.insert(diabetes, onto.predicate("associatedWith"), obesity);

        let enhancer = EchoEnhancer::new();
        let recommender = Recommender::new(&onto, &FixedClassifier(None), &enhancer);
        let recs = recommender.recommend(diabetes).unwrap();

        assert!(recs.iter().all(|r| r.label != "Obesity"));
        assert!(!enhancer.calls.borrow().contains(&"Obesity".to_string()));
    }

    #[test]
    fn empty_neighborhood_is_an_empty_result() {
        let onto = scenario();
        let lonely = onto.declare_concept("Lonely");
        let enhancer = EchoEnhancer::new();
        let recommender = Recommender::new(&onto, &FixedClassifier(None), &enhancer);

        let recs = recommender.recommend(lonely).unwrap();
        assert!(recs.is_empty());
        assert!(enhancer.calls.borrow().is_empty());
    }

    #[test]
    fn resolve_input_goes_through_the_classifier() {
        let onto = scenario();
        let enhancer = EchoEnhancer::new();
        let recommender = Recommender::new(&onto, &FixedClassifier(Some("diabetes")), &enhancer);

        let resolved = recommender.resolve_input("my blood sugar is high").unwrap();
        assert_eq!(resolved, onto.resolve_concept("Diabetes"));
    }

    #[test]
    fn classifier_none_resolves_to_nothing() {
        let onto = scenario();
        let enhancer = EchoEnhancer::new();
        let recommender = Recommender::new(&onto, &FixedClassifier(None), &enhancer);

        assert_eq!(recommender.resolve_input("the weather").unwrap(), None);
    }

    #[test]
    fn unresolvable_classifier_answer_resolves_to_nothing() {
        let onto = scenario();
        let enhancer = EchoEnhancer::new();
        let recommender = Recommender::new(&onto, &FixedClassifier(Some("Astronomy")), &enhancer);

        assert_eq!(recommender.resolve_input("stars").unwrap(), None);
    }

    #[test]
    fn classifier_failure_propagates() {
        let onto = scenario();
        let enhancer = EchoEnhancer::new();
        let recommender = Recommender::new(&onto, &FailingClassifier, &enhancer);

        let err = recommender.resolve_input("anything").unwrap_err();
        assert!(matches!(err, RecommendError::Classify { .. }));
    }

    #[test]
    fn enhancer_failure_aborts_recommendation() {
        let onto = scenario();
        let recommender = Recommender::new(&onto, &FixedClassifier(None), &FailingEnhancer);

        let diabetes = onto.resolve_concept("Diabetes").unwrap();
        let err = recommender.recommend(diabetes).unwrap_err();
        assert!(matches!(err, RecommendError::Enhance { .. }));
    }

    #[test]
    fn unknown_label_is_an_error() {
        let onto = scenario();
        let enhancer = EchoEnhancer::new();
        let recommender = Recommender::new(&onto, &FixedClassifier(None), &enhancer);

        let err = recommender.recommend_label("Astronomy").unwrap_err();
        match err {
            RecommendError::UnknownConcept { label } => assert_eq!(label, "Astronomy"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn recommend_label_resolves_case_insensitively() {
        let onto = scenario();
        let enhancer = EchoEnhancer::new();
        let recommender = Recommender::new(&onto, &FixedClassifier(None), &enhancer);

        let recs = recommender.recommend_label("diabetes").unwrap();
        assert_eq!(recs.len(), 2);
    }
}
