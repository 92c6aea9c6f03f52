//! Diagnostic error types for panakeia.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]`
//! derives, providing error codes, help text, and source chains so users know
//! exactly what went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

use crate::llm::LlmError;

/// Top-level error type for panakeia.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain (error codes, help text, source chains) through to the
/// user.
#[derive(Debug, Error, Diagnostic)]
pub enum PanakeiaError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Ontology(#[from] OntologyError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Recommend(#[from] RecommendError),
}

// ---------------------------------------------------------------------------
// Ontology errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum OntologyError {
    #[error("failed to read ontology file: {path}")]
    #[diagnostic(
        code(panakeia::ontology::io),
        help(
            "Check that the ontology file exists and is readable, \
             or pass --demo to load the bundled demo ontology."
        )
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Turtle(#[from] TurtleError),
}

/// Turtle syntax error, reported with the line it occurred on.
#[derive(Debug, Error, Diagnostic)]
#[error("Turtle syntax error at line {line}: {message}")]
#[diagnostic(
    code(panakeia::ontology::turtle),
    help(
        "Only the Turtle subset used by ontology files is supported: \
         @prefix directives, IRIs, prefixed names, `a`, string and numeric \
         literals, and `;`/`,` lists. Blank nodes and collections are not."
    )
)]
pub struct TurtleError {
    pub line: usize,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Recommendation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RecommendError {
    #[error("concept not found in the ontology: {label}")]
    #[diagnostic(
        code(panakeia::recommend::unknown_concept),
        help("List the declared concepts with `panakeia concepts` and check the spelling.")
    )]
    UnknownConcept { label: String },

    #[error("concept classification failed")]
    #[diagnostic(
        code(panakeia::recommend::classify),
        help("The classifier request did not complete. Check the API key, base URL, and network.")
    )]
    Classify {
        #[source]
        source: LlmError,
    },

    #[error("explanation enhancement failed for {related}")]
    #[diagnostic(
        code(panakeia::recommend::enhance),
        help("The enhancement request did not complete. Check the API key, base URL, and network.")
    )]
    Enhance {
        related: String,
        #[source]
        source: LlmError,
    },
}

/// Convenience alias for functions returning panakeia results.
pub type PanakeiaResult<T> = std::result::Result<T, PanakeiaError>;
