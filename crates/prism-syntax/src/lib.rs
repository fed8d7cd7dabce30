//! # Prism Syntax
//!
//! Finds the parts of a document that are *not* code: comments, string and
//! character literals. Bracket look-alikes inside those ranges must never be
//! matched, so the matcher asks this crate for a [`SpanSet`] before scanning.
//!
//! ## Why Tree-sitter?
//!
//! Tree-sitter is an error-tolerant incremental parser:
//! - **Error-tolerant**: Produces usable trees even for half-typed code
//! - **Fast**: Written in C with Rust bindings
//! - **Accurate**: Real tokenization, not regex guessing
//!
//! ## Fail-open
//!
//! Classification is an enrichment, never a requirement. Every public entry
//! point that feeds the matcher ([`classify`], [`ClassifierRegistry::classify`])
//! swallows classifier failures and returns an empty set, which means
//! "treat the whole document as code".

mod classifier;
mod registry;
mod span;

pub use classifier::{SpanClassifier, TreeSitterClassifier, classify};
pub use registry::ClassifierRegistry;
pub use span::{NonStructuralSpan, SpanKind, SpanSet};

/// Result type for classification.
pub type SyntaxResult<T> = Result<T, SyntaxError>;

/// Errors that can occur during classification.
#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Failed to load grammar for {0}")]
    Grammar(String),

    #[error("Parser error")]
    ParseError,
}
