//! Language registry for span classifiers.

use std::collections::HashMap;
use std::sync::Arc;

use crate::classifier::{SpanClassifier, TreeSitterClassifier, classify};
use crate::SpanSet;

/// Maps language identifiers to classifiers.
///
/// Classifiers are stored behind `Arc` so one grammar can serve every open
/// document of that language.
#[derive(Clone, Default)]
pub struct ClassifierRegistry {
    classifiers: HashMap<String, Arc<dyn SpanClassifier>>,
}

impl ClassifierRegistry {
    /// Creates an empty registry. Every lookup misses, so every document
    /// is scanned as plain code.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the bundled tree-sitter grammars.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for lang in Self::supported_languages() {
            match TreeSitterClassifier::new(lang) {
                Ok(classifier) => registry.register(Arc::new(classifier)),
                Err(e) => tracing::warn!("Skipping bundled grammar {}: {}", lang, e),
            }
        }
        registry
    }

    /// Registers a classifier under its own language name.
    pub fn register(&mut self, classifier: Arc<dyn SpanClassifier>) {
        let name = classifier.language().to_ascii_lowercase();
        self.classifiers.insert(name, classifier);
    }

    /// Gets the classifier for a language.
    pub fn get(&self, lang: &str) -> Option<Arc<dyn SpanClassifier>> {
        self.classifiers.get(&lang.to_ascii_lowercase()).cloned()
    }

    /// Fail-open classification for a document of the given language.
    pub fn classify(&self, lang: Option<&str>, text: &str) -> SpanSet {
        let classifier = lang.and_then(|l| self.get(l));
        classify(classifier.as_deref(), text)
    }

    /// Returns bundled languages.
    pub fn supported_languages() -> &'static [&'static str] {
        &["rust", "javascript", "python", "json"]
    }
}

impl std::fmt::Debug for ClassifierRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut languages: Vec<_> = self.classifiers.keys().collect();
        languages.sort();
        f.debug_struct("ClassifierRegistry")
            .field("languages", &languages)
            .finish()
    }
}
