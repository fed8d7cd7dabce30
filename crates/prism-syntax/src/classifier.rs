//! Classifier trait and the tree-sitter backed implementation.

use std::panic::{AssertUnwindSafe, catch_unwind};
use tree_sitter::{Language, Parser, Tree};

use crate::{NonStructuralSpan, SpanKind, SpanSet, SyntaxError, SyntaxResult};

/// Something that can report comment/string ranges for a document.
///
/// Implementations must be restartable: classifying the same text twice
/// yields the same spans. Returned spans are in *character* offsets.
pub trait SpanClassifier: Send + Sync {
    /// Language identifier this classifier handles.
    fn language(&self) -> &str;

    /// Returns the non-structural spans of `text`.
    fn classify(&self, text: &str) -> SyntaxResult<Vec<NonStructuralSpan>>;
}

/// Fail-open adapter used by the highlight pipeline.
///
/// A missing classifier, an error, or even a panic inside a third-party
/// classifier all produce an empty [`SpanSet`].
pub fn classify(classifier: Option<&dyn SpanClassifier>, text: &str) -> SpanSet {
    let Some(classifier) = classifier else {
        tracing::trace!("No classifier available, treating document as code");
        return SpanSet::new();
    };

    match catch_unwind(AssertUnwindSafe(|| classifier.classify(text))) {
        Ok(Ok(spans)) => {
            let set = SpanSet::from_spans(spans);
            tracing::debug!(
                language = classifier.language(),
                spans = set.len(),
                "Classified non-structural spans"
            );
            set
        }
        Ok(Err(e)) => {
            tracing::warn!(language = classifier.language(), "Classifier failed: {}", e);
            SpanSet::new()
        }
        Err(_) => {
            tracing::warn!(language = classifier.language(), "Classifier panicked");
            SpanSet::new()
        }
    }
}

/// Classifies spans by walking a tree-sitter syntax tree.
///
/// A fresh parser is created per call, so the classifier holds no state
/// between documents and can be shared across threads.
pub struct TreeSitterClassifier {
    name: String,
    language: Language,
}

impl TreeSitterClassifier {
    /// Creates a classifier for one of the bundled grammars.
    pub fn new(lang: &str) -> SyntaxResult<Self> {
        let language = builtin_language(lang)?;
        Ok(Self::with_language(lang, language))
    }

    /// Creates a classifier for an arbitrary tree-sitter grammar.
    pub fn with_language(name: impl Into<String>, language: Language) -> Self {
        Self {
            name: name.into(),
            language,
        }
    }

    fn parse(&self, text: &str) -> SyntaxResult<Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|_| SyntaxError::Grammar(self.name.clone()))?;
        parser.parse(text, None).ok_or(SyntaxError::ParseError)
    }
}

impl SpanClassifier for TreeSitterClassifier {
    fn language(&self) -> &str {
        &self.name
    }

    fn classify(&self, text: &str) -> SyntaxResult<Vec<NonStructuralSpan>> {
        let tree = self.parse(text)?;
        let mut indexer = CharIndexer::new(text);
        let mut spans = Vec::new();

        // Pre-order walk. A classified node is recorded whole and its
        // children are skipped, so spans come out sorted and disjoint.
        let mut cursor = tree.walk();
        'walk: loop {
            let node = cursor.node();
            let kind = SpanKind::from_token_name(node.kind());

            match kind {
                Some(kind) if node.end_byte() > node.start_byte() => {
                    let start = indexer.char_offset(node.start_byte());
                    let end = indexer.char_offset(node.end_byte());
                    spans.push(NonStructuralSpan::new(start, end, kind));
                }
                _ => {
                    if cursor.goto_first_child() {
                        continue;
                    }
                }
            }

            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    break 'walk;
                }
            }
        }

        Ok(spans)
    }
}

/// Converts monotonically increasing byte offsets into char offsets.
struct CharIndexer<'a> {
    text: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharIndexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            chars: 0,
        }
    }

    fn char_offset(&mut self, byte: usize) -> usize {
        let mut byte = byte.min(self.text.len());
        while !self.text.is_char_boundary(byte) {
            byte -= 1;
        }
        if byte < self.byte {
            self.byte = 0;
            self.chars = 0;
        }
        self.chars += self.text[self.byte..byte].chars().count();
        self.byte = byte;
        self.chars
    }
}

/// Gets a bundled tree-sitter language.
pub(crate) fn builtin_language(lang: &str) -> SyntaxResult<Language> {
    match lang {
        "rust" | "rs" => Ok(tree_sitter_rust::LANGUAGE.into()),
        "javascript" | "js" | "jsx" => Ok(tree_sitter_javascript::LANGUAGE.into()),
        "python" | "py" => Ok(tree_sitter_python::LANGUAGE.into()),
        "json" => Ok(tree_sitter_json::LANGUAGE.into()),
        _ => Err(SyntaxError::UnknownLanguage(lang.to_string())),
    }
}
