//! Bracket pair definitions.

use serde::{Deserialize, Serialize};

/// The four supported bracket families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairKind {
    Round,
    Curly,
    Angle,
    Square,
}

impl PairKind {
    /// All families in scan order.
    pub const ALL: [PairKind; 4] = [
        PairKind::Round,
        PairKind::Curly,
        PairKind::Angle,
        PairKind::Square,
    ];

    pub fn pair(self) -> BracketPair {
        let (open, close) = match self {
            PairKind::Round => ('(', ')'),
            PairKind::Curly => ('{', '}'),
            PairKind::Angle => ('<', '>'),
            PairKind::Square => ('[', ']'),
        };
        BracketPair {
            open,
            close,
            kind: self,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PairKind::Round => "round",
            PairKind::Curly => "curly",
            PairKind::Angle => "angle",
            PairKind::Square => "square",
        }
    }
}

/// An `(open, close)` character pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BracketPair {
    pub open: char,
    pub close: char,
    pub kind: PairKind,
}

/// The enabled pairs, in the order the matcher tries them.
///
/// Built from [`PairKind`]s, so the pair characters are always distinct and
/// no two entries share a character. Duplicates are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePairs {
    pairs: Vec<BracketPair>,
}

impl ActivePairs {
    /// Every family enabled.
    pub fn all() -> Self {
        Self::from_kinds(PairKind::ALL)
    }

    /// No family enabled; the matcher then returns nothing.
    pub fn none() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Enabled families in the given order.
    pub fn from_kinds(kinds: impl IntoIterator<Item = PairKind>) -> Self {
        let mut pairs: Vec<BracketPair> = Vec::with_capacity(4);
        for kind in kinds {
            if !pairs.iter().any(|p| p.kind == kind) {
                pairs.push(kind.pair());
            }
        }
        Self { pairs }
    }

    pub fn iter(&self) -> impl Iterator<Item = &BracketPair> {
        self.pairs.iter()
    }

    pub fn as_slice(&self) -> &[BracketPair] {
        &self.pairs
    }

    pub fn contains(&self, kind: PairKind) -> bool {
        self.pairs.iter().any(|p| p.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl Default for ActivePairs {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order() {
        let kinds: Vec<_> = ActivePairs::all().iter().map(|p| p.kind).collect();
        assert_eq!(kinds, PairKind::ALL.to_vec());
    }

    #[test]
    fn test_duplicates_ignored() {
        let pairs = ActivePairs::from_kinds([PairKind::Square, PairKind::Round, PairKind::Square]);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs.as_slice()[0].open, '[');
        assert!(!pairs.contains(PairKind::Angle));
    }

    #[test]
    fn test_pair_characters_are_distinct() {
        let pairs = ActivePairs::all();
        let mut chars: Vec<char> = pairs.iter().flat_map(|p| [p.open, p.close]).collect();
        chars.sort_unstable();
        chars.dedup();
        assert_eq!(chars.len(), 8);
    }
}
