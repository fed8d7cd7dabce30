//! The single-pass stack matcher.

use prism_syntax::{NonStructuralSpan, SpanSet};
use serde::{Deserialize, Serialize};

use crate::angle;
use crate::pair::{ActivePairs, PairKind};

/// Which open brackets count towards a pair's nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestingScope {
    /// Only still-open brackets of the pair's own family.
    #[default]
    PerFamily,
    /// Every still-open structural bracket, whatever its family.
    Shared,
}

/// Scan options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOptions {
    /// Skip positions inside comment/string spans.
    pub skip_non_structural: bool,
    /// How nesting levels are counted.
    pub nesting: NestingScope,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            skip_non_structural: true,
            nesting: NestingScope::PerFamily,
        }
    }
}

/// A matched pair of bracket positions (character offsets).
///
/// `level` is the remaining depth of the pair's family stack after this
/// pair was popped: 0 means no bracket of the same family was still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BracketMatch {
    pub open: usize,
    pub close: usize,
    pub level: usize,
    pub kind: PairKind,
}

/// Per-family stacks of pending open positions, live for one scan.
struct ScanState {
    stacks: Vec<Vec<usize>>,
    open_total: usize,
}

impl ScanState {
    fn new(families: usize) -> Self {
        Self {
            stacks: vec![Vec::new(); families],
            open_total: 0,
        }
    }

    fn push(&mut self, family: usize, pos: usize) {
        if let Some(stack) = self.stacks.get_mut(family) {
            stack.push(pos);
            self.open_total += 1;
        }
    }

    fn pop(&mut self, family: usize) -> Option<usize> {
        let pos = self.stacks.get_mut(family)?.pop()?;
        self.open_total -= 1;
        Some(pos)
    }

    fn depth(&self, family: usize, scope: NestingScope) -> usize {
        match scope {
            NestingScope::Shared => self.open_total,
            NestingScope::PerFamily => self.stacks.get(family).map_or(0, Vec::len),
        }
    }
}

/// Walks sorted spans alongside an increasing scan position.
struct SpanCursor<'a> {
    spans: &'a [NonStructuralSpan],
    next: usize,
}

impl<'a> SpanCursor<'a> {
    fn new(spans: &'a SpanSet) -> Self {
        Self {
            spans: spans.as_slice(),
            next: 0,
        }
    }

    /// `pos` must not decrease between calls.
    fn covers(&mut self, pos: usize) -> bool {
        while self.spans.get(self.next).is_some_and(|s| s.end <= pos) {
            self.next += 1;
        }
        self.spans.get(self.next).is_some_and(|s| s.contains(pos))
    }
}

/// Matches brackets in `text`.
///
/// One left-to-right pass over characters. Unmatched closers are ignored,
/// unmatched openers are dropped at the end, and nothing here can fail.
/// Matches are returned in order of their closing position.
pub fn match_brackets(
    text: &str,
    pairs: &ActivePairs,
    spans: &SpanSet,
    options: MatchOptions,
) -> Vec<BracketMatch> {
    let chars: Vec<char> = text.chars().collect();
    match_chars(&chars, pairs, spans, options)
}

/// Same as [`match_brackets`] over pre-split characters.
pub fn match_chars(
    chars: &[char],
    pairs: &ActivePairs,
    spans: &SpanSet,
    options: MatchOptions,
) -> Vec<BracketMatch> {
    let mut matches = Vec::new();
    if pairs.is_empty() {
        return matches;
    }

    let mut state = ScanState::new(pairs.len());
    let mut skip = SpanCursor::new(spans);

    for (pos, &c) in chars.iter().enumerate() {
        if options.skip_non_structural && skip.covers(pos) {
            continue;
        }

        for (family, pair) in pairs.iter().enumerate() {
            let is_angle = pair.kind == PairKind::Angle;

            if c == pair.open {
                if !is_angle || angle::opens_generic(chars, pos) {
                    state.push(family, pos);
                }
                break;
            }

            if c == pair.close {
                if is_angle && !angle::closes_generic(chars, pos) {
                    break;
                }
                if let Some(open) = state.pop(family) {
                    matches.push(BracketMatch {
                        open,
                        close: pos,
                        level: state.depth(family, options.nesting),
                        kind: pair.kind,
                    });
                }
                break;
            }
        }
    }

    tracing::trace!(
        pairs = matches.len(),
        unmatched = state.open_total,
        "Bracket scan finished"
    );
    matches
}

/// A configured matcher, for callers that scan many texts with one setup.
#[derive(Debug, Clone, Default)]
pub struct BracketMatcher {
    pairs: ActivePairs,
    options: MatchOptions,
}

impl BracketMatcher {
    pub fn new(pairs: ActivePairs, options: MatchOptions) -> Self {
        Self { pairs, options }
    }

    pub fn pairs(&self) -> &ActivePairs {
        &self.pairs
    }

    pub fn options(&self) -> MatchOptions {
        self.options
    }

    pub fn scan(&self, text: &str, spans: &SpanSet) -> Vec<BracketMatch> {
        match_brackets(text, &self.pairs, spans, self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_syntax::SpanKind;
    use proptest::prelude::*;

    fn plain() -> MatchOptions {
        MatchOptions {
            skip_non_structural: false,
            nesting: NestingScope::PerFamily,
        }
    }

    fn scan(text: &str) -> Vec<BracketMatch> {
        match_brackets(text, &ActivePairs::all(), &SpanSet::new(), plain())
    }

    fn triples(matches: &[BracketMatch]) -> Vec<(usize, usize, usize)> {
        let mut out: Vec<_> = matches.iter().map(|m| (m.open, m.close, m.level)).collect();
        out.sort_unstable();
        out
    }

    #[test]
    fn test_mixed_families_scenario() {
        let matches = scan("foo(bar[baz]{qux})");
        assert_eq!(matches.len(), 3);
        assert_eq!(triples(&matches), vec![(3, 17, 0), (7, 11, 0), (12, 16, 0)]);

        let kinds: Vec<_> = matches.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![PairKind::Square, PairKind::Curly, PairKind::Round]);
    }

    #[test]
    fn test_default_levels_count_same_family_only() {
        let matches = match_brackets("([])", &ActivePairs::all(), &SpanSet::new(), MatchOptions::default());
        let square = matches.iter().find(|m| m.kind == PairKind::Square).unwrap();
        assert_eq!((square.open, square.close, square.level), (1, 2, 0));

        assert_eq!(triples(&scan("([([])])")), vec![(0, 7, 0), (1, 6, 0), (2, 5, 1), (3, 4, 1)]);
    }

    #[test]
    fn test_shared_levels() {
        let options = MatchOptions {
            nesting: NestingScope::Shared,
            ..plain()
        };
        let matches = match_brackets("foo(bar[baz]{qux})", &ActivePairs::all(), &SpanSet::new(), options);
        assert_eq!(triples(&matches), vec![(3, 17, 0), (7, 11, 1), (12, 16, 1)]);
    }

    #[test]
    fn test_hand_traced_levels() {
        // ( ( ) ( ) )
        // 0 1 2 3 4 5
        assert_eq!(triples(&scan("(()())")), vec![(0, 5, 0), (1, 2, 1), (3, 4, 1)]);
        assert_eq!(
            triples(&scan("((()))")),
            vec![(0, 5, 0), (1, 4, 1), (2, 3, 2)]
        );
    }

    #[test]
    fn test_unbalanced_input_is_not_an_error() {
        assert!(scan(")((").is_empty());
        assert!(scan("}}]])").is_empty());
        assert_eq!(triples(&scan("())")), vec![(0, 1, 0)]);
        assert_eq!(triples(&scan("(()")), vec![(1, 2, 1)]);
    }

    #[test]
    fn test_interleaved_families_match_independently() {
        // Families never cross-match: `[` is closed by the later `]`.
        assert_eq!(triples(&scan("([)]")), vec![(0, 2, 0), (1, 3, 0)]);
    }

    #[test]
    fn test_disabled_families_are_ignored() {
        let pairs = ActivePairs::from_kinds([PairKind::Curly]);
        let matches = match_brackets("f(x) { [y] }", &pairs, &SpanSet::new(), plain());
        assert_eq!(triples(&matches), vec![(5, 11, 0)]);
        assert!(match_brackets("()", &ActivePairs::none(), &SpanSet::new(), plain()).is_empty());
    }

    #[test]
    fn test_spans_exclude_brackets() {
        // 0123456789
        // a("(x)")b
        let text = "a(\"(x)\")b";
        let spans = SpanSet::from_spans([NonStructuralSpan::new(2, 7, SpanKind::String)]);
        let options = MatchOptions::default();
        let matches = match_brackets(text, &ActivePairs::all(), &spans, options);
        assert_eq!(triples(&matches), vec![(1, 7, 0)]);

        let unskipped = match_brackets(text, &ActivePairs::all(), &spans, plain());
        assert_eq!(unskipped.len(), 2);
    }

    #[test]
    fn test_straddling_pairs_are_not_matched() {
        let spans = SpanSet::from_spans([NonStructuralSpan::new(2, 8, SpanKind::String)]);
        let options = MatchOptions::default();

        // opener inside, closer outside
        let inside_out = match_brackets("ab(cdefgh)", &ActivePairs::all(), &spans, options);
        assert!(inside_out.is_empty());

        // opener outside, closer inside
        let outside_in = match_brackets("a(cdef)ghi", &ActivePairs::all(), &spans, options);
        assert!(outside_in.is_empty());

        // fully inside
        let inside = match_brackets("ab[cd]efgh", &ActivePairs::all(), &spans, options);
        assert!(inside.is_empty());
    }

    #[test]
    fn test_angle_brackets() {
        assert!(scan("a < b").is_empty());
        assert!(scan("if a < b && c > d {}").iter().all(|m| m.kind != PairKind::Angle));
        assert!(scan("x <= y").is_empty());

        let generic = scan("List<Int>");
        assert_eq!(generic.len(), 1);
        assert_eq!((generic[0].open, generic[0].close), (4, 8));
        assert_eq!(generic[0].kind, PairKind::Angle);
    }

    #[test]
    fn test_nested_generics() {
        let matches = scan("let v: Vec<Vec<u8>> = Vec::new();");
        let angles: Vec<_> = matches.iter().filter(|m| m.kind == PairKind::Angle).collect();
        assert_eq!(angles.len(), 2);
        assert_eq!(angles[0].level, 1);
        assert_eq!(angles[1].level, 0);
    }

    #[test]
    fn test_comparison_inside_call_keeps_round_pair() {
        let matches = scan("check(a > b)");
        assert_eq!(triples(&matches), vec![(5, 11, 0)]);
    }

    #[test]
    fn test_positions_are_chars() {
        let matches = scan("é(ü)");
        assert_eq!(triples(&matches), vec![(1, 3, 0)]);
    }

    #[test]
    fn test_matcher_struct() {
        let matcher = BracketMatcher::new(ActivePairs::from_kinds([PairKind::Round]), plain());
        assert_eq!(matcher.scan("([])", &SpanSet::new()).len(), 1);
        assert!(!matcher.pairs().contains(PairKind::Square));
    }

    /// Random balanced single-family strings with filler letters.
    fn balanced(max_pairs: usize) -> impl Strategy<Value = String> {
        proptest::collection::vec(proptest::bool::ANY, 0..max_pairs * 2).prop_map(|steps| {
            let mut out = String::new();
            let mut open = 0usize;
            for push in steps {
                if push || open == 0 {
                    out.push('(');
                    open += 1;
                } else {
                    out.push(')');
                    open -= 1;
                }
                out.push('x');
            }
            out.extend(std::iter::repeat_n(')', open));
            out
        })
    }

    proptest! {
        #[test]
        fn prop_balanced_input_matches_every_pair(text in balanced(20)) {
            let matches = scan(&text);
            let pairs = text.matches('(').count();
            prop_assert_eq!(matches.len(), pairs);

            let max_depth = {
                let (mut depth, mut max) = (0usize, 0usize);
                for c in text.chars() {
                    match c {
                        '(' => { depth += 1; max = max.max(depth); }
                        ')' => depth -= 1,
                        _ => {}
                    }
                }
                max
            };
            let mut levels: Vec<_> = matches.iter().map(|m| m.level).collect();
            levels.sort_unstable();
            levels.dedup();
            prop_assert_eq!(levels, (0..max_depth).collect::<Vec<_>>());
        }

        #[test]
        fn prop_scan_is_idempotent(text in "[a-z(){}<>\\[\\] ]{0,64}") {
            prop_assert_eq!(scan(&text), scan(&text));
        }

        #[test]
        fn prop_matches_are_well_formed(text in "[a-z(){}<>\\[\\]=.,; ]{0,64}") {
            let chars: Vec<char> = text.chars().collect();
            for m in scan(&text) {
                let pair = m.kind.pair();
                prop_assert!(m.open < m.close);
                prop_assert_eq!(chars[m.open], pair.open);
                prop_assert_eq!(chars[m.close], pair.close);
            }
        }

        #[test]
        fn prop_spans_are_never_matched(
            text in "[a-z(){}\\[\\]]{0,48}",
            start in 0usize..48,
            len in 0usize..16,
        ) {
            let spans = SpanSet::from_spans([NonStructuralSpan::new(start, start + len, SpanKind::Comment)]);
            let matches = match_brackets(&text, &ActivePairs::all(), &spans, MatchOptions::default());
            for m in matches {
                prop_assert!(!spans.contains(m.open));
                prop_assert!(!spans.contains(m.close));
            }
        }
    }
}
