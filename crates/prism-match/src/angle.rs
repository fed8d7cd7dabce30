//! Character-context heuristics for `<` and `>`.
//!
//! Angle brackets double as comparison and shift operators, so before the
//! matcher treats one as a generic delimiter it must look "generic-like"
//! from its immediate neighbours. This is a heuristic, not a parser: both
//! false positives and false negatives are possible.

/// Identifier characters, including digits and `_`.
#[inline]
fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// The identifier run that ends just before `end`.
fn word_before(chars: &[char], end: usize) -> &[char] {
    let start = chars[..end]
        .iter()
        .rposition(|&c| !is_ident_char(c))
        .map_or(0, |p| p + 1);
    &chars[start..end]
}

/// The identifier run that starts at `start`.
fn word_after(chars: &[char], start: usize) -> &[char] {
    let end = chars[start..]
        .iter()
        .position(|&c| !is_ident_char(c))
        .map_or(chars.len(), |p| start + p);
    &chars[start..end]
}

/// Numeric and boolean literals never sit next to a generic delimiter.
fn is_literal(word: &[char]) -> bool {
    match word.first() {
        None => false,
        Some(c) if c.is_ascii_digit() => true,
        Some(_) => word.iter().copied().eq("true".chars()) || word.iter().copied().eq("false".chars()),
    }
}

/// Index of the first non-whitespace character at or after `from`.
fn skip_whitespace(chars: &[char], from: usize) -> usize {
    chars[from..]
        .iter()
        .position(|c| !c.is_whitespace())
        .map_or(chars.len(), |p| from + p)
}

/// True if the `<` at `pos` looks like it opens a type argument list.
///
/// Requires an identifier character, `_` or `.` right before it, and a
/// letter, `_`, `?`, or whitespace followed by a letter right after it.
pub fn opens_generic(chars: &[char], pos: usize) -> bool {
    let Some(&prev) = pos.checked_sub(1).and_then(|p| chars.get(p)) else {
        return false;
    };

    if is_ident_char(prev) {
        if is_literal(word_before(chars, pos)) {
            return false;
        }
    } else if prev != '.' {
        return false;
    }

    let starts_type = |at: usize| match chars.get(at) {
        Some(&c) if c.is_alphabetic() || c == '_' => !is_literal(word_after(chars, at)),
        _ => false,
    };

    match chars.get(pos + 1) {
        Some('?') => true,
        Some(c) if c.is_whitespace() => starts_type(skip_whitespace(chars, pos + 1)),
        Some(_) => starts_type(pos + 1),
        None => false,
    }
}

/// True if the `>` at `pos` looks like it closes a type argument list.
///
/// Requires an identifier character, `_`, `>`, `?` or whitespace before
/// it, and end of text, whitespace, or one of `( ) , . ; { > [` after it.
/// Whitespace on both sides, `>=`, `>>=`, `->` and `=>` are operators.
pub fn closes_generic(chars: &[char], pos: usize) -> bool {
    let Some(&prev) = pos.checked_sub(1).and_then(|p| chars.get(p)) else {
        return false;
    };

    let prev_ok = is_ident_char(prev) || matches!(prev, '>' | '?') || prev.is_whitespace();
    if !prev_ok {
        return false;
    }
    if is_ident_char(prev) && is_literal(word_before(chars, pos)) {
        return false;
    }

    match chars.get(pos + 1) {
        None => true,
        Some(c) if c.is_whitespace() => !prev.is_whitespace(),
        Some('>') => !ends_in_assignment(chars, pos),
        // `Vec<T>::new()` path continuation
        Some(':') => chars.get(pos + 2) == Some(&':'),
        Some(c) => matches!(c, '(' | ')' | ',' | '.' | ';' | '{' | '['),
    }
}

/// True for a run of `>` terminated by `=`, e.g. the shift-assign `>>=`.
fn ends_in_assignment(chars: &[char], pos: usize) -> bool {
    let end = chars[pos..]
        .iter()
        .position(|&c| c != '>')
        .map_or(chars.len(), |p| pos + p);
    chars.get(end) == Some(&'=')
}
