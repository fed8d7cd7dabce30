//! # Prism Match
//!
//! Nesting-aware bracket matching over a whole document in one pass.
//!
//! ```text
//!   text ──► skip comment/string spans ──► per-family stacks ──► BracketMatch
//!                                            ▲
//!                     `<` / `>` only if the angle heuristic agrees
//! ```
//!
//! ## Learning: Pure Functions
//!
//! [`match_brackets`] takes everything it needs as arguments and keeps its
//! stacks on the local frame. Running it twice on the same input yields the
//! same output, which is what lets the highlight manager throw results
//! away and rescan freely.

pub mod angle;
mod matcher;
mod pair;

pub use matcher::{BracketMatch, BracketMatcher, MatchOptions, NestingScope, match_brackets, match_chars};
pub use pair::{ActivePairs, BracketPair, PairKind};
