//! Pattern algebra: an immutable tree of pattern nodes that knows how to emit itself into
//! an NFA and whether it matches the empty string.

use crate::errors::{DfalexErrorKind, Result};
use crate::internal::ids::StateID;
use crate::internal::nfa::Nfa;

/// The maximum character value in the 16-bit code-unit domain this crate operates over.
pub const MAX_CHAR: u16 = 0xFFFF;

/// An immutable node in the pattern algebra tree.
///
/// Patterns are built with the free functions in this module (`literal`, `range`, `then`,
/// ...) and combined freely; a `Pattern` may be cloned and reused across many builders.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pattern {
    /// A fixed sequence of characters.
    Literal {
        /// The code units to match, one state transition per unit.
        chars: Vec<u16>,
        /// When true, each unit also matches its other-case form.
        fold_case: bool,
    },
    /// An inclusive range `[first, last]` of a single character.
    Range(u16, u16),
    /// `a` followed by `b`.
    Concat(Box<Pattern>, Box<Pattern>),
    /// Any one of the alternatives.
    Union(Vec<Pattern>),
    /// Kleene star (`at_least_one == false`) or plus (`at_least_one == true`).
    Repeat(Box<Pattern>, bool),
    /// `p` or the empty string.
    Optional(Box<Pattern>),
    /// Matches the empty string only.
    Empty,
}

impl Pattern {
    /// Structural determination of whether this pattern can match the empty string.
    pub fn matches_empty(&self) -> bool {
        match self {
            Pattern::Literal { chars, .. } => chars.is_empty(),
            Pattern::Range(_, _) => false,
            Pattern::Concat(a, b) => a.matches_empty() && b.matches_empty(),
            Pattern::Union(alts) => alts.iter().any(Pattern::matches_empty),
            Pattern::Repeat(inner, at_least_one) => !*at_least_one || inner.matches_empty(),
            Pattern::Optional(_) => true,
            Pattern::Empty => true,
        }
    }

    /// Adds states to `nfa` such that following the returned entry state and matching this
    /// pattern reaches `target`. Adds no outgoing edges to `target` or to any pre-existing
    /// state.
    pub(crate) fn emit_into_nfa<M: Clone>(&self, nfa: &mut Nfa<M>, target: StateID) -> StateID {
        match self {
            Pattern::Literal { chars, fold_case } => {
                if chars.is_empty() {
                    return target;
                }
                let mut next = target;
                for &c in chars.iter().rev() {
                    let from = nfa.add_state(None);
                    for unit in literal_units(c, *fold_case) {
                        nfa.add_transition(from, next, unit, unit);
                    }
                    next = from;
                }
                next
            }
            Pattern::Range(first, last) => {
                let entry = nfa.add_state(None);
                nfa.add_transition(entry, target, *first, *last);
                entry
            }
            Pattern::Concat(a, b) => {
                let mid = b.emit_into_nfa(nfa, target);
                a.emit_into_nfa(nfa, mid)
            }
            Pattern::Union(alts) => {
                let s = nfa.add_state(None);
                for alt in alts {
                    let entry = alt.emit_into_nfa(nfa, target);
                    nfa.add_epsilon(s, entry);
                }
                s
            }
            Pattern::Repeat(inner, at_least_one) => {
                let rep = nfa.add_state(None);
                nfa.add_epsilon(rep, target);
                let start = inner.emit_into_nfa(nfa, rep);
                nfa.add_epsilon(rep, start);
                if *at_least_one || inner.matches_empty() {
                    start
                } else {
                    let skip = nfa.add_state(None);
                    nfa.add_epsilon(skip, target);
                    nfa.add_epsilon(skip, start);
                    skip
                }
            }
            Pattern::Optional(inner) => {
                let start = inner.emit_into_nfa(nfa, target);
                if inner.matches_empty() {
                    start
                } else {
                    let skip = nfa.add_state(None);
                    nfa.add_epsilon(skip, target);
                    nfa.add_epsilon(skip, start);
                    skip
                }
            }
            Pattern::Empty => target,
        }
    }

    /// `self` followed by `other`.
    pub fn then(self, other: Pattern) -> Pattern {
        Pattern::Concat(Box::new(self), Box::new(other))
    }

    /// `self` followed by `literal(s)`.
    pub fn then_literal(self, s: &str) -> Pattern {
        self.then(literal(s))
    }

    /// `self` followed by `literal_ignoring_case(s)`.
    pub fn then_literal_ignoring_case(self, s: &str) -> Pattern {
        self.then(literal_ignoring_case(s))
    }

    /// `self` followed by one or more repetitions of `p`.
    pub fn then_repeat(self, p: Pattern) -> Pattern {
        self.then(repeat(p))
    }

    /// `self` followed by `p?`.
    pub fn then_maybe(self, p: Pattern) -> Pattern {
        self.then(maybe(p))
    }

    /// `self` followed by `p*`.
    pub fn then_maybe_repeat(self, p: Pattern) -> Pattern {
        self.then(maybe_repeat(p))
    }
}

/// Computes the distinct 16-bit units that a single code unit `c` should also match when
/// folding case, including `c` itself. Only single-unit case mappings are considered, in
/// keeping with the 16-bit code-unit domain this crate works in.
fn literal_units(c: u16, fold_case: bool) -> Vec<u16> {
    if !fold_case {
        return vec![c];
    }
    let mut units = vec![c];
    if let Some(ch) = char::from_u32(c as u32) {
        for variant in ch.to_uppercase().chain(ch.to_lowercase()) {
            let mut buf = [0u16; 2];
            let encoded = variant.encode_utf16(&mut buf);
            if encoded.len() == 1 && !units.contains(&encoded[0]) {
                units.push(encoded[0]);
            }
        }
    }
    units
}

/// Matches the empty string.
pub fn empty() -> Pattern {
    Pattern::Empty
}

/// Matches the exact sequence of characters in `s`, case-sensitively.
pub fn literal(s: &str) -> Pattern {
    Pattern::Literal {
        chars: s.encode_utf16().collect(),
        fold_case: false,
    }
}

/// Matches the exact sequence of characters in `s`, folding the case of each unit.
pub fn literal_ignoring_case(s: &str) -> Pattern {
    Pattern::Literal {
        chars: s.encode_utf16().collect(),
        fold_case: true,
    }
}

/// Matches a single character in the inclusive range `[lo, hi]`.
///
/// Returns `Err(InvalidRange)` if `lo > hi`.
pub fn range(lo: u16, hi: u16) -> Result<Pattern> {
    if lo > hi {
        return Err(DfalexErrorKind::InvalidRange(lo, hi).into());
    }
    Ok(Pattern::Range(lo, hi))
}

/// Matches any one character drawn from `chars`. Every character passed is included; none are
/// skipped.
pub fn any_char_in(chars: &[char]) -> Pattern {
    let alts = chars
        .iter()
        .flat_map(|&c| {
            let mut buf = [0u16; 2];
            c.encode_utf16(&mut buf).to_vec()
        })
        .map(|u| Pattern::Range(u, u))
        .collect();
    Pattern::Union(alts)
}

/// Matches any one of `patterns`. Every pattern passed is included; none are skipped.
pub fn any_of(patterns: &[Pattern]) -> Pattern {
    Pattern::Union(patterns.to_vec())
}

/// Kleene plus: one or more repetitions of `p`.
pub fn repeat(p: Pattern) -> Pattern {
    Pattern::Repeat(Box::new(p), true)
}

/// Kleene star: zero or more repetitions of `p`.
pub fn maybe_repeat(p: Pattern) -> Pattern {
    Pattern::Repeat(Box::new(p), false)
}

/// `p` or the empty string.
pub fn maybe(p: Pattern) -> Pattern {
    Pattern::Optional(Box::new(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_matches_empty() {
        assert!(empty().matches_empty());
        assert!(!Pattern::Range(b'a' as u16, b'z' as u16).matches_empty());
    }

    #[test]
    fn literal_matches_empty_iff_zero_length() {
        assert!(literal("").matches_empty());
        assert!(!literal("a").matches_empty());
    }

    #[test]
    fn repeat_matches_empty_rules() {
        let star = maybe_repeat(literal("a"));
        assert!(star.matches_empty());
        let plus = repeat(literal("a"));
        assert!(!plus.matches_empty());
        let plus_of_empty = repeat(empty());
        assert!(plus_of_empty.matches_empty());
    }

    #[test]
    fn any_of_includes_every_alternative() {
        let alts = vec![literal("a"), literal("b"), literal("c")];
        let p = any_of(&alts);
        match p {
            Pattern::Union(v) => assert_eq!(v.len(), 3),
            _ => panic!("expected Union"),
        }
    }

    #[test]
    fn any_char_in_includes_every_char() {
        let p = any_char_in(&['x', 'y', 'z']);
        match p {
            Pattern::Union(v) => assert_eq!(v.len(), 3),
            _ => panic!("expected Union"),
        }
    }

    #[test]
    fn invalid_range_is_rejected() {
        assert!(range(10, 5).is_err());
        assert!(range(5, 10).is_ok());
    }
}
