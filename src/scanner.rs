//! The longest-match scan engine: walks a DFA over a source string, tracking the best accept
//! seen so far and accelerating repeated non-matching runs with a bounded memo.

use crate::dfa::Dfa;
use crate::internal::ids::StateID;
use crate::internal::scan::NonMatchingMemo;
use crate::span::Span;

/// Per-scan scratch state: a cursor plus a non-matching memo. Distinct scanners over the
/// same [`Dfa`] are fully independent; no locks are needed on the hot path.
pub struct Scanner<'d, M> {
    dfa: &'d Dfa<M>,
    nmm: NonMatchingMemo,
}

impl<'d, M: Clone> Scanner<'d, M> {
    /// Creates a new scanner over `dfa`.
    pub fn new(dfa: &'d Dfa<M>) -> Self {
        Self {
            dfa,
            nmm: NonMatchingMemo::new(),
        }
    }

    /// Returns the longest accepting prefix of `src[pos..]` for `language`, along with the
    /// end offset one past its last matched character. If no prefix accepts, returns `(None,
    /// pos)`.
    pub fn match_at(&mut self, language: usize, src: &[u16], pos: usize) -> (Option<M>, usize) {
        let mut state = self.dfa.start(language);
        let mut p = pos;
        let mut current_match = state.matched().cloned();
        let mut current_end = pos;
        let mut found_new_match = current_match.is_some();

        let mut steps = 0usize;
        let mut next_record_at = 2usize;
        let mut gap = 2usize;

        while p < src.len() {
            if !found_new_match && self.nmm.contains(p, StateID::new(state.state_number() as u32)) {
                break;
            }
            let Some(next) = state.next(src[p]) else {
                break;
            };
            p += 1;
            state = next;
            if let Some(value) = state.matched() {
                current_match = Some(value.clone());
                current_end = p;
                found_new_match = true;
            }
            steps += 1;
            if !found_new_match && steps >= next_record_at {
                self.nmm.record(p, StateID::new(state.state_number() as u32));
                gap += gap / 2 + 1;
                next_record_at += gap;
            }
        }

        (current_match, current_end)
    }

    /// Repeatedly calls [`Scanner::match_at`] at successive positions starting from `from`
    /// until a match is found or the string ends, returning the first.
    pub fn find_next(
        &mut self,
        language: usize,
        src: &[u16],
        mut from: usize,
    ) -> Option<(Span, M)> {
        while from <= src.len() {
            let (found, end) = self.match_at(language, src, from);
            if let Some(value) = found {
                return Some((Span::new(from, end), value));
            }
            from += 1;
        }
        None
    }

    /// Iterates over every non-overlapping, leftmost-longest match in `src` for `language`.
    pub fn find_iter<'s>(&'s mut self, language: usize, src: &'s [u16]) -> FindMatches<'s, 'd, M> {
        FindMatches {
            scanner: self,
            language,
            src,
            pos: 0,
        }
    }
}

/// An iterator over the non-overlapping matches of one language against one source string.
pub struct FindMatches<'s, 'd, M> {
    scanner: &'s mut Scanner<'d, M>,
    language: usize,
    src: &'s [u16],
    pos: usize,
}

impl<'s, 'd, M: Clone> Iterator for FindMatches<'s, 'd, M> {
    type Item = (Span, M);

    fn next(&mut self) -> Option<Self::Item> {
        let (span, value) = self.scanner.find_next(self.language, self.src, self.pos)?;
        self.pos = span.end.max(span.start + 1);
        Some((span, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use crate::pattern::{literal, literal_ignoring_case, range, repeat};
    use crate::resolver::NullResolver;
    use std::collections::BTreeSet;

    fn units(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn e1_longest_prefix_wins_and_progress_stops_at_dead_transition() {
        let mut builder: Builder<u32> = Builder::new();
        builder.add_pattern(literal("a"), 1);
        builder.add_pattern(literal("ab"), 2);
        let language: BTreeSet<u32> = [1, 2].into_iter().collect();
        let dfa = builder.build(&language, &NullResolver).unwrap();
        let mut scanner = Scanner::new(&dfa);
        let src = units("abc");

        let matches: Vec<_> = scanner.find_iter(0, &src).collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].0, Span::new(0, 2));
        assert_eq!(matches[0].1, 2);
    }

    #[test]
    fn e2_number_and_identifier_patterns() {
        let digit = range(b'0' as u16, b'9' as u16).unwrap();
        let mut builder: Builder<&'static str> = Builder::new();
        builder.add_pattern(crate::pattern::repeat(digit), "NUM");
        builder.add_pattern(literal("foo"), "ID");
        let language: BTreeSet<&'static str> = ["NUM", "ID"].into_iter().collect();
        let dfa = builder.build(&language, &NullResolver).unwrap();
        let mut scanner = Scanner::new(&dfa);
        let src = units("foo123bar");

        let matches: Vec<_> = scanner.find_iter(0, &src).collect();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0], (Span::new(0, 3), "ID"));
        assert_eq!(matches[1], (Span::new(3, 6), "NUM"));
    }

    #[test]
    fn e3_case_insensitive_literal_matches_three_times() {
        let mut builder: Builder<u32> = Builder::new();
        builder.add_pattern(literal_ignoring_case("HeLLo"), 1);
        let language: BTreeSet<u32> = [1].into_iter().collect();
        let dfa = builder.build(&language, &NullResolver).unwrap();
        let mut scanner = Scanner::new(&dfa);
        let src = units("say hello HELLO HeLlO");

        let matches: Vec<_> = scanner.find_iter(0, &src).collect();
        assert_eq!(matches.len(), 3);
        for (span, _) in &matches {
            assert_eq!(span.len(), 5);
        }
        assert_eq!(matches[0].0.start, 4);
        assert_eq!(matches[1].0.start, 10);
        assert_eq!(matches[2].0.start, 16);
    }

    #[test]
    fn e7_two_languages_share_prefix_but_accept_differently() {
        let mut builder: Builder<&'static str> = Builder::new();
        builder.add_pattern(literal("if"), "kw");
        builder.add_pattern(literal("id"), "id");
        let kw_language: BTreeSet<&'static str> = ["kw"].into_iter().collect();
        let id_language: BTreeSet<&'static str> = ["id"].into_iter().collect();
        let dfa = builder
            .build_many(&[kw_language, id_language], &NullResolver)
            .unwrap();

        let mut scanner = Scanner::new(&dfa);
        let src_if = units("if");
        let src_id = units("id");

        assert_eq!(scanner.match_at(0, &src_if, 0).0, Some("kw"));
        assert_eq!(scanner.match_at(0, &src_id, 0).0, None);
        assert_eq!(scanner.match_at(1, &src_id, 0).0, Some("id"));
        assert_eq!(scanner.match_at(1, &src_if, 0).0, None);
    }

    #[test]
    fn pass_through_when_nothing_matches() {
        let builder: Builder<u32> = Builder::new();
        let language: BTreeSet<u32> = BTreeSet::new();
        let dfa = builder.build(&language, &NullResolver).unwrap();
        let mut scanner = Scanner::new(&dfa);
        let src = units("whatever");
        assert_eq!(scanner.find_iter(0, &src).count(), 0);
    }

    #[test]
    fn e6_words_match_for_replace_driver_input() {
        let lower = range(b'a' as u16, b'z' as u16).unwrap();
        let mut builder: Builder<u32> = Builder::new();
        builder.add_pattern(repeat(lower), 1);
        let language: BTreeSet<u32> = [1].into_iter().collect();
        let dfa = builder.build(&language, &NullResolver).unwrap();
        let mut scanner = Scanner::new(&dfa);
        let src = units(" foo bar ");
        let matches: Vec<_> = scanner.find_iter(0, &src).collect();
        assert_eq!(matches.len(), 2);
    }
}
