//! The public builder API: accumulate patterns, then compile one or many jointly-minimized
//! DFA start states from them.

use std::collections::BTreeSet;
use std::hash::Hash;

use crate::dfa::Dfa;
use crate::errors::Result;
use crate::internal::minimizer;
use crate::internal::nfa::Nfa;
use crate::internal::packed;
use crate::internal::subset;
use crate::pattern::Pattern;
use crate::resolver::AmbiguityResolver;

/// Accumulates `(pattern, accept_value)` pairs and compiles them into one or more DFA start
/// states. Multiple patterns may share an accept value.
#[derive(Debug, Clone, Default)]
pub struct Builder<M> {
    patterns: Vec<(Pattern, M)>,
}

impl<M> Builder<M>
where
    M: Clone + Eq + Ord + Hash + std::fmt::Debug,
{
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Appends a pattern with its accept value.
    pub fn add_pattern(&mut self, pattern: Pattern, accept_value: M) -> &mut Self {
        self.patterns.push((pattern, accept_value));
        self
    }

    /// The patterns accumulated so far, in insertion order.
    pub(crate) fn patterns(&self) -> &[(Pattern, M)] {
        &self.patterns
    }

    /// Builds a single DFA with one start state selecting the patterns whose accept value is
    /// in `language`.
    pub fn build(&self, language: &BTreeSet<M>, resolver: &dyn AmbiguityResolver<M>) -> Result<Dfa<M>> {
        self.build_many(std::slice::from_ref(language), resolver)
    }

    /// Builds one DFA with one start state per entry of `languages`, jointly minimized so
    /// that states reachable from different languages are shared whenever they are
    /// behaviorally equivalent. Start states for distinct languages never merge, even when
    /// otherwise equivalent.
    pub fn build_many(
        &self,
        languages: &[BTreeSet<M>],
        resolver: &dyn AmbiguityResolver<M>,
    ) -> Result<Dfa<M>> {
        let mut nfa: Nfa<M> = Nfa::new();
        let mut entries = Vec::with_capacity(self.patterns.len());
        for (pattern, accept) in &self.patterns {
            let end = nfa.add_state(Some(accept.clone()));
            let entry = pattern.emit_into_nfa(&mut nfa, end);
            entries.push(entry);
        }

        let mut starts = Vec::with_capacity(languages.len());
        for language in languages {
            let hub = nfa.add_state(None);
            for (idx, (_, accept)) in self.patterns.iter().enumerate() {
                if language.contains(accept) {
                    nfa.add_epsilon(hub, entries[idx]);
                }
            }
            starts.push(hub);
        }

        let raw = subset::build_raw_dfa(&nfa, &starts, resolver)?;
        let minimized = minimizer::minimize(&raw);
        let (states, starts) = packed::pack_dfa(&minimized);
        Ok(Dfa::from_parts(states, starts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::literal;
    use crate::resolver::NullResolver;

    #[test]
    fn e4_ambiguous_patterns_fail_build_with_null_resolver() {
        let mut builder: Builder<u32> = Builder::new();
        builder.add_pattern(literal("x"), 1);
        builder.add_pattern(literal("x"), 2);
        let language: BTreeSet<u32> = [1, 2].into_iter().collect();
        let result = builder.build(&language, &NullResolver);
        assert!(result.is_err());
    }

    #[test]
    fn patterns_outside_language_are_excluded() {
        let mut builder: Builder<u32> = Builder::new();
        builder.add_pattern(literal("a"), 1);
        builder.add_pattern(literal("b"), 2);
        let language: BTreeSet<u32> = [1].into_iter().collect();
        let dfa = builder.build(&language, &NullResolver).unwrap();
        let s0 = dfa.start(0);
        assert!(s0.next('a' as u16).is_some());
        assert!(s0.next('b' as u16).is_none());
    }
}
