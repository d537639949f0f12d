//! A mutable, append-only NFA graph built up by emitting pattern trees into it.
//!
//! Unlike the single-pattern, single-end-state NFA this module is modeled on, this NFA
//! supports any number of start states (one per pattern, later wired into per-language hub
//! states by the builder) and an independent optional accept value per state.

use super::ids::StateID;

#[derive(Debug, Clone)]
pub(crate) struct NfaState<M> {
    /// Character-range transitions `(first, last, target)`, possibly overlapping.
    transitions: Vec<(u16, u16, StateID)>,
    /// Non-consuming transitions.
    epsilons: Vec<StateID>,
    /// The accept value reached by following this state, if any.
    accept: Option<M>,
}

impl<M> Default for NfaState<M> {
    fn default() -> Self {
        Self {
            transitions: Vec::new(),
            epsilons: Vec::new(),
            accept: None,
        }
    }
}

/// An append-only NFA. States are never removed once added.
#[derive(Debug, Clone, Default)]
pub(crate) struct Nfa<M> {
    states: Vec<NfaState<M>>,
}

impl<M: Clone> Nfa<M> {
    pub(crate) fn new() -> Self {
        Self { states: Vec::new() }
    }

    pub(crate) fn add_state(&mut self, accept: Option<M>) -> StateID {
        let id = StateID::new(self.states.len() as u32);
        self.states.push(NfaState {
            accept,
            ..Default::default()
        });
        id
    }

    pub(crate) fn add_transition(&mut self, from: StateID, to: StateID, first: u16, last: u16) {
        debug_assert!(first <= last);
        self.states[from].transitions.push((first, last, to));
    }

    pub(crate) fn add_epsilon(&mut self, from: StateID, to: StateID) {
        if from == to {
            return;
        }
        let eps = &mut self.states[from].epsilons;
        if !eps.contains(&to) {
            eps.push(to);
        }
    }

    pub(crate) fn accept_of(&self, id: StateID) -> Option<&M> {
        self.states[id].accept.as_ref()
    }

    pub(crate) fn transitions_of(&self, id: StateID) -> &[(u16, u16, StateID)] {
        &self.states[id].transitions
    }

    /// The epsilon-closure of a single state: `{id}` plus everything reachable purely by
    /// epsilon transitions, sorted and deduplicated.
    pub(crate) fn epsilon_closure(&self, id: StateID) -> Vec<StateID> {
        self.epsilon_closure_set(&[id])
    }

    /// The epsilon-closure of a set of states, sorted and deduplicated.
    pub(crate) fn epsilon_closure_set(&self, seeds: &[StateID]) -> Vec<StateID> {
        let mut seen: Vec<StateID> = seeds.to_vec();
        let mut stack: Vec<StateID> = seeds.to_vec();
        while let Some(s) = stack.pop() {
            for &next in &self.states[s].epsilons {
                if !seen.contains(&next) {
                    seen.push(next);
                    stack.push(next);
                }
            }
        }
        seen.sort_unstable();
        seen
    }

    #[cfg(test)]
    pub(crate) fn state_count(&self) -> usize {
        self.states.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{empty, literal, maybe, maybe_repeat, repeat};

    fn emit(pattern: &crate::pattern::Pattern) -> (Nfa<u32>, StateID, StateID) {
        let mut nfa: Nfa<u32> = Nfa::new();
        let target = nfa.add_state(Some(1));
        let entry = pattern.emit_into_nfa(&mut nfa, target);
        (nfa, entry, target)
    }

    #[test]
    fn literal_emits_one_state_per_char() {
        let (nfa, entry, target) = emit(&literal("ab"));
        // two chars -> two fresh states plus the pre-existing target.
        assert_eq!(nfa.state_count(), 3);
        assert_ne!(entry, target);
    }

    #[test]
    fn empty_literal_returns_target_directly() {
        let (nfa, entry, target) = emit(&literal(""));
        assert_eq!(entry, target);
        assert_eq!(nfa.state_count(), 1);
    }

    #[test]
    fn repeat_allows_zero_iterations_only_when_star() {
        let (nfa, entry, target) = emit(&maybe_repeat(literal("a")));
        // entry should reach target via epsilon without consuming input.
        let closure = nfa.epsilon_closure(entry);
        assert!(closure.contains(&target) || nfa.transitions_of(entry).is_empty());
        let (_, plus_entry, plus_target) = emit(&repeat(literal("a")));
        assert_ne!(plus_entry, plus_target);
    }

    #[test]
    fn optional_of_empty_pattern_collapses() {
        let (_, entry, target) = emit(&maybe(empty()));
        assert_eq!(entry, target);
    }
}
