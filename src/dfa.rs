//! The public, immutable, shareable compiled DFA and its per-state handle.

use crate::internal::ids::StateID;
use crate::internal::packed::PackedState;

/// A compiled, minimized, multi-start DFA. Immutable and freely shareable across threads
/// once built.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dfa<M> {
    pub(crate) states: Vec<PackedState<M>>,
    pub(crate) starts: Vec<StateID>,
}

impl<M> Dfa<M> {
    pub(crate) fn from_parts(states: Vec<PackedState<M>>, starts: Vec<StateID>) -> Self {
        Self { states, starts }
    }

    /// The start state for `language`, the index into the list of languages this DFA was
    /// built with (see `Builder::build_many`).
    ///
    /// # Panics
    /// Panics if `language` is out of range.
    pub fn start(&self, language: usize) -> State<'_, M> {
        State {
            dfa: self,
            id: self.starts[language],
        }
    }

    /// The number of languages (distinct start states) this DFA was built with.
    pub fn language_count(&self) -> usize {
        self.starts.len()
    }

    /// The total number of states in the minimized, packed automaton.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }
}

/// A handle to one state of a [`Dfa`], borrowed from it.
#[derive(Debug, Clone, Copy)]
pub struct State<'d, M> {
    dfa: &'d Dfa<M>,
    id: StateID,
}

impl<'d, M> State<'d, M> {
    /// The dense index of this state in the DFA's serialized/packed order.
    pub fn state_number(&self) -> usize {
        self.id.as_usize()
    }

    /// Follows the transition for `c`, or returns `None` if there is none (the "dead"
    /// outcome).
    pub fn next(&self, c: u16) -> Option<State<'d, M>> {
        self.dfa.states[self.id]
            .lookup(c)
            .map(|id| State { dfa: self.dfa, id })
    }

    /// The accept value reached by having matched up to and including this state, if any.
    pub fn matched(&self) -> Option<&'d M> {
        self.dfa.states[self.id].accept.as_ref()
    }

    /// Calls `visitor` once per disjoint outgoing range, for diagnostics.
    pub fn enumerate_transitions(&self, mut visitor: impl FnMut(u16, u16, usize)) {
        for (first, last, target) in self.dfa.states[self.id].to_ranges() {
            if target != crate::internal::packed::DEAD {
                visitor(first, last, target as usize);
            }
        }
    }
}
