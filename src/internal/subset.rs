//! Subset construction: converts a multi-start NFA into a raw DFA over disjoint character
//! ranges, resolving per-state ambiguity among accept values.

use std::collections::BTreeSet;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use super::ids::{AcceptID, StateID};
use super::nfa::Nfa;
use crate::errors::{DfalexErrorKind, Result};
use crate::resolver::AmbiguityResolver;

/// A single raw DFA state: disjoint, ascending transitions plus an optional accept index.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawDfaState {
    pub(crate) transitions: Vec<(u16, u16, StateID)>,
    pub(crate) accept: Option<AcceptID>,
}

/// A DFA produced directly by subset construction, before minimization.
#[derive(Debug, Clone)]
pub(crate) struct RawDfa<M> {
    pub(crate) states: Vec<RawDfaState>,
    /// The deduplicated table of accept values produced by ambiguity resolution.
    pub(crate) accept_sets: Vec<M>,
    /// One start state index per input language, in order.
    pub(crate) starts: Vec<StateID>,
}

fn intern_accept<M: Clone + Eq>(table: &mut Vec<M>, value: M) -> AcceptID {
    if let Some(pos) = table.iter().position(|v| *v == value) {
        return AcceptID::new(pos as u32);
    }
    table.push(value);
    AcceptID::new((table.len() - 1) as u32)
}

fn intern_set(
    map: &mut FxHashMap<Vec<StateID>, StateID>,
    sets: &mut Vec<Vec<StateID>>,
    mut set: Vec<StateID>,
) -> StateID {
    set.sort_unstable();
    set.dedup();
    if let Some(&id) = map.get(&set) {
        return id;
    }
    let id = StateID::new(sets.len() as u32);
    map.insert(set.clone(), id);
    sets.push(set);
    id
}

/// Builds a raw DFA from `nfa` with one start state per entry of `starts`, resolving any
/// per-state ambiguity among accept values with `resolver`.
pub(crate) fn build_raw_dfa<M>(
    nfa: &Nfa<M>,
    starts: &[StateID],
    resolver: &dyn AmbiguityResolver<M>,
) -> Result<RawDfa<M>>
where
    M: Clone + Eq + Ord + Hash + std::fmt::Debug,
{
    let mut state_for_set: FxHashMap<Vec<StateID>, StateID> = FxHashMap::default();
    let mut sets: Vec<Vec<StateID>> = Vec::new();
    let mut dfa_starts = Vec::with_capacity(starts.len());

    for &s in starts {
        let closure = nfa.epsilon_closure(s);
        let id = intern_set(&mut state_for_set, &mut sets, closure);
        dfa_starts.push(id);
    }

    let mut accept_sets: Vec<M> = Vec::new();
    let mut raw_states: Vec<RawDfaState> = Vec::new();
    let mut processed = 0usize;

    while processed < sets.len() {
        let set = sets[processed].clone();

        let all_transitions: Vec<(u16, u16, StateID)> = set
            .iter()
            .flat_map(|&s| nfa.transitions_of(s).iter().copied())
            .collect();

        let mut boundaries: BTreeSet<u32> = BTreeSet::new();
        for &(first, last, _) in &all_transitions {
            boundaries.insert(first as u32);
            boundaries.insert(last as u32 + 1);
        }
        let boundaries: Vec<u32> = boundaries.into_iter().collect();

        let mut dfa_transitions: Vec<(u16, u16, StateID)> = Vec::new();
        for w in boundaries.windows(2) {
            let lo = w[0];
            let hi = w[1] - 1;
            let mut targets: Vec<StateID> = Vec::new();
            for &(first, last, target) in &all_transitions {
                if first as u32 <= lo && hi <= last as u32 {
                    for closed in nfa.epsilon_closure(target) {
                        if !targets.contains(&closed) {
                            targets.push(closed);
                        }
                    }
                }
            }
            if targets.is_empty() {
                continue;
            }
            let dfa_target = intern_set(&mut state_for_set, &mut sets, targets);
            dfa_transitions.push((lo as u16, hi as u16, dfa_target));
        }
        merge_adjacent_equal(&mut dfa_transitions);

        let accept_values: BTreeSet<M> = set
            .iter()
            .filter_map(|&s| nfa.accept_of(s).cloned())
            .collect();
        let accept = match accept_values.len() {
            0 => None,
            1 => Some(intern_accept(
                &mut accept_sets,
                accept_values.into_iter().next().unwrap(),
            )),
            _ => {
                let resolved = resolver.resolve(&accept_values).ok_or_else(|| {
                    DfalexErrorKind::AmbiguousMatch(format!("{:?}", accept_values))
                })?;
                Some(intern_accept(&mut accept_sets, resolved))
            }
        };

        raw_states.push(RawDfaState {
            transitions: dfa_transitions,
            accept,
        });
        processed += 1;
    }

    Ok(RawDfa {
        states: raw_states,
        accept_sets,
        starts: dfa_starts,
    })
}

/// Merges adjacent transitions that share a boundary and point at the same target, and
/// asserts the disjoint-and-covers-no-character-twice invariant.
fn merge_adjacent_equal(transitions: &mut Vec<(u16, u16, StateID)>) {
    transitions.sort_unstable_by_key(|&(first, _, _)| first);
    let mut merged: Vec<(u16, u16, StateID)> = Vec::with_capacity(transitions.len());
    for t in transitions.drain(..) {
        if let Some(last) = merged.last_mut() {
            if last.2 == t.2 && last.1 as u32 + 1 == t.0 as u32 {
                last.1 = t.1;
                continue;
            }
        }
        merged.push(t);
    }
    *transitions = merged;
}

impl<M> RawDfa<M> {
    /// Checks the coverage invariant: disjoint, ascending, within `[0, MAX_CHAR]`.
    #[cfg(test)]
    pub(crate) fn check_coverage_invariant(&self) {
        for state in &self.states {
            let mut prev_end: i64 = -1;
            for &(first, last, _) in &state.transitions {
                assert!(first <= last);
                assert!(last <= MAX_CHAR);
                assert!(first as i64 > prev_end, "overlapping or unsorted ranges");
                prev_end = last as i64;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::nfa::Nfa;
    use crate::pattern::literal;
    use crate::resolver::NullResolver;

    #[test]
    fn single_literal_builds_linear_dfa() {
        let mut nfa: Nfa<u32> = Nfa::new();
        let accept = nfa.add_state(Some(1));
        let entry = literal("ab").emit_into_nfa(&mut nfa, accept);
        let raw = build_raw_dfa(&nfa, &[entry], &NullResolver).unwrap();
        raw.check_coverage_invariant();
        // start -a-> mid -b-> accept : 3 reachable dfa states.
        assert_eq!(raw.states.len(), 3);
        assert_eq!(raw.starts.len(), 1);
    }

    #[test]
    fn ambiguous_accepts_fail_without_resolver() {
        let mut nfa: Nfa<u32> = Nfa::new();
        let end1 = nfa.add_state(Some(1));
        let end2 = nfa.add_state(Some(2));
        let entry1 = literal("x").emit_into_nfa(&mut nfa, end1);
        let entry2 = literal("x").emit_into_nfa(&mut nfa, end2);
        let hub = nfa.add_state(None);
        nfa.add_epsilon(hub, entry1);
        nfa.add_epsilon(hub, entry2);
        let result = build_raw_dfa(&nfa, &[hub], &NullResolver);
        assert!(result.is_err());
    }
}
