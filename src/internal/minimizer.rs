//! Hopcroft-style partition refinement: produces the DFA with the minimum number of states
//! equivalent to a raw DFA, preserving a distinct start state per input language.

use rustc_hash::FxHashMap;

use super::ids::{AcceptID, StateID};
use super::subset::RawDfa;

/// A minimized DFA: same shape as a raw DFA, with no two Myhill-Nerode equivalent states.
#[derive(Debug, Clone)]
pub(crate) struct MinimizedDfa<M> {
    pub(crate) states: Vec<MinimizedState>,
    pub(crate) accept_sets: Vec<M>,
    pub(crate) starts: Vec<StateID>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MinimizedState {
    pub(crate) transitions: Vec<(u16, u16, StateID)>,
    pub(crate) accept: Option<AcceptID>,
}

/// A state's splitting signature: its accept class plus, for every outgoing range, the
/// partition-group index its target currently lives in. Two states with equal signatures
/// are indistinguishable in the current partition.
type Signature = (Option<AcceptID>, Vec<(u16, u16, usize)>);

pub(crate) fn minimize<M: Clone>(raw: &RawDfa<M>) -> MinimizedDfa<M> {
    let start_language: FxHashMap<StateID, usize> = raw
        .starts
        .iter()
        .enumerate()
        .map(|(lang, &s)| (s, lang))
        .collect();

    // Initial partition: group by (accept, start-language-tag). A non-start state's tag is
    // `None`, so it can merge with any other non-start state sharing its accept value; a
    // start state only merges with other states tagged for the *same* language.
    let mut groups: FxHashMap<(Option<AcceptID>, Option<usize>), Vec<StateID>> =
        FxHashMap::default();
    for (idx, state) in raw.states.iter().enumerate() {
        let id = StateID::new(idx as u32);
        let tag = start_language.get(&id).copied();
        groups.entry((state.accept, tag)).or_default().push(id);
    }
    let mut partition: Vec<Vec<StateID>> = groups.into_values().collect();
    // Deterministic starting order: by the smallest member id.
    partition.sort_by_key(|g| g.iter().min().copied().unwrap());

    loop {
        let state_to_group = index_groups(&partition);
        let mut new_partition: Vec<Vec<StateID>> = Vec::with_capacity(partition.len());
        for group in &partition {
            new_partition.extend(split_group(raw, group, &state_to_group));
        }
        if new_partition.len() == partition.len() {
            break;
        }
        partition = new_partition;
    }

    build_output(raw, &partition)
}

fn index_groups(partition: &[Vec<StateID>]) -> FxHashMap<StateID, usize> {
    let mut map = FxHashMap::default();
    for (idx, group) in partition.iter().enumerate() {
        for &s in group {
            map.insert(s, idx);
        }
    }
    map
}

fn signature_of<M>(
    raw: &RawDfa<M>,
    state: StateID,
    state_to_group: &FxHashMap<StateID, usize>,
) -> Signature {
    let s = &raw.states[state];
    let ranges = s
        .transitions
        .iter()
        .map(|&(first, last, target)| (first, last, state_to_group[&target]))
        .collect();
    (s.accept, ranges)
}

fn split_group<M>(
    raw: &RawDfa<M>,
    group: &[StateID],
    state_to_group: &FxHashMap<StateID, usize>,
) -> Vec<Vec<StateID>> {
    let mut by_signature: Vec<(Signature, Vec<StateID>)> = Vec::new();
    for &s in group {
        let sig = signature_of(raw, s, state_to_group);
        if let Some(entry) = by_signature.iter_mut().find(|(k, _)| *k == sig) {
            entry.1.push(s);
        } else {
            by_signature.push((sig, vec![s]));
        }
    }
    by_signature.into_iter().map(|(_, v)| v).collect()
}

fn build_output<M: Clone>(raw: &RawDfa<M>, partition: &[Vec<StateID>]) -> MinimizedDfa<M> {
    let state_to_group = index_groups(partition);
    let mut states = Vec::with_capacity(partition.len());
    for group in partition {
        let rep = group[0];
        let rep_state = &raw.states[rep];
        let transitions = rep_state
            .transitions
            .iter()
            .map(|&(first, last, target)| (first, last, StateID::new(state_to_group[&target] as u32)))
            .collect();
        states.push(MinimizedState {
            transitions,
            accept: rep_state.accept,
        });
    }
    let starts = raw
        .starts
        .iter()
        .map(|s| StateID::new(state_to_group[s] as u32))
        .collect();
    MinimizedDfa {
        states,
        accept_sets: raw.accept_sets.clone(),
        starts,
    }
}
