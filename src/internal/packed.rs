//! Packed runtime state: a complete, heap-indexed in-order binary search tree over character
//! boundaries with a parallel successor array, giving O(log k) transition lookup.

use super::ids::StateID;
use super::minimizer::MinimizedDfa;
use crate::pattern::MAX_CHAR;

/// The "no transition" sentinel stored in a packed state's `targets` array.
pub(crate) const DEAD: i32 = -1;

/// A single packed DFA state.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackedState<M> {
    pub(crate) internal_nodes: Vec<u16>,
    pub(crate) targets: Vec<i32>,
    pub(crate) accept: Option<M>,
}

impl<M> PackedState<M> {
    /// Looks up the successor for character `c`, or `None` if there is no transition.
    pub(crate) fn lookup(&self, c: u16) -> Option<StateID> {
        let l = self.internal_nodes.len();
        let mut i = 0usize;
        while i < l {
            i = if c < self.internal_nodes[i] { 2 * i + 1 } else { 2 * i + 2 };
        }
        let target = self.targets[i - l];
        if target == DEAD {
            None
        } else {
            Some(StateID::new(target as u32))
        }
    }

    /// Reconstructs the original disjoint `(first, last, target)` ranges, for diagnostics.
    ///
    /// Built on top of [`PackedState::lookup`] itself (one call per gap, on a representative
    /// character) rather than walking `targets` directly, so this can never disagree with what
    /// `lookup` actually returns.
    pub(crate) fn to_ranges(&self) -> Vec<(u16, u16, i32)> {
        let boundaries = in_order_boundaries(&self.internal_nodes);
        let mut ranges = Vec::with_capacity(boundaries.len() + 1);
        let mut lo: u32 = 0;
        for &boundary in &boundaries {
            let hi = boundary as u32 - 1;
            ranges.push((lo as u16, hi as u16, self.target_at(lo as u16)));
            lo = boundary as u32;
        }
        ranges.push((lo as u16, MAX_CHAR, self.target_at(lo as u16)));
        ranges
    }

    fn target_at(&self, c: u16) -> i32 {
        self.lookup(c).map_or(DEAD, |s| s.as_usize() as i32)
    }
}

/// Standard boundary computation (`spec.md` §4.5): the sorted list of boundary characters
/// separating runs of transitions with distinct successors.
fn compute_boundaries_and_slots(transitions: &[(u16, u16, StateID)]) -> (Vec<u16>, Vec<i32>) {
    if transitions.is_empty() {
        return (Vec::new(), vec![DEAD]);
    }
    let mut boundaries: Vec<u16> = Vec::new();
    let mut slots: Vec<i32> = Vec::new();

    let first = transitions[0];
    if first.0 > 0 {
        boundaries.push(first.0);
        slots.push(DEAD);
    }
    slots.push(first.2.as_usize() as i32);

    for pair in transitions.windows(2) {
        let (_, last1, target1) = pair[0];
        let (first2, _, target2) = pair[1];
        if first2 as u32 > last1 as u32 + 1 {
            boundaries.push(last1 + 1);
            slots.push(DEAD);
            boundaries.push(first2);
            slots.push(target2.as_usize() as i32);
        } else if target1 != target2 {
            boundaries.push(first2);
            slots.push(target2.as_usize() as i32);
        }
        // else: adjacent with an equal target — the caller already merged these.
    }

    let last = transitions.last().unwrap();
    if last.1 < MAX_CHAR {
        boundaries.push(last.1 + 1);
        slots.push(DEAD);
    }

    (boundaries, slots)
}

/// Builds the heap-packed `internal_nodes` array together with a `targets` array permuted to
/// match, by a single in-order walk of the tree shape that visits boundary keys and leaf
/// targets in lockstep.
///
/// A heap-addressed complete binary tree over `n` internal nodes always has exactly `n + 1`
/// "fall-off" leaf positions, but — except when `n + 1` is a power of two — their left-to-right
/// (in-order, i.e. ascending-gap-rank) order does *not* match their ascending array index order.
/// Filling `internal_nodes` by sorted rank alone (as if leaves fell out left-to-right by index)
/// silently mismatches `lookup`'s fall-off arithmetic for any other `n`. Walking both arrays
/// together in true in-order sequence sidesteps that mismatch instead of special-casing it.
fn build_tree(boundaries: &[u16], slots: &[i32]) -> (Vec<u16>, Vec<i32>) {
    let n = boundaries.len();
    if n == 0 {
        return (Vec::new(), vec![slots[0]]);
    }
    let mut nodes = vec![0u16; n];
    let mut targets = vec![DEAD; n + 1];
    let mut key_cursor = 0usize;
    let mut slot_cursor = 0usize;
    fill_tree(
        n,
        0,
        boundaries,
        slots,
        &mut key_cursor,
        &mut slot_cursor,
        &mut nodes,
        &mut targets,
    );
    (nodes, targets)
}

#[allow(clippy::too_many_arguments)]
fn fill_tree(
    n: usize,
    node: usize,
    boundaries: &[u16],
    slots: &[i32],
    key_cursor: &mut usize,
    slot_cursor: &mut usize,
    nodes: &mut [u16],
    targets: &mut [i32],
) {
    let left = 2 * node + 1;
    if left >= n {
        targets[left - n] = slots[*slot_cursor];
        *slot_cursor += 1;
    } else {
        fill_tree(n, left, boundaries, slots, key_cursor, slot_cursor, nodes, targets);
    }

    nodes[node] = boundaries[*key_cursor];
    *key_cursor += 1;

    let right = 2 * node + 2;
    if right >= n {
        targets[right - n] = slots[*slot_cursor];
        *slot_cursor += 1;
    } else {
        fill_tree(n, right, boundaries, slots, key_cursor, slot_cursor, nodes, targets);
    }
}

/// The sorted boundary list implied by a heap-packed `internal_nodes` array (its in-order
/// traversal).
fn in_order_boundaries(heap: &[u16]) -> Vec<u16> {
    let n = heap.len();
    let mut out = Vec::with_capacity(n);
    walk_in_order(n, 0, heap, &mut out);
    out
}

fn walk_in_order(n: usize, node: usize, heap: &[u16], out: &mut Vec<u16>) {
    if node >= n {
        return;
    }
    walk_in_order(n, 2 * node + 1, heap, out);
    out.push(heap[node]);
    walk_in_order(n, 2 * node + 2, heap, out);
}

fn pack_state<M: Clone>(transitions: &[(u16, u16, StateID)], accept: Option<M>) -> PackedState<M> {
    let (boundaries, slots) = compute_boundaries_and_slots(transitions);
    let (internal_nodes, targets) = build_tree(&boundaries, &slots);
    PackedState {
        internal_nodes,
        targets,
        accept,
    }
}

/// Packs every state of a minimized DFA, resolving accept indices to their accept values.
pub(crate) fn pack_dfa<M: Clone>(min: &MinimizedDfa<M>) -> (Vec<PackedState<M>>, Vec<StateID>) {
    let states = min
        .states
        .iter()
        .map(|s| {
            let accept = s.accept.map(|id| min.accept_sets[id.as_usize()].clone());
            pack_state(&s.transitions, accept)
        })
        .collect();
    (states, min.starts.clone())
}
