//! The non-matching memo: a small bounded cache of `(position, state)` pairs known not to
//! improve on the current search, used to short-circuit repeated scans over non-accepting
//! runs of input.

use std::collections::VecDeque;

use super::ids::StateID;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    pos: usize,
    state: StateID,
}

/// A fixed-capacity ring of `(position, state)` pairs. Deterministic scanning means reaching
/// the same state at the same absolute input position is equivalent to any earlier reach: if
/// that earlier attempt failed to improve the match, this one will too.
#[derive(Debug, Clone)]
pub(crate) struct NonMatchingMemo {
    entries: VecDeque<Entry>,
}

impl NonMatchingMemo {
    const CAPACITY: usize = 128;

    pub(crate) fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(Self::CAPACITY),
        }
    }

    pub(crate) fn contains(&self, pos: usize, state: StateID) -> bool {
        self.entries.iter().any(|e| e.pos == pos && e.state == state)
    }

    pub(crate) fn record(&mut self, pos: usize, state: StateID) {
        if self.contains(pos, state) {
            return;
        }
        if self.entries.len() >= Self::CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(Entry { pos, state });
    }
}

impl Default for NonMatchingMemo {
    fn default() -> Self {
        Self::new()
    }
}
