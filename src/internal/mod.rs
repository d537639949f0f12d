//! Internal implementation details: the NFA graph, subset construction, minimization, the
//! packed runtime representation, the scan engine, and the search-and-replace driver.

pub(crate) mod ids;
pub(crate) mod minimizer;
pub(crate) mod nfa;
pub(crate) mod packed;
pub(crate) mod scan;
pub(crate) mod subset;
