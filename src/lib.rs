#![forbid(missing_docs)]
//! # `dfalex`
//! `dfalex` compiles sets of patterns into deterministic finite automata and scans strings for
//! the longest matching prefix at each position, the way a lexer generator does, but usable
//! directly at runtime without a code-generation step.
//!
//! A [`Builder`] accumulates `(pattern, accept_value)` pairs, then [`Builder::build`] or
//! [`Builder::build_many`] compiles them into a [`Dfa`]. A [`Scanner`] walks the compiled DFA
//! over a source string; [`replace::find_and_replace`] turns a scanner into a whole-string
//! rewrite pass.

/// Module with the public builder API.
mod builder;
pub use builder::Builder;

/// Module with the build-cache adapter (requires the `serde` feature).
#[cfg(feature = "serde")]
mod cache;
#[cfg(feature = "serde")]
pub use cache::{digest, BuildCache};

/// Module with the compiled `Dfa` and `State` types.
mod dfa;
pub use dfa::{Dfa, State};

/// Module with error definitions.
mod errors;
pub use errors::{DfalexError, DfalexErrorKind, Result};

/// The module with internal implementation details: the NFA graph, subset construction,
/// minimization, the packed runtime representation, and the scan engine.
mod internal;

/// Module that provides the pattern algebra.
mod pattern;
pub use pattern::{
    any_char_in, any_of, empty, literal, literal_ignoring_case, maybe, maybe_repeat, range,
    repeat, Pattern, MAX_CHAR,
};

/// Module with DFA persistence to and from a portable byte stream (requires the `serde`
/// feature).
#[cfg(feature = "serde")]
mod persist;
#[cfg(feature = "serde")]
pub use persist::{from_bytes, to_bytes};

/// Module that replays a scanner's matches through a rewrite callback.
mod replace;
pub use replace::{find_and_replace, Appendable};

/// Module with ambiguity resolvers.
mod resolver;
pub use resolver::{AmbiguityResolver, FnResolver, NullResolver};

/// Module with the longest-match scan engine.
mod scanner;
pub use scanner::{FindMatches, Scanner};

/// Module that provides the `Span` type.
mod span;
pub use span::Span;
