//! A build-cache adapter: digest a set of pattern/language/resolver inputs and skip the whole
//! compile pipeline when an equivalent build has already been persisted.
//!
//! Requires the `serde` feature, since digesting needs to serialize the pattern algebra and a
//! cache entry needs to (de)serialize the resulting [`Dfa`].

#![cfg(feature = "serde")]

use std::collections::BTreeSet;
use std::hash::Hash;

use data_encoding::BASE32_NOPAD;
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::builder::Builder;
use crate::dfa::Dfa;
use crate::errors::Result;
use crate::pattern::Pattern;
use crate::resolver::AmbiguityResolver;

/// A pluggable store for compiled DFAs, keyed by the digest computed from a build request.
///
/// Implementations may back this with a filesystem directory, an object store, or (in tests)
/// memory. I/O failures are not fatal: callers log them and fall back to a fresh build.
pub trait BuildCache<M> {
    /// Looks up a previously cached build by `digest`.
    fn get(&self, digest: &str) -> std::result::Result<Option<Dfa<M>>, String>;

    /// Stores `dfa` under `digest`.
    fn put(&self, digest: &str, dfa: &Dfa<M>) -> std::result::Result<(), String>;
}

/// Computes a stable digest over a build request: the number of languages, then, for each
/// pattern in insertion order, its serialized form and a bitmap of which languages select it,
/// then each language's accept values, and finally the resolver's identity.
///
/// Two calls with equal `patterns`, equal `languages` (including order), and resolvers sharing
/// a `cache_key` always produce the same digest; the digest changes if any of those change.
pub fn digest<M: Serialize + Ord>(
    patterns: &[(Pattern, M)],
    languages: &[BTreeSet<M>],
    resolver_key: &str,
) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(languages.len() as u64).to_le_bytes());

    for (pattern, accept) in patterns {
        let membership: Vec<u8> = languages
            .iter()
            .map(|language| language.contains(accept) as u8)
            .collect();
        hash_bincode(&mut hasher, pattern);
        hasher.update(&membership);
        hash_bincode(&mut hasher, accept);
    }

    for language in languages {
        hasher.update(&(language.len() as u64).to_le_bytes());
        for accept in language {
            hash_bincode(&mut hasher, accept);
        }
    }

    hasher.update(resolver_key.as_bytes());
    BASE32_NOPAD.encode(hasher.finalize().as_bytes())
}

fn hash_bincode<T: Serialize>(hasher: &mut blake3::Hasher, value: &T) {
    let bytes = bincode::serialize(value).expect("pattern algebra and accept values serialize");
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(&bytes);
}

impl<M> Builder<M>
where
    M: Clone + Eq + Ord + Hash + std::fmt::Debug + Serialize + DeserializeOwned,
{
    /// Like [`Builder::build_many`], but consults `cache` first and populates it on a miss.
    /// A cache read or write failure is logged as a warning and never fails the build; only
    /// the underlying compile can return `Err`.
    pub fn build_many_cached<C: BuildCache<M>>(
        &self,
        languages: &[BTreeSet<M>],
        resolver: &dyn AmbiguityResolver<M>,
        cache: &C,
    ) -> Result<Dfa<M>> {
        let key = digest(self.patterns(), languages, resolver.cache_key());

        match cache.get(&key) {
            Ok(Some(dfa)) => return Ok(dfa),
            Ok(None) => {}
            Err(e) => warn!("build cache read failed for {key}: {e}"),
        }

        let dfa = self.build_many(languages, resolver)?;
        if let Err(e) = cache.put(&key, &dfa) {
            warn!("build cache write failed for {key}: {e}");
        }
        Ok(dfa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::literal;
    use crate::persist::{from_bytes, to_bytes};
    use crate::resolver::NullResolver;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// An in-process cache for tests, storing the persisted byte form the way a real
    /// filesystem- or object-store-backed cache would.
    #[derive(Default)]
    struct MemCache {
        entries: RefCell<HashMap<String, Vec<u8>>>,
    }

    impl<M: Serialize + DeserializeOwned> BuildCache<M> for MemCache {
        fn get(&self, digest: &str) -> std::result::Result<Option<Dfa<M>>, String> {
            match self.entries.borrow().get(digest) {
                Some(bytes) => from_bytes(bytes).map(Some).map_err(|e| e.to_string()),
                None => Ok(None),
            }
        }

        fn put(&self, digest: &str, dfa: &Dfa<M>) -> std::result::Result<(), String> {
            self.entries
                .borrow_mut()
                .insert(digest.to_string(), to_bytes(dfa));
            Ok(())
        }
    }

    #[test]
    fn digest_is_stable_across_equal_requests() {
        let patterns = vec![(literal("abc"), 1u32)];
        let languages: Vec<BTreeSet<u32>> = vec![[1].into_iter().collect()];
        let a = digest(&patterns, &languages, "null");
        let b = digest(&patterns, &languages, "null");
        assert_eq!(a, b);
    }

    #[test]
    fn digest_changes_with_the_resolver_key() {
        let patterns = vec![(literal("abc"), 1u32)];
        let languages: Vec<BTreeSet<u32>> = vec![[1].into_iter().collect()];
        let a = digest(&patterns, &languages, "null");
        let b = digest(&patterns, &languages, "first-wins");
        assert_ne!(a, b);
    }

    #[test]
    fn cached_build_populates_and_then_hits_the_cache() {
        let mut builder: Builder<u32> = Builder::new();
        builder.add_pattern(literal("ab"), 1);
        let language: BTreeSet<u32> = [1].into_iter().collect();
        let cache = MemCache::default();

        let first = builder
            .build_many_cached(std::slice::from_ref(&language), &NullResolver, &cache)
            .unwrap();
        assert_eq!(cache.entries.borrow().len(), 1);

        let second = builder
            .build_many_cached(std::slice::from_ref(&language), &NullResolver, &cache)
            .unwrap();
        assert_eq!(first.state_count(), second.state_count());
        assert_eq!(cache.entries.borrow().len(), 1);
    }
}
