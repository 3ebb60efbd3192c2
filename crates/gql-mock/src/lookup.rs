//! Finds the effective mock of a type across all mock layers, memoized per response path.

use std::collections::HashMap;

use async_graphql::PathSegment;
use parking_lot::Mutex;

use crate::{
    mocks::MockLayer,
    path::cache_key,
    value::{deep_merge, MockValue, ResolverParams},
};

/// Type mocks already resolved during one mocking call, keyed by path prefix and type name.
#[derive(Debug, Default)]
pub(crate) struct ResolutionCache {
    entries: Mutex<HashMap<String, MockValue>>,
}

impl ResolutionCache {
    /// The lock is released while `resolve` runs, so resolver functions may re-enter the cache.
    fn get_or_resolve(&self, key: &str, resolve: impl FnOnce() -> MockValue) -> MockValue {
        if let Some(value) = self.entries.lock().get(key) {
            tracing::trace!(key, "type mock cache hit");
            return value.clone();
        }

        let value = resolve();
        self.entries.lock().entry(key.to_owned()).or_insert(value).clone()
    }
}

struct Candidate<'a> {
    key: &'a str,
    mock: &'a MockValue,
    preserve_previous: bool,
}

pub(crate) struct TypeMockResolver<'a> {
    cache_key: String,
    interfaces: &'a [String],
    take_first_resolved_only: bool,
    /// Highest precedence first.
    candidates: Vec<Candidate<'a>>,
}

impl<'a> TypeMockResolver<'a> {
    /// Collects the entries of every layer keyed by `type_name` or one of `interfaces`.
    /// Returns `None` when no layer knows about the type.
    pub(crate) fn new(
        layers: impl IntoIterator<Item = &'a MockLayer>,
        path_prefix: &[PathSegment],
        type_name: &str,
        interfaces: &'a [String],
        take_first_resolved_only: bool,
    ) -> Option<Self> {
        let mut candidates = Vec::new();
        for layer in layers {
            candidates.extend(
                layer
                    .resolvers
                    .iter()
                    .filter(|(key, _)| *key == type_name || interfaces.iter().any(|name| name == *key))
                    .map(|(key, mock)| Candidate {
                        key,
                        mock,
                        preserve_previous: layer.preserve_previous,
                    }),
            );
        }

        if candidates.is_empty() {
            return None;
        }
        candidates.reverse();

        Some(Self {
            cache_key: cache_key(path_prefix, type_name),
            interfaces,
            take_first_resolved_only,
            candidates,
        })
    }

    pub(crate) fn resolve(&self, cache: &ResolutionCache, params: &ResolverParams<'_>) -> MockValue {
        cache.get_or_resolve(&self.cache_key, || self.fold(params))
    }

    fn fold(&self, params: &ResolverParams<'_>) -> MockValue {
        let mut resolved = MockValue::Undefined;

        for candidate in &self.candidates {
            if self.take_first_resolved_only && resolved.is_defined() {
                break;
            }

            let value = candidate.mock.resolve(params);
            if value.is_undefined() {
                continue;
            }

            if resolved.is_undefined() {
                resolved = value;
                continue;
            }

            let interface_match = self.interfaces.iter().any(|name| name == candidate.key);
            if !candidate.preserve_previous && !interface_match {
                break;
            }

            resolved = deep_merge(value, &resolved);
        }

        tracing::trace!(key = %self.cache_key, candidates = self.candidates.len(), "folded type mocks");
        resolved
    }
}
