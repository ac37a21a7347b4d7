//! Memoized accessor discovery keyed by (type, field name).
//!
//! Discovery is a pure function of the type's accessor table and the field
//! name, so two threads racing on the same key compute the same answer. The
//! first insert wins and is never replaced; misses are cached like hits.

use std::any::TypeId;
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

use dashmap::DashMap;
use heck::ToSnakeCase;

use super::{FieldValue, Reflect};

/// A resolved read capability: a slot in a type's accessor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accessor {
    slot: usize,
    name: &'static str,
}

impl Accessor {
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Name of the getter that answers the field.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Read the field from `target`. A panicking getter counts as no value.
    pub fn invoke<'a>(&self, target: &'a dyn Reflect) -> Option<FieldValue<'a>> {
        match panic::catch_unwind(AssertUnwindSafe(|| target.invoke(self.slot))) {
            Ok(value) => value,
            Err(_) => {
                tracing::debug!(
                    type_name = target.type_name(),
                    accessor = self.name,
                    "Accessor panicked, treating as absent"
                );
                None
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct AccessorCache {
    entries: DashMap<(TypeId, String), Option<Accessor>>,
}

static GLOBAL: OnceLock<AccessorCache> = OnceLock::new();

impl AccessorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache shared by every extractor built with defaults.
    pub fn global() -> &'static AccessorCache {
        GLOBAL.get_or_init(AccessorCache::new)
    }

    /// Resolve `field` on the runtime type of `target`, or `None` if the type has no such accessor.
    pub fn resolve(&self, target: &dyn Reflect, field: &str) -> Option<Accessor> {
        let key = (target.type_key(), field.to_string());
        if let Some(entry) = self.entries.get(&key) {
            return *entry;
        }

        let discovered = discover(target.accessors(), field);
        if discovered.is_none() {
            tracing::debug!(
                type_name = target.type_name(),
                field,
                "No accessor found, caching miss"
            );
        }

        *self.entries.entry(key).or_insert(discovered)
    }

    pub fn contains(&self, type_key: TypeId, field: &str) -> bool {
        self.entries.contains_key(&(type_key, field.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Getter lookup by convention: exact name, then snake_case, then `get_` + snake_case.
fn discover(accessors: &'static [&'static str], field: &str) -> Option<Accessor> {
    if field.is_empty() {
        return None;
    }
    let snake = field.to_snake_case();
    let prefixed = format!("get_{snake}");

    [field, snake.as_str(), prefixed.as_str()]
        .into_iter()
        .find_map(|candidate| {
            accessors
                .iter()
                .position(|name| *name == candidate)
                .map(|slot| Accessor {
                    slot,
                    name: accessors[slot],
                })
        })
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
