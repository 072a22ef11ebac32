//! An object map of [`Joinable`] values.
//!
//! Mirrors [`MergeableMap`](crate::MergeableMap) with the full
//! [`JoinPolicy`], adding [`combine`](JoinableMap::combine) next to
//! [`merge`](JoinableMap::merge).

use std::fmt;
use std::hash::Hash;

use omap_types::{JoinPolicy, Joinable, VariantTag};

use crate::config::MapConfig;
use crate::map::ObjectMap;
use crate::registry::{GlobalHandle, ScopedHandle};
use crate::traits::VariantLookup;

/// Object map whose values can be merged or combined.
pub struct JoinableMap<K, V> {
    map: ObjectMap<K, V>,
    write_policy: JoinPolicy,
    read_policy: JoinPolicy,
}

impl<K, V> JoinableMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Joinable,
{
    pub fn new() -> Self {
        Self::with_policies(JoinPolicy::Replace, JoinPolicy::Replace)
    }

    pub fn with_policies(write_policy: JoinPolicy, read_policy: JoinPolicy) -> Self {
        Self {
            map: ObjectMap::new(),
            write_policy,
            read_policy,
        }
    }

    /// Every [`MapConfig`] is valid for joinable values.
    pub fn from_config(config: &MapConfig) -> Self {
        Self {
            map: ObjectMap::from_config(config),
            write_policy: config.write_policy,
            read_policy: config.read_policy,
        }
    }

    pub fn write_policy(&self) -> JoinPolicy {
        self.write_policy
    }

    pub fn read_policy(&self) -> JoinPolicy {
        self.read_policy
    }

    pub fn as_map(&self) -> &ObjectMap<K, V> {
        &self.map
    }

    pub fn into_inner(self) -> ObjectMap<K, V> {
        self.map
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn exists(&self, key: &K, variant: &VariantTag) -> bool {
        self.map.exists(key, variant)
    }

    pub fn get(&self, key: &K, variant: &VariantTag) -> Option<&V> {
        self.map.get(key, variant)
    }

    pub fn variants(&self, key: &K) -> Vec<VariantTag> {
        self.map.variants(key)
    }

    pub fn get_joined(&self, key: &K, variant: &VariantTag) -> Option<V> {
        self.map.get_joined(key, variant, self.read_policy)
    }

    pub fn get_with(&self, key: &K, variant: &VariantTag, policy: JoinPolicy) -> Option<V> {
        self.map.get_joined(key, variant, policy)
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    pub fn add(&mut self, key: K, variant: VariantTag, value: V) -> &V {
        let policy = self.write_policy;
        self.add_with(key, variant, value, policy)
    }

    /// Dispatch to [`merge`](Self::merge), [`combine`](Self::combine) or a
    /// plain write.
    pub fn add_with(&mut self, key: K, variant: VariantTag, value: V, policy: JoinPolicy) -> &V {
        match policy {
            JoinPolicy::Replace => self.write(key, variant, value),
            JoinPolicy::Merge => self.merge(key, variant, value),
            JoinPolicy::Combine => self.combine(key, variant, value),
        }
    }

    pub fn merge(&mut self, key: K, variant: VariantTag, value: V) -> &V {
        self.map.write_joined(key, variant, value, JoinPolicy::Merge)
    }

    /// Write `value.combine(existing)`, or `value` if nothing is stored yet.
    pub fn combine(&mut self, key: K, variant: VariantTag, value: V) -> &V {
        self.map.write_joined(key, variant, value, JoinPolicy::Combine)
    }

    pub fn write(&mut self, key: K, variant: VariantTag, value: V) -> &V {
        self.map.write(key, variant, value)
    }

    pub fn remove(&mut self, key: &K, variant: &VariantTag) -> Option<V> {
        self.map.remove(key, variant)
    }

    pub fn remove_key(&mut self, key: &K) -> Vec<(VariantTag, V)> {
        self.map.remove_key(key)
    }

    // ---------------------------------------------------------------
    // Callbacks
    // ---------------------------------------------------------------

    pub fn add_change_callback<F>(
        &mut self,
        key: K,
        variant: VariantTag,
        policy: JoinPolicy,
        callback: F,
    ) -> ScopedHandle<K>
    where
        V: 'static,
        F: FnMut(Option<&V>) + 'static,
    {
        self.map.add_change_callback_joined(key, variant, policy, callback)
    }

    pub fn remove_change_callback(&mut self, handle: &ScopedHandle<K>) -> bool {
        self.map.remove_change_callback(handle)
    }

    pub fn add_global_change_callback<F>(
        &mut self,
        key: K,
        policy: JoinPolicy,
        callback: F,
    ) -> GlobalHandle<K>
    where
        V: 'static,
        F: FnMut(&VariantTag, Option<&V>) + 'static,
    {
        self.map.add_global_change_callback_joined(key, policy, callback)
    }

    pub fn remove_global_change_callback(&mut self, handle: &GlobalHandle<K>) -> bool {
        self.map.remove_global_change_callback(handle)
    }
}

impl<K, V> Default for JoinableMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Joinable,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> VariantLookup<K, V> for JoinableMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Joinable,
{
    fn exists(&self, key: &K, variant: &VariantTag) -> bool {
        self.map.exists(key, variant)
    }

    fn get(&self, key: &K, variant: &VariantTag) -> Option<&V> {
        self.map.get(key, variant)
    }

    fn variants(&self, key: &K) -> Vec<VariantTag> {
        self.map.variants(key)
    }
}

impl<K, V> fmt::Debug for JoinableMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinableMap")
            .field("map", &self.map)
            .field("write_policy", &self.write_policy)
            .field("read_policy", &self.read_policy)
            .finish()
    }
}
