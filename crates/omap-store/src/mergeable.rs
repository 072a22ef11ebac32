//! An object map of [`Mergeable`] values.
//!
//! [`MergeableMap`] layers two independent joins over an [`ObjectMap`]:
//!
//! - **write-time** joining merges an incoming value with the value already
//!   stored at the *same* `(key, variant)` address;
//! - **read-time** joining merges a stored value with the *dynamic* variant
//!   stored under the same key.
//!
//! Only [`MergePolicy`] is accepted, so a map of merge-only values cannot be
//! asked to combine.

use std::fmt;
use std::hash::Hash;

use omap_types::{MergePolicy, Mergeable, VariantTag};

use crate::config::MapConfig;
use crate::error::MapResult;
use crate::map::ObjectMap;
use crate::registry::{GlobalHandle, ScopedHandle};
use crate::traits::VariantLookup;

/// Object map whose values can be merged.
pub struct MergeableMap<K, V> {
    map: ObjectMap<K, V>,
    write_policy: MergePolicy,
    read_policy: MergePolicy,
}

impl<K, V> MergeableMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Mergeable,
{
    /// Create an empty map that replaces on write and does not join on read.
    pub fn new() -> Self {
        Self::with_policies(MergePolicy::Replace, MergePolicy::Replace)
    }

    /// Create an empty map with explicit default policies.
    pub fn with_policies(write_policy: MergePolicy, read_policy: MergePolicy) -> Self {
        Self {
            map: ObjectMap::new(),
            write_policy,
            read_policy,
        }
    }

    /// Create an empty map from configuration.
    ///
    /// Fails with [`TypeError::CombineUnsupported`](omap_types::TypeError)
    /// if either policy is `combine`.
    pub fn from_config(config: &MapConfig) -> MapResult<Self> {
        Ok(Self {
            map: ObjectMap::from_config(config),
            write_policy: MergePolicy::try_from(config.write_policy)?,
            read_policy: MergePolicy::try_from(config.read_policy)?,
        })
    }

    pub fn write_policy(&self) -> MergePolicy {
        self.write_policy
    }

    pub fn read_policy(&self) -> MergePolicy {
        self.read_policy
    }

    /// The underlying map.
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

    /// Plain lookup, no joining.
    pub fn get(&self, key: &K, variant: &VariantTag) -> Option<&V> {
        self.map.get(key, variant)
    }

    pub fn variants(&self, key: &K) -> Vec<VariantTag> {
        self.map.variants(key)
    }

    /// Lookup joined with the key's dynamic variant using the configured
    /// read policy.
    pub fn get_joined(&self, key: &K, variant: &VariantTag) -> Option<V> {
        self.map.get_joined(key, variant, self.read_policy)
    }

    /// Lookup joined with the key's dynamic variant using `policy`.
    pub fn get_with(&self, key: &K, variant: &VariantTag, policy: MergePolicy) -> Option<V> {
        self.map.get_joined(key, variant, policy)
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Write using the configured write policy.
    pub fn add(&mut self, key: K, variant: VariantTag, value: V) -> &V {
        let policy = self.write_policy;
        self.map.write_joined(key, variant, value, policy)
    }

    /// Write using `policy` against the value already stored at the same
    /// address.
    pub fn add_with(&mut self, key: K, variant: VariantTag, value: V, policy: MergePolicy) -> &V {
        self.map.write_joined(key, variant, value, policy)
    }

    /// Write `value.merge(existing)`, or `value` if nothing is stored yet.
    pub fn merge(&mut self, key: K, variant: VariantTag, value: V) -> &V {
        self.map.write_joined(key, variant, value, MergePolicy::Merge)
    }

    /// Write `value`, replacing whatever is stored.
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

    /// Register a scoped callback. With [`MergePolicy::Merge`] the delivered
    /// value is first merged with the key's dynamic value, and delivery is
    /// skipped while no dynamic value exists.
    pub fn add_change_callback<F>(
        &mut self,
        key: K,
        variant: VariantTag,
        policy: MergePolicy,
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

    /// Register a callback for every variant under `key`.
    pub fn add_global_change_callback<F>(
        &mut self,
        key: K,
        policy: MergePolicy,
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

impl<K, V> Default for MergeableMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Mergeable,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> VariantLookup<K, V> for MergeableMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Mergeable,
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

impl<K, V> fmt::Debug for MergeableMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeableMap")
            .field("map", &self.map)
            .field("write_policy", &self.write_policy)
            .field("read_policy", &self.read_policy)
            .finish()
    }
}
