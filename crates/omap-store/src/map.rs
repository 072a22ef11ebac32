//! The two-level object map.
//!
//! [`ObjectMap`] owns a `HashMap<K, HashMap<VariantTag, V>>` together with
//! the [`CallbackRegistry`] that observes it. Every mutation commits to the
//! map first and then delivers the change synchronously, so listeners always
//! observe the post-mutation state.
//!
//! # Invariants
//!
//! - At most one value per `(key, variant)`.
//! - A key holding no variants has no bucket.
//! - Listeners run on the mutating call's stack, before it returns.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use omap_types::{JoinStrategy, VariantTag};
use tracing::debug;

use crate::config::MapConfig;
use crate::registry::{CallbackRegistry, Delivery, GlobalHandle, Listener, ScopedHandle};
use crate::traits::VariantLookup;

/// A map from `(primary key, variant tag)` to values, with change callbacks.
///
/// Mutating operations take `&mut self`: the map is owned by one context.
/// Callers that share it must guard the whole map, registry included, with a
/// single exclusive lock held across the mutating call.
pub struct ObjectMap<K, V> {
    entries: HashMap<K, HashMap<VariantTag, V>>,
    registry: CallbackRegistry<K, V>,
}

impl<K, V> ObjectMap<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty map.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty map with room for `capacity` primary keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            registry: CallbackRegistry::new(),
        }
    }

    /// Create an empty map sized by `config`.
    pub fn from_config(config: &MapConfig) -> Self {
        Self::with_capacity(config.initial_capacity)
    }

    /// Number of primary keys holding at least one value.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map holds no values.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of stored values across all keys.
    pub fn value_count(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    /// Returns `true` if `key` holds at least one variant.
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over the primary keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// `true` iff a value is stored at exactly `(key, variant)`.
    pub fn exists(&self, key: &K, variant: &VariantTag) -> bool {
        self.entries
            .get(key)
            .is_some_and(|bucket| bucket.contains_key(variant))
    }

    /// The value stored at `(key, variant)`.
    pub fn get(&self, key: &K, variant: &VariantTag) -> Option<&V> {
        self.entries.get(key)?.get(variant)
    }

    /// The variant tags stored under `key`, in no particular order.
    pub fn variants(&self, key: &K) -> Vec<VariantTag> {
        self.entries
            .get(key)
            .map(|bucket| bucket.keys().cloned().collect())
            .unwrap_or_default()
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Store `value` at `(key, variant)`, replacing any previous value, and
    /// notify listeners. Returns the stored value.
    pub fn write(&mut self, key: K, variant: VariantTag, value: V) -> &V {
        let Self { entries, registry } = self;
        let bucket = entries.entry(key.clone()).or_default();
        let replaced = bucket.insert(variant.clone(), value).is_some();
        let bucket = &*bucket;
        let stored = &bucket[&variant];

        let delivered = registry.deliver(
            &key,
            &Delivery {
                variant: &variant,
                value: Some(stored),
                generic: bucket.get(&VariantTag::Dynamic),
            },
        );
        debug!(%variant, replaced, delivered, "value written");
        stored
    }

    /// Store `value` at `(key, variant)`, joining it with the value already
    /// stored at the same address according to `policy`.
    ///
    /// With a merge policy the stored result is `value.merge(existing)`: the
    /// incoming value's present fields win. Without an existing value this is
    /// a plain [`write`](Self::write).
    pub fn write_joined<P>(&mut self, key: K, variant: VariantTag, value: V, policy: P) -> &V
    where
        P: JoinStrategy<V>,
    {
        let (value, joined) = match self.get(&key, &variant) {
            Some(existing) if !policy.is_replace() => (policy.join(&value, existing), true),
            _ => (value, false),
        };
        debug!(%variant, %policy, joined, "joined write");
        self.write(key, variant, value)
    }

    /// Remove the value at `(key, variant)` and notify listeners with `None`.
    ///
    /// Removing the last variant of a key drops the key's bucket. Returns the
    /// removed value; a missing entry returns `None` and notifies nobody.
    pub fn remove(&mut self, key: &K, variant: &VariantTag) -> Option<V> {
        let Self { entries, registry } = self;
        let bucket = entries.get_mut(key)?;
        let removed = bucket.remove(variant)?;
        let pruned = bucket.is_empty();
        if pruned {
            entries.remove(key);
        }

        let delivered = registry.deliver(
            key,
            &Delivery {
                variant,
                value: None,
                generic: entries
                    .get(key)
                    .and_then(|bucket| bucket.get(&VariantTag::Dynamic)),
            },
        );
        debug!(%variant, pruned, delivered, "value removed");
        Some(removed)
    }

    /// Remove every variant stored under `key`.
    ///
    /// Listeners are notified once per removed variant, after the whole
    /// bucket is gone.
    pub fn remove_key(&mut self, key: &K) -> Vec<(VariantTag, V)> {
        let Some(bucket) = self.entries.remove(key) else {
            return Vec::new();
        };
        let removed: Vec<(VariantTag, V)> = bucket.into_iter().collect();
        for (variant, _) in &removed {
            self.registry.deliver(
                key,
                &Delivery {
                    variant,
                    value: None,
                    generic: None,
                },
            );
        }
        debug!(removed = removed.len(), "key removed");
        removed
    }

    /// Look up `(key, variant)` and join the result with the dynamic variant
    /// stored under the same key.
    ///
    /// The join is skipped for a replace policy, when `variant` is itself
    /// dynamic, or when the key has no dynamic value.
    pub fn get_joined<P>(&self, key: &K, variant: &VariantTag, policy: P) -> Option<V>
    where
        V: Clone,
        P: JoinStrategy<V>,
    {
        let value = self.get(key, variant)?;
        if policy.is_replace() || variant.is_dynamic() {
            return Some(value.clone());
        }
        match self.get(key, &VariantTag::Dynamic) {
            Some(generic) => Some(policy.join(value, generic)),
            None => Some(value.clone()),
        }
    }

    // ---------------------------------------------------------------
    // Callbacks
    // ---------------------------------------------------------------

    /// Call `callback` with the new value whenever `(key, variant)` is
    /// written, and with `None` when it is removed.
    pub fn add_change_callback<F>(
        &mut self,
        key: K,
        variant: VariantTag,
        mut callback: F,
    ) -> ScopedHandle<K>
    where
        V: 'static,
        F: FnMut(Option<&V>) + 'static,
    {
        let listener: Listener<V> =
            Box::new(move |change: &Delivery<'_, V>| callback(change.value));
        let handle = self.registry.add_scoped(key, variant, listener);
        debug!(id = handle.id().get(), variant = %handle.variant(), "change callback added");
        handle
    }

    /// Like [`add_change_callback`](Self::add_change_callback), but the value
    /// is joined with the key's dynamic-variant value before delivery.
    ///
    /// If the key holds no dynamic value at delivery time the callback is not
    /// called at all, not even with the unjoined value. A removal is
    /// forwarded as `None`.
    pub fn add_change_callback_joined<P, F>(
        &mut self,
        key: K,
        variant: VariantTag,
        policy: P,
        mut callback: F,
    ) -> ScopedHandle<K>
    where
        V: 'static,
        P: JoinStrategy<V> + 'static,
        F: FnMut(Option<&V>) + 'static,
    {
        if policy.is_replace() {
            return self.add_change_callback(key, variant, callback);
        }
        let listener = joined_listener(policy, move |_: &VariantTag, value: Option<&V>| {
            callback(value)
        });
        let handle = self.registry.add_scoped(key, variant, listener);
        debug!(id = handle.id().get(), variant = %handle.variant(), %policy, "joined change callback added");
        handle
    }

    /// Remove a callback registered with either scoped registration method.
    /// Returns `false` if it was already removed.
    pub fn remove_change_callback(&mut self, handle: &ScopedHandle<K>) -> bool {
        let removed = self.registry.remove_scoped(handle);
        debug!(id = handle.id().get(), removed, "change callback removed");
        removed
    }

    /// Call `callback` with the changed variant and its new value (or `None`)
    /// on every change under `key`. Global callbacks run after the scoped
    /// ones, in registration order.
    pub fn add_global_change_callback<F>(&mut self, key: K, mut callback: F) -> GlobalHandle<K>
    where
        V: 'static,
        F: FnMut(&VariantTag, Option<&V>) + 'static,
    {
        let listener: Listener<V> = Box::new(move |change: &Delivery<'_, V>| {
            callback(change.variant, change.value)
        });
        let handle = self.registry.add_global(key, listener);
        debug!(id = handle.id().get(), "global change callback added");
        handle
    }

    /// Global counterpart of
    /// [`add_change_callback_joined`](Self::add_change_callback_joined).
    pub fn add_global_change_callback_joined<P, F>(
        &mut self,
        key: K,
        policy: P,
        callback: F,
    ) -> GlobalHandle<K>
    where
        V: 'static,
        P: JoinStrategy<V> + 'static,
        F: FnMut(&VariantTag, Option<&V>) + 'static,
    {
        if policy.is_replace() {
            return self.add_global_change_callback(key, callback);
        }
        let handle = self.registry.add_global(key, joined_listener(policy, callback));
        debug!(id = handle.id().get(), %policy, "joined global change callback added");
        handle
    }

    /// Remove a global callback. Each registration, including duplicates of
    /// the same closure, is removed through its own handle.
    pub fn remove_global_change_callback(&mut self, handle: &GlobalHandle<K>) -> bool {
        let removed = self.registry.remove_global(handle);
        debug!(id = handle.id().get(), removed, "global change callback removed");
        removed
    }

    /// Number of installed callbacks, scoped and global.
    pub fn callback_count(&self) -> usize {
        self.registry.len()
    }
}

/// Wrap `forward` so it receives values joined with the key's dynamic value.
fn joined_listener<V, P, F>(policy: P, mut forward: F) -> Listener<V>
where
    V: 'static,
    P: JoinStrategy<V> + 'static,
    F: FnMut(&VariantTag, Option<&V>) + 'static,
{
    Box::new(move |change: &Delivery<'_, V>| {
        let Some(generic) = change.generic else {
            return;
        };
        if change.variant.is_dynamic() {
            forward(change.variant, change.value);
            return;
        }
        let joined = change.value.map(|value| policy.join(value, generic));
        forward(change.variant, joined.as_ref());
    })
}

impl<K, V> Default for ObjectMap<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> VariantLookup<K, V> for ObjectMap<K, V>
where
    K: Eq + Hash + Clone,
{
    fn exists(&self, key: &K, variant: &VariantTag) -> bool {
        ObjectMap::exists(self, key, variant)
    }

    fn get(&self, key: &K, variant: &VariantTag) -> Option<&V> {
        ObjectMap::get(self, key, variant)
    }

    fn variants(&self, key: &K) -> Vec<VariantTag> {
        ObjectMap::variants(self, key)
    }
}

impl<K, V> fmt::Debug for ObjectMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectMap")
            .field("keys", &self.entries.len())
            .field(
                "values",
                &self.entries.values().map(HashMap::len).sum::<usize>(),
            )
            .finish_non_exhaustive()
    }
}
