//! Change-callback bookkeeping for an object map.
//!
//! The registry keeps two independent tables:
//!
//! - **scoped** listeners fire for one exact `(key, variant)` address;
//! - **global** listeners fire for every variant change under a key, in
//!   registration order, after the scoped listeners.
//!
//! Every registration gets a fresh [`RegistrationId`] and the caller receives
//! a handle carrying it. Removal goes through the handle, so a listener the
//! map wrapped (to join the delivered value first) is removed exactly like an
//! unwrapped one: the handle names the registration, not the closure.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use omap_types::VariantTag;
use tracing::trace;

static NEXT_REGISTRATION: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of one callback registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationId(u64);

impl RegistrationId {
    fn next() -> Self {
        Self(NEXT_REGISTRATION.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw identifier.
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Handle to a callback registered for one `(key, variant)` address.
///
/// Dropping the handle does not unregister the callback; it stays installed
/// until the map is dropped.
#[must_use = "the handle is the only way to remove the callback"]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScopedHandle<K> {
    id: RegistrationId,
    key: K,
    variant: VariantTag,
}

impl<K> ScopedHandle<K> {
    pub fn id(&self) -> RegistrationId {
        self.id
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn variant(&self) -> &VariantTag {
        &self.variant
    }
}

/// Handle to a callback registered for every variant under one key.
#[must_use = "the handle is the only way to remove the callback"]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GlobalHandle<K> {
    id: RegistrationId,
    key: K,
}

impl<K> GlobalHandle<K> {
    pub fn id(&self) -> RegistrationId {
        self.id
    }

    pub fn key(&self) -> &K {
        &self.key
    }
}

/// What a listener sees when a value changes.
pub(crate) struct Delivery<'a, V> {
    /// The variant that changed.
    pub variant: &'a VariantTag,
    /// The value now stored, or `None` after a removal.
    pub value: Option<&'a V>,
    /// The dynamic-variant value currently stored under the same key.
    pub generic: Option<&'a V>,
}

pub(crate) type Listener<V> = Box<dyn FnMut(&Delivery<'_, V>)>;

type ScopedTable<K, V> = HashMap<K, HashMap<VariantTag, HashMap<RegistrationId, Listener<V>>>>;

pub(crate) struct CallbackRegistry<K, V> {
    scoped: ScopedTable<K, V>,
    global: HashMap<K, Vec<(RegistrationId, Listener<V>)>>,
}

impl<K, V> CallbackRegistry<K, V>
where
    K: Eq + Hash + Clone,
{
    pub(crate) fn new() -> Self {
        Self {
            scoped: HashMap::new(),
            global: HashMap::new(),
        }
    }

    pub(crate) fn add_scoped(
        &mut self,
        key: K,
        variant: VariantTag,
        listener: Listener<V>,
    ) -> ScopedHandle<K> {
        let id = RegistrationId::next();
        self.scoped
            .entry(key.clone())
            .or_default()
            .entry(variant.clone())
            .or_default()
            .insert(id, listener);
        ScopedHandle { id, key, variant }
    }

    pub(crate) fn remove_scoped(&mut self, handle: &ScopedHandle<K>) -> bool {
        let Some(by_variant) = self.scoped.get_mut(&handle.key) else {
            return false;
        };
        let Some(listeners) = by_variant.get_mut(&handle.variant) else {
            return false;
        };
        let removed = listeners.remove(&handle.id).is_some();
        if listeners.is_empty() {
            by_variant.remove(&handle.variant);
        }
        if by_variant.is_empty() {
            self.scoped.remove(&handle.key);
        }
        removed
    }

    pub(crate) fn add_global(&mut self, key: K, listener: Listener<V>) -> GlobalHandle<K> {
        let id = RegistrationId::next();
        self.global
            .entry(key.clone())
            .or_default()
            .push((id, listener));
        GlobalHandle { id, key }
    }

    pub(crate) fn remove_global(&mut self, handle: &GlobalHandle<K>) -> bool {
        let Some(listeners) = self.global.get_mut(&handle.key) else {
            return false;
        };
        let Some(pos) = listeners.iter().position(|(id, _)| *id == handle.id) else {
            return false;
        };
        // `remove`, not `swap_remove`: global delivery follows registration order.
        listeners.remove(pos);
        if listeners.is_empty() {
            self.global.remove(&handle.key);
        }
        true
    }

    /// Invoke every listener interested in a change under `key`.
    ///
    /// Scoped listeners run first, in no particular order, then global
    /// listeners in registration order. A panicking listener unwinds through
    /// here and the remaining listeners are skipped. Returns the number of
    /// listeners invoked.
    pub(crate) fn deliver(&mut self, key: &K, change: &Delivery<'_, V>) -> usize {
        let mut delivered = 0;
        if let Some(listeners) = self
            .scoped
            .get_mut(key)
            .and_then(|by_variant| by_variant.get_mut(change.variant))
        {
            for listener in listeners.values_mut() {
                listener(change);
                delivered += 1;
            }
        }
        if let Some(listeners) = self.global.get_mut(key) {
            for (_, listener) in listeners.iter_mut() {
                listener(change);
                delivered += 1;
            }
        }
        trace!(variant = %change.variant, delivered, "change delivered");
        delivered
    }

    pub(crate) fn scoped_len(&self) -> usize {
        self.scoped
            .values()
            .flat_map(HashMap::values)
            .map(HashMap::len)
            .sum()
    }

    pub(crate) fn global_len(&self) -> usize {
        self.global.values().map(Vec::len).sum()
    }

    pub(crate) fn len(&self) -> usize {
        self.scoped_len() + self.global_len()
    }
}
