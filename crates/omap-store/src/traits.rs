use omap_types::VariantTag;

/// Read-only view of a two-level (key, variant) map.
///
/// This is the whole contract offered to consumers that search the map, for
/// example a walker that visits a chain of keys and asks each one for the
/// first variant it holds. Implementations must not have side effects.
pub trait VariantLookup<K, V> {
    /// `true` iff a value is stored at exactly `(key, variant)`.
    fn exists(&self, key: &K, variant: &VariantTag) -> bool;

    /// The value stored at `(key, variant)`, if any.
    fn get(&self, key: &K, variant: &VariantTag) -> Option<&V>;

    /// The variant tags currently stored under `key`, in no particular
    /// order. Empty if the key holds nothing.
    fn variants(&self, key: &K) -> Vec<VariantTag>;

    /// `true` if any variant is stored under `key`.
    fn has_variants(&self, key: &K) -> bool {
        !self.variants(key).is_empty()
    }
}
