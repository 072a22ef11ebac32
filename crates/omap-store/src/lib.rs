//! Two-level object map with join policies and change callbacks.
//!
//! Values are addressed by a primary key plus a [`VariantTag`]. On top of
//! plain storage the crate offers:
//!
//! - conflict resolution on write: replace, merge, or combine the incoming
//!   value with the one already stored at the same address;
//! - joined reads: a value merged or combined with the key's
//!   [`VariantTag::Dynamic`] value, which acts as a generic fallback;
//! - change callbacks, scoped to one address or global to a key, optionally
//!   wrapped so they receive joined values.
//!
//! # Maps
//!
//! - [`ObjectMap`] — storage plus callbacks; join-aware methods take any
//!   [`JoinStrategy`](omap_types::JoinStrategy)
//! - [`MergeableMap`] — for [`Mergeable`](omap_types::Mergeable) values,
//!   accepts only [`MergePolicy`](omap_types::MergePolicy)
//! - [`JoinableMap`] — for [`Joinable`](omap_types::Joinable) values,
//!   accepts [`JoinPolicy`](omap_types::JoinPolicy)
//!
//! All three implement [`VariantLookup`], the read-only contract used by
//! consumers that search the map.
//!
//! # Design Rules
//!
//! 1. One value per `(key, variant)`; keys with no variants are pruned.
//! 2. Mutations commit before callbacks run; callbacks run synchronously.
//! 3. Callbacks are removed through the handle returned at registration.
//! 4. Missing entries are `None`, never errors.

pub mod config;
pub mod error;
pub mod joinable;
pub mod map;
pub mod mergeable;
pub mod registry;
pub mod traits;

#[cfg(test)]
mod fixtures;

pub use config::MapConfig;
pub use error::{MapError, MapResult};
pub use joinable::JoinableMap;
pub use map::ObjectMap;
pub use mergeable::MergeableMap;
pub use registry::{GlobalHandle, RegistrationId, ScopedHandle};
pub use traits::VariantLookup;

pub use omap_types::{JoinPolicy, Joinable, MergePolicy, Mergeable, VariantTag};
