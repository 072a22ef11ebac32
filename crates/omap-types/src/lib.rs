//! Foundation types for the layered object map.
//!
//! Every value in an object map is addressed by a primary key plus a
//! [`VariantTag`]. This crate defines the tag, the value traits used to
//! resolve conflicting writes ([`Mergeable`], [`Joinable`]) and the policies
//! that select between them.
//!
//! # Key Types
//!
//! - [`VariantTag`] — second-level address, with a distinguished dynamic tag
//! - [`Mergeable`] / [`Joinable`] — value capabilities for merge and combine
//! - [`MergePolicy`] / [`JoinPolicy`] — conflict resolution selectors
//! - [`JoinStrategy`] — the capability a map composes with to join values

pub mod error;
pub mod join;
pub mod variant;

pub use error::TypeError;
pub use join::{JoinPolicy, JoinStrategy, Joinable, MergePolicy, Mergeable};
pub use variant::VariantTag;
