//! Join policies and the value traits they operate on.
//!
//! Two values stored at the same address can be joined in two ways:
//!
//! - **merge** is asymmetric: the dominant operand keeps its present fields
//!   and inherits the absent ones from the other operand.
//! - **combine** is symmetric: the result preserves information from both.
//!
//! A third policy, **replace**, means "no join". [`MergePolicy`] only offers
//! replace and merge, so a map of merge-only values cannot be asked to
//! combine; [`JoinPolicy`] adds combine and is only usable with
//! [`Joinable`] values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A value that can absorb the absent fields of another value of its kind.
pub trait Mergeable: Clone {
    /// Return a new value where `self`'s present fields win and absent fields
    /// are taken from `other`.
    fn merge(&self, other: &Self) -> Self;

    /// Whether other values may be merged into this one.
    ///
    /// A value returning `false` is a merge source only. Maps never check
    /// this flag; callers that care use [`Mergeable::inherit_from`].
    fn inherit(&self) -> bool {
        true
    }

    /// Merge `source` into `self` unless `self` refuses inheritance, in which
    /// case `self` is returned unchanged.
    fn inherit_from(&self, source: &Self) -> Self {
        if self.inherit() {
            self.merge(source)
        } else {
            self.clone()
        }
    }
}

/// A [`Mergeable`] value that also supports a symmetric combine.
pub trait Joinable: Mergeable {
    /// Return a composite that keeps the information of both operands.
    fn combine(&self, other: &Self) -> Self;
}

/// An optional field: a present value wins over the other operand.
impl<T: Clone> Mergeable for Option<T> {
    fn merge(&self, other: &Self) -> Self {
        self.as_ref().or(other.as_ref()).cloned()
    }
}

/// Conflict resolution available to merge-only values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    #[default]
    Replace,
    Merge,
}

/// Conflict resolution available to joinable values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinPolicy {
    #[default]
    Replace,
    Merge,
    Combine,
}

impl From<MergePolicy> for JoinPolicy {
    fn from(policy: MergePolicy) -> Self {
        match policy {
            MergePolicy::Replace => JoinPolicy::Replace,
            MergePolicy::Merge => JoinPolicy::Merge,
        }
    }
}

impl TryFrom<JoinPolicy> for MergePolicy {
    type Error = TypeError;

    fn try_from(policy: JoinPolicy) -> Result<Self, Self::Error> {
        match policy {
            JoinPolicy::Replace => Ok(MergePolicy::Replace),
            JoinPolicy::Merge => Ok(MergePolicy::Merge),
            JoinPolicy::Combine => Err(TypeError::CombineUnsupported),
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&JoinPolicy::from(*self), f)
    }
}

impl fmt::Display for JoinPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JoinPolicy::Replace => "replace",
            JoinPolicy::Merge => "merge",
            JoinPolicy::Combine => "combine",
        })
    }
}

/// A join policy applicable to values of type `V`.
///
/// This is the capability a map composes with to gain join-aware reads,
/// writes and callbacks. It is implemented for [`MergePolicy`] over every
/// [`Mergeable`] type and for [`JoinPolicy`] over every [`Joinable`] type.
pub trait JoinStrategy<V>: Copy + fmt::Debug + fmt::Display {
    /// `true` when the policy performs no join at all.
    fn is_replace(&self) -> bool;

    /// Join `incoming` with `existing`. `incoming` is the dominant operand
    /// for asymmetric policies.
    fn join(&self, incoming: &V, existing: &V) -> V;
}

impl<V: Mergeable> JoinStrategy<V> for MergePolicy {
    fn is_replace(&self) -> bool {
        matches!(self, MergePolicy::Replace)
    }

    fn join(&self, incoming: &V, existing: &V) -> V {
        match self {
            MergePolicy::Replace => incoming.clone(),
            MergePolicy::Merge => incoming.merge(existing),
        }
    }
}

impl<V: Joinable> JoinStrategy<V> for JoinPolicy {
    fn is_replace(&self) -> bool {
        matches!(self, JoinPolicy::Replace)
    }

    fn join(&self, incoming: &V, existing: &V) -> V {
        match self {
            JoinPolicy::Replace => incoming.clone(),
            JoinPolicy::Merge => incoming.merge(existing),
            JoinPolicy::Combine => incoming.combine(existing),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Point {
        x: Option<i32>,
        y: Option<i32>,
        sealed: bool,
    }

    impl Point {
        fn new(x: Option<i32>, y: Option<i32>) -> Self {
            Self { x, y, sealed: false }
        }
    }

    impl Mergeable for Point {
        fn merge(&self, other: &Self) -> Self {
            Self {
                x: self.x.merge(&other.x),
                y: self.y.merge(&other.y),
                sealed: self.sealed,
            }
        }

        fn inherit(&self) -> bool {
            !self.sealed
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Tags(BTreeSet<&'static str>);

    impl Mergeable for Tags {
        fn merge(&self, other: &Self) -> Self {
            if self.0.is_empty() {
                other.clone()
            } else {
                self.clone()
            }
        }
    }

    impl Joinable for Tags {
        fn combine(&self, other: &Self) -> Self {
            Tags(self.0.union(&other.0).copied().collect())
        }
    }

    fn tags(items: &[&'static str]) -> Tags {
        Tags(items.iter().copied().collect())
    }

    // -----------------------------------------------------------------------
    // Merge / combine semantics
    // -----------------------------------------------------------------------

    #[test]
    fn merge_keeps_present_fields_and_inherits_absent() {
        let a = Point::new(Some(1), None);
        let b = Point::new(None, Some(2));
        assert_eq!(a.merge(&b), Point::new(Some(1), Some(2)));
    }

    #[test]
    fn merge_is_asymmetric() {
        let a = Point::new(Some(1), None);
        let b = Point::new(Some(9), Some(2));
        assert_eq!(a.merge(&b), Point::new(Some(1), Some(2)));
        assert_eq!(b.merge(&a), Point::new(Some(9), Some(2)));
    }

    #[test]
    fn combine_preserves_both_operands() {
        let joined = tags(&["a"]).combine(&tags(&["b"]));
        assert_eq!(joined, tags(&["a", "b"]));
        assert_eq!(tags(&["b"]).combine(&tags(&["a"])), joined);
    }

    #[test]
    fn inherit_from_respects_sealed_target() {
        let mut sealed = Point::new(Some(1), None);
        sealed.sealed = true;
        let source = Point::new(None, Some(2));

        assert_eq!(sealed.inherit_from(&source), sealed);
        // A sealed value can still be a merge source.
        assert_eq!(
            source.inherit_from(&sealed),
            Point::new(Some(1), Some(2))
        );
    }

    // -----------------------------------------------------------------------
    // Policies
    // -----------------------------------------------------------------------

    #[test]
    fn merge_policy_join() {
        let incoming = Point::new(None, Some(5));
        let existing = Point::new(Some(3), Some(4));
        assert_eq!(MergePolicy::Replace.join(&incoming, &existing), incoming);
        assert_eq!(
            MergePolicy::Merge.join(&incoming, &existing),
            Point::new(Some(3), Some(5))
        );
        assert!(JoinStrategy::<Point>::is_replace(&MergePolicy::Replace));
        assert!(!JoinStrategy::<Point>::is_replace(&MergePolicy::Merge));
    }

    #[test]
    fn join_policy_join() {
        let incoming = tags(&["new"]);
        let existing = tags(&["old"]);
        assert_eq!(JoinPolicy::Replace.join(&incoming, &existing), incoming);
        assert_eq!(JoinPolicy::Merge.join(&incoming, &existing), incoming);
        assert_eq!(
            JoinPolicy::Combine.join(&incoming, &existing),
            tags(&["new", "old"])
        );
    }

    #[test]
    fn policy_conversions() {
        assert_eq!(JoinPolicy::from(MergePolicy::Merge), JoinPolicy::Merge);
        assert_eq!(
            MergePolicy::try_from(JoinPolicy::Replace),
            Ok(MergePolicy::Replace)
        );
        assert_eq!(
            MergePolicy::try_from(JoinPolicy::Combine),
            Err(TypeError::CombineUnsupported)
        );
    }

    #[test]
    fn policy_serde_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&JoinPolicy::Combine).unwrap(),
            r#""combine""#
        );
        let merge: MergePolicy = serde_json::from_str(r#""merge""#).unwrap();
        assert_eq!(merge, MergePolicy::Merge);
        assert!(serde_json::from_str::<MergePolicy>(r#""combine""#).is_err());
        assert_eq!(MergePolicy::Merge.to_string(), "merge");
    }

    // -----------------------------------------------------------------------
    // Laws
    // -----------------------------------------------------------------------

    proptest! {
        #[test]
        fn option_merge_prefers_present(a: Option<i32>, b: Option<i32>) {
            prop_assert_eq!(a.merge(&b), a.or(b));
        }

        #[test]
        fn merge_is_idempotent(x: Option<i32>, y: Option<i32>) {
            let p = Point::new(x, y);
            prop_assert_eq!(p.merge(&p), p);
        }

        #[test]
        fn merge_is_associative(
            a in any::<(Option<i8>, Option<i8>)>(),
            b in any::<(Option<i8>, Option<i8>)>(),
            c in any::<(Option<i8>, Option<i8>)>(),
        ) {
            let p = |(x, y): (Option<i8>, Option<i8>)| {
                Point::new(x.map(i32::from), y.map(i32::from))
            };
            let (a, b, c) = (p(a), p(b), p(c));
            prop_assert_eq!(a.merge(&b).merge(&c), a.merge(&b.merge(&c)));
        }
    }
}
