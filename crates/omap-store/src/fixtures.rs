//! Value types shared by the unit tests.

use std::collections::BTreeSet;

use omap_types::{Joinable, Mergeable};

/// Merge-only value whose merge is addition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Counter(pub i64);

impl Mergeable for Counter {
    fn merge(&self, other: &Self) -> Self {
        Counter(self.0 + other.0)
    }
}

/// Joinable value with optional fields and a tag set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Style {
    pub color: Option<String>,
    pub size: Option<u32>,
    pub tags: BTreeSet<String>,
}

impl Style {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub(crate) fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub(crate) fn tag(mut self, tag: &str) -> Self {
        self.tags.insert(tag.to_string());
        self
    }
}

impl Mergeable for Style {
    fn merge(&self, other: &Self) -> Self {
        Self {
            color: self.color.merge(&other.color),
            size: self.size.merge(&other.size),
            tags: if self.tags.is_empty() {
                other.tags.clone()
            } else {
                self.tags.clone()
            },
        }
    }
}

impl Joinable for Style {
    fn combine(&self, other: &Self) -> Self {
        Self {
            color: self.color.merge(&other.color),
            size: self.size.merge(&other.size),
            tags: self.tags.union(&other.tags).cloned().collect(),
        }
    }
}
