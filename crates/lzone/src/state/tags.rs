//! Dirty-reason tags.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Set of caller-supplied reasons a zone became dirty.
///
/// Tags accumulate across `set_dirty` calls until the zone is clean again.
/// Iteration is in sorted order, so flush callbacks see a stable sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirtyTags(BTreeSet<String>);

impl DirtyTags {
    /// Create an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag. Returns `false` if it was already present.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        self.0.insert(tag.into())
    }

    /// Union `tags` into this set.
    pub fn extend<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.extend(tags.into_iter().map(Into::into));
    }

    #[inline]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}

impl<S: Into<String>> FromIterator<S> for DirtyTags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tags = Self::new();
        tags.extend(iter);
        tags
    }
}

impl<'a> IntoIterator for &'a DirtyTags {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for DirtyTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, tag) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(tag)?;
        }
        f.write_str("}")
    }
}
