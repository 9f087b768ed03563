//! Per-zone freshness tracking.

mod tags;

pub use tags::DirtyTags;

use std::fmt;

use serde::{Deserialize, Serialize};

/// How fresh the data in a zone is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    /// Never fetched; no data in the zone is trusted yet.
    #[default]
    Empty,

    /// Data matches the external source.
    Clean,

    /// Data differs from the external source and needs a flush.
    Dirty,
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Empty => "empty",
            Self::Clean => "clean",
            Self::Dirty => "dirty",
        })
    }
}

/// State of a single zone within one host instance.
///
/// Tags are only ever non-empty while the zone is dirty.
#[derive(Debug, Clone, Default)]
pub struct ZoneState {
    freshness: Freshness,

    /// Reasons the zone became dirty.
    tags: DirtyTags,
}

impl ZoneState {
    /// Create an empty zone state.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn freshness(&self) -> Freshness {
        self.freshness
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.freshness == Freshness::Dirty
    }

    #[inline]
    pub fn tags(&self) -> &DirtyTags {
        &self.tags
    }

    /// Mark the zone dirty, adding `tags` to any already recorded.
    pub fn mark_dirty<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.freshness = Freshness::Dirty;
        self.tags.extend(tags);
    }

    /// Mark the zone clean and drop its tags.
    pub fn mark_clean(&mut self) {
        self.freshness = Freshness::Clean;
        self.tags.clear();
    }
}
