//! Zone registry.
//!
//! An [`Arena`] is built once per host type: zones are registered in a fixed
//! order and each registration yields a stable [`ZoneId`]. After the
//! construction phase the arena is shared read-only behind an [`Arc`] by
//! every [`Zoned`](crate::Zoned) holder of that type.
//!
//! # Example
//!
//! ```
//! use lzone::{Arena, DirtyTags, ZoneOps};
//!
//! struct Account {
//!     email: String,
//! }
//!
//! let mut arena = Arena::<Account>::new();
//! let profile = arena.add_zone(
//!     ZoneOps::new("profile")
//!         .with_fetch(|account: &mut Account| {
//!             account.email = "ada@example.com".into();
//!             Ok(())
//!         })
//!         .with_flush(|_: &Account, _: &DirtyTags| Ok(())),
//! );
//! let arena = arena.into_shared();
//!
//! assert_eq!(arena.find("profile"), Some(profile));
//! assert!(arena.zone(profile).is_some_and(|ops| ops.has_flush()));
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::BoxError;
use crate::state::DirtyTags;

/// Fetch callback: populates the zone's data on the host.
pub type FetchFn<H> = dyn Fn(&mut H) -> Result<(), BoxError> + Send + Sync;

/// Flush callback: persists the zone's data from the host.
pub type FlushFn<H> = dyn Fn(&H, &DirtyTags) -> Result<(), BoxError> + Send + Sync;

/// Handle to a zone: its registration index in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(usize);

impl ZoneId {
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fetch and flush behavior for one zone.
///
/// Both callbacks are optional. A zone without a fetch callback is never
/// loaded from anywhere; a zone without a flush callback is read-only and
/// simply becomes clean on commit.
pub struct ZoneOps<H> {
    name: String,
    fetch: Option<Box<FetchFn<H>>>,
    flush: Option<Box<FlushFn<H>>>,
}

impl<H> ZoneOps<H> {
    /// Create ops with no callbacks. `name` is used in errors and logs.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fetch: None,
            flush: None,
        }
    }

    /// Set the fetch callback.
    #[must_use]
    pub fn with_fetch<F>(mut self, fetch: F) -> Self
    where
        F: Fn(&mut H) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.fetch = Some(Box::new(fetch));
        self
    }

    /// Set the flush callback.
    ///
    /// The callback only sees the host by shared reference, so a failed
    /// flush cannot leave the host half-modified.
    #[must_use]
    pub fn with_flush<F>(mut self, flush: F) -> Self
    where
        F: Fn(&H, &DirtyTags) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.flush = Some(Box::new(flush));
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn has_fetch(&self) -> bool {
        self.fetch.is_some()
    }

    #[inline]
    pub fn has_flush(&self) -> bool {
        self.flush.is_some()
    }

    pub(crate) fn fetch_fn(&self) -> Option<&FetchFn<H>> {
        self.fetch.as_deref()
    }

    pub(crate) fn flush_fn(&self) -> Option<&FlushFn<H>> {
        self.flush.as_deref()
    }
}

impl<H> fmt::Debug for ZoneOps<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneOps")
            .field("name", &self.name)
            .field("fetch", &self.has_fetch())
            .field("flush", &self.has_flush())
            .finish()
    }
}

/// Append-only registry of zone behaviors for host type `H`.
///
/// Zones can only be added while the arena is uniquely owned. Holders keep
/// an `Arc<Arena<H>>`, so registration is over once the first holder exists.
pub struct Arena<H> {
    zones: Vec<ZoneOps<H>>,
}

impl<H> Default for Arena<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Arena<H> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self { zones: Vec::new() }
    }

    /// Register a zone and return its handle.
    ///
    /// No uniqueness check is made on names or behavior.
    pub fn add_zone(&mut self, ops: ZoneOps<H>) -> ZoneId {
        self.zones.push(ops);
        let id = ZoneId::new(self.zones.len() - 1);
        tracing::trace!(zone = %id, name = %self.zones[id.index()].name(), "Registered zone");
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Look up a zone's ops by handle.
    pub fn zone(&self, id: ZoneId) -> Option<&ZoneOps<H>> {
        self.zones.get(id.index())
    }

    /// Ops for a handle already validated against a holder.
    pub(crate) fn ops(&self, id: ZoneId) -> &ZoneOps<H> {
        &self.zones[id.index()]
    }

    /// Iterate over every registered zone in registration order.
    pub fn zones(&self) -> impl Iterator<Item = (ZoneId, &ZoneOps<H>)> + '_ {
        self.zones
            .iter()
            .enumerate()
            .map(|(index, ops)| (ZoneId::new(index), ops))
    }

    /// Find the first zone registered under `name`.
    pub fn find(&self, name: &str) -> Option<ZoneId> {
        self.zones()
            .find(|(_, ops)| ops.name() == name)
            .map(|(id, _)| id)
    }

    /// Finish construction and share the arena.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl<H> fmt::Debug for Arena<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("zones", &self.zones)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Host;

    #[test]
    fn test_handles_are_sequential() {
        let mut arena = Arena::<Host>::new();
        assert!(arena.is_empty());
        let a = arena.add_zone(ZoneOps::new("a"));
        let b = arena.add_zone(ZoneOps::new("b"));
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_duplicate_names_are_allowed() {
        let mut arena = Arena::<Host>::new();
        let first = arena.add_zone(ZoneOps::new("dup"));
        let second = arena.add_zone(ZoneOps::new("dup"));
        assert_ne!(first, second);
        assert_eq!(arena.find("dup"), Some(first));
        assert_eq!(arena.find("missing"), None);
    }

    #[test]
    fn test_zone_lookup() {
        let mut arena = Arena::<Host>::new();
        let id = arena.add_zone(ZoneOps::new("settings").with_flush(|_, _| Ok(())));
        let ops = arena.zone(id);
        assert!(ops.is_some_and(|ops| ops.has_flush() && !ops.has_fetch()));
        assert!(arena.zone(ZoneId::new(5)).is_none());
    }

    #[test]
    fn test_debug_omits_callbacks() {
        let mut arena = Arena::<Host>::new();
        arena.add_zone(ZoneOps::new("profile").with_fetch(|_| Ok(())));
        let debug = format!("{arena:?}");
        assert!(debug.contains("name: \"profile\""));
        assert!(debug.contains("fetch: true"));
    }
}
