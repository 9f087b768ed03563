//! Per-instance zone state holder.

use std::sync::Arc;

use crate::arena::{Arena, ZoneId};
use crate::error::{Result, ZoneError};
use crate::state::{DirtyTags, Freshness, ZoneState};

/// Tracks zone freshness for one host instance.
///
/// The holder owns the host value and one [`ZoneState`] per zone that was
/// registered in the arena when the holder was created. Zones added to the
/// arena afterwards are not visible to it.
///
/// Passing a [`ZoneId`] that was not registered at that time is a
/// programmer error: every method taking a zone panics on it, except
/// [`Zoned::try_state`].
pub struct Zoned<H> {
    pub(crate) states: Vec<ZoneState>,
    pub(crate) arena: Arc<Arena<H>>,
    pub(crate) host: H,
}

impl<H> Zoned<H> {
    /// Bind `host` to `arena`, starting every zone out empty.
    pub fn new(arena: Arc<Arena<H>>, host: H) -> Self {
        let states = vec![ZoneState::new(); arena.len()];
        Self {
            states,
            arena,
            host,
        }
    }

    /// Re-initialize against `arena`, discarding all zone state.
    pub fn reinit(&mut self, arena: Arc<Arena<H>>) {
        tracing::debug!(
            previous = self.states.len(),
            zones = arena.len(),
            "Re-initializing zone holder"
        );
        self.states = vec![ZoneState::new(); arena.len()];
        self.arena = arena;
    }

    /// Re-initialize against the currently bound arena.
    pub fn reset(&mut self) {
        let arena = Arc::clone(&self.arena);
        self.reinit(arena);
    }

    #[inline]
    pub fn arena(&self) -> &Arc<Arena<H>> {
        &self.arena
    }

    #[inline]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host.
    ///
    /// Changes made here are not tracked; call [`Zoned::set_dirty`] for the
    /// zones that were touched.
    #[inline]
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Number of zones this holder tracks.
    #[inline]
    pub fn zone_count(&self) -> usize {
        self.states.len()
    }

    /// Current freshness of `zone`.
    ///
    /// # Panics
    ///
    /// Panics if `zone` was not registered when the holder was initialized.
    #[track_caller]
    pub fn state(&self, zone: ZoneId) -> Freshness {
        self.slot(zone).freshness()
    }

    /// Current freshness of `zone`, or an error for an unknown handle.
    pub fn try_state(&self, zone: ZoneId) -> Result<Freshness> {
        self.states
            .get(zone.index())
            .map(ZoneState::freshness)
            .ok_or(ZoneError::UnknownZone {
                zone,
                registered: self.states.len(),
            })
    }

    /// Full tracked state of `zone`.
    #[track_caller]
    pub fn zone_state(&self, zone: ZoneId) -> &ZoneState {
        self.slot(zone)
    }

    /// Tags recorded since the zone was last clean. Empty unless dirty.
    #[track_caller]
    pub fn tags(&self, zone: ZoneId) -> &DirtyTags {
        self.slot(zone).tags()
    }

    #[track_caller]
    pub fn is_dirty(&self, zone: ZoneId) -> bool {
        self.slot(zone).is_dirty()
    }

    /// Zones that currently need a flush, in ascending order.
    pub fn dirty_zones(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, state)| state.is_dirty())
            .map(|(index, _)| ZoneId::new(index))
    }

    /// Whether any zone needs a flush.
    pub fn has_pending_changes(&self) -> bool {
        self.states.iter().any(ZoneState::is_dirty)
    }

    /// Mark `zone` dirty and union `tags` into its tag set.
    ///
    /// Does not fetch or flush anything.
    #[track_caller]
    pub fn set_dirty<I, S>(&mut self, zone: ZoneId, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.slot_mut(zone).mark_dirty(tags);
    }

    /// Mark `zone` dirty without adding any tags.
    #[track_caller]
    pub fn mark_dirty(&mut self, zone: ZoneId) {
        self.set_dirty(zone, std::iter::empty::<String>());
    }

    /// Mark `zone` clean and clear its tags, whatever its current state.
    #[track_caller]
    pub fn set_clean(&mut self, zone: ZoneId) {
        self.slot_mut(zone).mark_clean();
    }

    /// Load `zone` if it has never been fetched, then mark it dirty.
    ///
    /// The fetch callback runs only while the zone is empty, so repeated
    /// calls are cheap. The zone is always marked dirty afterwards, and the
    /// next commit flushes it.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::Fetch`] if the callback fails. The zone stays
    /// empty, so the next call retries the fetch.
    #[track_caller]
    pub fn fetch(&mut self, zone: ZoneId) -> Result<()> {
        let index = self.checked_index(zone);
        let ops = self.arena.ops(zone);
        let was_empty = self.states[index].freshness() == Freshness::Empty;

        if was_empty && let Some(fetch) = ops.fetch_fn() {
            tracing::debug!(zone = %zone, name = %ops.name(), "Fetching zone");
            if let Err(source) = fetch(&mut self.host) {
                tracing::debug!(zone = %zone, name = %ops.name(), error = %source, "Zone fetch failed");
                return Err(ZoneError::Fetch {
                    zone,
                    name: ops.name().to_string(),
                    source,
                });
            }
        }

        self.states[index].mark_dirty(std::iter::empty::<String>());
        Ok(())
    }

    /// [`Zoned::fetch`] `zone`, then hand out the host for modification.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::Fetch`] if the fetch callback fails.
    #[track_caller]
    pub fn fetch_mut(&mut self, zone: ZoneId) -> Result<&mut H> {
        self.fetch(zone)?;
        Ok(&mut self.host)
    }

    #[track_caller]
    pub(crate) fn checked_index(&self, zone: ZoneId) -> usize {
        let index = zone.index();
        if index >= self.states.len() {
            panic!(
                "zone {zone} is not registered (holder tracks {} zones)",
                self.states.len()
            );
        }
        index
    }

    #[track_caller]
    fn slot(&self, zone: ZoneId) -> &ZoneState {
        &self.states[self.checked_index(zone)]
    }

    #[track_caller]
    fn slot_mut(&mut self, zone: ZoneId) -> &mut ZoneState {
        let index = self.checked_index(zone);
        &mut self.states[index]
    }
}

impl<H: std::fmt::Debug> std::fmt::Debug for Zoned<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Zoned")
            .field("states", &self.states)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}
