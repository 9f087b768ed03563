//! Flushing dirty zones back to their external sources.
//!
//! A commit pass walks every zone in ascending order and invokes the flush
//! callback of each dirty one. Empty and clean zones are skipped without
//! touching their callbacks. A failing zone stays dirty with its tags, and
//! the pass always carries on with the next zone.

use serde::{Deserialize, Serialize};

use crate::arena::ZoneId;
use crate::error::{CommitError, FlushFailure, Result};
use crate::zoned::Zoned;

/// Outcome of a commit pass in which every dirty zone flushed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    /// Zones that were dirty and are now clean.
    pub flushed: Vec<ZoneId>,
    /// Zones that were empty or clean and were left alone.
    pub skipped: Vec<ZoneId>,
}

impl CommitSummary {
    /// Whether the pass had nothing to flush.
    pub fn is_noop(&self) -> bool {
        self.flushed.is_empty()
    }
}

impl<H> Zoned<H> {
    /// Flush every dirty zone.
    ///
    /// # Errors
    ///
    /// Returns a [`CommitError`] listing every zone whose flush failed.
    /// Those zones keep their dirty state and tags, so calling `commit`
    /// again retries exactly them. Zones that flushed in the same pass are
    /// clean either way.
    pub fn commit(&mut self) -> Result<CommitSummary, CommitError> {
        let mut summary = CommitSummary::default();
        let mut failures = Vec::new();
        let mut attempted = 0;

        for index in 0..self.states.len() {
            let zone = ZoneId::new(index);
            if !self.states[index].is_dirty() {
                summary.skipped.push(zone);
                continue;
            }

            attempted += 1;
            match self.flush_dirty(zone) {
                Ok(()) => summary.flushed.push(zone),
                Err(failure) => failures.push(failure),
            }
        }

        tracing::debug!(
            attempted,
            flushed = summary.flushed.len(),
            failed = failures.len(),
            "Commit finished"
        );

        if failures.is_empty() {
            Ok(summary)
        } else {
            Err(CommitError {
                attempted,
                flushed: summary.flushed,
                failures,
            })
        }
    }

    /// Alias for [`Zoned::commit`].
    ///
    /// # Errors
    ///
    /// See [`Zoned::commit`].
    pub fn flush(&mut self) -> Result<CommitSummary, CommitError> {
        self.commit()
    }

    /// Flush a single zone if it is dirty.
    ///
    /// Returns `Ok(false)` when the zone was empty or clean and nothing was
    /// invoked.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::Flush`](crate::ZoneError::Flush) if the callback
    /// fails; the zone keeps its dirty state and tags.
    #[track_caller]
    pub fn flush_zone(&mut self, zone: ZoneId) -> Result<bool> {
        let index = self.checked_index(zone);
        if !self.states[index].is_dirty() {
            return Ok(false);
        }
        self.flush_dirty(zone)?;
        Ok(true)
    }

    /// Invoke the flush callback of a dirty zone and settle its state.
    fn flush_dirty(&mut self, zone: ZoneId) -> Result<(), FlushFailure> {
        let index = zone.index();
        let ops = self.arena.ops(zone);

        if let Some(flush) = ops.flush_fn() {
            let tags = self.states[index].tags().clone();
            tracing::debug!(zone = %zone, name = %ops.name(), tags = %tags, "Flushing zone");
            if let Err(source) = flush(&self.host, &tags) {
                tracing::debug!(zone = %zone, name = %ops.name(), error = %source, "Zone flush failed");
                return Err(FlushFailure {
                    zone,
                    name: ops.name().to_string(),
                    tags,
                    source,
                });
            }
        } else {
            tracing::trace!(zone = %zone, name = %ops.name(), "Zone has no flush callback");
        }

        self.states[index].mark_clean();
        Ok(())
    }
}
