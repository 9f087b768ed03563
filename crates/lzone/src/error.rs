//! Zone error types.
//!
//! Fetch and flush callbacks report failures as boxed errors. The holder
//! wraps them with the zone they belong to, so callers can decide which
//! zones to retry.

use thiserror::Error;

use crate::arena::ZoneId;
use crate::state::DirtyTags;

/// Error type returned by fetch and flush callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Single-zone operation error.
#[derive(Debug, Error)]
pub enum ZoneError {
    /// The handle was not registered in the arena when the holder was initialized.
    #[error("Zone {zone} is not registered (holder tracks {registered} zones)")]
    UnknownZone { zone: ZoneId, registered: usize },

    /// The fetch callback failed. The zone is still empty.
    #[error("Failed to fetch zone {zone} ({name})")]
    Fetch {
        zone: ZoneId,
        name: String,
        #[source]
        source: BoxError,
    },

    /// The flush callback failed. The zone is still dirty.
    #[error(transparent)]
    Flush(#[from] FlushFailure),
}

impl ZoneError {
    /// The zone this error refers to.
    pub fn zone(&self) -> ZoneId {
        match self {
            Self::UnknownZone { zone, .. } | Self::Fetch { zone, .. } => *zone,
            Self::Flush(failure) => failure.zone,
        }
    }
}

/// A flush callback failure for one zone.
///
/// `tags` is the tag set the callback was given. The zone still holds
/// exactly these tags, so a retry sees the same hint.
#[derive(Debug, Error)]
#[error("Failed to flush zone {zone} ({name})")]
pub struct FlushFailure {
    pub zone: ZoneId,
    pub name: String,
    pub tags: DirtyTags,
    #[source]
    pub source: BoxError,
}

/// One or more dirty zones failed to flush during a commit pass.
#[derive(Debug, Error)]
#[error("{} of {} dirty zones failed to flush", .failures.len(), .attempted)]
pub struct CommitError {
    /// Number of dirty zones whose flush was attempted.
    pub attempted: usize,
    /// Zones flushed successfully in the same pass (now clean).
    pub flushed: Vec<ZoneId>,
    /// Every failure, in ascending zone order.
    pub failures: Vec<FlushFailure>,
}

impl CommitError {
    /// Zones that are still dirty because their flush failed.
    pub fn failed_zones(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.failures.iter().map(|failure| failure.zone)
    }

    /// Consume the error, keeping only the per-zone failures.
    pub fn into_failures(self) -> Vec<FlushFailure> {
        self.failures
    }
}

/// Result type alias for zone operations.
pub type Result<T, E = ZoneError> = std::result::Result<T, E>;
