//! Lazily fetched, lazily flushed state zones.
//!
//! This crate splits a host object into independent **zones**, each a
//! separable slice of the object's state (for example "profile" and
//! "settings"). Every zone is loaded from an external source on first use
//! and written back only when it has changed.
//!
//! # Features
//!
//! - **Shared registry**: one [`Arena`] of fetch/flush callbacks per host type
//! - **Lazy fetch**: a zone's fetch callback runs at most once until reset
//! - **Dirty tags**: callers annotate why a zone changed; flushes see the tags
//! - **Failable commit**: failed zones stay dirty and are retried next commit
//!
//! # State machine
//!
//! ```text
//! Empty --fetch--------> Dirty
//! Empty --set_dirty----> Dirty
//! Clean --set_dirty----> Dirty
//! Dirty --set_clean----> Clean
//! Dirty --commit [ok]--> Clean
//! Empty --set_clean----> Clean
//! ```
//!
//! # Example
//!
//! ```
//! use lzone::{Arena, DirtyTags, Freshness, ZoneOps, Zoned};
//!
//! #[derive(Default)]
//! struct User {
//!     nickname: String,
//! }
//!
//! let mut arena = Arena::<User>::new();
//! let profile = arena.add_zone(
//!     ZoneOps::new("profile")
//!         .with_fetch(|user: &mut User| {
//!             user.nickname = "ada".into();
//!             Ok(())
//!         })
//!         .with_flush(|user: &User, tags: &DirtyTags| {
//!             assert_eq!(user.nickname, "lovelace");
//!             assert!(tags.contains("nickname"));
//!             Ok(())
//!         }),
//! );
//! let arena = arena.into_shared();
//!
//! let mut user = Zoned::new(arena, User::default());
//! assert_eq!(user.fetch_mut(profile)?.nickname, "ada");
//! user.host_mut().nickname = "lovelace".into();
//! user.set_dirty(profile, ["nickname"]);
//!
//! let summary = user.commit()?;
//! assert_eq!(summary.flushed, vec![profile]);
//! assert_eq!(user.state(profile), Freshness::Clean);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Architecture
//!
//! - `arena.rs` - Zone registry and callback types
//! - `zoned.rs` - Per-instance holder and state transitions
//! - `commit.rs` - Commit/flush pass and its summary
//! - `state/` - Freshness and dirty-tag tracking
//! - `error.rs` - Error types

mod arena;
mod commit;
mod error;
mod state;
mod zoned;

pub use arena::{Arena, FetchFn, FlushFn, ZoneId, ZoneOps};
pub use commit::CommitSummary;
pub use error::{BoxError, CommitError, FlushFailure, Result, ZoneError};
pub use state::{DirtyTags, Freshness, ZoneState};
pub use zoned::Zoned;
