//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use lzone::{Arena, DirtyTags, ZoneId, ZoneOps};
use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber honoring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Host object used across tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub theme: String,
}

/// Records callback invocations for one zone.
#[derive(Debug, Default)]
pub struct Recorder {
    pub fetches: AtomicUsize,
    pub fail_fetch: AtomicBool,
    pub fail_flush: AtomicBool,
    pub flushes: Mutex<Vec<Vec<String>>>,
}

impl Recorder {
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.lock().unwrap().len()
    }

    /// Tags passed to the most recent flush.
    pub fn last_flush(&self) -> Option<Vec<String>> {
        self.flushes.lock().unwrap().last().cloned()
    }

    pub fn set_fail_flush(&self, fail: bool) {
        self.fail_flush.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }
}

/// Zone ops whose fetch writes `value` through `field` and whose flush logs its tags.
pub fn recorded_zone(
    name: &str,
    recorder: &Arc<Recorder>,
    field: fn(&mut User) -> &mut String,
    value: &'static str,
) -> ZoneOps<User> {
    let on_fetch = Arc::clone(recorder);
    let on_flush = Arc::clone(recorder);
    ZoneOps::new(name)
        .with_fetch(move |user: &mut User| {
            on_fetch.fetches.fetch_add(1, Ordering::SeqCst);
            if on_fetch.fail_fetch.load(Ordering::SeqCst) {
                return Err("source offline".into());
            }
            *field(user) = value.to_string();
            Ok(())
        })
        .with_flush(move |_: &User, tags: &DirtyTags| {
            let tags: Vec<String> = tags.iter().map(str::to_string).collect();
            on_flush
                .flushes
                .lock()
                .map_err(|_| "recorder poisoned")?
                .push(tags);
            if on_flush.fail_flush.load(Ordering::SeqCst) {
                return Err("write rejected".into());
            }
            Ok(())
        })
}

pub fn user_name(user: &mut User) -> &mut String {
    &mut user.name
}

pub fn user_theme(user: &mut User) -> &mut String {
    &mut user.theme
}

/// Arena with a `profile` zone (index 0) and a `settings` zone (index 1).
pub struct Fixture {
    pub arena: Arc<Arena<User>>,
    pub profile: ZoneId,
    pub settings: ZoneId,
    pub profile_calls: Arc<Recorder>,
    pub settings_calls: Arc<Recorder>,
}

impl Fixture {
    pub fn new() -> Self {
        init_tracing();
        let profile_calls = Arc::new(Recorder::default());
        let settings_calls = Arc::new(Recorder::default());

        let mut arena = Arena::new();
        let profile = arena.add_zone(recorded_zone(
            "profile",
            &profile_calls,
            user_name,
            "Ada",
        ));
        let settings = arena.add_zone(recorded_zone(
            "settings",
            &settings_calls,
            user_theme,
            "dark",
        ));

        Self {
            arena: arena.into_shared(),
            profile,
            settings,
            profile_calls,
            settings_calls,
        }
    }
}
