//! Profile controller: owns the single [`LoadState`] and drives load cycles.
//!
//! State machine: `Idle → Loading → {Loaded | Failed}`; every configuration
//! change restarts at `Loading` (or jumps straight to
//! `Failed(InvalidConfig)` when the config does not resolve).
//!
//! # Attempt tokens
//!
//! Each load cycle reserves a token from a monotonically increasing counter.
//! A publish is applied only while its token is still the newest reserved
//! one, so a slow response from a superseded cycle can never overwrite the
//! state produced by a newer cycle.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::watch;

use folio_core::config::ConfigResolution;
use folio_core::types::{ErrorCategory, LoadState, Session, Settings};
use folio_fetch::{classify, ProfileFetcher, Transport};

/// What the presentation layer renders: the load state plus the settings
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct ControllerState {
    /// Token of the cycle that last wrote this state; 0 before any cycle.
    pub attempt: u64,
    pub settings: Option<Settings>,
    pub state: LoadState,
}

pub struct ProfileController<T> {
    fetcher: ProfileFetcher<T>,
    session: Session,
    latest: AtomicU64,
    state: watch::Sender<ControllerState>,
}

impl<T: Transport> ProfileController<T> {
    pub fn new(fetcher: ProfileFetcher<T>, session: Session) -> Self {
        tracing::debug!(
            theme = %session.theme,
            analytics = session.analytics_id.is_some(),
            hotjar = session.hotjar_id.is_some(),
            "session configured",
        );
        let (state, _) = watch::channel(ControllerState::default());
        Self {
            fetcher,
            session,
            latest: AtomicU64::new(0),
            state,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn fetcher(&self) -> &ProfileFetcher<T> {
        &self.fetcher
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ControllerState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every applied transition.
    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.state.subscribe()
    }

    /// Newest reserved attempt token.
    pub fn latest_attempt(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Reserve the next attempt token. Reserving supersedes every older
    /// attempt immediately, even before the new one starts running.
    pub fn next_attempt(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Run a full load cycle for a configuration change.
    ///
    /// Returns the terminal state this cycle published, or `None` when a
    /// newer cycle superseded it and its result was discarded.
    pub async fn reload(&self, resolution: ConfigResolution) -> Option<LoadState> {
        let attempt = self.next_attempt();
        self.run(attempt, resolution).await
    }

    /// Run a load cycle under a token obtained from [`next_attempt`](Self::next_attempt).
    pub async fn run(&self, attempt: u64, resolution: ConfigResolution) -> Option<LoadState> {
        if !self.is_current(attempt) {
            tracing::debug!(attempt, "attempt superseded before start");
            return None;
        }

        let settings = match resolution {
            ConfigResolution::Invalid { reason } => {
                tracing::warn!(attempt, reason = %reason, "invalid configuration");
                let state = LoadState::failed(ErrorCategory::InvalidConfig);
                let applied = self.publish(attempt, |current| {
                    current.settings = None;
                    current.state = state.clone();
                });
                return applied.then_some(state);
            }
            ConfigResolution::Valid(settings) => settings,
        };

        tracing::info!(attempt, identity = %settings.identity, "loading profile");
        if !self.publish(attempt, |current| {
            current.settings = Some(settings.clone());
            current.state = LoadState::Loading;
        }) {
            return None;
        }

        let guard = LoadingGuard::new(self, attempt);
        let next = match self.fetcher.load(&settings).await {
            Ok(outcome) => LoadState::Loaded {
                profile: outcome.profile,
                repositories: outcome.repositories,
            },
            Err(failure) => LoadState::failed(classify(&failure)),
        };
        guard.finish(next)
    }

    fn is_current(&self, attempt: u64) -> bool {
        attempt == self.latest.load(Ordering::SeqCst)
    }

    /// Apply `update` if `attempt` is still the newest. Returns whether it was applied.
    fn publish(&self, attempt: u64, update: impl FnOnce(&mut ControllerState)) -> bool {
        let applied = self.state.send_if_modified(|current| {
            // Tokens only grow, so the newest token is never older than the stored one.
            if !self.is_current(attempt) {
                return false;
            }
            current.attempt = attempt;
            update(current);
            true
        });
        if !applied {
            tracing::debug!(
                attempt,
                latest = self.latest_attempt(),
                "discarding result of superseded attempt",
            );
        }
        applied
    }
}

/// Leaves `Loading` exactly once. If the load future is dropped or unwinds
/// before [`finish`](Self::finish), the attempt ends as `Failed(Generic)`.
struct LoadingGuard<'a, T: Transport> {
    controller: &'a ProfileController<T>,
    attempt: u64,
    armed: bool,
}

impl<'a, T: Transport> LoadingGuard<'a, T> {
    fn new(controller: &'a ProfileController<T>, attempt: u64) -> Self {
        Self {
            controller,
            attempt,
            armed: true,
        }
    }

    fn finish(mut self, next: LoadState) -> Option<LoadState> {
        self.armed = false;
        let label = next.label();
        let applied = self.controller.publish(self.attempt, |current| {
            current.state = next.clone();
        });
        if applied {
            tracing::info!(attempt = self.attempt, state = label, "load finished");
        }
        applied.then_some(next)
    }
}

impl<'a, T: Transport> Drop for LoadingGuard<'a, T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::warn!(attempt = self.attempt, "load abandoned while loading");
        self.controller.publish(self.attempt, |current| {
            current.state = LoadState::failed(ErrorCategory::Generic);
        });
    }
}
