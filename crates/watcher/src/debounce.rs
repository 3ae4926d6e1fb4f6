//! Two-phase stability detector
//!
//! Phase one compares the raw status text between polls: cheap, and any
//! change restarts the debounce window. Phase two runs only while the status
//! text is stable and hashes the actual diff content, so repeated edits to an
//! already-modified file (same status line) still restart the window.
//! The window is counted from the first fingerprint, so edits made between
//! the status change and that fingerprint are inside it.
//!
//! ```text
//! Idle ──status non-empty──▶ Changed ──same status──▶ Settling ──same content──▶ Counting ──elapsed ≥ debounce──▶ Fire
//!   ▲                          ▲                                                    │ fingerprint differs
//!   └──── clean tree / fired ──┴────────────────────────────────────────────────────┘
//! ```

use crate::clock::{Clock, SystemClock};
use rp_core::{ContentFingerprint, Outcome};
use rp_git::{Backend, DiffScope, Result};
use std::time::{Duration, Instant};
use tracing::debug;

/// Detector memory between polls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebounceState {
    /// Raw status text from the previous poll (`None` when idle)
    pub last_status: Option<String>,
    pub last_fingerprint: Option<ContentFingerprint>,
    pub last_changed_at: Option<Instant>,
    /// Content whose checkpoint aborted; not retried until it changes
    pub failed_fingerprint: Option<ContentFingerprint>,
}

impl DebounceState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn restart(&mut self, status: String, now: Instant) {
        self.last_status = Some(status);
        self.last_fingerprint = None;
        self.last_changed_at = Some(now);
        self.failed_fingerprint = None;
    }
}

/// What a single poll observed or did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent<T> {
    /// Working tree is clean
    Idle,
    /// Status text changed; window restarted
    Changed { paths: Vec<String> },
    /// First fingerprint since the status changed; window restarted
    Settling,
    /// Status unchanged but content differs; window restarted
    Edited,
    /// Content stable, debounce window still open
    Waiting { remaining: Duration },
    /// Window elapsed and the checkpoint ran
    Fired(Outcome<T>),
    /// Content is the same as a checkpoint that already aborted
    Held,
}

/// Digest of staged diff, unstaged diff and untracked paths
pub fn fingerprint<B: Backend + ?Sized>(backend: &B) -> Result<ContentFingerprint> {
    let staged = backend.diff(DiffScope::Staged)?;
    let unstaged = backend.diff(DiffScope::Unstaged)?;
    let untracked = backend.untracked_files()?;
    Ok(ContentFingerprint::compute(&staged, &unstaged, &untracked))
}

pub struct Detector<C: Clock = SystemClock> {
    state: DebounceState,
    debounce: Duration,
    clock: C,
}

impl Detector<SystemClock> {
    pub fn new(debounce: Duration) -> Self {
        Self::with_clock(debounce, SystemClock)
    }
}

impl<C: Clock> Detector<C> {
    pub fn with_clock(debounce: Duration, clock: C) -> Self {
        Self {
            state: DebounceState::default(),
            debounce,
            clock,
        }
    }

    pub fn state(&self) -> &DebounceState {
        &self.state
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Sample the repository once, calling `fire` when content has settled
    ///
    /// Completed and skipped checkpoints reset the state. An aborted one
    /// leaves the window where it was and holds until the content changes.
    pub fn poll<B, T, F>(&mut self, backend: &B, fire: F) -> Result<PollEvent<T>>
    where
        B: Backend + ?Sized,
        F: FnOnce() -> Outcome<T>,
    {
        let status = backend.status()?;
        if status.is_clean() {
            self.state.reset();
            return Ok(PollEvent::Idle);
        }

        let now = self.clock.now();

        // Phase one: status text
        if self.state.last_status.as_deref() != Some(status.raw()) {
            self.state.restart(status.raw().to_string(), now);
            return Ok(PollEvent::Changed {
                paths: status.paths().map(str::to_string).collect(),
            });
        }

        // Phase two: content
        let current = fingerprint(backend)?;
        match self.state.last_fingerprint {
            None => {
                self.state.last_fingerprint = Some(current);
                self.state.last_changed_at = Some(now);
                return Ok(PollEvent::Settling);
            }
            Some(previous) if previous != current => {
                debug!(from = %previous.short(), to = %current.short(), "content changed");
                self.state.last_fingerprint = Some(current);
                self.state.last_changed_at = Some(now);
                self.state.failed_fingerprint = None;
                return Ok(PollEvent::Edited);
            }
            Some(_) => {}
        }

        if self.state.failed_fingerprint == Some(current) {
            return Ok(PollEvent::Held);
        }

        let changed_at = *self.state.last_changed_at.get_or_insert(now);
        let elapsed = now.saturating_duration_since(changed_at);
        if elapsed < self.debounce {
            return Ok(PollEvent::Waiting {
                remaining: self.debounce - elapsed,
            });
        }

        debug!(?elapsed, "content settled; firing");
        let outcome = fire();
        match &outcome {
            Outcome::Completed(_) | Outcome::Skipped(_) => self.state.reset(),
            Outcome::Aborted(_) => self.state.failed_fingerprint = Some(current),
        }
        Ok(PollEvent::Fired(outcome))
    }
}
