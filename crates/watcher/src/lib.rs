//! Stability watcher for Rollpoint
//!
//! This crate provides:
//! - The two-phase debounce state machine ([`Detector`])
//! - An injectable [`Clock`] so the machine is testable without sleeping
//! - The cooperative poll loop ([`Watcher::run`]) with shutdown between polls

pub mod clock;
pub mod debounce;

pub use clock::{Clock, ManualClock, SystemClock};
pub use debounce::{fingerprint, DebounceState, Detector, PollEvent};

use rp_core::Outcome;
use rp_git::Backend;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

/// Sequential poll loop around a [`Detector`]
///
/// One poll, including any checkpoint it fires, completes before the next
/// sleep starts. Backend calls block the task while they run.
pub struct Watcher<'a, B: Backend + ?Sized, C: Clock = SystemClock> {
    backend: &'a B,
    detector: Detector<C>,
    interval: Duration,
}

impl<'a, B: Backend + ?Sized> Watcher<'a, B, SystemClock> {
    pub fn new(backend: &'a B, interval: Duration, debounce: Duration) -> Self {
        Self::with_detector(backend, interval, Detector::new(debounce))
    }
}

impl<'a, B: Backend + ?Sized, C: Clock> Watcher<'a, B, C> {
    pub fn with_detector(backend: &'a B, interval: Duration, detector: Detector<C>) -> Self {
        Self {
            backend,
            detector,
            interval,
        }
    }

    pub fn detector(&self) -> &Detector<C> {
        &self.detector
    }

    /// Poll until `shutdown` turns true (or its sender is dropped)
    ///
    /// `fire` runs the checkpoint; `report` sees every poll event. A failing
    /// poll is logged and the loop carries on.
    pub async fn run<T, F, R>(
        &mut self,
        mut shutdown: watch::Receiver<bool>,
        mut fire: F,
        mut report: R,
    ) -> anyhow::Result<()>
    where
        F: FnMut() -> Outcome<T>,
        R: FnMut(&PollEvent<T>),
    {
        info!(
            interval = ?self.interval,
            debounce = ?self.detector.debounce(),
            "watch loop started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            match self.detector.poll(self.backend, &mut fire) {
                Ok(event) => report(&event),
                Err(err) => warn!("poll failed: {}", err),
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("watch loop stopped");
        Ok(())
    }
}
