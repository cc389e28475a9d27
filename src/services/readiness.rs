//! Bounded setup policy for mounting the bars once the page can take them.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::types::config::SetupConfig;

/// Pause between retries once the initial schedule is used up.
const RETRY_AFTER_FAILURE_MS: u64 = 500;

/// Host-side view of the page the bars are injected into.
pub trait ReadinessProbe {
    /// The document has a body the bars can attach to.
    fn is_ready(&self) -> bool;
    /// Our container is present in the document.
    fn is_mounted(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    Mounted,
    AlreadyMounted,
    Disabled,
    /// Page not ready or the mount failed; worth another attempt.
    NotReady,
    Exhausted,
}

/// True for browser start pages, which finish building well after load.
pub fn is_new_tab_url(url: &str) -> bool {
    matches!(
        url,
        "about:newtab" | "about:blank" | "about:home" | "chrome://newtab/" | "edge://newtab/"
    ) || url.starts_with("chrome://new-tab-page")
        || url.starts_with("edge://new-tab-page")
        || url.contains("newtab")
        || url.contains("new-tab")
}

/// Counts setup attempts and stops after `max_attempts`.
#[derive(Debug, Clone)]
pub struct SetupRetry {
    attempts: u32,
    max_attempts: u32,
    delays: Vec<Duration>,
}

impl SetupRetry {
    pub fn new(config: &SetupConfig) -> Self {
        Self {
            attempts: 0,
            max_attempts: config.max_attempts,
            delays: config
                .retry_delays_ms
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// Waits before each attempt: start pages get the whole fallback schedule,
    /// other pages a single immediate try.
    pub fn schedule(&self, url: &str) -> Vec<Duration> {
        let mut schedule = vec![Duration::ZERO];
        if is_new_tab_url(url) {
            schedule.extend(self.delays.iter().copied());
        }
        schedule
    }

    /// One setup attempt. `mount` returns whether the bars were attached.
    pub fn attempt<P, F>(&mut self, enabled: bool, probe: &P, mount: F) -> SetupOutcome
    where
        P: ReadinessProbe + ?Sized,
        F: FnOnce() -> bool,
    {
        if self.is_exhausted() {
            return SetupOutcome::Exhausted;
        }
        self.attempts += 1;
        debug!(attempt = self.attempts, max = self.max_attempts, "setup attempt");

        if !enabled {
            return SetupOutcome::Disabled;
        }
        if probe.is_mounted() {
            return SetupOutcome::AlreadyMounted;
        }
        if !probe.is_ready() {
            return SetupOutcome::NotReady;
        }
        if mount() {
            info!(attempt = self.attempts, "bars mounted");
            SetupOutcome::Mounted
        } else {
            SetupOutcome::NotReady
        }
    }

    /// Retries until something other than [`SetupOutcome::NotReady`] happens.
    ///
    /// `sleep` is injected so hosts can use their own timer and tests can skip waiting.
    pub fn run<P, F, S>(&mut self, url: &str, enabled: bool, probe: &P, mut mount: F, mut sleep: S) -> SetupOutcome
    where
        P: ReadinessProbe + ?Sized,
        F: FnMut() -> bool,
        S: FnMut(Duration),
    {
        let schedule = self.schedule(url);
        let fallback = Duration::from_millis(RETRY_AFTER_FAILURE_MS);
        let mut waits = schedule.into_iter().chain(std::iter::repeat(fallback));
        loop {
            if let Some(wait) = waits.next() {
                if !wait.is_zero() {
                    sleep(wait);
                }
            }
            match self.attempt(enabled, probe, &mut mount) {
                SetupOutcome::NotReady => continue,
                SetupOutcome::Exhausted => {
                    warn!(attempts = self.attempts, "giving up on mounting bars");
                    return SetupOutcome::Exhausted;
                }
                other => return other,
            }
        }
    }
}
