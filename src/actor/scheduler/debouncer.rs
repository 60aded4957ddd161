use std::time::Duration;

use tokio::time::Instant;

use crate::core::{DocumentSnapshot, PaneMode};
use crate::freshness::Fingerprint;

/// The request waiting for the debounce delay to pass.
pub(super) struct Pending {
    pub(super) snapshot: DocumentSnapshot,
    pub(super) pane: PaneMode,
    pub(super) fingerprint: Fingerprint,
}

/// Pure debouncer: holds the latest pending request and its timing.
/// Each push replaces the request and restarts the delay.
pub(super) struct Debouncer {
    delay: Duration,
    pending: Option<Pending>,
    last_event: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            last_event: None,
        }
    }

    pub(super) fn push(&mut self, pending: Pending) {
        self.pending = Some(pending);
        self.last_event = Some(Instant::now());
    }

    /// Drop the pending request. Returns whether there was one.
    pub(super) fn clear(&mut self) -> bool {
        self.last_event = None;
        self.pending.take().is_some()
    }

    pub(super) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub(super) fn is_ready(&self) -> bool {
        self.last_event
            .is_some_and(|last| last.elapsed() >= self.delay && self.pending.is_some())
    }

    /// Take the pending request once the delay has passed since the last push.
    pub(super) fn take_if_ready(&mut self) -> Option<Pending> {
        if !self.is_ready() {
            return None;
        }
        self.last_event = None;
        self.pending.take()
    }

    /// Sleep until the pending request is due. Only meaningful while pending.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return self.delay;
        };
        self.delay
            .saturating_sub(last_event.elapsed())
            .max(Duration::from_millis(1))
    }
}
