//! Single-shot, restartable debounce timer.
//!
//! The host event loop owns time: it reports events with [`Debouncer::push`] and asks
//! [`Debouncer::poll`] whether the quiet period has elapsed. Only the most recent value pushed
//! before the deadline survives; pushing again restarts the window.

use std::time::{Duration, Instant};

/// The default quiet period before a coalesced edit is committed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// A restartable single-shot timer carrying the latest pending value.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    /// Create a debouncer that fires `window` after the last push.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// The quiet period.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record `value`, replacing any pending one and restarting the timer from `now`.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.window));
    }

    /// Returns `true` if a value is waiting for its deadline.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value will fire, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Take the pending value if its deadline has been reached at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Take the pending value regardless of its deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Drop the pending value without firing.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restarting_keeps_only_the_latest_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(500));

        debouncer.push("a", start);
        debouncer.push("ab", start + Duration::from_millis(300));

        // The first push's deadline has passed, but the restart moved it.
        assert_eq!(debouncer.poll(start + Duration::from_millis(600)), None);
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(800)),
            Some("ab")
        );
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn flush_fires_early_and_cancel_discards() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.push(1, start);
        assert_eq!(debouncer.flush(), Some(1));
        debouncer.push(2, start);
        debouncer.cancel();
        assert_eq!(debouncer.poll(start + Duration::from_secs(5)), None);
    }
}
