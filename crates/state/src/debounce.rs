use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Trailing-edge debouncer with an injected clock.
///
/// Each `push` replaces the pending value and restarts the quiet window.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// When the pending value becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match self.pending {
            Some((_, deadline)) if now >= deadline => self.flush(),
            _ => None,
        }
    }

    /// Yields the pending value regardless of the window.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

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
    fn value_is_due_only_after_quiet_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.push("a", start);
        assert_eq!(debouncer.take_due(start + Duration::from_millis(299)), None);
        assert_eq!(debouncer.take_due(start + Duration::from_millis(300)), Some("a"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn push_restarts_the_window_and_keeps_latest() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.push("d", start);
        debouncer.push("da", start + Duration::from_millis(200));
        debouncer.push("dat", start + Duration::from_millis(400));
        assert_eq!(debouncer.take_due(start + Duration::from_millis(650)), None);
        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(700))
        );
        assert_eq!(debouncer.take_due(start + Duration::from_millis(700)), Some("dat"));
    }

    #[test]
    fn flush_and_cancel() {
        let mut debouncer = Debouncer::default();
        assert_eq!(debouncer.delay(), DEFAULT_DEBOUNCE);
        debouncer.push(1, Instant::now());
        assert_eq!(debouncer.flush(), Some(1));
        debouncer.push(2, Instant::now());
        debouncer.cancel();
        assert_eq!(debouncer.flush(), None);
    }
}
