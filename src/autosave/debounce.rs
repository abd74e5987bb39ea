use std::time::{Duration, Instant};

/// Single outstanding deferred task. Scheduling again replaces the pending one.
///
/// The host drives it by calling [`Debouncer::poll`] from its event loop tick.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Scheduled<T>>,
}

#[derive(Debug, Clone)]
struct Scheduled<T> {
    fire_at: Instant,
    payload: T,
}

impl<T> Debouncer<T> {
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|scheduled| scheduled.fire_at)
    }

    /// Arms the timer for `payload`. Returns whether an earlier task was cancelled.
    pub fn schedule(&mut self, now: Instant, payload: T) -> bool {
        let replaced = self.pending.is_some();
        self.pending = Some(Scheduled {
            fire_at: now + self.delay,
            payload,
        });
        replaced
    }

    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Yields the payload once the delay has elapsed without a reschedule.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(scheduled) if now >= scheduled.fire_at => {
                self.pending.take().map(|scheduled| scheduled.payload)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(2000);

    #[test]
    fn poll_fires_only_after_delay() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        assert!(!debouncer.schedule(start, 1));

        assert_eq!(debouncer.poll(start + Duration::from_millis(1999)), None);
        assert_eq!(debouncer.poll(start + DELAY), Some(1));
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(start + DELAY * 2), None);
    }

    #[test]
    fn reschedule_replaces_pending_and_restarts_delay() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.schedule(start, 1);
        let later = start + Duration::from_millis(1500);
        assert!(debouncer.schedule(later, 2));

        assert_eq!(debouncer.poll(start + DELAY), None);
        assert_eq!(debouncer.deadline(), Some(later + DELAY));
        assert_eq!(debouncer.poll(later + DELAY), Some(2));
    }

    #[test]
    fn cancel_drops_pending_task() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.schedule(start, "snapshot");
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());
        assert_eq!(debouncer.poll(start + DELAY), None);
    }
}
