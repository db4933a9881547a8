use chrono::{DateTime, Duration, Utc};

/// A cancelable scheduled task with a single pending slot.
///
/// Arming replaces whatever was pending and restarts the delay. Nothing runs
/// on its own: the owner polls [`DebounceSlot::take_due`] with the current
/// time, which keeps the slot driveable from a manual clock.
#[derive(Debug, Clone)]
pub struct DebounceSlot<T> {
    delay: Duration,
    pending: Option<(DateTime<Utc>, T)>,
}

impl<T> DebounceSlot<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `payload` for `now + delay`, returning the payload it replaced.
    /// A deadline past the calendar's end never comes due.
    pub fn arm(&mut self, now: DateTime<Utc>, payload: T) -> Option<T> {
        let due = now
            .checked_add_signed(self.delay)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.pending
            .replace((due, payload))
            .map(|(_, replaced)| replaced)
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, payload)| payload)
    }

    /// Takes the payload if its deadline has passed.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Option<T> {
        let is_due = self.pending.as_ref().is_some_and(|(due, _)| *due <= now);
        if is_due {
            self.cancel()
        } else {
            None
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        self.pending.as_ref().map(|(due, _)| *due)
    }

    pub fn peek(&self) -> Option<&T> {
        self.pending.as_ref().map(|(_, payload)| payload)
    }
}
