use std::time::{Duration, Instant};

/// Occurrences further behind than this are dropped instead of replayed.
pub const MAX_LAG: Duration = Duration::from_millis(100);

/// A fixed-rate deadline that can be paused and resumed without
/// replaying the paused interval.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    period: Duration,
    next: Instant,
    paused: Option<Duration>,
}

impl Cadence {
    /// A zero `period` is raised to one nanosecond, so `poll` always catches up.
    pub fn new(period: Duration, now: Instant) -> Cadence {
        let period = period.max(Duration::from_nanos(1));
        Cadence {
            period,
            next: now + period,
            paused: None,
        }
    }

    /// The next deadline, or `None` while paused.
    pub fn next(&self) -> Option<Instant> {
        match self.paused {
            Some(_) => None,
            None => Some(self.next),
        }
    }

    /// Consume one occurrence if it is due at `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.paused.is_some() || now < self.next {
            return false;
        }
        let lag = now - self.next;
        if lag > MAX_LAG {
            log::debug!("Dropping {:?} of lag", lag);
            self.next = now;
        }
        self.next += self.period;
        true
    }

    /// Freeze the time left until the next deadline.
    pub fn pause(&mut self, now: Instant) {
        if self.paused.is_none() {
            self.paused = Some(self.next.saturating_duration_since(now));
        }
    }

    /// Continue with the time that was left when paused.
    pub fn resume(&mut self, now: Instant) {
        if let Some(remaining) = self.paused.take() {
            self.next = now + remaining;
        }
    }

    /// Start over with a full period from `now`.
    pub fn restart(&mut self, now: Instant) {
        self.next = now + self.period;
        self.paused = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(10);

    fn count(cadence: &mut Cadence, now: Instant) -> usize {
        let mut n = 0;
        while cadence.poll(now) {
            n += 1;
        }
        n
    }

    #[test]
    fn fires_once_per_period() {
        let start = Instant::now();
        let mut cadence = Cadence::new(PERIOD, start);
        assert_eq!(count(&mut cadence, start + Duration::from_millis(9)), 0);
        assert_eq!(count(&mut cadence, start + Duration::from_millis(10)), 1);
        assert_eq!(count(&mut cadence, start + Duration::from_millis(45)), 3);
        assert_eq!(cadence.next(), Some(start + Duration::from_millis(50)));
    }

    #[test]
    fn paused_interval_is_not_replayed() {
        let start = Instant::now();
        let mut cadence = Cadence::new(PERIOD, start);
        cadence.pause(start + Duration::from_millis(4));
        assert_eq!(cadence.next(), None);
        assert_eq!(count(&mut cadence, start + Duration::from_secs(5)), 0);

        let resumed = start + Duration::from_secs(5);
        cadence.resume(resumed);
        assert_eq!(cadence.next(), Some(resumed + Duration::from_millis(6)));
        assert_eq!(count(&mut cadence, resumed + Duration::from_millis(26)), 3);
    }

    #[test]
    fn large_lag_is_dropped() {
        let start = Instant::now();
        let mut cadence = Cadence::new(PERIOD, start);
        let late = start + Duration::from_secs(2);
        assert_eq!(count(&mut cadence, late), 1);
        assert_eq!(cadence.next(), Some(late + PERIOD));
    }

    #[test]
    fn zero_period_still_catches_up() {
        let start = Instant::now();
        let mut cadence = Cadence::new(Duration::from_nanos(0), start);
        assert_eq!(count(&mut cadence, start + Duration::from_nanos(10)), 10);
        assert_eq!(cadence.next(), Some(start + Duration::from_nanos(11)));
    }

    #[test]
    fn restart_clears_pause() {
        let start = Instant::now();
        let mut cadence = Cadence::new(PERIOD, start);
        cadence.pause(start);
        cadence.restart(start + PERIOD);
        assert_eq!(cadence.next(), Some(start + 2 * PERIOD));
    }
}
