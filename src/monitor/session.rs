use chrono::{DateTime, Utc};

/// One sample taken from the price feed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Reading {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }

    #[cfg(test)]
    pub fn now(value: f64) -> Self {
        Self::new(Utc::now(), value)
    }
}

/// The two most recent readings of a monitoring session.
///
/// Owned by the scheduler's tick loop. The first reading of a session is
/// used as both `previous` and `current`, so no move can be inferred from a
/// missing baseline.
#[derive(Debug, Clone, Default)]
pub struct MonitorSession {
    previous: Option<Reading>,
    current: Option<Reading>,
    ticks: u64,
}

impl MonitorSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shifts `current` into `previous` and stores the new reading.
    pub fn observe(&mut self, reading: Reading) {
        self.previous = Some(self.current.unwrap_or(reading));
        self.current = Some(reading);
        self.ticks += 1;
    }

    /// True while only the bootstrap reading has been observed.
    pub fn is_bootstrap(&self) -> bool {
        self.ticks == 1
    }

    pub fn previous(&self) -> Option<&Reading> {
        self.previous.as_ref()
    }

    pub fn current(&self) -> Option<&Reading> {
        self.current.as_ref()
    }

    /// Number of readings observed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_empty() {
        let session = MonitorSession::new();
        assert!(session.previous().is_none());
        assert!(session.current().is_none());
        assert!(!session.is_bootstrap());
        assert_eq!(session.ticks(), 0);
    }

    #[test]
    fn test_first_reading_is_its_own_baseline() {
        let mut session = MonitorSession::new();
        session.observe(Reading::now(100.0));

        assert!(session.is_bootstrap());
        assert_eq!(session.previous().map(|r| r.value), Some(100.0));
        assert_eq!(session.current().map(|r| r.value), Some(100.0));
    }

    #[test]
    fn test_observe_shifts_current_into_previous() {
        let mut session = MonitorSession::new();
        session.observe(Reading::now(105.0));
        session.observe(Reading::now(115.0));
        session.observe(Reading::now(112.0));

        assert!(!session.is_bootstrap());
        assert_eq!(session.previous().map(|r| r.value), Some(115.0));
        assert_eq!(session.current().map(|r| r.value), Some(112.0));
        assert_eq!(session.ticks(), 3);
    }
}
