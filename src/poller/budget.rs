use std::time::Duration;

/// Limits for one poll loop
///
/// The attempt cap always applies so a loop can never run forever; the
/// wall-clock cap and the consecutive-failure cap are optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollBudget {
    /// Fixed wait between status checks
    pub interval: Duration,

    /// Maximum number of status checks (at least 1)
    pub max_attempts: u32,

    /// Optional wall-clock cap measured from the first status check
    pub max_duration: Option<Duration>,

    /// Back-to-back transport failures that end the loop early
    ///
    /// `None` tolerates transport failures until the attempt or time budget
    /// runs out.
    pub max_consecutive_failures: Option<u32>,
}

impl PollBudget {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
            max_duration: None,
            max_consecutive_failures: None,
        }
    }

    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = Some(max_duration);
        self
    }

    pub fn with_max_consecutive_failures(mut self, max: u32) -> Self {
        self.max_consecutive_failures = Some(max.max(1));
        self
    }

    /// Returns true once no further status check may be issued
    pub fn is_exhausted(&self, attempts: u32, elapsed: Duration) -> bool {
        attempts >= self.max_attempts || self.max_duration.is_some_and(|max| elapsed >= max)
    }

    /// Time to wait before the next check, cut short by the time budget
    pub fn next_wait(&self, elapsed: Duration) -> Duration {
        match self.max_duration {
            Some(max) => self.interval.min(max.saturating_sub(elapsed)),
            None => self.interval,
        }
    }

    /// Returns true once `consecutive` failures in a row must end the loop
    pub fn failures_exceeded(&self, consecutive: u32) -> bool {
        self.max_consecutive_failures
            .is_some_and(|max| consecutive >= max)
    }
}

impl Default for PollBudget {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), 60)
    }
}
