use std::time::Duration;

/// Fixed pauses between input lines to stay under remote rate limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacingPolicy {
    pub short_every: usize,
    pub short_pause: Duration,
    pub long_every: usize,
    pub long_pause: Duration,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            short_every: 10,
            short_pause: Duration::from_secs(1),
            long_every: 100,
            long_pause: Duration::from_secs(5),
        }
    }
}

impl PacingPolicy {
    pub fn with_pauses(short_pause: Duration, long_pause: Duration) -> Self {
        Self {
            short_pause,
            long_pause,
            ..Self::default()
        }
    }

    /// No waiting at all
    pub fn disabled() -> Self {
        Self::with_pauses(Duration::ZERO, Duration::ZERO)
    }

    /// Pause owed after the line at zero-based `index`.
    ///
    /// Counted on the 1-based line number; on a multiple of `long_every` the
    /// long pause is added to the short one.
    pub fn pause_after(&self, index: usize) -> Option<Duration> {
        let line_no = index + 1;
        let due = |every: usize| every > 0 && line_no % every == 0;

        let mut pause = Duration::ZERO;
        if due(self.short_every) {
            pause += self.short_pause;
        }
        if due(self.long_every) {
            pause += self.long_pause;
        }

        (!pause.is_zero()).then_some(pause)
    }
}
