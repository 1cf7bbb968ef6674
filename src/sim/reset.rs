//! Daily wall-clock reset trigger.

use chrono::{NaiveDateTime, TimeDelta, Timelike};

/// Trigger state of a [`ResetScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetState {
    /// Watching for the target minute.
    Armed,
    /// Fired recently; suppresses re-firing until `until`.
    Cooldown { until: NaiveDateTime },
}

/// Fires once per day when local time reaches `hour:minute`.
///
/// After firing, the scheduler stays in [`ResetState::Cooldown`] for
/// `cooldown` so repeated polls within the same target minute do not fire
/// again.
///
/// # Examples
///
/// ```
/// use bess_sim::sim::reset::ResetScheduler;
/// use chrono::{NaiveDate, TimeDelta};
///
/// let mut sched = ResetScheduler::new(0, 15, TimeDelta::seconds(60));
/// let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
/// assert!(sched.poll(day.and_hms_opt(0, 15, 3).unwrap()));
/// assert!(!sched.poll(day.and_hms_opt(0, 15, 13).unwrap()));
/// ```
#[derive(Debug, Clone)]
pub struct ResetScheduler {
    hour: u32,
    minute: u32,
    cooldown: TimeDelta,
    state: ResetState,
}

impl ResetScheduler {
    /// Creates an armed scheduler targeting `hour:minute` local time.
    ///
    /// # Panics
    ///
    /// Panics if `hour >= 24` or `minute >= 60`.
    pub fn new(hour: u32, minute: u32, cooldown: TimeDelta) -> Self {
        assert!(hour < 24, "reset hour must be < 24");
        assert!(minute < 60, "reset minute must be < 60");
        Self {
            hour,
            minute,
            cooldown,
            state: ResetState::Armed,
        }
    }

    /// Current trigger state.
    pub fn state(&self) -> ResetState {
        self.state
    }

    /// Target as `(hour, minute)`.
    pub fn target(&self) -> (u32, u32) {
        (self.hour, self.minute)
    }

    /// Advances the state machine to `now` and returns `true` if a reset
    /// should happen at this poll.
    pub fn poll(&mut self, now: NaiveDateTime) -> bool {
        if let ResetState::Cooldown { until } = self.state {
            if now < until {
                return false;
            }
            self.state = ResetState::Armed;
        }

        if now.hour() == self.hour && now.minute() == self.minute {
            self.state = ResetState::Cooldown {
                until: now + self.cooldown,
            };
            true
        } else {
            false
        }
    }
}
