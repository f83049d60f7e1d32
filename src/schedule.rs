//! Publication cadence gate.
//!
//! Enforces how often the publication posts, independent of content
//! quality: a daily volume cap and a set of allowed local-hour windows.
//! The gate only reads; nothing advances the cadence state except an
//! actual publish.

use chrono::{DateTime, Local, Timelike};
use thiserror::Error;

use crate::rules::{ScheduleRules, Window};
use crate::store::Post;

/// Why publishing is not allowed right now.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("daily limit reached: {published} post(s) already dated {day}, limit is {limit}")]
    DailyLimitReached {
        published: usize,
        limit: usize,
        day: String,
    },

    #[error("outside publish window: local hour {hour} is not in any allowed window")]
    OutsidePublishWindow { hour: u32 },
}

/// The cadence gate, configured from pipeline rules.
#[derive(Debug, Clone)]
pub struct ScheduleGate {
    daily_limit: usize,
    windows: Vec<Window>,
}

impl ScheduleGate {
    pub fn new(rules: &ScheduleRules) -> Self {
        Self {
            daily_limit: rules.daily_limit,
            windows: rules.windows.clone(),
        }
    }

    /// Check whether a publish at `now` is allowed.
    ///
    /// "Today" is the local calendar date of `now`; a post counts toward
    /// it when its stored date string starts with that `YYYY-MM-DD`
    /// prefix. The volume cap is checked before the window, so a blocked
    /// day reads as "done for today" rather than "wrong hour".
    pub fn check(&self, now: DateTime<Local>, history: &[Post]) -> Result<(), ScheduleError> {
        let day = now.format("%Y-%m-%d").to_string();
        let published = history.iter().filter(|p| p.date.starts_with(&day)).count();
        if published >= self.daily_limit {
            return Err(ScheduleError::DailyLimitReached {
                published,
                limit: self.daily_limit,
                day,
            });
        }

        let hour = now.hour();
        if !self.windows.iter().any(|w| w.contains(hour)) {
            return Err(ScheduleError::OutsidePublishWindow { hour });
        }

        Ok(())
    }

    /// The window containing `hour`, if any.
    pub fn window_for(&self, hour: u32) -> Option<Window> {
        self.windows.iter().copied().find(|w| w.contains(hour))
    }

    /// The next window starting after `hour` today, if any.
    pub fn next_window_after(&self, hour: u32) -> Option<Window> {
        self.windows
            .iter()
            .copied()
            .filter(|w| w.start > hour)
            .min_by_key(|w| w.start)
    }
}
