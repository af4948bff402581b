//! Air-date offsets.
//!
//! Some channels publish hours or days after (or before) the air date the
//! media manager knows about; an offset shifts the air date before the
//! "has it aired yet" comparison.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

/// A signed shift applied to an episode's air date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AirDateOffset {
    /// Weeks to add (may be negative).
    pub weeks: i64,
    /// Days to add (may be negative).
    pub days: i64,
    /// Hours to add (may be negative).
    pub hours: i64,
    /// Minutes to add (may be negative).
    pub minutes: i64,
}

impl AirDateOffset {
    /// The total shift, or `None` if it does not fit in a [`TimeDelta`].
    #[must_use]
    pub fn delta(&self) -> Option<TimeDelta> {
        TimeDelta::try_weeks(self.weeks)?
            .checked_add(&TimeDelta::try_days(self.days)?)?
            .checked_add(&TimeDelta::try_hours(self.hours)?)?
            .checked_add(&TimeDelta::try_minutes(self.minutes)?)
    }

    /// Whether every component is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Shifts `timestamp` by the offset.
    ///
    /// Shifts beyond the representable range saturate at the earliest or
    /// latest representable instant.
    #[must_use]
    pub fn apply(&self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        let shifted = self
            .delta()
            .and_then(|delta| timestamp.checked_add_signed(delta));
        match shifted {
            Some(shifted) => shifted,
            None if self.points_backwards() => DateTime::<Utc>::MIN_UTC,
            None => DateTime::<Utc>::MAX_UTC,
        }
    }

    fn points_backwards(&self) -> bool {
        let total = i128::from(self.weeks) * 7 * 24 * 60
            + i128::from(self.days) * 24 * 60
            + i128::from(self.hours) * 60
            + i128::from(self.minutes);
        total < 0
    }
}
