//! Calendar arithmetic for days, workdays, weeks and campaign phases.

use serde::{Deserialize, Serialize};

pub const DAYS_PER_WEEK: u32 = 7;

/// A (week, day) pair. Weeks and days are both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CalendarDay {
    pub week: u32,
    pub day: u32,
}

impl CalendarDay {
    pub fn new(week: u32, day: u32) -> Self {
        Self { week, day }
    }

    /// Days elapsed since week 1 day 1.
    pub fn ordinal(self) -> u32 {
        (self.week.saturating_sub(1)) * DAYS_PER_WEEK + self.day.saturating_sub(1)
    }

    pub fn next_day(self) -> Self {
        if self.day >= DAYS_PER_WEEK {
            Self::new(self.week + 1, 1)
        } else {
            Self::new(self.week, self.day + 1)
        }
    }

    /// The next day after `self` that is a workday.
    pub fn next_workday(self, last_workday: u32) -> Self {
        let mut d = self.next_day();
        while d.day > last_workday {
            d = d.next_day();
        }
        d
    }

    pub fn is_workday(self, last_workday: u32) -> bool {
        self.day >= 1 && self.day <= last_workday
    }
}

impl std::fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "week {} day {}", self.week, self.day)
    }
}

/// Campaign pacing bands. Used by conditional triggers and tips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Tutorial,
    Early,
    Mid,
    Late,
}

impl GamePhase {
    pub fn for_week(week: u32) -> Self {
        match week {
            0..=2 => Self::Tutorial,
            3..=5 => Self::Early,
            6..=9 => Self::Mid,
            _ => Self::Late,
        }
    }
}

/// Fraction of the allotted schedule that has elapsed, in [0, 1].
pub fn elapsed_fraction(total_weeks: f64, weeks_remaining: f64) -> f64 {
    if total_weeks <= 0.0 {
        return 1.0;
    }
    ((total_weeks - weeks_remaining) / total_weeks).clamp(0.0, 1.0)
}
