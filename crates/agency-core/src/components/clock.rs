//! Game clock.

use agency_logic::calendar::{CalendarDay, DAYS_PER_WEEK};
use serde::{Deserialize, Serialize};

/// Result of moving the clock forward within a workday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockStep {
    /// Still inside the workday.
    Within,
    /// Reached the end of the workday. The clock sits at the end hour and
    /// `overflow_minutes` were not applied.
    EndOfDay { overflow_minutes: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameClock {
    pub week: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    /// Manual pause from the player.
    pub paused: bool,
    /// Holding at the end of the last workday until the weekend choice.
    pub weekend_pending: bool,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new(9)
    }
}

impl GameClock {
    pub fn new(start_hour: u32) -> Self {
        Self {
            week: 1,
            day: 1,
            hour: start_hour,
            minute: 0,
            paused: false,
            weekend_pending: false,
        }
    }

    pub fn today(&self) -> CalendarDay {
        CalendarDay::new(self.week, self.day)
    }

    /// De-duplication key for the hourly event scan.
    pub fn hour_key(&self) -> (u32, u32, u32) {
        (self.week, self.day, self.hour)
    }

    /// Absolute game time in hours since week 1 day 1 00:00.
    pub fn absolute_hours(&self) -> f64 {
        self.today().ordinal() as f64 * 24.0 + self.hour as f64 + self.minute as f64 / 60.0
    }

    pub fn minutes_until(&self, end_hour: u32) -> u32 {
        (end_hour * 60).saturating_sub(self.hour * 60 + self.minute)
    }

    pub fn advance_minutes(&mut self, minutes: u32, end_hour: u32) -> ClockStep {
        let total = self.hour * 60 + self.minute + minutes;
        let end = end_hour * 60;
        if total >= end {
            self.hour = end_hour;
            self.minute = 0;
            ClockStep::EndOfDay {
                overflow_minutes: total - end,
            }
        } else {
            self.hour = total / 60;
            self.minute = total % 60;
            ClockStep::Within
        }
    }

    /// Moves to the start of the next day. Returns true on a week rollover.
    pub fn roll_day(&mut self, start_hour: u32) -> bool {
        self.hour = start_hour;
        self.minute = 0;
        self.weekend_pending = false;
        if self.day >= DAYS_PER_WEEK {
            self.day = 1;
            self.week += 1;
            true
        } else {
            self.day += 1;
            false
        }
    }
}

impl std::fmt::Display for GameClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "W{} D{} {:02}:{:02}", self.week, self.day, self.hour, self.minute)
    }
}
