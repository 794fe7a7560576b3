//! Tunable simulation settings.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```
//! use agency_logic::config::SimConfig;
//!
//! let cfg = SimConfig::from_json_str(r#"{ "starting_money": 5000 }"#).unwrap();
//! assert_eq!(cfg.starting_money, 5000);
//! assert_eq!(cfg.campaign_weeks, 12);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::DAYS_PER_WEEK;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Simulated hours per tick.
    pub tick_hours: f64,
    pub workday_start_hour: u32,
    pub workday_end_hour: u32,
    /// Last working day of the week (1-based). The weekend choice is
    /// offered at the end of this day.
    pub last_workday: u32,
    pub campaign_weeks: u32,
    /// Hours each member gets at the start of every day.
    pub daily_hours: f64,
    /// Ceiling on a member's available hours when consequences grant more.
    pub weekly_hours: f64,
    pub starting_money: i64,
    /// Money below this ends the game.
    pub bankruptcy_floor: i64,
    pub weekly_overhead: i64,
    pub freelancer_cost: i64,
    /// Hours the lead spends answering a conversation.
    pub event_response_hours: f64,
    pub extreme_burnout_penalty_chance: f64,
    /// Burnout relief requested by calling in sick, before damping.
    pub sick_day_relief: f64,
    /// Bound on the key-moment log.
    pub max_key_moments: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_hours: 0.1,
            workday_start_hour: 9,
            workday_end_hour: 18,
            last_workday: 5,
            campaign_weeks: 12,
            daily_hours: 8.0,
            weekly_hours: 40.0,
            starting_money: 25_000,
            bankruptcy_floor: -10_000,
            weekly_overhead: 1_500,
            freelancer_cost: 2_500,
            event_response_hours: 0.5,
            extreme_burnout_penalty_chance: 0.25,
            sick_day_relief: 8.0,
            max_key_moments: 64,
        }
    }
}

impl SimConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: SimConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_hours > 0.0) {
            return Err(ConfigError::Invalid("tick_hours must be positive".into()));
        }
        if self.workday_end_hour <= self.workday_start_hour || self.workday_end_hour > 24 {
            return Err(ConfigError::Invalid(format!(
                "workday {}..{} is empty or past midnight",
                self.workday_start_hour, self.workday_end_hour
            )));
        }
        if self.last_workday == 0 || self.last_workday > DAYS_PER_WEEK {
            return Err(ConfigError::Invalid(format!(
                "last_workday {} outside 1..={}",
                self.last_workday, DAYS_PER_WEEK
            )));
        }
        if self.campaign_weeks == 0 {
            return Err(ConfigError::Invalid("campaign_weeks must be at least 1".into()));
        }
        if self.weekly_hours <= 0.0 {
            return Err(ConfigError::Invalid("weekly_hours must be positive".into()));
        }
        if !(self.daily_hours > 0.0) || self.daily_hours > self.weekly_hours {
            return Err(ConfigError::Invalid(format!(
                "daily_hours {} outside (0, {}]",
                self.daily_hours, self.weekly_hours
            )));
        }
        if !(0.0..=1.0).contains(&self.extreme_burnout_penalty_chance) {
            return Err(ConfigError::Invalid("extreme_burnout_penalty_chance must be a probability".into()));
        }
        Ok(())
    }

    pub fn workday_hours(&self) -> f64 {
        (self.workday_end_hour - self.workday_start_hour) as f64
    }

    /// Share of a workday covered by one tick.
    pub fn tick_day_fraction(&self) -> f64 {
        self.tick_hours / self.workday_hours()
    }

    /// Ticks in one full workday.
    pub fn ticks_per_workday(&self) -> f64 {
        self.workday_hours() / self.tick_hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = SimConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.workday_hours(), 9.0);
        assert!((cfg.ticks_per_workday() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = SimConfig::from_json_str(r#"{ "tick_hours": 0.25 }"#).unwrap();
        assert_eq!(cfg.tick_hours, 0.25);
        assert_eq!(cfg.last_workday, 5);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(SimConfig::from_json_str(r#"{ "tick_hours": 0 }"#).is_err());
        assert!(SimConfig::from_json_str(r#"{ "workday_start_hour": 18, "workday_end_hour": 9 }"#).is_err());
        assert!(SimConfig::from_json_str(r#"{ "last_workday": 8 }"#).is_err());
        assert!(SimConfig::from_json_str(r#"{ "campaign_weeks": 0 }"#).is_err());
        assert!(SimConfig::from_json_str(r#"{ "daily_hours": 50 }"#).is_err());
        assert!(matches!(
            SimConfig::from_json_str("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
