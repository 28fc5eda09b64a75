//! Per-day completion status for tasks placed in a month or week plan.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("day {day} is outside 1..={max}")]
    DayOutOfRange { day: u8, max: u8 },

    #[error("month {0} is outside 1..=12")]
    MonthOutOfRange(u32),

    #[error("week {0} is outside 1..=53")]
    WeekOutOfRange(u32),

    #[error("year {0} is outside 2000..=2100")]
    YearOutOfRange(i32),

    #[error("status is required")]
    MissingStatus,

    #[error("at least one task must be selected")]
    NoTasks,
}

/// Completion flag per day number `1..=MAX`.
///
/// Days never marked read as not done.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<u8, bool>", into = "BTreeMap<u8, bool>")]
pub struct DayStatusMap<const MAX: u8> {
    days: BTreeMap<u8, bool>,
}

/// Day of month, 1–31
pub type MonthDayStatus = DayStatusMap<31>;

/// Day of week, 1–7
pub type WeekDayStatus = DayStatusMap<7>;

impl<const MAX: u8> DayStatusMap<MAX> {
    pub fn new() -> Self {
        Self {
            days: BTreeMap::new(),
        }
    }

    fn check(day: u8) -> Result<(), PlanError> {
        if (1..=MAX).contains(&day) {
            Ok(())
        } else {
            Err(PlanError::DayOutOfRange { day, max: MAX })
        }
    }

    pub fn mark(&mut self, day: u8, done: bool) -> Result<(), PlanError> {
        Self::check(day)?;
        self.days.insert(day, done);
        Ok(())
    }

    /// [`mark`](Self::mark) for input where the status may be missing
    pub fn apply(&mut self, day: u8, status: Option<bool>) -> Result<(), PlanError> {
        Self::check(day)?;
        let done = status.ok_or(PlanError::MissingStatus)?;
        self.mark(day, done)
    }

    pub fn is_done(&self, day: u8) -> bool {
        self.days.get(&day).copied().unwrap_or(false)
    }

    /// Days marked done, ascending
    pub fn completed_days(&self) -> Vec<u8> {
        self.days
            .iter()
            .filter_map(|(day, done)| done.then_some(*day))
            .collect()
    }
}

impl<const MAX: u8> TryFrom<BTreeMap<u8, bool>> for DayStatusMap<MAX> {
    type Error = PlanError;

    fn try_from(days: BTreeMap<u8, bool>) -> Result<Self, Self::Error> {
        for day in days.keys() {
            Self::check(*day)?;
        }
        Ok(Self { days })
    }
}

impl<const MAX: u8> From<DayStatusMap<MAX>> for BTreeMap<u8, bool> {
    fn from(map: DayStatusMap<MAX>) -> Self {
        map.days
    }
}

fn check_year(year: i32) -> Result<(), PlanError> {
    if (2000..=2100).contains(&year) {
        Ok(())
    } else {
        Err(PlanError::YearOutOfRange(year))
    }
}

/// A validated plan period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanPeriod {
    Month { year: i32, month: u32 },
    Week { year: i32, week: u32 },
}

impl PlanPeriod {
    pub fn month(year: i32, month: u32) -> Result<Self, PlanError> {
        if !(1..=12).contains(&month) {
            return Err(PlanError::MonthOutOfRange(month));
        }
        check_year(year)?;
        Ok(PlanPeriod::Month { year, month })
    }

    pub fn week(year: i32, week: u32) -> Result<Self, PlanError> {
        if !(1..=53).contains(&week) {
            return Err(PlanError::WeekOutOfRange(week));
        }
        check_year(year)?;
        Ok(PlanPeriod::Week { year, week })
    }
}

/// A plan needs at least one task
pub fn require_tasks(task_ids: &[Uuid]) -> Result<(), PlanError> {
    if task_ids.is_empty() {
        return Err(PlanError::NoTasks);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_day_is_not_done() {
        let status = MonthDayStatus::new();
        assert!(!status.is_done(15));
        assert!(status.completed_days().is_empty());
    }

    #[test]
    fn test_mark_and_read_back() {
        let mut status = MonthDayStatus::new();
        status.mark(1, true).unwrap();
        status.mark(31, true).unwrap();
        status.mark(2, false).unwrap();

        assert!(status.is_done(1));
        assert!(!status.is_done(2));
        assert_eq!(status.completed_days(), vec![1, 31]);
    }

    #[test]
    fn test_day_range_enforced() {
        let mut month = MonthDayStatus::new();
        assert_eq!(
            month.mark(32, true),
            Err(PlanError::DayOutOfRange { day: 32, max: 31 })
        );
        assert!(month.mark(0, true).is_err());

        let mut week = WeekDayStatus::new();
        assert!(week.mark(7, true).is_ok());
        assert_eq!(
            week.mark(8, true),
            Err(PlanError::DayOutOfRange { day: 8, max: 7 })
        );
    }

    #[test]
    fn test_missing_status() {
        let mut week = WeekDayStatus::new();
        assert_eq!(week.apply(3, None), Err(PlanError::MissingStatus));
        assert!(week.apply(3, Some(true)).is_ok());
        assert!(week.is_done(3));
    }

    #[test]
    fn test_deserialize_validates_days() {
        let ok: WeekDayStatus = serde_json::from_str(r#"{"1":true,"7":false}"#).unwrap();
        assert!(ok.is_done(1));

        assert!(serde_json::from_str::<WeekDayStatus>(r#"{"9":true}"#).is_err());
    }

    #[test]
    fn test_periods() {
        assert!(PlanPeriod::month(2025, 3).is_ok());
        assert_eq!(PlanPeriod::month(2025, 13), Err(PlanError::MonthOutOfRange(13)));
        assert_eq!(PlanPeriod::month(1999, 1), Err(PlanError::YearOutOfRange(1999)));
        assert!(PlanPeriod::week(2025, 53).is_ok());
        assert_eq!(PlanPeriod::week(2025, 0), Err(PlanError::WeekOutOfRange(0)));
    }

    #[test]
    fn test_require_tasks() {
        assert_eq!(require_tasks(&[]), Err(PlanError::NoTasks));
        assert!(require_tasks(&[Uuid::now_v7()]).is_ok());
    }
}
