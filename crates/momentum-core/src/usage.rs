//! Daily usage quota.
//!
//! Tracks minutes per calendar date against a daily limit and raises a
//! one-shot "limit reached" signal per crossing. Rollover to a new day is
//! lazy: every operation that receives `today` first calls
//! [`UsageGuard::roll_over`].

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::events::Event;

/// Longest window [`UsageGuard::history`] will report, about ten years.
pub const MAX_HISTORY_DAYS: u32 = 3660;

/// One day of recorded usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEntry {
    pub date: NaiveDate,
    pub minutes: u32,
}

/// Persisted shape of the guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageState {
    pub daily: Vec<UsageEntry>,
    pub today_minutes: u32,
    pub limit_minutes: u32,
    pub limit_reached: bool,
    pub tracked_date: Option<NaiveDate>,
}

/// Result of [`UsageGuard::add_usage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageUpdate {
    pub date: NaiveDate,
    pub today_minutes: u32,
    pub limit_minutes: u32,
    /// True only on the call that crossed the limit.
    pub limit_reached_now: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageLevel {
    Ok,
    Warning,
    Exceeded,
}

#[derive(Debug, Clone)]
pub struct UsageGuard {
    daily: BTreeMap<NaiveDate, u32>,
    today_minutes: u32,
    limit_minutes: u32,
    limit_reached: bool,
    tracked_date: Option<NaiveDate>,
    warning_pct: u32,
}

impl UsageGuard {
    /// Create an empty guard. A zero limit is raised to one minute.
    pub fn new(limit_minutes: u32) -> Self {
        Self {
            daily: BTreeMap::new(),
            today_minutes: 0,
            limit_minutes: limit_minutes.max(1),
            limit_reached: false,
            tracked_date: None,
            warning_pct: 80,
        }
    }

    pub fn from_state(state: UsageState) -> Self {
        let mut daily = BTreeMap::new();
        for entry in state.daily {
            *daily.entry(entry.date).or_insert(0u32) += entry.minutes;
        }
        Self {
            daily,
            today_minutes: state.today_minutes,
            limit_minutes: state.limit_minutes.max(1),
            limit_reached: state.limit_reached,
            tracked_date: state.tracked_date,
            warning_pct: 80,
        }
    }

    pub fn with_warning_pct(mut self, pct: u32) -> Self {
        self.warning_pct = pct;
        self
    }

    pub fn state(&self) -> UsageState {
        UsageState {
            daily: self
                .daily
                .iter()
                .map(|(&date, &minutes)| UsageEntry { date, minutes })
                .collect(),
            today_minutes: self.today_minutes,
            limit_minutes: self.limit_minutes,
            limit_reached: self.limit_reached,
            tracked_date: self.tracked_date,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn today_minutes(&self) -> u32 {
        self.today_minutes
    }

    pub fn limit_minutes(&self) -> u32 {
        self.limit_minutes
    }

    pub fn limit_reached(&self) -> bool {
        self.limit_reached
    }

    pub fn tracked_date(&self) -> Option<NaiveDate> {
        self.tracked_date
    }

    /// The last `days` dates ending at `today`, oldest first. Dates with no
    /// usage are reported as zero.
    ///
    /// `days` must be between 1 and [`MAX_HISTORY_DAYS`].
    pub fn history(&self, days: u32, today: NaiveDate) -> Result<Vec<UsageEntry>> {
        if days == 0 {
            return Err(ValidationError::NonPositive { field: "days" }.into());
        }
        if days > MAX_HISTORY_DAYS {
            return Err(ValidationError::InvalidValue {
                field: "days".to_string(),
                message: format!("at most {MAX_HISTORY_DAYS} days of history are kept"),
            }
            .into());
        }
        (0..u64::from(days))
            .rev()
            .map(|offset| -> Result<UsageEntry> {
                let date = today.checked_sub_days(Days::new(offset)).ok_or_else(|| {
                    ValidationError::InvalidValue {
                        field: "days".to_string(),
                        message: format!("{days} days before {today} is out of range"),
                    }
                })?;
                Ok(UsageEntry {
                    date,
                    minutes: self.daily.get(&date).copied().unwrap_or(0),
                })
            })
            .collect()
    }

    /// Classify today's usage against the limit.
    pub fn level(&self) -> UsageLevel {
        let used = self.today_minutes as u64;
        let limit = self.limit_minutes as u64;
        if used >= limit {
            UsageLevel::Exceeded
        } else if used * 100 > limit * self.warning_pct as u64 {
            UsageLevel::Warning
        } else {
            UsageLevel::Ok
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a new day if `today` differs from the tracked date.
    ///
    /// Returns true when a rollover happened.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.tracked_date == Some(today) {
            return false;
        }
        let first_run = self.tracked_date.is_none();
        self.tracked_date = Some(today);
        if first_run {
            // Legacy state had no date anchor; trust the bucket for today.
            self.today_minutes = self.daily.get(&today).copied().unwrap_or(0);
            return false;
        }
        self.reset_daily();
        self.today_minutes = self.daily.get(&today).copied().unwrap_or(0);
        tracing::debug!(%today, "usage rolled over");
        true
    }

    /// Zero the running total and clear the limit flag. Per-date history
    /// is left untouched.
    pub fn reset_daily(&mut self) {
        self.today_minutes = 0;
        self.limit_reached = false;
    }

    /// Record `minutes` of usage on `today`.
    pub fn add_usage(&mut self, minutes: u32, today: NaiveDate) -> Result<(UsageUpdate, Option<Event>)> {
        if minutes == 0 {
            return Err(ValidationError::NonPositive { field: "minutes" }.into());
        }
        self.roll_over(today);

        let bucket = self.daily.entry(today).or_insert(0);
        *bucket = bucket.saturating_add(minutes);
        self.today_minutes = self.today_minutes.saturating_add(minutes);

        let event = self.latch_limit(today);
        let update = UsageUpdate {
            date: today,
            today_minutes: self.today_minutes,
            limit_minutes: self.limit_minutes,
            limit_reached_now: event.is_some(),
        };
        Ok((update, event))
    }

    /// Replace the limit. The reached flag is not cleared.
    pub fn set_limit(&mut self, minutes: u32) -> Result<()> {
        if minutes == 0 {
            return Err(ValidationError::NonPositive { field: "limit" }.into());
        }
        self.limit_minutes = minutes;
        Ok(())
    }

    /// Re-evaluate the threshold without adding usage, e.g. after the
    /// limit was lowered.
    pub fn check_limit(&mut self, today: NaiveDate) -> Option<Event> {
        self.roll_over(today);
        self.latch_limit(today)
    }

    fn latch_limit(&mut self, today: NaiveDate) -> Option<Event> {
        if self.limit_reached || self.today_minutes < self.limit_minutes {
            return None;
        }
        self.limit_reached = true;
        tracing::info!(
            today_minutes = self.today_minutes,
            limit_minutes = self.limit_minutes,
            "daily usage limit reached"
        );
        Some(Event::UsageLimitReached {
            date: today,
            today_minutes: self.today_minutes,
            limit_minutes: self.limit_minutes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn limit_fires_once_per_crossing() {
        let today = date("2024-03-10");
        let mut guard = UsageGuard::new(30);
        guard.set_limit(60).unwrap();

        let (update, event) = guard.add_usage(61, today).unwrap();
        assert!(update.limit_reached_now);
        assert!(guard.limit_reached());
        assert!(matches!(event, Some(Event::UsageLimitReached { today_minutes: 61, .. })));

        let (update, event) = guard.add_usage(5, today).unwrap();
        assert!(!update.limit_reached_now);
        assert!(event.is_none());
        assert_eq!(guard.today_minutes(), 66);
    }

    #[test]
    fn reaching_limit_exactly_counts() {
        let today = date("2024-03-10");
        let mut guard = UsageGuard::new(60);
        assert!(guard.add_usage(59, today).unwrap().1.is_none());
        assert!(guard.add_usage(1, today).unwrap().1.is_some());
    }

    #[test]
    fn zero_minutes_is_rejected_without_change() {
        let mut guard = UsageGuard::new(60);
        assert!(guard.add_usage(0, date("2024-03-10")).is_err());
        assert_eq!(guard.today_minutes(), 0);
        assert!(guard.set_limit(0).is_err());
        assert_eq!(guard.limit_minutes(), 60);
    }

    #[test]
    fn set_limit_keeps_flag_and_lowering_is_checked() {
        let today = date("2024-03-10");
        let mut guard = UsageGuard::new(60);
        guard.add_usage(40, today).unwrap();
        guard.set_limit(30).unwrap();
        assert!(!guard.limit_reached());
        assert!(guard.check_limit(today).is_some());
        assert!(guard.check_limit(today).is_none());

        guard.set_limit(120).unwrap();
        assert!(guard.limit_reached());
    }

    #[test]
    fn new_day_rolls_over_and_can_retrigger() {
        let mut guard = UsageGuard::new(10);
        guard.add_usage(15, date("2024-03-10")).unwrap();
        assert!(guard.limit_reached());

        let (update, event) = guard.add_usage(3, date("2024-03-11")).unwrap();
        assert_eq!(update.today_minutes, 3);
        assert!(event.is_none());
        assert!(!guard.limit_reached());

        let (_, event) = guard.add_usage(7, date("2024-03-11")).unwrap();
        assert!(event.is_some());

        let history = guard.history(2, date("2024-03-11")).unwrap();
        assert_eq!(history[0].minutes, 15);
        assert_eq!(history[1].minutes, 10);
    }

    #[test]
    fn reset_daily_keeps_history() {
        let today = date("2024-03-10");
        let mut guard = UsageGuard::new(10);
        guard.add_usage(12, today).unwrap();
        guard.reset_daily();
        assert_eq!(guard.today_minutes(), 0);
        assert!(!guard.limit_reached());
        assert_eq!(guard.history(1, today).unwrap()[0].minutes, 12);
    }

    #[test]
    fn history_fills_missing_days_oldest_first() {
        let mut guard = UsageGuard::new(60);
        guard.add_usage(20, date("2024-03-05")).unwrap();
        guard.add_usage(5, date("2024-03-07")).unwrap();

        let history = guard.history(7, date("2024-03-07")).unwrap();
        assert_eq!(history.len(), 7);
        assert_eq!(history[0].date, date("2024-03-01"));
        assert_eq!(history[6].date, date("2024-03-07"));
        let minutes: Vec<u32> = history.iter().map(|e| e.minutes).collect();
        assert_eq!(minutes, vec![0, 0, 0, 0, 20, 0, 5]);

        assert!(guard.history(0, date("2024-03-07")).is_err());
    }

    #[test]
    fn history_rejects_oversized_windows() {
        let guard = UsageGuard::new(60);
        let today = date("2026-10-18");

        let err = guard.history(150_000_000, today).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidValue { .. })
        ));
        assert!(guard.history(MAX_HISTORY_DAYS + 1, today).is_err());

        let longest = guard.history(MAX_HISTORY_DAYS, today).unwrap();
        assert_eq!(longest.len(), MAX_HISTORY_DAYS as usize);
        assert_eq!(longest.last().unwrap().date, today);
    }

    #[test]
    fn history_before_the_calendar_start_is_an_error() {
        let guard = UsageGuard::new(60);
        let today = NaiveDate::MIN + Days::new(2);
        assert_eq!(guard.history(3, today).unwrap()[0].date, NaiveDate::MIN);
        assert!(matches!(
            guard.history(4, today),
            Err(CoreError::Validation(ValidationError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn level_tracks_warning_threshold() {
        let today = date("2024-03-10");
        let mut guard = UsageGuard::new(100).with_warning_pct(80);
        guard.add_usage(80, today).unwrap();
        assert_eq!(guard.level(), UsageLevel::Ok);
        guard.add_usage(1, today).unwrap();
        assert_eq!(guard.level(), UsageLevel::Warning);
        guard.add_usage(19, today).unwrap();
        assert_eq!(guard.level(), UsageLevel::Exceeded);
    }

    #[test]
    fn state_roundtrip_preserves_counters() {
        let today = date("2024-03-10");
        let mut guard = UsageGuard::new(45);
        guard.add_usage(50, today).unwrap();
        let restored = UsageGuard::from_state(guard.state());
        assert_eq!(restored.today_minutes(), 50);
        assert_eq!(restored.limit_minutes(), 45);
        assert!(restored.limit_reached());
        assert_eq!(restored.tracked_date(), Some(today));
    }
}
