//! Daily activity streak.
//!
//! The streak counts consecutive calendar days on which the app was opened.
//! [`StreakTracker::touch`] is a pure function of the stored state and the
//! date passed in, so callers never need to mock the clock.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub count: u32,
    pub last_active_date: Option<NaiveDate>,
}

/// What a call to [`StreakTracker::touch`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakChange {
    /// Already counted for this date.
    Unchanged,
    /// Consecutive day.
    Extended,
    /// First run or a gap of more than one day.
    Reset,
}

#[derive(Debug, Clone, Default)]
pub struct StreakTracker {
    state: StreakState,
}

impl StreakTracker {
    pub fn new(state: StreakState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> StreakState {
        self.state
    }

    /// Record activity on `today`.
    ///
    /// A `today` earlier than the stored date (clock moved backwards) is
    /// treated like a repeat visit and leaves the streak alone.
    pub fn touch(&mut self, today: NaiveDate) -> (StreakState, StreakChange) {
        let change = match self.state.last_active_date {
            Some(last) if last >= today => StreakChange::Unchanged,
            Some(last) if last.succ_opt() == Some(today) => StreakChange::Extended,
            _ => StreakChange::Reset,
        };

        match change {
            StreakChange::Unchanged => {}
            StreakChange::Extended => {
                self.state.count = self.state.count.saturating_add(1);
                self.state.last_active_date = Some(today);
            }
            StreakChange::Reset => {
                self.state.count = 1;
                self.state.last_active_date = Some(today);
            }
        }

        if change != StreakChange::Unchanged {
            tracing::debug!(count = self.state.count, ?change, "streak touched");
        }
        (self.state, change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn first_run_starts_at_one() {
        let mut tracker = StreakTracker::default();
        let (state, change) = tracker.touch(date("2024-01-01"));
        assert_eq!(state.count, 1);
        assert_eq!(state.last_active_date, Some(date("2024-01-01")));
        assert_eq!(change, StreakChange::Reset);
    }

    #[test]
    fn consecutive_day_extends_then_gap_resets() {
        let mut tracker = StreakTracker::new(StreakState {
            count: 3,
            last_active_date: Some(date("2024-01-01")),
        });

        let (state, change) = tracker.touch(date("2024-01-02"));
        assert_eq!(state.count, 4);
        assert_eq!(state.last_active_date, Some(date("2024-01-02")));
        assert_eq!(change, StreakChange::Extended);

        let (state, change) = tracker.touch(date("2024-01-04"));
        assert_eq!(state.count, 1);
        assert_eq!(state.last_active_date, Some(date("2024-01-04")));
        assert_eq!(change, StreakChange::Reset);
    }

    #[test]
    fn same_day_does_not_double_count() {
        let mut tracker = StreakTracker::new(StreakState {
            count: 5,
            last_active_date: Some(date("2024-02-29")),
        });
        let (state, change) = tracker.touch(date("2024-02-29"));
        assert_eq!(state.count, 5);
        assert_eq!(change, StreakChange::Unchanged);
    }

    #[test]
    fn month_boundary_counts_as_consecutive() {
        let mut tracker = StreakTracker::new(StreakState {
            count: 2,
            last_active_date: Some(date("2024-02-29")),
        });
        assert_eq!(tracker.touch(date("2024-03-01")).0.count, 3);
    }

    #[test]
    fn clock_going_backwards_is_ignored() {
        let mut tracker = StreakTracker::new(StreakState {
            count: 4,
            last_active_date: Some(date("2024-01-10")),
        });
        let (state, change) = tracker.touch(date("2024-01-08"));
        assert_eq!(state.count, 4);
        assert_eq!(state.last_active_date, Some(date("2024-01-10")));
        assert_eq!(change, StreakChange::Unchanged);
    }

    proptest! {
        #[test]
        fn touch_is_idempotent_per_day(
            count in 0u32..1000,
            last_offset in proptest::option::of(0i64..40),
            repeats in 1usize..8,
        ) {
            let today = date("2024-06-15");
            let last = last_offset.map(|d| today - chrono::Duration::days(d));
            let start = StreakState { count, last_active_date: last };

            let mut once = StreakTracker::new(start);
            let expected = once.touch(today).0;

            let mut many = StreakTracker::new(start);
            for _ in 0..repeats {
                many.touch(today);
            }
            prop_assert_eq!(many.state(), expected);
        }
    }
}
