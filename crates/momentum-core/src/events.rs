use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::reward::RewardCatalogEntry;
use crate::timer::SessionKind;

/// Every cross-component state change produces an Event.
///
/// Components return events instead of calling each other; the owning
/// [`App`](crate::App) decides what they trigger (points, persistence,
/// notifications).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TaskAdded {
        task_id: String,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        task_id: String,
    },
    TaskReopened {
        task_id: String,
    },
    TaskRemoved {
        task_id: String,
    },
    SessionStarted {
        kind: SessionKind,
        duration_secs: u32,
    },
    SessionPaused {
        kind: SessionKind,
        remaining_secs: u32,
    },
    SessionResumed {
        kind: SessionKind,
        remaining_secs: u32,
    },
    SessionCancelled {
        kind: SessionKind,
        remaining_secs: u32,
    },
    /// A countdown reached zero. Fired once per session.
    SessionCompleted {
        kind: SessionKind,
    },
    /// Daily usage crossed the limit. Fired once per crossing.
    UsageLimitReached {
        date: NaiveDate,
        today_minutes: u32,
        limit_minutes: u32,
    },
    PointsAwarded {
        amount: u64,
        balance: u64,
    },
    RewardPending {
        reward: RewardCatalogEntry,
        ready_at: DateTime<Utc>,
    },
    RewardUnlocked {
        reward: RewardCatalogEntry,
        at: DateTime<Utc>,
    },
}
