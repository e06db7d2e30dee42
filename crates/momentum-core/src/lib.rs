//! # Momentum Core Library
//!
//! This library provides the state engine behind the Momentum productivity
//! app: tasks, a daily streak, a social media usage quota, a points and
//! rewards ledger, a focus/rest countdown and a mood advisor. Every
//! operation is available through the standalone `momentum` CLI.
//!
//! ## Architecture
//!
//! - **Components**: each owns one slice of state and returns [`Event`]s
//!   instead of calling its neighbours
//! - **App**: owns one instance of each component, applies point awards for
//!   the events they return and persists after every mutation
//! - **Storage**: JSON values in a SQLite key/value table, plus a TOML
//!   configuration file
//! - **Timer**: a tick-driven state machine; [`Ticker`] drives it on tokio
//!
//! ## Key Components
//!
//! - [`App`]: Application root and event router
//! - [`TaskLedger`]: Task list with priority and type metadata
//! - [`StreakTracker`]: Consecutive active-day counter
//! - [`UsageGuard`]: Daily usage minutes against a limit
//! - [`RewardLedger`]: Points balance, catalog and delayed unlocks
//! - [`FocusSession`]: Focus/rest countdown state machine
//! - [`MoodAdvisor`]: Sentiment bucket plus canned suggestions
//! - [`PersistentStore`]: Typed key/value persistence

pub mod app;
pub mod error;
pub mod events;
pub mod mood;
pub mod reward;
pub mod storage;
pub mod streak;
pub mod task;
pub mod timer;
pub mod usage;

pub use app::{App, Applied, MoodReport, PersistWarning, UsageStatus};
pub use error::{ConfigError, CoreError, InvalidStateError, StorageError, ValidationError};
pub use events::Event;
pub use mood::{Classification, LexiconScorer, Mood, MoodAdvisor, NextAction, NextStep, SentimentScorer, Suggestion};
pub use reward::{default_catalog, ClaimOutcome, PendingUnlock, RewardCatalogEntry, RewardLedger, UnlockedReward};
pub use storage::{Config, Database, KvBackend, MemoryBackend, PersistentStore};
pub use streak::{StreakChange, StreakState, StreakTracker};
pub use task::{Priority, Task, TaskLedger, TaskSummary, TaskType};
pub use timer::{FocusSession, SessionKind, SessionState, Ticker};
pub use usage::{UsageEntry, UsageGuard, UsageLevel, UsageState, UsageUpdate, MAX_HISTORY_DAYS};
