//! Application root.
//!
//! [`App`] owns one instance of every component, rehydrates them from the
//! [`PersistentStore`] on open, routes the events they return (point awards,
//! rest after focus) and writes each touched component back before a
//! mutator returns.
//!
//! Persistence failures never abort a mutation: the in-memory state stays
//! authoritative, the failure is logged and queued, and the caller drains
//! the queue with [`App::take_warnings`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, StorageError};
use crate::events::Event;
use crate::mood::{Classification, Mood, MoodAdvisor, NextStep, Suggestion};
use crate::reward::{
    default_catalog, ClaimOutcome, PendingSlot, RewardCatalogEntry, RewardLedger, UnlockedReward,
};
use crate::storage::{keys, Config, PersistentStore};
use crate::streak::{StreakChange, StreakState, StreakTracker};
use crate::task::{Priority, Task, TaskLedger, TaskType};
use crate::timer::{FocusSession, SessionKind, SessionState};
use crate::usage::{UsageEntry, UsageGuard, UsageLevel, UsageState, UsageUpdate};

/// A mutator's result plus every event it produced, including follow-ups
/// such as point awards.
#[derive(Debug, Clone, Serialize)]
pub struct Applied<T> {
    pub value: T,
    pub events: Vec<Event>,
}

/// A write that did not reach storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistWarning {
    pub component: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageStatus {
    pub date: NaiveDate,
    pub today_minutes: u32,
    pub limit_minutes: u32,
    pub limit_reached: bool,
    pub level: UsageLevel,
}

#[derive(Debug, Clone, Serialize)]
pub struct MoodReport {
    pub classification: Classification,
    pub suggestion: Suggestion,
    pub next_step: NextStep,
}

pub struct App {
    store: PersistentStore,
    config: Config,
    tasks: TaskLedger,
    streak: StreakTracker,
    streak_change: StreakChange,
    usage: UsageGuard,
    rewards: RewardLedger,
    focus: FocusSession,
    rest: FocusSession,
    mood: MoodAdvisor,
    warnings: Vec<PersistWarning>,
}

impl App {
    /// Rehydrate every component, then record today's activity.
    ///
    /// Malformed stored values fall back to defaults with a warning log.
    ///
    /// # Errors
    /// Returns an error only if the backend itself cannot be read.
    pub fn open(store: PersistentStore, config: Config, today: NaiveDate) -> Result<Self> {
        let tasks = TaskLedger::from_tasks(store.load_or(keys::TASKS, Vec::<Task>::new())?);

        let streak = StreakTracker::new(StreakState {
            count: store.load_or(keys::STREAK, 0u32)?,
            last_active_date: store.load_or(keys::LAST_ACTIVE_DATE, None)?,
        });

        let usage = UsageGuard::from_state(UsageState {
            daily: store.load_or(keys::USAGE, Vec::<UsageEntry>::new())?,
            today_minutes: store.load_or(keys::TODAY_USAGE, 0u32)?,
            limit_minutes: store.load_or(keys::USAGE_LIMIT, config.usage.default_limit_minutes)?,
            limit_reached: store.load_or(keys::USAGE_LIMIT_REACHED, false)?,
            tracked_date: store.load_or(keys::USAGE_DATE, None)?,
        })
        .with_warning_pct(config.usage.warning_pct);

        let catalog = match &config.rewards.catalog {
            Some(catalog) => catalog.clone(),
            None => store
                .load_or::<Option<Vec<RewardCatalogEntry>>>(keys::REWARDS, None)?
                .filter(|c| !c.is_empty())
                .unwrap_or_else(default_catalog),
        };
        let pending: PendingSlot = store.load_or(keys::PENDING_REWARDS, PendingSlot::default())?;
        let rewards = RewardLedger::from_parts(
            store.load_or(keys::REWARD_POINTS, 0u64)?,
            catalog,
            pending.into(),
            store.load_or(keys::UNLOCKED_REWARDS, Vec::<UnlockedReward>::new())?,
        );

        let focus = load_session(&store, keys::FOCUS_SESSION, SessionKind::Focus)?;
        let rest = load_session(&store, keys::REST_SESSION, SessionKind::Rest)?;

        let mut app = Self {
            store,
            config,
            tasks,
            streak,
            streak_change: StreakChange::Unchanged,
            usage,
            rewards,
            focus,
            rest,
            mood: MoodAdvisor::default(),
            warnings: Vec::new(),
        };

        let (_, change) = app.streak.touch(today);
        app.streak_change = change;
        app.usage.roll_over(today);

        app.persist_streak();
        app.persist_usage();
        app.persist_rewards();
        Ok(app)
    }

    /// Swap the sentiment scorer used by [`App::classify_mood`].
    pub fn with_mood_advisor(mut self, advisor: MoodAdvisor) -> Self {
        self.mood = advisor;
        self
    }

    /// Give back the store, e.g. to reopen against the same backend.
    pub fn into_store(self) -> PersistentStore {
        self.store
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tasks(&self) -> &TaskLedger {
        &self.tasks
    }

    pub fn streak(&self) -> StreakState {
        self.streak.state()
    }

    /// How the streak changed when this App was opened.
    pub fn streak_change(&self) -> StreakChange {
        self.streak_change
    }

    pub fn usage(&self) -> &UsageGuard {
        &self.usage
    }

    pub fn rewards(&self) -> &RewardLedger {
        &self.rewards
    }

    pub fn focus(&self) -> &FocusSession {
        &self.focus
    }

    pub fn rest(&self) -> &FocusSession {
        &self.rest
    }

    pub fn last_mood(&self) -> Option<Classification> {
        self.mood.last()
    }

    /// Drain persistence failures recorded since the last call.
    pub fn take_warnings(&mut self) -> Vec<PersistWarning> {
        std::mem::take(&mut self.warnings)
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn add_task(
        &mut self,
        title: &str,
        priority: Priority,
        task_type: TaskType,
        now: DateTime<Utc>,
    ) -> Result<Applied<Task>> {
        let (task, event) = self.tasks.add(title, priority, task_type, now)?;
        self.persist_tasks();
        Ok(self.route(task, vec![event]))
    }

    pub fn toggle_task(&mut self, id: &str) -> Result<Applied<Task>> {
        let (task, event) = self.tasks.toggle_completion(id)?;
        self.persist_tasks();
        Ok(self.route(task, vec![event]))
    }

    /// Remove a task. Returns false if no task had that id.
    pub fn remove_task(&mut self, id: &str) -> Applied<bool> {
        match self.tasks.remove(id) {
            Some(event) => {
                self.persist_tasks();
                self.route(true, vec![event])
            }
            None => self.route(false, Vec::new()),
        }
    }

    // ── Focus / rest ─────────────────────────────────────────────────

    /// Start a focus session, using the configured length if none is given.
    pub fn start_focus(&mut self, duration_secs: Option<u32>) -> Result<Applied<SessionState>> {
        let duration = duration_secs.unwrap_or(self.config.focus.focus_secs);
        let event = self.focus.start(duration)?;
        self.persist_sessions();
        Ok(self.route(self.focus.state(), vec![event]))
    }

    pub fn tick_focus(&mut self) -> Result<Applied<SessionState>> {
        let events = self.focus.tick()?.into_iter().collect();
        self.persist_sessions();
        Ok(self.route(self.focus.state(), events))
    }

    pub fn pause_focus(&mut self) -> Result<Applied<SessionState>> {
        let event = self.focus.pause()?;
        self.persist_sessions();
        Ok(self.route(self.focus.state(), vec![event]))
    }

    pub fn resume_focus(&mut self) -> Result<Applied<SessionState>> {
        let event = self.focus.resume()?;
        self.persist_sessions();
        Ok(self.route(self.focus.state(), vec![event]))
    }

    pub fn cancel_focus(&mut self) -> Result<Applied<SessionState>> {
        let event = self.focus.cancel()?;
        self.persist_sessions();
        Ok(self.route(self.focus.state(), vec![event]))
    }

    /// Dismiss a completed focus session and start the rest countdown.
    ///
    /// Any rest session left over from before is discarded first.
    pub fn acknowledge_focus(&mut self) -> Result<Applied<SessionState>> {
        self.focus.acknowledge_complete()?;
        let mut events = Vec::new();
        match self.rest.state() {
            SessionState::Running { .. } | SessionState::Paused { .. } => {
                events.push(self.rest.cancel()?);
            }
            SessionState::Complete => self.rest.acknowledge_complete()?,
            SessionState::Idle => {}
        }
        events.push(self.rest.start(self.config.focus.rest_secs)?);
        self.persist_sessions();
        Ok(self.route(self.rest.state(), events))
    }

    /// Advance the rest countdown. A finished rest returns straight to idle.
    pub fn tick_rest(&mut self) -> Result<Applied<SessionState>> {
        let events: Vec<Event> = self.rest.tick()?.into_iter().collect();
        if self.rest.state() == SessionState::Complete {
            self.rest.acknowledge_complete()?;
        }
        self.persist_sessions();
        Ok(self.route(self.rest.state(), events))
    }

    /// Close the rest period early. Ending an idle rest is a no-op.
    pub fn end_rest(&mut self) -> Result<Applied<SessionState>> {
        let events = match self.rest.state() {
            SessionState::Running { .. } | SessionState::Paused { .. } => vec![self.rest.cancel()?],
            SessionState::Complete => {
                self.rest.acknowledge_complete()?;
                Vec::new()
            }
            SessionState::Idle => return Ok(self.route(SessionState::Idle, Vec::new())),
        };
        self.persist_sessions();
        Ok(self.route(self.rest.state(), events))
    }

    // ── Rewards ──────────────────────────────────────────────────────

    /// Credit points directly, outside the usual task and focus awards.
    pub fn add_points(&mut self, amount: u64) -> Result<Applied<u64>> {
        let event = self.rewards.add_points(amount)?;
        self.persist_rewards();
        Ok(self.route(self.rewards.balance(), vec![event]))
    }

    pub fn claim_reward(&mut self, entry_id: &str, now: DateTime<Utc>) -> Result<Applied<ClaimOutcome>> {
        let (outcome, event) = self.rewards.claim(entry_id, now)?;
        if event.is_some() {
            self.persist_rewards();
        }
        Ok(self.route(outcome, event.into_iter().collect()))
    }

    /// Release the pending reward if it is ready.
    pub fn poll_rewards(&mut self, now: DateTime<Utc>) -> Applied<Option<RewardCatalogEntry>> {
        match self.rewards.poll_pending(now) {
            Some((reward, event)) => {
                self.persist_rewards();
                self.route(Some(reward), vec![event])
            }
            None => self.route(None, Vec::new()),
        }
    }

    // ── Usage ────────────────────────────────────────────────────────

    pub fn add_usage(&mut self, minutes: u32, today: NaiveDate) -> Result<Applied<UsageUpdate>> {
        let (update, event) = self.usage.add_usage(minutes, today)?;
        self.persist_usage();
        Ok(self.route(update, event.into_iter().collect()))
    }

    /// Replace the daily limit and re-check today's total against it.
    pub fn set_usage_limit(&mut self, minutes: u32, today: NaiveDate) -> Result<Applied<UsageStatus>> {
        self.usage.set_limit(minutes)?;
        let event = self.usage.check_limit(today);
        self.persist_usage();
        Ok(self.route(self.usage_snapshot(today), event.into_iter().collect()))
    }

    /// Zero today's running total. History is kept.
    pub fn reset_usage(&mut self, today: NaiveDate) -> UsageStatus {
        self.usage.roll_over(today);
        self.usage.reset_daily();
        self.persist_usage();
        self.usage_snapshot(today)
    }

    pub fn usage_history(&mut self, days: u32, today: NaiveDate) -> Result<Vec<UsageEntry>> {
        self.roll_usage(today);
        self.usage.history(days, today)
    }

    pub fn usage_status(&mut self, today: NaiveDate) -> UsageStatus {
        self.roll_usage(today);
        self.usage_snapshot(today)
    }

    // ── Mood ─────────────────────────────────────────────────────────

    pub fn classify_mood(&mut self, text: &str) -> MoodReport {
        let classification = self.mood.classify(text);
        self.mood_report(classification)
    }

    /// Advice for a mood chosen directly rather than classified from text.
    pub fn suggest_for(&self, mood: Mood) -> MoodReport {
        self.mood_report(Classification { mood, score: 0 })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn mood_report(&self, classification: Classification) -> MoodReport {
        MoodReport {
            classification,
            suggestion: MoodAdvisor::suggest(classification.mood),
            next_step: MoodAdvisor::next_step(classification.mood, self.tasks.summary()),
        }
    }

    fn usage_snapshot(&self, today: NaiveDate) -> UsageStatus {
        UsageStatus {
            date: self.usage.tracked_date().unwrap_or(today),
            today_minutes: self.usage.today_minutes(),
            limit_minutes: self.usage.limit_minutes(),
            limit_reached: self.usage.limit_reached(),
            level: self.usage.level(),
        }
    }

    fn roll_usage(&mut self, today: NaiveDate) {
        if self.usage.roll_over(today) {
            self.persist_usage();
        }
    }

    /// Apply configured point awards for `events` and append the resulting
    /// `PointsAwarded` events.
    fn route<T>(&mut self, value: T, mut events: Vec<Event>) -> Applied<T> {
        let points = &self.config.points;
        let awards: Vec<u64> = events
            .iter()
            .filter_map(|event| match event {
                Event::TaskAdded { .. } => Some(points.task_created),
                Event::TaskCompleted { .. } => Some(points.task_completed),
                Event::SessionCompleted {
                    kind: SessionKind::Focus,
                } => Some(points.focus_completed),
                _ => None,
            })
            .filter(|&amount| amount > 0)
            .collect();

        if !awards.is_empty() {
            for amount in awards {
                if let Ok(event) = self.rewards.add_points(amount) {
                    events.push(event);
                }
            }
            self.persist_rewards();
        }
        Applied { value, events }
    }

    fn persist_tasks(&mut self) {
        let entries = batch([entry(keys::TASKS, &self.tasks)]);
        self.write("tasks", entries);
    }

    fn persist_streak(&mut self) {
        let state = self.streak.state();
        let entries = batch([
            entry(keys::STREAK, &state.count),
            entry(keys::LAST_ACTIVE_DATE, &state.last_active_date),
        ]);
        self.write("streak", entries);
    }

    fn persist_usage(&mut self) {
        let state = self.usage.state();
        let entries = batch([
            entry(keys::USAGE, &state.daily),
            entry(keys::TODAY_USAGE, &state.today_minutes),
            entry(keys::USAGE_LIMIT, &state.limit_minutes),
            entry(keys::USAGE_DATE, &state.tracked_date),
            entry(keys::USAGE_LIMIT_REACHED, &state.limit_reached),
        ]);
        self.write("usage", entries);
    }

    fn persist_rewards(&mut self) {
        let entries = batch([
            entry(keys::REWARD_POINTS, &self.rewards.balance()),
            entry(keys::REWARDS, &self.rewards.catalog()),
            entry(keys::PENDING_REWARDS, &self.rewards.pending_slot()),
            entry(keys::UNLOCKED_REWARDS, &self.rewards.unlocked_history()),
        ]);
        self.write("rewards", entries);
    }

    fn persist_sessions(&mut self) {
        let entries = batch([
            entry(keys::FOCUS_SESSION, &self.focus),
            entry(keys::REST_SESSION, &self.rest),
        ]);
        self.write("sessions", entries);
    }

    fn write(&mut self, component: &'static str, batch: Result<Vec<(&'static str, Value)>, StorageError>) {
        if let Err(error) = batch.and_then(|batch| self.store.save_batch(&batch)) {
            tracing::warn!(component, %error, "failed to persist state");
            self.warnings.push(PersistWarning {
                component,
                message: error.to_string(),
            });
        }
    }
}

fn load_session(store: &PersistentStore, key: &str, kind: SessionKind) -> Result<FocusSession> {
    let session = store.load_or(key, FocusSession::new(kind))?;
    if session.kind() != kind {
        tracing::warn!(%key, "stored session has the wrong kind, resetting");
        return Ok(FocusSession::new(kind));
    }
    Ok(session)
}

type Entry = std::result::Result<(&'static str, Value), StorageError>;

fn entry<T: Serialize + ?Sized>(key: &'static str, value: &T) -> Entry {
    serde_json::to_value(value)
        .map(|v| (key, v))
        .map_err(|source| StorageError::Codec {
            key: key.to_string(),
            source,
        })
}

fn batch<const N: usize>(entries: [Entry; N]) -> Result<Vec<(&'static str, Value)>, StorageError> {
    entries.into_iter().collect()
}
