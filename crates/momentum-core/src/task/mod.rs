//! Task ledger.
//!
//! Owns the user's task list. Tasks are kept most-recent-first; ids are
//! UUID v4 strings and never reused.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result, ValidationError};
use crate::events::Event;

/// Task priority.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl std::str::FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(ValidationError::InvalidValue {
                field: "priority".into(),
                message: format!("expected high, medium or low, got '{other}'"),
            }),
        }
    }
}

/// Effort class of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
    Easy,
    Moderate,
    Difficult,
    TimeTaking,
}

impl Default for TaskType {
    fn default() -> Self {
        TaskType::Moderate
    }
}

impl std::str::FromStr for TaskType {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(TaskType::Easy),
            "moderate" => Ok(TaskType::Moderate),
            "difficult" => Ok(TaskType::Difficult),
            "time-taking" | "time_taking" => Ok(TaskType::TimeTaking),
            other => Err(ValidationError::InvalidValue {
                field: "type".into(),
                message: format!("expected easy, moderate, difficult or time-taking, got '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(rename = "type", default)]
    pub task_type: TaskType,
    pub created_at: DateTime<Utc>,
}

/// Completion counts over the whole ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub total: usize,
    pub completed: usize,
    pub open: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskLedger {
    /// Most recent first.
    tasks: Vec<Task>,
}

impl TaskLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted tasks, dropping duplicate ids (first wins).
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let tasks = tasks
            .into_iter()
            .filter(|t| seen.insert(t.id.clone()))
            .collect();
        Self { tasks }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn list(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn summary(&self) -> TaskSummary {
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        TaskSummary {
            total: self.tasks.len(),
            completed,
            open: self.tasks.len() - completed,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Add a task at the front of the list.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyTitle`] if `title` is blank.
    pub fn add(
        &mut self,
        title: &str,
        priority: Priority,
        task_type: TaskType,
        now: DateTime<Utc>,
    ) -> Result<(Task, Event)> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }

        let mut id = Uuid::new_v4().to_string();
        while self.get(&id).is_some() {
            id = Uuid::new_v4().to_string();
        }

        let task = Task {
            id,
            title: title.to_string(),
            completed: false,
            priority,
            task_type,
            created_at: now,
        };
        self.tasks.insert(0, task.clone());
        tracing::debug!(task_id = %task.id, "task added");

        let event = Event::TaskAdded {
            task_id: task.id.clone(),
            at: now,
        };
        Ok((task, event))
    }

    /// Flip the completion flag.
    ///
    /// The returned event is `TaskCompleted` on a false→true flip and
    /// `TaskReopened` otherwise.
    pub fn toggle_completion(&mut self, id: &str) -> Result<(Task, Event)> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::not_found("task", id))?;

        task.completed = !task.completed;
        let event = if task.completed {
            Event::TaskCompleted {
                task_id: task.id.clone(),
            }
        } else {
            Event::TaskReopened {
                task_id: task.id.clone(),
            }
        };
        Ok((task.clone(), event))
    }

    /// Remove a task. Unknown ids are ignored.
    pub fn remove(&mut self, id: &str) -> Option<Event> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        (self.tasks.len() != before).then(|| Event::TaskRemoved {
            task_id: id.to_string(),
        })
    }
}
