//! Focus/rest countdown state machine.
//!
//! The session does not use internal threads or wall-clock reads. The
//! caller invokes `tick()` once per elapsed second, normally from a
//! [`Ticker`](super::Ticker).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused <-> Running) -> Complete -> Idle
//!           |            |
//!           +--cancel----+----> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = FocusSession::new(SessionKind::Focus);
//! session.start(1500)?;
//! // Once per second:
//! session.tick()?; // Returns Some(Event::SessionCompleted) at zero
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{InvalidStateError, Result, ValidationError};
use crate::events::Event;

/// Which countdown this is. Only focus sessions earn points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Focus,
    Rest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Running { remaining_secs: u32 },
    Paused { remaining_secs: u32 },
    Complete,
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Running { .. } => "running",
            SessionState::Paused { .. } => "paused",
            SessionState::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSession {
    kind: SessionKind,
    #[serde(flatten)]
    state: SessionState,
    /// Duration of the current (or last) run.
    #[serde(default)]
    duration_secs: u32,
}

impl FocusSession {
    pub fn new(kind: SessionKind) -> Self {
        Self {
            kind,
            state: SessionState::Idle,
            duration_secs: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SessionState::Running { .. })
    }

    pub fn remaining_secs(&self) -> u32 {
        match self.state {
            SessionState::Running { remaining_secs } | SessionState::Paused { remaining_secs } => {
                remaining_secs
            }
            SessionState::Idle | SessionState::Complete => 0,
        }
    }

    /// 0.0 .. 1.0 progress through the current run.
    pub fn progress(&self) -> f64 {
        match self.state {
            SessionState::Complete => 1.0,
            SessionState::Idle => 0.0,
            _ if self.duration_secs == 0 => 0.0,
            _ => 1.0 - (self.remaining_secs() as f64 / self.duration_secs as f64),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, duration_secs: u32) -> Result<Event> {
        if duration_secs == 0 {
            return Err(ValidationError::NonPositive {
                field: "duration_secs",
            }
            .into());
        }
        self.require("start", matches!(self.state, SessionState::Idle))?;
        self.state = SessionState::Running {
            remaining_secs: duration_secs,
        };
        self.duration_secs = duration_secs;
        Ok(Event::SessionStarted {
            kind: self.kind,
            duration_secs,
        })
    }

    /// Advance one second.
    ///
    /// Returns `SessionCompleted` on the tick that reaches zero. Ticks
    /// after completion are ignored so a late timer callback is harmless.
    pub fn tick(&mut self) -> Result<Option<Event>> {
        match self.state {
            SessionState::Running { remaining_secs } => {
                let remaining_secs = remaining_secs.saturating_sub(1);
                if remaining_secs == 0 {
                    self.state = SessionState::Complete;
                    tracing::debug!(kind = ?self.kind, "session complete");
                    return Ok(Some(Event::SessionCompleted { kind: self.kind }));
                }
                self.state = SessionState::Running { remaining_secs };
                Ok(None)
            }
            SessionState::Complete => Ok(None),
            other => Err(self.invalid("tick", other).into()),
        }
    }

    pub fn pause(&mut self) -> Result<Event> {
        match self.state {
            SessionState::Running { remaining_secs } => {
                self.state = SessionState::Paused { remaining_secs };
                Ok(Event::SessionPaused {
                    kind: self.kind,
                    remaining_secs,
                })
            }
            other => Err(self.invalid("pause", other).into()),
        }
    }

    pub fn resume(&mut self) -> Result<Event> {
        match self.state {
            SessionState::Paused { remaining_secs } => {
                self.state = SessionState::Running { remaining_secs };
                Ok(Event::SessionResumed {
                    kind: self.kind,
                    remaining_secs,
                })
            }
            other => Err(self.invalid("resume", other).into()),
        }
    }

    /// Abandon a running or paused session without completing it.
    pub fn cancel(&mut self) -> Result<Event> {
        match self.state {
            SessionState::Running { remaining_secs } | SessionState::Paused { remaining_secs } => {
                self.state = SessionState::Idle;
                Ok(Event::SessionCancelled {
                    kind: self.kind,
                    remaining_secs,
                })
            }
            other => Err(self.invalid("cancel", other).into()),
        }
    }

    pub fn acknowledge_complete(&mut self) -> Result<()> {
        self.require("acknowledge", matches!(self.state, SessionState::Complete))?;
        self.state = SessionState::Idle;
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn require(&self, operation: &'static str, ok: bool) -> std::result::Result<(), InvalidStateError> {
        if ok {
            Ok(())
        } else {
            Err(self.invalid(operation, self.state))
        }
    }

    fn invalid(&self, operation: &'static str, state: SessionState) -> InvalidStateError {
        InvalidStateError {
            operation,
            state: state.name(),
        }
    }
}
