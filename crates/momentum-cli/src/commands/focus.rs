use std::ops::ControlFlow;
use std::time::Duration;

use clap::Subcommand;
use momentum_core::{App, FocusSession, SessionState};
use serde_json::json;

use super::{emit, open_app, print_json, report_warnings, run_ticking, CommandResult};

#[derive(Subcommand)]
pub enum FocusAction {
    /// Start a focus session
    Start {
        /// Length in seconds (defaults to focus.focus_secs)
        #[arg(long)]
        secs: Option<u32>,
    },
    /// Advance the session by one second
    Tick,
    /// Pause the running session
    Pause,
    /// Resume a paused session
    Resume,
    /// Abandon the session without points
    Cancel,
    /// Dismiss a completed session and start the rest timer
    Ack,
    /// Print the session state
    Status,
    /// Run the session in the foreground until it completes (Ctrl-C cancels)
    Run {
        /// Length in seconds when starting fresh (defaults to focus.focus_secs)
        #[arg(long)]
        secs: Option<u32>,
    },
}

#[derive(Subcommand)]
pub enum RestAction {
    /// Advance the rest timer by one second
    Tick,
    /// End the rest period early
    End,
    /// Print the rest timer state
    Status,
}

fn status(session: &FocusSession) -> serde_json::Value {
    json!({
        "kind": session.kind(),
        "session": session.state(),
        "durationSecs": session.duration_secs(),
        "progress": session.progress(),
    })
}

pub fn run(action: FocusAction) -> CommandResult {
    let mut app = open_app()?;

    match action {
        FocusAction::Start { secs } => print_json(&app.start_focus(secs)?)?,
        FocusAction::Tick => print_json(&app.tick_focus()?)?,
        FocusAction::Pause => print_json(&app.pause_focus()?)?,
        FocusAction::Resume => print_json(&app.resume_focus()?)?,
        FocusAction::Cancel => print_json(&app.cancel_focus()?)?,
        FocusAction::Ack => print_json(&app.acknowledge_focus()?)?,
        FocusAction::Status => print_json(&status(app.focus()))?,
        FocusAction::Run { secs } => {
            match app.focus().state() {
                SessionState::Idle => print_json(&app.start_focus(secs)?)?,
                SessionState::Paused { .. } => print_json(&app.resume_focus()?)?,
                SessionState::Running { .. } => print_json(&status(app.focus()))?,
                SessionState::Complete => {
                    return Err("focus session already complete; run `momentum focus ack`".into());
                }
            }
            report_warnings(&mut app);
            let period = Duration::from_millis(app.config().focus.tick_ms);
            return run_ticking(app, period, tick_focus, cancel_focus);
        }
    }

    report_warnings(&mut app);
    Ok(())
}

pub fn run_rest(action: RestAction) -> CommandResult {
    let mut app = open_app()?;

    match action {
        RestAction::Tick => print_json(&app.tick_rest()?)?,
        RestAction::End => print_json(&app.end_rest()?)?,
        RestAction::Status => print_json(&status(app.rest()))?,
    }

    report_warnings(&mut app);
    Ok(())
}

fn tick_focus(app: &mut App) -> ControlFlow<()> {
    match app.tick_focus() {
        Ok(applied) => {
            if !applied.events.is_empty() {
                emit(&applied);
            }
            if app.focus().is_running() {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "focus tick rejected");
            ControlFlow::Break(())
        }
    }
}

fn cancel_focus(app: &mut App) {
    match app.cancel_focus() {
        Ok(applied) => emit(&applied),
        Err(e) => tracing::debug!(error = %e, "nothing to cancel"),
    }
}
