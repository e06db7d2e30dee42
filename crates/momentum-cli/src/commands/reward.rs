use std::ops::ControlFlow;
use std::time::Duration;

use chrono::Utc;
use clap::Subcommand;
use momentum_core::App;
use serde_json::json;

use super::{emit, open_app, print_json, report_warnings, run_ticking, CommandResult};

#[derive(Subcommand)]
pub enum RewardAction {
    /// Show balance, catalog and any pending unlock
    List,
    /// Credit points manually
    Add {
        /// Points to add
        amount: u64,
    },
    /// Spend points on a catalog entry
    Claim {
        /// Catalog entry ID
        id: String,
    },
    /// Release the pending reward if its delay has elapsed
    Poll,
    /// Wait for the pending reward, polling every rewards.poll_secs
    Watch,
}

pub fn run(action: RewardAction) -> CommandResult {
    let mut app = open_app()?;

    match action {
        RewardAction::List => {
            let rewards = app.rewards();
            print_json(&json!({
                "balance": rewards.balance(),
                "catalog": rewards.catalog(),
                "pending": rewards.pending(),
                "minutesUntilReady": rewards.minutes_until_ready(Utc::now()),
                "unlocked": rewards.unlocked_history(),
            }))?;
        }
        RewardAction::Add { amount } => {
            let applied = app.add_points(amount)?;
            print_json(&applied)?;
        }
        RewardAction::Claim { id } => {
            let applied = app.claim_reward(&id, Utc::now())?;
            print_json(&applied)?;
        }
        RewardAction::Poll => {
            let applied = app.poll_rewards(Utc::now());
            print_json(&applied)?;
        }
        RewardAction::Watch => {
            let pending = app.rewards().pending().cloned();
            print_json(&json!({
                "pending": pending,
                "minutesUntilReady": app.rewards().minutes_until_ready(Utc::now()),
            }))?;
            if pending.is_none() {
                report_warnings(&mut app);
                return Ok(());
            }
            // Release immediately if it is already due.
            if poll(&mut app).is_break() {
                report_warnings(&mut app);
                return Ok(());
            }
            let period = Duration::from_secs(app.config().rewards.poll_secs);
            return run_ticking(app, period, poll, |_| {});
        }
    }

    report_warnings(&mut app);
    Ok(())
}

fn poll(app: &mut App) -> ControlFlow<()> {
    let applied = app.poll_rewards(Utc::now());
    if applied.value.is_some() {
        emit(&applied);
        return ControlFlow::Break(());
    }
    if app.rewards().pending().is_none() {
        return ControlFlow::Break(());
    }
    ControlFlow::Continue(())
}
