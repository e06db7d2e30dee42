use clap::Subcommand;
use serde_json::json;

use super::{open_app, print_json, report_warnings, CommandResult};

#[derive(Subcommand)]
pub enum StreakAction {
    /// Show the current streak. Opening the app counts as today's visit.
    Show,
}

pub fn run(action: StreakAction) -> CommandResult {
    let mut app = open_app()?;

    match action {
        StreakAction::Show => {
            let state = app.streak();
            print_json(&json!({
                "count": state.count,
                "lastActiveDate": state.last_active_date,
                "change": app.streak_change(),
            }))?;
        }
    }

    report_warnings(&mut app);
    Ok(())
}
