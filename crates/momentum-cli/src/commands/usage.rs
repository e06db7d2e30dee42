use clap::Subcommand;

use super::{open_app, print_json, report_warnings, today, CommandResult};

#[derive(Subcommand)]
pub enum UsageAction {
    /// Record minutes of social media use today
    Add {
        /// Minutes used
        minutes: u32,
    },
    /// Set the daily limit in minutes
    Limit {
        /// New limit
        minutes: u32,
    },
    /// Zero today's running total (history is kept)
    Reset,
    /// Per-day minutes, oldest first
    History {
        /// Number of days ending today (defaults to usage.history_days)
        #[arg(long)]
        days: Option<u32>,
    },
    /// Today's total against the limit
    Status,
}

pub fn run(action: UsageAction) -> CommandResult {
    let mut app = open_app()?;
    let today = today();

    match action {
        UsageAction::Add { minutes } => {
            let applied = app.add_usage(minutes, today)?;
            print_json(&applied)?;
        }
        UsageAction::Limit { minutes } => {
            let applied = app.set_usage_limit(minutes, today)?;
            print_json(&applied)?;
        }
        UsageAction::Reset => {
            print_json(&app.reset_usage(today))?;
        }
        UsageAction::History { days } => {
            let days = days.unwrap_or(app.config().usage.history_days);
            print_json(&app.usage_history(days, today)?)?;
        }
        UsageAction::Status => {
            print_json(&app.usage_status(today))?;
        }
    }

    report_warnings(&mut app);
    Ok(())
}
