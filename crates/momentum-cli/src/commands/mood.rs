use clap::Subcommand;
use momentum_core::Mood;

use super::{open_app, print_json, report_warnings, CommandResult};

#[derive(Subcommand)]
pub enum MoodAction {
    /// Classify how you feel from free text
    Classify {
        /// e.g. "tired but hopeful"
        text: String,
    },
    /// Suggestions for a mood: positive, neutral, negative
    Suggest {
        mood: Mood,
    },
}

pub fn run(action: MoodAction) -> CommandResult {
    let mut app = open_app()?;

    match action {
        MoodAction::Classify { text } => print_json(&app.classify_mood(&text))?,
        MoodAction::Suggest { mood } => print_json(&app.suggest_for(mood))?,
    }

    report_warnings(&mut app);
    Ok(())
}
