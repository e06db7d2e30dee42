use clap::Subcommand;
use momentum_core::Config;
use serde_json::json;

use super::{print_json, CommandResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print a single value by dot-path key
    Get {
        /// e.g. "focus.focus_secs", "points.task_completed"
        key: String,
    },
    /// Update a value and save the config file
    Set {
        key: String,
        value: String,
    },
    /// Print the whole config
    List,
    /// Overwrite the config file with defaults
    Reset,
}

pub fn run(action: ConfigAction) -> CommandResult {
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load()?
                .get(&key)
                .ok_or_else(|| format!("unknown key: {key}"))?;
            // Raw value so scripts can use it directly.
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            print_json(&json!({ "key": key, "value": config.get(&key) }))?;
        }
        ConfigAction::List => print_json(&Config::load()?)?,
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            print_json(&config)?;
        }
    }
    Ok(())
}
