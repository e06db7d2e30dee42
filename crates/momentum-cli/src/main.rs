use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "momentum", version, about = "Momentum productivity CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Daily activity streak
    Streak {
        #[command(subcommand)]
        action: commands::streak::StreakAction,
    },
    /// Social media usage quota
    Usage {
        #[command(subcommand)]
        action: commands::usage::UsageAction,
    },
    /// Points and rewards
    Reward {
        #[command(subcommand)]
        action: commands::reward::RewardAction,
    },
    /// Focus timer control
    Focus {
        #[command(subcommand)]
        action: commands::focus::FocusAction,
    },
    /// Rest timer control
    Rest {
        #[command(subcommand)]
        action: commands::focus::RestAction,
    },
    /// Mood check-in and suggestions
    Mood {
        #[command(subcommand)]
        action: commands::mood::MoodAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Log to stderr so stdout stays machine-readable.
fn init_logging() {
    let filter = EnvFilter::try_from_env("MOMENTUM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action),
        Commands::Streak { action } => commands::streak::run(action),
        Commands::Usage { action } => commands::usage::run(action),
        Commands::Reward { action } => commands::reward::run(action),
        Commands::Focus { action } => commands::focus::run(action),
        Commands::Rest { action } => commands::focus::run_rest(action),
        Commands::Mood { action } => commands::mood::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
