pub mod config;
pub mod focus;
pub mod mood;
pub mod reward;
pub mod streak;
pub mod task;
pub mod usage;

use std::error::Error;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use momentum_core::{App, Config, Database, PersistentStore, Ticker};
use serde::Serialize;
use tokio::sync::Mutex;

pub type CommandResult = Result<(), Box<dyn Error>>;

/// Local calendar date; streak and usage days follow the user's clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Open the app against the on-disk database and config.
pub fn open_app() -> Result<App, Box<dyn Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    Ok(App::open(PersistentStore::new(db), config, today())?)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Surface writes that did not reach the database.
pub fn report_warnings(app: &mut App) {
    for warning in app.take_warnings() {
        eprintln!("warning: failed to save {}: {}", warning.component, warning.message);
    }
}

/// Print from inside a tick callback, where errors cannot be returned.
fn emit<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::warn!(error = %e, "failed to encode output"),
    }
}

/// Drive `step` on a ticker until it breaks or the user hits Ctrl-C, in
/// which case `on_interrupt` runs instead.
///
/// The app sits behind a mutex so each tick holds it only briefly.
fn run_ticking(
    app: App,
    period: Duration,
    step: fn(&mut App) -> ControlFlow<()>,
    on_interrupt: fn(&mut App),
) -> CommandResult {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let app = Arc::new(Mutex::new(app));
        let shared = Arc::clone(&app);

        let ticker = Ticker::spawn(period, move || {
            let shared = Arc::clone(&shared);
            async move {
                let mut app = shared.lock().await;
                let flow = step(&mut app);
                report_warnings(&mut app);
                flow
            }
        })?;

        tokio::select! {
            _ = ticker.finished() => {}
            _ = tokio::signal::ctrl_c() => {
                let mut app = app.lock().await;
                on_interrupt(&mut app);
                report_warnings(&mut app);
            }
        }
        Ok::<(), Box<dyn Error>>(())
    })
}
