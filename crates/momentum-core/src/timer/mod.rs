mod engine;
mod ticker;

pub use engine::{FocusSession, SessionKind, SessionState};
pub use ticker::Ticker;
