//! Points balance and reward redemption.
//!
//! Points are earned elsewhere (task completion, focus sessions) and spent
//! here on catalog entries. Entries with an unlock delay go into a single
//! pending slot that a periodic poll releases once the delay has elapsed.

mod catalog;
mod ledger;

pub use catalog::{default_catalog, RewardCatalogEntry};
pub use ledger::{ClaimOutcome, PendingUnlock, RewardLedger, UnlockedReward};
pub(crate) use ledger::PendingSlot;
