use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::RewardCatalogEntry;
use crate::error::{CoreError, Result, ValidationError};
use crate::events::Event;

/// A claimed reward waiting for its delay to elapse.
///
/// Serialized as `{reward, unlockTime}` with the time in epoch
/// milliseconds; an empty slot is stored as both fields null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUnlock {
    pub reward: RewardCatalogEntry,
    #[serde(rename = "unlockTime", with = "chrono::serde::ts_milliseconds")]
    pub ready_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct PendingSlot {
    reward: Option<RewardCatalogEntry>,
    #[serde(rename = "unlockTime", default, with = "chrono::serde::ts_milliseconds_option")]
    ready_at: Option<DateTime<Utc>>,
}

impl From<Option<PendingUnlock>> for PendingSlot {
    fn from(pending: Option<PendingUnlock>) -> Self {
        match pending {
            Some(p) => PendingSlot {
                reward: Some(p.reward),
                ready_at: Some(p.ready_at),
            },
            None => PendingSlot::default(),
        }
    }
}

impl From<PendingSlot> for Option<PendingUnlock> {
    fn from(slot: PendingSlot) -> Self {
        match (slot.reward, slot.ready_at) {
            (Some(reward), Some(ready_at)) => Some(PendingUnlock { reward, ready_at }),
            (Some(reward), None) => {
                tracing::warn!(reward = %reward.id, "dropping pending reward with no unlock time");
                None
            }
            (None, _) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockedReward {
    pub reward: RewardCatalogEntry,
    pub unlocked_at: DateTime<Utc>,
}

/// Result of [`RewardLedger::claim`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClaimOutcome {
    Unlocked {
        reward: RewardCatalogEntry,
    },
    Pending {
        reward: RewardCatalogEntry,
        ready_at: DateTime<Utc>,
    },
    InsufficientPoints {
        balance: u64,
        cost: u64,
    },
    /// Another claim is still waiting to unlock; nothing was debited.
    AlreadyPending {
        pending: PendingUnlock,
    },
}

#[derive(Debug, Clone)]
pub struct RewardLedger {
    balance: u64,
    catalog: Vec<RewardCatalogEntry>,
    pending: Option<PendingUnlock>,
    unlocked: Vec<UnlockedReward>,
}

impl RewardLedger {
    pub fn new(catalog: Vec<RewardCatalogEntry>) -> Self {
        Self {
            balance: 0,
            catalog,
            pending: None,
            unlocked: Vec::new(),
        }
    }

    pub fn from_parts(
        balance: u64,
        catalog: Vec<RewardCatalogEntry>,
        pending: Option<PendingUnlock>,
        unlocked: Vec<UnlockedReward>,
    ) -> Self {
        Self {
            balance,
            catalog,
            pending,
            unlocked,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn catalog(&self) -> &[RewardCatalogEntry] {
        &self.catalog
    }

    pub fn entry(&self, id: &str) -> Option<&RewardCatalogEntry> {
        self.catalog.iter().find(|e| e.id == id)
    }

    pub fn pending(&self) -> Option<&PendingUnlock> {
        self.pending.as_ref()
    }

    pub fn unlocked_history(&self) -> &[UnlockedReward] {
        &self.unlocked
    }

    /// Whole minutes until the pending reward unlocks, rounded up.
    pub fn minutes_until_ready(&self, now: DateTime<Utc>) -> Option<i64> {
        self.pending.as_ref().map(|p| {
            let ms = (p.ready_at - now).num_milliseconds().max(0);
            (ms + 59_999) / 60_000
        })
    }

    pub(crate) fn pending_slot(&self) -> PendingSlot {
        self.pending.clone().into()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Credit points.
    pub fn add_points(&mut self, amount: u64) -> Result<Event> {
        if amount == 0 {
            return Err(ValidationError::NonPositive { field: "amount" }.into());
        }
        self.balance = self.balance.saturating_add(amount);
        tracing::debug!(amount, balance = self.balance, "points awarded");
        Ok(Event::PointsAwarded {
            amount,
            balance: self.balance,
        })
    }

    /// Spend points on a catalog entry.
    ///
    /// Rejections (not enough points, another unlock outstanding) are
    /// outcomes, not errors, and leave the ledger untouched.
    ///
    /// # Errors
    /// Returns `NotFound` if `entry_id` is not in the catalog.
    pub fn claim(&mut self, entry_id: &str, now: DateTime<Utc>) -> Result<(ClaimOutcome, Option<Event>)> {
        let entry = self
            .entry(entry_id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("reward", entry_id))?;

        if self.balance < entry.cost_points {
            return Ok((
                ClaimOutcome::InsufficientPoints {
                    balance: self.balance,
                    cost: entry.cost_points,
                },
                None,
            ));
        }

        if let Some(pending) = &self.pending {
            return Ok((
                ClaimOutcome::AlreadyPending {
                    pending: pending.clone(),
                },
                None,
            ));
        }

        self.balance -= entry.cost_points;

        if entry.is_delayed() {
            let ready_at = now + Duration::minutes(entry.unlock_delay_minutes as i64);
            self.pending = Some(PendingUnlock {
                reward: entry.clone(),
                ready_at,
            });
            tracing::info!(reward = %entry.id, %ready_at, "reward pending");
            let event = Event::RewardPending {
                reward: entry.clone(),
                ready_at,
            };
            Ok((
                ClaimOutcome::Pending {
                    reward: entry,
                    ready_at,
                },
                Some(event),
            ))
        } else {
            let event = self.record_unlock(entry.clone(), now);
            Ok((ClaimOutcome::Unlocked { reward: entry }, Some(event)))
        }
    }

    /// Release the pending reward if its delay has elapsed.
    ///
    /// Returns the entry exactly once; later calls return `None` until
    /// another delayed claim is made.
    pub fn poll_pending(&mut self, now: DateTime<Utc>) -> Option<(RewardCatalogEntry, Event)> {
        let ready = matches!(&self.pending, Some(p) if now >= p.ready_at);
        if !ready {
            return None;
        }
        let pending = self.pending.take()?;
        let event = self.record_unlock(pending.reward.clone(), now);
        Some((pending.reward, event))
    }

    fn record_unlock(&mut self, reward: RewardCatalogEntry, at: DateTime<Utc>) -> Event {
        tracing::info!(reward = %reward.id, "reward unlocked");
        self.unlocked.push(UnlockedReward {
            reward: reward.clone(),
            unlocked_at: at,
        });
        Event::RewardUnlocked { reward, at }
    }
}
