//! Usage Aggregator
//!
//! Records chat events into the shared [`EventStore`] and computes
//! [`Snapshot`]s from it: lifetime totals plus two sliding windows.
//! Holds no state of its own, so any number of aggregators (in one process or
//! many) can share a store.

use std::sync::Arc;

use chatpulse_core::{ChatEvent, Result, Snapshot};
use tracing::debug;
use uuid::Uuid;

use crate::store::{EventStore, WriteBatch, WriteOp};

/// Event-index entries older than this many seconds are pruned on every snapshot.
pub const RETENTION_SECS: i64 = 600;
/// Width of the events-per-minute window.
pub const RATE_WINDOW_SECS: i64 = 60;
/// A subject counts as active if last seen within this many seconds.
pub const ACTIVE_WINDOW_SECS: i64 = 300;

/// Store keys, all under one namespace prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricKeys {
    pub users: String,
    pub last_seen: String,
    pub messages: String,
    pub commands: String,
    pub events: String,
}

impl MetricKeys {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            users: format!("{prefix}:total_users"),
            last_seen: format!("{prefix}:last_seen"),
            messages: format!("{prefix}:msgs_total"),
            commands: format!("{prefix}:cmds_total"),
            events: format!("{prefix}:events"),
        }
    }
}

impl Default for MetricKeys {
    fn default() -> Self {
        Self::with_prefix("metrics")
    }
}

#[derive(Clone)]
pub struct Aggregator {
    store: Arc<dyn EventStore>,
    keys: MetricKeys,
}

impl Aggregator {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self::with_keys(store, MetricKeys::default())
    }

    pub fn with_keys(store: Arc<dyn EventStore>, keys: MetricKeys) -> Self {
        Self { store, keys }
    }

    pub fn keys(&self) -> &MetricKeys {
        &self.keys
    }

    /// Record one event. All effects land in a single atomic batch.
    pub async fn record(&self, event: &ChatEvent) -> Result<()> {
        let batch = self.record_batch(event);
        self.store.apply(batch).await?;
        debug!(
            subject = %event.subject_id,
            is_command = event.is_command,
            ts = event.timestamp,
            "Recorded chat event"
        );
        Ok(())
    }

    fn record_batch(&self, event: &ChatEvent) -> WriteBatch {
        let ts = event.timestamp;
        let mut batch = WriteBatch::new();
        batch
            .push(WriteOp::SetAdd {
                key: self.keys.users.clone(),
                member: event.subject_id.clone(),
            })
            .push(WriteOp::HashSet {
                key: self.keys.last_seen.clone(),
                field: event.subject_id.clone(),
                value: ts.to_string(),
            })
            .push(WriteOp::Incr {
                key: self.keys.messages.clone(),
                by: 1,
            })
            // Unique member per event so same-second events are each counted.
            .push(WriteOp::IndexInsert {
                key: self.keys.events.clone(),
                member: format!("{ts}:{}", Uuid::new_v4()),
                score: ts,
            });
        if event.is_command {
            batch.push(WriteOp::Incr {
                key: self.keys.commands.clone(),
                by: 1,
            });
        }
        batch
    }

    /// Compute a snapshot as of `now` (Unix seconds), pruning the event index first.
    ///
    /// Each field is an independent read; this is not a point-in-time view of the store.
    pub async fn snapshot(&self, now: i64) -> Result<Snapshot> {
        let pruned = self
            .store
            .remove_below(&self.keys.events, now - RETENTION_SECS)
            .await?;
        if pruned > 0 {
            debug!(pruned, now, "Pruned expired event index entries");
        }

        let total_users = self.store.set_len(&self.keys.users).await?;
        let lifetime_messages = self.store.counter(&self.keys.messages).await?.max(0) as u64;
        let lifetime_commands = self.store.counter(&self.keys.commands).await?.max(0) as u64;
        let events_per_minute = self
            .store
            .count_range(&self.keys.events, now - RATE_WINDOW_SECS, now)
            .await?;
        let last_seen = self.store.hash_values(&self.keys.last_seen).await?;
        let active_users_5m = count_active(&last_seen, now);

        Ok(Snapshot {
            total_users,
            lifetime_messages,
            lifetime_commands,
            events_per_minute,
            active_users_5m,
        })
    }
}

fn count_active(last_seen: &[String], now: i64) -> u64 {
    last_seen
        .iter()
        .filter_map(|raw| {
            let parsed = parse_timestamp(raw);
            if parsed.is_none() {
                debug!(value = %raw, "Skipping malformed last-seen timestamp");
            }
            parsed
        })
        // Values far in the past may not fit `now - seen`; those are stale.
        .filter(|&seen| now.checked_sub(seen).is_some_and(|age| age <= ACTIVE_WINDOW_SECS))
        .count() as u64
}

/// Integer seconds, or a float truncated toward zero.
fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<i64>() {
        return Some(secs);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
}
