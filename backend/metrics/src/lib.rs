//! Usage telemetry for chatpulse.
//!
//! Records chat events into a shared store and turns the store into
//! snapshots: lifetime totals, a 5-minute active-user gauge and a 1-minute
//! event rate, pruned lazily on every read.

pub mod aggregator;
pub mod redis_store;
pub mod report;
pub mod store;

pub use aggregator::{Aggregator, MetricKeys};
pub use redis_store::RedisEventStore;
pub use report::{gauges, render_report, Gauge};
pub use store::{EventStore, InMemoryEventStore, WriteBatch, WriteOp};

use std::sync::Arc;

use chatpulse_core::{ChatPulseError, Result};
use tracing::info;

/// URL that selects the process-local store instead of Redis.
pub const MEMORY_STORE_URL: &str = "memory://";

/// URL schemes served by [`RedisEventStore`].
pub const REDIS_SCHEMES: [&str; 4] = ["redis://", "rediss://", "redis+unix://", "unix://"];

/// Open the store named by `url`: `memory://` or a Redis URL.
///
/// An unrecognised scheme is a [`ChatPulseError::Config`]; a Redis server
/// that cannot be reached is [`ChatPulseError::StoreUnavailable`].
pub async fn open_store(url: &str) -> Result<Arc<dyn EventStore>> {
    if url.starts_with(MEMORY_STORE_URL) {
        info!("Using in-memory event store; counters reset on restart");
        return Ok(Arc::new(InMemoryEventStore::new()));
    }
    if !REDIS_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
        return Err(ChatPulseError::Config(
            "store URL must use memory:// or a redis scheme".into(),
        ));
    }
    Ok(Arc::new(RedisEventStore::connect(url).await?))
}
