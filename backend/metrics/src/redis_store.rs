//! Redis-backed [`EventStore`].
//!
//! Batches run inside `MULTI`/`EXEC`, so several bot instances can share one
//! Redis without a reader ever seeing half of a recorded event.

use async_trait::async_trait;
use chatpulse_core::{ChatPulseError, Result};
use redis::aio::ConnectionManager;
use tracing::{debug, info};

use crate::store::{EventStore, WriteBatch, WriteOp};

fn store_err(err: redis::RedisError) -> ChatPulseError {
    ChatPulseError::StoreUnavailable(err.to_string())
}

/// Hash values as text; values that are not UTF-8 are dropped.
fn decode_values(raw: Vec<Vec<u8>>) -> Vec<String> {
    raw.into_iter()
        .filter_map(|bytes| match String::from_utf8(bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(len = e.as_bytes().len(), "Skipping non-UTF-8 hash value");
                None
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct RedisEventStore {
    conn: ConnectionManager,
}

impl RedisEventStore {
    /// Connect to the Redis server at `url` (e.g. `redis://redis:6379/0`).
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(store_err)?;
        let conn = ConnectionManager::new(client).await.map_err(store_err)?;
        info!("Connected to Redis event store");
        Ok(Self { conn })
    }
}

#[async_trait]
impl EventStore for RedisEventStore {
    async fn apply(&self, batch: WriteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut pipe = redis::pipe();
        pipe.atomic();
        for op in batch.ops() {
            match op {
                WriteOp::SetAdd { key, member } => {
                    pipe.cmd("SADD").arg(key).arg(member).ignore();
                }
                WriteOp::HashSet { key, field, value } => {
                    pipe.cmd("HSET").arg(key).arg(field).arg(value).ignore();
                }
                WriteOp::Incr { key, by } => {
                    pipe.cmd("INCRBY").arg(key).arg(*by).ignore();
                }
                WriteOp::IndexInsert { key, member, score } => {
                    pipe.cmd("ZADD").arg(key).arg(*score).arg(member).ignore();
                }
            }
        }
        let mut conn = self.conn.clone();
        pipe.query_async::<()>(&mut conn).await.map_err(store_err)
    }

    async fn set_len(&self, key: &str) -> Result<u64> {
        let mut conn = self.conn.clone();
        redis::cmd("SCARD")
            .arg(key)
            .query_async::<u64>(&mut conn)
            .await
            .map_err(store_err)
    }

    async fn counter(&self, key: &str) -> Result<i64> {
        let mut conn = self.conn.clone();
        let value = redis::cmd("GET")
            .arg(key)
            .query_async::<Option<i64>>(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(value.unwrap_or(0))
    }

    async fn hash_values(&self, key: &str) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let raw = redis::cmd("HVALS")
            .arg(key)
            .query_async::<Vec<Vec<u8>>>(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(decode_values(raw))
    }

    async fn count_range(&self, key: &str, min: i64, max: i64) -> Result<u64> {
        let mut conn = self.conn.clone();
        redis::cmd("ZCOUNT")
            .arg(key)
            .arg(min)
            .arg(max)
            .query_async::<u64>(&mut conn)
            .await
            .map_err(store_err)
    }

    async fn remove_below(&self, key: &str, bound: i64) -> Result<u64> {
        let mut conn = self.conn.clone();
        // "(" makes the upper bound exclusive.
        redis::cmd("ZREMRANGEBYSCORE")
            .arg(key)
            .arg("-inf")
            .arg(format!("({bound}"))
            .query_async::<u64>(&mut conn)
            .await
            .map_err(store_err)
    }
}
