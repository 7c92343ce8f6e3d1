use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chatpulse_core::{ChatPulseError, Result};

/// A single write applied as part of a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Add `member` to the set at `key`.
    SetAdd { key: String, member: String },
    /// Overwrite `field` in the hash at `key`.
    HashSet { key: String, field: String, value: String },
    /// Increment the integer counter at `key`.
    Incr { key: String, by: i64 },
    /// Insert `member` into the ordered index at `key` with the given score.
    IndexInsert { key: String, member: String, score: i64 },
}

/// Writes that must land together or not at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: WriteOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Shared key/value, set, hash and sorted-index store holding all usage state.
///
/// Absent keys read as zero or empty. Every method is a potential suspension point.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Apply every op in `batch` atomically with respect to readers.
    async fn apply(&self, batch: WriteBatch) -> Result<()>;

    /// Cardinality of the set at `key`.
    async fn set_len(&self, key: &str) -> Result<u64>;

    /// Current value of the counter at `key`.
    async fn counter(&self, key: &str) -> Result<i64>;

    /// All values of the hash at `key`, in no particular order.
    async fn hash_values(&self, key: &str) -> Result<Vec<String>>;

    /// Number of index entries with `min <= score <= max`.
    async fn count_range(&self, key: &str, min: i64, max: i64) -> Result<u64>;

    /// Delete index entries with `score < bound`. Returns how many were removed.
    async fn remove_below(&self, key: &str, bound: i64) -> Result<u64>;
}

#[derive(Default)]
struct Keyspace {
    sets: HashMap<String, HashSet<String>>,
    hashes: HashMap<String, HashMap<String, String>>,
    counters: HashMap<String, i64>,
    indexes: HashMap<String, BTreeSet<(i64, String)>>,
}

impl Keyspace {
    fn apply_op(&mut self, op: WriteOp) {
        match op {
            WriteOp::SetAdd { key, member } => {
                self.sets.entry(key).or_default().insert(member);
            }
            WriteOp::HashSet { key, field, value } => {
                self.hashes.entry(key).or_default().insert(field, value);
            }
            WriteOp::Incr { key, by } => {
                *self.counters.entry(key).or_insert(0) += by;
            }
            WriteOp::IndexInsert { key, member, score } => {
                self.indexes.entry(key).or_default().insert((score, member));
            }
        }
    }
}

/// Process-local store. One mutex guards the whole keyspace; it is never held across an await.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    inner: Arc<Mutex<Keyspace>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Keyspace>> {
        self.inner
            .lock()
            .map_err(|_| ChatPulseError::StoreUnavailable("in-memory store lock poisoned".into()))
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn apply(&self, batch: WriteBatch) -> Result<()> {
        let mut keyspace = self.lock()?;
        for op in batch.ops {
            keyspace.apply_op(op);
        }
        Ok(())
    }

    async fn set_len(&self, key: &str) -> Result<u64> {
        let keyspace = self.lock()?;
        Ok(keyspace.sets.get(key).map_or(0, |s| s.len() as u64))
    }

    async fn counter(&self, key: &str) -> Result<i64> {
        let keyspace = self.lock()?;
        Ok(keyspace.counters.get(key).copied().unwrap_or(0))
    }

    async fn hash_values(&self, key: &str) -> Result<Vec<String>> {
        let keyspace = self.lock()?;
        Ok(keyspace
            .hashes
            .get(key)
            .map(|h| h.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn count_range(&self, key: &str, min: i64, max: i64) -> Result<u64> {
        if min > max {
            return Ok(0);
        }
        let keyspace = self.lock()?;
        let Some(index) = keyspace.indexes.get(key) else {
            return Ok(0);
        };
        let count = index
            .range((min, String::new())..)
            .take_while(|(score, _)| *score <= max)
            .count();
        Ok(count as u64)
    }

    async fn remove_below(&self, key: &str, bound: i64) -> Result<u64> {
        let mut keyspace = self.lock()?;
        let Some(index) = keyspace.indexes.get_mut(key) else {
            return Ok(0);
        };
        let kept = index.split_off(&(bound, String::new()));
        let removed = index.len() as u64;
        *index = kept;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(key: &str, member: &str, score: i64) -> WriteOp {
        WriteOp::IndexInsert {
            key: key.into(),
            member: member.into(),
            score,
        }
    }

    fn set_add(key: &str, member: &str) -> WriteOp {
        WriteOp::SetAdd {
            key: key.into(),
            member: member.into(),
        }
    }

    fn hash_set(key: &str, field: &str, value: &str) -> WriteOp {
        WriteOp::HashSet {
            key: key.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    #[tokio::test]
    async fn absent_keys_read_as_empty() {
        let store = InMemoryEventStore::new();
        assert_eq!(store.set_len("nope").await.unwrap(), 0);
        assert_eq!(store.counter("nope").await.unwrap(), 0);
        assert!(store.hash_values("nope").await.unwrap().is_empty());
        assert_eq!(store.count_range("nope", 0, 100).await.unwrap(), 0);
        assert_eq!(store.remove_below("nope", 100).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn batch_applies_every_op() {
        let store = InMemoryEventStore::new();
        let mut batch = WriteBatch::new();
        batch
            .push(set_add("s", "a"))
            .push(set_add("s", "a"))
            .push(hash_set("h", "a", "1"))
            .push(hash_set("h", "a", "2"))
            .push(WriteOp::Incr {
                key: "c".into(),
                by: 3,
            })
            .push(insert("i", "x", 10));
        assert_eq!(batch.len(), 6);
        store.apply(batch).await.unwrap();

        assert_eq!(store.set_len("s").await.unwrap(), 1);
        assert_eq!(store.hash_values("h").await.unwrap(), vec!["2".to_string()]);
        assert_eq!(store.counter("c").await.unwrap(), 3);
        assert_eq!(store.count_range("i", 10, 10).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn index_range_is_inclusive_and_removal_is_strict() {
        let store = InMemoryEventStore::new();
        let mut batch = WriteBatch::new();
        batch
            .push(insert("i", "a", 5))
            .push(insert("i", "b", 10))
            .push(insert("i", "c", 10))
            .push(insert("i", "d", 20));
        store.apply(batch).await.unwrap();

        assert_eq!(store.count_range("i", 10, 20).await.unwrap(), 3);
        assert_eq!(store.count_range("i", 20, 10).await.unwrap(), 0);

        assert_eq!(store.remove_below("i", 10).await.unwrap(), 1);
        assert_eq!(store.count_range("i", i64::MIN, i64::MAX).await.unwrap(), 3);
        assert_eq!(store.remove_below("i", 10).await.unwrap(), 0);
    }
}
