use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::common::{atomic, Atomic, ReadExecutor, Value, WriteExecutor};
use crate::errors::{ErrorKind, SedimentError, SedimentResult};
use crate::store::batch::{BatchOp, WriteBatch};
use crate::store::kv_store::{KvStoreProvider, RangeOrder};

/// In-memory key/value store backend.
///
/// # Purpose
/// The reference [KvStoreProvider] implementation: hash maps and sorted sets
/// held in process memory behind a single read-write lock. `commit` applies a
/// whole batch under one write guard, which is what makes the batch
/// all-or-nothing - no reader or writer can observe a half-applied batch.
///
/// # Characteristics
/// - **Thread-safe**: clones share state through `Arc`
/// - **Non-durable**: contents are lost when the last clone is dropped
/// - **Atomic batches**: atomicity by mutual exclusion, not journaling
#[derive(Clone, Default)]
pub struct InMemoryKvStore {
    inner: Arc<InMemoryKvStoreInner>,
}

impl InMemoryKvStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        InMemoryKvStore {
            inner: Arc::new(InMemoryKvStoreInner::new()),
        }
    }
}

struct InMemoryKvStoreInner {
    state: Atomic<StoreState>,
    closed: Atomic<bool>,
}

impl Default for InMemoryKvStoreInner {
    fn default() -> Self {
        InMemoryKvStoreInner::new()
    }
}

impl InMemoryKvStoreInner {
    fn new() -> Self {
        InMemoryKvStoreInner {
            state: atomic(StoreState::default()),
            closed: atomic(false),
        }
    }

    fn check_open(&self) -> SedimentResult<()> {
        if self.closed.read_with(|closed| *closed) {
            log::error!("Operation attempted on a closed in-memory store");
            return Err(SedimentError::new(
                "store is closed",
                ErrorKind::StoreAlreadyClosed,
            ));
        }
        Ok(())
    }
}

#[derive(Default)]
struct StoreState {
    hashes: BTreeMap<String, IndexMap<String, Value>>,
    sorted: BTreeMap<String, SortedSet>,
}

impl StoreState {
    fn apply(&mut self, op: BatchOp) {
        match op {
            BatchOp::HashSet { key, field, value } => {
                self.hashes.entry(key).or_default().insert(field, value);
            }
            BatchOp::HashDelete { key, field } => {
                if let Some(hash) = self.hashes.get_mut(&key) {
                    hash.shift_remove(&field);
                    if hash.is_empty() {
                        self.hashes.remove(&key);
                    }
                }
            }
            BatchOp::DeleteKey { key } => {
                self.hashes.remove(&key);
                self.sorted.remove(&key);
            }
            BatchOp::SortedAdd { key, member, score } => {
                self.sorted.entry(key).or_default().add(member, score);
            }
            BatchOp::SortedRemove { key, member } => {
                if let Some(set) = self.sorted.get_mut(&key) {
                    set.remove(&member);
                    if set.is_empty() {
                        self.sorted.remove(&key);
                    }
                }
            }
        }
    }
}

/// A sorted set ordered by (score, member), with a member→score lookup so
/// re-adding a member replaces its previous score.
#[derive(Default)]
struct SortedSet {
    ordered: BTreeSet<(i64, String)>,
    by_member: BTreeMap<String, i64>,
}

impl SortedSet {
    fn add(&mut self, member: String, score: i64) {
        if let Some(previous) = self.by_member.insert(member.clone(), score) {
            self.ordered.remove(&(previous, member.clone()));
        }
        self.ordered.insert((score, member));
    }

    fn remove(&mut self, member: &str) {
        if let Some(score) = self.by_member.remove(member) {
            self.ordered.remove(&(score, member.to_string()));
        }
    }

    fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    fn range(&self, start: u64, end: u64, order: RangeOrder) -> Vec<String> {
        if start > end {
            return Vec::new();
        }
        let take = (end - start + 1) as usize;
        match order {
            RangeOrder::Ascending => self
                .ordered
                .iter()
                .skip(start as usize)
                .take(take)
                .map(|(_, member)| member.clone())
                .collect(),
            RangeOrder::Descending => self
                .ordered
                .iter()
                .rev()
                .skip(start as usize)
                .take(take)
                .map(|(_, member)| member.clone())
                .collect(),
        }
    }
}

impl KvStoreProvider for InMemoryKvStore {
    fn hash_get(&self, key: &str, field: &str) -> SedimentResult<Option<Value>> {
        self.inner.check_open()?;
        Ok(self.inner.state.read_with(|state| {
            state
                .hashes
                .get(key)
                .and_then(|hash| hash.get(field).cloned())
        }))
    }

    fn hash_multi_get(&self, key: &str, fields: &[String]) -> SedimentResult<Vec<Option<Value>>> {
        self.inner.check_open()?;
        Ok(self.inner.state.read_with(|state| {
            let hash = state.hashes.get(key);
            fields
                .iter()
                .map(|field| hash.and_then(|h| h.get(field).cloned()))
                .collect()
        }))
    }

    fn hash_set(&self, key: &str, field: &str, value: Value) -> SedimentResult<()> {
        self.inner.check_open()?;
        self.inner.state.write_with(|state| {
            state.apply(BatchOp::HashSet {
                key: key.to_string(),
                field: field.to_string(),
                value,
            });
        });
        Ok(())
    }

    fn hash_delete(&self, key: &str, field: &str) -> SedimentResult<()> {
        self.inner.check_open()?;
        self.inner.state.write_with(|state| {
            state.apply(BatchOp::HashDelete {
                key: key.to_string(),
                field: field.to_string(),
            });
        });
        Ok(())
    }

    fn delete_key(&self, key: &str) -> SedimentResult<()> {
        self.inner.check_open()?;
        self.inner.state.write_with(|state| {
            state.apply(BatchOp::DeleteKey {
                key: key.to_string(),
            });
        });
        Ok(())
    }

    fn sorted_add(&self, key: &str, member: &str, score: i64) -> SedimentResult<()> {
        self.inner.check_open()?;
        self.inner.state.write_with(|state| {
            state.apply(BatchOp::SortedAdd {
                key: key.to_string(),
                member: member.to_string(),
                score,
            });
        });
        Ok(())
    }

    fn sorted_remove(&self, key: &str, member: &str) -> SedimentResult<()> {
        self.inner.check_open()?;
        self.inner.state.write_with(|state| {
            state.apply(BatchOp::SortedRemove {
                key: key.to_string(),
                member: member.to_string(),
            });
        });
        Ok(())
    }

    fn sorted_range(
        &self,
        key: &str,
        start: u64,
        end: u64,
        order: RangeOrder,
    ) -> SedimentResult<Vec<String>> {
        self.inner.check_open()?;
        Ok(self.inner.state.read_with(|state| {
            state
                .sorted
                .get(key)
                .map(|set| set.range(start, end, order))
                .unwrap_or_default()
        }))
    }

    fn commit(&self, batch: WriteBatch) -> SedimentResult<()> {
        self.inner.check_open()?;
        log::debug!("Committing batch of {} operation(s)", batch.len());
        self.inner.state.write_with(|state| {
            for op in batch.ops() {
                state.apply(op.clone());
            }
        });
        Ok(())
    }

    fn close(&self) -> SedimentResult<()> {
        self.inner.closed.write_with(|closed| *closed = true);
        Ok(())
    }

    fn is_closed(&self) -> SedimentResult<bool> {
        Ok(self.inner.closed.read_with(|closed| *closed))
    }
}
