use std::sync::Arc;

use crate::common::Value;
use crate::errors::SedimentResult;
use crate::store::batch::WriteBatch;

/// Traversal direction for rank-range queries on sorted sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeOrder {
    /// Lowest score first.
    Ascending,
    /// Highest score first.
    Descending,
}

/// Low-level interface for key/value store implementations.
///
/// # Purpose
/// Defines the primitive operations this layer requires from the underlying
/// store: hash-map field access, sorted-set membership with rank-range
/// queries, and an atomic batch commit. Implementers provide concrete
/// storage, such as the in-memory backend or an adapter over a remote store.
///
/// # Key methods
/// - **Hash maps**: `hash_get()`, `hash_multi_get()`, `hash_set()`,
///   `hash_delete()`, `delete_key()`
/// - **Sorted sets**: `sorted_add()`, `sorted_remove()`, `sorted_range()`
/// - **Batching**: `commit()` applies a [WriteBatch] as one all-or-nothing
///   unit
/// - **Lifecycle**: `close()`, `is_closed()`
///
/// # Thread safety
/// Implementers must be `Send + Sync`; the handle is shared read-only across
/// all model operations.
pub trait KvStoreProvider: Send + Sync {
    /// Retrieves a single field from a hash map.
    ///
    /// # Returns
    /// * `Ok(Some(value))` if the key and field exist
    /// * `Ok(None)` if either is missing
    fn hash_get(&self, key: &str, field: &str) -> SedimentResult<Option<Value>>;

    /// Retrieves multiple fields from a hash map, positionally.
    ///
    /// The result has the same length and order as `fields`, with `None` in
    /// the positions of missing fields. Fields are never silently dropped.
    fn hash_multi_get(&self, key: &str, fields: &[String]) -> SedimentResult<Vec<Option<Value>>>;

    /// Sets a single field in a hash map.
    fn hash_set(&self, key: &str, field: &str, value: Value) -> SedimentResult<()>;

    /// Deletes a single field from a hash map. Missing fields are a no-op.
    fn hash_delete(&self, key: &str, field: &str) -> SedimentResult<()>;

    /// Deletes an entire map entry. Missing keys are a no-op.
    fn delete_key(&self, key: &str) -> SedimentResult<()>;

    /// Adds a member with a score to a sorted set, replacing the member's
    /// previous score if it was already present.
    fn sorted_add(&self, key: &str, member: &str, score: i64) -> SedimentResult<()>;

    /// Removes a member from a sorted set. Missing members are a no-op.
    fn sorted_remove(&self, key: &str, member: &str) -> SedimentResult<()>;

    /// Returns members of a sorted set by rank range, both bounds inclusive
    /// and zero-based, in the requested order.
    ///
    /// A rank range past the end of the set yields the members that do fall
    /// inside it (possibly none); an unknown key yields an empty vector.
    fn sorted_range(
        &self,
        key: &str,
        start: u64,
        end: u64,
        order: RangeOrder,
    ) -> SedimentResult<Vec<String>>;

    /// Applies every operation queued in the batch as one all-or-nothing
    /// unit. Either all index mutations and the primary write land together,
    /// or none do.
    fn commit(&self, batch: WriteBatch) -> SedimentResult<()>;

    /// Closes the store. Further operations fail with `StoreAlreadyClosed`.
    fn close(&self) -> SedimentResult<()>;

    /// Checks whether the store has been closed.
    fn is_closed(&self) -> SedimentResult<bool>;
}

/// Cloneable handle over a [KvStoreProvider] implementation.
///
/// All clones share the same underlying provider; the handle is what gets
/// threaded through models, accessors, and the maintenance engine.
#[derive(Clone)]
pub struct KvStore {
    inner: Arc<dyn KvStoreProvider>,
}

impl KvStore {
    /// Wraps a provider implementation.
    pub fn new<P: KvStoreProvider + 'static>(provider: P) -> Self {
        KvStore {
            inner: Arc::new(provider),
        }
    }

    pub fn hash_get(&self, key: &str, field: &str) -> SedimentResult<Option<Value>> {
        self.inner.hash_get(key, field)
    }

    pub fn hash_multi_get(
        &self,
        key: &str,
        fields: &[String],
    ) -> SedimentResult<Vec<Option<Value>>> {
        self.inner.hash_multi_get(key, fields)
    }

    pub fn hash_set(&self, key: &str, field: &str, value: Value) -> SedimentResult<()> {
        self.inner.hash_set(key, field, value)
    }

    pub fn hash_delete(&self, key: &str, field: &str) -> SedimentResult<()> {
        self.inner.hash_delete(key, field)
    }

    pub fn delete_key(&self, key: &str) -> SedimentResult<()> {
        self.inner.delete_key(key)
    }

    pub fn sorted_add(&self, key: &str, member: &str, score: i64) -> SedimentResult<()> {
        self.inner.sorted_add(key, member, score)
    }

    pub fn sorted_remove(&self, key: &str, member: &str) -> SedimentResult<()> {
        self.inner.sorted_remove(key, member)
    }

    pub fn sorted_range(
        &self,
        key: &str,
        start: u64,
        end: u64,
        order: RangeOrder,
    ) -> SedimentResult<Vec<String>> {
        self.inner.sorted_range(key, start, end, order)
    }

    pub fn commit(&self, batch: WriteBatch) -> SedimentResult<()> {
        self.inner.commit(batch)
    }

    pub fn close(&self) -> SedimentResult<()> {
        self.inner.close()
    }

    pub fn is_closed(&self) -> SedimentResult<bool> {
        self.inner.is_closed()
    }
}

impl std::fmt::Debug for KvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KvStore")
    }
}
