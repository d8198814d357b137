use crate::common::Value;

/// A single primitive store operation queued into a [WriteBatch].
#[derive(Clone, Debug, PartialEq)]
pub enum BatchOp {
    /// Set a field in a hash map.
    HashSet {
        key: String,
        field: String,
        value: Value,
    },
    /// Delete a field from a hash map.
    HashDelete { key: String, field: String },
    /// Delete an entire map entry (the whole key).
    DeleteKey { key: String },
    /// Add a member with a score to a sorted set.
    SortedAdd {
        key: String,
        member: String,
        score: i64,
    },
    /// Remove a member from a sorted set.
    SortedRemove { key: String, member: String },
}

/// An ordered batch of heterogeneous store operations committed as one
/// all-or-nothing unit.
///
/// The index maintenance engine emits operations into a batch alongside the
/// primary document write; nothing is executed until the batch is handed to
/// [`KvStore::commit`](crate::store::KvStore::commit). Either every queued
/// operation lands or none does.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        WriteBatch { ops: Vec::new() }
    }

    /// Queues a hash-map set-field operation.
    pub fn hash_set(&mut self, key: &str, field: &str, value: Value) {
        self.ops.push(BatchOp::HashSet {
            key: key.to_string(),
            field: field.to_string(),
            value,
        });
    }

    /// Queues a hash-map delete-field operation.
    pub fn hash_delete(&mut self, key: &str, field: &str) {
        self.ops.push(BatchOp::HashDelete {
            key: key.to_string(),
            field: field.to_string(),
        });
    }

    /// Queues deletion of an entire map entry.
    pub fn delete_key(&mut self, key: &str) {
        self.ops.push(BatchOp::DeleteKey {
            key: key.to_string(),
        });
    }

    /// Queues a sorted-set add-member-with-score operation.
    pub fn sorted_add(&mut self, key: &str, member: &str, score: i64) {
        self.ops.push(BatchOp::SortedAdd {
            key: key.to_string(),
            member: member.to_string(),
            score,
        });
    }

    /// Queues a sorted-set remove-member operation.
    pub fn sorted_remove(&mut self, key: &str, member: &str) {
        self.ops.push(BatchOp::SortedRemove {
            key: key.to_string(),
            member: member.to_string(),
        });
    }

    /// The queued operations, in queue order.
    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    /// Number of queued operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true when nothing has been queued.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_batch() {
        let batch = WriteBatch::new();
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
    }

    #[test]
    fn test_ops_preserve_queue_order() {
        let mut batch = WriteBatch::new();
        batch.hash_set("users", "a1", Value::from("doc"));
        batch.sorted_add("users:created", "a1", 100);
        batch.hash_delete("users:email", "old@x.y");
        batch.sorted_remove("users:city:Oslo", "a1");
        batch.delete_key("users");

        assert_eq!(batch.len(), 5);
        assert!(matches!(batch.ops()[0], BatchOp::HashSet { .. }));
        assert!(matches!(batch.ops()[1], BatchOp::SortedAdd { .. }));
        assert!(matches!(batch.ops()[2], BatchOp::HashDelete { .. }));
        assert!(matches!(batch.ops()[3], BatchOp::SortedRemove { .. }));
        assert!(matches!(batch.ops()[4], BatchOp::DeleteKey { .. }));
    }

    #[test]
    fn test_sorted_add_carries_score() {
        let mut batch = WriteBatch::new();
        batch.sorted_add("k", "m", 42);

        assert_eq!(
            batch.ops()[0],
            BatchOp::SortedAdd {
                key: "k".to_string(),
                member: "m".to_string(),
                score: 42
            }
        );
    }
}
