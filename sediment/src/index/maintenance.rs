use crate::collection::Document;
use crate::common::Value;
use crate::errors::{ErrorKind, SedimentError, SedimentResult};
use crate::index::definition::{HashIndex, IndexDefinition, IndexRegistry, SortedIndex};
use crate::store::WriteBatch;

/// Computes the batch operations needed to keep every defined index in
/// lockstep with a document's lifecycle.
///
/// The engine never touches the store: each operation emits zero or more
/// primitive [BatchOp](crate::store::BatchOp)s into a caller-supplied
/// [WriteBatch], which the orchestrator commits atomically alongside the
/// primary document write.
///
/// Three operations cover the lifecycle:
///
/// * [`index`](Self::index) - a document enters the collection
/// * [`deindex`](Self::deindex) - a document leaves the collection
/// * [`reindex`](Self::reindex) - a document's fields changed; entries are
///   moved from their old locations to their new ones, emitting nothing for
///   entries that did not move
#[derive(Clone, Debug)]
pub struct IndexMaintenance {
    registry: IndexRegistry,
}

impl IndexMaintenance {
    /// Creates a maintenance engine over a frozen registry.
    pub fn new(registry: IndexRegistry) -> Self {
        IndexMaintenance { registry }
    }

    /// The registry this engine maintains.
    pub fn registry(&self) -> &IndexRegistry {
        &self.registry
    }

    /// Emits the operations that add a document to every defined index.
    ///
    /// For every hash index, writes `field → value` under the index's literal
    /// key; for every sorted index, resolves the key template against `doc`
    /// and adds `doc[member]` with score `doc[score]`.
    ///
    /// # Errors
    /// `IndexingError`/`TemplateError` when an indexed field is missing from
    /// the document - a caller contract violation surfaced before anything
    /// is queued for that index.
    pub fn index(&self, batch: &mut WriteBatch, doc: &Document) -> SedimentResult<()> {
        for definition in self.registry.definitions() {
            match definition {
                IndexDefinition::Hash(hash) => {
                    let (field, value) = hash_entry(hash, doc)?;
                    batch.hash_set(hash.key(), &field, value);
                }
                IndexDefinition::Sorted(sorted) => {
                    let entry = sorted_entry(sorted, doc)?;
                    batch.sorted_add(&entry.key, &entry.member, entry.score);
                }
            }
        }
        Ok(())
    }

    /// Emits the operations that remove a document from every defined index.
    ///
    /// The inverse of [`index`](Self::index): removes the hash field and
    /// removes the member from the resolved sorted key.
    pub fn deindex(&self, batch: &mut WriteBatch, doc: &Document) -> SedimentResult<()> {
        for definition in self.registry.definitions() {
            match definition {
                IndexDefinition::Hash(hash) => {
                    let (field, _) = hash_entry(hash, doc)?;
                    batch.hash_delete(hash.key(), &field);
                }
                IndexDefinition::Sorted(sorted) => {
                    let entry = sorted_entry(sorted, doc)?;
                    batch.sorted_remove(&entry.key, &entry.member);
                }
            }
        }
        Ok(())
    }

    /// Emits the operations that move a document's index entries from their
    /// old state to their new state.
    ///
    /// For each hash index, the old and new field values are compared; when
    /// they differ the old mapping is removed and the new one written (the
    /// stored value is always taken from the new document). For each sorted
    /// index, the resolved key, member, and score are compared between old
    /// and new; any difference removes the old (key, member) pair and adds
    /// the new (key, member, score) triple. A score-only change still emits
    /// remove+add - the sorted primitive is not assumed to support an
    /// update-in-place.
    ///
    /// Emits nothing when nothing differs.
    pub fn reindex(
        &self,
        batch: &mut WriteBatch,
        new_doc: &Document,
        old_doc: &Document,
    ) -> SedimentResult<()> {
        for definition in self.registry.definitions() {
            match definition {
                IndexDefinition::Hash(hash) => {
                    let (old_field, _) = hash_entry(hash, old_doc)?;
                    let (new_field, new_value) = hash_entry(hash, new_doc)?;
                    if old_field != new_field {
                        batch.hash_delete(hash.key(), &old_field);
                        batch.hash_set(hash.key(), &new_field, new_value);
                    }
                }
                IndexDefinition::Sorted(sorted) => {
                    let old_entry = sorted_entry(sorted, old_doc)?;
                    let new_entry = sorted_entry(sorted, new_doc)?;
                    if old_entry != new_entry {
                        batch.sorted_remove(&old_entry.key, &old_entry.member);
                        batch.sorted_add(&new_entry.key, &new_entry.member, new_entry.score);
                    }
                }
            }
        }
        Ok(())
    }
}

fn hash_entry(hash: &HashIndex, doc: &Document) -> SedimentResult<(String, Value)> {
    let field = doc
        .get(hash.field())
        .and_then(|v| v.as_key_part())
        .ok_or_else(|| {
            log::error!(
                "Document has no usable value for hash-indexed field '{}'",
                hash.field()
            );
            SedimentError::new(
                &format!("hash-indexed field '{}' has no value", hash.field()),
                ErrorKind::IndexingError,
            )
        })?;
    let value = doc.get(hash.value()).ok_or_else(|| {
        SedimentError::new(
            &format!("hash index value field '{}' has no value", hash.value()),
            ErrorKind::IndexingError,
        )
    })?;
    Ok((field, value))
}

#[derive(PartialEq, Eq)]
struct SortedEntry {
    key: String,
    member: String,
    score: i64,
}

fn sorted_entry(sorted: &SortedIndex, doc: &Document) -> SedimentResult<SortedEntry> {
    let key = sorted.template().resolve(doc)?;
    let member = doc
        .get(sorted.member())
        .and_then(|v| v.as_key_part())
        .ok_or_else(|| {
            SedimentError::new(
                &format!("sorted index member field '{}' has no value", sorted.member()),
                ErrorKind::IndexingError,
            )
        })?;
    let score = doc
        .get(sorted.score())
        .and_then(|v| v.as_score())
        .ok_or_else(|| {
            SedimentError::new(
                &format!(
                    "sorted index score field '{}' has no numeric value",
                    sorted.score()
                ),
                ErrorKind::IndexingError,
            )
        })?;
    Ok(SortedEntry { key, member, score })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{DOC_CREATED, DOC_ID, DOC_MODIFIED};
    use crate::doc;
    use crate::store::BatchOp;

    fn registry() -> IndexRegistry {
        IndexRegistry::builder("users")
            .index_unique("email")
            .index_secondary("city")
            .unwrap()
            .index_order(DOC_CREATED)
            .unwrap()
            .build()
    }

    fn user(id: &str, email: &str, city: &str, created: i64, modified: i64) -> Document {
        doc! {
            "_id": id,
            "email": email,
            "city": city,
            "created": created,
            "modified": modified,
        }
    }

    #[test]
    fn test_index_emits_entry_per_definition() {
        let engine = IndexMaintenance::new(registry());
        let mut batch = WriteBatch::new();
        let doc = user("a1", "a@x.y", "Oslo", 100, 100);

        engine.index(&mut batch, &doc).unwrap();

        assert_eq!(
            batch.ops(),
            &[
                BatchOp::HashSet {
                    key: "users:email".to_string(),
                    field: "a@x.y".to_string(),
                    value: Value::from("a1"),
                },
                BatchOp::SortedAdd {
                    key: "users:city:Oslo".to_string(),
                    member: "a1".to_string(),
                    score: 100,
                },
                BatchOp::SortedAdd {
                    key: "users:created".to_string(),
                    member: "a1".to_string(),
                    score: 100,
                },
            ]
        );
    }

    #[test]
    fn test_deindex_is_inverse_of_index() {
        let engine = IndexMaintenance::new(registry());
        let mut batch = WriteBatch::new();
        let doc = user("a1", "a@x.y", "Oslo", 100, 100);

        engine.deindex(&mut batch, &doc).unwrap();

        assert_eq!(
            batch.ops(),
            &[
                BatchOp::HashDelete {
                    key: "users:email".to_string(),
                    field: "a@x.y".to_string(),
                },
                BatchOp::SortedRemove {
                    key: "users:city:Oslo".to_string(),
                    member: "a1".to_string(),
                },
                BatchOp::SortedRemove {
                    key: "users:created".to_string(),
                    member: "a1".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_reindex_identical_docs_emits_nothing() {
        let engine = IndexMaintenance::new(registry());
        let mut batch = WriteBatch::new();
        let doc = user("a1", "a@x.y", "Oslo", 100, 100);

        engine.reindex(&mut batch, &doc, &doc).unwrap();

        assert!(batch.is_empty());
    }

    #[test]
    fn test_reindex_non_indexed_field_change_emits_nothing() {
        let engine = IndexMaintenance::new(registry());
        let mut batch = WriteBatch::new();
        let old = user("a1", "a@x.y", "Oslo", 100, 100);
        let mut new = old.clone();
        new.put("nickname", "Al").unwrap();

        engine.reindex(&mut batch, &new, &old).unwrap();

        assert!(batch.is_empty());
    }

    #[test]
    fn test_reindex_moves_changed_hash_entry() {
        let engine = IndexMaintenance::new(registry());
        let mut batch = WriteBatch::new();
        let old = user("a1", "old@x.y", "Oslo", 100, 100);
        let new = user("a1", "new@x.y", "Oslo", 100, 100);

        engine.reindex(&mut batch, &new, &old).unwrap();

        assert_eq!(
            batch.ops(),
            &[
                BatchOp::HashDelete {
                    key: "users:email".to_string(),
                    field: "old@x.y".to_string(),
                },
                BatchOp::HashSet {
                    key: "users:email".to_string(),
                    field: "new@x.y".to_string(),
                    value: Value::from("a1"),
                },
            ]
        );
    }

    #[test]
    fn test_reindex_moves_changed_sorted_bucket() {
        let engine = IndexMaintenance::new(registry());
        let mut batch = WriteBatch::new();
        let old = user("a1", "a@x.y", "Oslo", 100, 100);
        let new = user("a1", "a@x.y", "Bergen", 100, 100);

        engine.reindex(&mut batch, &new, &old).unwrap();

        assert_eq!(
            batch.ops(),
            &[
                BatchOp::SortedRemove {
                    key: "users:city:Oslo".to_string(),
                    member: "a1".to_string(),
                },
                BatchOp::SortedAdd {
                    key: "users:city:Bergen".to_string(),
                    member: "a1".to_string(),
                    score: 100,
                },
            ]
        );
    }

    #[test]
    fn test_reindex_score_only_change_still_moves() {
        // key and member unchanged, only the score differs: the sorted
        // primitive offers no update-in-place, so remove+add is emitted
        let engine = IndexMaintenance::new(registry());
        let mut batch = WriteBatch::new();
        let old = user("a1", "a@x.y", "Oslo", 100, 100);
        let new = user("a1", "a@x.y", "Oslo", 100, 250);

        engine.reindex(&mut batch, &new, &old).unwrap();

        assert_eq!(
            batch.ops(),
            &[
                BatchOp::SortedRemove {
                    key: "users:city:Oslo".to_string(),
                    member: "a1".to_string(),
                },
                BatchOp::SortedAdd {
                    key: "users:city:Oslo".to_string(),
                    member: "a1".to_string(),
                    score: 250,
                },
            ]
        );
    }

    #[test]
    fn test_index_missing_indexed_field_fails() {
        let engine = IndexMaintenance::new(registry());
        let mut batch = WriteBatch::new();
        let doc = doc! {
            "_id": "a1",
            "city": "Oslo",
            "created": 100i64,
            "modified": 100i64,
        };

        let err = engine.index(&mut batch, &doc).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::IndexingError);
    }

    #[test]
    fn test_hash_reindex_keeps_value_from_new_document() {
        // _id is immutable in practice, but the contract says the stored
        // value is always taken from the new document
        let registry = IndexRegistry::builder("users").index_unique("email").build();
        let engine = IndexMaintenance::new(registry);
        let mut batch = WriteBatch::new();
        let old = doc! { "_id": "a1", "email": "old@x.y" };
        let new = doc! { "_id": "a1", "email": "new@x.y" };

        engine.reindex(&mut batch, &new, &old).unwrap();

        match &batch.ops()[1] {
            BatchOp::HashSet { value, .. } => assert_eq!(value, &Value::from("a1")),
            other => panic!("expected hash set, got {:?}", other),
        }
    }
}
