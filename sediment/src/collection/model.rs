use itertools::Itertools;
use std::sync::Arc;

use crate::collection::accessor::AccessorRegistry;
use crate::collection::list_options::ListOptions;
use crate::collection::schema::{InitOptions, Schema};
use crate::collection::Document;
use crate::common::{fan_out_join, Defaults, Value, DOC_CREATED, DOC_ID, DOC_MODIFIED};
use crate::errors::{ErrorKind, SedimentError, SedimentResult};
use crate::index::definition::unique_hash_key;
use crate::index::IndexMaintenance;
use crate::store::{KvStore, WriteBatch};

/// Orchestrates the full lifecycle of one document collection.
///
/// A model binds a [Schema] to a [KvStore]: it validates and initializes
/// incoming data, enforces unique constraints, keeps every derived index in
/// lockstep with the primary write through the maintenance engine, and
/// serves reads through the generated accessors.
///
/// # Storage layout
/// The primary copy of every document lives in a single hash map keyed by
/// the collection name, with the document id as the field. All index
/// structures hold ids pointing back into that map.
///
/// # Write protocol
/// Every mutation follows the same shape: validate, check uniqueness,
/// stage the primary write plus all index mutations in one [WriteBatch],
/// and commit the batch as a unit. Uniqueness is checked before the commit
/// rather than inside it, so two racing writers can both pass the check;
/// the store's batch atomicity covers the index entries, not the check.
///
/// # Thread safety
/// The model is a cheap cloneable handle; clones share state and may be
/// used from multiple threads.
#[derive(Clone, Debug)]
pub struct Model {
    inner: Arc<ModelInner>,
}

#[derive(Debug)]
struct ModelInner {
    schema: Schema,
    maintenance: IndexMaintenance,
    accessors: AccessorRegistry,
    store: KvStore,
    defaults: Defaults,
    init_options: InitOptions,
}

impl Model {
    /// Builds a model from a schema: derives the index registry and the
    /// accessors, and binds them to the store.
    pub fn new(schema: Schema, store: KvStore, defaults: Defaults) -> SedimentResult<Model> {
        Model::with_options(schema, store, defaults, InitOptions::default())
    }

    /// [`new`](Self::new) with explicit initialization options.
    pub fn with_options(
        schema: Schema,
        store: KvStore,
        defaults: Defaults,
        init_options: InitOptions,
    ) -> SedimentResult<Model> {
        let registry = schema.build_registry()?;
        let accessors = AccessorRegistry::from_schema(&schema)?;
        log::debug!(
            "Model for '{}' set up with {} index(es) and accessors {:?}",
            schema.collection(),
            registry.definitions().len(),
            accessors.method_names()
        );
        Ok(Model {
            inner: Arc::new(ModelInner {
                schema,
                maintenance: IndexMaintenance::new(registry),
                accessors,
                store,
                defaults,
                init_options,
            }),
        })
    }

    /// The schema this model was built from.
    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    /// The collection name, which is also the primary hash key.
    pub fn collection(&self) -> &str {
        self.inner.schema.collection()
    }

    /// The accessors generated from the schema's index flags.
    pub fn accessors(&self) -> &AccessorRegistry {
        &self.inner.accessors
    }

    /// Inserts a new document.
    ///
    /// The data is validated, initialized with server-assigned defaults
    /// (`_id` when absent, `created` and `modified`), checked against every
    /// unique constraint, and committed together with all its index entries.
    ///
    /// # Errors
    /// * `ValidationError` when the data violates the schema
    /// * `InvalidOperation` when a document with the same id already exists
    /// * `UniqueConstraintViolation` when a unique property value is taken
    pub fn insert(&self, data: &Document) -> SedimentResult<Document> {
        let instance =
            self.inner
                .schema
                .initialize(data, &self.inner.defaults, &self.inner.init_options)?;
        let report = self.inner.schema.validate(&instance);
        if !report.is_valid() {
            return Err(report.into_error());
        }
        let id = self.require_id(&instance)?;

        if self.inner.store.hash_get(self.collection(), &id)?.is_some() {
            return Err(SedimentError::new(
                &format!("document '{}' already exists in '{}'", id, self.collection()),
                ErrorKind::InvalidOperation,
            ));
        }
        self.enforce_unique(&instance)?;

        let mut batch = WriteBatch::new();
        batch.hash_set(self.collection(), &id, Value::Document(instance.clone()));
        self.inner.maintenance.index(&mut batch, &instance)?;
        self.inner.store.commit(batch)?;

        log::debug!("Inserted '{}' into '{}'", id, self.collection());
        Ok(instance)
    }

    /// Replaces a stored document wholesale.
    ///
    /// The candidate is built from `data` with `_id` forced to `id`; any id
    /// the data carries is discarded. The stored `created` timestamp is
    /// carried forward regardless of what the data says; `modified` is
    /// refreshed. Index entries are moved from the old document's locations
    /// to the new one's.
    ///
    /// # Returns
    /// `Ok(None)` when no document with that id exists - a sentinel, not an
    /// error, so callers can tell "missing target" from store failures.
    ///
    /// # Errors
    /// `ValidationError` / `UniqueConstraintViolation` as for insert.
    pub fn replace(&self, id: &str, data: &Document) -> SedimentResult<Option<Document>> {
        let original = match self.get(id)? {
            Some(original) => original,
            None => return Ok(None),
        };

        let mut instance = data.clone();
        instance.remove(DOC_ID);
        instance.put(DOC_ID, id)?;
        if let Some(created) = original.get(DOC_CREATED) {
            instance.put(DOC_CREATED, created)?;
        }
        instance.put(DOC_MODIFIED, self.inner.defaults.timestamp())?;

        let report = self.inner.schema.validate(&instance);
        if !report.is_valid() {
            return Err(report.into_error());
        }
        self.enforce_unique(&instance)?;

        let mut batch = WriteBatch::new();
        batch.hash_set(self.collection(), id, Value::Document(instance.clone()));
        self.inner.maintenance.reindex(&mut batch, &instance, &original)?;
        self.inner.store.commit(batch)?;

        log::debug!("Replaced '{}' in '{}'", id, self.collection());
        Ok(Some(instance))
    }

    /// Applies a partial update to a stored document.
    ///
    /// Fields present in `changes` overwrite the stored fields; everything
    /// else is left as it was. `created` is preserved, `modified` is
    /// refreshed, and the merged document is re-validated before commit.
    ///
    /// # Returns
    /// `Ok(None)` when no document with that id exists.
    ///
    /// # Errors
    /// * `InvalidOperation` when `changes` tries to alter `_id`
    /// * `ValidationError` / `UniqueConstraintViolation` as for insert
    pub fn patch(&self, id: &str, changes: &Document) -> SedimentResult<Option<Document>> {
        let original = match self.get(id)? {
            Some(original) => original,
            None => return Ok(None),
        };

        let mut instance = original.merge(changes)?;
        if let Some(created) = original.get(DOC_CREATED) {
            instance.put(DOC_CREATED, created)?;
        }
        instance.put(DOC_MODIFIED, self.inner.defaults.timestamp())?;

        let report = self.inner.schema.validate(&instance);
        if !report.is_valid() {
            return Err(report.into_error());
        }
        self.enforce_unique(&instance)?;

        let mut batch = WriteBatch::new();
        batch.hash_set(self.collection(), id, Value::Document(instance.clone()));
        self.inner.maintenance.reindex(&mut batch, &instance, &original)?;
        self.inner.store.commit(batch)?;

        log::debug!("Patched '{}' in '{}'", id, self.collection());
        Ok(Some(instance))
    }

    /// Deletes a document and all its index entries.
    ///
    /// # Returns
    /// `Ok(false)` when no document with that id exists, `Ok(true)` after a
    /// successful delete.
    pub fn delete(&self, id: &str) -> SedimentResult<bool> {
        let original = match self.get(id)? {
            Some(original) => original,
            None => return Ok(false),
        };

        let mut batch = WriteBatch::new();
        batch.hash_delete(self.collection(), id);
        self.inner.maintenance.deindex(&mut batch, &original)?;
        self.inner.store.commit(batch)?;

        log::debug!("Deleted '{}' from '{}'", id, self.collection());
        Ok(true)
    }

    /// Deletes several documents in one commit.
    ///
    /// Ids with no stored document are skipped, repeated ids count once;
    /// the number of documents actually deleted is returned.
    pub fn delete_many(&self, ids: &[String]) -> SedimentResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let ids: Vec<String> = ids.iter().unique().cloned().collect();

        let mut batch = WriteBatch::new();
        let mut deleted = 0;
        for (id, stored) in ids.iter().zip(self.get_many(&ids)?) {
            let original = match stored {
                Some(doc) => doc,
                None => continue,
            };
            batch.hash_delete(self.collection(), id);
            self.inner.maintenance.deindex(&mut batch, &original)?;
            deleted += 1;
        }
        if deleted > 0 {
            self.inner.store.commit(batch)?;
        }

        log::debug!(
            "Deleted {} of {} document(s) from '{}'",
            deleted,
            ids.len(),
            self.collection()
        );
        Ok(deleted)
    }

    /// Retrieves a document by id.
    pub fn get(&self, id: &str) -> SedimentResult<Option<Document>> {
        match self.inner.store.hash_get(self.collection(), id)? {
            Some(value) => Ok(Some(as_document(value, id, self.collection())?)),
            None => Ok(None),
        }
    }

    /// Retrieves several documents by id, positionally.
    ///
    /// The result has the same length and order as `ids`, with `None` in
    /// the positions of missing documents. An empty input returns an empty
    /// vector without touching the store.
    pub fn get_many(&self, ids: &[String]) -> SedimentResult<Vec<Option<Document>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.inner
            .store
            .hash_multi_get(self.collection(), ids)?
            .into_iter()
            .zip(ids)
            .map(|(value, id)| match value {
                Some(value) => Ok(Some(as_document(value, id, self.collection())?)),
                None => Ok(None),
            })
            .collect()
    }

    /// Lists documents from a sorted index, paginated.
    ///
    /// Without an explicit index in the options, the collection's default
    /// chronological index is used. Ids whose document has meanwhile been
    /// deleted are dropped from the result.
    ///
    /// # Errors
    /// `IndexNotFound` when no index is named and the schema declares no
    /// `order` property.
    pub fn list(&self, options: &ListOptions) -> SedimentResult<Vec<Document>> {
        let key = match &options.index {
            Some(key) => key.clone(),
            None => self
                .inner
                .maintenance
                .registry()
                .default_order_key()
                .ok_or_else(|| {
                    SedimentError::new(
                        &format!("collection '{}' has no default order index", self.collection()),
                        ErrorKind::IndexNotFound,
                    )
                })?
                .to_string(),
        };

        let (start, end) = match options.rank_range() {
            Some(range) => range,
            None => return Ok(Vec::new()),
        };
        let ids = self
            .inner
            .store
            .sorted_range(&key, start, end, options.order.range_order())?;
        Ok(self.get_many(&ids)?.into_iter().flatten().collect())
    }

    /// Retrieves a document by the value of a unique property, the
    /// programmatic form of the generated `get_by_<property>` accessor.
    ///
    /// # Errors
    /// `IndexNotFound` when the property carries no unique flag.
    pub fn get_by(&self, property: &str, value: impl Into<Value>) -> SedimentResult<Option<Document>> {
        let accessor = self.inner.accessors.unique_for(property).ok_or_else(|| {
            SedimentError::new(
                &format!("no unique index on '{}.{}'", self.collection(), property),
                ErrorKind::IndexNotFound,
            )
        })?;
        accessor.fetch(&self.inner.store, self.collection(), &value.into())
    }

    /// Lists the documents in the sorted bucket a property value selects,
    /// the programmatic form of the generated `list_by_<property>` accessor.
    ///
    /// # Errors
    /// `IndexNotFound` when the property carries no secondary or reference
    /// flag.
    pub fn list_by(
        &self,
        property: &str,
        value: impl Into<Value>,
        options: &ListOptions,
    ) -> SedimentResult<Vec<Document>> {
        let accessor = self.inner.accessors.list_for(property).ok_or_else(|| {
            SedimentError::new(
                &format!("no list index on '{}.{}'", self.collection(), property),
                ErrorKind::IndexNotFound,
            )
        })?;
        let ids = accessor.fetch_ids(&self.inner.store, &value.into(), options)?;
        Ok(self.get_many(&ids)?.into_iter().flatten().collect())
    }

    /// Checks every unique constraint against the store, fanning the checks
    /// out across threads and joining them all.
    ///
    /// A constraint passes when the property's value is unclaimed or claimed
    /// by this same document. Properties whose value is absent or unusable
    /// as a lookup key are skipped; indexing will reject them later if the
    /// field is genuinely required by an index.
    fn enforce_unique(&self, instance: &Document) -> SedimentResult<()> {
        let own_id = instance.id();
        let mut checks: Vec<Box<dyn FnOnce() -> SedimentResult<()> + Send>> = Vec::new();

        for property in self.inner.schema.unique_properties() {
            let part = match instance.get(property.name()).and_then(|v| v.as_key_part()) {
                Some(part) => part,
                None => continue,
            };
            let store = self.inner.store.clone();
            let hash_key = unique_hash_key(self.collection(), property.name());
            let property = property.name().to_string();
            let own_id = own_id.clone();

            checks.push(Box::new(move || {
                match store.hash_get(&hash_key, &part)? {
                    None => Ok(()),
                    Some(claimed) if claimed.as_key_part() == own_id => Ok(()),
                    Some(_) => {
                        log::debug!("Unique check failed for '{}' = '{}'", property, part);
                        Err(SedimentError::new(
                            &format!("value '{}' for '{}' is already taken", part, property),
                            ErrorKind::UniqueConstraintViolation(property.clone()),
                        ))
                    }
                }
            }));
        }

        fan_out_join(checks)
    }

    fn require_id(&self, doc: &Document) -> SedimentResult<String> {
        doc.id().ok_or_else(|| {
            SedimentError::new(
                &format!("document for '{}' has no id", self.collection()),
                ErrorKind::InvalidId,
            )
        })
    }
}

fn as_document(value: Value, id: &str, collection: &str) -> SedimentResult<Document> {
    match value {
        Value::Document(doc) => Ok(doc),
        other => Err(SedimentError::new(
            &format!(
                "primary entry '{}' in '{}' is not a document: {}",
                id, collection, other
            ),
            ErrorKind::EncodingError,
        )),
    }
}
