use dashmap::DashMap;
use std::sync::Arc;

use crate::collection::{Model, Schema};
use crate::errors::{ErrorKind, SedimentError, SedimentResult};
use crate::sediment_builder::SedimentBuilder;
use crate::sediment_config::SedimentConfig;
use crate::store::KvStore;

/// The entry point of this crate: a handle over one store and the models
/// defined on it.
///
/// `Sediment` caches one [Model] per collection name; registering the same
/// schema twice returns the already-built model. The handle uses the PIMPL
/// pattern: clones are cheap and share the model cache and the store, so a
/// handle can be passed freely across threads.
///
/// # Examples
///
/// ```rust,ignore
/// use sediment::collection::{Property, Schema, ValueKind};
/// use sediment::{doc, Sediment};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let db = Sediment::builder().open()?;
///
/// let users = db.model(
///     Schema::builder("users")
///         .property(Property::new("email").kind(ValueKind::String).required().unique())
///         .property(Property::new("created").order())
///         .build(),
/// )?;
///
/// let alice = users.insert(&doc! { "email": "alice@example.com" })?;
/// assert_eq!(users.get_by("email", "alice@example.com")?, Some(alice));
///
/// db.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Sediment {
    inner: Arc<SedimentInner>,
}

#[derive(Debug)]
struct SedimentInner {
    config: SedimentConfig,
    store: KvStore,
    models: DashMap<String, Model>,
}

impl Sediment {
    /// Creates a builder for configuring and opening an instance.
    pub fn builder() -> SedimentBuilder {
        SedimentBuilder::new()
    }

    pub(crate) fn new(config: SedimentConfig) -> Self {
        // the builder guarantees a store is configured before construction
        let store = config.store().unwrap_or_else(|_| {
            unreachable!("instance constructed without a configured store")
        });
        Sediment {
            inner: Arc::new(SedimentInner {
                config,
                store,
                models: DashMap::new(),
            }),
        }
    }

    /// Registers a schema and returns its model, building it on first use.
    ///
    /// A model already cached under the schema's collection name is returned
    /// as-is; the new schema is not compared against the cached one.
    pub fn model(&self, schema: Schema) -> SedimentResult<Model> {
        if let Some(model) = self.inner.models.get(schema.collection()) {
            return Ok(model.clone());
        }

        let model = Model::with_options(
            schema,
            self.inner.store.clone(),
            self.inner.config.defaults(),
            self.inner.config.init_options(),
        )?;
        self.inner
            .models
            .insert(model.collection().to_string(), model.clone());
        Ok(model)
    }

    /// Looks up a previously registered model by collection name.
    ///
    /// # Errors
    /// `ModelNotFound` when no schema was registered under that name.
    pub fn model_named(&self, collection: &str) -> SedimentResult<Model> {
        self.inner
            .models
            .get(collection)
            .map(|model| model.clone())
            .ok_or_else(|| {
                SedimentError::new(
                    &format!("no model registered for '{}'", collection),
                    ErrorKind::ModelNotFound,
                )
            })
    }

    /// The collection names of the registered models.
    pub fn model_names(&self) -> Vec<String> {
        self.inner.models.iter().map(|e| e.key().clone()).collect()
    }

    /// The underlying store handle.
    pub fn store(&self) -> &KvStore {
        &self.inner.store
    }

    /// Closes the underlying store. Operations on any model of this
    /// instance fail with `StoreAlreadyClosed` afterwards.
    pub fn close(&self) -> SedimentResult<()> {
        log::debug!("Closing instance with {} model(s)", self.inner.models.len());
        self.inner.store.close()
    }

    /// Checks whether the underlying store has been closed.
    pub fn is_closed(&self) -> SedimentResult<bool> {
        self.inner.store.is_closed()
    }
}
