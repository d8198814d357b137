use crate::collection::InitOptions;
use crate::common::Defaults;
use crate::errors::{SedimentError, SedimentResult};
use crate::sediment::Sediment;
use crate::sediment_config::SedimentConfig;
use crate::store::{InMemoryKvStore, KvStore};

/// Builder for configuring and opening a [Sediment] instance.
///
/// Provides a fluent API over [SedimentConfig]; configuration errors are
/// captured and surfaced when [`open`](Self::open) is called, so chains
/// never need intermediate `?`s.
///
/// # Examples
///
/// ```rust,ignore
/// use sediment::Sediment;
///
/// // in-memory instance with the standard defaults
/// let db = Sediment::builder().open()?;
///
/// // custom backend
/// let db = Sediment::builder()
///     .store(KvStore::new(my_backend))
///     .open()?;
/// ```
#[derive(Default)]
pub struct SedimentBuilder {
    error: Option<SedimentError>,
    config: SedimentConfig,
}

impl SedimentBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        SedimentBuilder {
            error: None,
            config: SedimentConfig::new(),
        }
    }

    /// Sets the store backend. May be called at most once; a second call is
    /// reported when the instance is opened.
    pub fn store(mut self, store: KvStore) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_store(store) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Replaces the provider of server-assigned ids and timestamps.
    pub fn defaults(self, defaults: Defaults) -> Self {
        if self.error.is_none() {
            self.config.set_defaults(defaults);
        }
        self
    }

    /// Sets the document initialization options applied by every model.
    pub fn init_options(self, options: InitOptions) -> Self {
        if self.error.is_none() {
            self.config.set_init_options(options);
        }
        self
    }

    /// Opens the instance.
    ///
    /// When no store was configured, an in-memory backend is created.
    ///
    /// # Errors
    /// The first error captured during configuration, if any.
    pub fn open(self) -> SedimentResult<Sediment> {
        if let Some(error) = self.error {
            log::error!("Configuration failed: {}", error);
            return Err(error);
        }
        if self.config.store().is_err() {
            self.config.set_store(KvStore::new(InMemoryKvStore::new()))?;
        }
        Ok(Sediment::new(self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_open_defaults_to_in_memory_store() {
        let db = SedimentBuilder::new().open().unwrap();
        assert!(!db.is_closed().unwrap());
    }

    #[test]
    fn test_second_store_is_reported_at_open() {
        let err = SedimentBuilder::new()
            .store(KvStore::new(InMemoryKvStore::new()))
            .store(KvStore::new(InMemoryKvStore::new()))
            .open()
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
    }
}
