//! Configuration for a Sediment instance.

use std::sync::Arc;

use crate::collection::InitOptions;
use crate::common::Defaults;
use crate::errors::{ErrorKind, SedimentError, SedimentResult};
use crate::store::KvStore;

/// Public interface for Sediment configuration.
///
/// A configuration binds the store backend, the defaults provider, and the
/// document initialization options together. It is frozen when the instance
/// opens: the store can be set exactly once, and further mutation fails.
#[derive(Clone, Debug)]
pub struct SedimentConfig {
    /// The pointer to implementation. Uses Arc for cheap cloning and thread safety.
    inner: Arc<SedimentConfigInner>,
}

#[derive(Debug)]
struct SedimentConfigInner {
    store: parking_lot::RwLock<Option<KvStore>>,
    defaults: parking_lot::RwLock<Defaults>,
    init_options: parking_lot::RwLock<InitOptions>,
}

impl Default for SedimentConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SedimentConfig {
    /// Creates a configuration with no store, the standard defaults
    /// provider, and default initialization options.
    pub fn new() -> Self {
        SedimentConfig {
            inner: Arc::new(SedimentConfigInner {
                store: parking_lot::RwLock::new(None),
                defaults: parking_lot::RwLock::new(Defaults::standard()),
                init_options: parking_lot::RwLock::new(InitOptions::default()),
            }),
        }
    }

    /// Returns the configured store.
    ///
    /// # Errors
    /// `InvalidOperation` when no store has been configured yet.
    pub fn store(&self) -> SedimentResult<KvStore> {
        self.inner.store.read().clone().ok_or_else(|| {
            SedimentError::new("no store configured", ErrorKind::InvalidOperation)
        })
    }

    /// Sets the store backend.
    ///
    /// # Errors
    /// `InvalidOperation` when a store was already configured.
    pub fn set_store(&self, store: KvStore) -> SedimentResult<()> {
        let mut slot = self.inner.store.write();
        if slot.is_some() {
            log::error!("Attempted to configure a second store");
            return Err(SedimentError::new(
                "store is already configured",
                ErrorKind::InvalidOperation,
            ));
        }
        *slot = Some(store);
        Ok(())
    }

    /// Returns the configured defaults provider.
    pub fn defaults(&self) -> Defaults {
        self.inner.defaults.read().clone()
    }

    /// Replaces the defaults provider.
    pub fn set_defaults(&self, defaults: Defaults) {
        *self.inner.defaults.write() = defaults;
    }

    /// Returns the document initialization options.
    pub fn init_options(&self) -> InitOptions {
        *self.inner.init_options.read()
    }

    /// Replaces the document initialization options.
    pub fn set_init_options(&self, options: InitOptions) {
        *self.inner.init_options.write() = options;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryKvStore;

    #[test]
    fn test_store_unset_by_default() {
        let config = SedimentConfig::new();
        let err = config.store().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
    }

    #[test]
    fn test_store_set_once() {
        let config = SedimentConfig::new();
        config.set_store(KvStore::new(InMemoryKvStore::new())).unwrap();
        assert!(config.store().is_ok());

        let err = config
            .set_store(KvStore::new(InMemoryKvStore::new()))
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
    }

    #[test]
    fn test_init_options_roundtrip() {
        let config = SedimentConfig::new();
        assert!(config.init_options().private);
        config.set_init_options(InitOptions { private: false });
        assert!(!config.init_options().private);
    }
}
