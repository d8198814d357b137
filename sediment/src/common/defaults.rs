use chrono::Utc;
use std::fmt::Debug;
use std::sync::Arc;
use uuid::Uuid;

/// Provider of server-assigned default values.
///
/// # Purpose
/// Supplies the generators used when a document instance is initialized:
/// a unique identifier for `_id` and the current timestamp for `created` /
/// `modified`. The provider is a trait so tests can pin ids and clocks to
/// deterministic values.
///
/// # Implementations
/// - [`StandardDefaults`]: random v4 UUIDs and the wall clock
pub trait DefaultsProvider: Send + Sync {
    /// Generates a fresh unique identifier for a new document.
    fn uuid(&self) -> String;

    /// Returns the current timestamp as epoch milliseconds.
    fn timestamp(&self) -> i64;
}

/// Cloneable handle over a [`DefaultsProvider`] implementation.
///
/// Follows the provider/wrapper split used throughout the crate: the wrapper
/// is cheap to clone and share, the provider holds the behavior.
#[derive(Clone)]
pub struct Defaults {
    inner: Arc<dyn DefaultsProvider>,
}

impl Defaults {
    /// Wraps a provider implementation.
    pub fn new<P: DefaultsProvider + 'static>(provider: P) -> Self {
        Defaults {
            inner: Arc::new(provider),
        }
    }

    /// Creates the standard provider: v4 UUIDs and the wall clock.
    pub fn standard() -> Self {
        Defaults::new(StandardDefaults)
    }

    /// Generates a fresh unique identifier for a new document.
    pub fn uuid(&self) -> String {
        self.inner.uuid()
    }

    /// Returns the current timestamp as epoch milliseconds.
    pub fn timestamp(&self) -> i64 {
        self.inner.timestamp()
    }
}

impl Debug for Defaults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Defaults")
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults::standard()
    }
}

/// The standard defaults provider.
pub struct StandardDefaults;

impl DefaultsProvider for StandardDefaults {
    fn uuid(&self) -> String {
        Uuid::new_v4().to_string()
    }

    fn timestamp(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
