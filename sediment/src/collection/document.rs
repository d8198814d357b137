use im::OrdMap;

use crate::common::{Value, DOC_CREATED, DOC_ID, DOC_MODIFIED};
use crate::errors::{ErrorKind, SedimentError, SedimentResult};

/// Represents a document instance: a mapping from field name to [Value].
///
/// Every persisted document carries three server-managed fields:
///
/// * `_id` - the unique identifier, immutable once assigned
/// * `created` - creation timestamp (epoch milliseconds)
/// * `modified` - last modification timestamp, refreshed on every patch
///
/// ## Lock-free design
///
/// The field map is an `im::OrdMap` (persistent ordered map):
/// - O(1) cloning via internal Arc sharing
/// - Mutations create new maps via structural sharing
/// - Each mutated document is completely independent
///
/// This is what lets the lifecycle orchestrator hold an `original` and a
/// `working` copy of the same document side by side without deep copies.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    data: OrdMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: OrdMap::new(),
        }
    }

    /// Checks if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of fields in the document.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Associates the specified value with the specified field.
    ///
    /// If the field already exists its value is updated, with one exception:
    /// once `_id` has been assigned it cannot be changed to a different value.
    ///
    /// # Arguments
    /// * `key` - The field name; cannot be empty
    /// * `value` - Any type convertible into a [Value]
    ///
    /// # Errors
    /// * `InvalidFieldName` if the key is empty
    /// * `InvalidOperation` if the key is `_id` and the document already
    ///   carries a different id
    pub fn put(&mut self, key: &str, value: impl Into<Value>) -> SedimentResult<()> {
        if key.is_empty() {
            log::error!("Attempted to put a value under an empty field name");
            return Err(SedimentError::new(
                "field name cannot be empty",
                ErrorKind::InvalidFieldName,
            ));
        }

        let value = value.into();
        if key == DOC_ID {
            if let Some(existing) = self.data.get(DOC_ID) {
                if existing != &value {
                    log::error!("Attempted to reassign '{}' from {} to {}", DOC_ID, existing, value);
                    return Err(SedimentError::new(
                        "document id is immutable once assigned",
                        ErrorKind::InvalidOperation,
                    ));
                }
            }
        }

        self.data.insert(key.to_string(), value);
        Ok(())
    }

    /// Retrieves the value associated with a field.
    ///
    /// # Returns
    /// `Some(value)` if the field exists, `None` otherwise.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.data.get(key).cloned()
    }

    /// Checks whether the document contains a field.
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Removes a field from the document.
    ///
    /// # Returns
    /// The removed value if the field existed, `None` otherwise.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Returns the document id, if assigned.
    pub fn id(&self) -> Option<String> {
        match self.data.get(DOC_ID) {
            Some(Value::String(id)) => Some(id.clone()),
            _ => None,
        }
    }

    /// Returns the creation timestamp (epoch milliseconds), if set.
    pub fn created(&self) -> Option<i64> {
        self.data.get(DOC_CREATED).and_then(|v| v.as_score())
    }

    /// Returns the last-modified timestamp (epoch milliseconds), if set.
    pub fn modified(&self) -> Option<i64> {
        self.data.get(DOC_MODIFIED).and_then(|v| v.as_score())
    }

    /// Returns an iterator over the document's fields in field-name order.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    /// Merges a partial document into this one, producing a new instance.
    ///
    /// Every field of `partial` overwrites the corresponding field of `self`;
    /// fields absent from `partial` are left untouched. No default-value
    /// generation is applied. This is the patch primitive: the caller is
    /// responsible for refreshing `modified` afterwards.
    ///
    /// # Errors
    /// * `InvalidOperation` if `partial` carries an `_id` different from this
    ///   document's id
    pub fn merge(&self, partial: &Document) -> SedimentResult<Document> {
        let mut merged = self.clone();
        for (key, value) in partial.fields() {
            merged.put(key, value.clone())?;
        }
        Ok(merged)
    }
}

/// Creates a [Document] from field/value pairs.
///
/// # Examples
///
/// ```rust,ignore
/// use sediment::doc;
///
/// let doc = doc! {
///     "name": "Alice",
///     "age": 30i64,
/// };
/// assert_eq!(doc.size(), 2);
/// ```
///
/// # Panics
/// Panics if a field name is empty or reassigns `_id`; intended for literals
/// where the keys are known good.
#[macro_export]
macro_rules! doc {
    () => {
        $crate::collection::Document::new()
    };

    ($($key:literal : $value:expr),* $(,)?) => {
        {
            let mut doc = $crate::collection::Document::new();
            $(
                doc.put($key, $value)
                    .expect(concat!("failed to put field ", $key, " in document"));
            )*
            doc
        }
    };
}
