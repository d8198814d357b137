use indexmap::IndexMap;
use std::sync::Arc;

use crate::collection::list_options::ListOptions;
use crate::collection::schema::Schema;
use crate::collection::Document;
use crate::common::{Value, GET_BY_PREFIX, LIST_BY_PREFIX};
use crate::errors::{ErrorKind, SedimentError, SedimentResult};
use crate::index::definition::{reference_template, secondary_template, unique_hash_key};
use crate::index::KeyTemplate;
use crate::store::KvStore;

/// Looks a document up by the value of a unique-constrained property.
///
/// Two round trips: the unique hash table maps the property value to a
/// document id, then the id is resolved against the collection's primary
/// hash.
#[derive(Clone, Debug)]
pub struct UniqueAccessor {
    property: String,
    method_name: String,
    hash_key: String,
}

impl UniqueAccessor {
    pub fn property(&self) -> &str {
        &self.property
    }

    /// The generated accessor name, e.g. `get_by_email`.
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// The literal key of the unique hash table.
    pub fn hash_key(&self) -> &str {
        &self.hash_key
    }

    /// Fetches the document whose property equals `value`, if any.
    pub fn fetch(
        &self,
        store: &KvStore,
        primary_key: &str,
        value: &Value,
    ) -> SedimentResult<Option<Document>> {
        let part = value.as_key_part().ok_or_else(|| {
            SedimentError::new(
                &format!("value for '{}' cannot be used as a lookup key", self.property),
                ErrorKind::InvalidDataType,
            )
        })?;

        let id = match store.hash_get(&self.hash_key, &part)? {
            Some(id) => id,
            None => return Ok(None),
        };
        let id = id.as_key_part().ok_or_else(|| {
            SedimentError::new(
                &format!("unique index '{}' holds a non-id entry", self.hash_key),
                ErrorKind::EncodingError,
            )
        })?;

        match store.hash_get(primary_key, &id)? {
            Some(Value::Document(doc)) => Ok(Some(doc)),
            Some(_) => Err(SedimentError::new(
                &format!("primary entry '{}' in '{}' is not a document", id, primary_key),
                ErrorKind::EncodingError,
            )),
            // dangling unique entry: the index points at a deleted document
            None => Ok(None),
        }
    }
}

/// Lists documents from the sorted bucket a property value selects.
#[derive(Clone, Debug)]
pub struct ListAccessor {
    property: String,
    method_name: String,
    template: KeyTemplate,
}

impl ListAccessor {
    pub fn property(&self) -> &str {
        &self.property
    }

    /// The generated accessor name, e.g. `list_by_city`.
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Resolves the bucket key for a probe value.
    pub fn resolve_key(&self, value: &Value) -> SedimentResult<String> {
        let property = self.property.clone();
        let value = value.clone();
        self.template.resolve_with(move |field| {
            if field == property {
                Some(value.clone())
            } else {
                None
            }
        })
    }

    /// Fetches the ids in the bucket for `value`, honoring the options'
    /// page, size, and order.
    pub fn fetch_ids(
        &self,
        store: &KvStore,
        value: &Value,
        options: &ListOptions,
    ) -> SedimentResult<Vec<String>> {
        let key = self.resolve_key(value)?;
        let (start, end) = match options.rank_range() {
            Some(range) => range,
            None => return Ok(Vec::new()),
        };
        store.sorted_range(&key, start, end, options.order.range_order())
    }
}

/// A generated per-property accessor.
#[derive(Clone, Debug)]
pub enum Accessor {
    Unique(UniqueAccessor),
    List(ListAccessor),
}

impl Accessor {
    pub fn method_name(&self) -> &str {
        match self {
            Accessor::Unique(a) => a.method_name(),
            Accessor::List(a) => a.method_name(),
        }
    }
}

/// Registry of the accessors derived from a schema's index flags.
///
/// Built once at model setup: for every unique property `p` a `get_by_p`
/// accessor, for every secondary or reference property a `list_by_p`
/// accessor. An explicit registry of typed accessor objects replaces
/// runtime method-name synthesis; lookups go by property name and the
/// generated names are enumerable.
#[derive(Clone, Debug, Default)]
pub struct AccessorRegistry {
    inner: Arc<IndexMap<String, Accessor>>,
}

impl AccessorRegistry {
    /// Derives the registry from a schema's property flags.
    pub fn from_schema(schema: &Schema) -> SedimentResult<AccessorRegistry> {
        let collection = schema.collection();
        let mut entries = IndexMap::new();

        for property in schema.properties() {
            if property.is_unique() {
                let method_name = format!("{}{}", GET_BY_PREFIX, property.name());
                let accessor = UniqueAccessor {
                    property: property.name().to_string(),
                    method_name: method_name.clone(),
                    hash_key: unique_hash_key(collection, property.name()),
                };
                entries.insert(method_name, Accessor::Unique(accessor));
            }

            let list_template = if property.is_secondary() {
                Some(secondary_template(collection, property.name())?)
            } else if let Some(referenced) = property.referenced_collection() {
                Some(reference_template(collection, referenced, property.name())?)
            } else {
                None
            };

            if let Some(template) = list_template {
                let method_name = format!("{}{}", LIST_BY_PREFIX, property.name());
                let accessor = ListAccessor {
                    property: property.name().to_string(),
                    method_name: method_name.clone(),
                    template,
                };
                entries.insert(method_name, Accessor::List(accessor));
            }
        }

        Ok(AccessorRegistry {
            inner: Arc::new(entries),
        })
    }

    /// Looks an accessor up by its generated method name.
    pub fn get(&self, method_name: &str) -> Option<&Accessor> {
        self.inner.get(method_name)
    }

    /// The unique accessor for a property, if one was generated.
    pub fn unique_for(&self, property: &str) -> Option<&UniqueAccessor> {
        match self.inner.get(&format!("{}{}", GET_BY_PREFIX, property)) {
            Some(Accessor::Unique(accessor)) => Some(accessor),
            _ => None,
        }
    }

    /// The list accessor for a property, if one was generated.
    pub fn list_for(&self, property: &str) -> Option<&ListAccessor> {
        match self.inner.get(&format!("{}{}", LIST_BY_PREFIX, property)) {
            Some(Accessor::List(accessor)) => Some(accessor),
            _ => None,
        }
    }

    /// All unique accessors, in schema declaration order.
    pub fn unique_accessors(&self) -> Vec<&UniqueAccessor> {
        self.inner
            .values()
            .filter_map(|accessor| match accessor {
                Accessor::Unique(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    /// The generated method names, in schema declaration order.
    pub fn method_names(&self) -> Vec<&str> {
        self.inner.values().map(|a| a.method_name()).collect()
    }

    /// Number of generated accessors.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true when no accessors were generated.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::schema::{Property, ValueKind};

    fn schema() -> Schema {
        Schema::builder("reviews")
            .property(Property::new("slug").kind(ValueKind::String).unique())
            .property(Property::new("rating").secondary())
            .property(Property::new("book").reference("books"))
            .property(Property::new("created").order())
            .build()
    }

    #[test]
    fn test_generated_method_names() {
        let registry = AccessorRegistry::from_schema(&schema()).unwrap();
        assert_eq!(
            registry.method_names(),
            vec!["get_by_slug", "list_by_rating", "list_by_book"]
        );
    }

    #[test]
    fn test_unique_accessor_key_shape() {
        let registry = AccessorRegistry::from_schema(&schema()).unwrap();
        let accessor = registry.unique_for("slug").expect("accessor should exist");
        assert_eq!(accessor.hash_key(), "reviews:slug");
        assert_eq!(accessor.method_name(), "get_by_slug");
    }

    #[test]
    fn test_list_accessor_resolves_secondary_key() {
        let registry = AccessorRegistry::from_schema(&schema()).unwrap();
        let accessor = registry.list_for("rating").expect("accessor should exist");
        let key = accessor.resolve_key(&Value::from(5i64)).unwrap();
        assert_eq!(key, "reviews:rating:5");
    }

    #[test]
    fn test_list_accessor_resolves_reference_key() {
        let registry = AccessorRegistry::from_schema(&schema()).unwrap();
        let accessor = registry.list_for("book").expect("accessor should exist");
        let key = accessor.resolve_key(&Value::from("b7")).unwrap();
        assert_eq!(key, "books:b7:reviews");
    }

    #[test]
    fn test_order_property_generates_no_accessor() {
        let registry = AccessorRegistry::from_schema(&schema()).unwrap();
        assert!(registry.get("list_by_created").is_none());
        assert!(registry.get("get_by_created").is_none());
    }

    #[test]
    fn test_lookup_misses() {
        let registry = AccessorRegistry::from_schema(&schema()).unwrap();
        assert!(registry.unique_for("rating").is_none());
        assert!(registry.list_for("slug").is_none());
    }
}
