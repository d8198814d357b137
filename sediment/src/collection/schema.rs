use itertools::Itertools;
use std::sync::Arc;

use crate::collection::Document;
use crate::common::{Defaults, Value, DOC_CREATED, DOC_ID, DOC_MODIFIED};
use crate::errors::{ErrorKind, SedimentError, SedimentResult};
use crate::index::{IndexDefinition, IndexRegistry};

/// Expected type of a schema property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    String,
    Array,
    Document,
}

impl ValueKind {
    fn matches(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ValueKind::Bool, Value::Bool(_))
                | (ValueKind::Int, Value::I64(_))
                | (ValueKind::Int, Value::U64(_))
                | (ValueKind::Float, Value::F64(_))
                | (ValueKind::String, Value::String(_))
                | (ValueKind::Array, Value::Array(_))
                | (ValueKind::Document, Value::Document(_))
        )
    }
}

/// Declares a single schema property and its index flags.
///
/// # Flags
/// * `required` - validation fails when the field is missing or null
/// * `unique` - a hash index enforces distinct values across the collection
/// * `secondary` - a sorted index buckets documents by this field's value
/// * `reference(collection)` - a sorted index groups this collection's
///   documents under the referenced document's id
/// * `order` - a sorted index over the whole collection, scored by this
///   field; the first one declared becomes the default listing
/// * `private` - excluded when a document is initialized without private
///   fields
///
/// # Usage
/// ```rust,ignore
/// let email = Property::new("email").kind(ValueKind::String).required().unique();
/// let author = Property::new("author").required().reference("users");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    name: String,
    required: bool,
    kind: Option<ValueKind>,
    unique: bool,
    secondary: bool,
    reference: Option<String>,
    order: bool,
    private: bool,
}

impl Property {
    pub fn new(name: &str) -> Self {
        Property {
            name: name.to_string(),
            required: false,
            kind: None,
            unique: false,
            secondary: false,
            reference: None,
            order: false,
            private: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn kind(mut self, kind: ValueKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn secondary(mut self) -> Self {
        self.secondary = true;
        self
    }

    pub fn reference(mut self, collection: &str) -> Self {
        self.reference = Some(collection.to_string());
        self
    }

    pub fn order(mut self) -> Self {
        self.order = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn is_secondary(&self) -> bool {
        self.secondary
    }

    pub fn referenced_collection(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn is_order(&self) -> bool {
        self.order
    }

    pub fn is_private(&self) -> bool {
        self.private
    }
}

/// Options controlling document initialization.
#[derive(Clone, Copy, Debug)]
pub struct InitOptions {
    /// Whether private-flagged fields are included in the instance.
    pub private: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        InitOptions { private: true }
    }
}

/// A single field-level validation failure.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Outcome of validating a document against a schema.
#[derive(Clone, Debug, Default)]
pub struct ValidationReport {
    errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Converts a failed report into a `ValidationError` carrying the
    /// field-level detail in its message.
    pub fn into_error(self) -> SedimentError {
        let detail = self
            .errors
            .iter()
            .map(|e| format!("'{}': {}", e.field, e.message))
            .join("; ");
        SedimentError::new(
            &format!("validation failed: {}", detail),
            ErrorKind::ValidationError,
        )
    }
}

/// Immutable schema of a document collection.
///
/// A schema names the collection, declares its properties with their index
/// flags, and optionally carries explicitly declared raw index definitions.
/// It supplies the three modeling operations the lifecycle orchestrator
/// needs: `initialize` (server-assigned defaults), `validate` (field-level
/// report), and `build_registry` (index derivation from the flags).
#[derive(Clone, Debug)]
pub struct Schema {
    inner: Arc<SchemaInner>,
}

#[derive(Debug)]
struct SchemaInner {
    collection: String,
    properties: Vec<Property>,
    extra_indexes: Vec<IndexDefinition>,
}

impl Schema {
    /// Creates a builder for the given collection name.
    pub fn builder(collection: &str) -> SchemaBuilder {
        SchemaBuilder::new(collection)
    }

    /// The collection name.
    pub fn collection(&self) -> &str {
        &self.inner.collection
    }

    /// The declared properties, in declaration order.
    pub fn properties(&self) -> &[Property] {
        &self.inner.properties
    }

    /// Looks up a property by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.inner.properties.iter().find(|p| p.name() == name)
    }

    /// The unique-flagged properties, in declaration order.
    pub fn unique_properties(&self) -> Vec<&Property> {
        self.inner.properties.iter().filter(|p| p.is_unique()).collect()
    }

    /// Builds a document instance from raw data with server-assigned
    /// defaults applied.
    ///
    /// * `_id` is generated when absent (a caller-supplied id is kept)
    /// * `created` and `modified` are set to the provider's current
    ///   timestamp
    /// * private-flagged fields are dropped when `options.private` is false
    pub fn initialize(
        &self,
        data: &Document,
        defaults: &Defaults,
        options: &InitOptions,
    ) -> SedimentResult<Document> {
        let mut instance = data.clone();
        if instance.id().is_none() {
            instance.put(DOC_ID, defaults.uuid())?;
        }
        let now = defaults.timestamp();
        instance.put(DOC_CREATED, now)?;
        instance.put(DOC_MODIFIED, now)?;

        if !options.private {
            for property in &self.inner.properties {
                if property.is_private() {
                    instance.remove(property.name());
                }
            }
        }
        Ok(instance)
    }

    /// Validates a document against the declared properties.
    ///
    /// Required properties must be present and non-null; typed properties
    /// must match their declared kind when present. Fields the schema does
    /// not declare are allowed through untouched.
    pub fn validate(&self, doc: &Document) -> ValidationReport {
        let mut errors = Vec::new();
        for property in &self.inner.properties {
            let value = doc.get(property.name());
            match value {
                None | Some(Value::Null) => {
                    if property.is_required() {
                        errors.push(FieldError {
                            field: property.name().to_string(),
                            message: "required".to_string(),
                        });
                    }
                }
                Some(value) => {
                    if let Some(kind) = property.kind {
                        if !kind.matches(&value) {
                            errors.push(FieldError {
                                field: property.name().to_string(),
                                message: format!("expected {:?}", kind),
                            });
                        }
                    }
                }
            }
        }
        ValidationReport { errors }
    }

    /// Derives the index registry from the property flags plus the
    /// explicitly declared definitions.
    pub fn build_registry(&self) -> SedimentResult<IndexRegistry> {
        let mut builder = IndexRegistry::builder(&self.inner.collection);
        for property in &self.inner.properties {
            if property.is_unique() {
                builder = builder.index_unique(property.name());
            }
            if property.is_secondary() {
                builder = builder.index_secondary(property.name())?;
            }
            if let Some(referenced) = property.referenced_collection() {
                builder = builder.index_reference(property.name(), referenced)?;
            }
            if property.is_order() {
                builder = builder.index_order(property.name())?;
            }
        }
        for definition in &self.inner.extra_indexes {
            builder = builder.define_index(definition.clone());
        }
        Ok(builder.build())
    }
}

/// Builder for a [Schema].
pub struct SchemaBuilder {
    collection: String,
    properties: Vec<Property>,
    extra_indexes: Vec<IndexDefinition>,
}

impl SchemaBuilder {
    fn new(collection: &str) -> Self {
        SchemaBuilder {
            collection: collection.to_string(),
            properties: Vec::new(),
            extra_indexes: Vec::new(),
        }
    }

    /// Declares a property.
    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Declares a raw index definition alongside the flag-derived ones.
    pub fn define_index(mut self, definition: IndexDefinition) -> Self {
        self.extra_indexes.push(definition);
        self
    }

    /// Freezes the schema.
    pub fn build(self) -> Schema {
        Schema {
            inner: Arc::new(SchemaInner {
                collection: self.collection,
                properties: self.properties,
                extra_indexes: self.extra_indexes,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::DefaultsProvider;
    use crate::doc;
    use crate::index::HashIndex;

    struct FixedDefaults;
    impl DefaultsProvider for FixedDefaults {
        fn uuid(&self) -> String {
            "generated-id".to_string()
        }
        fn timestamp(&self) -> i64 {
            1000
        }
    }

    fn schema() -> Schema {
        Schema::builder("users")
            .property(Property::new("email").kind(ValueKind::String).required().unique())
            .property(Property::new("city").kind(ValueKind::String).secondary())
            .property(Property::new("created").order())
            .property(Property::new("password").private())
            .build()
    }

    #[test]
    fn test_initialize_assigns_defaults() {
        let defaults = Defaults::new(FixedDefaults);
        let data = doc! { "email": "a@x.y" };

        let instance = schema()
            .initialize(&data, &defaults, &InitOptions::default())
            .unwrap();

        assert_eq!(instance.id(), Some("generated-id".to_string()));
        assert_eq!(instance.created(), Some(1000));
        assert_eq!(instance.modified(), Some(1000));
        assert_eq!(instance.get("email"), Some(Value::from("a@x.y")));
    }

    #[test]
    fn test_initialize_keeps_supplied_id() {
        let defaults = Defaults::new(FixedDefaults);
        let data = doc! { "_id": "caller-id", "email": "a@x.y" };

        let instance = schema()
            .initialize(&data, &defaults, &InitOptions::default())
            .unwrap();

        assert_eq!(instance.id(), Some("caller-id".to_string()));
    }

    #[test]
    fn test_initialize_strips_private_fields_on_request() {
        let defaults = Defaults::new(FixedDefaults);
        let data = doc! { "email": "a@x.y", "password": "hunter2" };

        let kept = schema()
            .initialize(&data, &defaults, &InitOptions { private: true })
            .unwrap();
        let stripped = schema()
            .initialize(&data, &defaults, &InitOptions { private: false })
            .unwrap();

        assert!(kept.contains("password"));
        assert!(!stripped.contains("password"));
    }

    #[test]
    fn test_validate_required() {
        let report = schema().validate(&doc! { "city": "Oslo" });
        assert!(!report.is_valid());
        assert_eq!(report.errors().len(), 1);
        assert_eq!(report.errors()[0].field, "email");
        assert_eq!(report.errors()[0].message, "required");
    }

    #[test]
    fn test_validate_null_counts_as_missing() {
        let mut doc = Document::new();
        doc.put("email", Value::Null).unwrap();
        let report = schema().validate(&doc);
        assert!(!report.is_valid());
    }

    #[test]
    fn test_validate_kind_mismatch() {
        let report = schema().validate(&doc! { "email": 42i64 });
        assert!(!report.is_valid());
        assert!(report.errors()[0].message.contains("String"));
    }

    #[test]
    fn test_validate_allows_undeclared_fields() {
        let report = schema().validate(&doc! { "email": "a@x.y", "extra": true });
        assert!(report.is_valid());
    }

    #[test]
    fn test_report_into_error_carries_detail() {
        let report = schema().validate(&doc! {});
        let err = report.into_error();
        assert_eq!(err.kind(), &ErrorKind::ValidationError);
        assert!(err.message().contains("'email': required"));
    }

    #[test]
    fn test_build_registry_from_flags() {
        let registry = schema().build_registry().unwrap();

        // email unique, city secondary, created order
        assert_eq!(registry.definitions().len(), 3);
        assert_eq!(registry.default_order_key(), Some("users:created"));
    }

    #[test]
    fn test_build_registry_includes_raw_definitions() {
        let schema = Schema::builder("users")
            .define_index(IndexDefinition::Hash(HashIndex::new(
                "users:handle",
                "handle",
                "_id",
            )))
            .build();

        let registry = schema.build_registry().unwrap();
        assert_eq!(registry.definitions().len(), 1);
    }

    #[test]
    fn test_unique_properties() {
        let schema = schema();
        let unique = schema.unique_properties();
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].name(), "email");
    }
}
