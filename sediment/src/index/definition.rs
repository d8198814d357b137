use std::sync::Arc;

use crate::common::{DOC_CREATED, DOC_ID, DOC_MODIFIED, KEY_SEPARATOR};
use crate::errors::SedimentResult;
use crate::index::template::KeyTemplate;

/// Describes a single index derived from a document collection.
///
/// An index definition is an immutable descriptor of one of two lookup
/// structures:
///
/// * **Hash index** - a direct field-value → document-id lookup table, used
///   for uniqueness enforcement and direct retrieval
/// * **Sorted index** - a score-ordered set of document ids, used for
///   secondary filtering, reference grouping, and chronological listings
#[derive(Clone, Debug, PartialEq)]
pub enum IndexDefinition {
    Hash(HashIndex),
    Sorted(SortedIndex),
}

/// A direct field→id lookup table with a literal key.
///
/// `field` names the document field whose value becomes the hash field;
/// `value` names the document field whose value is stored under it
/// (conventionally `_id`).
#[derive(Clone, Debug, PartialEq)]
pub struct HashIndex {
    key: String,
    field: String,
    value: String,
}

impl HashIndex {
    pub fn new(key: &str, field: &str, value: &str) -> Self {
        HashIndex {
            key: key.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// The literal store key of the lookup table.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The document field whose value becomes the hash field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The document field whose value is stored in the table.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A score-ordered set of document ids with a templated key.
///
/// `score` and `member` name the document fields providing the sorted-set
/// score and member respectively.
#[derive(Clone, Debug, PartialEq)]
pub struct SortedIndex {
    template: KeyTemplate,
    score: String,
    member: String,
}

impl SortedIndex {
    pub fn new(template: KeyTemplate, score: &str, member: &str) -> Self {
        SortedIndex {
            template,
            score: score.to_string(),
            member: member.to_string(),
        }
    }

    /// The key template resolved per document.
    pub fn template(&self) -> &KeyTemplate {
        &self.template
    }

    /// The document field providing the score.
    pub fn score(&self) -> &str {
        &self.score
    }

    /// The document field providing the member.
    pub fn member(&self) -> &str {
        &self.member
    }
}

/// The literal key of the unique-lookup hash table for a property:
/// `collection:property`.
pub(crate) fn unique_hash_key(collection: &str, property: &str) -> String {
    format!("{}{}{}", collection, KEY_SEPARATOR, property)
}

/// The template producing secondary bucket keys `collection:property:<value>`.
pub(crate) fn secondary_template(collection: &str, property: &str) -> SedimentResult<KeyTemplate> {
    let pattern = format!("{}{}#{}$", collection, KEY_SEPARATOR, KEY_SEPARATOR);
    KeyTemplate::new(&pattern, vec![property, property])
}

/// The template producing reference bucket keys `referenced:<id>:collection`.
pub(crate) fn reference_template(
    collection: &str,
    referenced_collection: &str,
    property: &str,
) -> SedimentResult<KeyTemplate> {
    let pattern = format!(
        "{}{}${}{}",
        referenced_collection, KEY_SEPARATOR, KEY_SEPARATOR, collection
    );
    KeyTemplate::new(&pattern, vec![property])
}

/// Per-model, immutable list of index definitions.
///
/// The registry is populated once at model setup from schema property flags
/// plus any explicitly declared definitions, and is read-only thereafter.
/// The first `order` index registered becomes the model's default
/// chronological listing.
#[derive(Clone, Debug)]
pub struct IndexRegistry {
    inner: Arc<IndexRegistryInner>,
}

#[derive(Debug)]
struct IndexRegistryInner {
    collection: String,
    definitions: Vec<IndexDefinition>,
    default_order_key: Option<String>,
}

impl IndexRegistry {
    /// Creates a builder for the given collection.
    pub fn builder(collection: &str) -> IndexRegistryBuilder {
        IndexRegistryBuilder::new(collection)
    }

    /// The collection this registry belongs to.
    pub fn collection(&self) -> &str {
        &self.inner.collection
    }

    /// All registered definitions, in registration order.
    pub fn definitions(&self) -> &[IndexDefinition] {
        &self.inner.definitions
    }

    /// The literal key of the default chronological index, if one was
    /// registered via [`IndexRegistryBuilder::index_order`].
    pub fn default_order_key(&self) -> Option<&str> {
        self.inner.default_order_key.as_deref()
    }

    /// Returns true when no indexes are defined.
    pub fn is_empty(&self) -> bool {
        self.inner.definitions.is_empty()
    }
}

/// Builder for an [IndexRegistry].
///
/// Each call appends a definition; no deduplication is performed, so callers
/// must avoid duplicate registration. `build()` freezes the registry.
pub struct IndexRegistryBuilder {
    collection: String,
    definitions: Vec<IndexDefinition>,
    default_order_key: Option<String>,
}

impl IndexRegistryBuilder {
    fn new(collection: &str) -> Self {
        IndexRegistryBuilder {
            collection: collection.to_string(),
            definitions: Vec::new(),
            default_order_key: None,
        }
    }

    /// Appends a raw definition.
    pub fn define_index(mut self, definition: IndexDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Registers a hash index mapping `property` → `_id`, keyed by
    /// `collection:property`.
    pub fn index_unique(mut self, property: &str) -> Self {
        let key = unique_hash_key(&self.collection, property);
        self.definitions
            .push(IndexDefinition::Hash(HashIndex::new(&key, property, DOC_ID)));
        self
    }

    /// Registers a sorted index bucketing documents by a property value.
    ///
    /// The key template is `collection:#:$` instantiated with
    /// `(property, property)`, producing keys of the form
    /// `collection:property:<value>`. The score defaults to `modified`.
    pub fn index_secondary(self, property: &str) -> SedimentResult<Self> {
        self.index_secondary_scored(property, DOC_MODIFIED)
    }

    /// [`index_secondary`](Self::index_secondary) with an explicit score field.
    pub fn index_secondary_scored(
        mut self,
        property: &str,
        score_property: &str,
    ) -> SedimentResult<Self> {
        let template = secondary_template(&self.collection, property)?;
        self.definitions.push(IndexDefinition::Sorted(SortedIndex::new(
            template,
            score_property,
            DOC_ID,
        )));
        Ok(self)
    }

    /// Registers a sorted index grouping this collection's documents under
    /// the id found in `property`, which references a document of
    /// `referenced_collection`.
    ///
    /// The key template is `referenced:$:collection` instantiated with
    /// `(property)`. The score defaults to `created`.
    pub fn index_reference(self, property: &str, referenced_collection: &str) -> SedimentResult<Self> {
        self.index_reference_scored(property, referenced_collection, DOC_CREATED)
    }

    /// [`index_reference`](Self::index_reference) with an explicit score field.
    pub fn index_reference_scored(
        mut self,
        property: &str,
        referenced_collection: &str,
        score_property: &str,
    ) -> SedimentResult<Self> {
        let template = reference_template(&self.collection, referenced_collection, property)?;
        self.definitions.push(IndexDefinition::Sorted(SortedIndex::new(
            template,
            score_property,
            DOC_ID,
        )));
        Ok(self)
    }

    /// Registers a sorted index over the whole collection, keyed by the
    /// literal `collection:score_property`, with member `_id`. Produces a
    /// global chronological/ranked listing; the first one registered becomes
    /// the default index for `list`.
    pub fn index_order(mut self, score_property: &str) -> SedimentResult<Self> {
        let key = format!("{}{}{}", self.collection, KEY_SEPARATOR, score_property);
        let template = KeyTemplate::literal(&key)?;
        self.definitions.push(IndexDefinition::Sorted(SortedIndex::new(
            template,
            score_property,
            DOC_ID,
        )));
        if self.default_order_key.is_none() {
            self.default_order_key = Some(key);
        }
        Ok(self)
    }

    /// Freezes the registry. No further mutation is possible afterwards.
    pub fn build(self) -> IndexRegistry {
        IndexRegistry {
            inner: Arc::new(IndexRegistryInner {
                collection: self.collection,
                definitions: self.definitions,
                default_order_key: self.default_order_key,
            }),
        }
    }
}
