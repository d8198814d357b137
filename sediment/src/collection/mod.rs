pub mod accessor;
pub mod document;
pub mod list_options;
pub mod model;
pub mod schema;

pub use accessor::{Accessor, AccessorRegistry, ListAccessor, UniqueAccessor};
pub use document::Document;
pub use list_options::{earliest, page, sized, ListOptions, ListOrder};
pub use model::Model;
pub use schema::{
    FieldError, InitOptions, Property, Schema, SchemaBuilder, ValidationReport, ValueKind,
};
