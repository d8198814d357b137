//! # Sediment - Document Collections over Key-Value Primitives
//!
//! Sediment is a lightweight document-collection layer for key-value stores
//! that expose two primitives: hash maps and score-ordered sets. It adds
//! schemas, server-assigned defaults, unique constraints, derived secondary
//! indexes, and paginated listings on top of those primitives, keeping every
//! index entry consistent with the primary document write through atomic
//! batch commits.
//!
//! ## Key Features
//!
//! - **Schemas**: declared properties with type checks, required fields, and
//!   index flags
//! - **Derived indexes**: unique lookups, secondary buckets, reference
//!   groupings, and chronological listings, all maintained automatically
//! - **Generated accessors**: `get_by_<property>` and `list_by_<property>`
//!   lookups derived from the index flags
//! - **Atomic writes**: the primary write and all index mutations land as
//!   one batch
//! - **Pluggable backends**: an in-memory store ships with the crate; any
//!   [KvStoreProvider](store::KvStoreProvider) implementation plugs in
//! - **Clean API**: PIMPL pattern provides stable, encapsulated interfaces
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sediment::collection::{Property, Schema, ValueKind};
//! use sediment::{doc, Sediment};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Sediment::builder().open()?;
//!
//! let users = db.model(
//!     Schema::builder("users")
//!         .property(Property::new("email").kind(ValueKind::String).required().unique())
//!         .property(Property::new("city").kind(ValueKind::String).secondary())
//!         .property(Property::new("created").order())
//!         .build(),
//! )?;
//!
//! users.insert(&doc! { "email": "alice@example.com", "city": "Oslo" })?;
//!
//! let alice = users.get_by("email", "alice@example.com")?;
//! let in_oslo = users.list_by("city", "Oslo", &Default::default())?;
//! let newest = users.list(&Default::default())?;
//!
//! db.close()?;
//! # Ok(())
//! # }
//! ```

pub mod collection;
pub mod common;
pub mod errors;
pub mod index;
pub mod sediment;
pub mod sediment_builder;
pub mod sediment_config;
pub mod store;

pub use collection::{Document, ListOptions, ListOrder, Model, Property, Schema, ValueKind};
pub use common::{Defaults, DefaultsProvider, Value, SEDIMENT_VERSION};
pub use errors::{ErrorKind, SedimentError, SedimentResult};
pub use sediment::Sediment;
pub use sediment_builder::SedimentBuilder;
pub use sediment_config::SedimentConfig;
