//! Document model layer for docfix.
//!
//! This crate provides the pieces of a document ODM that fixture loading needs:
//!
//! - **Documents**: [`Document`] instances with ordered fields, ObjectId identity and
//!   relation-aware [`Value`]s, lowered to BSON by [`Document::to_bson`]
//! - **Schemas**: [`ModelSchema`] with declared relations ([`RelationSpec`]),
//!   explicit field types and field defaults
//! - **Registry**: [`ModelRegistry`] mapping model names to schemas
//! - **Backends**: the [`DocumentBackend`] trait and an [`InMemoryBackend`]
//!
//! # Example
//!
//! ```
//! use docfix_odm::{DocumentBackend, InMemoryBackend, ModelSchema};
//!
//! let schema = ModelSchema::new("User").default_value("active", true);
//! let mut user = schema.new_instance();
//! user.set("name", "Alice");
//!
//! let backend = InMemoryBackend::new();
//! backend.insert_one(schema.collection(), user.to_bson()).unwrap();
//! assert_eq!(backend.count("users").unwrap(), 1);
//! ```

pub mod backend;
pub mod backends;
pub mod document;
pub mod error;
pub mod registry;
pub mod schema;

pub use backend::DocumentBackend;
pub use backends::InMemoryBackend;
pub use document::{Document, DocumentRef, ID_FIELD, Value, foreign_key};
pub use error::{OdmError, OdmResult};
pub use registry::ModelRegistry;
pub use schema::{ModelSchema, RelationKind, RelationSpec};

pub use bson;
