//! Model schemas and relation metadata.
//!
//! A [`ModelSchema`] is the runtime description of one document model: its name,
//! the collection it persists to, the relations it declares, explicit field-to-model
//! mappings and field defaults applied to blank instances.
//!
//! # Example
//!
//! ```
//! use docfix_odm::{ModelSchema, RelationKind, RelationSpec};
//!
//! let post = ModelSchema::new("Post")
//!     .relation(RelationSpec::belongs_to("author").target("User"))
//!     .relation(RelationSpec::embeds_many("comments"));
//!
//! assert_eq!(post.collection(), "posts");
//! assert_eq!(post.relation_for("author").map(|r| r.kind()), Some(RelationKind::BelongsTo));
//! ```

use std::fmt;

use indexmap::IndexMap;
use inflector::Inflector;

use crate::document::{Document, Value};

/// Kind of a declared relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
	/// Referenced to-one relation (`has_one`).
	HasOne,
	/// Referenced to-one relation holding the foreign key (`belongs_to`).
	BelongsTo,
	/// Referenced to-many relation (`has_many`).
	HasMany,
	/// Embedded to-one relation (`embeds_one`).
	EmbedsOne,
	/// Embedded to-many relation (`embeds_many`).
	EmbedsMany,
	/// Back-reference from an embedded document to its parent (`embedded_in`).
	EmbeddedIn,
}

impl RelationKind {
	/// Returns true for referenced to-one kinds, the only kinds a reference token may target.
	pub fn is_referenced_to_one(&self) -> bool {
		matches!(self, Self::HasOne | Self::BelongsTo)
	}

	/// Returns true for relations whose documents live in another collection.
	pub fn is_referenced(&self) -> bool {
		matches!(self, Self::HasOne | Self::BelongsTo | Self::HasMany)
	}

	/// Returns true for relations that store child documents inside the owner.
	pub fn embeds_children(&self) -> bool {
		matches!(self, Self::EmbedsOne | Self::EmbedsMany)
	}

	/// Returns the relation macro name, as written in model declarations.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::HasOne => "has_one",
			Self::BelongsTo => "belongs_to",
			Self::HasMany => "has_many",
			Self::EmbedsOne => "embeds_one",
			Self::EmbedsMany => "embeds_many",
			Self::EmbeddedIn => "embedded_in",
		}
	}
}

impl fmt::Display for RelationKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A relation declared on a model.
///
/// When no target is given the related model is inferred from the field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSpec {
	field: String,
	kind: RelationKind,
	target: Option<String>,
}

impl RelationSpec {
	/// Creates a relation of the given kind on `field`.
	pub fn new(field: impl Into<String>, kind: RelationKind) -> Self {
		Self {
			field: field.into(),
			kind,
			target: None,
		}
	}

	/// Declares a `has_one` relation.
	pub fn has_one(field: impl Into<String>) -> Self {
		Self::new(field, RelationKind::HasOne)
	}

	/// Declares a `belongs_to` relation.
	pub fn belongs_to(field: impl Into<String>) -> Self {
		Self::new(field, RelationKind::BelongsTo)
	}

	/// Declares a `has_many` relation.
	pub fn has_many(field: impl Into<String>) -> Self {
		Self::new(field, RelationKind::HasMany)
	}

	/// Declares an `embeds_one` relation.
	pub fn embeds_one(field: impl Into<String>) -> Self {
		Self::new(field, RelationKind::EmbedsOne)
	}

	/// Declares an `embeds_many` relation.
	pub fn embeds_many(field: impl Into<String>) -> Self {
		Self::new(field, RelationKind::EmbedsMany)
	}

	/// Declares an `embedded_in` back-reference.
	pub fn embedded_in(field: impl Into<String>) -> Self {
		Self::new(field, RelationKind::EmbeddedIn)
	}

	/// Sets the related model name explicitly.
	pub fn target(mut self, model: impl Into<String>) -> Self {
		self.target = Some(model.into());
		self
	}

	/// Returns the field carrying the relation.
	pub fn field(&self) -> &str {
		&self.field
	}

	/// Returns the relation kind.
	pub fn kind(&self) -> RelationKind {
		self.kind
	}

	/// Returns the explicitly declared related model, if any.
	pub fn target_model(&self) -> Option<&str> {
		self.target.as_deref()
	}
}

/// Runtime description of a document model.
#[derive(Debug, Clone)]
pub struct ModelSchema {
	name: String,
	collection: String,
	relations: IndexMap<String, RelationSpec>,
	field_types: IndexMap<String, String>,
	defaults: IndexMap<String, Value>,
}

impl ModelSchema {
	/// Creates a schema for `name`.
	///
	/// The collection defaults to the pluralized snake-case model name
	/// (`BlogPost` persists to `blog_posts`).
	pub fn new(name: impl Into<String>) -> Self {
		let name = name.into();
		let collection = name.to_snake_case().to_plural();
		Self {
			name,
			collection,
			relations: IndexMap::new(),
			field_types: IndexMap::new(),
			defaults: IndexMap::new(),
		}
	}

	/// Overrides the collection name.
	pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
		self.collection = collection.into();
		self
	}

	/// Declares a relation. A later declaration on the same field replaces the earlier one.
	pub fn relation(mut self, relation: RelationSpec) -> Self {
		self.relations.insert(relation.field.clone(), relation);
		self
	}

	/// Maps a field to a related model explicitly, bypassing name inference.
	pub fn field_type(mut self, field: impl Into<String>, model: impl Into<String>) -> Self {
		self.field_types.insert(field.into(), model.into());
		self
	}

	/// Sets the value a field holds on a blank instance.
	pub fn default_value(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
		self.defaults.insert(field.into(), value.into());
		self
	}

	/// Returns the model name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the collection documents of this model persist to.
	pub fn collection(&self) -> &str {
		&self.collection
	}

	/// Returns the relation declared on `field`.
	pub fn relation_for(&self, field: &str) -> Option<&RelationSpec> {
		self.relations.get(field)
	}

	/// Returns all declared relations in declaration order.
	pub fn relations(&self) -> impl Iterator<Item = &RelationSpec> {
		self.relations.values()
	}

	/// Returns the `embedded_in` back-references of this model.
	pub fn embedding_parents(&self) -> impl Iterator<Item = &RelationSpec> {
		self.relations
			.values()
			.filter(|relation| relation.kind == RelationKind::EmbeddedIn)
	}

	/// Returns the explicitly mapped model for `field`.
	pub fn explicit_field_type(&self, field: &str) -> Option<&str> {
		self.field_types.get(field).map(String::as_str)
	}

	/// Returns the declared field defaults.
	pub fn defaults(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.defaults.iter().map(|(field, value)| (field.as_str(), value))
	}

	/// Constructs a blank instance: a fresh identity plus the declared defaults.
	pub fn new_instance(&self) -> Document {
		let mut document = Document::new(self.name.clone());
		for (field, value) in &self.defaults {
			document.set(field.clone(), value.clone());
		}
		document
	}
}
