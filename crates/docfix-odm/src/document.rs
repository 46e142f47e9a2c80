//! Document instances.
//!
//! A [`Document`] is one model instance: a model name, an identity assigned at
//! construction and an ordered set of fields. Field values keep the in-memory
//! shape of relations (resolved referenced documents, embedded children and
//! back-references to an embedding parent); [`Document::to_bson`] lowers that
//! shape to the form a document store persists.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bson::oid::ObjectId;
use bson::{Bson, Document as BsonDocument};
use indexmap::IndexMap;

use crate::error::{OdmError, OdmResult};

/// Name of the identity attribute in the persisted form.
pub const ID_FIELD: &str = "_id";

/// Returns the persisted attribute holding the foreign key of a referenced to-one field.
pub fn foreign_key(field: &str) -> String {
	format!("{}_id", field)
}

/// Lightweight handle to a document: model name plus identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef {
	/// Model name of the referenced document.
	pub model: String,
	/// Identity of the referenced document.
	pub id: ObjectId,
}

impl fmt::Display for DocumentRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}({})", self.model, self.id.to_hex())
	}
}

/// A field value on a [`Document`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Plain data: scalars and plain mappings.
	Bson(Bson),
	/// Ordered sequence of values, possibly mixing plain data and embedded children.
	Array(Vec<Value>),
	/// Embedded child document.
	Embedded(Box<Document>),
	/// Referenced to-one relation; `None` is the absent-reference marker.
	Reference(Option<Arc<Document>>),
	/// Back-reference from an embedded child to its parent.
	Parent(DocumentRef),
}

impl Value {
	/// Returns the plain data, if this is a [`Value::Bson`].
	pub fn as_bson(&self) -> Option<&Bson> {
		match self {
			Self::Bson(value) => Some(value),
			_ => None,
		}
	}

	/// Returns the elements, if this is a [`Value::Array`].
	pub fn as_array(&self) -> Option<&[Value]> {
		match self {
			Self::Array(values) => Some(values.as_slice()),
			_ => None,
		}
	}

	/// Returns the child, if this is a [`Value::Embedded`].
	pub fn as_embedded(&self) -> Option<&Document> {
		match self {
			Self::Embedded(document) => Some(document),
			_ => None,
		}
	}

	/// Returns the referenced document, if this is a populated [`Value::Reference`].
	pub fn as_reference(&self) -> Option<&Arc<Document>> {
		match self {
			Self::Reference(Some(document)) => Some(document),
			_ => None,
		}
	}

	/// Returns true for null data and empty references.
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Bson(Bson::Null) | Self::Reference(None))
	}

	/// Lowers this value to its persisted form.
	///
	/// References persist as the target identity and parent back-references are not
	/// persisted at all (they lower to null).
	pub fn to_bson(&self) -> Bson {
		match self {
			Self::Bson(value) => value.clone(),
			Self::Array(values) => Bson::Array(values.iter().map(Value::to_bson).collect()),
			Self::Embedded(document) => Bson::Document(document.to_bson()),
			Self::Reference(Some(document)) => Bson::ObjectId(document.id()),
			Self::Reference(None) | Self::Parent(_) => Bson::Null,
		}
	}
}

impl From<Bson> for Value {
	fn from(value: Bson) -> Self {
		match value {
			Bson::Array(values) => Self::Array(values.into_iter().map(Value::from).collect()),
			other => Self::Bson(other),
		}
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::Bson(Bson::String(value.to_string()))
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::Bson(Bson::String(value))
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Bson(Bson::Int64(value))
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Bson(Bson::Double(value))
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bson(Bson::Boolean(value))
	}
}

impl From<Document> for Value {
	fn from(document: Document) -> Self {
		Self::Embedded(Box::new(document))
	}
}

/// A model instance.
///
/// Equality follows document identity: two documents are equal when they share
/// model name and id, whatever their field values.
#[derive(Debug, Clone)]
pub struct Document {
	model: String,
	id: ObjectId,
	fields: IndexMap<String, Value>,
}

impl Document {
	/// Creates an empty document with a freshly generated identity.
	pub fn new(model: impl Into<String>) -> Self {
		Self::with_id(model, ObjectId::new())
	}

	/// Creates an empty document with the given identity.
	pub fn with_id(model: impl Into<String>, id: ObjectId) -> Self {
		Self {
			model: model.into(),
			id,
			fields: IndexMap::new(),
		}
	}

	/// Returns the model name.
	pub fn model(&self) -> &str {
		&self.model
	}

	/// Returns the identity.
	pub fn id(&self) -> ObjectId {
		self.id
	}

	/// Replaces the identity.
	pub fn set_id(&mut self, id: ObjectId) {
		self.id = id;
	}

	/// Returns a handle to this document.
	pub fn to_ref(&self) -> DocumentRef {
		DocumentRef {
			model: self.model.clone(),
			id: self.id,
		}
	}

	/// Returns the value of `field`.
	pub fn get(&self, field: &str) -> Option<&Value> {
		self.fields.get(field)
	}

	/// Returns the plain data held by `field`.
	pub fn get_bson(&self, field: &str) -> Option<&Bson> {
		self.get(field).and_then(Value::as_bson)
	}

	/// Returns the document referenced by `field`.
	pub fn reference(&self, field: &str) -> Option<&Arc<Document>> {
		self.get(field).and_then(Value::as_reference)
	}

	/// Returns the child embedded in `field`.
	pub fn embedded(&self, field: &str) -> Option<&Document> {
		self.get(field).and_then(Value::as_embedded)
	}

	/// Returns the children embedded in the sequence held by `field`, in order.
	pub fn embedded_many(&self, field: &str) -> Vec<&Document> {
		self.get(field)
			.and_then(Value::as_array)
			.map(|values| values.iter().filter_map(Value::as_embedded).collect())
			.unwrap_or_default()
	}

	/// Returns the parent back-reference held by `field`.
	pub fn parent(&self, field: &str) -> Option<&DocumentRef> {
		match self.get(field) {
			Some(Value::Parent(parent)) => Some(parent),
			_ => None,
		}
	}

	/// Sets `field`, keeping its position when it already exists.
	pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
		self.fields.insert(field.into(), value.into());
	}

	/// Removes `field` and returns its value.
	pub fn take(&mut self, field: &str) -> Option<Value> {
		self.fields.shift_remove(field)
	}

	/// Returns true when `field` is set.
	pub fn contains(&self, field: &str) -> bool {
		self.fields.contains_key(field)
	}

	/// Iterates over fields in assignment order.
	pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.fields.iter().map(|(field, value)| (field.as_str(), value))
	}

	/// Returns the persisted attributes, excluding identity.
	///
	/// Referenced to-one fields persist under their foreign key (`author` becomes
	/// `author_id`) and parent back-references are omitted.
	pub fn attributes(&self) -> BsonDocument {
		let mut attributes = BsonDocument::new();
		for (field, value) in &self.fields {
			match value {
				Value::Parent(_) => {}
				Value::Reference(_) => {
					attributes.insert(foreign_key(field), value.to_bson());
				}
				other => {
					attributes.insert(field.clone(), other.to_bson());
				}
			}
		}
		attributes
	}

	/// Returns the full persisted form: identity first, then attributes.
	pub fn to_bson(&self) -> BsonDocument {
		let mut document = BsonDocument::new();
		document.insert(ID_FIELD, self.id);
		for (key, value) in self.attributes() {
			document.insert(key, value);
		}
		document
	}

	/// Rebuilds a stored document using `template` for its in-memory shape.
	///
	/// `template` is an instance of the same model whose persisted form matched
	/// `stored`. Its embedded fields tell which stored sub-documents are children,
	/// and its resolved references are re-attached when the stored foreign key
	/// still designates them. Identity and plain data come from `stored`, and the
	/// rebuilt children point back at the rebuilt document.
	pub fn from_stored(template: &Document, stored: &BsonDocument) -> OdmResult<Document> {
		let id = stored_id(stored).ok_or_else(|| {
			OdmError::Serialization(format!(
				"stored {} document has no ObjectId {}",
				template.model, ID_FIELD
			))
		})?;
		let mut document = Document::with_id(template.model.clone(), id);

		let references: HashMap<String, (&str, &Option<Arc<Document>>)> = template
			.fields
			.iter()
			.filter_map(|(field, value)| match value {
				Value::Reference(target) => Some((foreign_key(field), (field.as_str(), target))),
				_ => None,
			})
			.collect();

		for (key, value) in stored {
			if key == ID_FIELD {
				continue;
			}
			if let Some((field, target)) = references.get(key) {
				let target = match (target, value) {
					(Some(target), Bson::ObjectId(oid)) if target.id() == *oid => {
						Some(Arc::clone(target))
					}
					_ => None,
				};
				document.set(*field, Value::Reference(target));
				continue;
			}
			let rebuilt = match (template.get(key), value) {
				(Some(Value::Embedded(child)), Bson::Document(sub)) => stored_child(child, sub)?,
				(Some(Value::Array(elements)), Bson::Array(items)) => {
					let child = elements.iter().find_map(Value::as_embedded);
					let targets: HashMap<ObjectId, &Arc<Document>> = elements
						.iter()
						.filter_map(Value::as_reference)
						.map(|target| (target.id(), target))
						.collect();
					let mut values = Vec::with_capacity(items.len());
					for item in items {
						values.push(match (child, item) {
							(Some(child), Bson::Document(sub)) => stored_child(child, sub)?,
							(_, Bson::ObjectId(id)) => match targets.get(id) {
								Some(target) => Value::Reference(Some(Arc::clone(target))),
								None => Value::from(item.clone()),
							},
							_ => Value::from(item.clone()),
						});
					}
					Value::Array(values)
				}
				_ => Value::from(value.clone()),
			};
			document.set(key.clone(), rebuilt);
		}

		for (field, value) in &template.fields {
			if let Value::Parent(parent) = value {
				document.set(field.clone(), Value::Parent(parent.clone()));
			}
		}
		document.adopt_children();
		Ok(document)
	}

	/// Returns a copy of this document under a new identity.
	///
	/// Embedded descendants are copied under new identities as well, and each copied
	/// child points back at its copied parent.
	pub fn duplicate(&self) -> Document {
		let mut copy = Document {
			model: self.model.clone(),
			id: ObjectId::new(),
			fields: self.fields.clone(),
		};
		for value in copy.fields.values_mut() {
			duplicate_embedded(value);
		}
		copy.adopt_children();
		copy
	}

	/// Points the parent back-reference of every direct embedded child at this document.
	pub fn adopt_children(&mut self) {
		let parent = self.to_ref();
		for value in self.fields.values_mut() {
			match value {
				Value::Embedded(child) => child.repoint_parent(&parent),
				Value::Array(values) => {
					for value in values.iter_mut() {
						if let Value::Embedded(child) = value {
							child.repoint_parent(&parent);
						}
					}
				}
				_ => {}
			}
		}
	}

	fn repoint_parent(&mut self, parent: &DocumentRef) {
		for value in self.fields.values_mut() {
			if let Value::Parent(current) = value {
				*current = parent.clone();
			}
		}
	}
}

impl PartialEq for Document {
	fn eq(&self, other: &Self) -> bool {
		self.model == other.model && self.id == other.id
	}
}

impl Eq for Document {}

fn stored_id(stored: &BsonDocument) -> Option<ObjectId> {
	match stored.get(ID_FIELD) {
		Some(Bson::ObjectId(id)) => Some(*id),
		_ => None,
	}
}

fn duplicate_embedded(value: &mut Value) {
	match value {
		Value::Embedded(child) => **child = child.duplicate(),
		Value::Array(values) => values.iter_mut().for_each(duplicate_embedded),
		_ => {}
	}
}

fn stored_child(template: &Document, stored: &BsonDocument) -> OdmResult<Value> {
	// Sub-documents written outside this layer may lack an identity; keep them as data.
	if stored_id(stored).is_none() {
		return Ok(Value::Bson(Bson::Document(stored.clone())));
	}
	let child = Document::from_stored(template, stored)?;
	Ok(Value::Embedded(Box::new(child)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use bson::doc;
	use rstest::{fixture, rstest};

	#[fixture]
	fn alice() -> Arc<Document> {
		let mut user = Document::new("User");
		user.set("name", "Alice");
		user.set("age", 30_i64);
		Arc::new(user)
	}

	#[fixture]
	fn post(alice: Arc<Document>) -> Document {
		let mut post = Document::new("Post");
		post.set("title", "Hi");
		post.set("author", Value::Reference(Some(alice)));

		let mut comment = Document::new("Comment");
		comment.set("text", "ok");
		comment.set("post", Value::Parent(post.to_ref()));
		post.set("comments", Value::Array(vec![Value::from(comment)]));
		post
	}

	#[rstest]
	fn test_identity_equality() {
		let mut first = Document::new("User");
		first.set("name", "Alice");
		let mut second = Document::with_id("User", first.id());
		second.set("name", "Bob");

		assert_eq!(first, second);
		assert_ne!(first, Document::new("User"));
		assert_ne!(first, Document::with_id("Admin", first.id()));
	}

	#[rstest]
	fn test_set_keeps_position() {
		let mut document = Document::new("User");
		document.set("name", "Alice");
		document.set("age", 30_i64);
		document.set("name", "Bob");

		let fields: Vec<_> = document.fields().map(|(field, _)| field).collect();
		assert_eq!(fields, vec!["name", "age"]);
		assert_eq!(document.get_bson("name"), Some(&Bson::String("Bob".into())));
	}

	#[rstest]
	fn test_value_from_bson_array() {
		let value = Value::from(Bson::Array(vec![Bson::Int64(1), Bson::Int64(2)]));
		assert_eq!(
			value,
			Value::Array(vec![Value::from(1_i64), Value::from(2_i64)])
		);
	}

	#[rstest]
	fn test_persisted_form(post: Document) {
		let alice = Arc::clone(post.reference("author").unwrap());
		let persisted = post.to_bson();
		let comment_id = post.embedded_many("comments")[0].id();

		assert_eq!(
			persisted,
			doc! {
				"_id": post.id(),
				"title": "Hi",
				"author_id": alice.id(),
				"comments": [{ "_id": comment_id, "text": "ok" }],
			}
		);
	}

	#[rstest]
	fn test_absent_reference_persists_null() {
		let mut post = Document::new("Post");
		post.set("author", Value::Reference(None));
		assert_eq!(post.attributes(), doc! { "author_id": Bson::Null });
		assert!(post.get("author").unwrap().is_null());
	}

	#[rstest]
	fn test_from_stored_adopts_identity(post: Document) {
		let alice = Arc::clone(post.reference("author").unwrap());
		let stored_id = ObjectId::new();
		let stored_comment_id = ObjectId::new();
		let stored = doc! {
			"_id": stored_id,
			"title": "Hi",
			"author_id": alice.id(),
			"comments": [{ "_id": stored_comment_id, "text": "ok" }],
		};

		let rebuilt = Document::from_stored(&post, &stored).unwrap();

		assert_eq!(rebuilt.id(), stored_id);
		assert_eq!(rebuilt.reference("author"), Some(&alice));
		let comments = rebuilt.embedded_many("comments");
		assert_eq!(comments.len(), 1);
		assert_eq!(comments[0].id(), stored_comment_id);
		assert_eq!(comments[0].parent("post"), Some(&rebuilt.to_ref()));
	}

	#[rstest]
	fn test_from_stored_drops_stale_reference(post: Document) {
		let stored = doc! {
			"_id": ObjectId::new(),
			"title": "Hi",
			"author_id": ObjectId::new(),
		};

		let rebuilt = Document::from_stored(&post, &stored).unwrap();
		assert_eq!(rebuilt.get("author"), Some(&Value::Reference(None)));
	}

	#[rstest]
	fn test_from_stored_requires_identity(post: Document) {
		let result = Document::from_stored(&post, &doc! { "title": "Hi" });
		assert!(matches!(result, Err(OdmError::Serialization(_))));
	}

	#[rstest]
	fn test_from_stored_keeps_reference_arrays(alice: Arc<Document>) {
		let mut post = Document::new("Post");
		post.set(
			"readers",
			Value::Array(vec![Value::Reference(Some(Arc::clone(&alice)))]),
		);
		let stored = doc! {
			"_id": ObjectId::new(),
			"readers": [alice.id(), ObjectId::new()],
		};

		let rebuilt = Document::from_stored(&post, &stored).unwrap();
		let readers = rebuilt.get("readers").and_then(Value::as_array).unwrap();
		assert_eq!(readers[0], Value::Reference(Some(alice)));
		assert!(matches!(readers[1], Value::Bson(Bson::ObjectId(_))));
	}

	#[rstest]
	fn test_duplicate_renews_embedded_identities(post: Document) {
		let copy = post.duplicate();
		let original = post.embedded_many("comments")[0];
		let copied = copy.embedded_many("comments")[0];

		assert_ne!(copy.id(), post.id());
		assert_ne!(copied.id(), original.id());
		assert_eq!(copied.parent("post"), Some(&copy.to_ref()));
		assert_eq!(original.parent("post"), Some(&post.to_ref()));
		assert_eq!(copied.get_bson("text"), original.get_bson("text"));
		assert_eq!(copy.reference("author"), post.reference("author"));
	}
}
