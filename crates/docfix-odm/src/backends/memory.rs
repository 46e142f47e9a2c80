//! In-memory document store.
//!
//! Stores documents per collection behind a `parking_lot::RwLock`. Intended for
//! tests and for harnesses that do not need a real database.

use std::collections::HashMap;

use bson::oid::ObjectId;
use bson::{Bson, Document as BsonDocument};
use parking_lot::RwLock;

use crate::backend::DocumentBackend;
use crate::document::ID_FIELD;
use crate::error::{OdmError, OdmResult};

/// In-memory [`DocumentBackend`].
#[derive(Debug, Default)]
pub struct InMemoryBackend {
	collections: RwLock<HashMap<String, Vec<BsonDocument>>>,
}

impl InMemoryBackend {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Removes every document from every collection.
	pub fn clear(&self) {
		self.collections.write().clear();
	}

	/// Returns the names of collections holding at least one document, sorted.
	pub fn collection_names(&self) -> Vec<String> {
		let mut names: Vec<String> = self
			.collections
			.read()
			.iter()
			.filter(|(_, documents)| !documents.is_empty())
			.map(|(name, _)| name.clone())
			.collect();
		names.sort();
		names
	}
}

impl DocumentBackend for InMemoryBackend {
	fn find_one(&self, collection: &str, filter: &BsonDocument) -> OdmResult<Option<BsonDocument>> {
		let collections = self.collections.read();
		let found = collections
			.get(collection)
			.and_then(|documents| documents.iter().find(|document| matches(document, filter)))
			.cloned();
		Ok(found)
	}

	fn insert_one(&self, collection: &str, mut document: BsonDocument) -> OdmResult<ObjectId> {
		let id = match document.get(ID_FIELD) {
			Some(Bson::ObjectId(id)) => *id,
			Some(other) => {
				return Err(OdmError::Backend(format!(
					"{} must be an ObjectId, got {}",
					ID_FIELD, other
				)));
			}
			None => {
				let id = ObjectId::new();
				document.insert(ID_FIELD, id);
				id
			}
		};

		let mut collections = self.collections.write();
		let documents = collections.entry(collection.to_string()).or_default();
		if documents
			.iter()
			.any(|existing| existing.get(ID_FIELD) == Some(&Bson::ObjectId(id)))
		{
			return Err(OdmError::DuplicateKey {
				collection: collection.to_string(),
				id: id.to_hex(),
			});
		}
		documents.push(document);
		Ok(id)
	}

	fn find_all(&self, collection: &str) -> OdmResult<Vec<BsonDocument>> {
		Ok(self
			.collections
			.read()
			.get(collection)
			.cloned()
			.unwrap_or_default())
	}
}

fn matches(document: &BsonDocument, filter: &BsonDocument) -> bool {
	filter
		.iter()
		.all(|(path, expected)| match (lookup_path(document, path), expected) {
			(None, Bson::Null) => true,
			(Some(actual), expected) => actual == expected,
			(None, _) => false,
		})
}

/// Follows a dotted path through nested documents.
fn lookup_path<'a>(document: &'a BsonDocument, path: &str) -> Option<&'a Bson> {
	let mut segments = path.split('.');
	let mut current = document.get(segments.next()?)?;
	for segment in segments {
		current = match current {
			Bson::Document(nested) => nested.get(segment)?,
			_ => return None,
		};
	}
	Some(current)
}

#[cfg(test)]
mod tests {
	use super::*;
	use bson::doc;
	use rstest::{fixture, rstest};

	#[fixture]
	fn backend() -> InMemoryBackend {
		let backend = InMemoryBackend::new();
		backend
			.insert_one(
				"users",
				doc! { "name": "Alice", "address": { "city": "Paris", "zip": "75001" } },
			)
			.unwrap();
		backend
			.insert_one("users", doc! { "name": "Bob", "nickname": Bson::Null })
			.unwrap();
		backend
	}

	#[rstest]
	fn test_insert_assigns_identity(backend: InMemoryBackend) {
		let stored = backend.find_all("users").unwrap();
		assert_eq!(stored.len(), 2);
		assert!(matches!(stored[0].get(ID_FIELD), Some(Bson::ObjectId(_))));
	}

	#[rstest]
	fn test_insert_keeps_given_identity() {
		let backend = InMemoryBackend::new();
		let id = ObjectId::new();
		let inserted = backend
			.insert_one("users", doc! { "_id": id, "name": "Alice" })
			.unwrap();
		assert_eq!(inserted, id);
	}

	#[rstest]
	fn test_insert_duplicate_identity() {
		let backend = InMemoryBackend::new();
		let id = ObjectId::new();
		backend.insert_one("users", doc! { "_id": id }).unwrap();

		let result = backend.insert_one("users", doc! { "_id": id });
		assert!(matches!(result, Err(OdmError::DuplicateKey { .. })));
	}

	#[rstest]
	fn test_insert_rejects_foreign_identity() {
		let backend = InMemoryBackend::new();
		let result = backend.insert_one("users", doc! { "_id": 1 });
		assert!(matches!(result, Err(OdmError::Backend(_))));
	}

	#[rstest]
	#[case(doc! { "name": "Alice" }, Some("Alice"))]
	#[case(doc! { "address.city": "Paris" }, Some("Alice"))]
	#[case(doc! { "address": { "city": "Paris", "zip": "75001" } }, Some("Alice"))]
	#[case(doc! { "address.city": "Lyon" }, None)]
	#[case(doc! { "name": "Alice", "address.zip": "00000" }, None)]
	#[case(doc! { "nickname": Bson::Null, "name": "Bob" }, Some("Bob"))]
	#[case(doc! { "nickname": Bson::Null }, Some("Alice"))]
	#[case(doc! { "name.first": "Alice" }, None)]
	fn test_find_one(
		backend: InMemoryBackend,
		#[case] filter: BsonDocument,
		#[case] expected: Option<&str>,
	) {
		let found = backend.find_one("users", &filter).unwrap();
		let name = found.as_ref().and_then(|document| document.get_str("name").ok());
		assert_eq!(name, expected);
	}

	#[rstest]
	fn test_find_in_missing_collection(backend: InMemoryBackend) {
		assert!(backend.find_one("posts", &doc! {}).unwrap().is_none());
		assert_eq!(backend.count("posts").unwrap(), 0);
	}

	#[rstest]
	fn test_clear(backend: InMemoryBackend) {
		assert_eq!(backend.collection_names(), vec!["users".to_string()]);
		backend.clear();
		assert!(backend.collection_names().is_empty());
		assert_eq!(backend.count("users").unwrap(), 0);
	}
}
