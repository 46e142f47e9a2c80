//! Document store backend trait.
//!
//! This is the persistence seam: the operations fixture loading needs from a
//! document-oriented database. Calls are blocking; fixture loading runs once per
//! test process and never concurrently against the same store.

use bson::Document as BsonDocument;
use bson::oid::ObjectId;

use crate::error::OdmResult;

/// Trait for document-oriented databases.
///
/// Filters are exact attribute-equality mappings. Keys may be dotted paths into
/// embedded documents (`address.city`), and a null filter value matches both a
/// stored null and a missing attribute.
///
/// # Example
///
/// ```
/// use bson::doc;
/// use docfix_odm::{DocumentBackend, InMemoryBackend};
///
/// let backend = InMemoryBackend::new();
/// backend.insert_one("users", doc! { "name": "Alice" }).unwrap();
///
/// let found = backend.find_one("users", &doc! { "name": "Alice" }).unwrap();
/// assert!(found.is_some());
/// ```
pub trait DocumentBackend: Send + Sync {
	/// Finds the first document in `collection` matching `filter`.
	fn find_one(&self, collection: &str, filter: &BsonDocument) -> OdmResult<Option<BsonDocument>>;

	/// Inserts `document` into `collection` and returns its identity.
	///
	/// A document without an `_id` is given a fresh one.
	fn insert_one(&self, collection: &str, document: BsonDocument) -> OdmResult<ObjectId>;

	/// Returns every document in `collection`, in insertion order.
	fn find_all(&self, collection: &str) -> OdmResult<Vec<BsonDocument>>;

	/// Returns the number of documents in `collection`.
	fn count(&self, collection: &str) -> OdmResult<usize> {
		Ok(self.find_all(collection)?.len())
	}
}
