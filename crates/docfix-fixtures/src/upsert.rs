//! Deduplicating persistence.
//!
//! A built fixture document is only inserted when no stored document of its
//! collection carries the same attributes. Repeated runs against a persistent store
//! therefore reuse what earlier runs wrote instead of accumulating duplicates.

use bson::{Bson, Document as BsonDocument};
use docfix_odm::{Document, DocumentBackend, ID_FIELD, ModelSchema};

use crate::error::FixtureResult;

/// Builds the attribute filter used to find an equivalent stored document.
///
/// Identity is excluded. Sub-document attributes are flattened one level into
/// dotted keys (`address.city`) without their own identity, and array attributes
/// never take part in matching, at the top level or inside a sub-document.
///
/// # Example
///
/// ```
/// use bson::doc;
/// use docfix_fixtures::comparison_key;
/// use docfix_odm::Document;
///
/// let mut user = Document::new("User");
/// user.set("name", "Alice");
/// user.set("address", bson::Bson::Document(doc! { "city": "Paris" }));
/// user.set("tags", bson::Bson::Array(vec!["admin".into()]));
///
/// assert_eq!(comparison_key(&user), doc! { "name": "Alice", "address.city": "Paris" });
/// ```
pub fn comparison_key(document: &Document) -> BsonDocument {
	let mut key = BsonDocument::new();
	for (field, value) in document.attributes() {
		match value {
			Bson::Array(_) => {}
			Bson::Document(nested) => {
				for (nested_field, nested_value) in nested {
					if nested_field == ID_FIELD || matches!(nested_value, Bson::Array(_)) {
						continue;
					}
					key.insert(format!("{}.{}", field, nested_field), nested_value);
				}
			}
			other => {
				key.insert(field, other);
			}
		}
	}
	key
}

/// Returns the stored equivalent of `document`, inserting `document` when there is none.
///
/// A reused document is rebuilt from its stored form, keeping the in-memory shape
/// of `document` (resolved references and embedded children). A new document is
/// written with the identities it already carries, including those of its
/// embedded children.
pub fn persist_or_reuse(
	backend: &dyn DocumentBackend,
	schema: &ModelSchema,
	document: Document,
) -> FixtureResult<Document> {
	let key = comparison_key(&document);
	if let Some(stored) = backend.find_one(schema.collection(), &key)? {
		let reused = Document::from_stored(&document, &stored)?;
		tracing::trace!(
			model = schema.name(),
			id = %reused.id(),
			"reusing stored document"
		);
		return Ok(reused);
	}

	let id = backend.insert_one(schema.collection(), document.to_bson())?;
	tracing::trace!(model = schema.name(), id = %id, "inserted document");
	Ok(document)
}
