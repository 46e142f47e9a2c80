//! Fixture field values.
//!
//! Each YAML value in a fixture entry is classified once, at parse time, into a
//! [`FieldValue`]. Reference tokens are written either as a plain symbol (`:alice`) or
//! with an explicit tag (`!ref alice`). A quoted `":alice"` stays a string.

use bson::{Bson, Document as BsonDocument};
use indexmap::IndexMap;

/// A field value from a fixture entry.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
	/// Explicit null.
	Null,
	/// String, integer, float or boolean. Dates keep their YAML string form.
	Scalar(Bson),
	/// Reference token naming a fixture key in the related fixture set.
	Reference(String),
	/// Nested mapping, describing an embedded document.
	Mapping(IndexMap<String, FieldValue>),
	/// Ordered sequence of values.
	Sequence(Vec<FieldValue>),
}

impl FieldValue {
	/// Returns the token, if this is a [`FieldValue::Reference`].
	pub fn as_reference(&self) -> Option<&str> {
		match self {
			Self::Reference(token) => Some(token),
			_ => None,
		}
	}

	/// Lowers this value to plain data, leaving reference tokens unresolved as symbols.
	pub fn to_plain_bson(&self) -> Bson {
		match self {
			Self::Null => Bson::Null,
			Self::Scalar(value) => value.clone(),
			Self::Reference(token) => Bson::Symbol(token.clone()),
			Self::Mapping(fields) => Bson::Document(plain_document(fields)),
			Self::Sequence(items) => Bson::Array(items.iter().map(Self::to_plain_bson).collect()),
		}
	}
}

/// Lowers a field mapping to a plain BSON document.
pub fn plain_document(fields: &IndexMap<String, FieldValue>) -> BsonDocument {
	let mut document = BsonDocument::new();
	for (field, value) in fields {
		document.insert(field.clone(), value.to_plain_bson());
	}
	document
}

/// Returns the fixture key of a symbol-form token such as `:alice`.
pub(super) fn reference_token(text: &str) -> Option<&str> {
	let token = text.strip_prefix(':')?;
	let mut chars = token.chars();
	let first = chars.next()?;
	if !(first.is_alphabetic() || first == '_') {
		return None;
	}
	chars
		.all(|c| c.is_alphanumeric() || c == '_')
		.then_some(token)
}

#[cfg(test)]
mod tests {
	use super::*;
	use bson::doc;
	use rstest::rstest;

	use crate::fixtures::yaml::{LoadError, load};

	fn parse(yaml: &str) -> Result<FieldValue, LoadError> {
		load(yaml)
	}

	#[rstest]
	#[case("~", FieldValue::Null)]
	#[case("30", FieldValue::Scalar(Bson::Int64(30)))]
	#[case("2.5", FieldValue::Scalar(Bson::Double(2.5)))]
	#[case("true", FieldValue::Scalar(Bson::Boolean(true)))]
	#[case("Alice", FieldValue::Scalar(Bson::String("Alice".into())))]
	#[case("2024-01-31", FieldValue::Scalar(Bson::String("2024-01-31".into())))]
	#[case(":alice", FieldValue::Reference("alice".into()))]
	#[case(":alice_2", FieldValue::Reference("alice_2".into()))]
	#[case("!ref alice", FieldValue::Reference("alice".into()))]
	#[case("!ruby/symbol alice", FieldValue::Reference("alice".into()))]
	#[case("\"12:30\"", FieldValue::Scalar(Bson::String("12:30".into())))]
	#[case("\":30\"", FieldValue::Scalar(Bson::String(":30".into())))]
	#[case("\":\"", FieldValue::Scalar(Bson::String(":".into())))]
	#[case("\":not a token\"", FieldValue::Scalar(Bson::String(":not a token".into())))]
	#[case("\":smile\"", FieldValue::Scalar(Bson::String(":smile".into())))]
	#[case("':smile'", FieldValue::Scalar(Bson::String(":smile".into())))]
	#[case("!!str :smile", FieldValue::Scalar(Bson::String(":smile".into())))]
	#[case("!ref \"alice\"", FieldValue::Reference("alice".into()))]
	fn test_classify_scalars(#[case] yaml: &str, #[case] expected: FieldValue) {
		assert_eq!(parse(yaml).unwrap(), expected);
	}

	#[rstest]
	fn test_classify_nested() {
		let value = parse("city: Paris\ntags:\n  - a\n  - :b\nzip: 75001\n").unwrap();

		let FieldValue::Mapping(fields) = &value else {
			panic!("expected mapping, got {:?}", value);
		};
		let keys: Vec<_> = fields.keys().map(String::as_str).collect();
		assert_eq!(keys, vec!["city", "tags", "zip"]);
		assert_eq!(
			fields["tags"],
			FieldValue::Sequence(vec![
				FieldValue::Scalar(Bson::String("a".into())),
				FieldValue::Reference("b".into()),
			])
		);
	}

	#[rstest]
	fn test_unknown_tag_is_transparent() {
		assert_eq!(
			parse("!custom hello").unwrap(),
			FieldValue::Scalar(Bson::String("hello".into()))
		);
	}

	#[rstest]
	#[case("!ref [a]")]
	#[case("? [a]\n: 1\n")]
	fn test_classify_invalid(#[case] yaml: &str) {
		assert!(parse(yaml).is_err());
	}

	#[rstest]
	fn test_to_plain_bson() {
		let value = parse("city: Paris\nowner: :alice\nrooms: [1, 2]\nnote: ~\n").unwrap();
		assert_eq!(
			value.to_plain_bson(),
			Bson::Document(doc! {
				"city": "Paris",
				"owner": Bson::Symbol("alice".into()),
				"rooms": [1_i64, 2_i64],
				"note": Bson::Null,
			})
		);
	}
}
