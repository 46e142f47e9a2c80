//! Fixture sets and entries.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use super::value::FieldValue;

/// One named fixture: field name to value, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureEntry {
	fields: IndexMap<String, FieldValue>,
}

impl FixtureEntry {
	/// Creates an entry from its fields.
	pub fn new(fields: IndexMap<String, FieldValue>) -> Self {
		Self { fields }
	}

	/// Returns the value of `field`.
	pub fn get(&self, field: &str) -> Option<&FieldValue> {
		self.fields.get(field)
	}

	/// Iterates over fields in file order.
	pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
		self.fields.iter().map(|(field, value)| (field.as_str(), value))
	}

	/// Returns the number of fields.
	pub fn len(&self) -> usize {
		self.fields.len()
	}

	/// Returns true if the entry has no fields.
	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}
}

impl FromIterator<(String, FieldValue)> for FixtureEntry {
	fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
		Self::new(iter.into_iter().collect())
	}
}

/// All fixtures for one model, keyed by fixture key in file order.
///
/// The set name is the pluralized lowercase model name (`users` for `User`) and is
/// normally the base name of the file the set was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureSet {
	name: String,
	source: Option<PathBuf>,
	entries: IndexMap<String, FixtureEntry>,
}

impl FixtureSet {
	/// Creates a set that was not read from a file.
	pub fn new(name: impl Into<String>, entries: IndexMap<String, FixtureEntry>) -> Self {
		Self {
			name: name.into(),
			source: None,
			entries,
		}
	}

	/// Records the file the set was read from.
	pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
		self.source = Some(path.into());
		self
	}

	/// Returns the set name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the file the set was read from.
	pub fn source(&self) -> Option<&Path> {
		self.source.as_deref()
	}

	/// Returns the entry under `key`.
	pub fn get(&self, key: &str) -> Option<&FixtureEntry> {
		self.entries.get(key)
	}

	/// Returns true if an entry exists under `key`.
	pub fn contains(&self, key: &str) -> bool {
		self.entries.contains_key(key)
	}

	/// Iterates over fixture keys in file order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	/// Iterates over entries in file order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &FixtureEntry)> {
		self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
	}

	/// Returns the number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true if the set has no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
