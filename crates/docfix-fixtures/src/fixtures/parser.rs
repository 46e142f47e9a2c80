//! Fixture file parsing.
//!
//! A fixture file is a YAML mapping from fixture key to a mapping of field values:
//!
//! ```yaml
//! alice:
//!   name: Alice
//!   age: 30
//! bob:
//!   name: Bob
//!   manager: :alice
//! ```

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use super::set::{FixtureEntry, FixtureSet};
use super::value::FieldValue;
use super::yaml::{self, LoadError};
use crate::error::{FixtureError, FixtureResult};

/// Parser for YAML fixture files.
#[derive(Debug, Default)]
pub struct FixtureParser;

impl FixtureParser {
	/// Creates a new fixture parser.
	pub fn new() -> Self {
		Self
	}

	/// Parses the fixture file at `path`.
	///
	/// The set is named after the file's base name.
	///
	/// # Errors
	///
	/// Returns an error if:
	/// - The file cannot be read
	/// - The file is not valid YAML
	/// - The file does not have the fixture shape
	pub fn parse_file(&self, path: &Path) -> FixtureResult<FixtureSet> {
		let name = set_name(path)?;
		let content = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
			path: path.to_path_buf(),
			source,
		})?;

		Ok(self.parse(&name, &content, path)?.with_source(path))
	}

	/// Parses fixture text into a set called `name`.
	///
	/// # Example
	///
	/// ```
	/// use docfix_fixtures::FixtureParser;
	///
	/// let set = FixtureParser::new()
	///     .parse_str("users", "alice:\n  name: Alice\n")
	///     .unwrap();
	/// assert_eq!(set.name(), "users");
	/// assert!(set.contains("alice"));
	/// ```
	pub fn parse_str(&self, name: &str, content: &str) -> FixtureResult<FixtureSet> {
		let origin = PathBuf::from(format!("<{}>", name));
		self.parse(name, content, &origin)
	}

	fn parse(&self, name: &str, content: &str, origin: &Path) -> FixtureResult<FixtureSet> {
		let value = yaml::load(content).map_err(|error| match error {
			LoadError::Syntax(source) => FixtureError::Parse {
				path: origin.to_path_buf(),
				source,
			},
			LoadError::Shape(message) => invalid(origin, message),
		})?;

		let fixtures = match value {
			// An empty file loads as null.
			FieldValue::Null => return Ok(FixtureSet::new(name, IndexMap::new())),
			FieldValue::Mapping(fixtures) => fixtures,
			other => {
				return Err(invalid(
					origin,
					format!("expected a mapping of fixtures, got {}", kind_of(&other)),
				));
			}
		};

		let mut entries = IndexMap::with_capacity(fixtures.len());
		for (key, fields) in fixtures {
			let entry = match fields {
				FieldValue::Mapping(fields) => FixtureEntry::new(fields),
				FieldValue::Null => FixtureEntry::default(),
				other => {
					return Err(invalid(
						origin,
						format!(
							"fixture '{}' must be a mapping of fields, got {}",
							key,
							kind_of(&other)
						),
					));
				}
			};
			entries.insert(key, entry);
		}

		tracing::trace!(fixture_set = name, entries = entries.len(), "parsed fixture set");
		Ok(FixtureSet::new(name, entries))
	}
}

fn set_name(path: &Path) -> FixtureResult<String> {
	path.file_stem()
		.and_then(|stem| stem.to_str())
		.filter(|stem| !stem.is_empty())
		.map(str::to_string)
		.ok_or_else(|| invalid(path, "file name is not valid UTF-8".to_string()))
}

fn invalid(path: &Path, message: String) -> FixtureError {
	FixtureError::InvalidFixtureFile {
		path: path.to_path_buf(),
		message,
	}
}

fn kind_of(value: &FieldValue) -> &'static str {
	match value {
		FieldValue::Null => "null",
		FieldValue::Scalar(_) => "a scalar",
		FieldValue::Reference(_) => "a reference token",
		FieldValue::Sequence(_) => "a sequence",
		FieldValue::Mapping(_) => "a mapping",
	}
}
