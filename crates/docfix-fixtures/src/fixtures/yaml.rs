//! YAML loading.
//!
//! Fixture text is read from `yaml-rust2`'s event stream rather than a value tree,
//! because the scalar style decides what a value means: a plain `:alice` is a
//! reference token while a quoted `":alice"` is an ordinary string.

use std::collections::HashMap;

use bson::Bson;
use indexmap::IndexMap;
use yaml_rust2::Yaml;
use yaml_rust2::parser::{Event, EventReceiver, Parser, Tag};
use yaml_rust2::scanner::{ScanError, TScalarStyle};

use super::value::{FieldValue, reference_token};

/// YAML tags that mark a reference token.
const REFERENCE_TAGS: &[&str] = &["ref", "ruby/symbol"];

/// Why fixture text could not be loaded.
#[derive(Debug)]
pub(crate) enum LoadError {
	/// The text is not valid YAML.
	Syntax(ScanError),
	/// The text is valid YAML that cannot be expressed as field values.
	Shape(String),
}

/// Loads the first YAML document of `content`. Empty input loads as null.
pub(crate) fn load(content: &str) -> Result<FieldValue, LoadError> {
	let mut builder = Builder::default();
	let mut parser = Parser::new_from_str(content);
	parser.load(&mut builder, false).map_err(LoadError::Syntax)?;
	builder.finish()
}

enum Frame {
	Sequence {
		anchor: usize,
		items: Vec<FieldValue>,
	},
	Mapping {
		anchor: usize,
		fields: IndexMap<String, FieldValue>,
		key: Option<String>,
	},
}

/// Assembles field values from parser events.
///
/// The first shape error is kept and later events are ignored, since
/// [`EventReceiver::on_event`] cannot fail.
#[derive(Default)]
struct Builder {
	stack: Vec<Frame>,
	anchors: HashMap<usize, FieldValue>,
	root: Option<FieldValue>,
	error: Option<String>,
}

impl EventReceiver for Builder {
	fn on_event(&mut self, event: Event) {
		if self.error.is_some() {
			return;
		}
		if let Err(message) = self.apply(event) {
			self.error = Some(message);
		}
	}
}

impl Builder {
	fn apply(&mut self, event: Event) -> Result<(), String> {
		match event {
			Event::Scalar(text, style, anchor, tag) => {
				if let Some(Frame::Mapping { key: slot @ None, .. }) = self.stack.last_mut() {
					// Keys are taken verbatim.
					*slot = Some(text);
					return Ok(());
				}
				let value = scalar(text, style, tag.as_ref())?;
				self.complete(anchor, value)
			}
			Event::Alias(anchor) => {
				let value = self
					.anchors
					.get(&anchor)
					.cloned()
					.ok_or_else(|| format!("alias to unknown anchor {}", anchor))?;
				self.complete(0, value)
			}
			Event::SequenceStart(anchor, tag) => {
				self.open(tag.as_ref())?;
				self.stack.push(Frame::Sequence {
					anchor,
					items: Vec::new(),
				});
				Ok(())
			}
			Event::MappingStart(anchor, tag) => {
				self.open(tag.as_ref())?;
				self.stack.push(Frame::Mapping {
					anchor,
					fields: IndexMap::new(),
					key: None,
				});
				Ok(())
			}
			Event::SequenceEnd | Event::MappingEnd => {
				let (anchor, value) = match self.stack.pop() {
					Some(Frame::Sequence { anchor, items }) => (anchor, FieldValue::Sequence(items)),
					Some(Frame::Mapping { anchor, fields, .. }) => {
						(anchor, FieldValue::Mapping(fields))
					}
					None => return Err("unbalanced end of collection".to_string()),
				};
				self.complete(anchor, value)
			}
			_ => Ok(()),
		}
	}

	fn open(&self, tag: Option<&Tag>) -> Result<(), String> {
		if let Some(Frame::Mapping { key: None, .. }) = self.stack.last() {
			return Err("mapping keys must be scalars".to_string());
		}
		match tag {
			Some(tag) if is_reference_tag(tag) => Err(format!(
				"reference tag !{} must wrap a fixture key, not a collection",
				tag.suffix
			)),
			_ => Ok(()),
		}
	}

	fn complete(&mut self, anchor: usize, value: FieldValue) -> Result<(), String> {
		if anchor > 0 {
			self.anchors.insert(anchor, value.clone());
		}
		match self.stack.last_mut() {
			None => {
				if self.root.is_none() {
					self.root = Some(value);
				}
			}
			Some(Frame::Sequence { items, .. }) => items.push(value),
			Some(Frame::Mapping { fields, key, .. }) => match key.take() {
				Some(key) => {
					if fields.contains_key(&key) {
						return Err(format!("duplicate key '{}'", key));
					}
					fields.insert(key, value);
				}
				None => *key = Some(key_text(&value)?),
			},
		}
		Ok(())
	}

	fn finish(self) -> Result<FieldValue, LoadError> {
		match self.error {
			Some(message) => Err(LoadError::Shape(message)),
			None => Ok(self.root.unwrap_or(FieldValue::Null)),
		}
	}
}

fn is_reference_tag(tag: &Tag) -> bool {
	REFERENCE_TAGS.contains(&tag.suffix.as_str())
}

/// Classifies one scalar. Only plain scalars are resolved to numbers, booleans,
/// null or symbol-form reference tokens.
fn scalar(text: String, style: TScalarStyle, tag: Option<&Tag>) -> Result<FieldValue, String> {
	if let Some(tag) = tag {
		if is_reference_tag(tag) {
			if text.is_empty() {
				return Err(format!("reference tag !{} must wrap a fixture key", tag.suffix));
			}
			return Ok(FieldValue::Reference(text));
		}
		if tag.suffix == "str" {
			return Ok(FieldValue::Scalar(Bson::String(text)));
		}
	}
	if !matches!(style, TScalarStyle::Plain) {
		return Ok(FieldValue::Scalar(Bson::String(text)));
	}

	Ok(match Yaml::from_str(&text) {
		Yaml::Null => FieldValue::Null,
		Yaml::Boolean(flag) => FieldValue::Scalar(Bson::Boolean(flag)),
		Yaml::Integer(int) => FieldValue::Scalar(Bson::Int64(int)),
		real @ Yaml::Real(_) => match real.as_f64() {
			Some(float) => FieldValue::Scalar(Bson::Double(float)),
			None => FieldValue::Scalar(Bson::String(text)),
		},
		_ => match reference_token(&text) {
			Some(token) => FieldValue::Reference(token.to_string()),
			None => FieldValue::Scalar(Bson::String(text)),
		},
	})
}

/// Key text of an aliased key.
fn key_text(value: &FieldValue) -> Result<String, String> {
	match value {
		FieldValue::Scalar(Bson::String(text)) => Ok(text.clone()),
		FieldValue::Scalar(Bson::Int64(int)) => Ok(int.to_string()),
		FieldValue::Scalar(Bson::Double(float)) => Ok(float.to_string()),
		FieldValue::Scalar(Bson::Boolean(flag)) => Ok(flag.to_string()),
		FieldValue::Reference(token) => Ok(format!(":{}", token)),
		_ => Err("mapping keys must be scalars".to_string()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_quoted_symbol_stays_string() {
		let value = load("emoji: \":smile\"\nface: ':wink'\nplain: :smile\n").unwrap();
		let FieldValue::Mapping(fields) = value else {
			panic!("expected mapping, got {:?}", value);
		};
		assert_eq!(fields["emoji"], FieldValue::Scalar(Bson::String(":smile".into())));
		assert_eq!(fields["face"], FieldValue::Scalar(Bson::String(":wink".into())));
		assert_eq!(fields["plain"], FieldValue::Reference("smile".into()));
	}

	#[rstest]
	fn test_aliases_repeat_anchored_values() {
		let value = load("base: &base\n  city: Paris\ncopy: *base\n").unwrap();
		let FieldValue::Mapping(fields) = value else {
			panic!("expected mapping, got {:?}", value);
		};
		assert_eq!(fields["base"], fields["copy"]);
	}

	#[rstest]
	#[case("")]
	#[case("# only a comment\n")]
	fn test_empty_input_is_null(#[case] yaml: &str) {
		assert_eq!(load(yaml).unwrap(), FieldValue::Null);
	}

	#[rstest]
	#[case("a: 1\na: 2\n")]
	#[case("!ref {a: 1}\n")]
	fn test_shape_errors(#[case] yaml: &str) {
		assert!(matches!(load(yaml), Err(LoadError::Shape(_))));
	}

	#[rstest]
	fn test_syntax_error() {
		assert!(matches!(load("a: [b\n"), Err(LoadError::Syntax(_))));
	}
}
