//! Pluralization.
//!
//! Fixture set names are pluralized model names and relation fields are often plural
//! (`comments`), so the resolver needs both directions. [`Pluralizer`] is the seam;
//! [`InflectorPluralizer`] is the default, built on the `Inflector` crate with a table
//! of irregular plurals checked first.

use inflector::Inflector;

/// Irregular plurals `Inflector` gets wrong or that commonly name models.
static IRREGULAR_PLURALS: &[(&str, &str)] = &[
	("person", "people"),
	("child", "children"),
	("man", "men"),
	("woman", "women"),
	("mouse", "mice"),
	("goose", "geese"),
	("leaf", "leaves"),
	("life", "lives"),
	("wife", "wives"),
	("knife", "knives"),
	("half", "halves"),
	("hero", "heroes"),
	("potato", "potatoes"),
	("analysis", "analyses"),
	("basis", "bases"),
	("crisis", "crises"),
	("criterion", "criteria"),
	("datum", "data"),
	("medium", "media"),
	("index", "indices"),
	("matrix", "matrices"),
	("vertex", "vertices"),
];

/// Converts words between singular and plural form.
pub trait Pluralizer: Send + Sync {
	/// Returns the plural form of `word`.
	fn pluralize(&self, word: &str) -> String;

	/// Returns the singular form of `word`.
	fn singularize(&self, word: &str) -> String;
}

/// [`Pluralizer`] backed by the `Inflector` crate.
///
/// Irregular forms are matched on the last `_`-separated segment, so `line_items`
/// and `sales_people` both inflect their final word.
///
/// # Example
///
/// ```
/// use docfix_fixtures::{InflectorPluralizer, Pluralizer};
///
/// let pluralizer = InflectorPluralizer::new().with_irregular("cactus", "cacti");
/// assert_eq!(pluralizer.pluralize("user"), "users");
/// assert_eq!(pluralizer.singularize("people"), "person");
/// assert_eq!(pluralizer.singularize("cacti"), "cactus");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InflectorPluralizer {
	extra: Vec<(String, String)>,
}

impl InflectorPluralizer {
	/// Creates a pluralizer with the built-in irregulars.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds an irregular pair, checked before the built-in ones.
	pub fn with_irregular(mut self, singular: impl Into<String>, plural: impl Into<String>) -> Self {
		self.extra
			.push((singular.into().to_lowercase(), plural.into().to_lowercase()));
		self
	}

	fn irregulars(&self) -> impl Iterator<Item = (&str, &str)> {
		self.extra
			.iter()
			.map(|(singular, plural)| (singular.as_str(), plural.as_str()))
			.chain(IRREGULAR_PLURALS.iter().map(|(singular, plural)| (*singular, *plural)))
	}

	/// Looks up the last segment of `word` in the irregular table.
	///
	/// `pick` receives `(singular, plural)` and returns the form to produce, or `None`
	/// when the segment does not match the pair.
	fn irregular<F>(&self, word: &str, pick: F) -> Option<String>
	where
		F: Fn(&str, &str, &str) -> Option<String>,
	{
		let (prefix, last) = match word.rfind('_') {
			Some(idx) => word.split_at(idx + 1),
			None => ("", word),
		};
		let last = last.to_lowercase();
		self.irregulars()
			.find_map(|(singular, plural)| pick(last.as_str(), singular, plural))
			.map(|form| format!("{}{}", prefix, form))
	}
}

impl Pluralizer for InflectorPluralizer {
	fn pluralize(&self, word: &str) -> String {
		if word.is_empty() {
			return String::new();
		}
		self.irregular(word, |last, singular, plural| {
			(last == singular || last == plural).then(|| plural.to_string())
		})
		.unwrap_or_else(|| word.to_plural())
	}

	fn singularize(&self, word: &str) -> String {
		if word.is_empty() {
			return String::new();
		}
		self.irregular(word, |last, singular, plural| {
			(last == plural || last == singular).then(|| singular.to_string())
		})
		.unwrap_or_else(|| word.to_singular())
	}
}
