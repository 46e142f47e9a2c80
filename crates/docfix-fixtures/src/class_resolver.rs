//! Related-model lookup for fixture fields.
//!
//! Given a field on a model, [`ClassResolver`] finds the model the field relates to.
//! Declared metadata wins: the relation's explicit target, then an explicit field
//! type registered on the owning schema. Otherwise the model is guessed from the
//! field name. A miss is never an error; it only means the field holds plain data.

use std::sync::Arc;

use docfix_odm::{ModelRegistry, ModelSchema};
use inflector::Inflector;

use crate::inflection::Pluralizer;

/// Finds the model a field relates to.
#[derive(Clone)]
pub struct ClassResolver {
	registry: Arc<ModelRegistry>,
	pluralizer: Arc<dyn Pluralizer>,
}

impl std::fmt::Debug for ClassResolver {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ClassResolver")
			.field("models", &self.registry.len())
			.finish_non_exhaustive()
	}
}

impl ClassResolver {
	/// Creates a resolver over `registry`.
	pub fn new(registry: Arc<ModelRegistry>, pluralizer: Arc<dyn Pluralizer>) -> Self {
		Self {
			registry,
			pluralizer,
		}
	}

	/// Returns the model related to `field` on `owner`.
	pub fn related_type(&self, owner: &ModelSchema, field: &str) -> Option<Arc<ModelSchema>> {
		let explicit = owner
			.relation_for(field)
			.and_then(|relation| relation.target_model())
			.or_else(|| owner.explicit_field_type(field));
		if let Some(model) = explicit {
			let found = self.registry.get(model).cloned();
			if found.is_none() {
				tracing::debug!(
					model = owner.name(),
					field,
					target = model,
					"declared related model is not registered"
				);
			}
			return found;
		}
		self.resolve_type(field)
	}

	/// Guesses a model from a field name.
	///
	/// Tries the singularized name (`comments` to `Comment`), the name as written,
	/// then the name with its last character stripped.
	///
	/// # Example
	///
	/// ```
	/// use std::sync::Arc;
	/// use docfix_fixtures::{ClassResolver, InflectorPluralizer};
	/// use docfix_odm::{ModelRegistry, ModelSchema};
	///
	/// let mut registry = ModelRegistry::new();
	/// registry.register(ModelSchema::new("LineItem")).unwrap();
	///
	/// let resolver = ClassResolver::new(Arc::new(registry), Arc::new(InflectorPluralizer::new()));
	/// assert_eq!(resolver.resolve_type("line_items").map(|m| m.name().to_string()), Some("LineItem".into()));
	/// assert!(resolver.resolve_type("title").is_none());
	/// ```
	pub fn resolve_type(&self, field_label: &str) -> Option<Arc<ModelSchema>> {
		let label = field_label.to_snake_case();
		if label.is_empty() {
			return None;
		}

		let exact = label.to_pascal_case();
		let mut stripped = exact.clone();
		stripped.pop();
		let candidates = [
			self.pluralizer.singularize(&label).to_pascal_case(),
			exact,
			stripped,
		];

		let found = candidates
			.iter()
			.filter(|candidate| !candidate.is_empty())
			.find_map(|candidate| self.registry.get(candidate).cloned());
		tracing::trace!(
			field = field_label,
			model = found.as_ref().map(|m| m.name()),
			"guessed related model"
		);
		found
	}
}
