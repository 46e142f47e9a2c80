//! Model registry.
//!
//! The registry maps model names to their [`ModelSchema`]. It is built once by the
//! test harness and then shared read-only, typically behind an `Arc`.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{OdmError, OdmResult};
use crate::schema::ModelSchema;

/// Registry of the models a harness knows about.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
	models: IndexMap<String, Arc<ModelSchema>>,
}

impl ModelRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a model schema.
	///
	/// # Errors
	///
	/// Returns [`OdmError::DuplicateModel`] if a model with the same name exists.
	///
	/// # Example
	///
	/// ```
	/// use docfix_odm::{ModelRegistry, ModelSchema};
	///
	/// let mut registry = ModelRegistry::new();
	/// registry.register(ModelSchema::new("User")).unwrap();
	/// assert!(registry.contains("User"));
	/// assert!(registry.register(ModelSchema::new("User")).is_err());
	/// ```
	pub fn register(&mut self, schema: ModelSchema) -> OdmResult<()> {
		if self.models.contains_key(schema.name()) {
			return Err(OdmError::DuplicateModel(schema.name().to_string()));
		}
		tracing::debug!(
			model = schema.name(),
			collection = schema.collection(),
			"registered model"
		);
		self.models
			.insert(schema.name().to_string(), Arc::new(schema));
		Ok(())
	}

	/// Registers a model schema, builder style.
	pub fn with(mut self, schema: ModelSchema) -> OdmResult<Self> {
		self.register(schema)?;
		Ok(self)
	}

	/// Gets the schema registered under `name`.
	pub fn get(&self, name: &str) -> Option<&Arc<ModelSchema>> {
		self.models.get(name)
	}

	/// Gets the schema registered under `name`, failing when it is unknown.
	pub fn require(&self, name: &str) -> OdmResult<&Arc<ModelSchema>> {
		self.get(name)
			.ok_or_else(|| OdmError::UnknownModel(name.to_string()))
	}

	/// Checks if a model is registered under `name`.
	pub fn contains(&self, name: &str) -> bool {
		self.models.contains_key(name)
	}

	/// Returns the registered model names in registration order.
	pub fn model_names(&self) -> impl Iterator<Item = &str> {
		self.models.keys().map(String::as_str)
	}

	/// Iterates over the registered schemas in registration order.
	pub fn iter(&self) -> impl Iterator<Item = &Arc<ModelSchema>> {
		self.models.values()
	}

	/// Returns the number of registered models.
	pub fn len(&self) -> usize {
		self.models.len()
	}

	/// Returns true if no models are registered.
	pub fn is_empty(&self) -> bool {
		self.models.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_register_and_get() {
		let mut registry = ModelRegistry::new();
		assert!(registry.is_empty());

		registry.register(ModelSchema::new("User")).unwrap();
		registry.register(ModelSchema::new("Post")).unwrap();

		assert_eq!(registry.len(), 2);
		assert_eq!(registry.get("User").unwrap().name(), "User");
		assert!(registry.get("Comment").is_none());
		let names: Vec<_> = registry.model_names().collect();
		assert_eq!(names, vec!["User", "Post"]);
	}

	#[rstest]
	fn test_register_duplicate() {
		let mut registry = ModelRegistry::new();
		registry.register(ModelSchema::new("User")).unwrap();

		let result = registry.register(ModelSchema::new("User"));
		assert!(matches!(result, Err(OdmError::DuplicateModel(name)) if name == "User"));
	}

	#[rstest]
	fn test_require_unknown_model() {
		let registry = ModelRegistry::new()
			.with(ModelSchema::new("User"))
			.unwrap();

		assert!(registry.require("User").is_ok());
		assert!(matches!(
			registry.require("Post"),
			Err(OdmError::UnknownModel(_))
		));
	}
}
