//! Fixture resolution.
//!
//! [`FixtureResolver`] turns the fixture set of a model into persisted documents.
//! For every entry it builds a blank instance and assigns each field:
//!
//! - a reference token (`:alice`) or `null` on a `has_one`/`belongs_to` relation
//!   resolves the related model's fixture set and assigns the named instance;
//! - a mapping becomes an embedded child of the related model, linked back to its
//!   parent through the child's `embedded_in` relation;
//! - a sequence becomes an array appended to any default the field already holds.
//!   On a referenced relation its tokens become references; otherwise its mappings
//!   become embedded children and its tokens embed a copy of the named fixture;
//! - anything else, including a mapping or sequence whose related model is unknown,
//!   is assigned as plain data.
//!
//! The built document then goes through [`persist_or_reuse`], so resolving the same
//! fixtures twice yields the same stored documents.
//!
//! Related fixture sets are resolved on demand and cached for the duration of one
//! top-level call. Sets that reference each other in a cycle are rejected.

use std::collections::HashMap;
use std::sync::Arc;

use docfix_odm::{
	Document, DocumentBackend, DocumentRef, ModelRegistry, ModelSchema, RelationKind, Value,
};
use indexmap::IndexMap;

use crate::class_resolver::ClassResolver;
use crate::error::{FixtureError, FixtureResult};
use crate::fixtures::{FieldValue, FixtureEntry, FixtureStore};
use crate::inflection::{InflectorPluralizer, Pluralizer};
use crate::upsert::persist_or_reuse;

/// The resolved fixtures of one model, keyed by fixture key in file order.
#[derive(Debug, Clone)]
pub struct FixtureInstances {
	model: String,
	fixture_set: String,
	instances: IndexMap<String, Arc<Document>>,
}

impl FixtureInstances {
	/// Returns the model name.
	pub fn model(&self) -> &str {
		&self.model
	}

	/// Returns the fixture set the instances were built from.
	pub fn fixture_set(&self) -> &str {
		&self.fixture_set
	}

	/// Returns the instance built from fixture `key`.
	pub fn get(&self, key: &str) -> Option<&Arc<Document>> {
		self.instances.get(key)
	}

	/// Iterates over fixture keys in file order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.instances.keys().map(String::as_str)
	}

	/// Iterates over `(key, instance)` pairs in file order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Document>)> {
		self.instances
			.iter()
			.map(|(key, instance)| (key.as_str(), instance))
	}

	/// Returns the number of instances.
	pub fn len(&self) -> usize {
		self.instances.len()
	}

	/// Returns true if the fixture set had no entries.
	pub fn is_empty(&self) -> bool {
		self.instances.is_empty()
	}
}

impl std::ops::Index<&str> for FixtureInstances {
	type Output = Arc<Document>;

	fn index(&self, key: &str) -> &Self::Output {
		&self.instances[key]
	}
}

impl IntoIterator for FixtureInstances {
	type Item = (String, Arc<Document>);
	type IntoIter = indexmap::map::IntoIter<String, Arc<Document>>;

	fn into_iter(self) -> Self::IntoIter {
		self.instances.into_iter()
	}
}

/// Resolves fixture sets into persisted documents.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use docfix_fixtures::{FixtureParser, FixtureResolver, FixtureStore};
/// use docfix_odm::{InMemoryBackend, ModelRegistry, ModelSchema, RelationSpec};
///
/// let parser = FixtureParser::new();
/// let store = FixtureStore::from_sets([
///     parser.parse_str("users", "alice:\n  name: Alice\n").unwrap(),
///     parser.parse_str("posts", "p1:\n  title: Hi\n  author: :alice\n").unwrap(),
/// ])
/// .unwrap();
///
/// let mut registry = ModelRegistry::new();
/// registry.register(ModelSchema::new("User")).unwrap();
/// registry
///     .register(ModelSchema::new("Post").relation(RelationSpec::belongs_to("author").target("User")))
///     .unwrap();
///
/// let resolver = FixtureResolver::new(
///     Arc::new(store),
///     Arc::new(registry),
///     Arc::new(InMemoryBackend::new()),
/// );
/// let posts = resolver.resolve("Post").unwrap();
/// let author = posts["p1"].reference("author").unwrap();
/// assert_eq!(author.get_bson("name").and_then(|v| v.as_str()), Some("Alice"));
/// ```
#[derive(Clone)]
pub struct FixtureResolver {
	store: Arc<FixtureStore>,
	registry: Arc<ModelRegistry>,
	backend: Arc<dyn DocumentBackend>,
	pluralizer: Arc<dyn Pluralizer>,
	classes: ClassResolver,
}

impl std::fmt::Debug for FixtureResolver {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FixtureResolver")
			.field("fixture_sets", &self.store.len())
			.field("models", &self.registry.len())
			.finish_non_exhaustive()
	}
}

impl FixtureResolver {
	/// Creates a resolver using the default [`InflectorPluralizer`].
	pub fn new(
		store: Arc<FixtureStore>,
		registry: Arc<ModelRegistry>,
		backend: Arc<dyn DocumentBackend>,
	) -> Self {
		let pluralizer: Arc<dyn Pluralizer> = Arc::new(InflectorPluralizer::new());
		let classes = ClassResolver::new(Arc::clone(&registry), Arc::clone(&pluralizer));
		Self {
			store,
			registry,
			backend,
			pluralizer,
			classes,
		}
	}

	/// Replaces the pluralizer used for fixture set names and related-model guessing.
	pub fn with_pluralizer(mut self, pluralizer: Arc<dyn Pluralizer>) -> Self {
		self.classes = ClassResolver::new(Arc::clone(&self.registry), Arc::clone(&pluralizer));
		self.pluralizer = pluralizer;
		self
	}

	/// Returns the fixture set name for `model`: its pluralized lowercase name.
	pub fn fixture_set_name(&self, model: &str) -> String {
		self.pluralizer.pluralize(&model.to_lowercase())
	}

	/// Returns the related-model lookup this resolver uses.
	pub fn class_resolver(&self) -> &ClassResolver {
		&self.classes
	}

	/// Resolves every fixture of `model`, persisting or reusing each document.
	///
	/// # Errors
	///
	/// Any failure aborts the whole call. Documents persisted before the failure
	/// stay in the store.
	pub fn resolve(&self, model: &str) -> FixtureResult<FixtureInstances> {
		let mut pass = ResolutionPass::new(self);
		let instances = pass.resolve(model)?;
		Ok(unwrap_instances(instances))
	}

	/// Resolves every registered model that has a loaded fixture set, in
	/// registration order, sharing one resolution pass.
	pub fn resolve_all(&self) -> FixtureResult<IndexMap<String, FixtureInstances>> {
		let mut pass = ResolutionPass::new(self);
		let mut resolved = Vec::new();
		for schema in self.registry.iter() {
			if !self.store.contains(&self.fixture_set_name(schema.name())) {
				tracing::debug!(model = schema.name(), "no fixture set, skipping");
				continue;
			}
			resolved.push((schema.name().to_string(), pass.resolve(schema.name())?));
		}
		drop(pass);

		Ok(resolved
			.into_iter()
			.map(|(model, instances)| (model, unwrap_instances(instances)))
			.collect())
	}
}

fn unwrap_instances(instances: Arc<FixtureInstances>) -> FixtureInstances {
	Arc::try_unwrap(instances).unwrap_or_else(|shared| (*shared).clone())
}

/// State of one top-level resolution: the instances resolved so far, by model,
/// and the models currently being resolved.
struct ResolutionPass<'a> {
	resolver: &'a FixtureResolver,
	resolved: HashMap<String, Arc<FixtureInstances>>,
	stack: Vec<String>,
}

impl<'a> ResolutionPass<'a> {
	fn new(resolver: &'a FixtureResolver) -> Self {
		Self {
			resolver,
			resolved: HashMap::new(),
			stack: Vec::new(),
		}
	}

	fn resolve(&mut self, model: &str) -> FixtureResult<Arc<FixtureInstances>> {
		if let Some(instances) = self.resolved.get(model) {
			return Ok(Arc::clone(instances));
		}
		if self.stack.iter().any(|pending| pending == model) {
			let mut chain = self.stack.clone();
			chain.push(model.to_string());
			return Err(FixtureError::CyclicReference { chain });
		}

		let schema = self
			.resolver
			.registry
			.get(model)
			.cloned()
			.ok_or_else(|| FixtureError::UnknownModel(model.to_string()))?;
		let fixture_set = self.resolver.fixture_set_name(model);
		let store = Arc::clone(&self.resolver.store);
		let set = store
			.get(&fixture_set)
			.ok_or_else(|| FixtureError::FixtureSetNotFound {
				model: model.to_string(),
				fixture_set: fixture_set.clone(),
			})?;

		self.stack.push(model.to_string());
		let mut instances = IndexMap::with_capacity(set.len());
		for (key, entry) in set.iter() {
			let document = self.build(&schema, entry)?;
			let document = persist_or_reuse(self.resolver.backend.as_ref(), &schema, document)?;
			tracing::debug!(model, key, id = %document.id(), "resolved fixture");
			instances.insert(key.to_string(), Arc::new(document));
		}
		self.stack.pop();

		tracing::info!(
			model,
			fixture_set = %fixture_set,
			instances = instances.len(),
			"resolved fixture set"
		);
		let instances = Arc::new(FixtureInstances {
			model: model.to_string(),
			fixture_set,
			instances,
		});
		self.resolved
			.insert(model.to_string(), Arc::clone(&instances));
		Ok(instances)
	}

	fn build(&mut self, schema: &ModelSchema, entry: &FixtureEntry) -> FixtureResult<Document> {
		let mut document = schema.new_instance();
		for (field, value) in entry.fields() {
			let related = self.resolver.classes.related_type(schema, field);
			match value {
				FieldValue::Reference(_) | FieldValue::Null => {
					let target = self.reference(schema, field, value, related.as_deref())?;
					document.set(field, Value::Reference(target));
				}
				FieldValue::Sequence(items) => {
					let referenced = schema
						.relation_for(field)
						.is_some_and(|relation| relation.kind().is_referenced());
					let mut values = match document.get(field).cloned() {
						Some(Value::Array(values)) => values,
						_ => Vec::new(),
					};
					for item in items {
						let value = if referenced {
							self.referenced_element(schema, field, item, related.as_deref())?
						} else {
							self.element(schema, &document, field, item, related.as_deref())?
						};
						values.push(value);
					}
					document.set(field, Value::Array(values));
				}
				FieldValue::Mapping(fields) => {
					let referenced = schema
						.relation_for(field)
						.is_some_and(|relation| relation.kind().is_referenced());
					let value = match related.as_deref() {
						Some(child) if !referenced => {
							let mut embedded = child.new_instance();
							for (name, value) in fields {
								embedded.set(name.clone(), Value::from(value.to_plain_bson()));
							}
							self.link_parent(child, schema, &mut embedded, document.to_ref())?;
							Value::from(embedded)
						}
						_ => Value::from(value.to_plain_bson()),
					};
					document.set(field, value);
				}
				FieldValue::Scalar(scalar) => document.set(field, Value::Bson(scalar.clone())),
			}
		}
		Ok(document)
	}

	/// Resolves a reference token or null on a referenced to-one relation.
	fn reference(
		&mut self,
		schema: &ModelSchema,
		field: &str,
		value: &FieldValue,
		related: Option<&ModelSchema>,
	) -> FixtureResult<Option<Arc<Document>>> {
		let relation = schema
			.relation_for(field)
			.ok_or_else(|| FixtureError::InvalidReference {
				model: schema.name().to_string(),
				field: field.to_string(),
			})?;
		if !relation.kind().is_referenced_to_one() {
			return Err(unsupported(schema, field, relation.kind()));
		}
		let FieldValue::Reference(token) = value else {
			return Ok(None);
		};
		let related = related.ok_or_else(|| FixtureError::UnresolvedRelatedType {
			model: schema.name().to_string(),
			field: field.to_string(),
		})?;

		let instances = self.resolve(related.name())?;
		let target = instance_at(&instances, token)?;
		tracing::debug!(model = schema.name(), field, key = %token, "assigned reference");
		Ok(Some(Arc::clone(target)))
	}

	/// Builds one element of a sequence field.
	fn element(
		&mut self,
		schema: &ModelSchema,
		parent: &Document,
		field: &str,
		item: &FieldValue,
		related: Option<&ModelSchema>,
	) -> FixtureResult<Value> {
		let Some(child) = related else {
			return Ok(Value::from(item.to_plain_bson()));
		};

		let mut embedded = match item {
			FieldValue::Mapping(fields) => {
				let mut embedded = child.new_instance();
				for (name, value) in fields {
					embedded.set(name.clone(), Value::from(value.to_plain_bson()));
				}
				embedded
			}
			FieldValue::Reference(token) => {
				// Embeds a copy of another fixture of the child model.
				let instances = self.resolve(child.name())?;
				let embedded = instance_at(&instances, token)?.duplicate();
				tracing::debug!(model = schema.name(), field, key = %token, "embedded fixture copy");
				embedded
			}
			other => return Ok(Value::from(other.to_plain_bson())),
		};
		self.link_parent(child, schema, &mut embedded, parent.to_ref())?;
		Ok(Value::from(embedded))
	}

	/// Builds one element of a sequence on a referenced relation: a token becomes a
	/// reference to the named fixture, anything else stays plain data.
	fn referenced_element(
		&mut self,
		schema: &ModelSchema,
		field: &str,
		item: &FieldValue,
		related: Option<&ModelSchema>,
	) -> FixtureResult<Value> {
		let FieldValue::Reference(token) = item else {
			return Ok(Value::from(item.to_plain_bson()));
		};
		let related = related.ok_or_else(|| FixtureError::UnresolvedRelatedType {
			model: schema.name().to_string(),
			field: field.to_string(),
		})?;

		let instances = self.resolve(related.name())?;
		let target = instance_at(&instances, token)?;
		tracing::debug!(model = schema.name(), field, key = %token, "appended reference");
		Ok(Value::Reference(Some(Arc::clone(target))))
	}

	/// Points the child's `embedded_in` field at its parent.
	fn link_parent(
		&self,
		child: &ModelSchema,
		parent: &ModelSchema,
		embedded: &mut Document,
		parent_ref: DocumentRef,
	) -> FixtureResult<()> {
		let candidates: Vec<_> = child.embedding_parents().collect();
		let relation = match candidates.as_slice() {
			[only] => Some(*only),
			many => many.iter().copied().find(|relation| {
				let target = match relation.target_model() {
					Some(target) => Some(target.to_string()),
					None => self
						.resolver
						.classes
						.resolve_type(relation.field())
						.map(|model| model.name().to_string()),
				};
				target.as_deref() == Some(parent.name())
			}),
		};
		let relation = relation.ok_or_else(|| FixtureError::EmbeddingParentNotFound {
			model: child.name().to_string(),
			parent: parent.name().to_string(),
		})?;
		embedded.set(relation.field(), Value::Parent(parent_ref));
		Ok(())
	}
}

fn instance_at<'i>(instances: &'i FixtureInstances, key: &str) -> FixtureResult<&'i Arc<Document>> {
	instances
		.get(key)
		.ok_or_else(|| FixtureError::UnknownFixtureKey {
			fixture_set: instances.fixture_set().to_string(),
			key: key.to_string(),
		})
}

fn unsupported(schema: &ModelSchema, field: &str, kind: RelationKind) -> FixtureError {
	FixtureError::UnsupportedRelation {
		model: schema.name().to_string(),
		field: field.to_string(),
		kind,
	}
}
