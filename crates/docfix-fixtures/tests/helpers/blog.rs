//! Blog models and fixture directories shared by the integration tests.

use std::fs;
use std::sync::Arc;

use docfix_fixtures::{FixtureResolver, FixtureStore};
use docfix_odm::{InMemoryBackend, ModelRegistry, ModelSchema, RelationSpec, Value};
use tempfile::TempDir;

pub const USERS: &str = r#"
alice:
  name: Alice
  age: 30
bob:
  name: Bob
  age: 25
"#;

pub const POSTS: &str = r#"
p1:
  title: Hi
  author: :alice
  tags:
    - rust
    - yaml
  comments:
    - text: ok
    - text: second
p2:
  title: Draft
  author: ~
"#;

/// Installs a test subscriber honoring `RUST_LOG`. Safe to call from every test.
pub fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_test_writer()
		.try_init();
}

/// User, Post (referencing its author, embedding comments) and Comment.
pub fn blog_registry() -> ModelRegistry {
	let mut registry = ModelRegistry::new();
	registry.register(ModelSchema::new("User")).unwrap();
	registry
		.register(
			ModelSchema::new("Post")
				.relation(RelationSpec::belongs_to("author").target("User"))
				.relation(RelationSpec::embeds_many("comments"))
				.default_value("tags", Value::Array(vec![Value::from("general")])),
		)
		.unwrap();
	registry
		.register(ModelSchema::new("Comment").relation(RelationSpec::embedded_in("post")))
		.unwrap();
	registry
}

/// Writes `files` (base name, YAML) into a fresh directory as `.yml` files.
pub fn fixture_dir(files: &[(&str, &str)]) -> TempDir {
	let dir = TempDir::new().unwrap();
	for (name, yaml) in files {
		fs::write(dir.path().join(format!("{}.yml", name)), yaml).unwrap();
	}
	dir
}

/// Loads `dir` and builds a resolver over `registry` and `backend`.
pub fn resolver(
	dir: &TempDir,
	registry: ModelRegistry,
	backend: &Arc<InMemoryBackend>,
) -> FixtureResolver {
	init_tracing();
	let store = FixtureStore::load_all(dir.path()).unwrap();
	FixtureResolver::new(Arc::new(store), Arc::new(registry), backend.clone())
}
