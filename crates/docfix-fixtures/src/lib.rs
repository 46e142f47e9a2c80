//! YAML fixture loading for document databases.
//!
//! This crate loads hand-written YAML fixtures into a document store for tests:
//!
//! - **Fixture store**: [`FixtureStore`] reads every fixture file of a directory once
//! - **Resolution**: [`FixtureResolver`] builds the documents of a model's fixture
//!   set, wiring references between fixtures and embedded documents
//! - **Deduplication**: documents whose attributes already exist in the store are
//!   reused, so repeated runs converge on the same stored state
//!
//! # Quick Start
//!
//! Create `test/fixtures/users.yml`:
//!
//! ```yaml
//! alice:
//!   name: Alice
//!   age: 30
//! ```
//!
//! and `test/fixtures/posts.yml`:
//!
//! ```yaml
//! p1:
//!   title: Hi
//!   author: :alice
//!   comments:
//!     - text: ok
//! ```
//!
//! Then resolve them:
//!
//! ```no_run
//! use std::sync::Arc;
//! use docfix_fixtures::prelude::*;
//! use docfix_odm::{InMemoryBackend, ModelRegistry, ModelSchema, RelationSpec};
//!
//! # fn main() -> FixtureResult<()> {
//! let mut registry = ModelRegistry::new();
//! registry.register(ModelSchema::new("User"))?;
//! registry.register(
//!     ModelSchema::new("Post")
//!         .relation(RelationSpec::belongs_to("author").target("User"))
//!         .relation(RelationSpec::embeds_many("comments")),
//! )?;
//! registry.register(ModelSchema::new("Comment").relation(RelationSpec::embedded_in("post")))?;
//!
//! let settings = FixtureSettings::default().with_env_overrides();
//! let store = FixtureStore::load(&settings)?;
//! let resolver = FixtureResolver::new(
//!     Arc::new(store),
//!     Arc::new(registry),
//!     Arc::new(InMemoryBackend::new()),
//! );
//!
//! let posts = resolver.resolve("Post")?;
//! println!("{:?}", posts["p1"].reference("author"));
//! # Ok(())
//! # }
//! ```

pub mod class_resolver;
pub mod error;
pub mod fixtures;
pub mod inflection;
pub mod prelude;
pub mod resolver;
pub mod settings;
pub mod upsert;

pub use class_resolver::ClassResolver;
pub use error::{FixtureError, FixtureResult};
pub use fixtures::{FieldValue, FixtureEntry, FixtureParser, FixtureSet, FixtureStore};
pub use inflection::{InflectorPluralizer, Pluralizer};
pub use resolver::{FixtureInstances, FixtureResolver};
pub use settings::FixtureSettings;
pub use upsert::{comparison_key, persist_or_reuse};
