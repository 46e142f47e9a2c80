//! # docfix
//!
//! YAML fixture loading for document databases.
//!
//! docfix reads hand-written YAML fixtures, resolves references between them and
//! embedded sub-documents, and writes the result to a document store. Documents that
//! already exist with the same attributes are reused, so repeated test runs against
//! a persistent store converge on the same state.
//!
//! ## Crates
//!
//! - [`odm`] - documents, model schemas with relation metadata, the model registry
//!   and document-store backends
//! - [`fixtures`] - fixture settings, the fixture store and the resolver
//!   (`fixtures` feature, enabled by default)
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use docfix::prelude::*;
//!
//! let parser = FixtureParser::new();
//! let store = FixtureStore::from_sets([
//!     parser.parse_str("users", "alice:\n  name: Alice\n  age: 30\n").unwrap(),
//!     parser
//!         .parse_str("posts", "p1:\n  title: Hi\n  author: :alice\n  comments:\n    - text: ok\n")
//!         .unwrap(),
//! ])
//! .unwrap();
//!
//! let mut registry = ModelRegistry::new();
//! registry.register(ModelSchema::new("User")).unwrap();
//! registry
//!     .register(
//!         ModelSchema::new("Post")
//!             .relation(RelationSpec::belongs_to("author").target("User"))
//!             .relation(RelationSpec::embeds_many("comments")),
//!     )
//!     .unwrap();
//! registry
//!     .register(ModelSchema::new("Comment").relation(RelationSpec::embedded_in("post")))
//!     .unwrap();
//!
//! let backend = Arc::new(InMemoryBackend::new());
//! let resolver = FixtureResolver::new(Arc::new(store), Arc::new(registry), backend.clone());
//!
//! let posts = resolver.resolve("Post").unwrap();
//! let post = &posts["p1"];
//! let comments = post.embedded_many("comments");
//! assert_eq!(comments[0].parent("post"), Some(&post.to_ref()));
//!
//! let users = resolver.resolve("User").unwrap();
//! assert_eq!(post.reference("author").map(|a| a.id()), Some(users["alice"].id()));
//! assert_eq!(backend.count("users").unwrap(), 1);
//! ```

pub use docfix_odm as odm;

#[cfg(feature = "fixtures")]
pub use docfix_fixtures as fixtures;

/// Convenience re-exports for common usage.
pub mod prelude {
	pub use docfix_odm::{
		Document, DocumentBackend, DocumentRef, InMemoryBackend, ModelRegistry, ModelSchema,
		OdmError, OdmResult, RelationKind, RelationSpec, Value,
	};

	#[cfg(feature = "fixtures")]
	pub use docfix_fixtures::prelude::*;
}
