//! Error types for fixture loading and resolution.
//!
//! Every error aborts the whole call it is raised from. Configuration errors come
//! from [`FixtureStore`](crate::FixtureStore) and [`FixtureSettings`](crate::FixtureSettings);
//! the remaining variants come from [`FixtureResolver`](crate::FixtureResolver) and
//! point at a fixture-authoring bug.

use std::path::PathBuf;

use docfix_odm::{OdmError, RelationKind};
use thiserror::Error;

/// Errors that can occur while loading or resolving fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
	/// The fixture directory does not exist or is not a directory.
	#[error("Fixture directory not found: {}", .0.display())]
	DirectoryNotFound(PathBuf),

	/// Reading the fixture directory or a fixture file failed.
	#[error("IO error on {}: {source}", path.display())]
	Io {
		/// Path being read.
		path: PathBuf,
		/// Underlying I/O error.
		#[source]
		source: std::io::Error,
	},

	/// A fixture file is not valid YAML.
	#[error("Failed to parse fixture file {}: {source}", path.display())]
	Parse {
		/// Fixture file path.
		path: PathBuf,
		/// Underlying YAML error.
		#[source]
		source: yaml_rust2::scanner::ScanError,
	},

	/// A fixture file is valid YAML but does not have the fixture shape.
	#[error("Invalid fixture file {}: {message}", path.display())]
	InvalidFixtureFile {
		/// Fixture file path.
		path: PathBuf,
		/// What is wrong with it.
		message: String,
	},

	/// Two fixture files map to the same fixture set.
	#[error("Duplicate fixture set '{name}' in {}", path.display())]
	DuplicateFixtureSet {
		/// Fixture set name.
		name: String,
		/// Second file providing the set.
		path: PathBuf,
	},

	/// Settings could not be read.
	#[error("Invalid fixture settings: {0}")]
	InvalidSettings(String),

	/// No fixture set was loaded for the requested model.
	#[error("No fixture set '{fixture_set}' loaded for model {model}")]
	FixtureSetNotFound {
		/// Requested model.
		model: String,
		/// Fixture set name derived from the model.
		fixture_set: String,
	},

	/// The requested model is not registered.
	#[error("Model not registered: {0}")]
	UnknownModel(String),

	/// A reference token names a key missing from the related fixture set.
	#[error("Fixture '{key}' not found in fixture set '{fixture_set}'")]
	UnknownFixtureKey {
		/// Related fixture set.
		fixture_set: String,
		/// Missing key.
		key: String,
	},

	/// A reference token was used on a field that declares no relation.
	#[error("{model}.{field} holds a reference but declares no relation")]
	InvalidReference {
		/// Owning model.
		model: String,
		/// Field holding the token.
		field: String,
	},

	/// A reference token or null names a field whose relation is not a referenced
	/// to-one relation.
	#[error("{model}.{field}: unsupported relation kind {kind}")]
	UnsupportedRelation {
		/// Owning model.
		model: String,
		/// Field holding the value.
		field: String,
		/// Declared relation kind.
		kind: RelationKind,
	},

	/// An embedded child model declares no back-reference to its parent model.
	#[error("{model}: unable to find parent class {parent}")]
	EmbeddingParentNotFound {
		/// Embedded child model.
		model: String,
		/// Embedding parent model.
		parent: String,
	},

	/// The related model of a referenced relation could not be determined.
	#[error("{model}.{field}: unable to resolve related model")]
	UnresolvedRelatedType {
		/// Owning model.
		model: String,
		/// Relation field.
		field: String,
	},

	/// Fixture sets reference each other in a cycle.
	#[error("Cyclic fixture reference: {}", chain.join(" -> "))]
	CyclicReference {
		/// Models on the resolution stack, ending with the repeated one.
		chain: Vec<String>,
	},

	/// Document layer failure.
	#[error(transparent)]
	Odm(#[from] OdmError),
}

/// Result type alias for fixture operations.
pub type FixtureResult<T> = Result<T, FixtureError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_fixture_set_not_found_error() {
		let error = FixtureError::FixtureSetNotFound {
			model: "Tag".to_string(),
			fixture_set: "tags".to_string(),
		};
		assert_eq!(
			error.to_string(),
			"No fixture set 'tags' loaded for model Tag"
		);
	}

	#[rstest]
	fn test_unsupported_relation_carries_kind() {
		let error = FixtureError::UnsupportedRelation {
			model: "User".to_string(),
			field: "posts".to_string(),
			kind: RelationKind::HasMany,
		};
		assert_eq!(
			error.to_string(),
			"User.posts: unsupported relation kind has_many"
		);
	}

	#[rstest]
	fn test_embedding_parent_not_found_error() {
		let error = FixtureError::EmbeddingParentNotFound {
			model: "Comment".to_string(),
			parent: "Post".to_string(),
		};
		assert!(error.to_string().contains("unable to find parent class"));
	}

	#[rstest]
	fn test_cyclic_reference_error() {
		let error = FixtureError::CyclicReference {
			chain: vec!["User".into(), "Post".into(), "User".into()],
		};
		assert_eq!(
			error.to_string(),
			"Cyclic fixture reference: User -> Post -> User"
		);
	}

	#[rstest]
	fn test_odm_error_from() {
		let error: FixtureError = OdmError::UnknownModel("Post".to_string()).into();
		assert!(matches!(error, FixtureError::Odm(_)));
		assert_eq!(error.to_string(), "Model not registered: Post");
	}
}
