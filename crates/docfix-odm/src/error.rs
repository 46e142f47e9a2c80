//! Error types for the document layer.

use thiserror::Error;

/// Errors raised by model registration, document conversion and backends.
#[derive(Debug, Error)]
pub enum OdmError {
	/// Model was not found in the registry.
	#[error("Model not registered: {0}")]
	UnknownModel(String),

	/// A model with the same name was already registered.
	#[error("Model already registered: {0}")]
	DuplicateModel(String),

	/// A document with the same identity already exists in the collection.
	#[error("Duplicate key in collection '{collection}': {id}")]
	DuplicateKey {
		/// Collection the insert targeted.
		collection: String,
		/// Conflicting identity, as hex.
		id: String,
	},

	/// A stored document could not be converted back into a model instance.
	#[error("Serialization error: {0}")]
	Serialization(String),

	/// Backend-specific failure.
	#[error("Backend error: {0}")]
	Backend(String),
}

/// Result type alias for document operations.
pub type OdmResult<T> = Result<T, OdmError>;
