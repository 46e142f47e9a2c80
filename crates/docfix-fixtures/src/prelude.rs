//! Convenience re-exports for common usage.
//!
//! ```
//! use docfix_fixtures::prelude::*;
//!
//! let settings = FixtureSettings::new("test/fixtures");
//! assert_eq!(settings.extensions, vec!["yml", "yaml"]);
//! ```

// Error types
pub use crate::error::{FixtureError, FixtureResult};

// Fixture types
pub use crate::fixtures::{FieldValue, FixtureEntry, FixtureParser, FixtureSet, FixtureStore};

// Resolution
pub use crate::class_resolver::ClassResolver;
pub use crate::inflection::{InflectorPluralizer, Pluralizer};
pub use crate::resolver::{FixtureInstances, FixtureResolver};

// Configuration
pub use crate::settings::FixtureSettings;
