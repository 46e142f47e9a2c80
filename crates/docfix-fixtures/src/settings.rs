//! Fixture loading settings.
//!
//! Settings are constructed explicitly by the test harness and handed to
//! [`FixtureStore::load`](crate::FixtureStore::load). They can come from code, from
//! a TOML `[fixtures]` table, and from environment overrides.
//!
//! ```toml
//! [fixtures]
//! fixture_dir = "tests/data/fixtures"
//! extensions = ["yml"]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{FixtureError, FixtureResult};

/// Environment variable overriding the fixture directory.
pub const FIXTURE_DIR_ENV: &str = "DOCFIX_FIXTURE_DIR";

/// Default fixture directory, relative to the working directory.
pub const DEFAULT_FIXTURE_DIR: &str = "test/fixtures";

/// Where fixture files live and which files count as fixtures.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FixtureSettings {
	/// Directory scanned (non-recursively) for fixture files.
	pub fixture_dir: PathBuf,
	/// File extensions, without the dot, that mark a fixture file.
	pub extensions: Vec<String>,
}

impl Default for FixtureSettings {
	fn default() -> Self {
		Self {
			fixture_dir: PathBuf::from(DEFAULT_FIXTURE_DIR),
			extensions: vec!["yml".to_string(), "yaml".to_string()],
		}
	}
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
	#[serde(default)]
	fixtures: FixtureSettings,
}

impl FixtureSettings {
	/// Creates settings for `fixture_dir` with the default extensions.
	pub fn new(fixture_dir: impl Into<PathBuf>) -> Self {
		Self {
			fixture_dir: fixture_dir.into(),
			..Self::default()
		}
	}

	/// Reads settings from the `[fixtures]` table of a TOML document.
	///
	/// A missing table or missing keys fall back to the defaults.
	///
	/// # Errors
	///
	/// Returns [`FixtureError::InvalidSettings`] if the text is not valid TOML or the
	/// table has the wrong shape.
	///
	/// # Example
	///
	/// ```
	/// use docfix_fixtures::FixtureSettings;
	///
	/// let settings = FixtureSettings::from_toml_str(
	///     r#"
	///     [fixtures]
	///     fixture_dir = "tests/fixtures"
	///     "#,
	/// )
	/// .unwrap();
	/// assert_eq!(settings.fixture_dir.to_str(), Some("tests/fixtures"));
	/// assert_eq!(settings.extensions, vec!["yml", "yaml"]);
	/// ```
	pub fn from_toml_str(text: &str) -> FixtureResult<Self> {
		let file: SettingsFile =
			toml::from_str(text).map_err(|e| FixtureError::InvalidSettings(e.to_string()))?;
		file.fixtures.validated()
	}

	/// Replaces the accepted file extensions.
	pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.extensions = extensions.into_iter().map(Into::into).collect();
		self
	}

	/// Applies overrides from the process environment.
	pub fn with_env_overrides(self) -> Self {
		self.with_overrides_from(|key| std::env::var(key).ok())
	}

	/// Applies overrides read through `lookup`, which maps a variable name to its value.
	pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(dir) = lookup(FIXTURE_DIR_ENV).filter(|dir| !dir.trim().is_empty()) {
			tracing::debug!(fixture_dir = %dir, "fixture directory overridden from environment");
			self.fixture_dir = PathBuf::from(dir);
		}
		self
	}

	/// Returns true if `path` has one of the accepted extensions.
	pub fn is_fixture_file(&self, path: &Path) -> bool {
		path.extension()
			.and_then(|ext| ext.to_str())
			.is_some_and(|ext| {
				self.extensions
					.iter()
					.any(|accepted| accepted.eq_ignore_ascii_case(ext))
			})
	}

	fn validated(self) -> FixtureResult<Self> {
		if self.extensions.is_empty() {
			return Err(FixtureError::InvalidSettings(
				"at least one fixture extension is required".to_string(),
			));
		}
		Ok(self)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_defaults() {
		let settings = FixtureSettings::default();
		assert_eq!(settings.fixture_dir, PathBuf::from("test/fixtures"));
		assert_eq!(settings.extensions, vec!["yml", "yaml"]);
	}

	#[rstest]
	fn test_from_toml_str() {
		let settings = FixtureSettings::from_toml_str(
			r#"
			[fixtures]
			fixture_dir = "data"
			extensions = ["fixture"]
			"#,
		)
		.unwrap();

		assert_eq!(settings, FixtureSettings::new("data").with_extensions(["fixture"]));
	}

	#[rstest]
	fn test_from_toml_str_without_table() {
		let settings = FixtureSettings::from_toml_str("[database]\nurl = \"x\"\n").unwrap();
		assert_eq!(settings, FixtureSettings::default());
	}

	#[rstest]
	#[case("[fixtures]\nfixture_dir = 3\n")]
	#[case("[fixtures]\nextensions = []\n")]
	#[case("not toml at all [")]
	fn test_from_toml_str_invalid(#[case] text: &str) {
		let result = FixtureSettings::from_toml_str(text);
		assert!(matches!(result, Err(FixtureError::InvalidSettings(_))));
	}

	#[rstest]
	fn test_overrides() {
		let settings = FixtureSettings::default().with_overrides_from(|key| {
			(key == FIXTURE_DIR_ENV).then(|| "/tmp/fixtures".to_string())
		});
		assert_eq!(settings.fixture_dir, PathBuf::from("/tmp/fixtures"));

		let untouched = FixtureSettings::new("data").with_overrides_from(|_| Some(" ".to_string()));
		assert_eq!(untouched.fixture_dir, PathBuf::from("data"));
	}

	#[rstest]
	#[case("users.yml", true)]
	#[case("users.YAML", true)]
	#[case("users.json", false)]
	#[case("README", false)]
	fn test_is_fixture_file(#[case] name: &str, #[case] expected: bool) {
		let settings = FixtureSettings::default();
		assert_eq!(settings.is_fixture_file(Path::new(name)), expected);
	}
}
