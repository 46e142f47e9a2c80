//! Fixture store.
//!
//! [`FixtureStore`] holds every fixture set loaded from the fixture directory. It is
//! built once by the test harness and shared read-only (typically as
//! `Arc<FixtureStore>`) across resolutions.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::parser::FixtureParser;
use super::set::FixtureSet;
use crate::error::{FixtureError, FixtureResult};
use crate::settings::FixtureSettings;

/// In-memory cache of fixture sets, keyed by set name.
#[derive(Debug, Clone, Default)]
pub struct FixtureStore {
	directory: Option<PathBuf>,
	settings: FixtureSettings,
	sets: BTreeMap<String, FixtureSet>,
}

impl FixtureStore {
	/// Loads the fixture directory named by `settings`.
	///
	/// # Errors
	///
	/// Fails if the directory is missing, a fixture file cannot be read or parsed, or
	/// two files provide the same fixture set.
	pub fn load(settings: &FixtureSettings) -> FixtureResult<Self> {
		let mut store = Self {
			directory: Some(settings.fixture_dir.clone()),
			settings: settings.clone(),
			sets: BTreeMap::new(),
		};
		store.reload()?;
		Ok(store)
	}

	/// Loads every `.yml`/`.yaml` file in `directory`.
	///
	/// # Example
	///
	/// ```no_run
	/// use docfix_fixtures::FixtureStore;
	///
	/// let store = FixtureStore::load_all("test/fixtures").unwrap();
	/// println!("loaded {} fixture sets", store.len());
	/// ```
	pub fn load_all(directory: impl Into<PathBuf>) -> FixtureResult<Self> {
		Self::load(&FixtureSettings::new(directory))
	}

	/// Builds a store from sets already in memory.
	///
	/// # Errors
	///
	/// Returns [`FixtureError::DuplicateFixtureSet`] if two sets share a name.
	pub fn from_sets(sets: impl IntoIterator<Item = FixtureSet>) -> FixtureResult<Self> {
		let mut store = Self::default();
		for set in sets {
			store.insert(set)?;
		}
		Ok(store)
	}

	/// Re-reads the fixture directory, replacing every cached set.
	///
	/// A store built with [`from_sets`](Self::from_sets) has no directory and is left
	/// unchanged. On error the previous sets are kept.
	pub fn reload(&mut self) -> FixtureResult<()> {
		let Some(directory) = self.directory.clone() else {
			return Ok(());
		};
		if !directory.is_dir() {
			return Err(FixtureError::DirectoryNotFound(directory));
		}

		let parser = FixtureParser::new();
		let mut loaded = Self {
			directory: Some(directory.clone()),
			settings: self.settings.clone(),
			sets: BTreeMap::new(),
		};
		for path in fixture_files(&directory, &self.settings)? {
			let set = parser.parse_file(&path)?;
			tracing::debug!(
				fixture_set = set.name(),
				entries = set.len(),
				path = %path.display(),
				"loaded fixture set"
			);
			loaded.insert(set)?;
		}

		tracing::info!(
			directory = %directory.display(),
			fixture_sets = loaded.sets.len(),
			"fixture store loaded"
		);
		*self = loaded;
		Ok(())
	}

	/// Returns the set called `name`.
	pub fn get(&self, name: &str) -> Option<&FixtureSet> {
		self.sets.get(name)
	}

	/// Returns true if a set called `name` is loaded.
	pub fn contains(&self, name: &str) -> bool {
		self.sets.contains_key(name)
	}

	/// Returns the loaded set names, sorted.
	pub fn set_names(&self) -> impl Iterator<Item = &str> {
		self.sets.keys().map(String::as_str)
	}

	/// Returns the number of loaded sets.
	pub fn len(&self) -> usize {
		self.sets.len()
	}

	/// Returns true if no sets are loaded.
	pub fn is_empty(&self) -> bool {
		self.sets.is_empty()
	}

	/// Returns the directory the store was loaded from.
	pub fn directory(&self) -> Option<&Path> {
		self.directory.as_deref()
	}

	fn insert(&mut self, set: FixtureSet) -> FixtureResult<()> {
		if self.sets.contains_key(set.name()) {
			return Err(FixtureError::DuplicateFixtureSet {
				name: set.name().to_string(),
				path: set
					.source()
					.map(Path::to_path_buf)
					.unwrap_or_else(|| PathBuf::from(format!("<{}>", set.name()))),
			});
		}
		self.sets.insert(set.name().to_string(), set);
		Ok(())
	}
}

/// Lists the fixture files directly inside `directory`, sorted by path.
fn fixture_files(directory: &Path, settings: &FixtureSettings) -> FixtureResult<Vec<PathBuf>> {
	let io_error = |source| FixtureError::Io {
		path: directory.to_path_buf(),
		source,
	};

	let mut files = Vec::new();
	for entry in std::fs::read_dir(directory).map_err(io_error)? {
		let path = entry.map_err(io_error)?.path();
		if !path.is_file() {
			tracing::debug!(path = %path.display(), "skipping non-file entry");
			continue;
		}
		if !settings.is_fixture_file(&path) {
			tracing::debug!(path = %path.display(), "skipping non-fixture file");
			continue;
		}
		files.push(path);
	}
	files.sort();
	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};
	use std::fs;
	use tempfile::TempDir;

	#[fixture]
	fn fixture_dir() -> TempDir {
		let dir = TempDir::new().unwrap();
		fs::write(dir.path().join("users.yml"), "alice:\n  name: Alice\n").unwrap();
		fs::write(dir.path().join("posts.yaml"), "p1:\n  title: Hi\n").unwrap();
		fs::write(dir.path().join("README.md"), "# fixtures\n").unwrap();
		fs::create_dir(dir.path().join("nested")).unwrap();
		fs::write(dir.path().join("nested/tags.yml"), "t1:\n  name: rust\n").unwrap();
		dir
	}

	#[rstest]
	fn test_load_all(fixture_dir: TempDir) {
		let store = FixtureStore::load_all(fixture_dir.path()).unwrap();

		assert_eq!(store.set_names().collect::<Vec<_>>(), vec!["posts", "users"]);
		assert!(store.contains("users"));
		assert!(!store.contains("tags"));
		assert_eq!(store.directory(), Some(fixture_dir.path()));
		assert!(store.get("users").unwrap().contains("alice"));
	}

	#[rstest]
	fn test_load_with_extensions(fixture_dir: TempDir) {
		let settings = FixtureSettings::new(fixture_dir.path()).with_extensions(["yml"]);
		let store = FixtureStore::load(&settings).unwrap();
		assert_eq!(store.set_names().collect::<Vec<_>>(), vec!["users"]);
	}

	#[rstest]
	fn test_missing_directory() {
		let dir = TempDir::new().unwrap();
		let missing = dir.path().join("missing");

		let result = FixtureStore::load_all(&missing);
		assert!(matches!(result, Err(FixtureError::DirectoryNotFound(path)) if path == missing));
	}

	#[rstest]
	fn test_malformed_file(fixture_dir: TempDir) {
		fs::write(fixture_dir.path().join("broken.yml"), "a: [b\n").unwrap();

		let result = FixtureStore::load_all(fixture_dir.path());
		assert!(matches!(result, Err(FixtureError::Parse { .. })));
	}

	#[rstest]
	fn test_duplicate_set(fixture_dir: TempDir) {
		fs::write(fixture_dir.path().join("users.yaml"), "bob:\n  name: Bob\n").unwrap();

		let result = FixtureStore::load_all(fixture_dir.path());
		assert!(
			matches!(result, Err(FixtureError::DuplicateFixtureSet { name, .. }) if name == "users")
		);
	}

	#[rstest]
	fn test_reload_replaces_sets(fixture_dir: TempDir) {
		let mut store = FixtureStore::load_all(fixture_dir.path()).unwrap();

		fs::remove_file(fixture_dir.path().join("posts.yaml")).unwrap();
		fs::write(fixture_dir.path().join("users.yml"), "bob:\n  name: Bob\n").unwrap();
		store.reload().unwrap();

		assert_eq!(store.set_names().collect::<Vec<_>>(), vec!["users"]);
		let users = store.get("users").unwrap();
		assert!(users.contains("bob"));
		assert!(!users.contains("alice"));
	}

	#[rstest]
	fn test_reload_keeps_sets_on_error(fixture_dir: TempDir) {
		let mut store = FixtureStore::load_all(fixture_dir.path()).unwrap();
		fs::write(fixture_dir.path().join("users.yml"), "- not a mapping\n").unwrap();

		assert!(store.reload().is_err());
		assert!(store.get("users").unwrap().contains("alice"));
	}

	#[rstest]
	fn test_from_sets() {
		let parser = FixtureParser::new();
		let users = parser.parse_str("users", "alice:\n  name: Alice\n").unwrap();
		let again = parser.parse_str("users", "bob:\n  name: Bob\n").unwrap();

		let mut store = FixtureStore::from_sets([users.clone()]).unwrap();
		assert_eq!(store.len(), 1);
		assert!(store.directory().is_none());
		store.reload().unwrap();
		assert_eq!(store.len(), 1);

		let result = FixtureStore::from_sets([users, again]);
		assert!(matches!(result, Err(FixtureError::DuplicateFixtureSet { .. })));
	}
}
