//! Fixture files, sets and the fixture store.
//!
//! This module provides:
//! - [`FieldValue`]: a fixture field value, classified at parse time
//! - [`FixtureEntry`] and [`FixtureSet`]: the parsed contents of one fixture file
//! - [`FixtureParser`]: YAML parsing
//! - [`FixtureStore`]: every fixture set of a fixture directory

mod parser;
mod set;
mod store;
mod value;
mod yaml;

pub use parser::FixtureParser;
pub use set::{FixtureEntry, FixtureSet};
pub use store::FixtureStore;
pub use value::{FieldValue, plain_document};
