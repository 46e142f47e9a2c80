//! Document store backends.

mod memory;

pub use memory::InMemoryBackend;
