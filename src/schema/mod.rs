//! Schema module - filters defined in YAML/JSON files

mod types;
pub mod loader;

pub use types::*;
pub use loader::{create_example_filter, load_filter};
