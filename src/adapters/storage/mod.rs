//! File storage adapters.

mod definition_files;

pub use definition_files::{read_definition_file, DefinitionFiles, LoadedDefinition};
