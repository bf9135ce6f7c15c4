//! Adapters - Implementations of port interfaces and local I/O.
//!
//! - `http` - `HttpTransport` implementations (reqwest, scripted mock)
//! - `storage` - JSON/YAML bot definition files

pub mod http;
pub mod storage;

pub use http::{MockTransport, ReqwestTransport};
pub use storage::{read_definition_file, DefinitionFiles, LoadedDefinition};
