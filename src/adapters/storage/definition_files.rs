//! Bot definition files.
//!
//! Reads intents, flow and metadata from JSON or YAML files so a bot can be kept
//! under version control and pushed with one call. The format is picked from
//! the file extension (`.json`, `.yaml`, `.yml`).

use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::bot::{BotDefinition, BotMetadata, Flow, Intents};
use crate::domain::foundation::SarufiError;

/// Paths of the files describing a bot. Any of them may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionFiles {
    pub intents: Option<PathBuf>,
    pub flow: Option<PathBuf>,
    pub metadata: Option<PathBuf>,
}

/// Parsed contents of a [`DefinitionFiles`] set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedDefinition {
    pub intents: Option<Intents>,
    pub flow: Option<Flow>,
    pub metadata: BotMetadata,
}

impl LoadedDefinition {
    pub fn into_definition(self) -> BotDefinition {
        self.metadata.into_definition(self.intents, self.flow)
    }
}

impl DefinitionFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_intents<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.intents = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_flow<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.flow = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_metadata<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.metadata = Some(path.as_ref().to_path_buf());
        self
    }

    /// Reads and parses every file that was set. Missing metadata reads as empty.
    pub async fn load(&self) -> Result<LoadedDefinition, SarufiError> {
        let intents = match &self.intents {
            Some(path) => Some(read_definition_file::<Intents>(path).await?),
            None => None,
        };
        let flow = match &self.flow {
            Some(path) => Some(read_definition_file::<Flow>(path).await?),
            None => None,
        };
        let metadata = match &self.metadata {
            Some(path) => read_definition_file::<BotMetadata>(path).await?,
            None => BotMetadata::default(),
        };

        Ok(LoadedDefinition {
            intents,
            flow,
            metadata,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(FileFormat::Json),
            "yaml" | "yml" => Some(FileFormat::Yaml),
            _ => None,
        }
    }
}

/// Reads one definition file and deserializes it according to its extension.
pub async fn read_definition_file<T: DeserializeOwned>(path: &Path) -> Result<T, SarufiError> {
    let format = FileFormat::from_path(path).ok_or_else(|| {
        SarufiError::definition(format!(
            "{} is not a JSON or YAML file",
            path.display()
        ))
    })?;

    tracing::info!(path = %path.display(), ?format, "Reading bot definition file");

    let text = fs::read_to_string(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            SarufiError::definition(format!("File {} not found", path.display()))
        }
        _ => SarufiError::definition(format!("{}: {}", path.display(), e)),
    })?;

    match format {
        FileFormat::Json => serde_json::from_str(&text)
            .map_err(|e| SarufiError::definition(format!("{}: {}", path.display(), e))),
        FileFormat::Yaml => serde_yaml::from_str(&text)
            .map_err(|e| SarufiError::definition(format!("{}: {}", path.display(), e))),
    }
}
