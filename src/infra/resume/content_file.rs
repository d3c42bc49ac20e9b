use crate::core::resume::ContentModel;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Unsupported content file {0}: expected a .json or .toml extension")]
    UnsupportedFormat(PathBuf),
}

/// Loads resume content, picking the parser from the file extension.
pub async fn load_content_model(path: &Path) -> Result<ContentModel, ContentError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    // Check the format before touching the disk.
    if !matches!(extension.as_deref(), Some("json") | Some("toml")) {
        return Err(ContentError::UnsupportedFormat(path.to_path_buf()));
    }

    let text = fs::read_to_string(path).await.map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let model: ContentModel = if extension.as_deref() == Some("toml") {
        toml::from_str(&text).map_err(|source| ContentError::Toml {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        serde_json::from_str(&text).map_err(|source| ContentError::Json {
            path: path.to_path_buf(),
            source,
        })?
    };

    tracing::debug!(
        "Loaded {} sections from {}",
        model.sections.len(),
        path.display()
    );
    Ok(model)
}
