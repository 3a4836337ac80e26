//! Model store - named artifacts
//!
//! `FileModelStore` keeps one `<name>.glyphh` file per model under a root
//! directory. Saves go through the atomic writer; only well-formed
//! artifacts are accepted.

use async_trait::async_trait;
use glyphh_core::{GlyphhError, SerializationError};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::artifact::{read_file_async, read_header, write_atomic_async};

/// File extension of stored artifacts
pub const ARTIFACT_EXTENSION: &str = "glyphh";

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("model not found: {0}")]
    NotFound(String),

    #[error("invalid model name: '{0}'")]
    InvalidName(String),

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for GlyphhError {
    fn from(error: StoreError) -> Self {
        let message = error.to_string();
        match error {
            StoreError::Serialization(e) => GlyphhError::Serialization(e),
            StoreError::Io(e) => GlyphhError::Io(e),
            StoreError::NotFound(_) => {
                GlyphhError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, message))
            }
            StoreError::InvalidName(_) => {
                GlyphhError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, message))
            }
        }
    }
}

/// Named artifact storage
#[async_trait]
pub trait ModelStore: Send + Sync {
    /// Store an encoded artifact under `name`, replacing any previous one
    async fn save(&self, name: &str, artifact: &[u8]) -> Result<()>;

    async fn load(&self, name: &str) -> Result<Vec<u8>>;

    /// Stored model names, sorted
    async fn list(&self) -> Result<Vec<String>>;

    /// Returns false when nothing was stored under `name`
    async fn delete(&self, name: &str) -> Result<bool>;
}

/// Directory backed store
#[derive(Debug, Clone)]
pub struct FileModelStore {
    root: PathBuf,
}

impl FileModelStore {
    /// Open (and create) the store directory
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        let invalid = name.is_empty()
            || name.starts_with('.')
            || name.contains(['/', '\\'])
            || name.chars().any(char::is_control);
        if invalid {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(format!("{name}.{ARTIFACT_EXTENSION}")))
    }
}

#[async_trait]
impl ModelStore for FileModelStore {
    async fn save(&self, name: &str, artifact: &[u8]) -> Result<()> {
        let path = self.path_for(name)?;
        read_header(artifact)?;
        write_atomic_async(&path, artifact).await?;
        debug!("Saved model '{}' to {}", name, path.display());
        Ok(())
    }

    async fn load(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path_for(name)?;
        if !tokio::fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(name.to_string()));
        }
        Ok(read_file_async(&path).await?)
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ARTIFACT_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let path = self.path_for(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
