//! Diagnostic artifacts
//!
//! The core hands raw capture bytes to an [`ArtifactStore`] and keeps only an
//! opaque [`ArtifactRef`]. Storage layout and file naming belong to the
//! store implementation, not to the workflow engine.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DriverError;

/// What kind of artifact a reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// A viewport screenshot
    Screenshot,
}

/// Opaque reference to a stored artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Unique artifact id
    pub id: Uuid,
    /// Artifact kind
    pub kind: ArtifactKind,
    /// Caller-supplied label (step name, usually)
    pub label: String,
    /// Where the store put it, if it reports a location
    pub location: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl ArtifactRef {
    /// Create a reference for a freshly stored artifact
    pub fn new(kind: ArtifactKind, label: impl Into<String>, location: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            label: label.into(),
            location,
            created_at: Utc::now(),
        }
    }
}

/// Sink for capture bytes produced by the UI driver
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist screenshot bytes and return a reference to them
    async fn store_screenshot(&self, label: &str, bytes: &[u8]) -> Result<ArtifactRef, DriverError>;
}

/// Filesystem-backed artifact store
///
/// Writes screenshots under a single directory, one file per capture.
pub struct FsArtifactStore {
    dir: PathBuf,
}

impl FsArtifactStore {
    /// Create a store rooted at `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn store_screenshot(&self, label: &str, bytes: &[u8]) -> Result<ArtifactRef, DriverError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DriverError::ArtifactStore(e.to_string()))?;

        let artifact = ArtifactRef::new(ArtifactKind::Screenshot, label, None);
        let file_name = format!("{}-{}.jpg", sanitize(label), artifact.id.simple());
        let path = self.dir.join(file_name);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| DriverError::ArtifactStore(e.to_string()))?;

        Ok(ArtifactRef {
            location: Some(path.display().to_string()),
            ..artifact
        })
    }
}

fn sanitize(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
