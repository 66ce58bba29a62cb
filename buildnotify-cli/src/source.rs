//! Artifacts read from paths on disk.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use buildnotify_core::item::{Artifact, BuildError};
use buildnotify_engine::ArtifactSource;
use tokio::sync::Mutex;

/// Yields one artifact per path, in order. Unreadable paths become errors.
pub struct PathSource {
    pending: Mutex<VecDeque<PathBuf>>,
    base: PathBuf,
    cwd: PathBuf,
}

impl PathSource {
    pub fn new(paths: Vec<PathBuf>, base: PathBuf, cwd: PathBuf) -> Self {
        Self {
            pending: Mutex::new(paths.into()),
            base,
            cwd,
        }
    }

    async fn read(&self, path: &Path) -> Result<Artifact, BuildError> {
        let path = self.cwd.join(path);
        let wrap = |err: std::io::Error| {
            BuildError::new(format!("cannot read {}: {err}", path.display()))
                .with_plugin("read")
                .with_cause(err)
        };

        let metadata = tokio::fs::metadata(&path).await.map_err(wrap)?;
        let artifact = Artifact::new(&path, &self.base).with_cwd(&self.cwd);
        if metadata.is_dir() {
            return Ok(artifact);
        }

        let contents = tokio::fs::read(&path).await.map_err(wrap)?;
        Ok(artifact.with_contents(contents))
    }
}

#[async_trait]
impl ArtifactSource for PathSource {
    async fn next_artifact(&self) -> Option<Result<Artifact, BuildError>> {
        let path = self.pending.lock().await.pop_front()?;
        Some(self.read(&path).await)
    }
}
