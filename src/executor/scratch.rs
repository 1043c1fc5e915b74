// Per-invocation scratch files
#![allow(dead_code)]

use crate::executor::error::{ExecutorError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Source file and compiled artifact for one run. Both are removed on drop.
#[derive(Debug)]
pub struct Scratch {
    source: PathBuf,
    artifact: PathBuf,
}

impl Scratch {
    /// Write `contents` to `<dir>/codegrade-<uuid>.<extension>`
    pub async fn create(dir: &Path, extension: &str, contents: &str) -> Result<Self> {
        let stem = format!("codegrade-{}", Uuid::new_v4());
        let scratch = Self {
            source: dir.join(format!("{}.{}", stem, extension)),
            artifact: dir.join(stem),
        };

        tokio::fs::write(&scratch.source, contents)
            .await
            .map_err(|e| {
                ExecutorError::ScratchFailed(scratch.source.display().to_string(), e.to_string())
            })?;

        debug!(
            source = %scratch.source.display(),
            bytes = contents.len(),
            "scratch source written"
        );
        Ok(scratch)
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    fn remove(path: &Path) {
        match std::fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "scratch file removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove scratch file"),
        }
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        Self::remove(&self.source);
        Self::remove(&self.artifact);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_files_removed_on_drop() {
        let dir = std::env::temp_dir();
        let scratch = Scratch::create(&dir, "py", "print(1)").await.unwrap();
        let source = scratch.source().to_path_buf();
        let artifact = scratch.artifact().to_path_buf();
        std::fs::write(&artifact, b"bin").unwrap();

        assert_eq!(std::fs::read_to_string(&source).unwrap(), "print(1)");
        drop(scratch);

        assert!(!source.exists());
        assert!(!artifact.exists());
    }

    #[tokio::test]
    async fn test_names_are_unique() {
        let dir = std::env::temp_dir();
        let a = Scratch::create(&dir, "c", "").await.unwrap();
        let b = Scratch::create(&dir, "c", "").await.unwrap();
        assert_ne!(a.source(), b.source());
        assert_ne!(a.artifact(), b.artifact());
    }

    #[tokio::test]
    async fn test_missing_dir_is_an_error() {
        let result = Scratch::create(Path::new("/nonexistent/codegrade"), "py", "x").await;
        assert!(matches!(result, Err(ExecutorError::ScratchFailed(_, _))));
    }
}
