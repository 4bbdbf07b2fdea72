//! Post-render cleanup of intermediate files
//! Removal failures are reported but never retract the run's result

use log::{debug, warn};
use std::path::PathBuf;

use crate::error::PipelineError;

/// Tracks every intermediate file created during one pipeline run
#[derive(Debug, Default)]
pub struct TempFiles {
    paths: Vec<PathBuf>,
}

impl TempFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file for removal after the run
    pub fn track(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Remove all tracked files and forget them. Already-absent files are a
    /// no-op; removal failures are logged and the sweep continues. Returns
    /// how many files were removed.
    pub fn cleanup(&mut self) -> usize {
        let mut removed = 0;
        for path in self.paths.drain(..) {
            if !path.exists() {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    debug!("Removed temporary file {}", path.display());
                    removed += 1;
                }
                Err(e) => {
                    let err = PipelineError::Cleanup { reason: e.into() };
                    warn!("{} ({})", err, path.display());
                }
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_cleanup_removes_tracked_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.mp3");
        fs::write(&a, b"x").unwrap();
        fs::write(&b, b"y").unwrap();

        let mut temp = TempFiles::new();
        temp.track(&a);
        temp.track(&b);
        assert_eq!(temp.cleanup(), 2);
        assert!(!a.exists());
        assert!(!b.exists());
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("clip.mp4");
        fs::write(&file, b"z").unwrap();

        let mut temp = TempFiles::new();
        temp.track(&file);
        assert_eq!(temp.cleanup(), 1);
        // Second sweep over an already-clean tracker does nothing
        assert_eq!(temp.cleanup(), 0);
        assert!(temp.is_empty());
    }

    #[test]
    fn test_missing_file_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut temp = TempFiles::new();
        temp.track(dir.path().join("never_created.png"));
        assert_eq!(temp.cleanup(), 0);
    }
}
