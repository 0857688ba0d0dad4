//! Sessions stored as files in one directory

use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{validate_name, SessionSource};
use crate::error::FetchError;

/// Reads `<root>/<name>`
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Create a source rooted at `root`
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Directory sessions are read from
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Session file names in the directory, sorted
    pub fn list(&self) -> io::Result<Vec<String>> {
        let mut names: Vec<String> = std::fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();
        Ok(names)
    }
}

impl SessionSource for DirectorySource {
    async fn fetch(&self, name: &str) -> Result<String, FetchError> {
        validate_name(name)?;
        let path = self.root.join(name.trim());
        debug!(path = %path.display(), "reading session file");

        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(FetchError::NotFound(name.to_string()))
            }
            Err(e) => Err(FetchError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fetch_and_list() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.csv"), "x").unwrap();
        std::fs::write(dir.path().join("a.csv"), "hello").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let source = DirectorySource::new(dir.path());
        assert_eq!(source.fetch("a.csv").await.unwrap(), "hello");
        assert_eq!(source.list().unwrap(), vec!["a.csv", "b.csv"]);
    }

    #[tokio::test]
    async fn test_missing_and_invalid_names() {
        let dir = TempDir::new().unwrap();
        let source = DirectorySource::new(dir.path());

        assert!(matches!(
            source.fetch("nope.csv").await,
            Err(FetchError::NotFound(_))
        ));
        assert!(matches!(
            source.fetch("../nope.csv").await,
            Err(FetchError::InvalidName(_))
        ));
    }
}
