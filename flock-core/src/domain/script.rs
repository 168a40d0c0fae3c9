//! Script domain model

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::result::Result;

/// A migration script found in the scripts directory, not yet read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptFile {
    /// Filename (e.g., "001_create_users.sql"), the script's identity
    pub name: String,
    /// Full path used to read the content
    pub path: PathBuf,
}

impl ScriptFile {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Read the script content from disk
    ///
    /// Bytes that aren't valid UTF-8 decode to U+FFFD instead of failing;
    /// the checksum hashes them as `?` like any other non-ASCII char.
    pub fn load(&self) -> Result<Script> {
        let bytes = std::fs::read(&self.path)?;
        Ok(Script {
            name: self.name.clone(),
            path: self.path.clone(),
            content: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

/// A script with its content read, immutable for the rest of the run
#[derive(Debug, Clone)]
pub struct Script {
    name: String,
    path: PathBuf,
    content: String,
}

impl Script {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// True when the script holds nothing but whitespace
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_reads_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("001_init.sql");
        std::fs::write(&path, "CREATE TABLE t (id INTEGER);").unwrap();

        let script = ScriptFile::new("001_init.sql", &path).load().unwrap();
        assert_eq!(script.name(), "001_init.sql");
        assert_eq!(script.path(), path.as_path());
        assert_eq!(script.content(), "CREATE TABLE t (id INTEGER);");
        assert!(!script.is_blank());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let file = ScriptFile::new("gone.sql", dir.path().join("gone.sql"));
        assert!(matches!(file.load(), Err(crate::Error::Io(_))));
    }

    #[test]
    fn test_load_replaces_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("002_latin1.sql");
        std::fs::write(&path, b"SELECT 'caf\xe9';").unwrap();

        let script = ScriptFile::new("002_latin1.sql", &path).load().unwrap();
        assert_eq!(script.content(), "SELECT 'caf\u{FFFD}';");
    }

    #[test]
    fn test_is_blank() {
        assert!(Script::new("a.sql", "a.sql", " \n\t\r\n").is_blank());
        assert!(Script::new("a.sql", "a.sql", "").is_blank());
    }
}
