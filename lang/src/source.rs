use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A source file on disk. The path is made absolute on validation so
/// diagnostics always carry a stable location.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn validate(&mut self) -> io::Result<()> {
        self.path = self.path.canonicalize()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    pub fn content(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }
}
