//! User-selected files for the upload path

use std::io;
use std::path::{Path, PathBuf};

/// A file picked by the user
pub trait SelectedFile {
    /// Display name of the file
    fn name(&self) -> &str;

    /// Read the whole file into memory
    fn read(&mut self) -> io::Result<Vec<u8>>;
}

/// File on the local filesystem
#[derive(Debug, Clone)]
pub struct PathFile {
    path: PathBuf,
    name: String,
}

impl PathFile {
    /// Select a file by path
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();
        Self { path, name }
    }

    /// Path of the file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SelectedFile for PathFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&mut self) -> io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }
}

/// File whose contents are already in memory (e.g. read by the browser)
#[derive(Debug, Clone)]
pub struct BytesFile {
    name: String,
    bytes: Option<Vec<u8>>,
}

impl BytesFile {
    /// Wrap file contents
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes: Some(bytes),
        }
    }
}

impl SelectedFile for BytesFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&mut self) -> io::Result<Vec<u8>> {
        self.bytes
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "file already consumed"))
    }
}

impl<F: SelectedFile + ?Sized> SelectedFile for Box<F> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read(&mut self) -> io::Result<Vec<u8>> {
        (**self).read()
    }
}
