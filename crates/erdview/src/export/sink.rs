//! Delivery of exported files.

use std::{
    fs, io,
    io::Write,
    path::{Path, PathBuf},
};

use log::debug;
use tempfile::NamedTempFile;

/// Destination of exported files.
pub trait DownloadSink {
    /// Stores `contents` under `filename` and returns where it ended up.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error. A failed delivery leaves no file
    /// behind.
    fn deliver(&self, filename: &str, contents: &[u8]) -> io::Result<PathBuf>;
}

/// Writes exports into a directory.
///
/// Contents go to a temporary file in the same directory first, which is
/// renamed into place only once fully written.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    directory: PathBuf,
}

impl DirectorySink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&self, filename: &str, contents: &[u8]) -> io::Result<PathBuf> {
        let name = Path::new(filename).file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid export file name `{filename}`"),
            )
        })?;
        let target = self.directory.join(name);

        if !self.directory.as_os_str().is_empty() {
            fs::create_dir_all(&self.directory)?;
        }
        let mut temp = NamedTempFile::new_in(self.directory.join("."))?;
        temp.write_all(contents)?;
        temp.flush()?;
        temp.persist(&target).map_err(|err| err.error)?;

        debug!(path = target.display().to_string(), bytes = contents.len(); "File delivered");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deliver_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());

        let path = sink.deliver("out.svg", b"<svg/>").unwrap();
        assert_eq!(path, dir.path().join("out.svg"));
        assert_eq!(fs::read(&path).unwrap(), b"<svg/>");

        // replaces an earlier export
        sink.deliver("out.svg", b"<svg></svg>").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"<svg></svg>");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_deliver_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("exports");
        let path = DirectorySink::new(&nested).deliver("a.png", &[1, 2, 3]).unwrap();
        assert_eq!(path, nested.join("a.png"));
    }

    #[test]
    fn test_deliver_strips_directories_from_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = DirectorySink::new(dir.path())
            .deliver("../escape.svg", b"x")
            .unwrap();
        assert_eq!(path, dir.path().join("escape.svg"));
    }

    #[test]
    fn test_rejects_empty_name() {
        let dir = tempfile::tempdir().unwrap();
        let err = DirectorySink::new(dir.path()).deliver("..", b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
