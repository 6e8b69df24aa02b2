use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::CorpusError;

/// Flat directory scan yielding candidate record files in filename order.
#[derive(Clone, Debug)]
pub struct DirectoryScan {
    root: PathBuf,
    follow_links: bool,
}

impl DirectoryScan {
    /// Create a scan rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            follow_links: false,
        }
    }

    /// Configure symlink traversal.
    pub fn with_follow_symlinks(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Directory being scanned.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Regular files directly under the root, sorted by path.
    ///
    /// Subdirectories are not descended into. Entries that cannot be
    /// inspected are skipped.
    pub fn files(&self) -> Result<Vec<PathBuf>, CorpusError> {
        if !self.root.is_dir() {
            return Err(CorpusError::MissingInputDir {
                path: self.root.clone(),
            });
        }
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.follow_links);
        let mut files: Vec<PathBuf> = walker
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .collect();
        files.sort();
        Ok(files)
    }
}

/// UTF-8 file name of a path, if it has one.
pub fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

/// Read a whole file into memory; the handle is closed before returning.
pub fn read_text(path: &Path) -> Result<String, CorpusError> {
    fs::read_to_string(path).map_err(|source| CorpusError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Create `path` (and its parent directories) and hand a buffered writer to `write`.
pub fn write_file<F, T>(path: &Path, write: F) -> Result<T, CorpusError>
where
    F: FnOnce(&mut BufWriter<fs::File>) -> Result<T, CorpusError>,
{
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(fs::File::create(path)?);
    let value = write(&mut writer)?;
    writer.flush()?;
    Ok(value)
}
