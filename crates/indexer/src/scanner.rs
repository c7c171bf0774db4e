use crate::error::{IndexerError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Options controlling which files the scanner reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// File-name suffix of source files (e.g. ".py")
    pub suffix: String,

    /// Descend into symlinked directories. Cycles are detected and skipped.
    /// Symlinked files are reported either way.
    pub follow_symlinks: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            suffix: ".py".to_string(),
            follow_symlinks: true,
        }
    }
}

/// Fail with `PathNotFound` unless `root` exists
pub fn ensure_root(root: &Path) -> Result<()> {
    if root.try_exists()? {
        Ok(())
    } else {
        Err(IndexerError::PathNotFound(root.to_path_buf()))
    }
}

/// Scanner for finding source files under a root directory
pub struct FileScanner {
    root: PathBuf,
    options: ScanOptions,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>, options: ScanOptions) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            options,
        }
    }

    /// Walk the root recursively and collect matching files in file-name order
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        ensure_root(&self.root)?;

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(self.options.follow_symlinks)
            .sort_by_file_name();

        for result in walker {
            match result {
                Ok(entry) => {
                    if !self.is_source_file(entry.path()) {
                        continue;
                    }
                    if entry.file_type().is_file() || is_unfollowed_file_link(&entry) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    if let Some(ancestor) = e.loop_ancestor() {
                        log::warn!(
                            "Skipping symlink cycle at {} (points back to {})",
                            e.path().map(|p| p.display().to_string()).unwrap_or_default(),
                            ancestor.display()
                        );
                    } else if let Some(link) = e.path().filter(|p| self.is_dangling_source(p)) {
                        // kept so the read failure is reported against the file
                        files.push(link.to_path_buf());
                    } else {
                        log::warn!("Failed to read entry: {e}");
                    }
                }
            }
        }

        log::info!("Found {} source files under {}", files.len(), self.root.display());
        Ok(files)
    }

    fn is_source_file(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy().ends_with(self.options.suffix.as_str()))
            .unwrap_or(false)
    }

    fn is_dangling_source(&self, path: &Path) -> bool {
        self.is_source_file(path) && is_symlink(path) && fs::metadata(path).is_err()
    }
}

/// Symlink reported without following: anything but a directory target,
/// including a dangling link
fn is_unfollowed_file_link(entry: &DirEntry) -> bool {
    entry.path_is_symlink()
        && fs::metadata(entry.path())
            .map(|meta| meta.is_file())
            .unwrap_or(true)
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false)
}
