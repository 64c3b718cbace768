//! Media library: stateless operations over a flat directory of audio
//! files. Every call re-scans the directory; nothing is indexed or cached,
//! so concurrent external changes are picked up on the next call. Two
//! mutations racing on the same filename resolve at the filesystem level,
//! last writer wins. That is an accepted limitation, not a bug to lock away.

use crate::error::LibraryError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Extensions recognized as audio, compared case-insensitively.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac"];

/// A batch delete that stopped at a missing file. Deletions applied before
/// the miss stay applied; `removed` says which.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct BatchDeleteError {
    pub removed: Vec<String>,
    #[source]
    pub source: LibraryError,
}

pub struct MediaLibrary {
    dir: PathBuf,
}

impl MediaLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn is_audio_name(name: &str) -> bool {
        let lower = name.to_lowercase();
        AUDIO_EXTENSIONS.iter().any(|ext| lower.ends_with(&format!(".{ext}")))
    }

    /// Track names must be bare filenames. Anything carrying a path
    /// component (`../x`, `a/b`, `..`) never reaches the filesystem join.
    fn is_plain_name(name: &str) -> bool {
        Path::new(name).file_name() == Some(std::ffi::OsStr::new(name))
    }

    /// All audio filenames, sorted case-insensitively. Entries that vanish
    /// between the scan and the stat are simply skipped.
    pub fn list(&self) -> Result<Vec<String>, LibraryError> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let Ok(entry) = entry else { continue };
            let Ok(file_type) = entry.file_type() else { continue };
            if !file_type.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if Self::is_audio_name(&name) {
                files.push(name);
            }
        }
        files.sort_by_key(|name| name.to_lowercase());
        Ok(files)
    }

    /// Empty query returns the full listing; otherwise a case-insensitive
    /// substring filter, order preserved from `list`.
    pub fn search(&self, query: &str) -> Result<Vec<String>, LibraryError> {
        let files = self.list()?;
        if query.is_empty() {
            return Ok(files);
        }
        let needle = query.to_lowercase();
        Ok(files
            .into_iter()
            .filter(|name| name.to_lowercase().contains(&needle))
            .collect())
    }

    /// Move an uploaded payload into the library under its original base
    /// name, overwriting any same-named file. Falls back to copy+remove
    /// when the payload sits on another filesystem.
    pub fn add(&self, source: &Path, original_name: &str) -> Result<String, LibraryError> {
        let base = Path::new(original_name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .ok_or(LibraryError::NoFileProvided)?;

        let dest = self.dir.join(&base);
        if std::fs::rename(source, &dest).is_err() {
            std::fs::copy(source, &dest)?;
            let _ = std::fs::remove_file(source);
        }
        debug!("[library] added {:?}", dest);
        Ok(base)
    }

    /// Rename, keeping the original file's extension no matter what the
    /// caller typed: `newname` and `newname.txt` both become `newname.mp3`
    /// when the existing file is an mp3.
    pub fn rename(&self, existing: &str, new_base: &str) -> Result<String, LibraryError> {
        if new_base.is_empty() || !Self::is_plain_name(new_base) {
            return Err(LibraryError::InvalidName);
        }
        if !Self::is_plain_name(existing) {
            return Err(LibraryError::NotFound(existing.to_string()));
        }

        let old_path = self.dir.join(existing);
        if !old_path.is_file() {
            return Err(LibraryError::NotFound(existing.to_string()));
        }

        let base = new_base.split('.').next().unwrap_or(new_base);
        if base.is_empty() {
            return Err(LibraryError::InvalidName);
        }
        let new_name = match Path::new(existing).extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{base}.{ext}"),
            None => base.to_string(),
        };

        let new_path = self.dir.join(&new_name);
        std::fs::rename(&old_path, &new_path)?;
        debug!("[library] renamed {} -> {}", existing, new_name);
        Ok(new_name)
    }

    /// Remove each named file in order, aborting at the first name that no
    /// longer exists. Files removed before the abort stay removed.
    pub fn delete(&self, names: &[String]) -> Result<Vec<String>, BatchDeleteError> {
        if names.is_empty() {
            return Err(BatchDeleteError {
                removed: Vec::new(),
                source: LibraryError::NoSelection,
            });
        }

        let mut removed = Vec::new();
        for name in names {
            if !Self::is_plain_name(name) {
                warn!("[library] delete refused, '{}' is not a bare filename", name);
                return Err(BatchDeleteError {
                    removed,
                    source: LibraryError::NotFound(name.clone()),
                });
            }
            let path = self.dir.join(name);
            if !path.is_file() {
                warn!("[library] delete aborted, '{}' not found", name);
                return Err(BatchDeleteError {
                    removed,
                    source: LibraryError::NotFound(name.clone()),
                });
            }
            if let Err(e) = std::fs::remove_file(&path) {
                return Err(BatchDeleteError {
                    removed,
                    source: e.into(),
                });
            }
            removed.push(name.clone());
        }
        Ok(removed)
    }

    /// Absolute path of a named file, for the presentation layer to stream
    /// or offer as a download. An empty name is "no selection", not an error.
    pub fn resolve(&self, name: &str) -> Result<Option<PathBuf>, LibraryError> {
        if name.is_empty() {
            return Ok(None);
        }
        if !Self::is_plain_name(name) {
            return Err(LibraryError::NotFound(name.to_string()));
        }
        let path = self.dir.join(name);
        if !path.is_file() {
            return Err(LibraryError::NotFound(name.to_string()));
        }
        Ok(Some(path.canonicalize()?))
    }
}
