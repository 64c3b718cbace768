//! Photo gallery: pick one regular file from the photo directory, uniformly
//! at random. No metadata, no ordering, no cache.

use crate::error::GalleryError;
use rand::Rng;
use std::path::{Path, PathBuf};

pub struct Gallery {
    dir: PathBuf,
}

impl Gallery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a randomly chosen photo, relative to the working directory
    /// (e.g. `photo/beach.jpg`).
    pub fn pick_random(&self) -> Result<PathBuf, GalleryError> {
        let mut photos = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            // A file vanishing mid-scan is not an error, just not a candidate.
            let Ok(entry) = entry else { continue };
            let path = entry.path();
            if path.is_file() {
                photos.push(path);
            }
        }

        if photos.is_empty() {
            return Err(GalleryError::EmptyCollection);
        }

        let idx = rand::thread_rng().gen_range(0..photos.len());
        Ok(photos.swap_remove(idx))
    }
}
