use thiserror::Error;

/// Failures reading the persisted daily state. Callers treat both variants
/// as "no state available" and trigger an immediate refresh.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("state file does not exist")]
    Missing,
    #[error("state file is not valid JSON: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("state file could not be read: {0}")]
    Io(#[from] std::io::Error),
}

/// User-visible failures of the media library operations. Display strings
/// double as the short status feedback shown in the UI.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("'{0}' was not found")]
    NotFound(String),
    #[error("please enter a new name")]
    InvalidName,
    #[error("please select the files to delete first")]
    NoSelection,
    #[error("please choose a file to upload")]
    NoFileProvided,
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("no photos available in the photo directory")]
    EmptyCollection,
    #[error("{0}")]
    Io(#[from] std::io::Error),
}
