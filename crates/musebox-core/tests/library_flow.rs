//! End-to-end exercise of the media library over a real temp directory:
//! upload, list, search, rename, resolve, delete.

use musebox_core::error::LibraryError;
use musebox_core::library::MediaLibrary;

#[test]
fn full_library_lifecycle() {
    let root = tempfile::tempdir().unwrap();
    let lib = MediaLibrary::new(root.path());

    // Seed two tracks through the upload path.
    let staging = tempfile::tempdir().unwrap();
    for (tmp, original) in [("up1", "Sunset Drive.mp3"), ("up2", "aurora.flac")] {
        let payload = staging.path().join(tmp);
        std::fs::write(&payload, b"audio-bytes").unwrap();
        lib.add(&payload, original).unwrap();
    }

    // Non-audio neighbours never show up.
    std::fs::write(root.path().join("cover.jpg"), b"img").unwrap();
    assert_eq!(lib.list().unwrap(), vec!["aurora.flac", "Sunset Drive.mp3"]);

    // Search narrows, case-insensitively.
    assert_eq!(lib.search("SUNSET").unwrap(), vec!["Sunset Drive.mp3"]);

    // Rename keeps the original extension even against the caller's wishes.
    let renamed = lib.rename("Sunset Drive.mp3", "dusk.wav").unwrap();
    assert_eq!(renamed, "dusk.mp3");
    assert_eq!(lib.list().unwrap(), vec!["aurora.flac", "dusk.mp3"]);

    // Resolve produces an absolute path for the player.
    let path = lib.resolve("dusk.mp3").unwrap().unwrap();
    assert!(path.is_absolute());

    // Delete the lot; the listing is empty afterwards.
    let removed = lib
        .delete(&["aurora.flac".to_string(), "dusk.mp3".to_string()])
        .unwrap();
    assert_eq!(removed.len(), 2);
    assert!(lib.list().unwrap().is_empty());

    // Resolving the deleted track now reports it gone.
    assert!(matches!(
        lib.resolve("dusk.mp3"),
        Err(LibraryError::NotFound(_))
    ));
}
