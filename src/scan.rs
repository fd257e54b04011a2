//! Ordered collection provider: recursive directory scan producing the
//! stable `PhotoRef` ordering the engine navigates over.

use std::ffi::OsStr;
use std::path::Path;

use tracing::info;
use walkdir::WalkDir;

use crate::error::Error;
use crate::events::PhotoRef;

/// Recursively collect the images under `root`, sorted by path so the
/// ordering is stable across rescans.
pub fn scan_photos(root: &Path) -> Result<Vec<PhotoRef>, Error> {
    if !root.is_dir() {
        return Err(Error::BadDir(root.display().to_string()));
    }
    let mut paths = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.into_path();
        if is_image(&path) {
            paths.push(path);
        }
    }
    if paths.is_empty() {
        return Err(Error::EmptyScan);
    }
    paths.sort();
    info!(count = paths.len(), root = %root.display(), "collection scan complete");
    Ok(paths
        .into_iter()
        .enumerate()
        .map(|(ordinal, path)| PhotoRef::new(ordinal as u64, ordinal, path))
        .collect())
}

#[inline]
fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(OsStr::to_str)
            .map(|s| s.to_ascii_lowercase()),
        Some(ref e) if ["jpg", "jpeg", "png", "gif", "webp"].contains(&e.as_str())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn scan_filters_and_orders_by_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.jpg"), b"x").unwrap();
        fs::write(dir.path().join("a.png"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::write(dir.path().join("nested/c.webp"), b"x").unwrap();

        let photos = scan_photos(dir.path()).unwrap();
        let names: Vec<_> = photos
            .iter()
            .map(|p| p.path.file_name().unwrap().to_str().unwrap().to_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.jpg", "c.webp"]);
        for (i, photo) in photos.iter().enumerate() {
            assert_eq!(photo.ordinal, i);
            assert_eq!(photo.id, i as u64);
        }
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(scan_photos(dir.path()), Err(Error::EmptyScan)));
    }

    #[test]
    fn missing_directory_is_an_error() {
        assert!(matches!(
            scan_photos(Path::new("/does/not/exist")),
            Err(Error::BadDir(_))
        ));
    }
}
