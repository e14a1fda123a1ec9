//! Directory inventory: find recognized image files under a root.

use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::config::ScanConfig;

/// Extensions (lower case, without the dot) that mark a file as an image.
pub const RECOGNIZED_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "gif", "tif", "tiff", "bmp", "png", "pcx"];

/// Errors that abort a whole scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Root path does not exist
    #[error("Directory not found: {0}")]
    NotFound(PathBuf),

    /// Root path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Paths collected by a scan, in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    pub paths: Vec<PathBuf>,
    /// Set when more recognized files existed beyond `max_files`.
    pub truncated: bool,
}

impl Inventory {
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Returns `true` if `path` has a recognized image extension (any case).
#[must_use]
pub fn is_recognized_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            RECOGNIZED_EXTENSIONS.contains(&ext.as_str())
        })
}

/// Recursively collect recognized image files under `root`.
///
/// Entries are visited sorted by file name within each directory, so the
/// result is stable across runs. Unreadable entries are logged and skipped.
///
/// # Errors
///
/// Returns [`ScanError`] if `root` is missing or not a directory.
pub fn scan_directory(root: &Path, config: &ScanConfig) -> Result<Inventory, ScanError> {
    if !root.exists() {
        return Err(ScanError::NotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut inventory = Inventory::default();
    let walker = WalkDir::new(root)
        .follow_links(config.follow_links)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("Skipping unreadable entry: {}", err);
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_recognized_image(entry.path()) {
            continue;
        }
        if inventory.paths.len() >= config.max_files {
            inventory.truncated = true;
            break;
        }
        inventory.paths.push(entry.into_path());
    }

    tracing::info!(
        "Found {} image file(s) under {}{}",
        inventory.len(),
        root.display(),
        if inventory.truncated { " (limit reached)" } else { "" }
    );
    Ok(inventory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    fn names(inventory: &Inventory) -> Vec<String> {
        inventory
            .paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_recognized_extensions() {
        for name in ["a.jpg", "a.JPEG", "a.Gif", "a.tif", "a.TIFF", "a.bmp", "a.png", "a.PCX"] {
            assert!(is_recognized_image(Path::new(name)), "{}", name);
        }
        for name in ["a.webp", "a.txt", "jpg", "a.jpg.bak", "noext"] {
            assert!(!is_recognized_image(Path::new(name)), "{}", name);
        }
    }

    #[test]
    fn test_filters_and_recurses() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b.png");
        touch(dir.path(), "a.JPG");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "nested/deeper/c.tiff");

        let inventory = scan_directory(dir.path(), &ScanConfig::default()).unwrap();
        assert!(!inventory.truncated);
        let mut found = names(&inventory);
        found.sort();
        assert_eq!(found, vec!["a.JPG", "b.png", "c.tiff"]);
    }

    #[test]
    fn test_order_is_deterministic() {
        let dir = TempDir::new().unwrap();
        for name in ["z.png", "m.png", "a.png", "k.bmp"] {
            touch(dir.path(), name);
        }
        let config = ScanConfig::default();
        let first = scan_directory(dir.path(), &config).unwrap();
        let second = scan_directory(dir.path(), &config).unwrap();
        assert_eq!(first, second);
        assert_eq!(names(&first), vec!["a.png", "k.bmp", "m.png", "z.png"]);
    }

    #[test]
    fn test_cap_sets_truncated() {
        let dir = TempDir::new().unwrap();
        for i in 0..5 {
            touch(dir.path(), &format!("img{}.png", i));
        }

        let inventory = scan_directory(dir.path(), &ScanConfig::new().with_max_files(3)).unwrap();
        assert_eq!(inventory.len(), 3);
        assert!(inventory.truncated);

        let exact = scan_directory(dir.path(), &ScanConfig::new().with_max_files(5)).unwrap();
        assert_eq!(exact.len(), 5);
        assert!(!exact.truncated);
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        let inventory = scan_directory(dir.path(), &ScanConfig::default()).unwrap();
        assert!(inventory.is_empty());
    }

    #[test]
    fn test_invalid_roots() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(
            scan_directory(&missing, &ScanConfig::default()),
            Err(ScanError::NotFound(_))
        ));

        touch(dir.path(), "file.png");
        assert!(matches!(
            scan_directory(&dir.path().join("file.png"), &ScanConfig::default()),
            Err(ScanError::NotADirectory(_))
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Property: the scan never exceeds its cap and only returns
        /// recognized files.
        #[test]
        fn prop_cap_and_extensions(
            files in prop::collection::vec(
                (0u32..1000, prop::sample::select(vec!["png", "JPG", "txt", "gif", "doc", "pcx"])),
                0..20,
            ),
            cap in 0usize..10,
        ) {
            let dir = TempDir::new().unwrap();
            for (stem, ext) in &files {
                fs::write(dir.path().join(format!("f{}.{}", stem, ext)), b"x").unwrap();
            }

            let inventory = scan_directory(dir.path(), &ScanConfig::new().with_max_files(cap)).unwrap();
            prop_assert!(inventory.len() <= cap);
            for path in &inventory.paths {
                prop_assert!(is_recognized_image(path));
            }
        }
    }
}
