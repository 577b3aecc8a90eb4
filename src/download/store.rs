//! Persistent store for finished downloads.
//!
//! Finished artifacts are copied out of their ephemeral working directory
//! into one flat directory, under a sanitized filename that gets a `_<n>`
//! suffix on collision. Lookups refuse anything that could escape the
//! store root.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::config::{Config, MIN_ARTIFACT_BYTES};
use crate::core::error::{AppError, AppResult};

/// A file placed in the store.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub filename: String,
    pub path: PathBuf,
    pub size: u64,
}

/// One entry of a store listing.
#[derive(Debug, Clone, Serialize)]
pub struct StoredEntry {
    pub filename: String,
    pub size: u64,
}

/// Flat on-disk store rooted at the configured download directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    max_file_size: u64,
}

impl FileStore {
    /// Opens the store, creating the root directory if needed.
    pub fn new(config: &Config) -> AppResult<Self> {
        std::fs::create_dir_all(&config.download_dir)?;
        Ok(Self {
            root: config.download_dir.clone(),
            max_file_size: config.max_file_size,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copies `src` into the store as `<stem>.<ext>`, suffixing the stem
    /// with `_<n>` until the name is free.
    ///
    /// Rejects artifacts below the minimum plausible size (a truncated or
    /// failed download, even when the locator fell back to it) and anything
    /// over the configured size cap.
    pub fn place(&self, src: &Path, stem: &str, ext: &str) -> AppResult<StoredFile> {
        let size = std::fs::metadata(src)?.len();
        if size < MIN_ARTIFACT_BYTES {
            return Err(AppError::Extraction(format!(
                "Downloaded file is too small ({} bytes)",
                size
            )));
        }
        if size > self.max_file_size {
            return Err(AppError::FileTooLarge(size));
        }

        let stem = if stem.is_empty() { "video" } else { stem };
        let mut filename = format!("{}.{}", stem, ext);
        let mut n = 1u32;
        while self.root.join(&filename).exists() {
            filename = format!("{}_{}.{}", stem, n, ext);
            n += 1;
        }

        let dest = self.root.join(&filename);
        std::fs::copy(src, &dest)?;
        log::info!("Stored {} ({} bytes)", filename, size);

        Ok(StoredFile {
            filename,
            path: dest,
            size,
        })
    }

    /// Resolves a stored filename to its on-disk path.
    ///
    /// The filename must be a plain name: path separators and parent
    /// references are rejected before touching the filesystem.
    pub fn resolve(&self, filename: &str) -> AppResult<PathBuf> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return Err(AppError::Validation("Invalid filename".to_string()));
        }
        let path = self.root.join(filename);
        if !path.is_file() {
            return Err(AppError::NotFound(filename.to_string()));
        }
        Ok(path)
    }

    /// Lists stored files, newest first.
    pub fn list(&self) -> AppResult<Vec<StoredEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified().ok();
            entries.push((
                StoredEntry {
                    filename: entry.file_name().to_string_lossy().into_owned(),
                    size: metadata.len(),
                },
                modified,
            ));
        }
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(entries.into_iter().map(|(e, _)| e).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &Path) -> FileStore {
        let config = Config {
            download_dir: dir.to_path_buf(),
            ..Config::default()
        };
        FileStore::new(&config).unwrap()
    }

    fn write_src(dir: &Path, name: &str, bytes: usize) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, vec![1u8; bytes]).unwrap();
        path
    }

    #[test]
    fn places_file_under_requested_name() {
        let dir = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let src = write_src(work.path(), "raw.bin", 64 * 1024);

        let stored = store.place(&src, "My Song", "mp3").unwrap();
        assert_eq!(stored.filename, "My Song.mp3");
        assert_eq!(stored.size, 64 * 1024);
        assert!(stored.path.is_file());
    }

    #[test]
    fn collisions_get_numeric_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let src = write_src(work.path(), "raw.bin", 64 * 1024);

        assert_eq!(store.place(&src, "clip", "mp4").unwrap().filename, "clip.mp4");
        assert_eq!(store.place(&src, "clip", "mp4").unwrap().filename, "clip_1.mp4");
        assert_eq!(store.place(&src, "clip", "mp4").unwrap().filename, "clip_2.mp4");
    }

    #[test]
    fn empty_stem_falls_back_to_video() {
        let dir = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let src = write_src(work.path(), "raw.bin", 64 * 1024);

        assert_eq!(store.place(&src, "", "mp4").unwrap().filename, "video.mp4");
    }

    #[test]
    fn rejects_undersized_and_oversized_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let config = Config {
            download_dir: dir.path().to_path_buf(),
            max_file_size: 100 * 1024,
            ..Config::default()
        };
        let store = FileStore::new(&config).unwrap();

        let empty = write_src(work.path(), "empty.bin", 0);
        assert!(matches!(
            store.place(&empty, "a", "mp4"),
            Err(AppError::Extraction(_))
        ));

        // Below the 10 KiB minimum, even though not empty
        let small = write_src(work.path(), "small.bin", 4 * 1024);
        assert!(matches!(
            store.place(&small, "b", "mp4"),
            Err(AppError::Extraction(_))
        ));

        let big = write_src(work.path(), "big.bin", 200 * 1024);
        assert!(matches!(
            store.place(&big, "c", "mp4"),
            Err(AppError::FileTooLarge(size)) if size == 200 * 1024
        ));
    }

    #[test]
    fn resolve_refuses_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        assert!(matches!(
            store.resolve("../etc/passwd"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            store.resolve("a/b.mp4"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(store.resolve(""), Err(AppError::Validation(_))));
        assert!(matches!(
            store.resolve("missing.mp4"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn lists_stored_files() {
        let dir = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let src = write_src(work.path(), "raw.bin", 64 * 1024);

        store.place(&src, "one", "mp3").unwrap();
        store.place(&src, "two", "mp4").unwrap();

        let listing = store.list().unwrap();
        assert_eq!(listing.len(), 2);
        assert!(listing.iter().all(|e| e.size == 64 * 1024));
    }
}
