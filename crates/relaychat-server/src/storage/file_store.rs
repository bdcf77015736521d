//! Directory-backed file store.
//!
//! Every path is confined to one flat directory: names are reduced to their
//! final segment before touching the filesystem. Writes land in a hidden
//! staging subdirectory first and are renamed into place, so a concurrent
//! reader sees either the old or the new content, never a partial file.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;

use relaychat_core::error::{RelayError, Result};
use relaychat_core::filename::sanitize;

/// Staging subdirectory for in-flight uploads. Listings only show regular
/// files, so it never appears there.
pub const STAGING_DIR: &str = ".partial";

/// Storage seam for the file service.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Regular files in the store, sorted by name.
    async fn list(&self) -> Result<Vec<String>>;
    /// Store `bytes` under the sanitized `name`, replacing any previous file.
    /// Returns the sanitized name.
    async fn write(&self, name: &str, bytes: Bytes) -> Result<String>;
    /// Read the file stored under the sanitized `name`.
    async fn read(&self, name: &str) -> Result<(String, Bytes)>;
}

pub struct DirFileStore {
    root: PathBuf,
    max_bytes: u64,
    tmp_seq: AtomicU64,
}

impl DirFileStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            root: root.into(),
            max_bytes,
            tmp_seq: AtomicU64::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn staging(&self) -> PathBuf {
        self.root.join(STAGING_DIR)
    }

    async fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            tracing::error!(dir = %self.root.display(), error = %e, "failed to create upload directory");
            RelayError::Storage("Failed to create uploads directory on server.".into())
        })
    }

    async fn ensure_staging(&self) -> Result<PathBuf> {
        self.ensure_root().await?;
        let staging = self.staging();
        fs::create_dir_all(&staging).await.map_err(|e| {
            tracing::error!(dir = %staging.display(), error = %e, "failed to create staging directory");
            RelayError::Storage("Failed to create uploads directory on server.".into())
        })?;
        Ok(staging)
    }

    fn temp_path(&self, staging: &Path) -> PathBuf {
        let n = self.tmp_seq.fetch_add(1, Ordering::Relaxed);
        staging.join(format!("{}-{n}.part", std::process::id()))
    }
}

#[async_trait]
impl FileStore for DirFileStore {
    async fn list(&self) -> Result<Vec<String>> {
        let mut dir = match fs::read_dir(&self.root).await {
            Ok(d) => d,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.ensure_root().await?;
                return Ok(Vec::new());
            }
            Err(e) => return Err(RelayError::Storage(format!("could not list files ({e})."))),
        };

        let mut names = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| RelayError::Storage(format!("could not list files ({e}).")))?
        {
            let Ok(file_type) = entry.file_type().await else { continue };
            if !file_type.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else { continue };
            names.push(name);
        }
        names.sort();
        Ok(names)
    }

    async fn write(&self, name: &str, bytes: Bytes) -> Result<String> {
        let name = sanitize(name)?;
        if name == STAGING_DIR {
            return Err(RelayError::BadRequest(format!("reserved filename: {name}")));
        }
        if bytes.len() as u64 > self.max_bytes {
            return Err(RelayError::PayloadTooLarge {
                limit: self.max_bytes,
            });
        }

        let staging = self.ensure_staging().await?;

        let tmp = self.temp_path(&staging);
        let dest = self.root.join(&name);
        if let Err(e) = fs::write(&tmp, &bytes).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(RelayError::Storage(format!("could not save file ({e}).")));
        }
        if let Err(e) = fs::rename(&tmp, &dest).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(RelayError::Storage(format!("could not save file ({e}).")));
        }

        tracing::info!(file = %dest.display(), bytes = bytes.len(), "stored upload");
        Ok(name)
    }

    async fn read(&self, name: &str) -> Result<(String, Bytes)> {
        let name = sanitize(name)?;
        let path = self.root.join(&name);

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(RelayError::NotFound(name)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(RelayError::NotFound(name))
            }
            Err(e) => return Err(RelayError::Storage(format!("could not read file ({e})."))),
        }

        let bytes = fs::read(&path)
            .await
            .map_err(|e| RelayError::Storage(format!("could not read file ({e}).")))?;
        Ok((name, Bytes::from(bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> DirFileStore {
        DirFileStore::new(dir.path().join("uploads"), 1024)
    }

    #[tokio::test]
    async fn list_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let fs_store = store(&dir);

        assert!(fs_store.list().await.unwrap().is_empty());
        assert!(fs_store.root().is_dir());
    }

    #[tokio::test]
    async fn list_skips_directories_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let fs_store = store(&dir);
        fs_store.write("b.txt", Bytes::from_static(b"b")).await.unwrap();
        fs_store.write("a.txt", Bytes::from_static(b"a")).await.unwrap();
        std::fs::create_dir(fs_store.root().join("nested")).unwrap();

        assert_eq!(fs_store.list().await.unwrap(), vec!["a.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn write_confines_traversal_to_sandbox() {
        let dir = tempfile::tempdir().unwrap();
        let fs_store = store(&dir);

        let name = fs_store
            .write("../../etc/passwd", Bytes::from_static(b"root"))
            .await
            .unwrap();

        assert_eq!(name, "passwd");
        assert!(fs_store.root().join("passwd").is_file());
        assert!(!dir.path().join("etc").exists());
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let fs_store = store(&dir);

        let err = fs_store
            .write("big.bin", Bytes::from(vec![0u8; 1025]))
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::PayloadTooLarge { limit: 1024 }));
        assert!(!fs_store.root().join("big.bin").exists());
    }

    #[tokio::test]
    async fn read_of_missing_or_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let fs_store = store(&dir);
        fs_store.list().await.unwrap();
        std::fs::create_dir(fs_store.root().join("sub")).unwrap();

        assert!(matches!(fs_store.read("nope").await, Err(RelayError::NotFound(_))));
        assert!(matches!(fs_store.read("sub").await, Err(RelayError::NotFound(_))));
    }

    #[tokio::test]
    async fn directory_creation_failure_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a dir").unwrap();
        let fs_store = DirFileStore::new(blocker.join("uploads"), 1024);

        let err = fs_store
            .write("a.txt", Bytes::from_static(b"a"))
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Storage(_)));
        assert_eq!(err.notice(), "Error: Failed to create uploads directory on server.");
    }

    #[tokio::test]
    async fn dotted_upload_names_are_listed() {
        let dir = tempfile::tempdir().unwrap();
        let fs_store = store(&dir);

        let name = fs_store
            .write(".upload-notes.txt", Bytes::from_static(b"n"))
            .await
            .unwrap();
        fs_store.write("plain.txt", Bytes::from_static(b"p")).await.unwrap();

        assert_eq!(name, ".upload-notes.txt");
        assert_eq!(
            fs_store.list().await.unwrap(),
            vec![".upload-notes.txt", "plain.txt"]
        );
        assert!(fs_store.root().join(STAGING_DIR).is_dir());
    }

    #[tokio::test]
    async fn staging_directory_name_is_reserved() {
        let dir = tempfile::tempdir().unwrap();
        let fs_store = store(&dir);

        let err = fs_store
            .write("../.partial", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
    }

    #[tokio::test]
    async fn storage_notices_do_not_repeat_the_error_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let fs_store = store(&dir);
        fs_store.list().await.unwrap();
        std::fs::create_dir(fs_store.root().join("taken")).unwrap();

        let err = fs_store
            .write("taken", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        let notice = err.notice();
        assert!(notice.starts_with("Error: could not save file"), "{notice}");
        assert!(!notice.contains("Error: Error"));
    }
}
