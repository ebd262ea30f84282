//! Local-disk storage backend for uploaded artifacts.
//!
//! Every tenant's files live as flat names in one shared upload directory:
//! `{base_path}/{tenant_id}_{uuidv7}_{sanitized hint}`. The directory layout
//! does not isolate tenants; that is the authorizer's job. This backend only
//! guarantees that a locator can never resolve outside `base_path`.

use async_trait::async_trait;
use edital_core::{Error, Result, StorageBackend};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Longest sanitized name hint kept in a locator.
const MAX_HINT_LEN: usize = 120;

/// Filesystem storage backend over a flat upload directory.
pub struct FilesystemBackend {
    base_path: PathBuf,
}

impl FilesystemBackend {
    /// Create a new filesystem backend with the given upload directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn full_path(&self, locator: &str) -> Result<PathBuf> {
        validate_locator(locator)?;
        Ok(self.base_path.join(locator))
    }

    /// Validate that the upload directory can be written, read, and cleaned.
    ///
    /// Run at startup so permission problems show up before the first request.
    pub async fn validate(&self) -> std::result::Result<(), String> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| format!("create_dir_all({:?}): {}", self.base_path, e))?;

        let test_file = self.base_path.join(".health-check");
        let data = b"storage-health-check";
        fs::write(&test_file, data)
            .await
            .map_err(|e| format!("write({:?}): {}", test_file, e))?;

        let read_data = fs::read(&test_file)
            .await
            .map_err(|e| format!("read({:?}): {}", test_file, e))?;
        if read_data != data {
            return Err("read-back mismatch".to_string());
        }

        fs::remove_file(&test_file)
            .await
            .map_err(|e| format!("remove_file({:?}): {}", test_file, e))?;

        Ok(())
    }

    /// Check whether a locator currently exists on disk.
    pub async fn exists(&self, locator: &str) -> Result<bool> {
        let full_path = self.full_path(locator)?;
        Ok(fs::try_exists(full_path).await?)
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn store(&self, data: &[u8], name_hint: &str, tenant_id: Uuid) -> Result<String> {
        let locator = format!(
            "{}_{}_{}",
            tenant_id,
            Uuid::now_v7().simple(),
            sanitize_name_hint(name_hint)
        );
        let full_path = self.full_path(&locator)?;
        debug!(
            subsystem = "storage",
            locator = %locator,
            size = data.len(),
            "file_storage: store"
        );

        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            warn!(base_path = %self.base_path.display(), error = %e, "file_storage: create_dir_all failed");
            e
        })?;

        // Atomic write: temp file + rename
        let temp_path = full_path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            warn!(temp_path = %temp_path.display(), error = %e, "file_storage: File::create failed");
            e
        })?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &full_path).await.map_err(|e| {
            warn!(from = %temp_path.display(), to = %full_path.display(), error = %e, "file_storage: rename failed");
            e
        })?;

        Ok(locator)
    }

    async fn fetch(&self, locator: &str) -> Result<Vec<u8>> {
        let full_path = self.full_path(locator)?;
        match fs::read(&full_path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(format!("file {}", locator)))
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn delete(&self, locator: &str) -> Result<()> {
        let full_path = self.full_path(locator)?;
        if fs::try_exists(&full_path).await? {
            fs::remove_file(full_path).await?;
        }
        Ok(())
    }
}

/// Reject locators that are not a single flat file name.
pub fn validate_locator(locator: &str) -> Result<()> {
    if locator.is_empty()
        || locator == "."
        || locator.contains("..")
        || locator.contains('/')
        || locator.contains('\\')
        || locator.contains('\0')
    {
        return Err(Error::InvalidInput(format!(
            "invalid storage locator: {:?}",
            locator
        )));
    }
    Ok(())
}

/// Reduce an uploaded file name to `[A-Za-z0-9._-]`, bounded in length.
pub fn sanitize_name_hint(hint: &str) -> String {
    let base = hint.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(hint);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.replace("..", "_");
    let cleaned = cleaned.trim_matches(|c: char| c == '.' || c == '_');
    // All ASCII at this point, so byte slicing is safe; keep the extension end.
    let truncated = &cleaned[cleaned.len().saturating_sub(MAX_HINT_LEN)..];
    if truncated.is_empty() {
        "file".to_string()
    } else {
        truncated.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_locator_rejects_traversal() {
        assert!(validate_locator("../etc/passwd").is_err());
        assert!(validate_locator("a/b.pdf").is_err());
        assert!(validate_locator("a\\b.pdf").is_err());
        assert!(validate_locator("").is_err());
        assert!(validate_locator("..").is_err());
        assert!(validate_locator("edital.pdf").is_ok());
    }

    #[test]
    fn test_sanitize_name_hint() {
        assert_eq!(sanitize_name_hint("Edital nº 12.pdf"), "Edital_n__12.pdf");
        assert_eq!(sanitize_name_hint("../../x.pdf"), "x.pdf");
        assert_eq!(sanitize_name_hint("..."), "file");
        let long = format!("{}.pdf", "a".repeat(300));
        let sanitized = sanitize_name_hint(&long);
        assert_eq!(sanitized.len(), MAX_HINT_LEN);
        assert!(sanitized.ends_with(".pdf"));
    }

    #[tokio::test]
    async fn test_store_fetch_delete() {
        let dir = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(dir.path());
        let tenant = Uuid::new_v4();

        let locator = backend
            .store(b"%PDF-1.4 edital", "edital.pdf", tenant)
            .await
            .unwrap();
        assert!(locator.starts_with(&format!("{}_", tenant)));
        assert!(locator.ends_with("_edital.pdf"));
        assert!(!dir.path().join(&locator).with_extension("tmp").exists());

        let data = backend.fetch(&locator).await.unwrap();
        assert_eq!(data, b"%PDF-1.4 edital");

        backend.delete(&locator).await.unwrap();
        assert!(!backend.exists(&locator).await.unwrap());
        // Deleting twice is fine
        backend.delete(&locator).await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(dir.path());
        let err = backend.fetch("missing.pdf").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_fetch_outside_base_rejected() {
        let dir = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(dir.path().join("uploads"));
        std::fs::write(dir.path().join("secret.txt"), b"x").unwrap();
        let err = backend.fetch("../secret.txt").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_validate_creates_directory() {
        let dir = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(dir.path().join("nested/uploads"));
        backend.validate().await.unwrap();
        assert!(dir.path().join("nested/uploads").is_dir());
        assert!(!dir.path().join("nested/uploads/.health-check").exists());
    }
}
