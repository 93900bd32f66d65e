//! Local filesystem storage backend.

use async_trait::async_trait;
use tracing::debug;

use super::{local_path, Storage, StorageOption};
use crate::error::{Error, Result};

/// Stores secrets as files under `file://` URLs or plain paths.
pub struct FsStorage;

#[async_trait]
impl Storage for FsStorage {
    async fn download(&self, url: &str, _options: &[StorageOption]) -> Result<Vec<u8>> {
        let path = local_path(url);
        debug!(path = %path, "downloading");
        tokio::fs::read(&path).await.map_err(|e| Error::Retrieval {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    async fn upload(
        &self,
        url: &str,
        mode: u32,
        data: &[u8],
        _options: &[StorageOption],
    ) -> Result<()> {
        let path = local_path(url);
        debug!(path = %path, bytes = data.len(), "uploading");
        let upload = async {
            if let Some(parent) = std::path::Path::new(&path).parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, data).await?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).await?;
            }
            #[cfg(not(unix))]
            let _ = mode;
            Ok::<_, std::io::Error>(())
        };
        upload.await.map_err(|e| Error::Upload {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    async fn exists(&self, url: &str) -> bool {
        tokio::fs::try_exists(local_path(url)).await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_download_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let url = dir.path().join("nested/secret.bin").display().to_string();
        let storage = FsStorage;

        storage.upload(&url, 0o600, b"payload", &[]).await.unwrap();
        assert!(storage.exists(&url).await);
        let data = storage.download(&url, &[]).await.unwrap();
        assert_eq!(data, b"payload");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_upload_applies_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let url = dir.path().join("secret.bin").display().to_string();
        FsStorage.upload(&url, 0o600, b"x", &[]).await.unwrap();
        let mode = std::fs::metadata(&url).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_download_missing_fails() {
        let err = FsStorage.download("/no/such/file", &[]).await.unwrap_err();
        assert!(err.to_string().contains("/no/such/file"));
    }
}
