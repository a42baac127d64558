//! Media object storage. Disk-backed: uploads land under the configured
//! directory and are served statically under `/uploads`. The surface is
//! the provider contract the handlers rely on — upload bytes, get back a
//! public URL plus an asset id; delete by asset id.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;
use uuid::Uuid;

use super::error::AppError;

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub url: String,
    pub asset_id: String,
}

#[derive(Clone)]
pub struct MediaStorage {
    root: PathBuf,
    base_url: String,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub async fn upload(&self, original_name: &str, bytes: &[u8]) -> Result<StoredObject, AppError> {
        let asset_id = asset_id_for(original_name);

        fs::create_dir_all(&self.root).await?;
        fs::write(self.root.join(&asset_id), bytes).await?;

        info!("Stored media object {asset_id}");

        Ok(StoredObject {
            url: object_url(&self.base_url, &asset_id),
            asset_id,
        })
    }

    pub async fn delete(&self, asset_id: &str) -> Result<(), AppError> {
        // Asset ids are generated here and must stay a bare file name.
        if !is_safe_asset_id(asset_id) {
            return Err(AppError::BadRequest("Invalid asset id".to_string()));
        }

        match fs::remove_file(self.root.join(asset_id)).await {
            Ok(()) => {
                info!("Deleted media object {asset_id}");
                Ok(())
            }
            // Already gone at the provider; the record delete proceeds.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn asset_id_for(original_name: &str) -> String {
    match extension(original_name) {
        Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
        None => Uuid::new_v4().to_string(),
    }
}

fn extension(name: &str) -> Option<&str> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
}

fn is_safe_asset_id(asset_id: &str) -> bool {
    !asset_id.is_empty()
        && !asset_id.contains(['/', '\\'])
        && !asset_id.contains("..")
}

fn object_url(base_url: &str, asset_id: &str) -> String {
    format!("{}/{asset_id}", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_ids_keep_the_extension_and_are_unique() {
        let a = asset_id_for("photo.png");
        let b = asset_id_for("photo.png");

        assert!(a.ends_with(".png"));
        assert!(b.ends_with(".png"));
        assert_ne!(a, b);

        assert!(!asset_id_for("archive.tar.gz").ends_with(".tar.gz"));
        assert!(!asset_id_for("noextension").contains('.'));
    }

    #[test]
    fn suspicious_extensions_are_dropped() {
        assert!(extension("evil.p/ng").is_none());
        assert_eq!(extension("ok.jpeg"), Some("jpeg"));
    }

    #[test]
    fn asset_id_safety_check_blocks_path_traversal() {
        assert!(is_safe_asset_id("abc123.png"));
        assert!(!is_safe_asset_id("../etc/passwd"));
        assert!(!is_safe_asset_id("a/b.png"));
        assert!(!is_safe_asset_id(""));
    }

    #[test]
    fn urls_join_without_double_slashes() {
        assert_eq!(object_url("/uploads", "a.png"), "/uploads/a.png");
        assert_eq!(object_url("/uploads/", "a.png"), "/uploads/a.png");
    }

    #[tokio::test]
    async fn upload_then_delete_round_trips_on_disk() {
        let root = std::env::temp_dir().join(format!("storefront-test-{}", Uuid::new_v4()));
        let storage = MediaStorage::new(&root, "/uploads");

        let stored = storage.upload("shoe.png", b"img-bytes").await.unwrap();
        assert!(root.join(&stored.asset_id).exists());
        assert_eq!(stored.url, format!("/uploads/{}", stored.asset_id));

        storage.delete(&stored.asset_id).await.unwrap();
        assert!(!root.join(&stored.asset_id).exists());

        // Deleting an already-deleted object is not an error.
        storage.delete(&stored.asset_id).await.unwrap();

        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}
