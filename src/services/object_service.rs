//! 本地磁盘对象存储
//!
//! 布局：`<root>/uploads/<uuid>` 保存内容，`<root>/uploads/<uuid>.meta.json` 保存元数据，
//! `<root>/uploads/<uuid>.pending` 标记已分配但尚未确认的上传地址。
//! 上传后默认私有，图片经 `finalize_image` 校验通过后才公开。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::config::ObjectsConfig;
use crate::errors::{PortalError, Result};

const UPLOADS_DIR: &str = "uploads";
const UPLOAD_URL_PREFIX: &str = "/api/objects/upload/";
const PUBLIC_PATH_PREFIX: &str = "/objects/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Public,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    pub content_type: String,
    pub size: u64,
    pub visibility: Visibility,
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub metadata: ObjectMetadata,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub object_id: String,
    pub upload_url: String,
}

pub struct LocalObjectStore {
    root: PathBuf,
    max_image_bytes: u64,
    max_upload_bytes: usize,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, max_image_bytes: u64, max_upload_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_image_bytes,
            max_upload_bytes,
        }
    }

    pub fn from_config(config: &ObjectsConfig) -> Self {
        Self::new(
            &config.root_dir,
            config.max_image_bytes,
            config.max_upload_bytes,
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, id: &Uuid) -> PathBuf {
        self.root.join(UPLOADS_DIR).join(id.to_string())
    }

    fn meta_path(&self, id: &Uuid) -> PathBuf {
        self.root.join(UPLOADS_DIR).join(format!("{}.meta.json", id))
    }

    fn pending_path(&self, id: &Uuid) -> PathBuf {
        self.root.join(UPLOADS_DIR).join(format!("{}.pending", id))
    }

    /// 分配对象 id 并落盘占位，返回客户端 PUT 原始内容的地址
    pub async fn create_upload_target(&self) -> Result<UploadTarget> {
        let id = Uuid::new_v4();
        tokio::fs::create_dir_all(self.root.join(UPLOADS_DIR)).await?;
        tokio::fs::write(self.pending_path(&id), b"").await?;

        let object_id = id.to_string();
        Ok(UploadTarget {
            upload_url: format!("{}{}", UPLOAD_URL_PREFIX, object_id),
            object_id,
        })
    }

    /// 写入对象内容，可见性为私有
    ///
    /// 只接受 `create_upload_target` 分配且尚未确认的 id。
    pub async fn put(&self, object_id: &str, content_type: &str, bytes: &[u8]) -> Result<ObjectMetadata> {
        let unknown =
            || PortalError::not_found(format!("Unknown upload target: {}", object_id));
        let id = parse_object_id(object_id).ok_or_else(unknown)?;
        if !tokio::fs::try_exists(self.pending_path(&id)).await? {
            return Err(unknown());
        }
        if bytes.len() > self.max_upload_bytes {
            return Err(PortalError::validation(format!(
                "Upload exceeds {} bytes",
                self.max_upload_bytes
            )));
        }

        tokio::fs::write(self.object_path(&id), bytes).await?;

        let metadata = ObjectMetadata {
            content_type: content_type.trim().to_lowercase(),
            size: bytes.len() as u64,
            visibility: Visibility::Private,
        };
        self.write_metadata(&id, &metadata).await?;

        info!(
            "Stored object {} ({} bytes, {})",
            id, metadata.size, metadata.content_type
        );
        Ok(metadata)
    }

    /// 校验图片并公开，返回 `/objects/uploads/<id>`
    ///
    /// 接受上传地址、对象路径或带这些路径的完整 URL；校验失败时删除对象。
    pub async fn finalize_image(&self, image_url: &str) -> Result<String> {
        let id = extract_object_id(image_url).ok_or_else(|| {
            PortalError::validation(format!("Not an uploaded object: {}", image_url))
        })?;
        let mut metadata = self
            .read_metadata(&id)
            .await?
            .ok_or_else(|| PortalError::not_found(format!("Object not found: {}", id)))?;

        let rejection = if !metadata.content_type.starts_with("image/") {
            Some(format!(
                "Uploaded object is not an image ({})",
                metadata.content_type
            ))
        } else if metadata.size > self.max_image_bytes {
            Some(format!(
                "Image exceeds {} bytes ({} bytes)",
                self.max_image_bytes, metadata.size
            ))
        } else {
            None
        };

        if let Some(reason) = rejection {
            self.remove(&id).await;
            warn!("Rejected upload {}: {}", id, reason);
            return Err(PortalError::validation(reason));
        }

        metadata.visibility = Visibility::Public;
        self.write_metadata(&id, &metadata).await?;
        // 公开后上传地址失效
        remove_if_exists(&self.pending_path(&id)).await;

        let object_path = format!("{}{}/{}", PUBLIC_PATH_PREFIX, UPLOADS_DIR, id);
        info!("Published image {}", object_path);
        Ok(object_path)
    }

    /// 按 `uploads/<uuid>` 读取公开对象
    pub async fn get(&self, path: &str) -> Result<StoredObject> {
        let id = parse_public_path(path)
            .ok_or_else(|| PortalError::not_found(format!("Object not found: {}", path)))?;
        let metadata = self
            .read_metadata(&id)
            .await?
            .ok_or_else(|| PortalError::not_found(format!("Object not found: {}", path)))?;

        if metadata.visibility != Visibility::Public {
            return Err(PortalError::forbidden(format!("Object is not public: {}", path)));
        }

        let bytes = match tokio::fs::read(self.object_path(&id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PortalError::not_found(format!("Object not found: {}", path)));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(StoredObject { metadata, bytes })
    }

    async fn read_metadata(&self, id: &Uuid) -> Result<Option<ObjectMetadata>> {
        match tokio::fs::read(self.meta_path(id)).await {
            Ok(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_metadata(&self, id: &Uuid, metadata: &ObjectMetadata) -> Result<()> {
        let raw = serde_json::to_vec(metadata)?;
        tokio::fs::write(self.meta_path(id), raw).await?;
        Ok(())
    }

    async fn remove(&self, id: &Uuid) {
        for path in [self.object_path(id), self.meta_path(id), self.pending_path(id)] {
            remove_if_exists(&path).await;
        }
    }
}

async fn remove_if_exists(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!("Failed to remove {}: {}", path.display(), e);
    }
}

fn parse_object_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

/// 只接受 `uploads/<uuid>`
fn parse_public_path(path: &str) -> Option<Uuid> {
    let rest = path.trim_start_matches('/').strip_prefix(UPLOADS_DIR)?;
    parse_object_id(rest.strip_prefix('/')?)
}

fn extract_object_id(image_url: &str) -> Option<Uuid> {
    let raw = image_url.trim();
    let path = if raw.starts_with("http://") || raw.starts_with("https://") {
        Url::parse(raw).ok()?.path().to_string()
    } else {
        raw.split(['?', '#']).next()?.to_string()
    };

    if let Some(id) = path.strip_prefix(UPLOAD_URL_PREFIX) {
        return parse_object_id(id);
    }
    parse_public_path(path.strip_prefix(PUBLIC_PATH_PREFIX)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_public_path_rejects_traversal() {
        let id = Uuid::new_v4();
        assert_eq!(parse_public_path(&format!("uploads/{}", id)), Some(id));
        assert_eq!(parse_public_path(&format!("/uploads/{}", id)), Some(id));
        assert_eq!(parse_public_path("uploads/../config.toml"), None);
        assert_eq!(parse_public_path(&format!("uploads/{}/x", id)), None);
        assert_eq!(parse_public_path(&format!("other/{}", id)), None);
    }

    #[test]
    fn test_extract_object_id_forms() {
        let id = Uuid::new_v4();
        assert_eq!(
            extract_object_id(&format!("/api/objects/upload/{}", id)),
            Some(id)
        );
        assert_eq!(
            extract_object_id(&format!("https://portal.example.com/objects/uploads/{}?v=1", id)),
            Some(id)
        );
        assert_eq!(extract_object_id("https://cdn.example.com/logo.png"), None);
    }

    fn store(dir: &tempfile::TempDir, max_image_bytes: u64) -> LocalObjectStore {
        LocalObjectStore::new(dir.path(), max_image_bytes, 1024)
    }

    #[tokio::test]
    async fn test_upload_target_url() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = store(&dir, 10);
        let target = store.create_upload_target().await.unwrap();
        assert_eq!(
            target.upload_url,
            format!("/api/objects/upload/{}", target.object_id)
        );
        assert!(dir
            .path()
            .join("uploads")
            .join(format!("{}.pending", target.object_id))
            .exists());
    }

    #[tokio::test]
    async fn test_put_requires_allocated_target() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = store(&dir, 10);

        let stray = Uuid::new_v4().to_string();
        let err = store.put(&stray, "image/png", b"png").await.unwrap_err();
        assert!(matches!(err, PortalError::NotFound(_)));
        assert!(!dir.path().join("uploads").join(&stray).exists());

        let target = store.create_upload_target().await.unwrap();
        store.put(&target.object_id, "image/png", b"png").await.unwrap();
        // 确认前可以重传
        store.put(&target.object_id, "image/png", b"png2").await.unwrap();

        store.finalize_image(&target.upload_url).await.unwrap();
        let err = store
            .put(&target.object_id, "image/png", b"swap")
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::NotFound(_)));
        let object = store
            .get(&format!("uploads/{}", target.object_id))
            .await
            .unwrap();
        assert_eq!(object.bytes, b"png2");
    }

    #[tokio::test]
    async fn test_finalize_rejects_oversized_image() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = store(&dir, 4);

        let target = store.create_upload_target().await.unwrap();
        store
            .put(&target.object_id, "image/png", b"12345")
            .await
            .unwrap();

        let err = store.finalize_image(&target.upload_url).await.unwrap_err();
        assert!(matches!(err, PortalError::Validation(_)));

        let err = store
            .get(&format!("uploads/{}", target.object_id))
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::NotFound(_)));
        // 占位一并清除，地址不能再用
        let err = store
            .put(&target.object_id, "image/png", b"1234")
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_finalize_accepts_image_at_limit() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = store(&dir, 4);

        let target = store.create_upload_target().await.unwrap();
        store
            .put(&target.object_id, "image/png", b"1234")
            .await
            .unwrap();

        let path = store.finalize_image(&target.upload_url).await.unwrap();
        assert_eq!(path, format!("/objects/uploads/{}", target.object_id));
        let object = store
            .get(&format!("uploads/{}", target.object_id))
            .await
            .unwrap();
        assert_eq!(object.metadata.visibility, Visibility::Public);
        assert_eq!(object.metadata.size, 4);
    }
}
