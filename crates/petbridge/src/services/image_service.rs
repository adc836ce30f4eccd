//! Image storage: metadata in MongoDB, bytes in a filesystem blob store

use std::path::{Path, PathBuf};

use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId};

use crate::db::{collections, MongoDb};
use crate::error::{Error, Result};
use crate::models::{ImageDoc, ImageView};

/// Filesystem blob store. Blobs are keyed by the image document's hex id;
/// nothing else about the layout is significant.
#[derive(Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the storage directory if missing
    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    pub async fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        tokio::fs::write(self.blob_path(key), bytes).await?;
        Ok(())
    }

    pub async fn read(&self, key: &str) -> Result<Vec<u8>> {
        match tokio::fs::read(self.blob_path(key)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::ImageNotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.blob_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

pub struct ImageService {
    db: MongoDb,
    store: ImageStore,
}

impl ImageService {
    pub fn new(db: MongoDb, store: ImageStore) -> Self {
        Self { db, store }
    }

    /// Store an uploaded image: metadata document first, then the blob.
    /// The blob write failing leaves a metadata document without bytes;
    /// reads of it surface 404.
    pub async fn upload(
        &self,
        uploaded_by: &str,
        filename: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<ImageView> {
        let content_type = content_type
            .map(|ct| ct.to_string())
            .unwrap_or_else(|| {
                mime_guess::from_path(filename)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            });

        let mut image = ImageDoc {
            id: None,
            filename: filename.to_string(),
            content_type,
            size: bytes.len() as u64,
            uploaded_by: uploaded_by.to_string(),
            created_at: Utc::now(),
        };

        let coll = self.db.collection::<ImageDoc>(collections::IMAGES);
        let result = coll.insert_one(&image, None).await?;
        let oid = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| Error::Internal("Image insert returned no id".to_string()))?;
        image.id = Some(oid);

        self.store.write(&oid.to_hex(), &bytes).await?;

        Ok(ImageView::from(image))
    }

    /// Fetch metadata and bytes for serving
    pub async fn fetch(&self, image_id: &str) -> Result<(ImageDoc, Vec<u8>)> {
        let oid = ObjectId::parse_str(image_id)?;
        let coll = self.db.collection::<ImageDoc>(collections::IMAGES);
        let image = coll
            .find_one(doc! { "_id": oid }, None)
            .await?
            .ok_or_else(|| Error::ImageNotFound(image_id.to_string()))?;
        let bytes = self.store.read(&oid.to_hex()).await?;
        Ok((image, bytes))
    }

    /// Delete an image; only the uploader may remove it
    pub async fn delete(&self, image_id: &str, requested_by: &str) -> Result<()> {
        let oid = ObjectId::parse_str(image_id)?;
        let coll = self.db.collection::<ImageDoc>(collections::IMAGES);
        let image = coll
            .find_one(doc! { "_id": oid }, None)
            .await?
            .ok_or_else(|| Error::ImageNotFound(image_id.to_string()))?;
        if image.uploaded_by != requested_by {
            return Err(Error::PermissionDenied {
                action: "delete image".to_string(),
            });
        }

        coll.delete_one(doc! { "_id": oid }, None).await?;
        self.store.delete(&oid.to_hex()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_write_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());
        store.ensure_root().await.unwrap();

        store.write("abc123", b"png-bytes").await.unwrap();
        let bytes = store.read("abc123").await.unwrap();
        assert_eq!(bytes, b"png-bytes");

        store.delete("abc123").await.unwrap();
        let err = store.read("abc123").await.unwrap_err();
        assert!(matches!(err, Error::ImageNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_blob_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());
        store.ensure_root().await.unwrap();
        assert!(store.delete("never-existed").await.is_ok());
    }
}
