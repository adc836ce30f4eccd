//! Image metadata model. Bytes live in the blob store, keyed by document id.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Image metadata document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    pub uploaded_by: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Image metadata for API responses
#[derive(Debug, Clone, Serialize)]
pub struct ImageView {
    pub id: String,
    pub filename: String,
    #[serde(rename = "contentType")]
    pub content_type: String,
    pub size: u64,
    #[serde(rename = "uploadedBy")]
    pub uploaded_by: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<ImageDoc> for ImageView {
    fn from(i: ImageDoc) -> Self {
        Self {
            id: i.id.map(|id| id.to_hex()).unwrap_or_default(),
            filename: i.filename,
            content_type: i.content_type,
            size: i.size,
            uploaded_by: i.uploaded_by,
            created_at: i.created_at.to_rfc3339(),
        }
    }
}
