//! Shared user types: notifications and the role-agnostic profile view

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::carer::Carer;
use super::owner::Owner;

/// Notification embedded in a user document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    /// offer_received, respondent_applied, request_accepted, request_rejected, feedback_received
    pub kind: String,
    pub message: String,
    #[serde(default)]
    pub read: bool,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(kind: &str, message: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: kind.to_string(),
            message,
            read: false,
            created_at: Utc::now(),
        }
    }
}

/// Notification for API responses
#[derive(Debug, Clone, Serialize)]
pub struct NotificationView {
    pub id: String,
    pub kind: String,
    pub message: String,
    pub read: bool,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<Notification> for NotificationView {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            kind: n.kind,
            message: n.message,
            read: n.read,
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

/// Role-agnostic public profile, served from either collection
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    /// "owner" or "carer"
    pub role: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "avatarImageId")]
    pub avatar_image_id: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<Owner> for UserSummary {
    fn from(o: Owner) -> Self {
        Self {
            id: o.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: o.email,
            display_name: o.display_name,
            role: "owner".to_string(),
            phone: o.phone,
            address: o.address,
            avatar_image_id: o.avatar_image_id,
            created_at: o.created_at.to_rfc3339(),
        }
    }
}

impl From<Carer> for UserSummary {
    fn from(c: Carer) -> Self {
        Self {
            id: c.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: c.email,
            display_name: c.display_name,
            role: "carer".to_string(),
            phone: c.phone,
            address: c.address,
            avatar_image_id: c.avatar_image_id,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}
