//! Owner document model

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::common::{bson_datetime_option, GeoPoint};
use super::feedback::{average_rating, Feedback};
use super::pet::Pet;
use super::request::CareRequest;
use super::user::Notification;

/// Owner document. Pets and care requests are embedded, denormalized
/// document-store style; there is no referential integrity across
/// collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub location: Option<GeoPoint>,
    pub avatar_image_id: Option<String>,
    #[serde(default)]
    pub pets: Vec<Pet>,
    #[serde(default)]
    pub requests: Vec<CareRequest>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub feedbacks: Vec<Feedback>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "bson_datetime_option"
    )]
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Owner {
    pub fn new(email: &str, password_hash: &str, display_name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            display_name: display_name.to_string(),
            phone: None,
            address: None,
            location: None,
            avatar_image_id: None,
            pets: vec![],
            requests: vec![],
            notifications: vec![],
            feedbacks: vec![],
            is_deleted: false,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Update owner profile request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateOwnerRequest {
    #[serde(rename = "displayName")]
    #[validate(length(min = 1, max = 100))]
    pub display_name: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(length(max = 300))]
    pub address: Option<String>,
    #[validate(nested)]
    pub location: Option<GeoPoint>,
    #[serde(rename = "avatarImageId")]
    pub avatar_image_id: Option<String>,
}

/// Owner summary for list and detail views
#[derive(Debug, Clone, Serialize)]
pub struct OwnerSummary {
    pub id: String,
    pub email: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub location: Option<GeoPoint>,
    #[serde(rename = "avatarImageId")]
    pub avatar_image_id: Option<String>,
    #[serde(rename = "petCount")]
    pub pet_count: usize,
    #[serde(rename = "averageRating")]
    pub average_rating: Option<f64>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<Owner> for OwnerSummary {
    fn from(o: Owner) -> Self {
        Self {
            id: o.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: o.email,
            display_name: o.display_name,
            phone: o.phone,
            address: o.address,
            location: o.location,
            avatar_image_id: o.avatar_image_id,
            pet_count: o.pets.len(),
            average_rating: average_rating(&o.feedbacks),
            created_at: o.created_at.to_rfc3339(),
        }
    }
}
