//! Carer document model

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::common::{bson_datetime_option, GeoPoint};
use super::feedback::{average_rating, Feedback};
use super::offer::Offer;
use super::pet::{validate_pet_size, validate_pet_type};
use super::user::Notification;

/// Carer document. Offers are embedded; each references a request inside
/// some owner document by id only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Carer {
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
    pub skills: Vec<String>,
    #[serde(default)]
    pub hourly_rate: f64,
    #[serde(default)]
    pub offers: Vec<Offer>,
    #[serde(default)]
    pub unavailability: Vec<Unavailability>,
    #[serde(default)]
    pub preferred_pet_types: Vec<String>,
    #[serde(default)]
    pub preferred_pet_sizes: Vec<String>,
    #[serde(default)]
    pub licences: Vec<String>,
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

impl Carer {
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
            skills: vec![],
            hourly_rate: 0.0,
            offers: vec![],
            unavailability: vec![],
            preferred_pet_types: vec![],
            preferred_pet_sizes: vec![],
            licences: vec![],
            notifications: vec![],
            feedbacks: vec![],
            is_deleted: false,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Date range during which a carer is not taking requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unavailability {
    pub id: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub end_date: DateTime<Utc>,
}

/// Add unavailability range request
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_range_order"))]
pub struct AddUnavailabilityRequest {
    #[serde(rename = "startDate")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "endDate")]
    pub end_date: DateTime<Utc>,
}

pub fn validate_range_order(
    req: &AddUnavailabilityRequest,
) -> Result<(), validator::ValidationError> {
    if req.end_date <= req.start_date {
        return Err(validator::ValidationError::new("end_before_start"));
    }
    Ok(())
}

impl AddUnavailabilityRequest {
    pub fn into_range(self) -> Unavailability {
        Unavailability {
            id: Uuid::new_v4().to_string(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Unavailability range for API responses
#[derive(Debug, Clone, Serialize)]
pub struct UnavailabilityView {
    pub id: String,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
}

impl From<Unavailability> for UnavailabilityView {
    fn from(u: Unavailability) -> Self {
        Self {
            id: u.id,
            start_date: u.start_date.to_rfc3339(),
            end_date: u.end_date.to_rfc3339(),
        }
    }
}

/// Update carer profile request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCarerRequest {
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
    pub skills: Option<Vec<String>>,
    #[serde(rename = "hourlyRate")]
    #[validate(range(min = 0.0))]
    pub hourly_rate: Option<f64>,
    #[serde(rename = "preferredPetTypes")]
    #[validate(custom(function = "validate_pet_type_list"))]
    pub preferred_pet_types: Option<Vec<String>>,
    #[serde(rename = "preferredPetSizes")]
    #[validate(custom(function = "validate_pet_size_list"))]
    pub preferred_pet_sizes: Option<Vec<String>>,
    pub licences: Option<Vec<String>>,
}

pub fn validate_pet_type_list(values: &[String]) -> Result<(), validator::ValidationError> {
    for v in values {
        validate_pet_type(v)?;
    }
    Ok(())
}

pub fn validate_pet_size_list(values: &[String]) -> Result<(), validator::ValidationError> {
    for v in values {
        validate_pet_size(v)?;
    }
    Ok(())
}

/// Carer summary for list and detail views
#[derive(Debug, Clone, Serialize)]
pub struct CarerSummary {
    pub id: String,
    pub email: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub location: Option<GeoPoint>,
    #[serde(rename = "avatarImageId")]
    pub avatar_image_id: Option<String>,
    pub skills: Vec<String>,
    #[serde(rename = "hourlyRate")]
    pub hourly_rate: f64,
    #[serde(rename = "preferredPetTypes")]
    pub preferred_pet_types: Vec<String>,
    #[serde(rename = "preferredPetSizes")]
    pub preferred_pet_sizes: Vec<String>,
    pub licences: Vec<String>,
    #[serde(rename = "averageRating")]
    pub average_rating: Option<f64>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<Carer> for CarerSummary {
    fn from(c: Carer) -> Self {
        Self {
            id: c.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: c.email,
            display_name: c.display_name,
            phone: c.phone,
            address: c.address,
            location: c.location,
            avatar_image_id: c.avatar_image_id,
            skills: c.skills,
            hourly_rate: c.hourly_rate,
            preferred_pet_types: c.preferred_pet_types,
            preferred_pet_sizes: c.preferred_pet_sizes,
            licences: c.licences,
            average_rating: average_rating(&c.feedbacks),
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_unavailability_range_order() {
        let start = Utc::now();
        let ok = AddUnavailabilityRequest {
            start_date: start,
            end_date: start + Duration::days(2),
        };
        assert!(ok.validate().is_ok());

        let bad = AddUnavailabilityRequest {
            start_date: start,
            end_date: start - Duration::days(2),
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_preferred_pet_type_list_validation() {
        assert!(validate_pet_type_list(&["dog".to_string(), "cat".to_string()]).is_ok());
        assert!(validate_pet_type_list(&["dog".to_string(), "pony".to_string()]).is_err());
        assert!(validate_pet_size_list(&["small".to_string()]).is_ok());
        assert!(validate_pet_size_list(&["tiny".to_string()]).is_err());
    }
}
