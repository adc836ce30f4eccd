//! Care request model, embedded in Owner documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request status values. Plain strings mutated by direct document updates;
/// the lifecycle is not enforced in-process.
pub mod request_status {
    pub const PENDING: &str = "pending";
    pub const ACCEPTED: &str = "accepted";
    pub const REJECTED: &str = "rejected";
    pub const CANCELLED: &str = "cancelled";
}

/// Care request embedded document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareRequest {
    pub id: String,
    pub pet_ids: Vec<String>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub end_date: DateTime<Utc>,
    pub message: Option<String>,
    /// Set when the owner addresses a specific carer directly
    pub carer_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub respondent_ids: Vec<String>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Create care request payload
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_date_order"))]
pub struct CreateCareRequest {
    #[serde(rename = "petIds")]
    #[validate(length(min = 1))]
    pub pet_ids: Vec<String>,
    #[serde(rename = "startDate")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "endDate")]
    pub end_date: DateTime<Utc>,
    #[validate(length(max = 2000))]
    pub message: Option<String>,
    /// Direct offer target
    #[serde(rename = "carerId")]
    pub carer_id: Option<String>,
}

pub fn validate_date_order(req: &CreateCareRequest) -> Result<(), validator::ValidationError> {
    if req.end_date <= req.start_date {
        return Err(validator::ValidationError::new("end_before_start"));
    }
    Ok(())
}

impl CreateCareRequest {
    pub fn into_request(self) -> CareRequest {
        let now = Utc::now();
        CareRequest {
            id: Uuid::new_v4().to_string(),
            pet_ids: self.pet_ids,
            start_date: self.start_date,
            end_date: self.end_date,
            message: self.message,
            carer_id: self.carer_id,
            status: request_status::PENDING.to_string(),
            respondent_ids: vec![],
            created_at: now,
            updated_at: now,
        }
    }
}

/// Care request for API responses
#[derive(Debug, Clone, Serialize)]
pub struct RequestView {
    pub id: String,
    #[serde(rename = "petIds")]
    pub pet_ids: Vec<String>,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
    pub message: Option<String>,
    #[serde(rename = "carerId")]
    pub carer_id: Option<String>,
    pub status: String,
    #[serde(rename = "respondentIds")]
    pub respondent_ids: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<CareRequest> for RequestView {
    fn from(r: CareRequest) -> Self {
        Self {
            id: r.id,
            pet_ids: r.pet_ids,
            start_date: r.start_date.to_rfc3339(),
            end_date: r.end_date.to_rfc3339(),
            message: r.message,
            carer_id: r.carer_id,
            status: r.status,
            respondent_ids: r.respondent_ids,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// Open request listing for carers, carrying the posting owner
#[derive(Debug, Clone, Serialize)]
pub struct OpenRequestView {
    #[serde(rename = "ownerId")]
    pub owner_id: String,
    #[serde(rename = "ownerName")]
    pub owner_name: String,
    #[serde(flatten)]
    pub request: RequestView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_request() -> CreateCareRequest {
        let start = Utc::now();
        CreateCareRequest {
            pet_ids: vec!["p1".to_string()],
            start_date: start,
            end_date: start + Duration::days(3),
            message: None,
            carer_id: None,
        }
    }

    #[test]
    fn test_valid_request() {
        let req = base_request();
        assert!(req.validate().is_ok());
        let request = req.into_request();
        assert_eq!(request.status, request_status::PENDING);
        assert!(request.respondent_ids.is_empty());
    }

    #[test]
    fn test_end_before_start_rejected() {
        let mut req = base_request();
        req.end_date = req.start_date - Duration::hours(1);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_equal_dates_rejected() {
        let mut req = base_request();
        req.end_date = req.start_date;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_empty_pets_rejected() {
        let mut req = base_request();
        req.pet_ids.clear();
        assert!(req.validate().is_err());
    }
}
