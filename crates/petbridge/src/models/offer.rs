//! Offer model, embedded in Carer documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Offer status values, mirroring the owning request's status string
pub mod offer_status {
    pub const PENDING: &str = "pending";
    pub const ACCEPTED: &str = "accepted";
    pub const REJECTED: &str = "rejected";
    pub const CANCELLED: &str = "cancelled";
}

/// Offer embedded document. References a request by id inside some owner
/// document; the two status fields are kept in step by independent writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: String,
    pub request_id: String,
    pub owner_id: String,
    /// true when the owner addressed this carer directly,
    /// false when the carer applied to an open request
    #[serde(default)]
    pub direct: bool,
    pub status: String,
    pub message: Option<String>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    pub fn new(request_id: &str, owner_id: &str, direct: bool, message: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            request_id: request_id.to_string(),
            owner_id: owner_id.to_string(),
            direct,
            status: offer_status::PENDING.to_string(),
            message,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Offer for API responses
#[derive(Debug, Clone, Serialize)]
pub struct OfferView {
    pub id: String,
    #[serde(rename = "requestId")]
    pub request_id: String,
    #[serde(rename = "ownerId")]
    pub owner_id: String,
    pub direct: bool,
    pub status: String,
    pub message: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<Offer> for OfferView {
    fn from(o: Offer) -> Self {
        Self {
            id: o.id,
            request_id: o.request_id,
            owner_id: o.owner_id,
            direct: o.direct,
            status: o.status,
            message: o.message,
            created_at: o.created_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_offer_starts_pending() {
        let offer = Offer::new("r1", "o1", true, None);
        assert_eq!(offer.status, offer_status::PENDING);
        assert!(offer.direct);
        assert_eq!(offer.request_id, "r1");
        assert!(!offer.id.is_empty());
    }

    #[test]
    fn test_applied_offer_not_direct() {
        let offer = Offer::new("r2", "o1", false, Some("I can help".to_string()));
        assert!(!offer.direct);
        assert_eq!(offer.message.as_deref(), Some("I can help"));
    }
}
