//! Common types and shared serde helpers for the document models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        let total_pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

/// GeoJSON point, stored under a 2dsphere index
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GeoPoint {
    #[serde(rename = "type", default = "point_type")]
    pub point_type: String,
    /// [longitude, latitude]
    #[validate(custom(function = "validate_coordinates"))]
    pub coordinates: [f64; 2],
}

fn point_type() -> String {
    "Point".to_string()
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            point_type: point_type(),
            coordinates: [longitude, latitude],
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

pub fn validate_coordinates(coords: &[f64; 2]) -> Result<(), validator::ValidationError> {
    let (lng, lat) = (coords[0], coords[1]);
    if !(-180.0..=180.0).contains(&lng) || !(-90.0..=90.0).contains(&lat) {
        return Err(validator::ValidationError::new("coordinates_out_of_range"));
    }
    Ok(())
}

/// Serde helper for `Option<DateTime<Utc>>` stored as BSON datetime.
/// Used by models that have optional datetime fields in MongoDB.
pub mod bson_datetime_option {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(dt) => {
                let bson_dt = bson::DateTime::from_chrono(*dt);
                Serialize::serialize(&bson_dt, serializer)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<bson::DateTime> = Option::deserialize(deserializer)?;
        Ok(opt.map(|dt| dt.to_chrono()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_math() {
        let page: PaginatedResponse<String> = PaginatedResponse::new(vec![], 0, 1, 20);
        assert_eq!(page.total_pages, 0);

        let page: PaginatedResponse<String> = PaginatedResponse::new(vec![], 41, 1, 20);
        assert_eq!(page.total_pages, 3);

        let page: PaginatedResponse<String> = PaginatedResponse::new(vec![], 40, 2, 20);
        assert_eq!(page.total_pages, 2);

        // Zero limit must not divide by zero
        let page: PaginatedResponse<String> = PaginatedResponse::new(vec![], 10, 1, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_geo_point_serde() {
        let point = GeoPoint::new(13.4050, 52.5200);
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["type"], "Point");
        assert_eq!(json["coordinates"][0], 13.4050);

        let parsed: GeoPoint = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.longitude(), 13.4050);
        assert_eq!(parsed.latitude(), 52.5200);
    }

    #[test]
    fn test_optional_datetime_round_trip() {
        use chrono::{DateTime, TimeZone, Utc};
        use serde::Deserialize;

        #[derive(Serialize, Deserialize)]
        struct Stamped {
            #[serde(
                default,
                skip_serializing_if = "Option::is_none",
                with = "bson_datetime_option"
            )]
            last_login_at: Option<DateTime<Utc>>,
        }

        let stamp = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        let doc = bson::to_document(&Stamped {
            last_login_at: Some(stamp),
        })
        .unwrap();
        assert!(matches!(
            doc.get("last_login_at"),
            Some(bson::Bson::DateTime(_))
        ));
        let back: Stamped = bson::from_document(doc).unwrap();
        assert_eq!(back.last_login_at, Some(stamp));

        // None is skipped on write and defaulted on read
        let doc = bson::to_document(&Stamped {
            last_login_at: None,
        })
        .unwrap();
        assert!(doc.get("last_login_at").is_none());
        let back: Stamped = bson::from_document(doc).unwrap();
        assert!(back.last_login_at.is_none());
    }

    #[test]
    fn test_coordinate_bounds() {
        assert!(validate_coordinates(&[13.4, 52.5]).is_ok());
        assert!(validate_coordinates(&[-180.0, 90.0]).is_ok());
        assert!(validate_coordinates(&[181.0, 0.0]).is_err());
        assert!(validate_coordinates(&[0.0, -91.0]).is_err());
    }
}
