//! Pet model, embedded in Owner documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::feedback::{Feedback, FeedbackView};

/// Accepted pet types
pub mod pet_types {
    pub const ALL: [&str; 5] = ["dog", "cat", "bird", "rabbit", "other"];
}

/// Accepted pet sizes
pub mod pet_sizes {
    pub const ALL: [&str; 3] = ["small", "medium", "large"];
}

pub fn validate_pet_type(value: &str) -> Result<(), validator::ValidationError> {
    if pet_types::ALL.contains(&value) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("unknown_pet_type"))
    }
}

pub fn validate_pet_size(value: &str) -> Result<(), validator::ValidationError> {
    if pet_sizes::ALL.contains(&value) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("unknown_pet_size"))
    }
}

/// Pet embedded document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    pub id: String,
    pub name: String,
    /// dog, cat, bird, rabbit, other
    pub pet_type: String,
    /// small, medium, large
    pub size: String,
    #[serde(default)]
    pub neutered: bool,
    #[serde(default)]
    pub vaccinated: bool,
    #[serde(default)]
    pub microchipped: bool,
    pub notes: Option<String>,
    pub image_id: Option<String>,
    #[serde(default)]
    pub feedbacks: Vec<Feedback>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Create pet request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePetRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(rename = "petType")]
    #[validate(custom(function = "validate_pet_type"))]
    pub pet_type: String,
    #[validate(custom(function = "validate_pet_size"))]
    pub size: String,
    #[serde(default)]
    pub neutered: bool,
    #[serde(default)]
    pub vaccinated: bool,
    #[serde(default)]
    pub microchipped: bool,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[serde(rename = "imageId")]
    pub image_id: Option<String>,
}

impl CreatePetRequest {
    pub fn into_pet(self) -> Pet {
        Pet {
            id: Uuid::new_v4().to_string(),
            name: self.name,
            pet_type: self.pet_type,
            size: self.size,
            neutered: self.neutered,
            vaccinated: self.vaccinated,
            microchipped: self.microchipped,
            notes: self.notes,
            image_id: self.image_id,
            feedbacks: vec![],
            created_at: Utc::now(),
        }
    }
}

/// Update pet request, all fields optional
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePetRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[serde(rename = "petType")]
    #[validate(custom(function = "validate_pet_type"))]
    pub pet_type: Option<String>,
    #[validate(custom(function = "validate_pet_size"))]
    pub size: Option<String>,
    pub neutered: Option<bool>,
    pub vaccinated: Option<bool>,
    pub microchipped: Option<bool>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[serde(rename = "imageId")]
    pub image_id: Option<String>,
}

/// Pet for API responses
#[derive(Debug, Clone, Serialize)]
pub struct PetView {
    pub id: String,
    pub name: String,
    #[serde(rename = "petType")]
    pub pet_type: String,
    pub size: String,
    pub neutered: bool,
    pub vaccinated: bool,
    pub microchipped: bool,
    pub notes: Option<String>,
    #[serde(rename = "imageId")]
    pub image_id: Option<String>,
    pub feedbacks: Vec<FeedbackView>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<Pet> for PetView {
    fn from(p: Pet) -> Self {
        Self {
            id: p.id,
            name: p.name,
            pet_type: p.pet_type,
            size: p.size,
            neutered: p.neutered,
            vaccinated: p.vaccinated,
            microchipped: p.microchipped,
            notes: p.notes,
            image_id: p.image_id,
            feedbacks: p.feedbacks.into_iter().map(FeedbackView::from).collect(),
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pet_type_validation() {
        assert!(validate_pet_type("dog").is_ok());
        assert!(validate_pet_type("rabbit").is_ok());
        assert!(validate_pet_type("dragon").is_err());
        assert!(validate_pet_type("").is_err());
        // Case sensitive on purpose: the API speaks lowercase
        assert!(validate_pet_type("Dog").is_err());
    }

    #[test]
    fn test_pet_size_validation() {
        assert!(validate_pet_size("small").is_ok());
        assert!(validate_pet_size("large").is_ok());
        assert!(validate_pet_size("huge").is_err());
    }

    #[test]
    fn test_create_pet_rejects_invalid_type() {
        let req = CreatePetRequest {
            name: "Rex".to_string(),
            pet_type: "dinosaur".to_string(),
            size: "large".to_string(),
            neutered: false,
            vaccinated: true,
            microchipped: false,
            notes: None,
            image_id: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_pet_valid() {
        let req = CreatePetRequest {
            name: "Rex".to_string(),
            pet_type: "dog".to_string(),
            size: "large".to_string(),
            neutered: true,
            vaccinated: true,
            microchipped: true,
            notes: Some("friendly".to_string()),
            image_id: None,
        };
        assert!(req.validate().is_ok());
        let pet = req.into_pet();
        assert_eq!(pet.pet_type, "dog");
        assert!(!pet.id.is_empty());
        assert!(pet.feedbacks.is_empty());
    }

    #[test]
    fn test_create_pet_rejects_empty_name() {
        let req = CreatePetRequest {
            name: String::new(),
            pet_type: "cat".to_string(),
            size: "small".to_string(),
            neutered: false,
            vaccinated: false,
            microchipped: false,
            notes: None,
            image_id: None,
        };
        assert!(req.validate().is_err());
    }
}
