//! Error types for the PetBridge domain

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error as ThisError;

/// Result type alias for domain operations
pub type Result<T> = std::result::Result<T, Error>;

/// Domain error types
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Owner not found: {0}")]
    OwnerNotFound(String),

    #[error("Carer not found: {0}")]
    CarerNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Pet not found: {0}")]
    PetNotFound(String),

    #[error("Request not found: {0}")]
    RequestNotFound(String),

    #[error("Offer not found: {0}")]
    OfferNotFound(String),

    #[error("Feedback not found: {0}")]
    FeedbackNotFound(String),

    #[error("Notification not found: {0}")]
    NotificationNotFound(String),

    #[error("Unavailability range not found: {0}")]
    UnavailabilityNotFound(String),

    #[error("Image not found: {0}")]
    ImageNotFound(String),

    #[error("Email already registered: {email}")]
    EmailTaken { email: String },

    #[error("Permission denied: {action}")]
    PermissionDenied { action: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<mongodb::error::Error> for Error {
    fn from(err: mongodb::error::Error) -> Self {
        Error::Database(err.to_string())
    }
}

impl From<bson::oid::Error> for Error {
    fn from(err: bson::oid::Error) -> Self {
        Error::Validation(format!("Invalid id: {}", err))
    }
}

impl From<bson::ser::Error> for Error {
    fn from(err: bson::ser::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<bson::de::Error> for Error {
    fn from(err: bson::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Error::Validation(err.to_string())
    }
}

/// API error response body
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl Error {
    /// Convert to API error code
    pub fn code(&self) -> &'static str {
        match self {
            Error::OwnerNotFound(_) => "OWNER_NOT_FOUND",
            Error::CarerNotFound(_) => "CARER_NOT_FOUND",
            Error::UserNotFound(_) => "USER_NOT_FOUND",
            Error::PetNotFound(_) => "PET_NOT_FOUND",
            Error::RequestNotFound(_) => "REQUEST_NOT_FOUND",
            Error::OfferNotFound(_) => "OFFER_NOT_FOUND",
            Error::FeedbackNotFound(_) => "FEEDBACK_NOT_FOUND",
            Error::NotificationNotFound(_) => "NOTIFICATION_NOT_FOUND",
            Error::UnavailabilityNotFound(_) => "UNAVAILABILITY_NOT_FOUND",
            Error::ImageNotFound(_) => "IMAGE_NOT_FOUND",
            Error::EmailTaken { .. } => "EMAIL_TAKEN",
            Error::PermissionDenied { .. } => "PERMISSION_DENIED",
            Error::Unauthorized(_) => "UNAUTHORIZED",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Database(_) => "DATABASE_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::Serialization(_) => "SERIALIZATION_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::OwnerNotFound(_)
            | Error::CarerNotFound(_)
            | Error::UserNotFound(_)
            | Error::PetNotFound(_)
            | Error::RequestNotFound(_)
            | Error::OfferNotFound(_)
            | Error::FeedbackNotFound(_)
            | Error::NotificationNotFound(_)
            | Error::UnavailabilityNotFound(_)
            | Error::ImageNotFound(_) => StatusCode::NOT_FOUND,

            Error::EmailTaken { .. } => StatusCode::CONFLICT,

            Error::PermissionDenied { .. } => StatusCode::FORBIDDEN,

            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,

            Error::Validation(_) => StatusCode::BAD_REQUEST,

            Error::Database(_)
            | Error::Io(_)
            | Error::Serialization(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Internal error: {}", self);
        }
        let body = ApiError {
            code: self.code().to_string(),
            message: self.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::PetNotFound("p1".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::Validation("bad rating".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::EmailTaken {
                email: "a@b.com".into()
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::PermissionDenied {
                action: "update owner".into()
            }
            .status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            Error::Unauthorized("missing token".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::Database("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::OfferNotFound("o1".into()).code(), "OFFER_NOT_FOUND");
        assert_eq!(Error::Validation("x".into()).code(), "VALIDATION_ERROR");
        assert_eq!(
            Error::EmailTaken {
                email: "a@b.com".into()
            }
            .code(),
            "EMAIL_TAKEN"
        );
    }
}
