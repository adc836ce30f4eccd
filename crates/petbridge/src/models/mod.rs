//! Document models for the PetBridge collections

pub mod carer;
pub mod common;
pub mod feedback;
pub mod image;
pub mod offer;
pub mod owner;
pub mod pet;
pub mod request;
pub mod user;

pub use carer::{
    AddUnavailabilityRequest, Carer, CarerSummary, Unavailability, UnavailabilityView,
    UpdateCarerRequest,
};
pub use common::{bson_datetime_option, GeoPoint, PaginatedResponse};
pub use feedback::{
    average_rating, Comment, CommentView, CreateCommentRequest, CreateFeedbackRequest, Feedback,
    FeedbackView,
};
pub use image::{ImageDoc, ImageView};
pub use offer::{offer_status, Offer, OfferView};
pub use owner::{Owner, OwnerSummary, UpdateOwnerRequest};
pub use pet::{pet_sizes, pet_types, CreatePetRequest, Pet, PetView, UpdatePetRequest};
pub use request::{
    request_status, CareRequest, CreateCareRequest, OpenRequestView, RequestView,
};
pub use user::{Notification, NotificationView, UserSummary};
