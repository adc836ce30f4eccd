//! Persistence services over MongoDB

pub mod carer_service;
pub mod feedback_service;
pub mod image_service;
pub mod offer_service;
pub mod owner_service;
pub mod pet_service;
pub mod request_service;
pub mod user_service;

pub use carer_service::{CarerFilter, CarerService};
pub use feedback_service::FeedbackService;
pub use image_service::{ImageService, ImageStore};
pub use offer_service::OfferService;
pub use owner_service::OwnerService;
pub use pet_service::PetService;
pub use request_service::RequestService;
pub use user_service::UserService;
