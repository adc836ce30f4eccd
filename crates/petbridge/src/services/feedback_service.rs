//! Feedback service for owners, carers, and pets
//!
//! Feedback lives as embedded lists; pet feedback sits one level deeper
//! inside the owner's pets array and is addressed with array filters.

use mongodb::bson::{doc, oid::ObjectId, to_bson, Document};
use mongodb::options::UpdateOptions;

use crate::db::{collections, MongoDb};
use crate::error::{Error, Result};
use crate::models::{Comment, CreateCommentRequest, CreateFeedbackRequest, Feedback, FeedbackView};
use crate::services::UserService;
use crate::AuthUser;

pub struct FeedbackService {
    db: MongoDb,
}

impl FeedbackService {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }

    /// Append feedback to an owner or carer document
    pub async fn add_to_user(
        &self,
        collection: &str,
        user_id: &str,
        author: &AuthUser,
        req: CreateFeedbackRequest,
    ) -> Result<FeedbackView> {
        let oid = ObjectId::parse_str(user_id)?;
        let feedback = req.into_feedback(&author.user_id, &author.role);
        let coll = self.db.collection::<Document>(collection);
        let result = coll
            .update_one(
                doc! { "_id": oid, "is_deleted": { "$ne": true } },
                doc! { "$push": { "feedbacks": to_bson(&feedback)? } },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(user_not_found(collection, user_id));
        }

        if let Err(e) = UserService::new(self.db.clone())
            .push_notification(user_id, "feedback_received", "You received new feedback".to_string())
            .await
        {
            tracing::warn!("Failed to notify user of feedback: {}", e);
        }

        Ok(FeedbackView::from(feedback))
    }

    /// Record that a user liked a feedback entry; liking twice is a no-op
    pub async fn like_user_feedback(
        &self,
        collection: &str,
        user_id: &str,
        feedback_id: &str,
        liker_id: &str,
    ) -> Result<()> {
        let oid = ObjectId::parse_str(user_id)?;
        let coll = self.db.collection::<Document>(collection);
        let result = coll
            .update_one(
                doc! { "_id": oid, "feedbacks.id": feedback_id },
                doc! { "$addToSet": { "feedbacks.$.liked_by": liker_id } },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(Error::FeedbackNotFound(feedback_id.to_string()));
        }
        Ok(())
    }

    /// Append a nested comment to a feedback entry
    pub async fn comment_user_feedback(
        &self,
        collection: &str,
        user_id: &str,
        feedback_id: &str,
        author_id: &str,
        req: CreateCommentRequest,
    ) -> Result<Comment> {
        let oid = ObjectId::parse_str(user_id)?;
        let comment = req.into_comment(author_id);
        let coll = self.db.collection::<Document>(collection);
        let result = coll
            .update_one(
                doc! { "_id": oid, "feedbacks.id": feedback_id },
                doc! { "$push": { "feedbacks.$.comments": to_bson(&comment)? } },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(Error::FeedbackNotFound(feedback_id.to_string()));
        }
        Ok(comment)
    }

    /// Append feedback to a pet, resolved by pet id across all owners
    pub async fn add_to_pet(
        &self,
        pet_id: &str,
        author: &AuthUser,
        req: CreateFeedbackRequest,
    ) -> Result<FeedbackView> {
        let feedback = req.into_feedback(&author.user_id, &author.role);
        let coll = self.db.collection::<Document>(collections::OWNERS);
        let result = coll
            .update_one(
                doc! { "pets.id": pet_id, "is_deleted": { "$ne": true } },
                doc! { "$push": { "pets.$[p].feedbacks": to_bson(&feedback)? } },
                UpdateOptions::builder()
                    .array_filters(vec![doc! { "p.id": pet_id }])
                    .build(),
            )
            .await?;
        if result.matched_count == 0 {
            return Err(Error::PetNotFound(pet_id.to_string()));
        }
        Ok(FeedbackView::from(feedback))
    }

    /// Like a pet's feedback entry
    pub async fn like_pet_feedback(
        &self,
        pet_id: &str,
        feedback_id: &str,
        liker_id: &str,
    ) -> Result<()> {
        let coll = self.db.collection::<Document>(collections::OWNERS);
        let result = coll
            .update_one(
                doc! { "pets": { "$elemMatch": {
                    "id": pet_id,
                    "feedbacks.id": feedback_id,
                } } },
                doc! { "$addToSet": {
                    "pets.$[p].feedbacks.$[f].liked_by": liker_id,
                } },
                UpdateOptions::builder()
                    .array_filters(vec![
                        doc! { "p.id": pet_id },
                        doc! { "f.id": feedback_id },
                    ])
                    .build(),
            )
            .await?;
        if result.matched_count == 0 {
            return Err(Error::FeedbackNotFound(feedback_id.to_string()));
        }
        Ok(())
    }

    /// Comment on a pet's feedback entry
    pub async fn comment_pet_feedback(
        &self,
        pet_id: &str,
        feedback_id: &str,
        author_id: &str,
        req: CreateCommentRequest,
    ) -> Result<Comment> {
        let comment = req.into_comment(author_id);
        let coll = self.db.collection::<Document>(collections::OWNERS);
        let result = coll
            .update_one(
                doc! { "pets": { "$elemMatch": {
                    "id": pet_id,
                    "feedbacks.id": feedback_id,
                } } },
                doc! { "$push": {
                    "pets.$[p].feedbacks.$[f].comments": to_bson(&comment)?,
                } },
                UpdateOptions::builder()
                    .array_filters(vec![
                        doc! { "p.id": pet_id },
                        doc! { "f.id": feedback_id },
                    ])
                    .build(),
            )
            .await?;
        if result.matched_count == 0 {
            return Err(Error::FeedbackNotFound(feedback_id.to_string()));
        }
        Ok(comment)
    }

    /// List feedback on an owner or carer
    pub async fn list_for_user(
        &self,
        collection: &str,
        user_id: &str,
    ) -> Result<Vec<FeedbackView>> {
        let oid = ObjectId::parse_str(user_id)?;
        let coll = self.db.collection::<Document>(collection);
        let document = coll
            .find_one(doc! { "_id": oid, "is_deleted": { "$ne": true } }, None)
            .await?
            .ok_or_else(|| user_not_found(collection, user_id))?;

        let feedbacks: Vec<Feedback> = document
            .get_array("feedbacks")
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| bson::from_bson(entry.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        Ok(feedbacks.into_iter().map(FeedbackView::from).collect())
    }
}

fn user_not_found(collection: &str, user_id: &str) -> Error {
    if collection == collections::OWNERS {
        Error::OwnerNotFound(user_id.to_string())
    } else {
        Error::CarerNotFound(user_id.to_string())
    }
}
