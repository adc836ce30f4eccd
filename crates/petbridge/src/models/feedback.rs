//! Feedback and nested comments, embedded on owners, carers, and pets

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Feedback embedded document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: String,
    pub author_id: String,
    /// "owner" or "carer"
    pub author_role: String,
    pub message: String,
    /// 1..=5
    pub rating: i32,
    #[serde(default)]
    pub liked_by: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Comment nested in a feedback entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author_id: String,
    pub message: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Create feedback request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFeedbackRequest {
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
}

impl CreateFeedbackRequest {
    pub fn into_feedback(self, author_id: &str, author_role: &str) -> Feedback {
        Feedback {
            id: Uuid::new_v4().to_string(),
            author_id: author_id.to_string(),
            author_role: author_role.to_string(),
            message: self.message,
            rating: self.rating,
            liked_by: vec![],
            comments: vec![],
            created_at: Utc::now(),
        }
    }
}

/// Create comment request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
}

impl CreateCommentRequest {
    pub fn into_comment(self, author_id: &str) -> Comment {
        Comment {
            id: Uuid::new_v4().to_string(),
            author_id: author_id.to_string(),
            message: self.message,
            created_at: Utc::now(),
        }
    }
}

/// Feedback for API responses
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackView {
    pub id: String,
    #[serde(rename = "authorId")]
    pub author_id: String,
    #[serde(rename = "authorRole")]
    pub author_role: String,
    pub message: String,
    pub rating: i32,
    pub likes: usize,
    pub comments: Vec<CommentView>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<Feedback> for FeedbackView {
    fn from(f: Feedback) -> Self {
        Self {
            id: f.id,
            author_id: f.author_id,
            author_role: f.author_role,
            message: f.message,
            rating: f.rating,
            likes: f.liked_by.len(),
            comments: f.comments.into_iter().map(CommentView::from).collect(),
            created_at: f.created_at.to_rfc3339(),
        }
    }
}

/// Comment for API responses
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: String,
    #[serde(rename = "authorId")]
    pub author_id: String,
    pub message: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<Comment> for CommentView {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            author_id: c.author_id,
            message: c.message,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

/// Average rating over a feedback list, None when empty
pub fn average_rating(feedbacks: &[Feedback]) -> Option<f64> {
    if feedbacks.is_empty() {
        return None;
    }
    let sum: i64 = feedbacks.iter().map(|f| f.rating as i64).sum();
    Some(sum as f64 / feedbacks.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feedback(rating: i32) -> Feedback {
        CreateFeedbackRequest {
            message: "great".to_string(),
            rating,
        }
        .into_feedback("u1", "owner")
    }

    #[test]
    fn test_rating_range() {
        let ok = CreateFeedbackRequest {
            message: "great care".to_string(),
            rating: 5,
        };
        assert!(ok.validate().is_ok());

        let too_high = CreateFeedbackRequest {
            message: "great care".to_string(),
            rating: 6,
        };
        assert!(too_high.validate().is_err());

        let too_low = CreateFeedbackRequest {
            message: "great care".to_string(),
            rating: 0,
        };
        assert!(too_low.validate().is_err());
    }

    #[test]
    fn test_empty_message_rejected() {
        let req = CreateFeedbackRequest {
            message: String::new(),
            rating: 3,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_average_rating() {
        assert_eq!(average_rating(&[]), None);
        assert_eq!(average_rating(&[feedback(4)]), Some(4.0));
        assert_eq!(average_rating(&[feedback(2), feedback(5)]), Some(3.5));
    }

    #[test]
    fn test_view_counts_likes() {
        let mut f = feedback(5);
        f.liked_by = vec!["a".to_string(), "b".to_string()];
        let view = FeedbackView::from(f);
        assert_eq!(view.likes, 2);
    }
}
