//! Role-agnostic user lookups and embedded notifications

use mongodb::bson::{doc, oid::ObjectId, to_bson};

use crate::db::{collections, MongoDb};
use crate::error::{Error, Result};
use crate::models::{Carer, Notification, NotificationView, Owner, UserSummary};

pub struct UserService {
    db: MongoDb,
}

impl UserService {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }

    /// Public profile from either collection, owners probed first
    pub async fn get_summary(&self, user_id: &str) -> Result<UserSummary> {
        let oid = ObjectId::parse_str(user_id)?;
        let filter = doc! { "_id": oid, "is_deleted": { "$ne": true } };

        let owners = self.db.collection::<Owner>(collections::OWNERS);
        if let Some(owner) = owners.find_one(filter.clone(), None).await? {
            return Ok(UserSummary::from(owner));
        }

        let carers = self.db.collection::<Carer>(collections::CARERS);
        if let Some(carer) = carers.find_one(filter, None).await? {
            return Ok(UserSummary::from(carer));
        }

        Err(Error::UserNotFound(user_id.to_string()))
    }

    /// List a user's notifications, newest first
    pub async fn notifications(&self, user_id: &str) -> Result<Vec<NotificationView>> {
        let oid = ObjectId::parse_str(user_id)?;
        let filter = doc! { "_id": oid, "is_deleted": { "$ne": true } };

        let owners = self.db.collection::<Owner>(collections::OWNERS);
        if let Some(owner) = owners.find_one(filter.clone(), None).await? {
            return Ok(newest_first(owner.notifications));
        }

        let carers = self.db.collection::<Carer>(collections::CARERS);
        if let Some(carer) = carers.find_one(filter, None).await? {
            return Ok(newest_first(carer.notifications));
        }

        Err(Error::UserNotFound(user_id.to_string()))
    }

    /// Mark a notification as read
    pub async fn mark_notification_read(
        &self,
        user_id: &str,
        notification_id: &str,
    ) -> Result<()> {
        let oid = ObjectId::parse_str(user_id)?;
        let filter = doc! { "_id": oid, "notifications.id": notification_id };
        let update = doc! { "$set": { "notifications.$.read": true } };

        let owners = self
            .db
            .collection::<Owner>(collections::OWNERS)
            .update_one(filter.clone(), update.clone(), None)
            .await?;
        if owners.matched_count > 0 {
            return Ok(());
        }

        let carers = self
            .db
            .collection::<Carer>(collections::CARERS)
            .update_one(filter, update, None)
            .await?;
        if carers.matched_count > 0 {
            return Ok(());
        }

        Err(Error::NotificationNotFound(notification_id.to_string()))
    }

    /// Push a notification into whichever collection holds the user.
    /// Callers treat failures as non-fatal; notification delivery is
    /// best-effort.
    pub async fn push_notification(
        &self,
        user_id: &str,
        kind: &str,
        message: String,
    ) -> Result<()> {
        let oid = ObjectId::parse_str(user_id)?;
        let notification = Notification::new(kind, message);
        let update = doc! { "$push": { "notifications": to_bson(&notification)? } };
        let filter = doc! { "_id": oid, "is_deleted": { "$ne": true } };

        let owners = self
            .db
            .collection::<Owner>(collections::OWNERS)
            .update_one(filter.clone(), update.clone(), None)
            .await?;
        if owners.matched_count > 0 {
            return Ok(());
        }

        let carers = self
            .db
            .collection::<Carer>(collections::CARERS)
            .update_one(filter, update, None)
            .await?;
        if carers.matched_count > 0 {
            return Ok(());
        }

        Err(Error::UserNotFound(user_id.to_string()))
    }
}

fn newest_first(mut notifications: Vec<Notification>) -> Vec<NotificationView> {
    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    notifications
        .into_iter()
        .map(NotificationView::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first_ordering() {
        let older = Notification::new("offer_received", "first".to_string());
        let mut newer = Notification::new("offer_received", "second".to_string());
        newer.created_at = older.created_at + chrono::Duration::seconds(5);

        let views = newest_first(vec![older, newer]);
        assert_eq!(views[0].message, "second");
        assert_eq!(views[1].message, "first");
    }
}
