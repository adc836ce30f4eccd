//! Owner CRUD service

use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_bson};
use mongodb::options::FindOptions;

use crate::db::{collections, MongoDb};
use crate::error::{Error, Result};
use crate::models::{Owner, OwnerSummary, PaginatedResponse, UpdateOwnerRequest};

pub struct OwnerService {
    db: MongoDb,
}

impl OwnerService {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }

    /// Fetch an owner document or fail with 404
    pub async fn get(&self, owner_id: &str) -> Result<Owner> {
        let oid = ObjectId::parse_str(owner_id)?;
        let coll = self.db.collection::<Owner>(collections::OWNERS);
        coll.find_one(doc! { "_id": oid, "is_deleted": { "$ne": true } }, None)
            .await?
            .ok_or_else(|| Error::OwnerNotFound(owner_id.to_string()))
    }

    /// List owners with pagination
    pub async fn list(&self, page: u64, limit: u64) -> Result<PaginatedResponse<OwnerSummary>> {
        let coll = self.db.collection::<Owner>(collections::OWNERS);
        let filter = doc! { "is_deleted": { "$ne": true } };

        let total = coll.count_documents(filter.clone(), None).await?;
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .skip((page - 1) * limit)
            .limit(limit as i64)
            .build();

        let owners: Vec<Owner> = coll.find(filter, options).await?.try_collect().await?;
        let items = owners.into_iter().map(OwnerSummary::from).collect();

        Ok(PaginatedResponse::new(items, total, page, limit))
    }

    /// Update an owner profile, only touching the provided fields
    pub async fn update(&self, owner_id: &str, req: UpdateOwnerRequest) -> Result<Owner> {
        let oid = ObjectId::parse_str(owner_id)?;
        let coll = self.db.collection::<Owner>(collections::OWNERS);

        let mut set = doc! { "updated_at": bson::DateTime::from_chrono(Utc::now()) };
        if let Some(name) = req.display_name {
            set.insert("display_name", name);
        }
        if let Some(phone) = req.phone {
            set.insert("phone", phone);
        }
        if let Some(address) = req.address {
            set.insert("address", address);
        }
        if let Some(location) = req.location {
            set.insert("location", to_bson(&location)?);
        }
        if let Some(image_id) = req.avatar_image_id {
            set.insert("avatar_image_id", image_id);
        }

        let result = coll
            .update_one(
                doc! { "_id": oid, "is_deleted": { "$ne": true } },
                doc! { "$set": set },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(Error::OwnerNotFound(owner_id.to_string()));
        }

        self.get(owner_id).await
    }

    /// Soft-delete an owner
    pub async fn delete(&self, owner_id: &str) -> Result<()> {
        let oid = ObjectId::parse_str(owner_id)?;
        let coll = self.db.collection::<Owner>(collections::OWNERS);
        let result = coll
            .update_one(
                doc! { "_id": oid, "is_deleted": { "$ne": true } },
                doc! { "$set": {
                    "is_deleted": true,
                    "updated_at": bson::DateTime::from_chrono(Utc::now()),
                } },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(Error::OwnerNotFound(owner_id.to_string()));
        }
        Ok(())
    }
}
