//! Pet service - pets live embedded in their owner's document

use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId, to_bson};

use crate::db::{collections, MongoDb};
use crate::error::{Error, Result};
use crate::models::{CreatePetRequest, Owner, Pet, PetView, UpdatePetRequest};

pub struct PetService {
    db: MongoDb,
}

impl PetService {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }

    /// List an owner's pets
    pub async fn list(&self, owner_id: &str) -> Result<Vec<PetView>> {
        let oid = ObjectId::parse_str(owner_id)?;
        let coll = self.db.collection::<Owner>(collections::OWNERS);
        let owner = coll
            .find_one(doc! { "_id": oid, "is_deleted": { "$ne": true } }, None)
            .await?
            .ok_or_else(|| Error::OwnerNotFound(owner_id.to_string()))?;
        Ok(owner.pets.into_iter().map(PetView::from).collect())
    }

    /// Add a pet to an owner's document
    pub async fn add(&self, owner_id: &str, req: CreatePetRequest) -> Result<PetView> {
        let oid = ObjectId::parse_str(owner_id)?;
        let pet = req.into_pet();
        let coll = self.db.collection::<Owner>(collections::OWNERS);
        let result = coll
            .update_one(
                doc! { "_id": oid, "is_deleted": { "$ne": true } },
                doc! {
                    "$push": { "pets": to_bson(&pet)? },
                    "$set": { "updated_at": bson::DateTime::from_chrono(Utc::now()) },
                },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(Error::OwnerNotFound(owner_id.to_string()));
        }
        Ok(PetView::from(pet))
    }

    /// Update a pet in place via the positional operator
    pub async fn update(
        &self,
        owner_id: &str,
        pet_id: &str,
        req: UpdatePetRequest,
    ) -> Result<PetView> {
        let oid = ObjectId::parse_str(owner_id)?;
        let coll = self.db.collection::<Owner>(collections::OWNERS);

        let mut set = doc! { "updated_at": bson::DateTime::from_chrono(Utc::now()) };
        if let Some(name) = req.name {
            set.insert("pets.$.name", name);
        }
        if let Some(pet_type) = req.pet_type {
            set.insert("pets.$.pet_type", pet_type);
        }
        if let Some(size) = req.size {
            set.insert("pets.$.size", size);
        }
        if let Some(neutered) = req.neutered {
            set.insert("pets.$.neutered", neutered);
        }
        if let Some(vaccinated) = req.vaccinated {
            set.insert("pets.$.vaccinated", vaccinated);
        }
        if let Some(microchipped) = req.microchipped {
            set.insert("pets.$.microchipped", microchipped);
        }
        if let Some(notes) = req.notes {
            set.insert("pets.$.notes", notes);
        }
        if let Some(image_id) = req.image_id {
            set.insert("pets.$.image_id", image_id);
        }

        let result = coll
            .update_one(
                doc! { "_id": oid, "pets.id": pet_id },
                doc! { "$set": set },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(Error::PetNotFound(pet_id.to_string()));
        }

        let (_, pet) = self.find(pet_id).await?;
        Ok(PetView::from(pet))
    }

    /// Remove a pet from its owner's document
    pub async fn remove(&self, owner_id: &str, pet_id: &str) -> Result<()> {
        let oid = ObjectId::parse_str(owner_id)?;
        let coll = self.db.collection::<Owner>(collections::OWNERS);
        let result = coll
            .update_one(
                doc! { "_id": oid, "pets.id": pet_id },
                doc! {
                    "$pull": { "pets": { "id": pet_id } },
                    "$set": { "updated_at": bson::DateTime::from_chrono(Utc::now()) },
                },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(Error::PetNotFound(pet_id.to_string()));
        }
        Ok(())
    }

    /// Resolve a pet by id across all owners
    pub async fn find(&self, pet_id: &str) -> Result<(String, Pet)> {
        let coll = self.db.collection::<Owner>(collections::OWNERS);
        let owner = coll
            .find_one(
                doc! { "pets.id": pet_id, "is_deleted": { "$ne": true } },
                None,
            )
            .await?
            .ok_or_else(|| Error::PetNotFound(pet_id.to_string()))?;
        let owner_id = owner.id.map(|id| id.to_hex()).unwrap_or_default();
        let pet = owner
            .pets
            .into_iter()
            .find(|p| p.id == pet_id)
            .ok_or_else(|| Error::PetNotFound(pet_id.to_string()))?;
        Ok((owner_id, pet))
    }
}
