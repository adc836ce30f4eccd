//! Carer CRUD service, including availability and discovery filters

use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_bson, Document};
use mongodb::options::FindOptions;

use crate::db::{collections, MongoDb};
use crate::error::{Error, Result};
use crate::models::{
    AddUnavailabilityRequest, Carer, CarerSummary, PaginatedResponse, UnavailabilityView,
    UpdateCarerRequest,
};

/// Optional discovery filters for carer listings
#[derive(Debug, Default, Clone)]
pub struct CarerFilter {
    /// Keep carers whose preferred pet types include this type (or who state
    /// no preference at all)
    pub pet_type: Option<String>,
    /// Geo query: [longitude, latitude] plus a radius in meters
    pub near: Option<([f64; 2], f64)>,
}

/// Mean earth radius used by MongoDB's spherical geometry, in meters
const EARTH_RADIUS_M: f64 = 6_378_100.0;

/// Countable equivalent of a `$nearSphere` radius query. `$centerSphere`
/// takes its radius in radians
fn geo_within_filter(coords: &[f64; 2], max_distance_m: f64) -> Document {
    doc! {
        "$geoWithin": {
            "$centerSphere": [
                [coords[0], coords[1]],
                max_distance_m / EARTH_RADIUS_M,
            ],
        }
    }
}

pub struct CarerService {
    db: MongoDb,
}

impl CarerService {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }

    /// Fetch a carer document or fail with 404
    pub async fn get(&self, carer_id: &str) -> Result<Carer> {
        let oid = ObjectId::parse_str(carer_id)?;
        let coll = self.db.collection::<Carer>(collections::CARERS);
        coll.find_one(doc! { "_id": oid, "is_deleted": { "$ne": true } }, None)
            .await?
            .ok_or_else(|| Error::CarerNotFound(carer_id.to_string()))
    }

    /// List carers with pagination and optional discovery filters
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
        filter: CarerFilter,
    ) -> Result<PaginatedResponse<CarerSummary>> {
        let coll = self.db.collection::<Carer>(collections::CARERS);

        let mut base: Document = doc! { "is_deleted": { "$ne": true } };
        if let Some(pet_type) = &filter.pet_type {
            // No stated preference means "takes anything"
            base.insert(
                "$or",
                vec![
                    doc! { "preferred_pet_types": pet_type },
                    doc! { "preferred_pet_types": { "$size": 0 } },
                ],
            );
        }

        // $nearSphere cannot be counted, so the total uses an equivalent
        // $geoWithin sphere, which can
        let mut count_query = base.clone();
        let mut query = base;
        if let Some((coords, max_distance_m)) = &filter.near {
            count_query.insert("location", geo_within_filter(coords, *max_distance_m));
            query.insert(
                "location",
                doc! {
                    "$nearSphere": {
                        "$geometry": {
                            "type": "Point",
                            "coordinates": [coords[0], coords[1]],
                        },
                        "$maxDistance": max_distance_m,
                    }
                },
            );
        }

        let total = coll.count_documents(count_query, None).await?;

        let mut options = FindOptions::builder()
            .skip((page - 1) * limit)
            .limit(limit as i64)
            .build();
        if filter.near.is_none() {
            options.sort = Some(doc! { "created_at": -1 });
        }

        let carers: Vec<Carer> = coll.find(query, options).await?.try_collect().await?;
        let items: Vec<CarerSummary> = carers.into_iter().map(CarerSummary::from).collect();

        Ok(PaginatedResponse::new(items, total, page, limit))
    }

    /// Update a carer profile, only touching the provided fields
    pub async fn update(&self, carer_id: &str, req: UpdateCarerRequest) -> Result<Carer> {
        let oid = ObjectId::parse_str(carer_id)?;
        let coll = self.db.collection::<Carer>(collections::CARERS);

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
        if let Some(skills) = req.skills {
            set.insert("skills", skills);
        }
        if let Some(rate) = req.hourly_rate {
            set.insert("hourly_rate", rate);
        }
        if let Some(types) = req.preferred_pet_types {
            set.insert("preferred_pet_types", types);
        }
        if let Some(sizes) = req.preferred_pet_sizes {
            set.insert("preferred_pet_sizes", sizes);
        }
        if let Some(licences) = req.licences {
            set.insert("licences", licences);
        }

        let result = coll
            .update_one(
                doc! { "_id": oid, "is_deleted": { "$ne": true } },
                doc! { "$set": set },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(Error::CarerNotFound(carer_id.to_string()));
        }

        self.get(carer_id).await
    }

    /// Soft-delete a carer
    pub async fn delete(&self, carer_id: &str) -> Result<()> {
        let oid = ObjectId::parse_str(carer_id)?;
        let coll = self.db.collection::<Carer>(collections::CARERS);
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
            return Err(Error::CarerNotFound(carer_id.to_string()));
        }
        Ok(())
    }

    /// Record a date range during which the carer is unavailable
    pub async fn add_unavailability(
        &self,
        carer_id: &str,
        req: AddUnavailabilityRequest,
    ) -> Result<UnavailabilityView> {
        let oid = ObjectId::parse_str(carer_id)?;
        let range = req.into_range();
        let coll = self.db.collection::<Carer>(collections::CARERS);
        let result = coll
            .update_one(
                doc! { "_id": oid, "is_deleted": { "$ne": true } },
                doc! { "$push": { "unavailability": to_bson(&range)? } },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(Error::CarerNotFound(carer_id.to_string()));
        }
        Ok(UnavailabilityView::from(range))
    }

    /// Remove an unavailability range by id
    pub async fn remove_unavailability(&self, carer_id: &str, range_id: &str) -> Result<()> {
        let oid = ObjectId::parse_str(carer_id)?;
        let coll = self.db.collection::<Carer>(collections::CARERS);
        let result = coll
            .update_one(
                doc! { "_id": oid, "unavailability.id": range_id },
                doc! { "$pull": { "unavailability": { "id": range_id } } },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(Error::UnavailabilityNotFound(range_id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::Bson;

    #[test]
    fn test_geo_within_radius_is_radians() {
        let filter = geo_within_filter(&[151.2, -33.87], 10_000.0);
        let sphere = filter
            .get_document("$geoWithin")
            .unwrap()
            .get_array("$centerSphere")
            .unwrap();

        let center = match &sphere[0] {
            Bson::Array(values) => values,
            other => panic!("expected coordinate pair, got {:?}", other),
        };
        assert_eq!(center[0], Bson::Double(151.2));
        assert_eq!(center[1], Bson::Double(-33.87));

        let radius = match &sphere[1] {
            Bson::Double(r) => *r,
            other => panic!("expected radius, got {:?}", other),
        };
        assert!((radius - 10_000.0 / EARTH_RADIUS_M).abs() < f64::EPSILON);
        assert!(radius < 0.002, "10km should be a small fraction of a radian");
    }
}
