//! Read-only GraphQL schema
//!
//! Exposes owners and carers (with their embedded pets, requests, offers,
//! and feedback) over the same database handle the REST layer uses. Writes
//! stay on the REST side.

use std::sync::Arc;

use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, Schema, SimpleObject};
use async_graphql_axum::GraphQL;
use axum::{routing::post_service, Router};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;

use crate::db::{collections, MongoDb};
use crate::models::{average_rating, Carer, CareRequest, Feedback, Offer, Owner, Pet};
use crate::routes::AppState;

pub type PetbridgeSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

#[derive(SimpleObject)]
pub struct LocationNode {
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(SimpleObject)]
pub struct FeedbackNode {
    pub id: String,
    pub author_id: String,
    pub author_role: String,
    pub message: String,
    pub rating: i32,
    pub likes: i32,
    pub created_at: String,
}

impl From<Feedback> for FeedbackNode {
    fn from(f: Feedback) -> Self {
        Self {
            id: f.id,
            author_id: f.author_id,
            author_role: f.author_role,
            message: f.message,
            rating: f.rating,
            likes: f.liked_by.len() as i32,
            created_at: f.created_at.to_rfc3339(),
        }
    }
}

#[derive(SimpleObject)]
pub struct PetNode {
    pub id: String,
    pub name: String,
    pub pet_type: String,
    pub size: String,
    pub neutered: bool,
    pub vaccinated: bool,
    pub microchipped: bool,
    pub notes: Option<String>,
    pub image_id: Option<String>,
    pub feedbacks: Vec<FeedbackNode>,
}

impl From<Pet> for PetNode {
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
            feedbacks: p.feedbacks.into_iter().map(FeedbackNode::from).collect(),
        }
    }
}

#[derive(SimpleObject)]
pub struct RequestNode {
    pub id: String,
    pub pet_ids: Vec<String>,
    pub start_date: String,
    pub end_date: String,
    pub message: Option<String>,
    pub carer_id: Option<String>,
    pub status: String,
    pub respondent_ids: Vec<String>,
    pub created_at: String,
}

impl From<CareRequest> for RequestNode {
    fn from(r: CareRequest) -> Self {
        Self {
            id: r.id,
            pet_ids: r.pet_ids,
            start_date: r.start_date.to_rfc3339(),
            end_date: r.end_date.to_rfc3339(),
            message: r.message,
            carer_id: r.carer_id,
            status: r.status,
            respondent_ids: r.respondent_ids,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

#[derive(SimpleObject)]
pub struct OfferNode {
    pub id: String,
    pub request_id: String,
    pub owner_id: String,
    pub direct: bool,
    pub status: String,
    pub message: Option<String>,
    pub created_at: String,
}

impl From<Offer> for OfferNode {
    fn from(o: Offer) -> Self {
        Self {
            id: o.id,
            request_id: o.request_id,
            owner_id: o.owner_id,
            direct: o.direct,
            status: o.status,
            message: o.message,
            created_at: o.created_at.to_rfc3339(),
        }
    }
}

#[derive(SimpleObject)]
pub struct OwnerNode {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub location: Option<LocationNode>,
    pub avatar_image_id: Option<String>,
    pub pets: Vec<PetNode>,
    pub requests: Vec<RequestNode>,
    pub feedbacks: Vec<FeedbackNode>,
    pub average_rating: Option<f64>,
    pub created_at: String,
}

impl From<Owner> for OwnerNode {
    fn from(o: Owner) -> Self {
        Self {
            id: o.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: o.email,
            display_name: o.display_name,
            phone: o.phone,
            address: o.address,
            location: o.location.map(|l| LocationNode {
                longitude: l.longitude(),
                latitude: l.latitude(),
            }),
            avatar_image_id: o.avatar_image_id,
            pets: o.pets.into_iter().map(PetNode::from).collect(),
            requests: o.requests.into_iter().map(RequestNode::from).collect(),
            average_rating: average_rating(&o.feedbacks),
            feedbacks: o.feedbacks.into_iter().map(FeedbackNode::from).collect(),
            created_at: o.created_at.to_rfc3339(),
        }
    }
}

#[derive(SimpleObject)]
pub struct CarerNode {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub location: Option<LocationNode>,
    pub avatar_image_id: Option<String>,
    pub skills: Vec<String>,
    pub hourly_rate: f64,
    pub preferred_pet_types: Vec<String>,
    pub preferred_pet_sizes: Vec<String>,
    pub licences: Vec<String>,
    pub offers: Vec<OfferNode>,
    pub feedbacks: Vec<FeedbackNode>,
    pub average_rating: Option<f64>,
    pub created_at: String,
}

impl From<Carer> for CarerNode {
    fn from(c: Carer) -> Self {
        Self {
            id: c.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: c.email,
            display_name: c.display_name,
            phone: c.phone,
            address: c.address,
            location: c.location.map(|l| LocationNode {
                longitude: l.longitude(),
                latitude: l.latitude(),
            }),
            avatar_image_id: c.avatar_image_id,
            skills: c.skills,
            hourly_rate: c.hourly_rate,
            preferred_pet_types: c.preferred_pet_types,
            preferred_pet_sizes: c.preferred_pet_sizes,
            licences: c.licences,
            offers: c.offers.into_iter().map(OfferNode::from).collect(),
            average_rating: average_rating(&c.feedbacks),
            feedbacks: c.feedbacks.into_iter().map(FeedbackNode::from).collect(),
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn owner(&self, ctx: &Context<'_>, id: String) -> async_graphql::Result<OwnerNode> {
        let db = ctx.data::<MongoDb>()?;
        let oid = ObjectId::parse_str(&id)?;
        let owner = db
            .collection::<Owner>(collections::OWNERS)
            .find_one(doc! { "_id": oid, "is_deleted": { "$ne": true } }, None)
            .await?
            .ok_or_else(|| async_graphql::Error::new("Owner not found"))?;
        Ok(OwnerNode::from(owner))
    }

    async fn owners(
        &self,
        ctx: &Context<'_>,
        #[graphql(default = 50)] limit: i32,
    ) -> async_graphql::Result<Vec<OwnerNode>> {
        let db = ctx.data::<MongoDb>()?;
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .limit(limit.clamp(1, 200) as i64)
            .build();
        let owners: Vec<Owner> = db
            .collection::<Owner>(collections::OWNERS)
            .find(doc! { "is_deleted": { "$ne": true } }, options)
            .await?
            .try_collect()
            .await?;
        Ok(owners.into_iter().map(OwnerNode::from).collect())
    }

    async fn carer(&self, ctx: &Context<'_>, id: String) -> async_graphql::Result<CarerNode> {
        let db = ctx.data::<MongoDb>()?;
        let oid = ObjectId::parse_str(&id)?;
        let carer = db
            .collection::<Carer>(collections::CARERS)
            .find_one(doc! { "_id": oid, "is_deleted": { "$ne": true } }, None)
            .await?
            .ok_or_else(|| async_graphql::Error::new("Carer not found"))?;
        Ok(CarerNode::from(carer))
    }

    async fn carers(
        &self,
        ctx: &Context<'_>,
        #[graphql(default = 50)] limit: i32,
    ) -> async_graphql::Result<Vec<CarerNode>> {
        let db = ctx.data::<MongoDb>()?;
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .limit(limit.clamp(1, 200) as i64)
            .build();
        let carers: Vec<Carer> = db
            .collection::<Carer>(collections::CARERS)
            .find(doc! { "is_deleted": { "$ne": true } }, options)
            .await?
            .try_collect()
            .await?;
        Ok(carers.into_iter().map(CarerNode::from).collect())
    }
}

/// Build the schema over a database handle
pub fn build_schema(db: MongoDb) -> PetbridgeSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(db)
        .finish()
}

/// Mount the GraphQL endpoint
pub fn graphql_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let schema = build_schema((*state.db).clone());
    Router::new().route("/graphql", post_service(GraphQL::new(schema)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_owner_node_conversion() {
        let mut owner = Owner::new("a@b.c", "hash", "Alice");
        owner.id = Some(ObjectId::new());
        owner.pets.push(Pet {
            id: "p1".to_string(),
            name: "Rex".to_string(),
            pet_type: "dog".to_string(),
            size: "large".to_string(),
            neutered: true,
            vaccinated: true,
            microchipped: false,
            notes: None,
            image_id: None,
            feedbacks: vec![],
            created_at: Utc::now(),
        });

        let node = OwnerNode::from(owner);
        assert_eq!(node.display_name, "Alice");
        assert_eq!(node.pets.len(), 1);
        assert!(node.average_rating.is_none());
    }

    #[tokio::test]
    async fn test_schema_builds_and_introspects() {
        let sdl = Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
            .finish()
            .sdl();
        assert!(sdl.contains("owner"));
        assert!(sdl.contains("CarerNode"));
    }
}
