//! Care request lifecycle service
//!
//! The request/offer status pair is kept in step by a sequence of
//! independent per-document writes. There is no transaction wrapping the
//! owner-side and carer-side mutation, and no compensating action when a
//! later write fails after an earlier one has landed.

use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_bson, Document};
use serde::Deserialize;

use crate::db::{collections, MongoDb};
use crate::error::{Error, Result};
use crate::models::{
    offer_status, request_status, CareRequest, Carer, CreateCareRequest, Offer, OpenRequestView,
    Owner, PaginatedResponse, RequestView,
};
use crate::services::UserService;

pub struct RequestService {
    db: MongoDb,
}

impl RequestService {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }

    fn users(&self) -> UserService {
        UserService::new(self.db.clone())
    }

    /// Create a care request under an owner. When a direct carer is named,
    /// a pending offer is additionally pushed into that carer's document.
    pub async fn create(&self, owner_id: &str, req: CreateCareRequest) -> Result<RequestView> {
        let oid = ObjectId::parse_str(owner_id)?;
        let owners = self.db.collection::<Owner>(collections::OWNERS);
        let owner = owners
            .find_one(doc! { "_id": oid, "is_deleted": { "$ne": true } }, None)
            .await?
            .ok_or_else(|| Error::OwnerNotFound(owner_id.to_string()))?;

        for pet_id in &req.pet_ids {
            if !owner.pets.iter().any(|p| &p.id == pet_id) {
                return Err(Error::Validation(format!(
                    "Pet {} does not belong to this owner",
                    pet_id
                )));
            }
        }

        // For direct requests, resolve the carer before the first write so a
        // bad target fails the whole call instead of leaving a dangling
        // request
        let direct_carer = match &req.carer_id {
            Some(carer_id) => {
                let carer_oid = ObjectId::parse_str(carer_id)?;
                let carers = self.db.collection::<Carer>(collections::CARERS);
                let carer = carers
                    .find_one(
                        doc! { "_id": carer_oid, "is_deleted": { "$ne": true } },
                        None,
                    )
                    .await?
                    .ok_or_else(|| Error::CarerNotFound(carer_id.to_string()))?;
                Some(carer)
            }
            None => None,
        };

        let message = req.message.clone();
        let request = req.into_request();
        owners
            .update_one(
                doc! { "_id": oid },
                doc! {
                    "$push": { "requests": to_bson(&request)? },
                    "$set": { "updated_at": bson::DateTime::from_chrono(Utc::now()) },
                },
                None,
            )
            .await?;

        if let Some(carer) = direct_carer {
            // Second, independent write: push the mirrored offer. If this
            // fails the request above stays in place.
            let offer = Offer::new(&request.id, owner_id, true, message);
            let carer_oid = carer.id.ok_or_else(|| {
                Error::Internal("Carer document missing _id".to_string())
            })?;
            self.db
                .collection::<Carer>(collections::CARERS)
                .update_one(
                    doc! { "_id": carer_oid },
                    doc! { "$push": { "offers": to_bson(&offer)? } },
                    None,
                )
                .await?;

            if let Err(e) = self
                .users()
                .push_notification(
                    &carer_oid.to_hex(),
                    "offer_received",
                    format!("{} sent you a care request", owner.display_name),
                )
                .await
            {
                tracing::warn!("Failed to notify carer of direct offer: {}", e);
            }
        }

        Ok(RequestView::from(request))
    }

    /// List an owner's requests, newest first
    pub async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<RequestView>> {
        let oid = ObjectId::parse_str(owner_id)?;
        let owners = self.db.collection::<Owner>(collections::OWNERS);
        let owner = owners
            .find_one(doc! { "_id": oid, "is_deleted": { "$ne": true } }, None)
            .await?
            .ok_or_else(|| Error::OwnerNotFound(owner_id.to_string()))?;

        let mut requests = owner.requests;
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests.into_iter().map(RequestView::from).collect())
    }

    /// Cancel a request and best-effort mirror the status into any offers
    /// that reference it
    pub async fn cancel(&self, owner_id: &str, request_id: &str) -> Result<()> {
        let oid = ObjectId::parse_str(owner_id)?;
        let owners = self.db.collection::<Owner>(collections::OWNERS);
        let now = bson::DateTime::from_chrono(Utc::now());
        let result = owners
            .update_one(
                doc! { "_id": oid, "requests.id": request_id },
                doc! { "$set": {
                    "requests.$.status": request_status::CANCELLED,
                    "requests.$.updated_at": now,
                } },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(Error::RequestNotFound(request_id.to_string()));
        }

        // Mirror into carers that hold an offer for this request; cancelled
        // requests with unsynced offers are tolerated
        let carers = self.db.collection::<Carer>(collections::CARERS);
        let mirror = carers
            .update_many(
                doc! { "offers.request_id": request_id },
                doc! { "$set": {
                    "offers.$[o].status": offer_status::CANCELLED,
                    "offers.$[o].updated_at": now,
                } },
                mongodb::options::UpdateOptions::builder()
                    .array_filters(vec![doc! { "o.request_id": request_id }])
                    .build(),
            )
            .await;
        if let Err(e) = mirror {
            tracing::warn!("Failed to mirror cancellation into offers: {}", e);
        }

        Ok(())
    }

    /// Browse pending, non-direct requests across all owners. Paging happens
    /// in the database: the embedded requests are unwound and skipped/limited
    /// server-side instead of materializing every open request in memory.
    pub async fn list_open(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<PaginatedResponse<OpenRequestView>> {
        let owners = self.db.collection::<Owner>(collections::OWNERS);

        let mut count_stages = open_request_stages();
        count_stages.push(doc! { "$count": "total" });
        let mut cursor = owners.aggregate(count_stages, None).await?;
        let total = match cursor.try_next().await? {
            Some(d) => d.get_i32("total").map(|t| t as u64).unwrap_or(0),
            None => 0,
        };

        let mut stages = open_request_stages();
        stages.extend([
            doc! { "$sort": { "requests.created_at": -1 } },
            doc! { "$skip": ((page - 1) * limit) as i64 },
            doc! { "$limit": limit as i64 },
            doc! { "$project": {
                "_id": 0,
                "owner_id": { "$toString": "$_id" },
                "owner_name": "$display_name",
                "request": "$requests",
            } },
        ]);

        let mut cursor = owners.aggregate(stages, None).await?;
        let mut items = Vec::new();
        while let Some(document) = cursor.try_next().await? {
            let row: OpenRequestRow = bson::from_document(document)?;
            items.push(OpenRequestView {
                owner_id: row.owner_id,
                owner_name: row.owner_name,
                request: RequestView::from(row.request),
            });
        }

        Ok(PaginatedResponse::new(items, total, page, limit))
    }

    /// A carer applies to an open request: the carer is appended to the
    /// request's respondents and a pending offer is pushed into the carer's
    /// own document. One offer per request per carer; a repeat call is
    /// rejected, since the owner's decision only flips the first matching
    /// offer and a duplicate would stay pending forever.
    pub async fn respond(
        &self,
        carer_id: &str,
        request_id: &str,
        message: Option<String>,
    ) -> Result<()> {
        let carer_oid = ObjectId::parse_str(carer_id)?;
        let carers = self.db.collection::<Carer>(collections::CARERS);
        let carer = carers
            .find_one(
                doc! { "_id": carer_oid, "is_deleted": { "$ne": true } },
                None,
            )
            .await?
            .ok_or_else(|| Error::CarerNotFound(carer_id.to_string()))?;

        if has_offer_for(&carer.offers, request_id) {
            return Err(Error::Validation(format!(
                "Carer has already responded to request {}",
                request_id
            )));
        }

        let owners = self.db.collection::<Owner>(collections::OWNERS);
        let owner = owners
            .find_one(
                doc! { "requests.id": request_id, "is_deleted": { "$ne": true } },
                None,
            )
            .await?
            .ok_or_else(|| Error::RequestNotFound(request_id.to_string()))?;
        let owner_id = owner.id.map(|id| id.to_hex()).unwrap_or_default();

        let now = bson::DateTime::from_chrono(Utc::now());
        owners
            .update_one(
                doc! { "_id": owner.id, "requests.id": request_id },
                doc! {
                    "$addToSet": { "requests.$.respondent_ids": carer_id },
                    "$set": { "requests.$.updated_at": now },
                },
                None,
            )
            .await?;

        let offer = Offer::new(request_id, &owner_id, false, message);
        carers
            .update_one(
                doc! { "_id": carer_oid },
                doc! { "$push": { "offers": to_bson(&offer)? } },
                None,
            )
            .await?;

        if let Err(e) = self
            .users()
            .push_notification(
                &owner_id,
                "respondent_applied",
                format!("{} responded to your care request", carer.display_name),
            )
            .await
        {
            tracing::warn!("Failed to notify owner of respondent: {}", e);
        }

        Ok(())
    }

    /// The owner accepts a respondent: the request is marked accepted with
    /// the chosen carer, the chosen carer's offer is marked accepted, and
    /// every other respondent's offer is marked rejected. Each step is an
    /// independent write.
    pub async fn accept_respondent(
        &self,
        owner_id: &str,
        request_id: &str,
        carer_id: &str,
    ) -> Result<()> {
        let oid = ObjectId::parse_str(owner_id)?;
        let owners = self.db.collection::<Owner>(collections::OWNERS);
        let owner = owners
            .find_one(doc! { "_id": oid, "is_deleted": { "$ne": true } }, None)
            .await?
            .ok_or_else(|| Error::OwnerNotFound(owner_id.to_string()))?;
        let request = owner
            .requests
            .iter()
            .find(|r| r.id == request_id)
            .ok_or_else(|| Error::RequestNotFound(request_id.to_string()))?;
        if !request.respondent_ids.iter().any(|r| r == carer_id) {
            return Err(Error::Validation(format!(
                "Carer {} has not responded to this request",
                carer_id
            )));
        }

        let now = bson::DateTime::from_chrono(Utc::now());
        owners
            .update_one(
                doc! { "_id": oid, "requests.id": request_id },
                doc! { "$set": {
                    "requests.$.status": request_status::ACCEPTED,
                    "requests.$.carer_id": carer_id,
                    "requests.$.updated_at": now,
                } },
                None,
            )
            .await?;

        for respondent_id in &request.respondent_ids {
            let status = if respondent_id == carer_id {
                offer_status::ACCEPTED
            } else {
                offer_status::REJECTED
            };
            self.set_offer_status(respondent_id, request_id, status).await?;

            let kind = if respondent_id == carer_id {
                "request_accepted"
            } else {
                "request_rejected"
            };
            let message = match status {
                offer_status::ACCEPTED => {
                    format!("{} accepted your response", owner.display_name)
                }
                _ => format!("{} chose another carer", owner.display_name),
            };
            if let Err(e) = self
                .users()
                .push_notification(respondent_id, kind, message)
                .await
            {
                tracing::warn!("Failed to notify respondent {}: {}", respondent_id, e);
            }
        }

        Ok(())
    }

    /// The owner rejects a respondent: the carer is removed from the
    /// respondent list and that carer's offer is marked rejected
    pub async fn reject_respondent(
        &self,
        owner_id: &str,
        request_id: &str,
        carer_id: &str,
    ) -> Result<()> {
        let oid = ObjectId::parse_str(owner_id)?;
        let owners = self.db.collection::<Owner>(collections::OWNERS);
        let now = bson::DateTime::from_chrono(Utc::now());
        let result = owners
            .update_one(
                doc! { "_id": oid, "requests.id": request_id },
                doc! {
                    "$pull": { "requests.$.respondent_ids": carer_id },
                    "$set": { "requests.$.updated_at": now },
                },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(Error::RequestNotFound(request_id.to_string()));
        }

        self.set_offer_status(carer_id, request_id, offer_status::REJECTED)
            .await?;

        if let Err(e) = self
            .users()
            .push_notification(
                carer_id,
                "request_rejected",
                "Your response was declined".to_string(),
            )
            .await
        {
            tracing::warn!("Failed to notify rejected respondent: {}", e);
        }

        Ok(())
    }

    /// Set the status of a carer's offer referencing the given request
    async fn set_offer_status(
        &self,
        carer_id: &str,
        request_id: &str,
        status: &str,
    ) -> Result<()> {
        let carer_oid = ObjectId::parse_str(carer_id)?;
        let carers = self.db.collection::<Carer>(collections::CARERS);
        let result = carers
            .update_one(
                doc! { "_id": carer_oid, "offers.request_id": request_id },
                doc! { "$set": {
                    "offers.$.status": status,
                    "offers.$.updated_at": bson::DateTime::from_chrono(Utc::now()),
                } },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(Error::OfferNotFound(request_id.to_string()));
        }
        Ok(())
    }
}

/// True when the carer already holds an offer referencing this request,
/// regardless of its status
fn has_offer_for(offers: &[Offer], request_id: &str) -> bool {
    offers.iter().any(|o| o.request_id == request_id)
}

/// Shared pipeline prefix: unwind embedded requests and keep pending ones
/// with no direct carer
fn open_request_stages() -> Vec<Document> {
    vec![
        doc! { "$match": {
            "is_deleted": { "$ne": true },
            "requests.status": request_status::PENDING,
        } },
        doc! { "$unwind": "$requests" },
        doc! { "$match": {
            "requests.status": request_status::PENDING,
            "requests.carer_id": null,
        } },
    ]
}

/// Row shape produced by the open-request projection
#[derive(Debug, Deserialize)]
struct OpenRequestRow {
    owner_id: String,
    owner_name: String,
    request: CareRequest,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::offer_status;

    #[test]
    fn test_existing_offer_blocks_repeat_response() {
        let offers = vec![
            Offer::new("r1", "o1", false, None),
            Offer::new("r2", "o1", true, None),
        ];
        assert!(has_offer_for(&offers, "r1"));
        assert!(has_offer_for(&offers, "r2"));
        assert!(!has_offer_for(&offers, "r3"));
    }

    #[test]
    fn test_open_request_stages_filter_after_unwind() {
        let stages = open_request_stages();
        assert_eq!(stages.len(), 3);

        // The post-unwind match must re-check status and require no direct
        // carer, otherwise other requests of a matching owner leak through
        let unwound = stages[2].get_document("$match").unwrap();
        assert_eq!(
            unwound.get_str("requests.status").unwrap(),
            request_status::PENDING
        );
        assert!(matches!(
            unwound.get("requests.carer_id"),
            Some(mongodb::bson::Bson::Null)
        ));
    }

    #[test]
    fn test_decided_offer_still_blocks_repeat_response() {
        // A rejected offer keeps the carer from re-applying; the owner's
        // decision is final for that request
        let mut offer = Offer::new("r1", "o1", false, None);
        offer.status = offer_status::REJECTED.to_string();
        assert!(has_offer_for(&[offer], "r1"));
    }
}
