//! Carer-side offer service
//!
//! Accepting or rejecting an offer sets the status string on the carer's
//! document and then mirrors it into the owning request with a second,
//! independent write.

use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId};

use crate::db::{collections, MongoDb};
use crate::error::{Error, Result};
use crate::models::{offer_status, request_status, Carer, Offer, OfferView, Owner};
use crate::services::UserService;

pub struct OfferService {
    db: MongoDb,
}

impl OfferService {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }

    fn users(&self) -> UserService {
        UserService::new(self.db.clone())
    }

    /// List a carer's offers, newest first
    pub async fn list_for_carer(&self, carer_id: &str) -> Result<Vec<OfferView>> {
        let oid = ObjectId::parse_str(carer_id)?;
        let carers = self.db.collection::<Carer>(collections::CARERS);
        let carer = carers
            .find_one(doc! { "_id": oid, "is_deleted": { "$ne": true } }, None)
            .await?
            .ok_or_else(|| Error::CarerNotFound(carer_id.to_string()))?;

        let mut offers = carer.offers;
        offers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(offers.into_iter().map(OfferView::from).collect())
    }

    /// Accept an offer: the offer goes accepted, then the owning request is
    /// independently marked accepted with this carer
    pub async fn accept(&self, carer_id: &str, offer_id: &str) -> Result<()> {
        let (carer, offer) = self.find_offer(carer_id, offer_id).await?;

        self.set_offer_status(carer_id, offer_id, offer_status::ACCEPTED)
            .await?;

        // Second write, unwrapped: the request side. A failure here leaves
        // the offer accepted with the request untouched.
        self.set_request_status(
            &offer.owner_id,
            &offer.request_id,
            request_status::ACCEPTED,
            Some(carer_id),
        )
        .await?;

        if let Err(e) = self
            .users()
            .push_notification(
                &offer.owner_id,
                "request_accepted",
                format!("{} accepted your care request", carer.display_name),
            )
            .await
        {
            tracing::warn!("Failed to notify owner of acceptance: {}", e);
        }

        Ok(())
    }

    /// Reject an offer. Direct offers mirror the rejection into the request
    /// status; applied offers only withdraw the carer from the respondent
    /// list.
    pub async fn reject(&self, carer_id: &str, offer_id: &str) -> Result<()> {
        let (carer, offer) = self.find_offer(carer_id, offer_id).await?;

        self.set_offer_status(carer_id, offer_id, offer_status::REJECTED)
            .await?;

        if offer.direct {
            self.set_request_status(
                &offer.owner_id,
                &offer.request_id,
                request_status::REJECTED,
                None,
            )
            .await?;
        } else {
            let owner_oid = ObjectId::parse_str(&offer.owner_id)?;
            self.db
                .collection::<Owner>(collections::OWNERS)
                .update_one(
                    doc! { "_id": owner_oid, "requests.id": &offer.request_id },
                    doc! {
                        "$pull": { "requests.$.respondent_ids": carer_id },
                        "$set": {
                            "requests.$.updated_at":
                                bson::DateTime::from_chrono(Utc::now()),
                        },
                    },
                    None,
                )
                .await?;
        }

        if let Err(e) = self
            .users()
            .push_notification(
                &offer.owner_id,
                "request_rejected",
                format!("{} declined your care request", carer.display_name),
            )
            .await
        {
            tracing::warn!("Failed to notify owner of rejection: {}", e);
        }

        Ok(())
    }

    async fn find_offer(&self, carer_id: &str, offer_id: &str) -> Result<(Carer, Offer)> {
        let oid = ObjectId::parse_str(carer_id)?;
        let carers = self.db.collection::<Carer>(collections::CARERS);
        let carer = carers
            .find_one(doc! { "_id": oid, "is_deleted": { "$ne": true } }, None)
            .await?
            .ok_or_else(|| Error::CarerNotFound(carer_id.to_string()))?;
        let offer = carer
            .offers
            .iter()
            .find(|o| o.id == offer_id)
            .cloned()
            .ok_or_else(|| Error::OfferNotFound(offer_id.to_string()))?;
        Ok((carer, offer))
    }

    async fn set_offer_status(
        &self,
        carer_id: &str,
        offer_id: &str,
        status: &str,
    ) -> Result<()> {
        let oid = ObjectId::parse_str(carer_id)?;
        let carers = self.db.collection::<Carer>(collections::CARERS);
        let result = carers
            .update_one(
                doc! { "_id": oid, "offers.id": offer_id },
                doc! { "$set": {
                    "offers.$.status": status,
                    "offers.$.updated_at": bson::DateTime::from_chrono(Utc::now()),
                } },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(Error::OfferNotFound(offer_id.to_string()));
        }
        Ok(())
    }

    async fn set_request_status(
        &self,
        owner_id: &str,
        request_id: &str,
        status: &str,
        accepted_carer_id: Option<&str>,
    ) -> Result<()> {
        let owner_oid = ObjectId::parse_str(owner_id)?;
        let mut set = doc! {
            "requests.$.status": status,
            "requests.$.updated_at": bson::DateTime::from_chrono(Utc::now()),
        };
        if let Some(carer_id) = accepted_carer_id {
            set.insert("requests.$.carer_id", carer_id);
        }
        let result = self
            .db
            .collection::<Owner>(collections::OWNERS)
            .update_one(
                doc! { "_id": owner_oid, "requests.id": request_id },
                doc! { "$set": set },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(Error::RequestNotFound(request_id.to_string()));
        }
        Ok(())
    }
}
