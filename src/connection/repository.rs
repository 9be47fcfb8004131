use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};

use crate::connection::model::{ConnectionRequest, RequestStatus, pair_key};
use crate::database::InsertOutcome;
use crate::database::db::CONNECTION_REQUESTS;
use crate::utils::error::{CustomError, is_duplicate_key};

#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// Insert guarded by the unique pair index.
    async fn insert(&self, request: &ConnectionRequest) -> Result<InsertOutcome, CustomError>;

    async fn find_between(
        &self,
        a: &ObjectId,
        b: &ObjectId,
    ) -> Result<Option<ConnectionRequest>, CustomError>;

    /// Delete `sender -> receiver` only while it is still pending.
    async fn delete_pending(
        &self,
        sender_id: &ObjectId,
        receiver_id: &ObjectId,
    ) -> Result<bool, CustomError>;

    /// Move `sender -> receiver` out of pending; `None` when no pending request matched.
    async fn review_pending(
        &self,
        sender_id: &ObjectId,
        receiver_id: &ObjectId,
        status: RequestStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<ConnectionRequest>, CustomError>;

    async fn find_pending_to(
        &self,
        receiver_id: &ObjectId,
    ) -> Result<Vec<ConnectionRequest>, CustomError>;

    async fn find_pending_from(
        &self,
        sender_id: &ObjectId,
    ) -> Result<Vec<ConnectionRequest>, CustomError>;

    async fn find_accepted_involving(
        &self,
        user_id: &ObjectId,
    ) -> Result<Vec<ConnectionRequest>, CustomError>;

    /// Every request of any status touching `user_id`.
    async fn find_involving(&self, user_id: &ObjectId)
    -> Result<Vec<ConnectionRequest>, CustomError>;

    async fn count_accepted_involving(&self, user_id: &ObjectId) -> Result<u64, CustomError>;
}

pub struct MongoConnectionRepository {
    collection: Collection<ConnectionRequest>,
}

impl MongoConnectionRepository {
    pub fn new(db: &Database) -> Self {
        MongoConnectionRepository {
            collection: db.collection::<ConnectionRequest>(CONNECTION_REQUESTS),
        }
    }

    async fn find_all(&self, filter: bson::Document) -> Result<Vec<ConnectionRequest>, CustomError> {
        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1, "_id": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

#[async_trait]
impl ConnectionRepository for MongoConnectionRepository {
    async fn insert(&self, request: &ConnectionRequest) -> Result<InsertOutcome, CustomError> {
        match self.collection.insert_one(request).await {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(e) if is_duplicate_key(&e) => Ok(InsertOutcome::Duplicate),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_between(
        &self,
        a: &ObjectId,
        b: &ObjectId,
    ) -> Result<Option<ConnectionRequest>, CustomError> {
        Ok(self
            .collection
            .find_one(doc! { "pair_key": pair_key(a, b) })
            .await?)
    }

    async fn delete_pending(
        &self,
        sender_id: &ObjectId,
        receiver_id: &ObjectId,
    ) -> Result<bool, CustomError> {
        let result = self
            .collection
            .delete_one(doc! {
                "sender_id": sender_id,
                "receiver_id": receiver_id,
                "status": RequestStatus::Pending.as_str(),
            })
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn review_pending(
        &self,
        sender_id: &ObjectId,
        receiver_id: &ObjectId,
        status: RequestStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<ConnectionRequest>, CustomError> {
        Ok(self
            .collection
            .find_one_and_update(
                doc! {
                    "sender_id": sender_id,
                    "receiver_id": receiver_id,
                    "status": RequestStatus::Pending.as_str(),
                },
                doc! {
                    "$set": {
                        "status": status.as_str(),
                        "updated_at": bson::DateTime::from_chrono(at),
                    }
                },
            )
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn find_pending_to(
        &self,
        receiver_id: &ObjectId,
    ) -> Result<Vec<ConnectionRequest>, CustomError> {
        self.find_all(doc! {
            "receiver_id": receiver_id,
            "status": RequestStatus::Pending.as_str(),
        })
        .await
    }

    async fn find_pending_from(
        &self,
        sender_id: &ObjectId,
    ) -> Result<Vec<ConnectionRequest>, CustomError> {
        self.find_all(doc! {
            "sender_id": sender_id,
            "status": RequestStatus::Pending.as_str(),
        })
        .await
    }

    async fn find_accepted_involving(
        &self,
        user_id: &ObjectId,
    ) -> Result<Vec<ConnectionRequest>, CustomError> {
        self.find_all(doc! {
            "$or": [ { "sender_id": user_id }, { "receiver_id": user_id } ],
            "status": RequestStatus::Accepted.as_str(),
        })
        .await
    }

    async fn find_involving(
        &self,
        user_id: &ObjectId,
    ) -> Result<Vec<ConnectionRequest>, CustomError> {
        self.find_all(doc! {
            "$or": [ { "sender_id": user_id }, { "receiver_id": user_id } ],
        })
        .await
    }

    async fn count_accepted_involving(&self, user_id: &ObjectId) -> Result<u64, CustomError> {
        Ok(self
            .collection
            .count_documents(doc! {
                "$or": [ { "sender_id": user_id }, { "receiver_id": user_id } ],
                "status": RequestStatus::Accepted.as_str(),
            })
            .await?)
    }
}
