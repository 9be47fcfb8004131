use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{self, Document, doc, oid::ObjectId};
use mongodb::{Collection, Database};

use crate::database::db::USERS;
use crate::user::model::User;
use crate::utils::error::CustomError;

/// Read access to the user collection owned by the identity service.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, CustomError>;

    async fn find_many(&self, ids: &[ObjectId]) -> Result<Vec<User>, CustomError>;

    /// Random sample of users whose id is not in `excluded`.
    async fn sample_excluding(
        &self,
        excluded: &[ObjectId],
        size: usize,
    ) -> Result<Vec<User>, CustomError>;

    async fn search_prefix(
        &self,
        query: &str,
        exclude: &ObjectId,
        limit: usize,
    ) -> Result<Vec<User>, CustomError>;
}

pub struct MongoUserDirectory {
    collection: Collection<User>,
}

impl MongoUserDirectory {
    pub fn new(db: &Database) -> Self {
        MongoUserDirectory {
            collection: db.collection::<User>(USERS),
        }
    }
}

fn projection() -> Document {
    doc! { "_id": 1, "firstName": 1, "lastName": 1, "userName": 1, "about": 1 }
}

#[async_trait]
impl UserDirectory for MongoUserDirectory {
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, CustomError> {
        Ok(self
            .collection
            .find_one(doc! { "_id": id })
            .projection(projection())
            .await?)
    }

    async fn find_many(&self, ids: &[ObjectId]) -> Result<Vec<User>, CustomError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .collection
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .projection(projection())
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn sample_excluding(
        &self,
        excluded: &[ObjectId],
        size: usize,
    ) -> Result<Vec<User>, CustomError> {
        let pipeline = vec![
            doc! { "$match": { "_id": { "$nin": excluded.to_vec() } } },
            doc! { "$sample": { "size": size as i64 } },
            doc! { "$project": projection() },
        ];
        let documents: Vec<Document> = self.collection.aggregate(pipeline).await?.try_collect().await?;

        documents
            .into_iter()
            .map(|document| {
                bson::from_document::<User>(document)
                    .map_err(|e| CustomError::Unexpected(format!("malformed user document: {}", e)))
            })
            .collect()
    }

    async fn search_prefix(
        &self,
        query: &str,
        exclude: &ObjectId,
        limit: usize,
    ) -> Result<Vec<User>, CustomError> {
        let pattern = format!("^{}", regex::escape(query));
        let name_match = |field: &str| {
            let mut condition = Document::new();
            condition.insert(field, doc! { "$regex": pattern.clone(), "$options": "i" });
            condition
        };
        let filter = doc! {
            "_id": { "$ne": exclude },
            "$or": [name_match("userName"), name_match("firstName"), name_match("lastName")],
        };

        let cursor = self
            .collection
            .find(filter)
            .projection(projection())
            .sort(doc! { "userName": 1 })
            .limit(limit as i64)
            .await?;
        Ok(cursor.try_collect().await?)
    }
}
