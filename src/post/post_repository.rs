use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};

use crate::database::db::POSTS;
use crate::post::post_model::Post;
use crate::utils::error::CustomError;

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, post: &Post) -> Result<(), CustomError>;

    async fn exists(&self, id: &ObjectId) -> Result<bool, CustomError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Post>, CustomError>;

    /// Ownership-scoped lookup: absent and not-yours look the same.
    async fn find_owned(
        &self,
        id: &ObjectId,
        author_id: &ObjectId,
    ) -> Result<Option<Post>, CustomError>;

    /// Compare-and-set on the image: applies only while the stored image is
    /// still `expected_image`, so a replaced image is never lost unreleased.
    async fn update_owned(
        &self,
        id: &ObjectId,
        author_id: &ObjectId,
        expected_image: Option<&str>,
        content: Option<String>,
        image_url: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Option<Post>, CustomError>;

    async fn delete_owned(&self, id: &ObjectId, author_id: &ObjectId) -> Result<bool, CustomError>;

    /// Posts not written by `viewer_id`, most recently updated first, newer id first on ties.
    async fn find_page_excluding(
        &self,
        viewer_id: &ObjectId,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Post>, CustomError>;

    /// All posts by `author_id`, newest first.
    async fn find_by_author(&self, author_id: &ObjectId) -> Result<Vec<Post>, CustomError>;

    async fn count_by_author(&self, author_id: &ObjectId) -> Result<u64, CustomError>;
}

pub struct MongoPostRepository {
    collection: Collection<Post>,
}

impl MongoPostRepository {
    pub fn new(db: &Database) -> Self {
        MongoPostRepository {
            collection: db.collection::<Post>(POSTS),
        }
    }
}

#[async_trait]
impl PostRepository for MongoPostRepository {
    async fn insert(&self, post: &Post) -> Result<(), CustomError> {
        self.collection.insert_one(post).await?;
        Ok(())
    }

    async fn exists(&self, id: &ObjectId) -> Result<bool, CustomError> {
        let count = self
            .collection
            .count_documents(doc! { "_id": id })
            .limit(1)
            .await?;
        Ok(count > 0)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Post>, CustomError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_owned(
        &self,
        id: &ObjectId,
        author_id: &ObjectId,
    ) -> Result<Option<Post>, CustomError> {
        Ok(self
            .collection
            .find_one(doc! { "_id": id, "author_id": author_id })
            .await?)
    }

    async fn update_owned(
        &self,
        id: &ObjectId,
        author_id: &ObjectId,
        expected_image: Option<&str>,
        content: Option<String>,
        image_url: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Option<Post>, CustomError> {
        Ok(self
            .collection
            .find_one_and_update(
                doc! { "_id": id, "author_id": author_id, "image_url": expected_image },
                doc! {
                    "$set": {
                        "content": content,
                        "image_url": image_url,
                        "updated_at": bson::DateTime::from_chrono(at),
                    }
                },
            )
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn delete_owned(&self, id: &ObjectId, author_id: &ObjectId) -> Result<bool, CustomError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id, "author_id": author_id })
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn find_page_excluding(
        &self,
        viewer_id: &ObjectId,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Post>, CustomError> {
        let cursor = self
            .collection
            .find(doc! { "author_id": { "$ne": viewer_id } })
            .sort(doc! { "updated_at": -1, "_id": -1 })
            .skip(skip)
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_author(&self, author_id: &ObjectId) -> Result<Vec<Post>, CustomError> {
        let cursor = self
            .collection
            .find(doc! { "author_id": author_id })
            .sort(doc! { "created_at": -1, "_id": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn count_by_author(&self, author_id: &ObjectId) -> Result<u64, CustomError> {
        Ok(self
            .collection
            .count_documents(doc! { "author_id": author_id })
            .await?)
    }
}
