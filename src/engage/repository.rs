use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Collection, Database};

use crate::database::InsertOutcome;
use crate::database::db::{COMMENTS, LIKES};
use crate::engage::model::{Comment, Like};
use crate::utils::error::{CustomError, is_duplicate_key};

#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Insert guarded by the unique `(user_id, post_id)` index.
    async fn insert(&self, like: &Like) -> Result<InsertOutcome, CustomError>;

    async fn delete_pair(&self, user_id: &ObjectId, post_id: &ObjectId)
    -> Result<bool, CustomError>;

    async fn count_for_post(&self, post_id: &ObjectId) -> Result<u64, CustomError>;

    async fn exists_pair(&self, user_id: &ObjectId, post_id: &ObjectId)
    -> Result<bool, CustomError>;

    async fn find_for_posts(&self, post_ids: &[ObjectId]) -> Result<Vec<Like>, CustomError>;

    async fn delete_for_post(&self, post_id: &ObjectId) -> Result<u64, CustomError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert(&self, comment: &Comment) -> Result<(), CustomError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Comment>, CustomError>;

    /// Delete only if `author_id` wrote the comment.
    async fn delete_authored(&self, id: &ObjectId, author_id: &ObjectId)
    -> Result<bool, CustomError>;

    async fn delete_by_id(&self, id: &ObjectId) -> Result<bool, CustomError>;

    /// Comments on any of `post_ids`, newest first.
    async fn find_for_posts(&self, post_ids: &[ObjectId]) -> Result<Vec<Comment>, CustomError>;

    async fn delete_for_post(&self, post_id: &ObjectId) -> Result<u64, CustomError>;
}

pub struct MongoLikeRepository {
    collection: Collection<Like>,
}

impl MongoLikeRepository {
    pub fn new(db: &Database) -> Self {
        MongoLikeRepository {
            collection: db.collection::<Like>(LIKES),
        }
    }
}

#[async_trait]
impl LikeRepository for MongoLikeRepository {
    async fn insert(&self, like: &Like) -> Result<InsertOutcome, CustomError> {
        match self.collection.insert_one(like).await {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(e) if is_duplicate_key(&e) => Ok(InsertOutcome::Duplicate),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_pair(
        &self,
        user_id: &ObjectId,
        post_id: &ObjectId,
    ) -> Result<bool, CustomError> {
        let result = self
            .collection
            .delete_one(doc! { "user_id": user_id, "post_id": post_id })
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn count_for_post(&self, post_id: &ObjectId) -> Result<u64, CustomError> {
        Ok(self
            .collection
            .count_documents(doc! { "post_id": post_id })
            .await?)
    }

    async fn exists_pair(
        &self,
        user_id: &ObjectId,
        post_id: &ObjectId,
    ) -> Result<bool, CustomError> {
        let count = self
            .collection
            .count_documents(doc! { "user_id": user_id, "post_id": post_id })
            .limit(1)
            .await?;
        Ok(count > 0)
    }

    async fn find_for_posts(&self, post_ids: &[ObjectId]) -> Result<Vec<Like>, CustomError> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .collection
            .find(doc! { "post_id": { "$in": post_ids.to_vec() } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn delete_for_post(&self, post_id: &ObjectId) -> Result<u64, CustomError> {
        let result = self
            .collection
            .delete_many(doc! { "post_id": post_id })
            .await?;
        Ok(result.deleted_count)
    }
}

pub struct MongoCommentRepository {
    collection: Collection<Comment>,
}

impl MongoCommentRepository {
    pub fn new(db: &Database) -> Self {
        MongoCommentRepository {
            collection: db.collection::<Comment>(COMMENTS),
        }
    }
}

#[async_trait]
impl CommentRepository for MongoCommentRepository {
    async fn insert(&self, comment: &Comment) -> Result<(), CustomError> {
        self.collection.insert_one(comment).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Comment>, CustomError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn delete_authored(
        &self,
        id: &ObjectId,
        author_id: &ObjectId,
    ) -> Result<bool, CustomError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id, "author_id": author_id })
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_by_id(&self, id: &ObjectId) -> Result<bool, CustomError> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn find_for_posts(&self, post_ids: &[ObjectId]) -> Result<Vec<Comment>, CustomError> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .collection
            .find(doc! { "post_id": { "$in": post_ids.to_vec() } })
            .sort(doc! { "created_at": -1, "_id": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn delete_for_post(&self, post_id: &ObjectId) -> Result<u64, CustomError> {
        let result = self
            .collection
            .delete_many(doc! { "post_id": post_id })
            .await?;
        Ok(result.deleted_count)
    }
}
