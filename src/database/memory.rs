//! In-memory stand-ins for every repository, enforcing the same unique
//! constraints as the MongoDB indexes.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use rand::seq::SliceRandom;
use tokio::sync::RwLock;

use crate::connection::model::{ConnectionRequest, RequestStatus, pair_key};
use crate::connection::repository::ConnectionRepository;
use crate::database::InsertOutcome;
use crate::engage::model::{Comment, Like};
use crate::engage::repository::{CommentRepository, LikeRepository};
use crate::post::post_model::Post;
use crate::post::post_repository::PostRepository;
use crate::uploader::form::FileUpload;
use crate::uploader::media::MediaStore;
use crate::user::model::User;
use crate::user::repository::UserDirectory;
use crate::utils::error::CustomError;

/// Case-insensitive prefix match on any searchable name, mirroring the
/// anchored regex the Mongo directory uses.
fn matches_prefix(user: &User, query: &str) -> bool {
    let query = query.to_lowercase();
    [
        Some(&user.first_name),
        user.last_name.as_ref(),
        user.user_name.as_ref(),
    ]
    .into_iter()
    .flatten()
    .any(|name| name.to_lowercase().starts_with(&query))
}

fn involves(request: &ConnectionRequest, user_id: &ObjectId) -> bool {
    request.sender_id == *user_id || request.receiver_id == *user_id
}

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    posts: RwLock<Vec<Post>>,
    likes: RwLock<Vec<Like>>,
    comments: RwLock<Vec<Comment>>,
    requests: RwLock<Vec<ConnectionRequest>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn add_user(&self, first_name: &str, user_name: &str) -> ObjectId {
        let user = User {
            id: ObjectId::new(),
            first_name: first_name.to_string(),
            last_name: None,
            user_name: Some(user_name.to_string()),
            about: None,
        };
        let id = user.id;
        self.users.write().await.push(user);
        id
    }

    pub async fn add_post(&self, author_id: ObjectId, content: &str) -> ObjectId {
        let post = Post::new(author_id, Some(content.to_string()), None)
            .expect("test posts have content");
        let id = post.id;
        self.posts.write().await.push(post);
        id
    }

    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    pub async fn engagement_rows_for(&self, post_id: &ObjectId) -> usize {
        let likes = self.likes.read().await.iter().filter(|l| l.post_id == *post_id).count();
        let comments = self
            .comments
            .read()
            .await
            .iter()
            .filter(|c| c.post_id == *post_id)
            .count();
        likes + comments
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, CustomError> {
        Ok(self.users.read().await.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_many(&self, ids: &[ObjectId]) -> Result<Vec<User>, CustomError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn sample_excluding(
        &self,
        excluded: &[ObjectId],
        size: usize,
    ) -> Result<Vec<User>, CustomError> {
        let mut candidates: Vec<User> = self
            .users
            .read()
            .await
            .iter()
            .filter(|u| !excluded.contains(&u.id))
            .cloned()
            .collect();
        candidates.shuffle(&mut rand::rng());
        candidates.truncate(size);
        Ok(candidates)
    }

    async fn search_prefix(
        &self,
        query: &str,
        exclude: &ObjectId,
        limit: usize,
    ) -> Result<Vec<User>, CustomError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .filter(|u| u.id != *exclude && matches_prefix(u, query))
            .take(limit)
            .cloned()
            .collect())
    }
}

fn newest_updated_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn insert(&self, post: &Post) -> Result<(), CustomError> {
        self.posts.write().await.push(post.clone());
        Ok(())
    }

    async fn exists(&self, id: &ObjectId) -> Result<bool, CustomError> {
        Ok(self.posts.read().await.iter().any(|p| p.id == *id))
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Post>, CustomError> {
        Ok(self.posts.read().await.iter().find(|p| p.id == *id).cloned())
    }

    async fn find_owned(
        &self,
        id: &ObjectId,
        author_id: &ObjectId,
    ) -> Result<Option<Post>, CustomError> {
        Ok(self
            .posts
            .read()
            .await
            .iter()
            .find(|p| p.id == *id && p.author_id == *author_id)
            .cloned())
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
        let mut posts = self.posts.write().await;
        let Some(post) = posts.iter_mut().find(|p| {
            p.id == *id && p.author_id == *author_id && p.image_url.as_deref() == expected_image
        }) else {
            return Ok(None);
        };
        post.content = content;
        post.image_url = image_url;
        post.updated_at = at;
        Ok(Some(post.clone()))
    }

    async fn delete_owned(&self, id: &ObjectId, author_id: &ObjectId) -> Result<bool, CustomError> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|p| !(p.id == *id && p.author_id == *author_id));
        Ok(posts.len() < before)
    }

    async fn find_page_excluding(
        &self,
        viewer_id: &ObjectId,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Post>, CustomError> {
        let mut posts: Vec<Post> = self
            .posts
            .read()
            .await
            .iter()
            .filter(|p| p.author_id != *viewer_id)
            .cloned()
            .collect();
        newest_updated_first(&mut posts);
        Ok(posts
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn find_by_author(&self, author_id: &ObjectId) -> Result<Vec<Post>, CustomError> {
        let mut posts: Vec<Post> = self
            .posts
            .read()
            .await
            .iter()
            .filter(|p| p.author_id == *author_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    async fn count_by_author(&self, author_id: &ObjectId) -> Result<u64, CustomError> {
        Ok(self
            .posts
            .read()
            .await
            .iter()
            .filter(|p| p.author_id == *author_id)
            .count() as u64)
    }
}

#[async_trait]
impl LikeRepository for MemoryStore {
    async fn insert(&self, like: &Like) -> Result<InsertOutcome, CustomError> {
        let mut likes = self.likes.write().await;
        if likes
            .iter()
            .any(|l| l.user_id == like.user_id && l.post_id == like.post_id)
        {
            return Ok(InsertOutcome::Duplicate);
        }
        likes.push(like.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn delete_pair(
        &self,
        user_id: &ObjectId,
        post_id: &ObjectId,
    ) -> Result<bool, CustomError> {
        let mut likes = self.likes.write().await;
        let before = likes.len();
        likes.retain(|l| !(l.user_id == *user_id && l.post_id == *post_id));
        Ok(likes.len() < before)
    }

    async fn count_for_post(&self, post_id: &ObjectId) -> Result<u64, CustomError> {
        Ok(self
            .likes
            .read()
            .await
            .iter()
            .filter(|l| l.post_id == *post_id)
            .count() as u64)
    }

    async fn exists_pair(
        &self,
        user_id: &ObjectId,
        post_id: &ObjectId,
    ) -> Result<bool, CustomError> {
        Ok(self
            .likes
            .read()
            .await
            .iter()
            .any(|l| l.user_id == *user_id && l.post_id == *post_id))
    }

    async fn find_for_posts(&self, post_ids: &[ObjectId]) -> Result<Vec<Like>, CustomError> {
        Ok(self
            .likes
            .read()
            .await
            .iter()
            .filter(|l| post_ids.contains(&l.post_id))
            .cloned()
            .collect())
    }

    async fn delete_for_post(&self, post_id: &ObjectId) -> Result<u64, CustomError> {
        let mut likes = self.likes.write().await;
        let before = likes.len();
        likes.retain(|l| l.post_id != *post_id);
        Ok((before - likes.len()) as u64)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn insert(&self, comment: &Comment) -> Result<(), CustomError> {
        self.comments.write().await.push(comment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Comment>, CustomError> {
        Ok(self.comments.read().await.iter().find(|c| c.id == *id).cloned())
    }

    async fn delete_authored(
        &self,
        id: &ObjectId,
        author_id: &ObjectId,
    ) -> Result<bool, CustomError> {
        let mut comments = self.comments.write().await;
        let before = comments.len();
        comments.retain(|c| !(c.id == *id && c.author_id == *author_id));
        Ok(comments.len() < before)
    }

    async fn delete_by_id(&self, id: &ObjectId) -> Result<bool, CustomError> {
        let mut comments = self.comments.write().await;
        let before = comments.len();
        comments.retain(|c| c.id != *id);
        Ok(comments.len() < before)
    }

    async fn find_for_posts(&self, post_ids: &[ObjectId]) -> Result<Vec<Comment>, CustomError> {
        let mut found: Vec<Comment> = self
            .comments
            .read()
            .await
            .iter()
            .filter(|c| post_ids.contains(&c.post_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(found)
    }

    async fn delete_for_post(&self, post_id: &ObjectId) -> Result<u64, CustomError> {
        let mut comments = self.comments.write().await;
        let before = comments.len();
        comments.retain(|c| c.post_id != *post_id);
        Ok((before - comments.len()) as u64)
    }
}

#[async_trait]
impl ConnectionRepository for MemoryStore {
    async fn insert(&self, request: &ConnectionRequest) -> Result<InsertOutcome, CustomError> {
        let mut requests = self.requests.write().await;
        if requests.iter().any(|r| r.pair_key == request.pair_key) {
            return Ok(InsertOutcome::Duplicate);
        }
        requests.push(request.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn find_between(
        &self,
        a: &ObjectId,
        b: &ObjectId,
    ) -> Result<Option<ConnectionRequest>, CustomError> {
        let key = pair_key(a, b);
        Ok(self
            .requests
            .read()
            .await
            .iter()
            .find(|r| r.pair_key == key)
            .cloned())
    }

    async fn delete_pending(
        &self,
        sender_id: &ObjectId,
        receiver_id: &ObjectId,
    ) -> Result<bool, CustomError> {
        let mut requests = self.requests.write().await;
        let before = requests.len();
        requests.retain(|r| {
            !(r.sender_id == *sender_id
                && r.receiver_id == *receiver_id
                && r.status == RequestStatus::Pending)
        });
        Ok(requests.len() < before)
    }

    async fn review_pending(
        &self,
        sender_id: &ObjectId,
        receiver_id: &ObjectId,
        status: RequestStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<ConnectionRequest>, CustomError> {
        let mut requests = self.requests.write().await;
        let Some(request) = requests.iter_mut().find(|r| {
            r.sender_id == *sender_id
                && r.receiver_id == *receiver_id
                && r.status == RequestStatus::Pending
        }) else {
            return Ok(None);
        };
        request.status = status;
        request.updated_at = at;
        Ok(Some(request.clone()))
    }

    async fn find_pending_to(
        &self,
        receiver_id: &ObjectId,
    ) -> Result<Vec<ConnectionRequest>, CustomError> {
        Ok(self
            .requests
            .read()
            .await
            .iter()
            .filter(|r| r.receiver_id == *receiver_id && r.status == RequestStatus::Pending)
            .cloned()
            .collect())
    }

    async fn find_pending_from(
        &self,
        sender_id: &ObjectId,
    ) -> Result<Vec<ConnectionRequest>, CustomError> {
        Ok(self
            .requests
            .read()
            .await
            .iter()
            .filter(|r| r.sender_id == *sender_id && r.status == RequestStatus::Pending)
            .cloned()
            .collect())
    }

    async fn find_accepted_involving(
        &self,
        user_id: &ObjectId,
    ) -> Result<Vec<ConnectionRequest>, CustomError> {
        Ok(self
            .requests
            .read()
            .await
            .iter()
            .filter(|r| involves(r, user_id) && r.status == RequestStatus::Accepted)
            .cloned()
            .collect())
    }

    async fn find_involving(
        &self,
        user_id: &ObjectId,
    ) -> Result<Vec<ConnectionRequest>, CustomError> {
        Ok(self
            .requests
            .read()
            .await
            .iter()
            .filter(|r| involves(r, user_id))
            .cloned()
            .collect())
    }

    async fn count_accepted_involving(&self, user_id: &ObjectId) -> Result<u64, CustomError> {
        Ok(self
            .requests
            .read()
            .await
            .iter()
            .filter(|r| involves(r, user_id) && r.status == RequestStatus::Accepted)
            .count() as u64)
    }
}

/// Media store that hands out fake URLs and remembers what was released.
#[derive(Default)]
pub struct RecordingMedia {
    uploaded: RwLock<Vec<String>>,
    released: RwLock<Vec<String>>,
}

impl RecordingMedia {
    pub async fn uploaded(&self) -> Vec<String> {
        self.uploaded.read().await.clone()
    }

    pub async fn released(&self) -> Vec<String> {
        self.released.read().await.clone()
    }
}

#[async_trait]
impl MediaStore for RecordingMedia {
    async fn upload(&self, file: FileUpload) -> Result<String, CustomError> {
        let url = format!("https://img.test/posts/{}", file.file_name);
        self.uploaded.write().await.push(url.clone());
        Ok(url)
    }

    async fn release(&self, image_ref: &str) -> Result<(), CustomError> {
        self.released.write().await.push(image_ref.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_match_checks_every_name() {
        let ada = User {
            id: ObjectId::new(),
            first_name: "Ada".into(),
            last_name: Some("Lovelace".into()),
            user_name: Some("countess".into()),
            about: None,
        };
        assert!(matches_prefix(&ada, "ad"));
        assert!(matches_prefix(&ada, "LOVE"));
        assert!(matches_prefix(&ada, "count"));
        assert!(!matches_prefix(&ada, "lace"));
    }
}
