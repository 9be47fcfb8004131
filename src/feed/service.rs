use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};
use mongodb::bson::oid::ObjectId;

use crate::connection::service::ConnectionService;
use crate::engage::service::EngagementService;
use crate::feed::enrich::{assemble, author_ids, page_window};
use crate::feed::model::{PostView, ProfileView};
use crate::post::post_model::{Post, PostUpdate};
use crate::post::post_repository::PostRepository;
use crate::uploader::media::MediaStore;
use crate::user::model::PublicProfile;
use crate::user::repository::UserDirectory;
use crate::utils::error::CustomError;

/// Collaborators the feed service is built from.
pub struct FeedDeps {
    pub posts: Arc<dyn PostRepository>,
    pub users: Arc<dyn UserDirectory>,
    pub media: Arc<dyn MediaStore>,
    pub engagement: Arc<EngagementService>,
    pub connections: Arc<ConnectionService>,
}

pub struct FeedService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserDirectory>,
    media: Arc<dyn MediaStore>,
    engagement: Arc<EngagementService>,
    connections: Arc<ConnectionService>,
}

impl FeedService {
    pub fn new(deps: FeedDeps) -> Self {
        FeedService {
            posts: deps.posts,
            users: deps.users,
            media: deps.media,
            engagement: deps.engagement,
            connections: deps.connections,
        }
    }

    /// Attach engagement and author profiles to a batch of posts.
    async fn enrich(&self, posts: Vec<Post>, viewer_id: &ObjectId) -> Result<Vec<PostView>, CustomError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }
        let post_ids: Vec<ObjectId> = posts.iter().map(|p| p.id).collect();
        let engagement = self.engagement.post_engagement(&post_ids, viewer_id).await?;

        let authors: HashMap<ObjectId, PublicProfile> = self
            .users
            .find_many(&author_ids(&posts))
            .await?
            .iter()
            .map(|user| (user.id, PublicProfile::from(user)))
            .collect();

        Ok(assemble(posts, engagement, &authors, viewer_id))
    }

    /// A page of other users' posts, most recently updated first.
    pub async fn feed(
        &self,
        viewer_id: &ObjectId,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> Result<Vec<PostView>, CustomError> {
        let (skip, limit) = page_window(page, page_size);
        let posts = self.posts.find_page_excluding(viewer_id, skip, limit).await?;
        self.enrich(posts, viewer_id).await
    }

    pub async fn my_posts(&self, owner_id: &ObjectId) -> Result<Vec<PostView>, CustomError> {
        let posts = self.posts.find_by_author(owner_id).await?;
        self.enrich(posts, owner_id).await
    }

    pub async fn get_post(&self, id: &ObjectId, viewer_id: &ObjectId) -> Result<PostView, CustomError> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| CustomError::NotFound("No post found".to_string()))?;

        self.enrich(vec![post], viewer_id)
            .await?
            .pop()
            .ok_or_else(|| CustomError::NotFound("No post found".to_string()))
    }

    pub async fn create_post(
        &self,
        author_id: &ObjectId,
        content: Option<String>,
        image_url: Option<String>,
    ) -> Result<Post, CustomError> {
        let post = Post::new(*author_id, content, image_url)?;
        self.posts.insert(&post).await?;
        info!("post {} created by {}", post.id, author_id);
        Ok(post)
    }

    /// Ownership-scoped existence check, run before any media work for an edit.
    pub async fn require_owned(&self, author_id: &ObjectId, post_id: &ObjectId) -> Result<(), CustomError> {
        match self.posts.find_owned(post_id, author_id).await? {
            Some(_) => Ok(()),
            None => Err(CustomError::NotFound("Post not found".to_string())),
        }
    }

    pub async fn update_post(
        &self,
        author_id: &ObjectId,
        post_id: &ObjectId,
        update: PostUpdate,
    ) -> Result<Post, CustomError> {
        let not_found = || CustomError::NotFound("Post not found".to_string());
        let current = self
            .posts
            .find_owned(post_id, author_id)
            .await?
            .ok_or_else(not_found)?;

        let applied = update.apply_to(&current)?;
        let updated = self
            .posts
            .update_owned(
                post_id,
                author_id,
                current.image_url.as_deref(),
                applied.content,
                applied.image_url,
                Utc::now(),
            )
            .await?
            .ok_or_else(|| {
                CustomError::Conflict("Post was changed by another request, try again".to_string())
            })?;

        if let Some(old_image) = applied.released_image {
            self.release_image(&old_image).await;
        }
        info!("post {} updated by {}", post_id, author_id);
        Ok(updated)
    }

    /// Delete an owned post. Engagement goes first so a crash leaves only
    /// orphaned likes or comments, never a post missing its children.
    pub async fn delete_post(&self, author_id: &ObjectId, post_id: &ObjectId) -> Result<(), CustomError> {
        let post = self
            .posts
            .find_owned(post_id, author_id)
            .await?
            .ok_or_else(|| CustomError::NotFound("Post not found".to_string()))?;

        let (likes, comments) = self.engagement.cascade_delete_for_post(post_id).await?;
        if !self.posts.delete_owned(post_id, author_id).await? {
            return Err(CustomError::NotFound("Post not found".to_string()));
        }

        if let Some(image) = &post.image_url {
            self.release_image(image).await;
        }
        info!(
            "post {} deleted by {} with {} like(s) and {} comment(s)",
            post_id, author_id, likes, comments
        );
        Ok(())
    }

    /// Another user's profile with their posts and the viewer's relationship to them.
    pub async fn user_profile(
        &self,
        viewer_id: &ObjectId,
        user_id: &ObjectId,
    ) -> Result<ProfileView, CustomError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| CustomError::NotFound("User not found".to_string()))?;

        let posts_count = self.posts.count_by_author(user_id).await?;
        let posts = self.posts.find_by_author(user_id).await?;
        let posts = self.enrich(posts, viewer_id).await?;

        Ok(ProfileView {
            is_self: viewer_id == user_id,
            id: user.id.to_hex(),
            first_name: user.first_name,
            last_name: user.last_name,
            user_name: user.user_name,
            about: user.about,
            posts,
            posts_count,
            connection_status: self.connections.connection_status(viewer_id, user_id).await?,
            follower_count: self.connections.follower_count(user_id).await?,
        })
    }

    /// Media release never fails the operation that triggered it.
    async fn release_image(&self, image_url: &str) {
        if let Err(e) = self.media.release(image_url).await {
            warn!("failed to release image {}: {}", image_url, e);
        }
    }
}
