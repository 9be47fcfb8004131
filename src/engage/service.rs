use std::collections::HashMap;
use std::sync::Arc;

use log::{info, warn};
use mongodb::bson::oid::ObjectId;

use crate::database::InsertOutcome;
use crate::engage::model::{Comment, Like, LikeSummary, LikeToggle, PostEngagement};
use crate::engage::repository::{CommentRepository, LikeRepository};
use crate::engage::summary::{comment_views, commenter_ids, like_summaries};
use crate::post::post_repository::PostRepository;
use crate::user::model::PublicProfile;
use crate::user::repository::UserDirectory;
use crate::utils::error::CustomError;

pub struct EngagementService {
    likes: Arc<dyn LikeRepository>,
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserDirectory>,
}

impl EngagementService {
    pub fn new(
        likes: Arc<dyn LikeRepository>,
        comments: Arc<dyn CommentRepository>,
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        EngagementService {
            likes,
            comments,
            posts,
            users,
        }
    }

    async fn require_post(&self, post_id: &ObjectId) -> Result<(), CustomError> {
        if !self.posts.exists(post_id).await? {
            return Err(CustomError::NotFound("Post not found".to_string()));
        }
        Ok(())
    }

    /// Flip the viewer's like on a post and report the resulting summary.
    pub async fn toggle_like(
        &self,
        user_id: &ObjectId,
        post_id: &ObjectId,
    ) -> Result<(LikeToggle, LikeSummary), CustomError> {
        self.require_post(post_id).await?;

        let outcome = if self.likes.delete_pair(user_id, post_id).await? {
            LikeToggle::Removed
        } else {
            match self.likes.insert(&Like::new(*user_id, *post_id)).await? {
                InsertOutcome::Inserted => LikeToggle::Added,
                InsertOutcome::Duplicate => {
                    // A concurrent submit created the like first; the pair is liked.
                    warn!("duplicate like for user {} on post {} ignored", user_id, post_id);
                    LikeToggle::Added
                }
            }
        };

        let summary = self.like_summary(post_id, user_id).await?;
        Ok((outcome, summary))
    }

    pub async fn add_comment(
        &self,
        user_id: &ObjectId,
        post_id: &ObjectId,
        text: &str,
    ) -> Result<ObjectId, CustomError> {
        self.require_post(post_id).await?;

        let text = text.trim();
        if text.is_empty() {
            return Err(CustomError::InvalidInput(
                "Comment content cannot be empty".to_string(),
            ));
        }

        let comment = Comment::new(*post_id, *user_id, text.to_string());
        self.comments.insert(&comment).await?;
        info!("comment {} added to post {} by {}", comment.id, post_id, user_id);
        Ok(comment.id)
    }

    /// Self-service delete; a missing comment and someone else's comment fail alike.
    pub async fn delete_comment(
        &self,
        requester_id: &ObjectId,
        comment_id: &ObjectId,
    ) -> Result<(), CustomError> {
        if !self.comments.delete_authored(comment_id, requester_id).await? {
            return Err(CustomError::NotFound(
                "Comment not found or not authorized".to_string(),
            ));
        }
        Ok(())
    }

    /// Moderation delete by the owner of the post the comment sits under.
    pub async fn moderate_delete_comment(
        &self,
        requester_id: &ObjectId,
        comment_id: &ObjectId,
    ) -> Result<(), CustomError> {
        let comment = self
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| CustomError::NotFound("Comment not found".to_string()))?;
        let post = self
            .posts
            .find_by_id(&comment.post_id)
            .await?
            .ok_or_else(|| CustomError::NotFound("Comment not found".to_string()))?;

        if post.author_id != *requester_id {
            return Err(CustomError::Forbidden(
                "Unauthorized to delete this comment".to_string(),
            ));
        }

        self.comments.delete_by_id(comment_id).await?;
        info!(
            "comment {} on post {} removed by post owner {}",
            comment_id, post.id, requester_id
        );
        Ok(())
    }

    pub async fn like_summary(
        &self,
        post_id: &ObjectId,
        viewer_id: &ObjectId,
    ) -> Result<LikeSummary, CustomError> {
        Ok(LikeSummary {
            liked_count: self.likes.count_for_post(post_id).await?,
            is_liked: self.likes.exists_pair(viewer_id, post_id).await?,
        })
    }

    /// Like summaries and comment threads for a batch of posts in three queries.
    pub async fn post_engagement(
        &self,
        post_ids: &[ObjectId],
        viewer_id: &ObjectId,
    ) -> Result<PostEngagement, CustomError> {
        if post_ids.is_empty() {
            return Ok(PostEngagement::default());
        }
        let likes = self.likes.find_for_posts(post_ids).await?;
        let comments = self.comments.find_for_posts(post_ids).await?;

        let profiles: HashMap<ObjectId, PublicProfile> = self
            .users
            .find_many(&commenter_ids(&comments))
            .await?
            .iter()
            .map(|user| (user.id, PublicProfile::from(user)))
            .collect();

        Ok(PostEngagement {
            likes: like_summaries(&likes, viewer_id),
            threads: comment_views(&comments, viewer_id, &profiles),
        })
    }

    /// Remove every like and comment under a post. Only the post delete path calls this.
    pub(crate) async fn cascade_delete_for_post(
        &self,
        post_id: &ObjectId,
    ) -> Result<(u64, u64), CustomError> {
        let likes = self.likes.delete_for_post(post_id).await?;
        let comments = self.comments.delete_for_post(post_id).await?;
        Ok((likes, comments))
    }
}
