use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::connection::model::ConnectionStatus;
use crate::engage::model::CommentView;
use crate::post::post_model::Post;
use crate::user::model::PublicProfile;

/// A post with its engagement computed for one viewer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    /// `None` when the author's user document is gone.
    pub posted_by: Option<PublicProfile>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub liked_count: u64,
    pub is_liked: bool,
    pub comments_count: usize,
    pub comments: Vec<CommentView>,
    pub is_editing_allowed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub is_self: bool,
    pub id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub user_name: Option<String>,
    pub about: Option<String>,
    pub posts: Vec<PostView>,
    pub posts_count: u64,
    pub connection_status: ConnectionStatus,
    pub follower_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// A stored post as returned by the write endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: String,
    pub posted_by: String,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        PostSummary {
            id: post.id.to_hex(),
            posted_by: post.author_id.to_hex(),
            content: post.content.clone(),
            image_url: post.image_url.clone(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}
