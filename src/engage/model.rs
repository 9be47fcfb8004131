use std::collections::HashMap;

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::user::model::PublicProfile;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Like {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub post_id: ObjectId,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Like {
    pub fn new(user_id: ObjectId, post_id: ObjectId) -> Self {
        Like {
            id: ObjectId::new(),
            user_id,
            post_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub post_id: ObjectId,
    pub author_id: ObjectId,
    pub text: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: ObjectId, author_id: ObjectId, text: String) -> Self {
        Comment {
            id: ObjectId::new(),
            post_id,
            author_id,
            text,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeToggle {
    Added,
    Removed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeSummary {
    pub liked_count: u64,
    pub is_liked: bool,
}

/// A comment as shown under a post.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub author: PublicProfile,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Self-service only; post owners moderate through a separate path.
    pub is_delete_allowed: bool,
}

/// Like summaries and comment threads for a batch of posts, keyed by post id.
#[derive(Debug, Default)]
pub struct PostEngagement {
    pub likes: HashMap<ObjectId, LikeSummary>,
    pub threads: HashMap<ObjectId, Vec<CommentView>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCommentRequest {
    #[serde(alias = "userComment")]
    pub text: String,
}
