//! Pure read-model assembly: combines stored posts, their engagement and
//! author profiles into per-viewer views without touching the store.

use std::collections::{HashMap, HashSet};

use mongodb::bson::oid::ObjectId;

use crate::engage::model::PostEngagement;
use crate::feed::model::PostView;
use crate::post::post_model::Post;
use crate::user::model::PublicProfile;
use crate::utils::helpers::clamp_or;

pub const MAX_PAGE: i64 = 15;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 50;

/// Clamp the requested page and size, returning `(skip, limit)` for the store.
pub fn page_window(page: Option<i64>, page_size: Option<i64>) -> (u64, i64) {
    let page = clamp_or(page, 1, 1, MAX_PAGE);
    let size = clamp_or(page_size, DEFAULT_PAGE_SIZE, 1, MAX_PAGE_SIZE);
    (((page - 1) * size) as u64, size)
}

pub fn author_ids(posts: &[Post]) -> Vec<ObjectId> {
    let mut seen = HashSet::new();
    posts
        .iter()
        .map(|p| p.author_id)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Build views in the order `posts` arrived in.
pub fn assemble(
    posts: Vec<Post>,
    mut engagement: PostEngagement,
    authors: &HashMap<ObjectId, PublicProfile>,
    viewer_id: &ObjectId,
) -> Vec<PostView> {
    posts
        .into_iter()
        .map(|post| {
            let summary = engagement.likes.get(&post.id).copied().unwrap_or_default();
            let comments = engagement.threads.remove(&post.id).unwrap_or_default();
            PostView {
                id: post.id.to_hex(),
                posted_by: authors.get(&post.author_id).cloned(),
                is_editing_allowed: post.author_id == *viewer_id,
                content: post.content,
                image_url: post.image_url,
                created_at: post.created_at,
                updated_at: post.updated_at,
                liked_count: summary.liked_count,
                is_liked: summary.is_liked,
                comments_count: comments.len(),
                comments,
            }
        })
        .collect()
}
