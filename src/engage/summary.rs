//! Pure engagement read-model helpers: like summaries and comment threads
//! computed from already-fetched rows.

use std::collections::{HashMap, HashSet};

use mongodb::bson::oid::ObjectId;

use crate::engage::model::{Comment, CommentView, Like, LikeSummary};
use crate::user::model::PublicProfile;

pub fn like_summaries(likes: &[Like], viewer_id: &ObjectId) -> HashMap<ObjectId, LikeSummary> {
    let mut summaries: HashMap<ObjectId, LikeSummary> = HashMap::new();
    for like in likes {
        let summary = summaries.entry(like.post_id).or_default();
        summary.liked_count += 1;
        if like.user_id == *viewer_id {
            summary.is_liked = true;
        }
    }
    summaries
}

/// Comment views grouped by post, newest first. Comments whose author no
/// longer resolves are left out.
pub fn comment_views(
    comments: &[Comment],
    viewer_id: &ObjectId,
    profiles: &HashMap<ObjectId, PublicProfile>,
) -> HashMap<ObjectId, Vec<CommentView>> {
    let mut ordered: Vec<&Comment> = comments.iter().collect();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    let mut grouped: HashMap<ObjectId, Vec<CommentView>> = HashMap::new();
    for comment in ordered {
        let Some(author) = profiles.get(&comment.author_id) else {
            continue;
        };
        grouped.entry(comment.post_id).or_default().push(CommentView {
            id: comment.id.to_hex(),
            author: author.clone(),
            text: comment.text.clone(),
            created_at: comment.created_at,
            is_delete_allowed: comment.author_id == *viewer_id,
        });
    }
    grouped
}

pub fn commenter_ids(comments: &[Comment]) -> Vec<ObjectId> {
    let mut seen = HashSet::new();
    comments
        .iter()
        .map(|c| c.author_id)
        .filter(|id| seen.insert(*id))
        .collect()
}
