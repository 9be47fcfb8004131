use std::sync::Arc;

use mongodb::bson::oid::ObjectId;

use crate::user::model::PublicProfile;
use crate::user::repository::UserDirectory;
use crate::utils::error::CustomError;
use crate::utils::helpers::clamp_or;

pub const SEARCH_LIMIT: i64 = 10;

pub struct UserService {
    users: Arc<dyn UserDirectory>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        UserService { users }
    }

    /// Prefix search over user names, never returning the viewer.
    pub async fn search_users(
        &self,
        viewer_id: &ObjectId,
        query: &str,
        limit: Option<i64>,
    ) -> Result<Vec<PublicProfile>, CustomError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let limit = clamp_or(limit, SEARCH_LIMIT, 1, SEARCH_LIMIT) as usize;

        let users = self.users.search_prefix(query, viewer_id, limit).await?;
        Ok(users.iter().map(PublicProfile::from).collect())
    }
}
