use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};
use mongodb::bson::oid::ObjectId;

use crate::connection::model::{
    ConnectionRequest, ConnectionStatus, RequestStatus, ReviewDecision,
};
use crate::connection::repository::ConnectionRepository;
use crate::database::InsertOutcome;
use crate::user::model::{PublicProfile, User};
use crate::user::repository::UserDirectory;
use crate::utils::error::CustomError;
use crate::utils::helpers::clamp_or;

/// Upper bound on suggestions per call, whatever the caller asks for.
pub const MAX_SUGGESTIONS: i64 = 10;

pub struct ConnectionService {
    requests: Arc<dyn ConnectionRepository>,
    users: Arc<dyn UserDirectory>,
}

impl ConnectionService {
    pub fn new(requests: Arc<dyn ConnectionRepository>, users: Arc<dyn UserDirectory>) -> Self {
        ConnectionService { requests, users }
    }

    async fn require_user(&self, id: &ObjectId) -> Result<User, CustomError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| CustomError::NotFound("User not found".to_string()))
    }

    /// Create a pending `sender -> target` request, returning it with the target's profile.
    pub async fn send_request(
        &self,
        sender_id: &ObjectId,
        target_id: &ObjectId,
    ) -> Result<(ConnectionRequest, User), CustomError> {
        let target = self.require_user(target_id).await?;
        let request = ConnectionRequest::new(*sender_id, target.id)?;

        // The unique pair index decides; two users requesting each other at once
        // end with exactly one document.
        match self.requests.insert(&request).await? {
            InsertOutcome::Inserted => {
                info!(
                    "connection request {} sent from {} to {}",
                    request.id, sender_id, target_id
                );
                Ok((request, target))
            }
            InsertOutcome::Duplicate => Err(CustomError::Conflict(
                "Connection request already sent".to_string(),
            )),
        }
    }

    /// Delete the caller's own pending request to `target`.
    pub async fn withdraw_request(
        &self,
        sender_id: &ObjectId,
        target_id: &ObjectId,
    ) -> Result<(), CustomError> {
        self.require_user(target_id).await?;

        if !self.requests.delete_pending(sender_id, target_id).await? {
            return Err(CustomError::Conflict(
                "No pending request found to withdraw".to_string(),
            ));
        }
        info!("connection request from {} to {} withdrawn", sender_id, target_id);
        Ok(())
    }

    /// Accept or reject the pending request `sender -> reviewer`.
    pub async fn review_request(
        &self,
        reviewer_id: &ObjectId,
        sender_id: &ObjectId,
        decision: ReviewDecision,
    ) -> Result<ConnectionRequest, CustomError> {
        self.require_user(sender_id).await?;

        let status = RequestStatus::from(decision);
        let reviewed = self
            .requests
            .review_pending(sender_id, reviewer_id, status, Utc::now())
            .await?
            .ok_or_else(|| CustomError::NotFound("No Connection Request".to_string()))?;

        info!(
            "connection request {} from {} {} by {}",
            reviewed.id, sender_id, status, reviewer_id
        );
        Ok(reviewed)
    }

    /// Random users with no request of any status involving `user_id`.
    pub async fn suggestions(
        &self,
        user_id: &ObjectId,
        limit: Option<i64>,
    ) -> Result<Vec<PublicProfile>, CustomError> {
        let size = clamp_or(limit, MAX_SUGGESTIONS, 1, MAX_SUGGESTIONS) as usize;

        let mut excluded: HashSet<ObjectId> = HashSet::new();
        excluded.insert(*user_id);
        for request in self.requests.find_involving(user_id).await? {
            excluded.insert(request.sender_id);
            excluded.insert(request.receiver_id);
        }
        let excluded: Vec<ObjectId> = excluded.into_iter().collect();

        let users = self.users.sample_excluding(&excluded, size).await?;
        Ok(users.iter().map(PublicProfile::from).collect())
    }

    pub async fn received_requests(
        &self,
        user_id: &ObjectId,
    ) -> Result<Vec<PublicProfile>, CustomError> {
        let requests = self.requests.find_pending_to(user_id).await?;
        let senders: Vec<ObjectId> = requests.iter().map(|r| r.sender_id).collect();
        self.resolve_profiles(&senders).await
    }

    pub async fn sent_requests(
        &self,
        user_id: &ObjectId,
    ) -> Result<Vec<PublicProfile>, CustomError> {
        let requests = self.requests.find_pending_from(user_id).await?;
        let receivers: Vec<ObjectId> = requests.iter().map(|r| r.receiver_id).collect();
        self.resolve_profiles(&receivers).await
    }

    pub async fn connections(&self, user_id: &ObjectId) -> Result<Vec<PublicProfile>, CustomError> {
        let accepted = self.requests.find_accepted_involving(user_id).await?;
        let others: Vec<ObjectId> = accepted.iter().map(|r| r.counterpart(user_id)).collect();
        self.resolve_profiles(&others).await
    }

    pub async fn follower_count(&self, user_id: &ObjectId) -> Result<u64, CustomError> {
        self.requests.count_accepted_involving(user_id).await
    }

    pub async fn connection_status(
        &self,
        viewer_id: &ObjectId,
        other_id: &ObjectId,
    ) -> Result<ConnectionStatus, CustomError> {
        if viewer_id == other_id {
            return Ok(ConnectionStatus::None);
        }
        Ok(self
            .requests
            .find_between(viewer_id, other_id)
            .await?
            .map(|request| request.status_for(viewer_id))
            .unwrap_or(ConnectionStatus::None))
    }

    /// Profiles in the order of `ids`; ids without a user document are dropped.
    async fn resolve_profiles(&self, ids: &[ObjectId]) -> Result<Vec<PublicProfile>, CustomError> {
        let users = self.users.find_many(ids).await?;
        let by_id: HashMap<ObjectId, &User> = users.iter().map(|u| (u.id, u)).collect();

        let profiles: Vec<PublicProfile> = ids
            .iter()
            .filter_map(|id| by_id.get(id).map(|user| PublicProfile::from(*user)))
            .collect();
        if profiles.len() < ids.len() {
            warn!(
                "{} connection counterpart(s) no longer exist",
                ids.len() - profiles.len()
            );
        }
        Ok(profiles)
    }
}
