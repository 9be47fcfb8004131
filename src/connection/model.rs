use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::utils::error::CustomError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The only two outcomes a receiver may choose for a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Accepted,
    Rejected,
}

impl From<ReviewDecision> for RequestStatus {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Accepted => RequestStatus::Accepted,
            ReviewDecision::Rejected => RequestStatus::Rejected,
        }
    }
}

impl FromStr for ReviewDecision {
    type Err = CustomError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "accepted" => Ok(ReviewDecision::Accepted),
            "rejected" => Ok(ReviewDecision::Rejected),
            other => Err(CustomError::InvalidInput(format!(
                "Invalid review status '{}'",
                other
            ))),
        }
    }
}

/// Relationship between two users as seen by one of them.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    None,
    /// The viewer sent a request that is still pending.
    Pending,
    /// The viewer has a pending request waiting for their review.
    Received,
    Accepted,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConnectionRequest {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub sender_id: ObjectId,
    pub receiver_id: ObjectId,
    /// Direction-free key of the pair; unique across the collection.
    pub pair_key: String,
    pub status: RequestStatus,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

pub fn pair_key(a: &ObjectId, b: &ObjectId) -> String {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    format!("{}:{}", low.to_hex(), high.to_hex())
}

impl ConnectionRequest {
    /// A fresh pending request. Refuses self-connections before anything is written.
    pub fn new(sender_id: ObjectId, receiver_id: ObjectId) -> Result<Self, CustomError> {
        if sender_id == receiver_id {
            return Err(CustomError::InvalidInput(
                "Cannot send a connection request to yourself".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(ConnectionRequest {
            id: ObjectId::new(),
            pair_key: pair_key(&sender_id, &receiver_id),
            sender_id,
            receiver_id,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// The other side of the request from `viewer_id`'s point of view.
    pub fn counterpart(&self, viewer_id: &ObjectId) -> ObjectId {
        if self.sender_id == *viewer_id {
            self.receiver_id
        } else {
            self.sender_id
        }
    }

    pub fn status_for(&self, viewer_id: &ObjectId) -> ConnectionStatus {
        match self.status {
            RequestStatus::Pending if self.sender_id == *viewer_id => ConnectionStatus::Pending,
            RequestStatus::Pending => ConnectionStatus::Received,
            RequestStatus::Accepted => ConnectionStatus::Accepted,
            RequestStatus::Rejected => ConnectionStatus::Rejected,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    pub limit: Option<i64>,
}
