use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::utils::error::CustomError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub author_id: ObjectId,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Post {
    pub fn new(
        author_id: ObjectId,
        content: Option<String>,
        image_url: Option<String>,
    ) -> Result<Self, CustomError> {
        let content = non_blank(content);
        let image_url = non_blank(image_url);
        if content.is_none() && image_url.is_none() {
            return Err(CustomError::InvalidInput(
                "A post needs content or an image".to_string(),
            ));
        }

        let now = Utc::now();
        Ok(Post {
            id: ObjectId::new(),
            author_id,
            content,
            image_url,
            created_at: now,
            updated_at: now,
        })
    }
}

/// What an update does to the attached image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageChange {
    Keep,
    Replace(String),
    Remove,
}

/// The only fields of a post its author may change.
#[derive(Debug, Clone)]
pub struct PostUpdate {
    pub content: Option<String>,
    pub image: ImageChange,
}

/// Field values after applying an update, plus the image that is no longer referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedUpdate {
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub released_image: Option<String>,
}

impl PostUpdate {
    pub fn new(content: Option<String>, image: ImageChange) -> Result<Self, CustomError> {
        let update = PostUpdate {
            content: non_blank(content),
            image,
        };
        if update.content.is_none() && update.image == ImageChange::Keep {
            return Err(CustomError::InvalidInput("Nothing to update".to_string()));
        }
        Ok(update)
    }

    /// Resolve the new field values against the stored post.
    pub fn apply_to(&self, post: &Post) -> Result<AppliedUpdate, CustomError> {
        let content = self.content.clone().or_else(|| post.content.clone());
        let (image_url, released_image) = match &self.image {
            ImageChange::Keep => (post.image_url.clone(), None),
            ImageChange::Replace(new_ref) => (Some(new_ref.clone()), post.image_url.clone()),
            ImageChange::Remove => (None, post.image_url.clone()),
        };
        if content.is_none() && image_url.is_none() {
            return Err(CustomError::InvalidInput(
                "A post needs content or an image".to_string(),
            ));
        }
        Ok(AppliedUpdate {
            content,
            image_url,
            released_image,
        })
    }
}
