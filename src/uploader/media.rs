use async_trait::async_trait;
use log::{info, warn};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};

use crate::config::CloudinaryConfig;
use crate::uploader::form::FileUpload;
use crate::utils::error::CustomError;

/// External image storage. Posts only ever hold the reference it returns.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, file: FileUpload) -> Result<String, CustomError>;

    async fn release(&self, image_ref: &str) -> Result<(), CustomError>;
}

#[derive(Debug, Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct CloudinaryError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorResponse {
    error: CloudinaryError,
}

pub struct CloudinaryMediaStore {
    config: CloudinaryConfig,
    client: reqwest::Client,
}

impl CloudinaryMediaStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        CloudinaryMediaStore {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/{}",
            self.config.cloud_name, action
        )
    }

    /// Cloudinary signs the alphabetically ordered params followed by the secret.
    fn sign(&self, params: &str, timestamp: i64) -> String {
        let to_sign = format!("{}&timestamp={}{}", params, timestamp, self.config.api_secret);
        let mut hasher = Sha1::new();
        hasher.update(to_sign.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Recover the public id (`folder/name`) from a delivery URL.
pub fn public_id_from_url(url: &str, folder: &str) -> Option<String> {
    let file_name = url.trim_end_matches('/').rsplit('/').next()?;
    let stem = file_name.split('.').next()?;
    if stem.is_empty() {
        return None;
    }
    Some(format!("{}/{}", folder, stem))
}

#[async_trait]
impl MediaStore for CloudinaryMediaStore {
    async fn upload(&self, file: FileUpload) -> Result<String, CustomError> {
        let timestamp = chrono::Utc::now().timestamp();
        let public_id = uuid::Uuid::new_v4().simple().to_string();
        let params = format!("folder={}&public_id={}", self.config.folder, public_id);
        let signature = self.sign(&params, timestamp);

        let mime = file
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let file_part = Part::bytes(file.data)
            .file_name(file.file_name)
            .mime_str(&mime)
            .map_err(|e| CustomError::InvalidInput(format!("Invalid image content type: {}", e)))?;

        let form = Form::new()
            .part("file", file_part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("folder", self.config.folder.clone())
            .text("public_id", public_id)
            .text("signature", signature);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| CustomError::Unexpected(format!("image upload request failed: {}", e)))?;

        if response.status().is_success() {
            let uploaded = response
                .json::<CloudinaryUploadResponse>()
                .await
                .map_err(|e| CustomError::Unexpected(format!("bad upload response: {}", e)))?;
            info!("image uploaded to {}", uploaded.secure_url);
            Ok(uploaded.secure_url)
        } else {
            let message = response
                .json::<CloudinaryErrorResponse>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_else(|e| format!("unreadable error body: {}", e));
            Err(CustomError::Unexpected(format!(
                "image upload rejected: {}",
                message
            )))
        }
    }

    async fn release(&self, image_ref: &str) -> Result<(), CustomError> {
        let Some(public_id) = public_id_from_url(image_ref, &self.config.folder) else {
            warn!("cannot derive a public id from {}", image_ref);
            return Ok(());
        };
        let timestamp = chrono::Utc::now().timestamp();
        let signature = self.sign(&format!("public_id={}", public_id), timestamp);

        let form = Form::new()
            .text("public_id", public_id.clone())
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("signature", signature);

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| CustomError::Unexpected(format!("image release request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(CustomError::Unexpected(format!(
                "image release for {} returned {}",
                public_id,
                response.status()
            )));
        }
        info!("image {} released", public_id);
        Ok(())
    }
}

/// Used when no media credentials are configured.
pub struct DisabledMediaStore;

#[async_trait]
impl MediaStore for DisabledMediaStore {
    async fn upload(&self, _file: FileUpload) -> Result<String, CustomError> {
        Err(CustomError::InvalidInput(
            "Image uploads are disabled".to_string(),
        ))
    }

    async fn release(&self, image_ref: &str) -> Result<(), CustomError> {
        info!("media store disabled, not releasing {}", image_ref);
        Ok(())
    }
}
