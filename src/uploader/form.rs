use actix_multipart::Multipart;
use futures_util::StreamExt;

use crate::utils::error::CustomError;

pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const MAX_TEXT_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

impl FileUpload {
    pub fn new(file_name: String, data: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            file_name,
            data,
            content_type,
        }
    }

    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.file_name.rsplit_once('.')?;
        Some(ext.to_lowercase())
    }
}

pub fn validate_image(file: &FileUpload) -> Result<(), CustomError> {
    let extension = file
        .extension()
        .ok_or_else(|| CustomError::InvalidInput("Image has no extension".to_string()))?;
    if !ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(CustomError::InvalidInput(format!(
            "Invalid image type '{}'. Allowed types: {}",
            extension,
            ALLOWED_IMAGE_EXTENSIONS.join(", ")
        )));
    }
    if file.data.is_empty() {
        return Err(CustomError::InvalidInput("Image is empty".to_string()));
    }
    if file.data.len() > MAX_IMAGE_BYTES {
        return Err(CustomError::InvalidInput(format!(
            "Image too large. Maximum size: {} bytes",
            MAX_IMAGE_BYTES
        )));
    }
    Ok(())
}

/// The allow-listed fields of a create or update post form.
#[derive(Debug, Default)]
pub struct PostForm {
    pub content: Option<String>,
    pub image: Option<FileUpload>,
    pub remove_image: bool,
}

async fn read_field(
    field: &mut actix_multipart::Field,
    limit: usize,
) -> Result<Vec<u8>, CustomError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk
            .map_err(|e| CustomError::InvalidInput(format!("Error reading form field: {}", e)))?;
        if data.len() + chunk.len() > limit {
            return Err(CustomError::InvalidInput(format!(
                "Form field exceeds {} bytes",
                limit
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

fn into_text(data: Vec<u8>) -> Result<String, CustomError> {
    String::from_utf8(data)
        .map_err(|_| CustomError::InvalidInput("Form text must be UTF-8".to_string()))
}

/// Read `content`, `image` and `removeImage`; any other field is rejected.
pub async fn read_post_form(mut payload: Multipart) -> Result<PostForm, CustomError> {
    let mut form = PostForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item
            .map_err(|e| CustomError::InvalidInput(format!("Malformed multipart body: {}", e)))?;

        let (name, file_name) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name().unwrap_or("").to_string(),
                cd.get_filename().map(str::to_string),
            ),
            None => continue,
        };

        match name.as_str() {
            "content" => {
                let text = into_text(read_field(&mut field, MAX_TEXT_BYTES).await?)?;
                form.content = Some(text);
            }
            "removeImage" => {
                let flag = into_text(read_field(&mut field, MAX_TEXT_BYTES).await?)?;
                form.remove_image = flag.trim() == "true";
            }
            "image" => {
                let content_type = field.content_type().map(|ct| ct.to_string());
                let data = read_field(&mut field, MAX_IMAGE_BYTES).await?;
                if data.is_empty() {
                    continue;
                }
                let upload = FileUpload::new(
                    file_name.unwrap_or_else(|| "unknown".to_string()),
                    data,
                    content_type,
                );
                validate_image(&upload)?;
                form.image = Some(upload);
            }
            other => {
                return Err(CustomError::InvalidInput(format!(
                    "Unknown form field '{}'",
                    other
                )));
            }
        }
    }

    Ok(form)
}
