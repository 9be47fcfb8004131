use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, web};
use log::warn;
use serde_json::json;

use crate::feed::model::{FeedQuery, PostSummary};
use crate::feed::service::FeedService;
use crate::middleware::auth::viewer_id;
use crate::post::post_model::{ImageChange, PostUpdate};
use crate::uploader::form::{FileUpload, read_post_form};
use crate::uploader::media::MediaStore;
use crate::utils::error::CustomError;
use crate::utils::helpers::{envelope, parse_object_id};

fn has_text(content: &Option<String>) -> bool {
    content.as_deref().is_some_and(|c| !c.trim().is_empty())
}

async fn upload_optional(
    media: &dyn MediaStore,
    file: Option<FileUpload>,
) -> Result<Option<String>, CustomError> {
    match file {
        Some(file) => Ok(Some(media.upload(file).await?)),
        None => Ok(None),
    }
}

/// Undo an upload whose post write failed.
async fn discard_upload(media: &dyn MediaStore, image_url: Option<String>) {
    if let Some(url) = image_url {
        if let Err(e) = media.release(&url).await {
            warn!("failed to discard orphaned upload {}: {}", url, e);
        }
    }
}

/// GET /feed?page&limit
pub async fn feed(
    req: HttpRequest,
    feed_service: web::Data<FeedService>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse, CustomError> {
    let user_id = viewer_id(&req)?;
    let posts = feed_service.feed(&user_id, query.page, query.limit).await?;

    Ok(HttpResponse::Ok().json(envelope(
        "Feed retrieved successfully",
        200,
        json!({ "posts": posts }),
    )))
}

/// GET /feed/myPosts
pub async fn my_posts(
    req: HttpRequest,
    feed_service: web::Data<FeedService>,
) -> Result<HttpResponse, CustomError> {
    let user_id = viewer_id(&req)?;
    let posts = feed_service.my_posts(&user_id).await?;

    Ok(HttpResponse::Ok().json(envelope(
        "Posts retrieved successfully",
        200,
        json!({ "data": posts }),
    )))
}

/// GET /feed/{id}; a missing post is 204, since stale links are expected.
pub async fn get_post(
    req: HttpRequest,
    feed_service: web::Data<FeedService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let user_id = viewer_id(&req)?;
    let post_id = parse_object_id(&path.into_inner(), "post")?;

    match feed_service.get_post(&post_id, &user_id).await {
        Ok(post) => Ok(HttpResponse::Ok().json(envelope(
            "Post fetched successfully",
            200,
            json!({ "post": post }),
        ))),
        Err(CustomError::NotFound(_)) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Err(e),
    }
}

/// POST /feed/create (multipart: content, image)
pub async fn create_post(
    req: HttpRequest,
    feed_service: web::Data<FeedService>,
    media: web::Data<dyn MediaStore>,
    payload: Multipart,
) -> Result<HttpResponse, CustomError> {
    let author_id = viewer_id(&req)?;
    let form = read_post_form(payload).await?;

    if form.remove_image {
        return Err(CustomError::InvalidInput(
            "removeImage only applies to updates".to_string(),
        ));
    }
    if !has_text(&form.content) && form.image.is_none() {
        return Err(CustomError::InvalidInput(
            "A post needs content or an image".to_string(),
        ));
    }

    let image_url = upload_optional(media.get_ref(), form.image).await?;
    match feed_service
        .create_post(&author_id, form.content, image_url.clone())
        .await
    {
        Ok(post) => Ok(HttpResponse::Created().json(envelope(
            "Post created successfully",
            201,
            json!({ "post": PostSummary::from(&post) }),
        ))),
        Err(e) => {
            discard_upload(media.get_ref(), image_url).await;
            Err(e)
        }
    }
}

/// PATCH /feed/{id} (multipart: content, image, removeImage)
pub async fn update_post(
    req: HttpRequest,
    feed_service: web::Data<FeedService>,
    media: web::Data<dyn MediaStore>,
    path: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse, CustomError> {
    let author_id = viewer_id(&req)?;
    let post_id = parse_object_id(&path.into_inner(), "post")?;
    let form = read_post_form(payload).await?;

    if form.image.is_some() && form.remove_image {
        return Err(CustomError::InvalidInput(
            "Cannot replace and remove the image at once".to_string(),
        ));
    }
    if !has_text(&form.content) && form.image.is_none() && !form.remove_image {
        return Err(CustomError::InvalidInput("Nothing to update".to_string()));
    }

    feed_service.require_owned(&author_id, &post_id).await?;

    let remove_image = form.remove_image;
    let new_image = upload_optional(media.get_ref(), form.image).await?;
    let image = match (&new_image, remove_image) {
        (Some(url), _) => ImageChange::Replace(url.clone()),
        (None, true) => ImageChange::Remove,
        (None, false) => ImageChange::Keep,
    };

    let result = match PostUpdate::new(form.content, image) {
        Ok(update) => feed_service.update_post(&author_id, &post_id, update).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(post) => Ok(HttpResponse::Ok().json(envelope(
            "Post updated successfully",
            200,
            json!({ "post": PostSummary::from(&post) }),
        ))),
        Err(e) => {
            discard_upload(media.get_ref(), new_image).await;
            Err(e)
        }
    }
}

/// DELETE /feed/{id}
pub async fn delete_post(
    req: HttpRequest,
    feed_service: web::Data<FeedService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let author_id = viewer_id(&req)?;
    let post_id = parse_object_id(&path.into_inner(), "post")?;

    feed_service.delete_post(&author_id, &post_id).await?;

    Ok(HttpResponse::Ok().json(envelope(
        "Post deleted successfully",
        200,
        json!({}),
    )))
}
