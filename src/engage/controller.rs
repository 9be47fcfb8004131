use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::engage::model::{CreateCommentRequest, LikeToggle};
use crate::engage::service::EngagementService;
use crate::middleware::auth::viewer_id;
use crate::utils::error::CustomError;
use crate::utils::helpers::{envelope, parse_object_id};

/// POST /engage/like/{post_id}
pub async fn toggle_like(
    req: HttpRequest,
    engagement_service: web::Data<EngagementService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let user_id = viewer_id(&req)?;
    let post_id = parse_object_id(&path.into_inner(), "post")?;

    let (outcome, summary) = engagement_service.toggle_like(&user_id, &post_id).await?;
    let message = match outcome {
        LikeToggle::Added => "Post liked successfully",
        LikeToggle::Removed => "Post unliked successfully",
    };

    Ok(HttpResponse::Ok().json(envelope(
        message,
        200,
        json!({ "liked": summary.is_liked, "likedCount": summary.liked_count }),
    )))
}

/// POST /engage/comment/{post_id}
pub async fn add_comment(
    req: HttpRequest,
    engagement_service: web::Data<EngagementService>,
    path: web::Path<String>,
    body: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, CustomError> {
    let user_id = viewer_id(&req)?;
    let post_id = parse_object_id(&path.into_inner(), "post")?;

    let comment_id = engagement_service
        .add_comment(&user_id, &post_id, &body.text)
        .await?;

    Ok(HttpResponse::Created().json(envelope(
        "Comment added successfully",
        201,
        json!({ "id": comment_id.to_hex() }),
    )))
}

/// DELETE /engage/comment/{comment_id}
pub async fn delete_comment(
    req: HttpRequest,
    engagement_service: web::Data<EngagementService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let user_id = viewer_id(&req)?;
    let comment_id = parse_object_id(&path.into_inner(), "comment")?;

    engagement_service
        .delete_comment(&user_id, &comment_id)
        .await?;

    Ok(HttpResponse::Ok().json(envelope(
        "Comment deleted successfully",
        200,
        json!({}),
    )))
}

/// DELETE /engage/admin/comment/{comment_id}
pub async fn moderate_delete_comment(
    req: HttpRequest,
    engagement_service: web::Data<EngagementService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let user_id = viewer_id(&req)?;
    let comment_id = parse_object_id(&path.into_inner(), "comment")?;

    engagement_service
        .moderate_delete_comment(&user_id, &comment_id)
        .await?;

    Ok(HttpResponse::Ok().json(envelope(
        "Comment deleted successfully",
        200,
        json!({}),
    )))
}
