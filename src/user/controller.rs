use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::{json, to_value};

use crate::feed::service::FeedService;
use crate::middleware::auth::viewer_id;
use crate::user::model::SearchQuery;
use crate::user::service::UserService;
use crate::utils::error::CustomError;
use crate::utils::helpers::{envelope, parse_object_id};

/// GET /user/{id}
pub async fn get_profile(
    req: HttpRequest,
    feed_service: web::Data<FeedService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let viewer = viewer_id(&req)?;
    let user_id = parse_object_id(&path.into_inner(), "user")?;

    let profile = feed_service.user_profile(&viewer, &user_id).await?;
    let data = to_value(&profile)
        .map_err(|e| CustomError::Unexpected(format!("profile serialization: {}", e)))?;

    Ok(HttpResponse::Ok().json(envelope("Profile retrieved successfully", 200, data)))
}

/// GET /engage/users?q=
pub async fn search_users(
    req: HttpRequest,
    user_service: web::Data<UserService>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, CustomError> {
    let viewer = viewer_id(&req)?;
    let q = query.q.clone().unwrap_or_default();

    let data = user_service.search_users(&viewer, &q, query.limit).await?;

    Ok(HttpResponse::Ok().json(envelope(
        "Users retrieved successfully",
        200,
        json!({ "data": data }),
    )))
}
