use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::connection::model::{ReviewDecision, SuggestionQuery};
use crate::connection::service::ConnectionService;
use crate::middleware::auth::viewer_id;
use crate::utils::error::CustomError;
use crate::utils::helpers::{envelope, parse_object_id};

/// POST /connection/request/{id}
pub async fn send_request(
    req: HttpRequest,
    connection_service: web::Data<ConnectionService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let sender_id = viewer_id(&req)?;
    let target_id = parse_object_id(&path.into_inner(), "user")?;

    let (request, target) = connection_service
        .send_request(&sender_id, &target_id)
        .await?;

    Ok(HttpResponse::Ok().json(envelope(
        &format!(
            "Connection request sent successfully to {}",
            target.display_name()
        ),
        200,
        json!({ "requestId": request.id.to_hex(), "status": request.status }),
    )))
}

/// POST /connection/withdraw/{id}
pub async fn withdraw_request(
    req: HttpRequest,
    connection_service: web::Data<ConnectionService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let sender_id = viewer_id(&req)?;
    let target_id = parse_object_id(&path.into_inner(), "user")?;

    connection_service
        .withdraw_request(&sender_id, &target_id)
        .await?;

    Ok(HttpResponse::Ok().json(envelope(
        "Connection request withdrawn successfully",
        200,
        json!({}),
    )))
}

/// POST /connection/review/{status}/{id}
pub async fn review_request(
    req: HttpRequest,
    connection_service: web::Data<ConnectionService>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, CustomError> {
    let reviewer_id = viewer_id(&req)?;
    let (status, sender) = path.into_inner();
    let decision: ReviewDecision = status.parse()?;
    let sender_id = parse_object_id(&sender, "user")?;

    let reviewed = connection_service
        .review_request(&reviewer_id, &sender_id, decision)
        .await?;

    Ok(HttpResponse::Ok().json(envelope(
        &format!("Successfully {} connection request", reviewed.status),
        200,
        json!({ "status": reviewed.status }),
    )))
}

/// GET /connection/suggestions
pub async fn suggestions(
    req: HttpRequest,
    connection_service: web::Data<ConnectionService>,
    query: web::Query<SuggestionQuery>,
) -> Result<HttpResponse, CustomError> {
    let user_id = viewer_id(&req)?;
    let data = connection_service.suggestions(&user_id, query.limit).await?;

    Ok(HttpResponse::Ok().json(envelope(
        "Suggestions retrieved successfully",
        200,
        json!({ "data": data }),
    )))
}

/// GET /connection/received
pub async fn received_requests(
    req: HttpRequest,
    connection_service: web::Data<ConnectionService>,
) -> Result<HttpResponse, CustomError> {
    let user_id = viewer_id(&req)?;
    let data = connection_service.received_requests(&user_id).await?;

    Ok(HttpResponse::Ok().json(envelope(
        "Received requests retrieved successfully",
        200,
        json!({ "count": data.len(), "data": data }),
    )))
}

/// GET /connection/sent
pub async fn sent_requests(
    req: HttpRequest,
    connection_service: web::Data<ConnectionService>,
) -> Result<HttpResponse, CustomError> {
    let user_id = viewer_id(&req)?;
    let data = connection_service.sent_requests(&user_id).await?;

    Ok(HttpResponse::Ok().json(envelope(
        "Sent requests retrieved successfully",
        200,
        json!({ "count": data.len(), "data": data }),
    )))
}

/// GET /connection
pub async fn connections(
    req: HttpRequest,
    connection_service: web::Data<ConnectionService>,
) -> Result<HttpResponse, CustomError> {
    let user_id = viewer_id(&req)?;
    let data = connection_service.connections(&user_id).await?;

    Ok(HttpResponse::Ok().json(envelope(
        "Connections retrieved successfully",
        200,
        json!({ "count": data.len(), "data": data }),
    )))
}
