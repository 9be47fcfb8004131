use super::controller::{
    connections, received_requests, review_request, send_request, sent_requests, suggestions,
    withdraw_request,
};
use crate::middleware::auth::verify_token;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn connection_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/connection")
            .wrap(HttpAuthentication::bearer(verify_token))
            .route("", web::get().to(connections))
            .route("/suggestions", web::get().to(suggestions))
            .route("/received", web::get().to(received_requests))
            .route("/sent", web::get().to(sent_requests))
            .route("/request/{id}", web::post().to(send_request))
            .route("/withdraw/{id}", web::post().to(withdraw_request))
            .route("/review/{status}/{id}", web::post().to(review_request)),
    );
}
