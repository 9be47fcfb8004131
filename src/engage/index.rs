use super::controller::{add_comment, delete_comment, moderate_delete_comment, toggle_like};
use crate::middleware::auth::verify_token;
use crate::user::controller::search_users;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn engage_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/engage")
            .wrap(HttpAuthentication::bearer(verify_token))
            .route("/like/{id}", web::post().to(toggle_like))
            .route("/comment/{id}", web::post().to(add_comment))
            .route("/comment/{id}", web::delete().to(delete_comment))
            .route("/admin/comment/{id}", web::delete().to(moderate_delete_comment))
            .route("/users", web::get().to(search_users)),
    );
}
