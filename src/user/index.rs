use super::controller::get_profile;
use crate::middleware::auth::verify_token;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .wrap(HttpAuthentication::bearer(verify_token))
            .route("/{id}", web::get().to(get_profile)),
    );
}
