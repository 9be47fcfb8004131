use super::controller::{create_post, delete_post, feed, get_post, my_posts, update_post};
use crate::middleware::auth::verify_token;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn feed_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/feed")
            .wrap(HttpAuthentication::bearer(verify_token))
            .route("", web::get().to(feed))
            .route("/create", web::post().to(create_post))
            .route("/myPosts", web::get().to(my_posts))
            .route("/{id}", web::get().to(get_post))
            .route("/{id}", web::patch().to(update_post))
            .route("/{id}", web::delete().to(delete_post)),
    );
}
