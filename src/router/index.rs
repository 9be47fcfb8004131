use crate::connection::index::connection_routes;
use crate::engage::index::engage_routes;
use crate::feed::index::feed_routes;
use crate::user::index::user_routes;
use actix_web::web;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(connection_routes);
    cfg.configure(feed_routes);
    cfg.configure(engage_routes);
    cfg.configure(user_routes);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
    use actix_web::middleware::ErrorHandlers;
    use actix_web::{App, test, web};
    use mongodb::bson::oid::ObjectId;
    use serde_json::{Value, json};

    use super::routes;
    use crate::database::memory::{MemoryStore, RecordingMedia};
    use crate::middleware::auth::{TokenVerifier, issue_test_token};
    use crate::middleware::error_handler::handle_error;
    use crate::middleware::not_found::not_found;
    use crate::state::{AppState, Stores};

    const SECRET: &str = "router-test-secret";
    const BOUNDARY: &str = "XBOUNDARYX";

    macro_rules! app {
        ($store:expr) => {
            app!($store, Arc::new(RecordingMedia::default()))
        };
        ($store:expr, $media:expr) => {{
            let media: Arc<RecordingMedia> = $media;
            let state = AppState::new(Stores::memory($store.clone(), media));
            test::init_service(
                App::new()
                    .app_data(web::Data::new(TokenVerifier::new(SECRET)))
                    .configure(|cfg| state.configure(cfg))
                    .configure(routes)
                    .wrap(
                        ErrorHandlers::new()
                            .handler(StatusCode::NOT_FOUND, not_found)
                            .default_handler(handle_error),
                    ),
            )
            .await
        }};
    }

    fn bearer(user: &ObjectId) -> (actix_web::http::header::HeaderName, String) {
        (AUTHORIZATION, format!("Bearer {}", issue_test_token(user, SECRET)))
    }

    fn multipart_body(content: &str, image: Option<(&str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"content\"\r\n\r\n{c}\r\n",
                b = BOUNDARY,
                c = content
            )
            .as_bytes(),
        );
        if let Some((file_name, bytes)) = image {
            body.extend_from_slice(
                format!(
                    "--{b}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{f}\"\r\nContent-Type: image/png\r\n\r\n",
                    b = BOUNDARY,
                    f = file_name
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    #[actix_web::test]
    async fn requests_without_a_token_are_rejected() {
        let store = MemoryStore::new();
        let app = app!(store);

        let req = test::TestRequest::get().uri("/feed").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn duplicate_connection_request_is_a_bad_request() {
        let store = MemoryStore::new();
        let alice = store.add_user("Alice", "alice").await;
        let bob = store.add_user("Bob", "bob").await;
        let app = app!(store);

        let uri = format!("/connection/request/{}", bob.to_hex());
        let req = test::TestRequest::post()
            .uri(&uri)
            .insert_header(bearer(&alice))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["status"], "pending");

        // The reverse direction collides with the same pair.
        let req = test::TestRequest::post()
            .uri(&format!("/connection/request/{}", alice.to_hex()))
            .insert_header(bearer(&bob))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.request_count().await, 1);
    }

    #[actix_web::test]
    async fn review_with_unknown_status_is_rejected() {
        let store = MemoryStore::new();
        let alice = store.add_user("Alice", "alice").await;
        let bob = store.add_user("Bob", "bob").await;
        let app = app!(store);

        let req = test::TestRequest::post()
            .uri(&format!("/connection/review/maybe/{}", alice.to_hex()))
            .insert_header(bearer(&bob))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn missing_post_is_no_content() {
        let store = MemoryStore::new();
        let alice = store.add_user("Alice", "alice").await;
        let app = app!(store);

        let req = test::TestRequest::get()
            .uri(&format!("/feed/{}", ObjectId::new().to_hex()))
            .insert_header(bearer(&alice))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn feed_page_size_is_clamped() {
        let store = MemoryStore::new();
        let alice = store.add_user("Alice", "alice").await;
        let bob = store.add_user("Bob", "bob").await;
        for i in 0..60 {
            store.add_post(bob, &format!("post {}", i)).await;
        }
        let app = app!(store);

        let req = test::TestRequest::get()
            .uri("/feed?page=1&limit=500")
            .insert_header(bearer(&alice))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["posts"].as_array().map(Vec::len), Some(50));
    }

    #[actix_web::test]
    async fn unknown_routes_get_a_json_404() {
        let store = MemoryStore::new();
        let app = app!(store);

        let req = test::TestRequest::get().uri("/nowhere").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Route does not exist");
    }

    #[actix_web::test]
    async fn only_the_post_owner_can_moderate_comments() {
        let store = MemoryStore::new();
        let owner = store.add_user("Olive", "olive").await;
        let commenter = store.add_user("Carl", "carl").await;
        let stranger = store.add_user("Stan", "stan").await;
        let post_id = store.add_post(owner, "hello").await;
        let app = app!(store);

        let req = test::TestRequest::post()
            .uri(&format!("/engage/comment/{}", post_id.to_hex()))
            .insert_header(bearer(&commenter))
            .set_json(json!({ "text": "nice" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        let comment_id = body["id"].as_str().unwrap().to_string();

        let uri = format!("/engage/admin/comment/{}", comment_id);
        let req = test::TestRequest::delete()
            .uri(&uri)
            .insert_header(bearer(&stranger))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::delete()
            .uri(&uri)
            .insert_header(bearer(&owner))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(store.engagement_rows_for(&post_id).await, 0);
    }

    #[actix_web::test]
    async fn like_toggles_report_the_count() {
        let store = MemoryStore::new();
        let alice = store.add_user("Alice", "alice").await;
        let bob = store.add_user("Bob", "bob").await;
        let post_id = store.add_post(bob, "hello").await;
        let app = app!(store);

        let uri = format!("/engage/like/{}", post_id.to_hex());
        let req = test::TestRequest::post()
            .uri(&uri)
            .insert_header(bearer(&alice))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["liked"], true);
        assert_eq!(body["likedCount"], 1);

        let req = test::TestRequest::post()
            .uri(&uri)
            .insert_header(bearer(&alice))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["liked"], false);
        assert_eq!(body["likedCount"], 0);
    }

    #[actix_web::test]
    async fn multipart_create_stores_the_uploaded_image() {
        let store = MemoryStore::new();
        let alice = store.add_user("Alice", "alice").await;
        let app = app!(store);

        let req = test::TestRequest::post()
            .uri("/feed/create")
            .insert_header(bearer(&alice))
            .insert_header((
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(multipart_body("first post", Some(("cat.png", &[1u8, 2, 3][..]))))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["post"]["content"], "first post");
        assert_eq!(body["post"]["imageUrl"], "https://img.test/posts/cat.png");
        assert_eq!(body["post"]["postedBy"], alice.to_hex());
    }

    #[actix_web::test]
    async fn foreign_edit_is_rejected_before_any_upload() {
        let store = MemoryStore::new();
        let alice = store.add_user("Alice", "alice").await;
        let mallory = store.add_user("Mallory", "mallory").await;
        let post_id = store.add_post(alice, "mine").await;
        let media = Arc::new(RecordingMedia::default());
        let app = app!(store, media.clone());

        let req = test::TestRequest::patch()
            .uri(&format!("/feed/{}", post_id.to_hex()))
            .insert_header(bearer(&mallory))
            .insert_header((
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(multipart_body("hijack", Some(("evil.png", &[9u8, 9, 9][..]))))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(media.uploaded().await.is_empty());
        assert!(media.released().await.is_empty());
    }

    #[actix_web::test]
    async fn profile_reports_the_viewers_relationship() {
        let store = MemoryStore::new();
        let alice = store.add_user("Alice", "alice").await;
        let bob = store.add_user("Bob", "bob").await;
        store.add_post(bob, "bob's post").await;
        let app = app!(store);

        let req = test::TestRequest::post()
            .uri(&format!("/connection/request/{}", bob.to_hex()))
            .insert_header(bearer(&alice))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get()
            .uri(&format!("/user/{}", bob.to_hex()))
            .insert_header(bearer(&alice))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["postsCount"], 1);
        assert_eq!(body["connectionStatus"], "pending");
        assert_eq!(body["isSelf"], false);
    }
}
